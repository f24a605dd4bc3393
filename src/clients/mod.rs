//! HTTP clients for the hosted backend.

pub mod auth_client;
pub mod postgrest_client;

pub use auth_client::AuthClient;
pub use postgrest_client::PostgrestClient;
