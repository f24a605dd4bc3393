//! Configuration, data model and session types shared by every layer.

pub mod config;
pub mod models;
pub mod session;
