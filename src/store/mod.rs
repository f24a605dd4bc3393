//! Tabular store port.
//!
//! The gateway talks to the hosted database only through [`TableStore`]:
//! - [`crate::clients::postgrest_client::PostgrestClient`] for the real backend
//! - [`memory::MemoryStore`] for tests

pub mod memory;
pub mod query;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::models::Table;
use crate::core::session::AuthUser;
use crate::errors::GatewayError;

pub use memory::MemoryStore;
pub use query::{Embed, Filter, Order, Select};

/// Row-oriented primitives over named tables. Rows travel as JSON objects.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Returns every row matching the query, in the query's order.
    async fn select(&self, auth: &AuthUser, query: &Select) -> Result<Vec<Value>, GatewayError>;

    /// Returns exactly one row.
    ///
    /// Fails with `GatewayError::NotFound` when no row matches.
    async fn select_single(&self, auth: &AuthUser, query: &Select)
    -> Result<Value, GatewayError>;

    /// Inserts one row and returns it as stored.
    async fn insert(&self, auth: &AuthUser, table: Table, row: Value)
    -> Result<Value, GatewayError>;

    /// Applies `patch` to the single row matching `filters` and returns it.
    ///
    /// Fails with `GatewayError::NotFound` when no row matches.
    async fn update(
        &self,
        auth: &AuthUser,
        table: Table,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Value, GatewayError>;

    /// Deletes every row matching `filters` and returns how many were removed.
    async fn delete(
        &self,
        auth: &AuthUser,
        table: Table,
        filters: &[Filter],
    ) -> Result<u64, GatewayError>;
}
