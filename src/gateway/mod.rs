//! Persistence gateway.
//!
//! Every operation:
//! - takes the caller's [`Session`](crate::core::session::Session) and fails
//!   before touching the store when it is anonymous
//! - scopes reads and writes to the session's user with a `user_id` filter
//! - reports failures as an [`Outcome`] instead of an error

mod calculations;
mod company;
mod employees;
mod export;
pub mod outcome;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{error, warn};
use uuid::Uuid;

use crate::core::models::Table;
use crate::core::session::AuthUser;
use crate::errors::GatewayError;
use crate::store::{Filter, TableStore};

pub use calculations::{default_period, default_title};
pub use outcome::Outcome;

/// Gateway over the employee, company and salary calculation tables.
pub struct PersistenceGateway<S> {
    store: S,
}

impl<S: TableStore> PersistenceGateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Current time in the store's timestamp format.
fn timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Serializes an input payload into a row owned by `user`.
fn owned_row<T: Serialize>(input: &T, user: &AuthUser) -> Result<Map<String, Value>, GatewayError> {
    match serde_json::to_value(input)? {
        Value::Object(mut row) => {
            row.insert("user_id".to_string(), Value::String(user.id.to_string()));
            Ok(row)
        }
        other => Err(GatewayError::DecodeError(format!(
            "expected an object payload, got {other}"
        ))),
    }
}

/// Filters selecting row `id` only if `user` owns it.
fn owned_by(id: Uuid, user: &AuthUser) -> [Filter; 2] {
    [Filter::eq("id", id), Filter::eq("user_id", user.id)]
}

fn decode_row<T: DeserializeOwned>(table: Table, row: Value) -> Result<T, GatewayError> {
    serde_json::from_value(row).map_err(|e| GatewayError::DecodeError(format!("{table} row: {e}")))
}

fn decode_rows<T: DeserializeOwned>(table: Table, rows: Vec<Value>) -> Result<Vec<T>, GatewayError> {
    rows.into_iter().map(|row| decode_row(table, row)).collect()
}

/// Logs a failed operation and converts the result into an outcome.
fn finish<T: Default>(operation: &'static str, result: Result<T, GatewayError>) -> Outcome<T> {
    match &result {
        Err(GatewayError::NoSession) => warn!(operation, "Rejected: no authenticated session"),
        Err(e) => error!(operation, "Operation failed: {}", e),
        Ok(_) => {}
    }
    result.into()
}
