//! In-process [`TableStore`] that behaves like the hosted tables.
//!
//! Mirrors the database defaults the gateway relies on (generated `id`,
//! `created_at`) and the single-object semantics of the REST API, and keeps
//! a log of every call it receives.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::TableStore;
use super::query::{Embed, Filter, Select};
use crate::core::models::Table;
use crate::core::session::AuthUser;
use crate::errors::GatewayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Select,
    SelectSingle,
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreCall {
    pub op: StoreOp,
    pub table: Table,
    pub filters: Vec<Filter>,
    /// Row or patch sent with inserts and updates.
    pub payload: Option<Value>,
}

#[derive(Default)]
struct Inner {
    tables: HashMap<Table, Vec<Value>>,
    calls: Vec<StoreCall>,
    faults: HashMap<Table, String>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a row directly, bypassing the call log.
    pub fn seed(&self, table: Table, row: Value) {
        self.lock().tables.entry(table).or_default().push(row);
    }

    /// Makes every subsequent call touching `table` fail with `message`.
    pub fn fail_table(&self, table: Table, message: impl Into<String>) {
        self.lock().faults.insert(table, message.into());
    }

    #[must_use]
    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.lock().tables.get(&table).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    fn record(
        inner: &mut Inner,
        op: StoreOp,
        table: Table,
        filters: &[Filter],
        payload: Option<&Value>,
    ) -> Result<(), GatewayError> {
        inner.calls.push(StoreCall {
            op,
            table,
            filters: filters.to_vec(),
            payload: payload.cloned(),
        });
        match inner.faults.get(&table) {
            Some(message) => Err(GatewayError::StoreError(message.clone())),
            None => Ok(()),
        }
    }
}

fn cell_matches(cell: Option<&Value>, expected: &str) -> bool {
    match cell {
        Some(Value::String(s)) => s == expected,
        Some(Value::Number(n)) => n.to_string() == expected,
        Some(Value::Bool(b)) => b.to_string() == expected,
        Some(Value::Null) | None => expected == "null",
        Some(_) => false,
    }
}

fn row_matches(row: &Value, filters: &[Filter]) -> bool {
    filters
        .iter()
        .all(|f| cell_matches(row.get(f.column), &f.value))
}

fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (
                DateTime::parse_from_rfc3339(x),
                DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(dx), Ok(dy)) => dx.cmp(&dy),
                _ => x.cmp(y),
            }
        }
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn project_embed(tables: &HashMap<Table, Vec<Value>>, row: &Value, embed: &Embed) -> Value {
    let Some(Value::String(key)) = row.get(embed.foreign_key) else {
        return Value::Null;
    };
    let related = tables
        .get(&embed.table)
        .and_then(|rows| rows.iter().find(|r| cell_matches(r.get("id"), key)));

    match related {
        Some(related) => {
            let projected: Map<String, Value> = embed
                .columns
                .iter()
                .map(|c| {
                    (
                        (*c).to_string(),
                        related.get(*c).cloned().unwrap_or(Value::Null),
                    )
                })
                .collect();
            Value::Object(projected)
        }
        None => Value::Null,
    }
}

fn run_select(tables: &HashMap<Table, Vec<Value>>, query: &Select) -> Vec<Value> {
    let mut rows: Vec<Value> = tables
        .get(&query.table)
        .map(|rows| {
            rows.iter()
                .filter(|row| row_matches(row, &query.filters))
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    if let Some(order) = &query.order {
        rows.sort_by(|a, b| {
            let ord = compare_cells(a.get(order.column), b.get(order.column));
            if order.descending { ord.reverse() } else { ord }
        });
    }

    if let Some(embed) = &query.embed {
        for row in &mut rows {
            let projected = project_embed(tables, row, embed);
            if let Value::Object(map) = row {
                map.insert(embed.table.as_str().to_string(), projected);
            }
        }
    }

    rows
}

fn single_object_error(count: usize) -> GatewayError {
    if count == 0 {
        GatewayError::NotFound
    } else {
        GatewayError::StoreError(
            "JSON object requested, multiple (or no) rows returned".to_string(),
        )
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn select(&self, _auth: &AuthUser, query: &Select) -> Result<Vec<Value>, GatewayError> {
        let mut inner = self.lock();
        Self::record(&mut inner, StoreOp::Select, query.table, &query.filters, None)?;
        Ok(run_select(&inner.tables, query))
    }

    async fn select_single(
        &self,
        _auth: &AuthUser,
        query: &Select,
    ) -> Result<Value, GatewayError> {
        let mut inner = self.lock();
        Self::record(
            &mut inner,
            StoreOp::SelectSingle,
            query.table,
            &query.filters,
            None,
        )?;
        let mut rows = run_select(&inner.tables, query);
        if rows.len() == 1 {
            Ok(rows.remove(0))
        } else {
            Err(single_object_error(rows.len()))
        }
    }

    async fn insert(
        &self,
        _auth: &AuthUser,
        table: Table,
        row: Value,
    ) -> Result<Value, GatewayError> {
        let mut inner = self.lock();
        Self::record(&mut inner, StoreOp::Insert, table, &[], Some(&row))?;

        let Value::Object(mut map) = row else {
            return Err(GatewayError::StoreError(
                "insert payload must be a JSON object".to_string(),
            ));
        };
        map.entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        map.entry("created_at")
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));

        let stored = Value::Object(map);
        inner.tables.entry(table).or_default().push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        _auth: &AuthUser,
        table: Table,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Value, GatewayError> {
        let mut inner = self.lock();
        Self::record(&mut inner, StoreOp::Update, table, filters, Some(&patch))?;

        let Value::Object(patch) = patch else {
            return Err(GatewayError::StoreError(
                "update payload must be a JSON object".to_string(),
            ));
        };

        let rows = inner.tables.entry(table).or_default();
        let matching: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row_matches(row, filters))
            .map(|(i, _)| i)
            .collect();
        let [index] = matching[..] else {
            return Err(single_object_error(matching.len()));
        };

        let row = &mut rows[index];
        if let Value::Object(map) = row {
            for (key, value) in patch {
                map.insert(key, value);
            }
        }
        Ok(row.clone())
    }

    async fn delete(
        &self,
        _auth: &AuthUser,
        table: Table,
        filters: &[Filter],
    ) -> Result<u64, GatewayError> {
        let mut inner = self.lock();
        Self::record(&mut inner, StoreOp::Delete, table, filters, None)?;

        let rows = inner.tables.entry(table).or_default();
        let before = rows.len();
        rows.retain(|row| !row_matches(row, filters));
        Ok((before - rows.len()) as u64)
    }
}
