//! Query descriptions for the tabular store.
//!
//! Queries are plain data: the PostgREST client renders them to URL query
//! pairs, the in-memory store evaluates them directly.

use crate::core::models::Table;

/// Equality predicate on a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: &'static str,
    pub value: String,
}

impl Filter {
    pub fn eq(column: &'static str, value: impl ToString) -> Self {
        Self {
            column,
            value: value.to_string(),
        }
    }

    /// PostgREST form: `(column, "eq.value")`.
    #[must_use]
    pub fn to_query_pair(&self) -> (String, String) {
        (self.column.to_string(), format!("eq.{}", self.value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub descending: bool,
}

impl Order {
    #[must_use]
    pub fn to_query_value(&self) -> String {
        let direction = if self.descending { "desc" } else { "asc" };
        format!("{}.{direction}", self.column)
    }
}

/// Nested projection of a related table, resolved through `foreign_key` on
/// the parent row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub table: Table,
    pub foreign_key: &'static str,
    pub columns: &'static [&'static str],
}

impl Embed {
    #[must_use]
    pub fn to_projection(&self) -> String {
        format!("{}({})", self.table, self.columns.join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    pub table: Table,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub embed: Option<Embed>,
}

impl Select {
    #[must_use]
    pub fn table(table: Table) -> Self {
        Self {
            table,
            filters: Vec::new(),
            order: None,
            embed: None,
        }
    }

    #[must_use]
    pub fn eq(mut self, column: &'static str, value: impl ToString) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    #[must_use]
    pub fn order_desc(mut self, column: &'static str) -> Self {
        self.order = Some(Order {
            column,
            descending: true,
        });
        self
    }

    #[must_use]
    pub fn embed(mut self, embed: Embed) -> Self {
        self.embed = Some(embed);
        self
    }

    /// Renders the `select`, filter and `order` query pairs, in that order.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let projection = match &self.embed {
            Some(embed) => format!("*,{}", embed.to_projection()),
            None => "*".to_string(),
        };

        let mut pairs = vec![("select".to_string(), projection)];
        pairs.extend(self.filters.iter().map(Filter::to_query_pair));
        if let Some(order) = &self.order {
            pairs.push(("order".to_string(), order.to_query_value()));
        }
        pairs
    }
}
