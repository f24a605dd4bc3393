//! Supabase REST (PostgREST) client module
//!
//! Implements [`TableStore`] over `/rest/v1/<table>` with the caller's access
//! token, so the database's row-level policies see the same user the gateway
//! filters on.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::core::config::{AppConfig, service_url};
use crate::core::models::Table;
use crate::core::session::AuthUser;
use crate::errors::GatewayError;
use crate::store::{Filter, Select, TableStore};

/// Media type asking PostgREST for a single JSON object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// PostgREST error code for a single-object request that did not match
/// exactly one row. `details` tells zero rows apart from several.
const ERROR_SINGLE_OBJECT: &str = "PGRST116";

#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

impl PostgrestErrorBody {
    fn is_zero_rows(&self) -> bool {
        self.code.as_deref() == Some(ERROR_SINGLE_OBJECT)
            && self
                .details
                .as_deref()
                .is_some_and(|d| d.contains("contains 0 rows"))
    }
}

/// Maps a non-success PostgREST response body to a gateway error.
///
/// Only a single-object request that matched no row becomes `NotFound`;
/// several matching rows is a store fault like any other.
#[must_use]
fn error_from_body(status: reqwest::StatusCode, body: &str) -> GatewayError {
    match serde_json::from_str::<PostgrestErrorBody>(body) {
        Ok(parsed) if parsed.is_zero_rows() => GatewayError::NotFound,
        Ok(PostgrestErrorBody {
            message: Some(message),
            ..
        }) => GatewayError::StoreError(message),
        _ => GatewayError::StoreError(format!("HTTP {status}: {body}")),
    }
}

pub struct PostgrestClient {
    http: Client,
    rest_url: Url,
    anon_key: String,
}

impl PostgrestClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the base URL
    /// cannot be extended with the REST path.
    pub fn new(config: &AppConfig) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| GatewayError::HttpError(format!("Failed to build HTTP client: {e}")))?;
        Self::with_client(http, &config.supabase_url, config.supabase_anon_key.clone())
    }

    /// # Errors
    ///
    /// Returns an error if the base URL cannot be extended with the REST path.
    pub fn with_client(
        http: Client,
        supabase_url: &Url,
        anon_key: String,
    ) -> Result<Self, GatewayError> {
        let rest_url = service_url(supabase_url, "rest/v1/")?;
        Ok(Self {
            http,
            rest_url,
            anon_key,
        })
    }

    #[must_use]
    pub fn rest_url(&self) -> &Url {
        &self.rest_url
    }

    fn request(
        &self,
        method: Method,
        auth: &AuthUser,
        table: Table,
    ) -> Result<RequestBuilder, GatewayError> {
        let url = self
            .rest_url
            .join(table.as_str())
            .map_err(|e| GatewayError::ConfigError(format!("table URL for {table}: {e}")))?;

        Ok(self
            .http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&auth.access_token))
    }

    async fn send(builder: RequestBuilder, context: &str) -> Result<Response, GatewayError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| GatewayError::HttpError(format!("{context}: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let err = error_from_body(status, &body);
        if !matches!(err, GatewayError::NotFound) {
            warn!(%status, context, "PostgREST request failed: {}", err);
        }
        Err(err)
    }

    async fn json<T: for<'de> Deserialize<'de>>(
        resp: Response,
        context: &str,
    ) -> Result<T, GatewayError> {
        resp.json::<T>()
            .await
            .map_err(|e| GatewayError::DecodeError(format!("{context} JSON parse error: {e}")))
    }
}

#[async_trait]
impl TableStore for PostgrestClient {
    async fn select(&self, auth: &AuthUser, query: &Select) -> Result<Vec<Value>, GatewayError> {
        debug!(table = %query.table, filters = query.filters.len(), "select");
        let builder = self
            .request(Method::GET, auth, query.table)?
            .query(&query.to_query_pairs());
        let resp = Self::send(builder, "select").await?;
        Self::json(resp, "select").await
    }

    async fn select_single(
        &self,
        auth: &AuthUser,
        query: &Select,
    ) -> Result<Value, GatewayError> {
        debug!(table = %query.table, "select single");
        let builder = self
            .request(Method::GET, auth, query.table)?
            .header(ACCEPT, SINGLE_OBJECT)
            .query(&query.to_query_pairs());
        let resp = Self::send(builder, "select single").await?;
        Self::json(resp, "select single").await
    }

    async fn insert(
        &self,
        auth: &AuthUser,
        table: Table,
        row: Value,
    ) -> Result<Value, GatewayError> {
        #[cfg(feature = "debug-logs")]
        debug!(%table, %row, "insert");

        #[cfg(not(feature = "debug-logs"))]
        debug!(%table, "insert [row masked, enable debug-logs feature to view]");

        let builder = self
            .request(Method::POST, auth, table)?
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .json(&row);
        let resp = Self::send(builder, "insert").await?;
        Self::json(resp, "insert").await
    }

    async fn update(
        &self,
        auth: &AuthUser,
        table: Table,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Value, GatewayError> {
        #[cfg(feature = "debug-logs")]
        debug!(%table, %patch, "update");

        #[cfg(not(feature = "debug-logs"))]
        debug!(%table, "update [patch masked, enable debug-logs feature to view]");

        let pairs: Vec<(String, String)> = filters.iter().map(Filter::to_query_pair).collect();
        let builder = self
            .request(Method::PATCH, auth, table)?
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .query(&pairs)
            .json(&patch);
        let resp = Self::send(builder, "update").await?;
        Self::json(resp, "update").await
    }

    async fn delete(
        &self,
        auth: &AuthUser,
        table: Table,
        filters: &[Filter],
    ) -> Result<u64, GatewayError> {
        debug!(%table, "delete");
        let pairs: Vec<(String, String)> = filters.iter().map(Filter::to_query_pair).collect();
        let builder = self
            .request(Method::DELETE, auth, table)?
            .header("Prefer", "return=representation")
            .query(&pairs);
        let resp = Self::send(builder, "delete").await?;
        let removed: Vec<Value> = Self::json(resp, "delete").await?;
        Ok(removed.len() as u64)
    }
}
