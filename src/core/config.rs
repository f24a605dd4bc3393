use std::env;
use std::time::Duration;

use url::Url;

use crate::errors::GatewayError;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: Url,
    pub supabase_anon_key: String,
    pub access_token: Option<String>,
    pub http_timeout: Duration,
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or malformed.
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GatewayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("SUPABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| GatewayError::ConfigError("SUPABASE_URL is not set".to_string()))?;
        let supabase_url = Url::parse(raw_url.trim())
            .map_err(|e| GatewayError::ConfigError(format!("SUPABASE_URL: {e}")))?;

        let supabase_anon_key = lookup("SUPABASE_ANON_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                GatewayError::ConfigError("SUPABASE_ANON_KEY is not set".to_string())
            })?;

        let http_timeout = match lookup("PAIE_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|e| {
                    GatewayError::ConfigError(format!("PAIE_HTTP_TIMEOUT_SECS: {e}"))
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            access_token: lookup("SUPABASE_ACCESS_TOKEN").filter(|v| !v.trim().is_empty()),
            http_timeout,
        })
    }
}

/// Joins `prefix` onto the project URL, keeping any path the URL already has.
pub(crate) fn service_url(base: &Url, prefix: &str) -> Result<Url, GatewayError> {
    let mut url = base.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.join(prefix)
        .map_err(|e| GatewayError::ConfigError(format!("{prefix} URL: {e}")))
}
