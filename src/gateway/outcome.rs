//! Tagged success/failure result returned by every gateway operation.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::GatewayError;

/// Either a payload, or an error message together with the payload's
/// default (`None`, an empty list, `()`), so callers branch on one flag.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Outcome<T> {
    payload: T,
    error: Option<String>,
}

impl<T> Outcome<T> {
    pub fn success(payload: T) -> Self {
        Self {
            payload,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>, payload: T) -> Self {
        Self {
            payload,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn payload(&self) -> &T {
        &self.payload
    }

    #[must_use]
    pub fn into_payload(self) -> T {
        self.payload
    }

    /// # Errors
    ///
    /// Returns the failure message when the outcome is not ok.
    pub fn into_result(self) -> Result<T, String> {
        match self.error {
            None => Ok(self.payload),
            Some(error) => Err(error),
        }
    }
}

impl<T: Default> From<Result<T, GatewayError>> for Outcome<T> {
    fn from(result: Result<T, GatewayError>) -> Self {
        match result {
            Ok(payload) => Outcome::success(payload),
            Err(e) => Outcome::failure(e.to_string(), T::default()),
        }
    }
}

impl<T: Serialize> Outcome<T> {
    /// Renders `{"ok": true, "<key>": …}` or
    /// `{"ok": false, "error": "…", "<key>": <default>}`.
    ///
    /// With no `key` the payload is left out, which suits `Outcome<()>`.
    #[must_use]
    pub fn to_json(&self, key: Option<&str>) -> Value {
        let mut body = Map::new();
        body.insert("ok".to_string(), Value::Bool(self.is_ok()));
        if let Some(error) = &self.error {
            body.insert("error".to_string(), Value::String(error.clone()));
        }
        let Some(key) = key else {
            return Value::Object(body);
        };
        match serde_json::to_value(&self.payload) {
            Ok(value) => {
                body.insert(key.to_string(), value);
            }
            Err(e) => {
                body.insert("ok".to_string(), Value::Bool(false));
                body.insert("error".to_string(), Value::String(e.to_string()));
            }
        }
        Value::Object(body)
    }
}
