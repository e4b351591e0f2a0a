//! Request and response bodies exchanged with the remote preference endpoint.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::A11yError;
use crate::registry::ToggleId;
use crate::value::ToggleValue;

/// Body returned by the fetch endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchResponse {
    pub success: bool,
    #[serde(default)]
    pub preferences: Map<String, Value>,
}

impl FetchResponse {
    /// Parse a response body. Anything that is not the expected JSON shape is treated as
    /// the remote store being unavailable.
    ///
    /// # Errors
    ///
    /// Returns [`A11yError::StoreUnavailable`] for non-JSON bodies and for `success: false`.
    pub fn from_body(body: &str) -> Result<Self, A11yError> {
        let parsed: Self = serde_json::from_str(body)
            .map_err(|err| A11yError::StoreUnavailable(format!("non-JSON fetch response: {err}")))?;
        if parsed.success {
            Ok(parsed)
        } else {
            Err(A11yError::StoreUnavailable(
                "fetch reported success: false".to_string(),
            ))
        }
    }
}

/// Body sent to the save endpoint, one toggle at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRequest {
    pub preference: String,
    pub value: Value,
}

impl SaveRequest {
    #[must_use]
    pub fn new(toggle: ToggleId, value: &ToggleValue) -> Self {
        Self {
            preference: toggle.key().to_string(),
            value: value.to_json(),
        }
    }
}

/// Body returned by the save endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SaveResponse {
    /// # Errors
    ///
    /// Returns [`A11yError::StoreUnavailable`] for non-JSON bodies and for `success: false`.
    pub fn from_body(body: &str) -> Result<Self, A11yError> {
        let parsed: Self = serde_json::from_str(body)
            .map_err(|err| A11yError::StoreUnavailable(format!("non-JSON save response: {err}")))?;
        parsed.into_result()
    }

    /// # Errors
    ///
    /// Returns [`A11yError::StoreUnavailable`] carrying the server message when `success` is false.
    pub fn into_result(self) -> Result<Self, A11yError> {
        if self.success {
            Ok(self)
        } else {
            Err(A11yError::StoreUnavailable(
                self.message
                    .unwrap_or_else(|| "save rejected by server".to_string()),
            ))
        }
    }
}
