//! Error taxonomy shared by every Clarion component.
//!
//! None of these escape the public operations of the engine or the store; they travel
//! inside outcome structs so callers can log or surface them as soft status text.
use crate::registry::ToggleId;

#[derive(Debug, thiserror::Error)]
pub enum A11yError {
    /// A caller tried to set a toggle to a value outside its declared domain.
    #[error("invalid value for {toggle}: {reason}")]
    InvalidValue { toggle: ToggleId, reason: String },
    #[error("unknown toggle: {0}")]
    UnknownToggle(String),
    /// Remote fetch or write failed (network, auth, malformed response).
    #[error("preference store unavailable: {0}")]
    StoreUnavailable(String),
    /// Local cache could not be read or written.
    #[error("local storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// No clear landmark structure was found while resolving the scope element.
    #[error("scope resolution ambiguous: {0}")]
    ScopeResolutionAmbiguity(String),
    /// A cooperating feature asked for a class owned by the registry.
    #[error("class {0} is reserved for registry toggles")]
    ReservedClass(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl A11yError {
    /// Transient failures are recovered by falling back to the local cache.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    pub(crate) fn invalid(toggle: ToggleId, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            toggle,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_store_failures_are_transient() {
        assert!(A11yError::StoreUnavailable("offline".into()).is_transient());
        assert!(!A11yError::Storage("quota".into()).is_transient());
        assert!(!A11yError::invalid(ToggleId::FontSize, "too large").is_transient());
    }

    #[test]
    fn invalid_value_message_names_toggle() {
        let err = A11yError::invalid(ToggleId::LineSpacing, "expected a level");
        assert_eq!(
            err.to_string(),
            "invalid value for lineSpacing: expected a level"
        );
    }
}
