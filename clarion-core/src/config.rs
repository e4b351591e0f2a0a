//! Host-supplied toolkit configuration.
use log::LevelFilter;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::A11yError;
use crate::scope::ScopeSelectors;

static IDENTIFIER: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_-]*$").ok());

fn is_identifier(value: &str) -> bool {
    (*IDENTIFIER)
        .as_ref()
        .is_some_and(|re| re.is_match(value))
}

/// Every field is optional in the JSON form; missing fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    /// Prefix of local cache keys (`<namespace>_<toggle>`).
    pub namespace: String,
    /// Prefix of every class placed on the scope element.
    pub class_prefix: String,
    pub auto_sync: bool,
    pub content_selectors: Vec<String>,
    pub header_selectors: String,
    pub footer_selectors: String,
    pub log_level: String,
    /// Base path of the preference endpoints. Falls back to the build-time public URL.
    pub endpoint_base: Option<String>,
    /// Session token forwarded to the host on every request.
    pub session_key: Option<String>,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        let selectors = ScopeSelectors::default();
        Self {
            namespace: "clarion".to_string(),
            class_prefix: "clarion".to_string(),
            auto_sync: true,
            content_selectors: selectors.content,
            header_selectors: selectors.header,
            footer_selectors: selectors.footer,
            log_level: "info".to_string(),
            endpoint_base: None,
            session_key: None,
        }
    }
}

impl ToolkitConfig {
    /// Parse and validate a JSON configuration block.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or [`Self::validate`] fails.
    pub fn from_json(text: &str) -> Result<Self, A11yError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`A11yError::Config`] when the namespace or class prefix is not a lowercase
    /// identifier, or when no content selector is configured.
    pub fn validate(&self) -> Result<(), A11yError> {
        if !is_identifier(&self.namespace) {
            return Err(A11yError::Config(format!(
                "namespace {:?} must match [a-z][a-z0-9_-]*",
                self.namespace
            )));
        }
        if !is_identifier(&self.class_prefix) {
            return Err(A11yError::Config(format!(
                "class prefix {:?} must match [a-z][a-z0-9_-]*",
                self.class_prefix
            )));
        }
        if self.content_selectors.iter().all(|s| s.trim().is_empty()) {
            return Err(A11yError::Config(
                "at least one content selector is required".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn scope_selectors(&self) -> ScopeSelectors {
        ScopeSelectors {
            content: self.content_selectors.clone(),
            header: self.header_selectors.clone(),
            footer: self.footer_selectors.clone(),
        }
    }

    /// Unknown level names fall back to `Info`.
    #[must_use]
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = ToolkitConfig::from_json("{}").unwrap();
        assert_eq!(config, ToolkitConfig::default());
        assert!(config.auto_sync);
        assert_eq!(config.scope_selectors(), ScopeSelectors::default());
    }

    #[test]
    fn partial_config_overrides_fields() {
        let config = ToolkitConfig::from_json(
            r#"{"namespace":"campus_a11y","auto_sync":false,"log_level":"debug","session_key":"abc"}"#,
        )
        .unwrap();
        assert_eq!(config.namespace, "campus_a11y");
        assert!(!config.auto_sync);
        assert_eq!(config.level_filter(), LevelFilter::Debug);
        assert_eq!(config.session_key.as_deref(), Some("abc"));
        assert_eq!(config.class_prefix, "clarion");
    }

    #[test]
    fn rejects_bad_identifiers() {
        let err = ToolkitConfig::from_json(r#"{"class_prefix":"Bad Prefix"}"#).unwrap_err();
        assert!(matches!(err, A11yError::Config(_)));
        assert!(ToolkitConfig::from_json(r#"{"namespace":"9lives"}"#).is_err());
        assert!(ToolkitConfig::from_json(r#"{"content_selectors":[]}"#).is_err());
        assert!(matches!(
            ToolkitConfig::from_json("not json"),
            Err(A11yError::Serialization(_))
        ));
    }

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        let config = ToolkitConfig {
            log_level: "chatty".to_string(),
            ..ToolkitConfig::default()
        };
        assert_eq!(config.level_filter(), LevelFilter::Info);
    }
}
