//! Host configuration embedded in the page.
use clarion_core::ToolkitConfig;

/// Id of the `<script type="application/json">` block holding [`ToolkitConfig`].
pub const CONFIG_ELEMENT_ID: &str = "clarion-config";

/// Parse the embedded configuration text, falling back to defaults on any error.
#[must_use]
pub fn parse_or_default(text: Option<&str>) -> ToolkitConfig {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return ToolkitConfig::default();
    };
    ToolkitConfig::from_json(text).unwrap_or_else(|err| {
        crate::dom::console_error(&format!("clarion: ignoring configuration: {err}"));
        ToolkitConfig::default()
    })
}

/// Read the configuration block from the current document.
#[must_use]
pub fn load() -> ToolkitConfig {
    let text = crate::dom::document()
        .ok()
        .and_then(|doc| doc.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|el| el.text_content());
    parse_or_default(text.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_blank_block_uses_defaults() {
        assert_eq!(parse_or_default(None), ToolkitConfig::default());
        assert_eq!(parse_or_default(Some("  \n")), ToolkitConfig::default());
    }

    #[test]
    fn embedded_block_overrides_fields() {
        let cfg = parse_or_default(Some(r#"{"namespace":"campus_a11y","auto_sync":false}"#));
        assert_eq!(cfg.namespace, "campus_a11y");
        assert!(!cfg.auto_sync);
    }
}
