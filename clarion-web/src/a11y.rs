// Accessibility helpers for the toolkit's own UI

use clarion_core::{StatusMessage, StatusSink, Tone};

/// Id of the polite live region that announces status messages.
pub const STATUS_REGION_ID: &str = "clarion-status";
const FOCUS_STYLE_ID: &str = "clarion-focus-css";

/// Get CSS for visible focus indicators and screen reader utilities
///
/// Injected once with the panel so the toolkit's controls stay operable when host
/// styles strip outlines.
#[must_use]
pub const fn visible_focus_css() -> &'static str {
    ".clarion-panel :focus{outline:3px solid #1a5fb4;outline-offset:2px} .clarion-panel [aria-pressed=true]{font-weight:700} .sr-only{position:absolute;width:1px;height:1px;margin:-1px;overflow:hidden;clip:rect(0 0 0 0);white-space:nowrap;}"
}

/// Inject [`visible_focus_css`] into `<head>` once.
pub fn inject_focus_css() {
    let Some(doc) = web_sys::window().and_then(|win| win.document()) else {
        return;
    };
    if doc.get_element_by_id(FOCUS_STYLE_ID).is_some() {
        return;
    }
    let Some(head) = doc.head() else {
        return;
    };
    if let Ok(style) = doc.create_element("style") {
        style.set_id(FOCUS_STYLE_ID);
        style.set_text_content(Some(visible_focus_css()));
        let _ = head.append_child(&style);
    }
}

#[must_use]
pub const fn tone_name(tone: Tone) -> &'static str {
    match tone {
        Tone::Success => "success",
        Tone::Info => "info",
        Tone::Warning => "warning",
    }
}

/// Update the live region status for screen readers
///
/// Creates the region on first use so announcements work even before the panel mounts.
pub fn set_status(message: &StatusMessage) {
    let Some(doc) = web_sys::window().and_then(|win| win.document()) else {
        return;
    };
    let node = doc.get_element_by_id(STATUS_REGION_ID).or_else(|| {
        let el = doc.create_element("div").ok()?;
        el.set_id(STATUS_REGION_ID);
        let _ = el.set_attribute("role", "status");
        let _ = el.set_attribute("aria-live", "polite");
        let _ = el.set_attribute("class", "sr-only");
        let _ = doc.body()?.append_child(&el);
        Some(el)
    });
    if let Some(node) = node {
        let _ = node.set_attribute("data-tone", tone_name(message.tone));
        node.set_text_content(Some(&message.text));
    }
}

/// Routes engine status messages to the live region.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiveRegionSink;

impl StatusSink for LiveRegionSink {
    fn publish(&self, message: &StatusMessage) {
        log::debug!("status: {}", message.text);
        set_status(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_css_targets_panel() {
        let css = visible_focus_css();
        assert!(css.contains(".clarion-panel :focus"));
        assert!(css.contains(".sr-only"));
    }

    #[test]
    fn tones_have_stable_names() {
        assert_eq!(tone_name(Tone::Warning), "warning");
        assert_eq!(tone_name(Tone::Success), "success");
    }
}
