use clarion_core::{A11yError, EffectRegistry, ToggleId, ToggleValue};
use serde::Serialize;
use serde_json::Value;

use crate::handle::{ActionOutcome, EngineHandle, PanelAction};

/// Name of the object installed on `window`.
pub(super) const BRIDGE_GLOBAL: &str = "clarion";

/// What a bridge call reports back to page scripts.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(super) struct BridgeOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reset: Vec<ToggleId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BridgeOutcome {
    pub(super) fn failed(err: &A11yError) -> Self {
        Self {
            success: false,
            value: None,
            reset: Vec::new(),
            error: Some(err.to_string()),
        }
    }
}

impl From<&ActionOutcome> for BridgeOutcome {
    fn from(outcome: &ActionOutcome) -> Self {
        match outcome {
            ActionOutcome::Set(set) => Self {
                success: !set.is_refused(),
                value: Some(set.value.to_json()),
                reset: set.reset.clone(),
                error: set.rejected.as_ref().map(ToString::to_string),
            },
            ActionOutcome::Reset(_) | ActionOutcome::AutoSync(_) => Self {
                success: true,
                value: None,
                reset: Vec::new(),
                error: None,
            },
        }
    }
}

/// An action decoded from page-script arguments, with any adjustment made while reading it.
#[derive(Debug)]
pub(super) struct BridgeRequest {
    pub action: PanelAction,
    pub adjusted: Option<A11yError>,
}

impl From<PanelAction> for BridgeRequest {
    fn from(action: PanelAction) -> Self {
        Self {
            action,
            adjusted: None,
        }
    }
}

/// Dispatch a decoded request and describe the result for page scripts.
pub(super) fn perform(
    handle: &EngineHandle,
    request: Result<BridgeRequest, A11yError>,
) -> BridgeOutcome {
    match request {
        Ok(BridgeRequest { action, adjusted }) => {
            let mut outcome = BridgeOutcome::from(&handle.dispatch(action));
            if outcome.error.is_none() {
                outcome.error = adjusted.as_ref().map(ToString::to_string);
            }
            outcome
        }
        Err(err) => {
            log::warn!("bridge call refused: {err}");
            BridgeOutcome::failed(&err)
        }
    }
}

pub(super) fn toggle_named(name: &str) -> Result<ToggleId, A11yError> {
    ToggleId::parse(name.trim()).ok_or_else(|| A11yError::UnknownToggle(name.to_string()))
}

/// `clarion.setPreference(name, value)`: the value is read as leniently as a stored one.
pub(super) fn set_preference_action(name: &str, raw: &Value) -> Result<BridgeRequest, A11yError> {
    let toggle = toggle_named(name)?;
    let spec = EffectRegistry::standard().spec(toggle);
    let normalized = spec.domain.coerce(toggle, raw)?;
    Ok(BridgeRequest {
        action: PanelAction::SetValue(toggle, normalized.value),
        adjusted: normalized.adjusted,
    })
}

/// `clarion.cycle(name)`: flags flip, levels advance.
pub(super) fn cycle_action(name: &str) -> Result<PanelAction, A11yError> {
    let toggle = toggle_named(name)?;
    Ok(match EffectRegistry::standard().spec(toggle).default {
        ToggleValue::Flag(_) => PanelAction::Toggle(toggle),
        ToggleValue::Level(_) | ToggleValue::Modes(_) => PanelAction::Cycle(toggle),
    })
}
