//! Complete, serializable picture of every toggle value.
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::A11yError;
use crate::registry::{EffectRegistry, ToggleId};
use crate::value::{ModeSet, ToggleValue};

/// Mapping of every registry toggle to its current value.
///
/// A snapshot is always complete: keys missing from a persisted record are filled with
/// registry defaults, and keys the registry does not know are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceSnapshot {
    values: BTreeMap<ToggleId, ToggleValue>,
}

/// Result of decoding a persisted record.
#[derive(Debug)]
pub struct DecodedSnapshot {
    pub snapshot: PreferenceSnapshot,
    /// Values that were dropped or adjusted while decoding.
    pub rejected: Vec<A11yError>,
}

impl Default for PreferenceSnapshot {
    fn default() -> Self {
        Self::defaults()
    }
}

impl PreferenceSnapshot {
    #[must_use]
    pub fn defaults() -> Self {
        let values = EffectRegistry::standard()
            .iter()
            .map(|spec| (spec.id, spec.default.clone()))
            .collect();
        Self { values }
    }

    #[must_use]
    pub fn get(&self, id: ToggleId) -> &ToggleValue {
        // Every id is inserted by `defaults`; `set` only replaces.
        self.values
            .get(&id)
            .unwrap_or(&EffectRegistry::standard().spec(id).default)
    }

    #[must_use]
    pub fn flag(&self, id: ToggleId) -> bool {
        self.get(id).as_flag().unwrap_or(false)
    }

    #[must_use]
    pub fn level(&self, id: ToggleId) -> u16 {
        self.get(id).as_level().unwrap_or_default()
    }

    #[must_use]
    pub fn modes(&self, id: ToggleId) -> ModeSet {
        self.get(id).as_modes().cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn is_default(&self, id: ToggleId) -> bool {
        EffectRegistry::standard().spec(id).is_default(self.get(id))
    }

    /// Toggles currently holding a non-default value, in registry order.
    pub fn active(&self) -> impl Iterator<Item = ToggleId> + '_ {
        ToggleId::ALL.into_iter().filter(|id| !self.is_default(*id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (ToggleId, &ToggleValue)> {
        self.values.iter().map(|(id, value)| (*id, value))
    }

    pub(crate) fn set(&mut self, id: ToggleId, value: ToggleValue) {
        self.values.insert(id, value);
    }

    /// Plain JSON object keyed by toggle id, the shape sent to and read from both stores.
    #[must_use]
    pub fn to_raw(&self) -> Map<String, Value> {
        self.values
            .iter()
            .map(|(id, value)| (id.key().to_string(), value.to_json()))
            .collect()
    }

    /// Decode a persisted record leniently.
    ///
    /// Legacy keys written by older toolkit versions are migrated when their modern
    /// counterpart is absent.
    #[must_use]
    pub fn from_raw(raw: &Map<String, Value>) -> DecodedSnapshot {
        let registry = EffectRegistry::standard();
        let mut snapshot = Self::defaults();
        let mut rejected = Vec::new();
        let migrated = migrate_legacy(raw);

        for spec in registry.iter() {
            let Some(value) = raw.get(spec.id.key()).or_else(|| migrated.get(spec.id.key()))
            else {
                continue;
            };
            match spec.domain.coerce(spec.id, value) {
                Ok(normalized) => {
                    snapshot.set(spec.id, normalized.value);
                    rejected.extend(normalized.adjusted);
                }
                Err(err) => rejected.push(err),
            }
        }

        DecodedSnapshot { snapshot, rejected }
    }
}

/// Keys written by earlier toolkit releases.
pub const LEGACY_KEYS: [&str; 5] = [
    "invertedColors",
    "colorblind",
    "colorblind_modes",
    "readableFonts",
    "readingMaskMode",
];

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(on) => *on,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.trim(), "true" | "1"),
        _ => false,
    }
}

fn migrate_legacy(raw: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    if raw.get("invertedColors").is_some_and(is_truthy) {
        out.insert(ToggleId::ColorIntensityMode.key().into(), Value::from(3));
    }
    if let Some(modes) = raw.get("colorblind_modes").or_else(|| raw.get("colorblind")) {
        out.insert(ToggleId::ColorblindModes.key().into(), modes.clone());
    }
    if raw.get("readableFonts").is_some_and(is_truthy) {
        out.insert(ToggleId::FontMode.key().into(), Value::from(1));
    }
    match raw.get("readingMaskMode").and_then(Value::as_u64) {
        Some(1) => {
            out.insert(ToggleId::HorizontalMaskLevel.key().into(), Value::from(1));
        }
        Some(2) => {
            out.insert(ToggleId::VerticalMaskLevel.key().into(), Value::from(1));
        }
        _ => {}
    }
    out
}

impl Serialize for PreferenceSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_raw().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PreferenceSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_raw(&raw).snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ColorblindMode;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn defaults_cover_every_toggle() {
        let snapshot = PreferenceSnapshot::defaults();
        assert_eq!(snapshot.iter().count(), ToggleId::ALL.len());
        assert_eq!(snapshot.level(ToggleId::FontSize), 100);
        assert!(snapshot.active().next().is_none());
        assert_eq!(snapshot.to_raw().len(), 16);
    }

    #[test]
    fn unknown_keys_are_ignored_and_missing_filled() {
        let decoded = PreferenceSnapshot::from_raw(&object(json!({
            "lineSpacing": 2,
            "sparkles": true,
        })));
        assert!(decoded.rejected.is_empty());
        assert_eq!(decoded.snapshot.level(ToggleId::LineSpacing), 2);
        assert!(!decoded.snapshot.flag(ToggleId::HighContrast));
        assert_eq!(
            decoded.snapshot.active().collect::<Vec<_>>(),
            vec![ToggleId::LineSpacing]
        );
    }

    #[test]
    fn bad_values_fall_back_to_default() {
        let decoded = PreferenceSnapshot::from_raw(&object(json!({
            "hideImages": "sometimes",
            "fontSize": 400,
        })));
        assert!(!decoded.snapshot.flag(ToggleId::HideImages));
        assert_eq!(decoded.snapshot.level(ToggleId::FontSize), 150);
        assert_eq!(decoded.rejected.len(), 2);
    }

    #[test]
    fn legacy_keys_are_migrated() {
        let decoded = PreferenceSnapshot::from_raw(&object(json!({
            "invertedColors": true,
            "colorblind": "protanopia",
            "readableFonts": "1",
            "readingMaskMode": 2,
        })));
        let snapshot = decoded.snapshot;
        assert_eq!(snapshot.level(ToggleId::ColorIntensityMode), 3);
        assert_eq!(
            snapshot.modes(ToggleId::ColorblindModes),
            ModeSet::from([ColorblindMode::Protanopia])
        );
        assert_eq!(snapshot.level(ToggleId::FontMode), 1);
        assert_eq!(snapshot.level(ToggleId::VerticalMaskLevel), 1);
        assert_eq!(snapshot.level(ToggleId::HorizontalMaskLevel), 0);
    }

    #[test]
    fn canonical_keys_win_over_legacy() {
        let decoded = PreferenceSnapshot::from_raw(&object(json!({
            "colorblindModes": ["tritanopia"],
            "colorblind_modes": ["deuteranopia"],
            "fontMode": 2,
            "readableFonts": true,
        })));
        assert_eq!(
            decoded.snapshot.modes(ToggleId::ColorblindModes),
            ModeSet::from([ColorblindMode::Tritanopia])
        );
        assert_eq!(decoded.snapshot.level(ToggleId::FontMode), 2);
    }

    #[test]
    fn serde_uses_raw_shape() {
        let mut snapshot = PreferenceSnapshot::defaults();
        snapshot.set(ToggleId::HighContrast, ToggleValue::Flag(true));
        let encoded = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(encoded["highContrast"], json!(true));
        assert_eq!(encoded["colorblindModes"], json!([]));
        let decoded: PreferenceSnapshot = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, snapshot);
    }
}
