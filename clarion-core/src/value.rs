//! Values a toggle can hold.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Colorblind simulation filters that may be active at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorblindMode {
    Protanopia,
    Deuteranopia,
    Tritanopia,
}

impl ColorblindMode {
    pub const ALL: [Self; 3] = [Self::Protanopia, Self::Deuteranopia, Self::Tritanopia];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Protanopia => "protanopia",
            Self::Deuteranopia => "deuteranopia",
            Self::Tritanopia => "tritanopia",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Protanopia => "Protanopia",
            Self::Deuteranopia => "Deuteranopia",
            Self::Tritanopia => "Tritanopia",
        }
    }

    /// Parse a mode name, case-insensitively. Unknown names yield `None`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ColorblindMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type ModeSet = BTreeSet<ColorblindMode>;

/// The current value of a single toggle.
///
/// Serializes to the plain JSON shape used by both the local cache and the remote
/// store: a boolean, an integer, or an array of mode names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToggleValue {
    Flag(bool),
    Level(u16),
    Modes(ModeSet),
}

impl ToggleValue {
    #[must_use]
    pub const fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(on) => Some(*on),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_level(&self) -> Option<u16> {
        match self {
            Self::Level(level) => Some(*level),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_modes(&self) -> Option<&ModeSet> {
        match self {
            Self::Modes(modes) => Some(modes),
            _ => None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Flag(_) => "flag",
            Self::Level(_) => "level",
            Self::Modes(_) => "mode set",
        }
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Flag(on) => serde_json::Value::Bool(*on),
            Self::Level(level) => serde_json::Value::from(*level),
            Self::Modes(modes) => serde_json::Value::Array(
                modes
                    .iter()
                    .map(|mode| serde_json::Value::from(mode.as_str()))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for ToggleValue {
    fn from(on: bool) -> Self {
        Self::Flag(on)
    }
}

impl From<u16> for ToggleValue {
    fn from(level: u16) -> Self {
        Self::Level(level)
    }
}

impl From<ModeSet> for ToggleValue {
    fn from(modes: ModeSet) -> Self {
        Self::Modes(modes)
    }
}

impl<const N: usize> From<[ColorblindMode; N]> for ToggleValue {
    fn from(modes: [ColorblindMode; N]) -> Self {
        Self::Modes(modes.into_iter().collect())
    }
}

impl fmt::Display for ToggleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(on) => write!(f, "{on}"),
            Self::Level(level) => write!(f, "{level}"),
            Self::Modes(modes) => {
                let names: Vec<&str> = modes.iter().map(|mode| mode.as_str()).collect();
                write!(f, "[{}]", names.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_mode_names_case_insensitively() {
        assert_eq!(
            ColorblindMode::parse(" Tritanopia "),
            Some(ColorblindMode::Tritanopia)
        );
        assert_eq!(ColorblindMode::parse("achromatopsia"), None);
    }

    #[test]
    fn values_serialize_to_plain_json() {
        let modes = ToggleValue::from([ColorblindMode::Tritanopia, ColorblindMode::Protanopia]);
        assert_eq!(modes.to_json(), json!(["protanopia", "tritanopia"]));
        assert_eq!(
            serde_json::to_value(&modes).unwrap(),
            json!(["protanopia", "tritanopia"])
        );
        assert_eq!(serde_json::to_value(ToggleValue::Level(120)).unwrap(), json!(120));
        assert_eq!(serde_json::to_value(ToggleValue::Flag(true)).unwrap(), json!(true));
    }

    #[test]
    fn accessors_match_variant() {
        assert_eq!(ToggleValue::Level(2).as_level(), Some(2));
        assert_eq!(ToggleValue::Level(2).as_flag(), None);
        assert!(ToggleValue::Modes(ModeSet::new()).as_modes().is_some());
    }
}
