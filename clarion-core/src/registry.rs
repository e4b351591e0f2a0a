//! Declarative table of every accessibility toggle.
//!
//! The registry is static and never mutated. It answers four questions for the engine:
//! what values a toggle accepts, what its default is, which scope classes reflect a
//! value, and which other toggles it excludes.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::fmt;

use crate::error::A11yError;
use crate::value::{ColorblindMode, ModeSet, ToggleValue};

/// Stable identifier of a toggle. The serialized form is the persistence key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToggleId {
    FontSize,
    HighContrast,
    ColorIntensityMode,
    FontMode,
    LineSpacing,
    LetterSpacing,
    TextToSpeech,
    ReadingHelper,
    EmphasizeLinks,
    HeaderHighlight,
    ColorblindModes,
    HorizontalMaskLevel,
    VerticalMaskLevel,
    CustomCursor,
    HideImages,
    HighlightedLetters,
}

impl ToggleId {
    pub const ALL: [Self; 16] = [
        Self::FontSize,
        Self::HighContrast,
        Self::ColorIntensityMode,
        Self::FontMode,
        Self::LineSpacing,
        Self::LetterSpacing,
        Self::TextToSpeech,
        Self::ReadingHelper,
        Self::EmphasizeLinks,
        Self::HeaderHighlight,
        Self::ColorblindModes,
        Self::HorizontalMaskLevel,
        Self::VerticalMaskLevel,
        Self::CustomCursor,
        Self::HideImages,
        Self::HighlightedLetters,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::FontSize => "fontSize",
            Self::HighContrast => "highContrast",
            Self::ColorIntensityMode => "colorIntensityMode",
            Self::FontMode => "fontMode",
            Self::LineSpacing => "lineSpacing",
            Self::LetterSpacing => "letterSpacing",
            Self::TextToSpeech => "textToSpeech",
            Self::ReadingHelper => "readingHelper",
            Self::EmphasizeLinks => "emphasizeLinks",
            Self::HeaderHighlight => "headerHighlight",
            Self::ColorblindModes => "colorblindModes",
            Self::HorizontalMaskLevel => "horizontalMaskLevel",
            Self::VerticalMaskLevel => "verticalMaskLevel",
            Self::CustomCursor => "customCursor",
            Self::HideImages => "hideImages",
            Self::HighlightedLetters => "highlightedLetters",
        }
    }

    /// Look up a toggle by its canonical persistence key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.key() == key)
    }

    /// Like [`Self::from_key`], but also accepts the short names host widgets use
    /// (`colorblind` for the filter set).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "colorblind" => Some(Self::ColorblindModes),
            other => Self::from_key(other),
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ToggleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Sets of toggles where at most one member may hold a non-default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupId {
    /// High contrast against the color intensity modes.
    Contrast,
    /// Horizontal against vertical reading mask.
    ReadingMask,
    /// Color intensity modes against the colorblind filter set.
    ColorFilter,
}

impl GroupId {
    pub const ALL: [Self; 3] = [Self::Contrast, Self::ReadingMask, Self::ColorFilter];
}

/// Legal values of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Flag,
    Level { min: u16, max: u16, step: u16 },
    Modes,
}

/// A value accepted by [`Domain::normalize`], plus the reason it was adjusted, if it was.
#[derive(Debug)]
pub struct Normalized {
    pub value: ToggleValue,
    pub adjusted: Option<A11yError>,
}

impl Normalized {
    const fn exact(value: ToggleValue) -> Self {
        Self {
            value,
            adjusted: None,
        }
    }
}

impl Domain {
    /// Fit a value into the domain.
    ///
    /// Levels are clamped to `min..=max` and snapped down onto the step grid. A value of
    /// the wrong kind is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`A11yError::InvalidValue`] when the value kind does not match the domain.
    pub fn normalize(self, toggle: ToggleId, value: ToggleValue) -> Result<Normalized, A11yError> {
        match (self, value) {
            (Self::Flag, value @ ToggleValue::Flag(_))
            | (Self::Modes, value @ ToggleValue::Modes(_)) => Ok(Normalized::exact(value)),
            (Self::Level { .. }, ToggleValue::Level(level)) => {
                Ok(self.fit_level(toggle, i64::from(level)))
            }
            (_, other) => Err(A11yError::invalid(
                toggle,
                format!("expected {}, got {}", self.kind(), other.kind()),
            )),
        }
    }

    /// Leniently decode a persisted JSON value into the domain.
    ///
    /// Flags accept booleans, `0`/`1` and their string forms; levels accept numbers,
    /// numeric strings and booleans; mode sets accept an array of names, a single name,
    /// or `"none"`. Unknown mode names are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`A11yError::InvalidValue`] when the JSON cannot be read as this domain.
    pub fn coerce(self, toggle: ToggleId, raw: &Value) -> Result<Normalized, A11yError> {
        match self {
            Self::Flag => coerce_flag(raw)
                .map(|on| Normalized::exact(ToggleValue::Flag(on)))
                .ok_or_else(|| A11yError::invalid(toggle, format!("expected a flag, got {raw}"))),
            Self::Level { .. } => coerce_integer(raw)
                .map(|level| self.fit_level(toggle, level))
                .ok_or_else(|| A11yError::invalid(toggle, format!("expected a level, got {raw}"))),
            Self::Modes => coerce_modes(toggle, raw),
        }
    }

    /// Value that follows `current` when the control is cycled. Levels wrap back to the
    /// minimum after the maximum; mode sets do not cycle.
    #[must_use]
    pub fn next(self, current: &ToggleValue) -> Option<ToggleValue> {
        match (self, current) {
            (Self::Flag, ToggleValue::Flag(on)) => Some(ToggleValue::Flag(!on)),
            (Self::Level { min, max, step }, ToggleValue::Level(level)) => {
                let next = level.saturating_add(step.max(1));
                Some(ToggleValue::Level(if next > max || *level < min {
                    min
                } else {
                    next
                }))
            }
            _ => None,
        }
    }

    #[must_use]
    pub const fn kind(self) -> &'static str {
        match self {
            Self::Flag => "a flag",
            Self::Level { .. } => "a level",
            Self::Modes => "a mode set",
        }
    }

    /// Every non-trivial value in the domain, in order. Mode sets yield single modes.
    #[must_use]
    pub fn values(self) -> Vec<ToggleValue> {
        match self {
            Self::Flag => vec![ToggleValue::Flag(false), ToggleValue::Flag(true)],
            Self::Level { min, max, step } => (min..=max)
                .step_by(usize::from(step.max(1)))
                .map(ToggleValue::Level)
                .collect(),
            Self::Modes => std::iter::once(ToggleValue::Modes(ModeSet::new()))
                .chain(
                    ColorblindMode::ALL
                        .into_iter()
                        .map(|mode| ToggleValue::Modes(ModeSet::from([mode]))),
                )
                .collect(),
        }
    }

    fn fit_level(self, toggle: ToggleId, raw: i64) -> Normalized {
        let Self::Level { min, max, step } = self else {
            return Normalized::exact(ToggleValue::Level(0));
        };
        let clamped = raw.clamp(i64::from(min), i64::from(max));
        let step = i64::from(step.max(1));
        let snapped = i64::from(min) + (clamped - i64::from(min)) / step * step;
        let level = u16::try_from(snapped).unwrap_or(min);
        let adjusted = (snapped != raw).then(|| {
            A11yError::invalid(toggle, format!("{raw} adjusted to {level} ({min}..={max})"))
        });
        Normalized {
            value: ToggleValue::Level(level),
            adjusted,
        }
    }
}

fn coerce_flag(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(on) => Some(*on),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => match s.trim() {
            "true" | "1" => Some(true),
            "false" | "0" | "" => Some(false),
            _ => None,
        },
        Value::Null => Some(false),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn coerce_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(on) => Some(i64::from(*on)),
        _ => None,
    }
}

fn coerce_modes(toggle: ToggleId, raw: &Value) -> Result<Normalized, A11yError> {
    let names: Vec<&str> = match raw {
        Value::Null => Vec::new(),
        Value::String(s) if s.trim().is_empty() || s.trim() == "none" => Vec::new(),
        Value::String(s) => s.split(',').collect(),
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        other => {
            return Err(A11yError::invalid(
                toggle,
                format!("expected mode names, got {other}"),
            ));
        }
    };
    Ok(modes_from_names(toggle, names))
}

/// Build a mode set from names, ignoring (and reporting) any that are not known modes.
pub(crate) fn modes_from_names<'a>(
    toggle: ToggleId,
    names: impl IntoIterator<Item = &'a str>,
) -> Normalized {
    let mut modes = ModeSet::new();
    let mut unknown = Vec::new();
    for name in names {
        if name.trim() == "none" {
            continue;
        }
        match ColorblindMode::parse(name) {
            Some(mode) => {
                modes.insert(mode);
            }
            None => unknown.push(name.trim().to_string()),
        }
    }
    let adjusted = (!unknown.is_empty())
        .then(|| A11yError::invalid(toggle, format!("ignored unknown modes: {}", unknown.join(", "))));
    Normalized {
        value: ToggleValue::Modes(modes),
        adjusted,
    }
}

/// How a toggle value maps onto scope classes. Stems are joined to the configured prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassTemplate {
    /// The toggle has no class; its effect is driven elsewhere.
    None,
    /// `<stem>` while the flag is on.
    Flag(&'static str),
    /// `<stem>-<value>` for every non-default value.
    Scaled(&'static str),
    /// `<stem>-level-<n>` for `n > 0`; with `base`, `<stem>` is added alongside.
    Leveled { stem: &'static str, base: bool },
    /// `names[n - 1]` for `n > 0`.
    Named(&'static [&'static str]),
    /// `<stem>-<mode>` for every active mode.
    PerMode(&'static str),
}

pub type ClassList = SmallVec<[String; 2]>;

/// Join a class stem to the prefix.
#[must_use]
pub fn class_name(prefix: &str, stem: &str) -> String {
    if prefix.is_empty() {
        stem.to_string()
    } else {
        format!("{prefix}-{stem}")
    }
}

impl ClassTemplate {
    /// Classes reflecting `value`. The default value never produces classes.
    #[must_use]
    pub fn classes(self, prefix: &str, value: &ToggleValue, default: &ToggleValue) -> ClassList {
        let mut out = ClassList::new();
        if value == default {
            return out;
        }
        match (self, value) {
            (Self::Flag(stem), ToggleValue::Flag(true)) => out.push(class_name(prefix, stem)),
            (Self::Scaled(stem), ToggleValue::Level(level)) => {
                out.push(class_name(prefix, &format!("{stem}-{level}")));
            }
            (Self::Leveled { stem, base }, ToggleValue::Level(level)) if *level > 0 => {
                if base {
                    out.push(class_name(prefix, stem));
                }
                out.push(class_name(prefix, &format!("{stem}-level-{level}")));
            }
            (Self::Named(names), ToggleValue::Level(level)) if *level > 0 => {
                if let Some(name) = names.get(usize::from(*level) - 1) {
                    out.push(class_name(prefix, name));
                }
            }
            (Self::PerMode(stem), ToggleValue::Modes(modes)) => {
                out.extend(
                    modes
                        .iter()
                        .map(|mode| class_name(prefix, &format!("{stem}-{mode}"))),
                );
            }
            _ => {}
        }
        out
    }

    /// Every class this template can ever produce within `domain`.
    #[must_use]
    pub fn all_classes(self, prefix: &str, domain: Domain, default: &ToggleValue) -> BTreeSet<String> {
        let mut all = BTreeSet::new();
        let values = match self {
            Self::PerMode(_) => vec![ToggleValue::Modes(ColorblindMode::ALL.into_iter().collect())],
            _ => domain.values(),
        };
        for value in &values {
            all.extend(self.classes(prefix, value, default));
        }
        all
    }
}

/// One registry row.
#[derive(Debug)]
pub struct ToggleSpec {
    pub id: ToggleId,
    pub label: &'static str,
    pub default: ToggleValue,
    pub domain: Domain,
    pub classes: ClassTemplate,
    pub groups: &'static [GroupId],
    /// Human names for each level, indexed by level. Empty when levels are numeric.
    pub level_labels: &'static [&'static str],
}

impl ToggleSpec {
    #[must_use]
    pub fn is_default(&self, value: &ToggleValue) -> bool {
        *value == self.default
    }

    #[must_use]
    pub fn classes_for(&self, prefix: &str, value: &ToggleValue) -> ClassList {
        self.classes.classes(prefix, value, &self.default)
    }

    #[must_use]
    pub fn all_classes(&self, prefix: &str) -> BTreeSet<String> {
        self.classes.all_classes(prefix, self.domain, &self.default)
    }

    #[must_use]
    pub fn in_group(&self, group: GroupId) -> bool {
        self.groups.contains(&group)
    }
}

const SPACING_LEVELS: &[&str] = &["off", "small", "medium", "large"];
const LEVEL_0_3: Domain = Domain::Level {
    min: 0,
    max: 3,
    step: 1,
};

static SPECS: [ToggleSpec; 16] = [
    ToggleSpec {
        id: ToggleId::FontSize,
        label: "Font size",
        default: ToggleValue::Level(100),
        domain: Domain::Level {
            min: 100,
            max: 150,
            step: 10,
        },
        classes: ClassTemplate::Scaled("text-size"),
        groups: &[],
        level_labels: &[],
    },
    ToggleSpec {
        id: ToggleId::HighContrast,
        label: "High contrast",
        default: ToggleValue::Flag(false),
        domain: Domain::Flag,
        classes: ClassTemplate::Flag("high-contrast"),
        groups: &[GroupId::Contrast],
        level_labels: &[],
    },
    ToggleSpec {
        id: ToggleId::ColorIntensityMode,
        label: "Color intensity",
        default: ToggleValue::Level(0),
        domain: LEVEL_0_3,
        classes: ClassTemplate::Leveled {
            stem: "color-intensity",
            base: false,
        },
        groups: &[GroupId::Contrast, GroupId::ColorFilter],
        level_labels: &["normal", "low intensity", "high intensity", "grayscale"],
    },
    ToggleSpec {
        id: ToggleId::FontMode,
        label: "Font",
        default: ToggleValue::Level(0),
        domain: Domain::Level {
            min: 0,
            max: 2,
            step: 1,
        },
        classes: ClassTemplate::Named(&["readable-fonts", "opendyslexic-fonts"]),
        groups: &[],
        level_labels: &["default", "readable", "OpenDyslexic"],
    },
    ToggleSpec {
        id: ToggleId::LineSpacing,
        label: "Line spacing",
        default: ToggleValue::Level(0),
        domain: LEVEL_0_3,
        classes: ClassTemplate::Leveled {
            stem: "line-spacing",
            base: false,
        },
        groups: &[],
        level_labels: SPACING_LEVELS,
    },
    ToggleSpec {
        id: ToggleId::LetterSpacing,
        label: "Letter spacing",
        default: ToggleValue::Level(0),
        domain: LEVEL_0_3,
        classes: ClassTemplate::Leveled {
            stem: "letter-spacing",
            base: false,
        },
        groups: &[],
        level_labels: SPACING_LEVELS,
    },
    ToggleSpec {
        id: ToggleId::TextToSpeech,
        label: "Text to speech",
        default: ToggleValue::Flag(false),
        domain: Domain::Flag,
        classes: ClassTemplate::None,
        groups: &[],
        level_labels: &[],
    },
    ToggleSpec {
        id: ToggleId::ReadingHelper,
        label: "Reading helper",
        default: ToggleValue::Flag(false),
        domain: Domain::Flag,
        classes: ClassTemplate::Flag("reading-helper"),
        groups: &[],
        level_labels: &[],
    },
    ToggleSpec {
        id: ToggleId::EmphasizeLinks,
        label: "Emphasize links",
        default: ToggleValue::Flag(false),
        domain: Domain::Flag,
        classes: ClassTemplate::Flag("emphasize-links"),
        groups: &[],
        level_labels: &[],
    },
    ToggleSpec {
        id: ToggleId::HeaderHighlight,
        label: "Highlight headers",
        default: ToggleValue::Flag(false),
        domain: Domain::Flag,
        classes: ClassTemplate::Flag("highlight-headers"),
        groups: &[],
        level_labels: &[],
    },
    ToggleSpec {
        id: ToggleId::ColorblindModes,
        label: "Colorblind filters",
        default: ToggleValue::Modes(BTreeSet::new()),
        domain: Domain::Modes,
        classes: ClassTemplate::PerMode("colorblind"),
        groups: &[GroupId::ColorFilter],
        level_labels: &[],
    },
    ToggleSpec {
        id: ToggleId::HorizontalMaskLevel,
        label: "Horizontal reading mask",
        default: ToggleValue::Level(0),
        domain: LEVEL_0_3,
        classes: ClassTemplate::Leveled {
            stem: "reading-mask-horizontal",
            base: true,
        },
        groups: &[GroupId::ReadingMask],
        level_labels: SPACING_LEVELS,
    },
    ToggleSpec {
        id: ToggleId::VerticalMaskLevel,
        label: "Vertical reading mask",
        default: ToggleValue::Level(0),
        domain: LEVEL_0_3,
        classes: ClassTemplate::Leveled {
            stem: "reading-mask-vertical",
            base: true,
        },
        groups: &[GroupId::ReadingMask],
        level_labels: SPACING_LEVELS,
    },
    ToggleSpec {
        id: ToggleId::CustomCursor,
        label: "Large cursor",
        default: ToggleValue::Flag(false),
        domain: Domain::Flag,
        classes: ClassTemplate::Flag("custom-cursor"),
        groups: &[],
        level_labels: &[],
    },
    ToggleSpec {
        id: ToggleId::HideImages,
        label: "Hide images",
        default: ToggleValue::Flag(false),
        domain: Domain::Flag,
        classes: ClassTemplate::Flag("hide-images"),
        groups: &[],
        level_labels: &[],
    },
    ToggleSpec {
        id: ToggleId::HighlightedLetters,
        label: "Highlighted letters",
        default: ToggleValue::Flag(false),
        domain: Domain::Flag,
        classes: ClassTemplate::Flag("highlighted-letters"),
        groups: &[],
        level_labels: &[],
    },
];

static STANDARD: EffectRegistry = EffectRegistry { specs: &SPECS };

/// Lookup table over the toggle specs.
#[derive(Debug)]
pub struct EffectRegistry {
    specs: &'static [ToggleSpec],
}

impl EffectRegistry {
    /// The registry shipped with the toolkit.
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    #[must_use]
    pub fn spec(&self, id: ToggleId) -> &ToggleSpec {
        &self.specs[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToggleSpec> {
        self.specs.iter()
    }

    /// Toggles sharing at least one exclusivity group with `id`, excluding `id` itself.
    #[must_use]
    pub fn siblings(&self, id: ToggleId) -> Vec<ToggleId> {
        let groups = self.spec(id).groups;
        self.specs
            .iter()
            .filter(|spec| spec.id != id && spec.groups.iter().any(|g| groups.contains(g)))
            .map(|spec| spec.id)
            .collect()
    }

    #[must_use]
    pub fn group_members(&self, group: GroupId) -> Vec<ToggleId> {
        self.specs
            .iter()
            .filter(|spec| spec.in_group(group))
            .map(|spec| spec.id)
            .collect()
    }

    /// Every class any toggle can place on the scope element.
    #[must_use]
    pub fn all_classes(&self, prefix: &str) -> BTreeSet<String> {
        self.specs
            .iter()
            .flat_map(|spec| spec.all_classes(prefix))
            .collect()
    }

    #[must_use]
    pub fn owns_class(&self, prefix: &str, class: &str) -> bool {
        self.all_classes(prefix).contains(class)
    }
}
