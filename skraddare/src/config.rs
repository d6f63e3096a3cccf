//! Validated build options.
//!
//! Everything here is checked before any font file is opened, so a bad
//! option never leaves a half-written output directory behind.

use std::{fmt, sync::OnceLock};

use regex::Regex;
use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::{source::FAMILY_PREFIX, Error};

/// Stylistic sets that can be folded into the always-on contextual feature.
pub const FEATURE_TAGS: &[&str] = &["ss01", "ss02", "ss03", "ss04", "ss05"];

/// Character variants that can be baked into the default outlines.
pub const ALTERNATE_TAGS: &[&str] = &[
    "cv01", "cv02", "cv03", "cv04", "cv05", "cv06", "cv07", "cv08", "cv09", "cv10", "cv11",
];

/// Every tag of a closed vocabulary, each either enabled or not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagSelection {
    vocabulary: &'static [&'static str],
    enabled: Vec<bool>,
}

impl TagSelection {
    /// Enable `requested`, which must all be members of `vocabulary`.
    pub fn new<S: AsRef<str>>(
        vocabulary: &'static [&'static str],
        requested: &[S],
    ) -> Result<Self, Error> {
        let mut selection = Self::none(vocabulary);
        for tag in requested {
            let tag = tag.as_ref();
            let index = vocabulary
                .iter()
                .position(|known| *known == tag)
                .ok_or_else(|| Error::UnknownTag {
                    tag: tag.to_owned(),
                    expected: vocabulary.join(", "),
                })?;
            selection.enabled[index] = true;
        }
        Ok(selection)
    }

    pub fn none(vocabulary: &'static [&'static str]) -> Self {
        TagSelection {
            vocabulary,
            enabled: vec![false; vocabulary.len()],
        }
    }

    pub fn is_enabled(&self, tag: &str) -> bool {
        self.iter().any(|(known, on)| on && known == tag)
    }

    /// The enabled tags, in vocabulary order.
    pub fn enabled(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.iter().filter_map(|(tag, on)| on.then_some(tag))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        self.vocabulary
            .iter()
            .copied()
            .zip(self.enabled.iter().copied())
    }
}

impl Serialize for TagSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.vocabulary.len()))?;
        for (tag, on) in self.iter() {
            map.serialize_entry(tag, &on)?;
        }
        map.end()
    }
}

/// Split a comma separated list, dropping blank entries.
pub fn parse_tag_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Parse a finite number; `name` is used in the error.
pub fn parse_number(name: &'static str, value: &str) -> Result<f64, Error> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| Error::InvalidNumber {
            name,
            value: value.to_owned(),
        })
}

/// Parse a weight, which has to be a whole number that fits a weight class.
pub fn parse_weight(name: &'static str, value: &str) -> Result<u16, Error> {
    let number = parse_number(name, value)?;
    if number.fract() != 0.0 || !(0.0..=u16::MAX as f64).contains(&number) {
        return Err(Error::InvalidNumber {
            name,
            value: value.to_owned(),
        });
    }
    Ok(number as u16)
}

/// Trim a name suffix and check it is safe to put in a file name.
///
/// Returns `None` for a blank suffix.
pub fn validate_suffix(suffix: &str) -> Result<Option<String>, Error> {
    static SAFE: OnceLock<Regex> = OnceLock::new();
    let suffix = suffix.trim();
    if suffix.is_empty() {
        return Ok(None);
    }
    let safe = SAFE.get_or_init(|| Regex::new("^[A-Za-z0-9_-]+$").expect("valid regex"));
    if !safe.is_match(suffix) {
        return Err(Error::InvalidSuffix(suffix.to_owned()));
    }
    Ok(Some(suffix.to_owned()))
}

/// An inclusive, stepped range of weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeightRange {
    min: u16,
    max: u16,
    step: u16,
}

impl WeightRange {
    pub fn new(min: u16, max: u16, step: u16) -> Result<Self, Error> {
        if step == 0 || min > max {
            return Err(Error::InvalidWeightRange { min, max, step });
        }
        Ok(WeightRange { min, max, step })
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> {
        (self.min..=self.max).step_by(self.step as usize)
    }
}

impl fmt::Display for WeightRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={} step {}", self.min, self.max, self.step)
    }
}

/// One batch worth of options.
#[derive(Clone, Debug, PartialEq)]
pub struct Customization {
    pub weights: WeightRange,
    pub letter_spacing: f64,
    pub line_height: f64,
    pub features: TagSelection,
    pub alternates: TagSelection,
    pub suffix: Option<String>,
}

impl Customization {
    pub fn new<S: AsRef<str>>(
        weights: WeightRange,
        letter_spacing: f64,
        line_height: f64,
        features: &[S],
        alternates: &[S],
        suffix: &str,
    ) -> Result<Self, Error> {
        for (name, value) in [
            ("LETTER_SPACING", letter_spacing),
            ("LINE_HEIGHT", line_height),
        ] {
            if !value.is_finite() {
                return Err(Error::InvalidNumber {
                    name,
                    value: value.to_string(),
                });
            }
        }
        let suffix = validate_suffix(suffix)?;
        Ok(Customization {
            weights,
            letter_spacing,
            line_height,
            features: TagSelection::new(FEATURE_TAGS, features)?,
            alternates: TagSelection::new(ALTERNATE_TAGS, alternates)?,
            suffix,
        })
    }

    /// `-<suffix>`, or empty without a suffix.
    pub fn name_suffix(&self) -> String {
        self.suffix
            .as_ref()
            .map(|suffix| format!("-{suffix}"))
            .unwrap_or_default()
    }

    /// The family name the variants are given.
    pub fn font_name(&self) -> String {
        format!("{FAMILY_PREFIX}{}", self.name_suffix())
    }
}
