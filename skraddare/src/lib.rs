//! Tailor customized builds of a monospaced typeface.
//!
//! A source OTF is decoded into a [`FontModel`], run through a fixed
//! sequence of transforms (alternate baking, letter spacing, line height,
//! feature merging, naming) and encoded back into a CFF-flavoured OTF.
//! [`run_batch`] drives that for every weight and slant of a build.

mod bake;
mod cff;
mod codec;
mod config;
mod layout;
mod merge;
mod metrics;
mod model;
mod names;
mod naming;
mod pipeline;
mod source;
#[cfg(test)]
mod testing;

use std::path::PathBuf;

use thiserror::Error;
use write_fonts::{
    read::{types::Tag, ReadError},
    BuilderError,
};

pub use bake::bake_alternates;
pub use cff::{CffFont, Dict, Operand, Operator};
pub use codec::{decode, encode};
pub use config::{
    parse_number, parse_tag_list, parse_weight, validate_suffix, Customization, TagSelection,
    WeightRange, ALTERNATE_TAGS, FEATURE_TAGS,
};
pub use layout::{
    Coverage, FeatureRecord, GlyphRange, Gsub, LangSys, Lookup, LookupArena, LookupId,
    ScriptRecord, Subtable,
};
pub use merge::{merge_features_into_calt, CONTEXTUAL_ALTERNATES};
pub use metrics::{
    apply_letter_spacing, apply_line_height, LETTER_SPACING_SCALE, LINE_HEIGHT_SCALE,
    REFERENCE_ADVANCE_WIDTH,
};
pub use model::{FontModel, Glyph, HeadMetrics, HheaMetrics, Os2Metrics, Path, PathCommand, PostInfo};
pub use names::{NameTable, Platform};
pub use naming::{apply_names, mac_style_index, style_selection_flags, FontNames};
pub use pipeline::{
    build_variant, plan_jobs, run_batch, BatchReport, SettingsRecord, Stage, VariantJob,
    SETTINGS_FILE_NAME,
};
pub use source::{detect_version, output_file_name, source_path, Slant, FAMILY_PREFIX};

/// Everything that can go wrong while tailoring a batch.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid {name}: {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("Unknown tag: {tag} (expected one of: {expected})")]
    UnknownTag { tag: String, expected: String },
    #[error("Invalid suffix: {0:?} (expected [A-Za-z0-9_-]+)")]
    InvalidSuffix(String),
    #[error("Invalid weight range {min}..={max} step {step}")]
    InvalidWeightRange { min: u16, max: u16, step: u16 },
    #[error("Could not detect a CommitMono version in {0}")]
    NoSourceVersion(PathBuf),
    #[error("Missing input font: {0}")]
    MissingInput(PathBuf),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Error reading font data: {0}")]
    Read(#[from] ReadError),
    #[error("Font has no '{0}' table")]
    MissingTable(Tag),
    #[error("Bad CFF data: {0}")]
    Cff(String),
    #[error("Failed to draw glyph {glyph}: {reason}")]
    Outline { glyph: u32, reason: String },
    #[error("Failed to compile table: {0}")]
    Build(#[from] BuilderError),
    #[error("Failed to write settings record: {0}")]
    Settings(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
