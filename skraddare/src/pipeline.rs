//! Building every variant of a batch.
//!
//! Each (weight, slant) pair goes through the same fixed sequence of
//! [`Stage`]s. A batch is all or nothing: inputs are checked before any
//! font is loaded, and nothing is written until every variant has been
//! encoded.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::{Serialize, Serializer};

use crate::{
    bake::bake_alternates,
    codec::{decode, encode},
    config::{Customization, TagSelection},
    merge::merge_features_into_calt,
    metrics::{apply_letter_spacing, apply_line_height},
    model::FontModel,
    naming::{apply_names, FontNames},
    source::{self, Slant},
    Error,
};

/// Written next to the fonts, describing how they were made.
pub const SETTINGS_FILE_NAME: &str = "custom-settings.json";

/// The steps one variant goes through, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Load,
    BakeAlternates,
    ApplySpacing,
    ApplyLineHeight,
    MergeFeatures,
    ApplyNaming,
    Encode,
    Write,
}

impl Stage {
    pub const ORDER: [Stage; 8] = [
        Stage::Load,
        Stage::BakeAlternates,
        Stage::ApplySpacing,
        Stage::ApplyLineHeight,
        Stage::MergeFeatures,
        Stage::ApplyNaming,
        Stage::Encode,
        Stage::Write,
    ];

    /// The stages that edit the decoded font.
    pub fn transforms() -> &'static [Stage] {
        &Self::ORDER[1..6]
    }

    fn apply(self, font: &mut FontModel, job: &VariantJob, custom: &Customization) {
        match self {
            Stage::BakeAlternates => bake_alternates(font, &custom.alternates),
            Stage::ApplySpacing => apply_letter_spacing(font, custom.letter_spacing),
            Stage::ApplyLineHeight => apply_line_height(font, custom.line_height),
            Stage::MergeFeatures => merge_features_into_calt(font, &custom.features),
            Stage::ApplyNaming => {
                let names = FontNames::derive(&custom.font_name(), &job.style());
                apply_names(font, &names, job.weight);
            }
            Stage::Load | Stage::Encode | Stage::Write => (),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::BakeAlternates => "bake alternates",
            Stage::ApplySpacing => "apply spacing",
            Stage::ApplyLineHeight => "apply line height",
            Stage::MergeFeatures => "merge features",
            Stage::ApplyNaming => "apply naming",
            Stage::Encode => "encode",
            Stage::Write => "write",
        };
        f.write_str(name)
    }
}

/// One output font to produce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantJob {
    pub weight: u16,
    pub slant: Slant,
    pub input: PathBuf,
    pub output_name: String,
}

impl VariantJob {
    /// The style label, such as `400Italic`.
    pub fn style(&self) -> String {
        format!("{}{}", self.weight, self.slant)
    }
}

/// Run the transforms on one source font and encode the result.
pub fn build_variant(
    source: &[u8],
    job: &VariantJob,
    custom: &Customization,
) -> Result<Vec<u8>, Error> {
    let mut font = decode(source)?;
    for stage in Stage::transforms() {
        log::debug!("{}: {stage}", job.output_name);
        stage.apply(&mut font, job, custom);
    }
    log::debug!("{}: {}", job.output_name, Stage::Encode);
    encode(&font, source)
}

/// What a batch produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// The fonts written, in the order they were built.
    pub fonts: Vec<PathBuf>,
    pub settings: PathBuf,
}

/// The settings record: which options produced a directory of fonts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord<'a> {
    /// Always null: a batch covers a range of weights.
    pub weight: Option<u16>,
    pub italic: bool,
    pub alternates: &'a TagSelection,
    pub features: &'a TagSelection,
    #[serde(serialize_with = "serialize_number")]
    pub letter_spacing: f64,
    #[serde(serialize_with = "serialize_number")]
    pub line_height: f64,
    /// The suffix with its leading hyphen, or empty.
    pub font_name: String,
}

impl<'a> SettingsRecord<'a> {
    pub fn new(custom: &'a Customization) -> Self {
        SettingsRecord {
            weight: None,
            italic: false,
            alternates: &custom.alternates,
            features: &custom.features,
            letter_spacing: custom.letter_spacing,
            line_height: custom.line_height,
            font_name: custom.name_suffix(),
        }
    }
}

// whole numbers are written without a fraction, so `0` rather than `0.0`
fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// The jobs for every weight and slant, checking that all inputs exist.
pub fn plan_jobs(custom: &Customization, source_dir: &Path) -> Result<Vec<VariantJob>, Error> {
    let version = source::detect_version(source_dir)?;
    let font_name = custom.font_name();
    let mut jobs = Vec::new();
    for weight in custom.weights.iter() {
        for slant in Slant::ALL {
            let input = source::source_path(source_dir, &version, weight, slant);
            if !input.is_file() {
                return Err(Error::MissingInput(input));
            }
            jobs.push(VariantJob {
                weight,
                slant,
                input,
                output_name: source::output_file_name(&font_name, weight, slant),
            });
        }
    }
    Ok(jobs)
}

/// Build every variant from `source_dir` into `out_dir`.
pub fn run_batch(
    custom: &Customization,
    source_dir: &Path,
    out_dir: &Path,
) -> Result<BatchReport, Error> {
    let jobs = plan_jobs(custom, source_dir)?;
    log::info!(
        "Building {} fonts for weights {}",
        jobs.len(),
        custom.weights
    );

    let mut outputs = Vec::with_capacity(jobs.len());
    for job in &jobs {
        log::debug!("{}: {}", job.output_name, Stage::Load);
        let source = std::fs::read(&job.input).map_err(|e| Error::io(&job.input, e))?;
        outputs.push((job, build_variant(&source, job, custom)?));
    }
    let settings = serde_json::to_vec(&SettingsRecord::new(custom))?;

    std::fs::create_dir_all(out_dir).map_err(|e| Error::io(out_dir, e))?;
    let mut report = BatchReport {
        fonts: Vec::with_capacity(outputs.len()),
        settings: out_dir.join(SETTINGS_FILE_NAME),
    };
    for (job, bytes) in outputs {
        log::debug!("{}: {}", job.output_name, Stage::Write);
        let path = out_dir.join(&job.output_name);
        std::fs::write(&path, bytes).map_err(|e| Error::io(&path, e))?;
        log::info!("Wrote {}", job.output_name);
        report.fonts.push(path);
    }
    std::fs::write(&report.settings, settings).map_err(|e| Error::io(&report.settings, e))?;
    Ok(report)
}
