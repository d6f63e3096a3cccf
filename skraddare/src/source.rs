//! Where source fonts live and what outputs are called.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use regex::Regex;

use crate::Error;

/// The family name source files and outputs start with.
pub const FAMILY_PREFIX: &str = "CommitMono";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slant {
    Regular,
    Italic,
}

impl Slant {
    pub const ALL: [Slant; 2] = [Slant::Regular, Slant::Italic];

    pub fn is_italic(self) -> bool {
        self == Slant::Italic
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Slant::Regular => "Regular",
            Slant::Italic => "Italic",
        }
    }
}

impl fmt::Display for Slant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn source_file_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^CommitMono(V(\d+))-(\d+)(Italic|Regular)\.otf$").expect("valid regex")
    })
}

/// Find the newest version tag (such as `V143`) among the sources in `dir`.
pub fn detect_version(dir: &Path) -> Result<String, Error> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    let mut latest: Option<(u64, String)> = None;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let file_name = entry.file_name();
        let Some(captures) = file_name.to_str().and_then(|name| source_file_pattern().captures(name))
        else {
            continue;
        };
        let Ok(number) = captures[2].parse::<u64>() else {
            continue;
        };
        if latest.as_ref().map_or(true, |(newest, _)| number > *newest) {
            latest = Some((number, captures[1].to_owned()));
        }
    }
    let (_, version) = latest.ok_or_else(|| Error::NoSourceVersion(dir.to_owned()))?;
    log::debug!("Using source version {version} from {}", dir.display());
    Ok(version)
}

/// The source font for one weight and slant.
pub fn source_path(dir: &Path, version: &str, weight: u16, slant: Slant) -> PathBuf {
    dir.join(format!("{FAMILY_PREFIX}{version}-{weight}{slant}.otf"))
}

pub fn output_file_name(font_name: &str, weight: u16, slant: Slant) -> String {
    format!("{font_name}-{weight}-{slant}.otf")
}
