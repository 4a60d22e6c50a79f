//! API specification selections
//!
//! A specification is supplied as an uploaded file, a URL, or (for the output
//! side only) a CAMARA definition addressed by repository and path. The three
//! representations share one enum slot per side, so choosing one always replaces
//! the other.

pub mod fetcher;

pub use fetcher::{resolve_spec_text, HttpSpecFetcher, MockSpecFetcher, SpecFetcher};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Name used when none can be derived from a selection
pub const FALLBACK_API_NAME: &str = "API";

const SPEC_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Which side of the adapter a specification describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecSide {
    Input,
    Output,
}

impl SpecSide {
    /// Record field name used as the validation error key
    pub fn field(self) -> &'static str {
        match self {
            SpecSide::Input => "inputSpec",
            SpecSide::Output => "outputSpec",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpecSide::Input => "Input",
            SpecSide::Output => "Output",
        }
    }
}

impl fmt::Display for SpecSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A concrete specification selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecSource {
    File {
        path: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Url {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Camara {
        name: String,
        path: String,
        repo: String,
    },
}

impl SpecSource {
    /// Display name of the selection: the explicit name if given, else the
    /// file name or the last URL path segment.
    pub fn display_name(&self) -> String {
        match self {
            SpecSource::File { path, name } => name
                .clone()
                .or_else(|| file_name(path))
                .unwrap_or_else(|| path.display().to_string()),
            SpecSource::Url { url, name } => name
                .clone()
                .or_else(|| last_url_segment(url))
                .unwrap_or_else(|| "URL Specification".to_string()),
            SpecSource::Camara { name, .. } => name.clone(),
        }
    }

    /// API name derived from the selection: everything before the first `.`
    /// of the file name, URL segment or definition name.
    pub fn api_name(&self) -> String {
        let base = match self {
            SpecSource::File { path, .. } => file_name(path),
            SpecSource::Url { url, .. } => last_url_segment(url),
            SpecSource::Camara { name, .. } => Some(name.clone()),
        };

        base.and_then(|b| b.split('.').next().map(str::to_string))
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| FALLBACK_API_NAME.to_string())
    }

    /// Check the selection is usable for `side`, returning the message to show
    /// against the side's field when it is not.
    pub fn check(&self, side: SpecSide) -> std::result::Result<(), String> {
        match self {
            SpecSource::File { path, .. } => {
                if has_spec_extension(path) {
                    Ok(())
                } else {
                    Err(format!("{side} specification must be a JSON or YAML file"))
                }
            }
            SpecSource::Url { url, .. } => match Url::parse(url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
                _ => Err(format!(
                    "{side} specification URL must be an http or https URL"
                )),
            },
            SpecSource::Camara { .. } => match side {
                SpecSide::Output => Ok(()),
                SpecSide::Input => Err(
                    "CAMARA definitions can only be used for the output specification".to_string(),
                ),
            },
        }
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

fn last_url_segment(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .next_back()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

fn has_spec_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SPEC_EXTENSIONS.contains(&ext.as_str()))
}
