//! Options bundle handed to the extraction tool

use crate::core::preset::Preset;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Placeholder in the output template that the extraction tool fills in
pub const EXT_PLACEHOLDER: &str = "%(ext)s";

/// A post-processing step, named the way the extraction tool names it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostProcessor {
    pub key: String,
    #[serde(rename = "preferredcodec")]
    pub preferred_codec: String,
    #[serde(rename = "preferredquality")]
    pub preferred_quality: String,
}

/// Full set of directives for one extraction tool invocation.
///
/// Rebuilt for every call, never reused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorOptions {
    /// Only take the single video when the URL points into a playlist
    pub noplaylist: bool,
    /// Skip TLS certificate validation
    pub nocheckcertificate: bool,
    /// Suppress the tool's own console output
    pub quiet: bool,
    /// Metadata only, no media download
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub skip_download: bool,
    /// Format selector expression
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Container used when separate streams get merged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_output_format: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub postprocessors: Vec<PostProcessor>,
    /// Output path template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outtmpl: Option<String>,
}

impl ExtractorOptions {
    /// Bundle for the metadata-only probe
    pub fn probe() -> Self {
        Self {
            noplaylist: true,
            nocheckcertificate: true,
            quiet: true,
            skip_download: true,
            ..Default::default()
        }
    }

    /// Bundle for the actual fetch of `preset` into `dir`, naming the file after `title`
    pub fn for_preset(preset: Preset, dir: &Path, title: &str) -> Self {
        let spec = preset.spec();
        Self {
            noplaylist: true,
            nocheckcertificate: true,
            quiet: true,
            skip_download: false,
            format: Some(spec.format.to_string()),
            merge_output_format: spec.merge_output_format.map(str::to_string),
            postprocessors: spec
                .postprocessor
                .iter()
                .map(|pp| PostProcessor {
                    key: pp.key.to_string(),
                    preferred_codec: pp.codec.to_string(),
                    preferred_quality: pp.quality.to_string(),
                })
                .collect(),
            outtmpl: Some(output_template(dir, title)),
        }
    }
}

/// Build `<dir>/<title>.%(ext)s`.
///
/// `%` in the title is doubled so the tool reads it literally.
pub fn output_template(dir: &Path, title: &str) -> String {
    let escaped = title.replace('%', "%%");
    dir.join(format!("{}.{}", escaped, EXT_PLACEHOLDER))
        .to_string_lossy()
        .into_owned()
}
