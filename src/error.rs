//! Error types for tubedrop

use std::error::Error as _;
use thiserror::Error;

/// Main error type for tubedrop operations
#[derive(Debug, Error)]
pub enum TubedropError {
    #[error("URL is empty")]
    EmptyUrl,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Extractor binary not found: {0}")]
    ExtractorNotFound(String),

    /// `stderr` holds the tool's complete error output
    #[error("Extractor failed ({status}): {}", last_line(.stderr))]
    ExtractorFailed { status: String, stderr: String },

    #[error("Downloaded file not found")]
    OutputNotFound,

    #[error("More than one candidate output file: {}", .0.join(", "))]
    AmbiguousOutput(Vec<String>),

    #[error("Login rejected: {0}")]
    LoginRejected(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),
}

impl TubedropError {
    /// Check if error was caused by what the user typed or selected
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            TubedropError::EmptyUrl
                | TubedropError::InvalidUrl(_)
                | TubedropError::UnknownPreset(_)
                | TubedropError::UrlError(_)
        )
    }

    /// Check if error came out of the extraction tool itself
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            TubedropError::ExtractorNotFound(_) | TubedropError::ExtractorFailed { .. }
        )
    }

    /// Check if the fetch reported success but no usable file was left behind
    pub fn is_output_error(&self) -> bool {
        matches!(
            self,
            TubedropError::OutputNotFound | TubedropError::AmbiguousOutput(_)
        )
    }

    /// Everything known about the failure: the message, each source below
    /// it, and the extractor's full error output
    pub fn detail(&self) -> String {
        let mut lines = vec![self.to_string()];
        let mut source = self.source();
        while let Some(cause) = source {
            lines.push(cause.to_string());
            source = cause.source();
        }
        match self {
            TubedropError::ExtractorFailed { stderr, .. } => lines.push(stderr.clone()),
            TubedropError::AmbiguousOutput(names) => lines.extend(names.iter().cloned()),
            _ => {}
        }
        lines.join("\n")
    }
}

fn last_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .unwrap_or("no error output")
}
