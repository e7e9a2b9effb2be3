//! Per-request stage tracking and user-facing notices

use std::fmt;

/// Where a single fetch request currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    ValidatingInput,
    ProbingMetadata,
    Fetching,
    LocatingOutput,
    Delivering,
    Failed,
}

impl Stage {
    /// Short status line shown while the stage is running
    pub fn describe(self) -> &'static str {
        match self {
            Stage::Idle => "Waiting",
            Stage::ValidatingInput => "Checking URL",
            Stage::ProbingMetadata => "Fetching video information",
            Stage::Fetching => "Downloading",
            Stage::LocatingOutput => "Looking for the downloaded file",
            Stage::Delivering => "Delivering file",
            Stage::Failed => "Failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::ValidatingInput => "validating-input",
            Stage::ProbingMetadata => "probing-metadata",
            Stage::Fetching => "fetching",
            Stage::LocatingOutput => "locating-output",
            Stage::Delivering => "delivering",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Severity of a user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    /// CSS class used by the page
    pub fn css_class(self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

/// A message for the user about the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// Extra diagnostic text, shown verbatim
    pub detail: Option<String>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            detail: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    /// Attach diagnostic detail
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f64 = bytes as f64;
    let exp = (bytes_f64.ln() / THRESHOLD.ln()).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);

    let value = bytes_f64 / THRESHOLD.powi(exp as i32);

    if exp == 0 {
        format!("{} {}", bytes, UNITS[exp])
    } else {
        format!("{:.1} {}", value, UNITS[exp])
    }
}
