//! Video information returned by the metadata probe

use serde::{Deserialize, Serialize};

/// Subset of the extraction tool's info dictionary.
///
/// Every field is optional; sources differ wildly in what they report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Source-specific video ID
    #[serde(default)]
    pub id: Option<String>,
    /// Video title
    #[serde(default)]
    pub title: Option<String>,
    /// Uploader/channel name
    #[serde(default)]
    pub uploader: Option<String>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    /// Extension of the format the tool would pick by default
    #[serde(default)]
    pub ext: Option<String>,
    /// Canonical page URL
    #[serde(default)]
    pub webpage_url: Option<String>,
    /// Thumbnail URL
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl VideoInfo {
    /// Create a VideoInfo carrying just a title
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Parse the JSON document printed by the tool
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Title as reported, if present and not blank
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }
}
