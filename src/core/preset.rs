//! Fixed download presets offered on the form

use crate::error::TubedropError;
use std::fmt;
use std::str::FromStr;

/// Post-processing step requested from the extraction tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostProcessorSpec {
    /// Post-processor key as the extraction tool names it
    pub key: &'static str,
    /// Target codec
    pub codec: &'static str,
    /// Target quality (bitrate in kbps when above 10)
    pub quality: &'static str,
}

/// Static description of a preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetSpec {
    /// Stable identifier used as the form value
    pub id: &'static str,
    /// Label shown to the user
    pub label: &'static str,
    /// Extension the delivered file is expected to have
    pub ext: &'static str,
    /// Format selector expression
    pub format: &'static str,
    /// Container to merge separate video/audio streams into
    pub merge_output_format: Option<&'static str>,
    /// Optional post-processing step
    pub postprocessor: Option<PostProcessorSpec>,
}

/// One of the five presets the page offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Preset {
    /// Best MP4 video with audio
    #[default]
    Mp4Best,
    /// Best M4A audio stream
    M4aBestAudio,
    /// Best audio, converted to 192 kbps MP3
    Mp3BestAudio,
    /// MP4 capped at 720p
    Mp4720p,
    /// MP4 capped at 360p
    Mp4360p,
}

static PRESETS: [PresetSpec; 5] = [
    PresetSpec {
        id: "mp4_best",
        label: "MP4 (最高画質)",
        ext: "mp4",
        format: "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best",
        merge_output_format: Some("mp4"),
        postprocessor: None,
    },
    PresetSpec {
        id: "m4a_best_audio",
        label: "M4A (音声のみ - 高音質)",
        ext: "m4a",
        format: "bestaudio[ext=m4a]/bestaudio",
        merge_output_format: None,
        postprocessor: None,
    },
    PresetSpec {
        id: "mp3_best_audio",
        label: "MP3 (音声のみ - 標準音質)",
        ext: "mp3",
        format: "bestaudio/best",
        merge_output_format: None,
        postprocessor: Some(PostProcessorSpec {
            key: "FFmpegExtractAudio",
            codec: "mp3",
            quality: "192",
        }),
    },
    PresetSpec {
        id: "mp4_720p",
        label: "MP4 (720p)",
        ext: "mp4",
        format: "bestvideo[height<=720][ext=mp4]+bestaudio[ext=m4a]/best[height<=720][ext=mp4]/best[height<=720]",
        merge_output_format: Some("mp4"),
        postprocessor: None,
    },
    PresetSpec {
        id: "mp4_360p",
        label: "MP4 (360p)",
        ext: "mp4",
        format: "bestvideo[height<=360][ext=mp4]+bestaudio[ext=m4a]/best[height<=360][ext=mp4]/best[height<=360]",
        merge_output_format: Some("mp4"),
        postprocessor: None,
    },
];

impl Preset {
    /// All presets in display order
    pub const ALL: [Preset; 5] = [
        Preset::Mp4Best,
        Preset::M4aBestAudio,
        Preset::Mp3BestAudio,
        Preset::Mp4720p,
        Preset::Mp4360p,
    ];

    /// Static description of this preset
    pub fn spec(self) -> &'static PresetSpec {
        &PRESETS[self as usize]
    }

    pub fn id(self) -> &'static str {
        self.spec().id
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }

    pub fn ext(self) -> &'static str {
        self.spec().ext
    }

    /// Look a preset up by its form identifier
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }

    /// Look a preset up by its user-facing label
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == label)
    }
}

impl FromStr for Preset {
    type Err = TubedropError;

    /// Accepts either the identifier or the label
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::from_id(s)
            .or_else(|| Self::from_label(s))
            .ok_or_else(|| TubedropError::UnknownPreset(s.to_string()))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
