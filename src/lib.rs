//! # tubedrop - video downloads behind a login page
//!
//! A small web front end over the `yt-dlp` command line tool. A signed-in
//! user pastes a video URL, picks one of five format presets, and gets the
//! resulting file back as a browser download.
//!
//! ## Features
//!
//! - Five fixed presets (MP4 best/720p/360p, M4A, MP3)
//! - Title probing with a placeholder fallback
//! - Per-request temporary directories, removed after delivery
//! - Output discovery when the tool picks a different container
//! - A `fetch` command for use without the web page
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tubedrop::{Downloader, FetchRequest, Preset, YtDlp};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = Downloader::new(Arc::new(YtDlp::new()));
//!     let request = FetchRequest::new("VIDEO_URL", Preset::Mp3BestAudio);
//!
//!     let outcome = downloader.fetch(&request).await?;
//!     println!("Downloaded: {}", outcome.output.filename);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod core;
pub mod download;
pub mod error;
pub mod extractor;
pub mod utils;
pub mod web;

// Re-export main types
pub use crate::core::{Downloader, ExtractorOptions, FetchOutcome, FetchRequest, Notice, Preset, Stage, VideoInfo};
pub use error::TubedropError;
pub use extractor::{Extractor, YtDlp};

/// Result type alias for tubedrop operations
pub type Result<T> = std::result::Result<T, TubedropError>;
