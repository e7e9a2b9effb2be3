//! Bridge to the external extraction/download tool

pub mod ytdlp;

#[cfg(test)]
pub(crate) mod testing;

use crate::core::{ExtractorOptions, VideoInfo};
use crate::Result;
use async_trait::async_trait;

pub use ytdlp::YtDlp;

/// Something that can probe and download media for a URL
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Metadata-only call; must not download media
    async fn extract_info(&self, url: &str, options: &ExtractorOptions) -> Result<VideoInfo>;

    /// Download `url` according to `options`, writing where `options.outtmpl` says
    async fn download(&self, url: &str, options: &ExtractorOptions) -> Result<()>;
}
