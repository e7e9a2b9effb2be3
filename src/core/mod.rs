//! Core functionality for tubedrop

pub mod downloader;
pub mod options;
pub mod preset;
pub mod progress;
pub mod video_info;

pub use downloader::*;
pub use options::*;
pub use preset::*;
pub use progress::*;
pub use video_info::*;
