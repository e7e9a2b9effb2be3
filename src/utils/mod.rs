//! Utility functions for tubedrop

pub mod disposition;
pub mod filename;
pub mod url;

pub use self::disposition::*;
pub use self::filename::*;
pub use self::url::*;
