//! Temporary workspaces and output discovery

pub mod locator;
pub mod workspace;

pub use locator::*;
pub use workspace::*;
