//! Per-request temporary directories

use std::io;
use std::path::Path;
use tempfile::{Builder, TempDir};
use tracing::debug;

const WORKSPACE_PREFIX: &str = "tubedrop-";

/// Create a fresh temporary directory, under `root` when given.
///
/// The directory and everything in it is removed when the returned
/// [`TempDir`] is dropped.
pub fn create_workspace(root: Option<&Path>) -> io::Result<TempDir> {
    let mut builder = Builder::new();
    builder.prefix(WORKSPACE_PREFIX);

    let dir = match root {
        Some(root) => {
            std::fs::create_dir_all(root)?;
            builder.tempdir_in(root)?
        }
        None => builder.tempdir()?,
    };

    debug!("Created workspace {:?}", dir.path());
    Ok(dir)
}
