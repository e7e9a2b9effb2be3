//! Finding the file the extraction tool actually produced

use crate::error::TubedropError;
use crate::utils::file_name_with_ext;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extensions of in-progress artifacts the tool may leave behind
const PARTIAL_EXTENSIONS: &[&str] = &["part", "ytdl"];

/// The file to deliver and the name to deliver it under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedOutput {
    /// Path inside the temporary directory
    pub path: PathBuf,
    /// User-facing filename
    pub filename: String,
    /// Extension of the produced file (may be empty)
    pub extension: String,
    /// Whether the produced extension differs from the requested one
    pub reconciled: bool,
}

/// Locate `<dir>/<title>.<requested_ext>`, or reconcile a different extension.
///
/// When the expected file is missing, the directory must hold exactly one
/// finished file; its extension is spliced onto `title`. Zero candidates is
/// [`TubedropError::OutputNotFound`], several is [`TubedropError::AmbiguousOutput`].
pub fn locate_output(
    dir: &Path,
    title: &str,
    requested_ext: &str,
) -> Result<LocatedOutput, TubedropError> {
    let expected_name = file_name_with_ext(title, requested_ext);
    let expected = dir.join(&expected_name);

    if expected.is_file() {
        debug!("Found expected output {:?}", expected);
        return Ok(LocatedOutput {
            path: expected,
            filename: expected_name,
            extension: requested_ext.trim_start_matches('.').to_string(),
            reconciled: false,
        });
    }

    let mut candidates = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            TubedropError::IoError(
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
            )
        })?;
        if !entry.file_type().is_file() || is_partial(entry.path()) {
            continue;
        }
        candidates.push(entry.into_path());
    }

    match candidates.len() {
        0 => Err(TubedropError::OutputNotFound),
        1 => {
            let path = candidates.remove(0);
            let extension = path
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default();
            warn!(
                "Expected {} but the tool produced {:?}; delivering with extension '{}'",
                expected_name, path, extension
            );
            Ok(LocatedOutput {
                filename: file_name_with_ext(title, &extension),
                reconciled: extension != requested_ext.trim_start_matches('.'),
                extension,
                path,
            })
        }
        _ => {
            let mut names: Vec<String> = candidates
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect();
            names.sort();
            Err(TubedropError::AmbiguousOutput(names))
        }
    }
}

fn is_partial(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            PARTIAL_EXTENSIONS
                .iter()
                .any(|partial| ext.eq_ignore_ascii_case(partial))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn dir_with(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in files {
            fs::write(dir.path().join(name), b"data").unwrap();
        }
        dir
    }

    #[test]
    fn test_expected_file_is_returned_unchanged() {
        let dir = dir_with(&["title.mp4"]);
        let located = locate_output(dir.path(), "title", "mp4").unwrap();

        assert_eq!(located.path, dir.path().join("title.mp4"));
        assert_eq!(located.filename, "title.mp4");
        assert!(!located.reconciled);
    }

    #[test]
    fn test_different_extension_is_reconciled() {
        let dir = dir_with(&["title.mkv"]);
        let located = locate_output(dir.path(), "title", "mp4").unwrap();

        assert_eq!(located.path, dir.path().join("title.mkv"));
        assert_eq!(located.filename, "title.mkv");
        assert_eq!(located.extension, "mkv");
        assert!(located.reconciled);
    }

    #[test]
    fn test_single_file_with_other_stem_takes_title() {
        let dir = dir_with(&["something else.webm"]);
        let located = locate_output(dir.path(), "My Clip", "mp4").unwrap();
        assert_eq!(located.filename, "My Clip.webm");
    }

    #[test]
    fn test_file_without_extension() {
        let dir = dir_with(&["raw"]);
        let located = locate_output(dir.path(), "title", "mp4").unwrap();
        assert_eq!(located.filename, "title");
        assert_eq!(located.extension, "");
    }

    #[test]
    fn test_empty_dir_is_not_found() {
        let dir = dir_with(&[]);
        assert!(matches!(
            locate_output(dir.path(), "title", "mp4"),
            Err(TubedropError::OutputNotFound)
        ));
    }

    #[test]
    fn test_multiple_candidates_are_ambiguous() {
        let dir = dir_with(&["b.webm", "a.mkv"]);
        match locate_output(dir.path(), "title", "mp4") {
            Err(TubedropError::AmbiguousOutput(names)) => {
                assert_eq!(names, vec!["a.mkv".to_string(), "b.webm".to_string()]);
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_artifacts_are_ignored() {
        let dir = dir_with(&["title.f137.mp4.part", "title.webm"]);
        let located = locate_output(dir.path(), "title", "mp4").unwrap();
        assert_eq!(located.filename, "title.webm");

        let dir = dir_with(&["title.mp4.part"]);
        assert!(matches!(
            locate_output(dir.path(), "title", "mp4"),
            Err(TubedropError::OutputNotFound)
        ));
    }

    #[test]
    fn test_subdirectories_are_not_candidates() {
        let dir = dir_with(&["title.m4a"]);
        fs::create_dir(dir.path().join("nested")).unwrap();
        let located = locate_output(dir.path(), "title", "mp3").unwrap();
        assert_eq!(located.filename, "title.m4a");
    }
}
