//! Safe filename generation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Maximum length of a sanitized title, in characters
pub const MAX_TITLE_CHARS: usize = 200;

/// Maximum length of a sanitized title, in UTF-8 bytes.
///
/// Leaves room under the common 255-byte name limit for an extension and
/// the tool's intermediate suffixes such as `.f137.webm.part`.
pub const MAX_TITLE_BYTES: usize = 240;

/// Title used when the real one cannot be determined
pub const FALLBACK_TITLE: &str = "downloaded_video";

fn invalid_chars() -> &'static Regex {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    INVALID.get_or_init(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).unwrap())
}

/// Make an untrusted title usable as a filename.
///
/// Replaces `< > : " / \ | ? *` and control characters 0x00-0x1F with `_`,
/// then keeps the first 200 characters, cut further to [`MAX_TITLE_BYTES`]
/// on a character boundary. Idempotent.
pub fn sanitize_filename(title: &str) -> String {
    let replaced = invalid_chars().replace_all(title, "_");
    let mut sanitized: String = replaced.chars().take(MAX_TITLE_CHARS).collect();
    if sanitized.len() > MAX_TITLE_BYTES {
        let mut end = MAX_TITLE_BYTES;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized.truncate(end);
    }
    sanitized
}

/// Sanitize a probed title, falling back to [`FALLBACK_TITLE`] when nothing usable is left
pub fn title_or_fallback(title: Option<&str>) -> String {
    title
        .map(sanitize_filename)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string())
}

/// Join a title and an extension into a file name
pub fn file_name_with_ext(title: &str, extension: &str) -> String {
    let ext = extension.trim_start_matches('.');
    if ext.is_empty() {
        title.to_string()
    } else {
        format!("{}.{}", title, ext)
    }
}
