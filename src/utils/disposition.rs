//! Content-Disposition helpers for file delivery

/// MIME type every delivered file is sent with
pub const DOWNLOAD_CONTENT_TYPE: &str = "application/octet-stream";

/// `attachment` disposition with an ASCII fallback and the UTF-8 name in `filename*`
pub fn attachment_disposition(filename: &str) -> String {
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii_fallback_filename(filename),
        urlencoding::encode(filename)
    )
}

/// Reduce a filename to characters that are safe inside a quoted header value
pub fn ascii_fallback_filename(value: &str) -> String {
    let sanitized: String = value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ' | '(' | ')') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let compact = sanitized.trim();
    if compact.is_empty() {
        "download.bin".to_string()
    } else {
        compact.to_string()
    }
}
