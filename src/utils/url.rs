//! URL checks for user input

use crate::error::TubedropError;
use url::Url;

/// Trim user input and make sure it is an absolute http(s) URL.
///
/// Returns the trimmed input unchanged so the extraction tool sees exactly
/// what the user pasted.
pub fn validate_video_url(input: &str) -> Result<String, TubedropError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TubedropError::EmptyUrl);
    }

    let parsed = Url::parse(trimmed)?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(TubedropError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                other
            )))
        }
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(TubedropError::InvalidUrl("missing host".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Host part of a URL for log lines, if it parses
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(str::to_string)
}
