//! Validation helpers for Lockstep inputs
//!
//! Regex patterns and validation functions for the inputs that cross the
//! service boundary: video references, chat text, and display names.

use crate::error::LockstepError;
use once_cell::sync::Lazy;
use regex::Regex;

/// URL validation regex (basic)
pub static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("Failed to compile URL regex"));

/// Display name bound, in characters
pub const MAX_DISPLAY_NAME_LEN: usize = 64;

/// Validate a video reference
///
/// The reference is opaque to the engine but must be a non-empty http(s) URL.
///
/// # Examples
///
/// ```
/// use lockstep_core::validation::validate_video_url;
///
/// assert!(validate_video_url("https://example.com/movie.mp4").is_ok());
/// assert!(validate_video_url("").is_err());
/// assert!(validate_video_url("not a url").is_err());
/// ```
pub fn validate_video_url(url: &str) -> Result<(), LockstepError> {
    if url.trim().is_empty() {
        return Err(LockstepError::validation_field(
            "Video URL must not be empty",
            "videoUrl",
        ));
    }

    if URL_REGEX.is_match(url) {
        Ok(())
    } else {
        Err(LockstepError::validation_field(
            "Invalid video URL (expected http or https)",
            "videoUrl",
        ))
    }
}

/// Validate and normalize a chat message
///
/// Returns the trimmed text on success.
///
/// # Examples
///
/// ```
/// use lockstep_core::validation::validate_chat_message;
///
/// assert_eq!(validate_chat_message("  hello  ", 500).unwrap(), "hello");
/// assert!(validate_chat_message("   ", 500).is_err());
/// ```
pub fn validate_chat_message(text: &str, max_len: usize) -> Result<String, LockstepError> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err(LockstepError::validation_field(
            "Message must not be empty",
            "text",
        ));
    }

    let len = trimmed.chars().count();
    if len > max_len {
        return Err(LockstepError::validation_field(
            format!("Message exceeds {} characters ({})", max_len, len),
            "text",
        ));
    }

    Ok(trimmed.to_string())
}

/// Validate a participant display name
pub fn validate_display_name(name: &str) -> Result<(), LockstepError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(LockstepError::validation_field(
            "Display name must not be empty",
            "username",
        ));
    }

    if trimmed.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(LockstepError::validation_field(
            format!("Display name exceeds {} characters", MAX_DISPLAY_NAME_LEN),
            "username",
        ));
    }

    Ok(())
}
