//! Free-text input sanitization
//!
//! Text stored from request bodies (product names, customer addresses) is
//! normalized and validated on the way in but kept literal: search matches
//! the characters the caller typed, and a value read back can be written
//! back unchanged. Escaping belongs to whatever renders it as markup.

use std::borrow::Cow;

use kernel::error::app_error::AppError;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    #[error("Text contains control characters")]
    ControlCharacter,

    #[error("Text must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Text must not be empty")]
    Empty,
}

impl SanitizeError {
    /// 400 naming the offending body field
    pub fn for_field(self, field: impl Into<Cow<'static, str>>) -> AppError {
        AppError::bad_request(self.to_string()).with_param(field)
    }
}

/// Normalize and validate a free-text value
///
/// NFKC folds look-alike forms, surrounding whitespace is trimmed, control
/// characters other than newline and tab are rejected, and at most
/// `max_chars` characters are accepted. Markup characters pass through.
pub fn clean_text(input: &str, max_chars: usize) -> Result<String, SanitizeError> {
    let normalized: String = input.nfkc().collect();
    let trimmed = normalized.trim();

    if trimmed
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\t')
    {
        return Err(SanitizeError::ControlCharacter);
    }

    let actual = trimmed.chars().count();
    if actual > max_chars {
        return Err(SanitizeError::TooLong {
            max: max_chars,
            actual,
        });
    }

    Ok(trimmed.to_string())
}

/// [`clean_text`] that also rejects an empty result
pub fn clean_required(input: &str, max_chars: usize) -> Result<String, SanitizeError> {
    let cleaned = clean_text(input, max_chars)?;
    if cleaned.is_empty() {
        return Err(SanitizeError::Empty);
    }
    Ok(cleaned)
}

/// Optional field: absent or blank becomes `None`
pub fn clean_optional(
    input: Option<&str>,
    max_chars: usize,
) -> Result<Option<String>, SanitizeError> {
    match input {
        None => Ok(None),
        Some(raw) => clean_text(raw, max_chars).map(|s| (!s.is_empty()).then_some(s)),
    }
}
