//! Theme input rules shared by the edit and submit paths.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const MAX_THEME_CHARS: usize = 100;

static THEME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9\s,.-]*$").expect("theme pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThemeError {
    #[error("Please enter a theme before starting.")]
    Empty,
    #[error("Themes are limited to {max} characters.")]
    TooLong { max: usize },
    #[error("Themes may only contain letters, numbers, spaces, commas, periods and hyphens.")]
    InvalidCharacters,
}

pub fn theme_len(theme: &str) -> usize {
    theme.chars().count()
}

pub fn within_length_bound(theme: &str) -> bool {
    theme_len(theme) <= MAX_THEME_CHARS
}

pub fn matches_allowed_characters(theme: &str) -> bool {
    THEME_PATTERN.is_match(theme)
}

/// Error shown while the user is still typing. Empty input is a valid
/// intermediate state.
pub fn edit_error(theme: &str) -> Option<ThemeError> {
    if theme.is_empty() || matches_allowed_characters(theme) {
        None
    } else {
        Some(ThemeError::InvalidCharacters)
    }
}

/// Full check applied before a theme is sent to the backend.
pub fn validate_for_submit(theme: &str) -> Result<(), ThemeError> {
    if theme.trim().is_empty() {
        return Err(ThemeError::Empty);
    }
    if !within_length_bound(theme) {
        return Err(ThemeError::TooLong {
            max: MAX_THEME_CHARS,
        });
    }
    if !matches_allowed_characters(theme) {
        return Err(ThemeError::InvalidCharacters);
    }
    Ok(())
}
