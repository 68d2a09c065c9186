//! Pseudo Validation
//!
//! Pseudos are stored as the first field of a `pseudo,chrono` line, so
//! commas and line breaks can never be accepted.

use thiserror::Error;

/// Minimum pseudo length, in characters, after trimming.
pub const MIN_PSEUDO_LEN: usize = 4;

/// Pseudo used when the player never chose one.
pub const DEFAULT_PSEUDO: &str = "Anonyme";

/// Pseudo validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PseudoError {
    /// Empty or whitespace only.
    #[error("pseudo cannot be empty")]
    Empty,

    /// Shorter than `MIN_PSEUDO_LEN` characters.
    #[error("pseudo must be at least {min} characters long")]
    TooShort {
        /// Required minimum.
        min: usize,
    },

    /// Contains a comma.
    #[error("pseudo cannot contain a comma")]
    Comma,

    /// Contains a line break or other control character.
    #[error("pseudo cannot contain control characters")]
    ControlCharacter,
}

/// Validate a pseudo; returns the trimmed form to store.
pub fn validate_pseudo(raw: &str) -> Result<String, PseudoError> {
    let pseudo = raw.trim();

    if pseudo.is_empty() {
        return Err(PseudoError::Empty);
    }
    if pseudo.chars().count() < MIN_PSEUDO_LEN {
        return Err(PseudoError::TooShort { min: MIN_PSEUDO_LEN });
    }
    if pseudo.contains(',') {
        return Err(PseudoError::Comma);
    }
    if pseudo.chars().any(char::is_control) {
        return Err(PseudoError::ControlCharacter);
    }

    Ok(pseudo.to_string())
}
