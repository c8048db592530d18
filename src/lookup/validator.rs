//! Player name validation utilities

use crate::error::{Result, SniperError};
use crate::types::{MAX_NAME_LENGTH, MIN_NAME_LENGTH};
use regex::Regex;

/// Player name validator
#[derive(Debug, Clone, Default)]
pub struct NameValidator;

impl NameValidator {
    /// Create a new name validator
    pub fn new() -> Self {
        Self
    }

    /// Validate a player name, returning it trimmed
    pub fn validate(&self, name: &str) -> Result<String> {
        let name = name.trim();

        self.validate_length(name)?;
        self.validate_characters(name)?;

        Ok(name.to_string())
    }

    fn validate_length(&self, name: &str) -> Result<()> {
        let len = name.chars().count();
        if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&len) {
            return Err(SniperError::validation(format!(
                "A username must be between {} and {} characters long",
                MIN_NAME_LENGTH, MAX_NAME_LENGTH
            )));
        }
        Ok(())
    }

    fn validate_characters(&self, name: &str) -> Result<()> {
        let valid_chars = Regex::new(r"^[a-zA-Z0-9_]+$")
            .map_err(|e| SniperError::internal(e.to_string()))?;

        if !valid_chars.is_match(name) {
            return Err(SniperError::validation(
                "The username cannot contain any special characters",
            ));
        }

        Ok(())
    }
}
