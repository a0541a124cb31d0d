use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Result, TeaCalError};
use crate::models::ProfileUpdate;

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 6;
/// Maximum username length in characters
pub const MAX_USERNAME_LEN: usize = 32;
/// Maximum note length in characters
pub const MAX_NOTES_LEN: usize = 500;

lazy_static! {
    // Letters (any script), digits, underscore, dash and dot
    static ref USERNAME_RE: Regex = Regex::new(r"^[\p{L}\p{N}_.\-]+$").expect("valid username pattern");
}

fn invalid(message: impl Into<String>) -> TeaCalError {
    TeaCalError::Validation(message.into())
}

/// Validation utilities for form input
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Normalize a username to NFC and trim surrounding whitespace
    #[must_use]
    pub fn normalize_username(username: &str) -> String {
        username.trim().nfc().collect()
    }

    /// Validate a (normalized) username
    pub fn validate_username(username: &str) -> Result<()> {
        if username.is_empty() {
            return Err(invalid("Username cannot be empty"));
        }

        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(invalid(format!(
                "Username too long (max {MAX_USERNAME_LEN} characters)"
            )));
        }

        if !USERNAME_RE.is_match(username) {
            return Err(invalid("Username contains invalid characters"));
        }

        Ok(())
    }

    /// Validate a password for registration
    pub fn validate_password(password: &str) -> Result<()> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(invalid(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }

    /// Validate that both password fields match
    pub fn validate_password_confirmation(password: &str, confirm: &str) -> Result<()> {
        if password != confirm {
            return Err(invalid("Passwords do not match"));
        }
        Ok(())
    }

    /// Validate biometric fields present in a profile update
    pub fn validate_profile_update(update: &ProfileUpdate) -> Result<()> {
        if let Some(weight) = update.weight {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(invalid("Weight must be greater than 0"));
            }
        }
        if let Some(height) = update.height {
            if !height.is_finite() || height <= 0.0 {
                return Err(invalid("Height must be greater than 0"));
            }
        }
        if update.age == Some(0) {
            return Err(invalid("Age must be greater than 0"));
        }
        Ok(())
    }

    /// Onboarding requires every biometric field
    pub fn validate_onboarding(update: &ProfileUpdate) -> Result<()> {
        if update.weight.is_none() || update.height.is_none() || update.age.is_none() {
            return Err(invalid("Weight, height and age are required"));
        }
        Self::validate_profile_update(update)
    }

    /// Validate sugar percentage
    pub fn validate_sugar_level(level: f64) -> Result<()> {
        if !(0.0..=100.0).contains(&level) {
            return Err(invalid("Sugar level must be between 0 and 100"));
        }
        Ok(())
    }

    /// Validate grams of an ingredient
    pub fn validate_grams(name: &str, grams: f64) -> Result<()> {
        if !grams.is_finite() || grams < 0.0 {
            return Err(invalid(format!("Amount of {name} must be 0 or more grams")));
        }
        Ok(())
    }

    /// Validate a calorie figure that will be stored
    pub fn validate_kcal(kcal: f64) -> Result<()> {
        if !kcal.is_finite() || kcal < 0.0 {
            return Err(invalid("Calories must be a finite number of 0 or more"));
        }
        Ok(())
    }

    /// Validate daily/weekly budget against its floor
    pub fn validate_budget(kcal: u32, minimum: u32) -> Result<()> {
        if kcal < minimum {
            return Err(invalid(format!("Budget must be at least {minimum} kcal")));
        }
        Ok(())
    }

    /// Strip control characters, trim, and cap the length of free text
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect::<String>()
            .trim()
            .chars()
            .take(MAX_NOTES_LEN)
            .collect()
    }
}
