mod manager;

pub use manager::SessionManager;

use crate::constants::defaults;
use crate::error::{DeskError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No provider selected yet.
    Unconfigured,
    /// Provider, temperature and system prompt are bound into a chain.
    Ready,
}

/// Starting system prompt and temperature for a fresh session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDefaults {
    pub system_prompt: String,
    pub temperature: f32,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            system_prompt: defaults::SYSTEM_PROMPT.to_string(),
            temperature: defaults::TEMPERATURE,
        }
    }
}

/// Accept temperatures in the closed range [0, 1].
pub fn validate_temperature(value: f32) -> Result<f32> {
    if (defaults::MIN_TEMPERATURE..=defaults::MAX_TEMPERATURE).contains(&value) {
        Ok(value)
    } else {
        Err(DeskError::InvalidTemperature(value))
    }
}

pub(crate) fn validate_prompt(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        Err(DeskError::EmptyPrompt)
    } else {
        Ok(())
    }
}

pub(crate) fn validate_prompt_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        Err(DeskError::EmptyPromptName)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_bounds_are_inclusive() {
        assert!(validate_temperature(0.0).is_ok());
        assert!(validate_temperature(1.0).is_ok());
        assert!(validate_temperature(0.5).is_ok());
    }

    #[test]
    fn test_temperature_outside_range_rejected() {
        for value in [-0.01, 1.01, 2.0, f32::NAN, f32::INFINITY] {
            assert!(
                matches!(validate_temperature(value), Err(DeskError::InvalidTemperature(_))),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn test_blank_prompt_rejected() {
        assert!(matches!(validate_prompt(""), Err(DeskError::EmptyPrompt)));
        assert!(matches!(validate_prompt("  \n"), Err(DeskError::EmptyPrompt)));
        assert!(validate_prompt("Be helpful").is_ok());
    }
}
