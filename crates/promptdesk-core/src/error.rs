use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Invalid temperature {0}: must be between 0 and 1")]
    InvalidTemperature(f32),

    #[error("System prompt cannot be empty")]
    EmptyPrompt,

    #[error("User input cannot be empty")]
    EmptyInput,

    #[error("Provider call failed: {0}")]
    ProviderCall(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("No provider selected")]
    NotConfigured,

    #[error("Missing credential for {provider}: set {var}")]
    MissingCredential { provider: String, var: String },

    #[error("Prompt name cannot be empty")]
    EmptyPromptName,

    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DeskError {
    pub fn missing_credential(provider: impl Into<String>, var: impl Into<String>) -> Self {
        Self::MissingCredential {
            provider: provider.into(),
            var: var.into(),
        }
    }

    pub(crate) fn persistence(action: &str, path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Persistence(format!("Failed to {} {}: {}", action, path.display(), err))
    }
}

impl From<reqwest::Error> for DeskError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::ProviderCall(format!("request timed out: {err}"))
        } else {
            Self::ProviderCall(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, DeskError>;
