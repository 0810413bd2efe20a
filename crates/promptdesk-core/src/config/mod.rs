use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{defaults, paths};
use crate::error::{DeskError, Result};
use crate::llm::provider::{ProviderConfig, ProviderRegistry};
use crate::session::{validate_temperature, SessionDefaults};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the prompt libraries and the saved transcript.
    pub data_dir: Option<PathBuf>,
    /// Provider activated at startup.
    pub default_provider: Option<String>,
    pub default_temperature: f32,
    pub default_system_prompt: String,
    /// Open the plain-text transcript in the system viewer after saving.
    pub open_exports: bool,
    pub request_timeout_secs: u64,
    /// Empty means the built-in provider table.
    pub providers: Vec<ProviderConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            default_provider: None,
            default_temperature: defaults::TEMPERATURE,
            default_system_prompt: defaults::SYSTEM_PROMPT.to_string(),
            open_exports: true,
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
            providers: Vec::new(),
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(paths::CONFIG_DIR)
            .join(paths::CONFIG_FILE)
    }

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load_from(&config_path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %config_path.display(), error = %e, "Ignoring unreadable settings");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DeskError::Config(format!("Failed to read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| DeskError::Config(format!("Failed to parse {}: {e}", path.display())))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DeskError::Config(e.to_string()))?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| DeskError::Config(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| DeskError::Config(e.to_string()))?;
        Ok(())
    }

    /// Resolved data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join(paths::CONFIG_DIR))
                .unwrap_or_else(|| PathBuf::from("."))
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Startup system prompt and temperature, validated.
    pub fn session_defaults(&self) -> Result<SessionDefaults> {
        let temperature = validate_temperature(self.default_temperature)?;
        if self.default_system_prompt.trim().is_empty() {
            return Err(DeskError::Config("default_system_prompt cannot be empty".into()));
        }
        Ok(SessionDefaults {
            system_prompt: self.default_system_prompt.clone(),
            temperature,
        })
    }

    /// Build the provider table. Also checks that `default_provider` names an entry.
    pub fn build_provider_registry(&self) -> Result<ProviderRegistry> {
        let registry = if self.providers.is_empty() {
            ProviderRegistry::builtin()
        } else {
            ProviderRegistry::from_configs(self.providers.clone())?
        };

        if let Some(provider) = &self.default_provider {
            if !registry.contains(provider) {
                return Err(DeskError::UnknownProvider(provider.clone()));
            }
        }

        Ok(registry)
    }
}
