use crate::constants::{endpoints, env, models};
use crate::error::{DeskError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The wire protocol a provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Anthropic,
    OpenAI,
    Groq,
    Google,
    Cohere,
    Ollama,
}

impl ProviderKind {
    pub fn name(&self) -> &str {
        match self {
            Self::Anthropic => "Anthropic",
            Self::OpenAI => "OpenAI",
            Self::Groq => "Groq",
            Self::Google => "Google Gemini",
            Self::Cohere => "Cohere",
            Self::Ollama => "Ollama (Local)",
        }
    }

    pub fn default_base_url(&self) -> &str {
        match self {
            Self::Anthropic => endpoints::ANTHROPIC_BASE_URL,
            Self::OpenAI => endpoints::OPENAI_BASE_URL,
            Self::Groq => endpoints::GROQ_BASE_URL,
            Self::Google => endpoints::GOOGLE_BASE_URL,
            Self::Cohere => endpoints::COHERE_BASE_URL,
            Self::Ollama => endpoints::OLLAMA_BASE_URL,
        }
    }

    pub fn default_api_key_env(&self) -> Option<&str> {
        match self {
            Self::Anthropic => Some(env::ANTHROPIC_API_KEY),
            Self::OpenAI => Some(env::OPENAI_API_KEY),
            Self::Groq => Some(env::GROQ_API_KEY),
            Self::Google => Some(env::GOOGLE_API_KEY),
            Self::Cohere => Some(env::COHERE_API_KEY),
            Self::Ollama => None,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One entry of the provider table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: String,
    pub kind: ProviderKind,
    pub model: String,
    /// Environment variable holding the API key; falls back to the kind's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Environment variable that, when set, overrides `base_url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url_env: Option<String>,
    #[serde(default)]
    pub use_proxy: bool,
}

impl ProviderConfig {
    pub fn new(id: impl Into<String>, kind: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            model: model.into(),
            api_key_env: None,
            base_url: None,
            base_url_env: None,
            use_proxy: false,
        }
    }

    pub fn with_proxy(mut self) -> Self {
        self.use_proxy = true;
        self
    }

    pub fn with_base_url_env(mut self, var: impl Into<String>) -> Self {
        self.base_url_env = Some(var.into());
        self
    }

    pub fn api_key_var(&self) -> Option<&str> {
        self.api_key_env
            .as_deref()
            .or_else(|| self.kind.default_api_key_env())
    }

    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(DeskError::Config("Provider identifier cannot be empty".into()));
        }
        if self.model.trim().is_empty() {
            return Err(DeskError::Config(format!(
                "Provider {} has no model configured",
                self.id
            )));
        }
        Ok(())
    }
}

/// Read-only table of provider configurations keyed by identifier.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, ProviderConfig>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProviderRegistry {
    /// The stock provider table.
    pub fn builtin() -> Self {
        let providers = builtin_providers()
            .into_iter()
            .map(|config| (config.id.clone(), config))
            .collect();
        Self { providers }
    }

    /// Build a registry from a declarative list, rejecting duplicate or malformed entries.
    pub fn from_configs(configs: Vec<ProviderConfig>) -> Result<Self> {
        let mut providers = BTreeMap::new();
        for config in configs {
            config.validate()?;
            if providers.contains_key(&config.id) {
                return Err(DeskError::Config(format!(
                    "Duplicate provider identifier: {}",
                    config.id
                )));
            }
            providers.insert(config.id.clone(), config);
        }
        Ok(Self { providers })
    }

    pub fn resolve(&self, identifier: &str) -> Result<&ProviderConfig> {
        self.providers
            .get(identifier)
            .ok_or_else(|| DeskError::UnknownProvider(identifier.to_string()))
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.providers.contains_key(identifier)
    }

    /// Identifiers in sorted order for display.
    pub fn list_identifiers(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderConfig> {
        self.providers.values()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Every environment variable the table may read credentials or endpoints from.
    pub fn credential_vars(&self) -> BTreeSet<String> {
        let mut vars: BTreeSet<String> = self
            .providers
            .values()
            .flat_map(|c| [c.api_key_var(), c.base_url_env.as_deref()])
            .flatten()
            .map(str::to_string)
            .collect();
        if self.providers.values().any(|c| c.use_proxy) {
            vars.insert(env::PROXY.to_string());
        }
        vars
    }
}

fn builtin_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new("Cohere", ProviderKind::Cohere, models::COHERE_DEFAULT)
            .with_base_url_env("COHERE_BASE_URL"),
        ProviderConfig::new("Anthropic-Haiku", ProviderKind::Anthropic, models::ANTHROPIC_HAIKU),
        ProviderConfig::new(
            "Anthropic-Sonnet",
            ProviderKind::Anthropic,
            models::ANTHROPIC_SONNET,
        ),
        ProviderConfig::new("Anthropic-Opus", ProviderKind::Anthropic, models::ANTHROPIC_OPUS),
        ProviderConfig::new(
            "Google-Gemini-1.5-pro-latest",
            ProviderKind::Google,
            models::GEMINI_PRO,
        )
        .with_proxy(),
        ProviderConfig::new("Groq-llama3-70b-8192", ProviderKind::Groq, models::GROQ_LLAMA3),
        ProviderConfig::new(
            "Groq-mixtral-8x7b-32768",
            ProviderKind::Groq,
            models::GROQ_MIXTRAL,
        ),
        ProviderConfig::new("Ollama-phi3", ProviderKind::Ollama, models::OLLAMA_PHI3),
    ]
}
