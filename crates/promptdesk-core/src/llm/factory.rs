use crate::constants::env;
use crate::error::{DeskError, Result};
use crate::llm::options::ClientOptions;
use crate::llm::provider::{ProviderConfig, ProviderKind, ProviderRegistry};
use crate::llm::{ClaudeClient, CohereClient, GeminiClient, LlmClient, OllamaClient, OpenAIClient};
use std::collections::HashMap;
use std::time::Duration;

/// Snapshot of provider credentials taken once at startup.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    values: HashMap<String, String>,
}

impl Credentials {
    /// Read every variable the registry may need from the process environment.
    pub fn from_env(registry: &ProviderRegistry) -> Self {
        let values = registry
            .credential_vars()
            .into_iter()
            .filter_map(|var| {
                std::env::var(&var)
                    .ok()
                    .filter(|v| !v.is_empty())
                    .map(|v| (var, v))
            })
            .collect();
        Self { values }
    }

    pub fn with(mut self, var: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(var.into(), value.into());
        self
    }

    pub fn get(&self, var: &str) -> Option<&str> {
        self.values.get(var).map(String::as_str)
    }

    pub fn proxy(&self) -> Option<&str> {
        self.get(env::PROXY)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Turns a provider configuration plus a temperature into a bound client.
pub trait ClientFactory: Send + Sync {
    fn build(&self, config: &ProviderConfig, temperature: f32) -> Result<Box<dyn LlmClient>>;
}

/// Builds real HTTP clients from the credential snapshot.
pub struct HttpClientFactory {
    credentials: Credentials,
    timeout: Duration,
}

impl HttpClientFactory {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            timeout: ClientOptions::default().timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Options for one binding. The proxy is attached only for providers that ask for it.
    pub fn client_options(&self, config: &ProviderConfig, temperature: f32) -> Result<ClientOptions> {
        let mut options = ClientOptions::default()
            .with_temperature(temperature)
            .with_timeout(self.timeout);

        if config.use_proxy {
            let proxy = self
                .credentials
                .proxy()
                .ok_or_else(|| DeskError::missing_credential(&config.id, env::PROXY))?;
            options = options.with_proxy(proxy);
        }

        Ok(options)
    }

    fn api_key(&self, config: &ProviderConfig) -> Result<String> {
        let var = config.api_key_var().ok_or_else(|| {
            DeskError::Config(format!("Provider {} has no API key variable", config.id))
        })?;
        self.credentials
            .get(var)
            .map(str::to_string)
            .ok_or_else(|| DeskError::missing_credential(&config.id, var))
    }

    fn base_url(&self, config: &ProviderConfig) -> String {
        config
            .base_url_env
            .as_deref()
            .and_then(|var| self.credentials.get(var))
            .map(str::to_string)
            .or_else(|| config.base_url.clone())
            .unwrap_or_else(|| config.kind.default_base_url().to_string())
    }
}

impl ClientFactory for HttpClientFactory {
    fn build(&self, config: &ProviderConfig, temperature: f32) -> Result<Box<dyn LlmClient>> {
        let options = self.client_options(config, temperature)?;
        let base_url = self.base_url(config);

        let client: Box<dyn LlmClient> = match config.kind {
            ProviderKind::Anthropic => Box::new(
                ClaudeClient::new(self.api_key(config)?, &options)?
                    .with_model(&config.model)
                    .with_base_url(base_url),
            ),
            ProviderKind::Google => Box::new(
                GeminiClient::new(self.api_key(config)?, &options)?
                    .with_model(&config.model)
                    .with_base_url(base_url),
            ),
            ProviderKind::Cohere => Box::new(
                CohereClient::new(self.api_key(config)?, &options)?
                    .with_model(&config.model)
                    .with_base_url(base_url),
            ),
            ProviderKind::Ollama => {
                Box::new(OllamaClient::new(&config.model, &options)?.with_base_url(base_url))
            }
            // Remaining providers speak the OpenAI-compatible API
            ProviderKind::OpenAI | ProviderKind::Groq => Box::new(
                OpenAIClient::new(self.api_key(config)?, &options)?
                    .with_model(&config.model)
                    .with_base_url(base_url),
            ),
        };

        Ok(client)
    }
}
