use crate::constants::defaults;
use crate::error::DeskError;
use std::time::Duration;

/// Per-binding knobs handed to a provider client at construction time.
///
/// The proxy lives here rather than in process environment variables, so it only
/// ever affects the one client built for a provider that asked for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    pub temperature: f32,
    pub proxy: Option<String>,
    pub timeout: Duration,
    pub max_tokens: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            temperature: defaults::TEMPERATURE,
            proxy: None,
            timeout: Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS),
            max_tokens: defaults::MAX_TOKENS,
        }
    }
}

impl ClientOptions {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the HTTP client for one provider binding.
    pub fn http_client(&self) -> Result<reqwest::Client, DeskError> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        if let Some(ref proxy) = self.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| DeskError::Config(format!("Invalid proxy address {proxy}: {e}")))?;
            builder = builder.proxy(proxy);
        }
        builder
            .build()
            .map_err(|e| DeskError::Config(format!("Failed to build HTTP client: {e}")))
    }
}
