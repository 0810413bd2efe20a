use crate::constants::endpoints;
use crate::error::DeskError;
use crate::llm::options::ClientOptions;
use crate::llm::traits::*;
use serde::{Deserialize, Serialize};

/// Client for local Ollama models over the native `/api/chat` endpoint.
pub struct OllamaClient {
    client: reqwest::Client,
    model: String,
    base_url: String,
    temperature: f32,
}

impl OllamaClient {
    pub fn new(model: impl Into<String>, options: &ClientOptions) -> Result<Self, DeskError> {
        Ok(Self {
            client: options.http_client()?,
            model: model.into(),
            base_url: endpoints::OLLAMA_BASE_URL.to_string(),
            temperature: options.temperature,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn build_request<'a>(&'a self, messages: &'a [Message]) -> OllamaChatRequest<'a> {
        OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaMessage>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    async fn chat(&self, messages: &[Message]) -> Result<LlmResponse, DeskError> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&self.build_request(messages))
            .send()
            .await
            .map_err(|e| DeskError::ProviderCall(format!("Ollama chat error: {e}")))?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(DeskError::ProviderCall(format!(
                "Ollama error ({}): {}",
                status, response_text
            )));
        }

        let chat: OllamaChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| DeskError::ProviderCall(format!("Failed to parse response: {e}")))?;

        let content = chat.message.map(|m| m.content).unwrap_or_default();

        let usage = match (chat.prompt_eval_count, chat.eval_count) {
            (Some(input), Some(output)) => Some(Usage {
                input_tokens: input,
                output_tokens: output,
            }),
            _ => None,
        };

        Ok(LlmResponse {
            message: Message::assistant(content),
            usage,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
