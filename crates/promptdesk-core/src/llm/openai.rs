use crate::constants::endpoints;
use crate::error::DeskError;
use crate::llm::options::ClientOptions;
use crate::llm::traits::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Client for any OpenAI-compatible chat completions endpoint (OpenAI, Groq).
pub struct OpenAIClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>, options: &ClientOptions) -> Result<Self, DeskError> {
        Ok(Self {
            client: options.http_client()?,
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            base_url: endpoints::OPENAI_BASE_URL.to_string(),
            temperature: options.temperature,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn build_request(&self, messages: &[Message]) -> OpenAIRequest {
        let oai_messages: Vec<Value> = messages
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": m.role,
                    "content": m.content,
                })
            })
            .collect();

        OpenAIRequest {
            model: self.model.clone(),
            messages: oai_messages,
            temperature: self.temperature,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<Value>,
    temperature: f32,
}

#[async_trait::async_trait]
impl LlmClient for OpenAIClient {
    async fn chat(&self, messages: &[Message]) -> Result<LlmResponse, DeskError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request_body = self.build_request(messages);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(DeskError::ProviderCall(format!(
                "OpenAI-compatible API error ({}): {}",
                status, response_text
            )));
        }

        let api_response: OpenAIResponse = serde_json::from_str(&response_text)
            .map_err(|e| DeskError::ProviderCall(format!("Failed to parse response: {e}")))?;

        let choice = api_response
            .choices
            .first()
            .ok_or_else(|| DeskError::ProviderCall("No response from API".into()))?;

        let content = choice.message.content.clone().unwrap_or_default();

        Ok(LlmResponse {
            message: Message::assistant(content),
            usage: api_response.usage.map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
