use crate::constants::{endpoints, models};
use crate::error::DeskError;
use crate::llm::options::ClientOptions;
use crate::llm::traits::*;
use serde::Deserialize;
use serde_json::Value;

pub struct ClaudeClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    temperature: f32,
}

impl ClaudeClient {
    pub fn new(api_key: impl Into<String>, options: &ClientOptions) -> Result<Self, DeskError> {
        Ok(Self {
            client: options.http_client()?,
            api_key: api_key.into(),
            model: models::ANTHROPIC_SONNET.to_string(),
            base_url: endpoints::ANTHROPIC_BASE_URL.to_string(),
            max_tokens: options.max_tokens,
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

    fn build_request_body(&self, messages: &[Message]) -> Value {
        let (system_prompt, conversation) = split_system(messages);

        let conv_messages: Vec<Value> = conversation
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": m.role,
                    "content": m.content,
                })
            })
            .collect();

        let mut body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "messages": conv_messages,
        });

        if let Some(system) = system_prompt {
            body["system"] = Value::String(system);
        }

        body
    }
}

#[derive(Debug, Deserialize)]
struct ClaudeApiResponse {
    content: Vec<ClaudeContent>,
    usage: Option<ClaudeUsage>,
}

#[derive(Debug, Deserialize)]
struct ClaudeContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[async_trait::async_trait]
impl LlmClient for ClaudeClient {
    async fn chat(&self, messages: &[Message]) -> Result<LlmResponse, DeskError> {
        let url = format!("{}/v1/messages", self.base_url);
        let request_body = self.build_request_body(messages);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(DeskError::ProviderCall(format!(
                "Anthropic API error ({}): {}",
                status, response_text
            )));
        }

        let api_response: ClaudeApiResponse = serde_json::from_str(&response_text)
            .map_err(|e| DeskError::ProviderCall(format!("Failed to parse response: {e}")))?;

        let content = api_response
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("");

        Ok(LlmResponse {
            message: Message::assistant(content),
            usage: api_response.usage.map(|u| Usage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
