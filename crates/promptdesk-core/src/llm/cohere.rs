use crate::constants::{endpoints, models};
use crate::error::DeskError;
use crate::llm::options::ClientOptions;
use crate::llm::traits::*;
use serde::{Deserialize, Serialize};

/// Client for the Cohere chat endpoint.
///
/// Cohere takes the newest user turn as `message` and everything before it as
/// `chat_history`; the system prompt travels as `preamble`.
pub struct CohereClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
}

impl CohereClient {
    pub fn new(api_key: impl Into<String>, options: &ClientOptions) -> Result<Self, DeskError> {
        Ok(Self {
            client: options.http_client()?,
            api_key: api_key.into(),
            model: models::COHERE_DEFAULT.to_string(),
            base_url: endpoints::COHERE_BASE_URL.to_string(),
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

    fn build_request(&self, messages: &[Message]) -> Result<CohereChatRequest, DeskError> {
        let (preamble, mut conversation) = split_system(messages);

        let last = conversation
            .pop()
            .filter(|m| m.role == Role::User)
            .ok_or_else(|| DeskError::ProviderCall("Cohere request needs a user message".into()))?;

        let chat_history = conversation
            .into_iter()
            .map(|m| CohereTurn {
                role: match m.role {
                    Role::Assistant => "CHATBOT",
                    _ => "USER",
                },
                message: m.content.clone(),
            })
            .collect();

        Ok(CohereChatRequest {
            model: self.model.clone(),
            message: last.content.clone(),
            chat_history,
            preamble,
            temperature: self.temperature,
        })
    }
}

#[derive(Debug, Serialize)]
struct CohereChatRequest {
    model: String,
    message: String,
    chat_history: Vec<CohereTurn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preamble: Option<String>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct CohereTurn {
    role: &'static str,
    message: String,
}

#[derive(Debug, Deserialize)]
struct CohereChatResponse {
    #[serde(default)]
    text: String,
    meta: Option<CohereMeta>,
}

#[derive(Debug, Deserialize)]
struct CohereMeta {
    billed_units: Option<CohereBilledUnits>,
}

#[derive(Debug, Deserialize)]
struct CohereBilledUnits {
    #[serde(default)]
    input_tokens: f64,
    #[serde(default)]
    output_tokens: f64,
}

#[async_trait::async_trait]
impl LlmClient for CohereClient {
    async fn chat(&self, messages: &[Message]) -> Result<LlmResponse, DeskError> {
        let url = format!("{}/v1/chat", self.base_url);
        let request_body = self.build_request(messages)?;

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(DeskError::ProviderCall(format!(
                "Cohere API error ({}): {}",
                status, response_text
            )));
        }

        let parsed: CohereChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| DeskError::ProviderCall(format!("Failed to parse response: {e}")))?;

        let usage = parsed
            .meta
            .and_then(|m| m.billed_units)
            .map(|b| Usage {
                input_tokens: b.input_tokens as u32,
                output_tokens: b.output_tokens as u32,
            });

        Ok(LlmResponse {
            message: Message::assistant(parsed.text),
            usage,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
