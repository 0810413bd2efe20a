use crate::constants::{endpoints, models};
use crate::error::DeskError;
use crate::llm::options::ClientOptions;
use crate::llm::traits::*;
use serde::{Deserialize, Serialize};

/// Client for Google Gemini `generateContent`.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, options: &ClientOptions) -> Result<Self, DeskError> {
        Ok(Self {
            client: options.http_client()?,
            api_key: api_key.into(),
            model: models::GEMINI_PRO.to_string(),
            base_url: endpoints::GOOGLE_BASE_URL.to_string(),
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

    fn build_request(&self, messages: &[Message]) -> GenerateContentRequest {
        let (system, conversation) = split_system(messages);

        let contents = conversation
            .into_iter()
            .map(|m| Content {
                // Gemini only knows "user" and "model".
                role: match m.role {
                    Role::Assistant => "model",
                    _ => "user",
                }
                .to_string(),
                parts: vec![Part {
                    text: m.content.clone(),
                }],
            })
            .collect();

        GenerateContentRequest {
            contents,
            system_instruction: system.map(|text| Content {
                role: "system".to_string(),
                parts: vec![Part { text }],
            }),
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

fn extract_text(response: GenerateContentResponse) -> Result<(String, Option<Usage>), DeskError> {
    let usage = response.usage_metadata.map(|u| Usage {
        input_tokens: u.prompt_token_count,
        output_tokens: u.candidates_token_count,
    });

    let text = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .filter(|text| !text.is_empty())
        .ok_or_else(|| {
            DeskError::ProviderCall("Gemini API returned no text in the response candidates".into())
        })?;

    Ok((text, usage))
}

#[async_trait::async_trait]
impl LlmClient for GeminiClient {
    async fn chat(&self, messages: &[Message]) -> Result<LlmResponse, DeskError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.build_request(messages))
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(DeskError::ProviderCall(format!(
                "Gemini API error ({}): {}",
                status, response_text
            )));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&response_text)
            .map_err(|e| DeskError::ProviderCall(format!("Failed to parse Gemini response: {e}")))?;

        let (text, usage) = extract_text(parsed)?;

        Ok(LlmResponse {
            message: Message::assistant(text),
            usage,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
