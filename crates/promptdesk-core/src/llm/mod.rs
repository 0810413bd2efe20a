mod traits;
mod claude;
mod cohere;
mod gemini;
mod ollama;
mod openai;
pub mod factory;
pub mod options;
pub mod provider;

pub use traits::*;
pub use claude::ClaudeClient;
pub use cohere::CohereClient;
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use openai::OpenAIClient;
pub use factory::{ClientFactory, Credentials, HttpClientFactory};
pub use options::ClientOptions;
pub use provider::{ProviderConfig, ProviderKind, ProviderRegistry};
