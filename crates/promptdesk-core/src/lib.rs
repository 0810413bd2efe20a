pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod llm;
pub mod session;
pub mod store;

// Re-export key types
pub use config::Settings;
pub use context::{Chain, ChatTurn, ConversationMemory, PromptTemplate, Transcript, TurnRole};
pub use error::{DeskError, Result};
pub use llm::{
    ClientFactory, Credentials, HttpClientFactory, LlmClient, LlmResponse, Message,
    ProviderConfig, ProviderKind, ProviderRegistry, Role,
};
pub use session::{validate_temperature, SessionDefaults, SessionManager, SessionState};
pub use store::{open_in_viewer, PromptStore, SystemPromptEntry};
