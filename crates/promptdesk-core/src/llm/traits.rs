use crate::error::DeskError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Split a rendered prompt into its system text and the remaining turns.
/// Providers with a dedicated system field use this instead of inline system messages.
pub(crate) fn split_system(messages: &[Message]) -> (Option<String>, Vec<&Message>) {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    let rest = messages.iter().filter(|m| m.role != Role::System).collect();

    if system.is_empty() {
        (None, rest)
    } else {
        (Some(system.join("\n\n")), rest)
    }
}

#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub message: Message,
    pub usage: Option<Usage>,
}

impl LlmResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            message: Message::assistant(content),
            usage: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// The LLM client trait. One bound client answers one completion request at a time.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Send the full rendered conversation and get the assistant reply.
    async fn chat(&self, messages: &[Message]) -> Result<LlmResponse, DeskError>;

    /// Model identifier the client was bound to, for logging.
    fn model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_system_joins_system_messages() {
        let messages = vec![
            Message::system("first"),
            Message::user("hi"),
            Message::system("second"),
            Message::assistant("hello"),
        ];

        let (system, rest) = split_system(&messages);
        assert_eq!(system.as_deref(), Some("first\n\nsecond"));
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0].role, Role::User);
        assert_eq!(rest[1].role, Role::Assistant);
    }

    #[test]
    fn test_split_system_without_system_message() {
        let messages = vec![Message::user("hi")];
        let (system, rest) = split_system(&messages);
        assert!(system.is_none());
        assert_eq!(rest.len(), 1);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("x")).unwrap();
        assert!(json.contains("\"assistant\""));
    }
}
