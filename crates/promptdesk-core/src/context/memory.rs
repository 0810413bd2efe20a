use crate::llm::Message;

/// Conversation buffer replayed in full on every completion request.
///
/// Unbounded: nothing is summarized or trimmed, so long sessions grow the prompt
/// without limit.
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    messages: Vec<Message>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed exchange.
    pub fn save_context(&mut self, input: impl Into<String>, output: impl Into<String>) {
        self.messages.push(Message::user(input));
        self.messages.push(Message::assistant(output));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn estimate_tokens(&self) -> usize {
        self.messages.iter().map(|m| m.content.len() / 4).sum()
    }
}
