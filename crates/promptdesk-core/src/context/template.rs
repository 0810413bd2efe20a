use crate::llm::Message;

/// Chat prompt layout: system prompt, prior turns, then the new human input.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    system_prompt: String,
}

impl PromptTemplate {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn render(&self, history: &[Message], input: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(&self.system_prompt));
        messages.extend(history.iter().cloned());
        messages.push(Message::user(input));
        messages
    }
}
