use crate::context::{ConversationMemory, PromptTemplate};
use crate::error::Result;
use crate::llm::LlmClient;

/// A bound client, a prompt template and the memory replayed through it.
pub struct Chain {
    client: Box<dyn LlmClient>,
    template: PromptTemplate,
    memory: ConversationMemory,
}

impl Chain {
    pub fn new(client: Box<dyn LlmClient>, template: PromptTemplate, memory: ConversationMemory) -> Self {
        Self {
            client,
            template,
            memory,
        }
    }

    /// Answer one human turn. Memory only records the exchange when the call succeeds.
    pub async fn predict(&mut self, input: &str) -> Result<String> {
        let messages = self.template.render(self.memory.messages(), input);

        tracing::debug!(
            model = self.client.model(),
            messages = messages.len(),
            approx_tokens = self.memory.estimate_tokens(),
            "Requesting completion"
        );

        let response = self.client.chat(&messages).await?;
        if let Some(usage) = response.usage {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Completion received"
            );
        }

        let output = response.message.content;
        self.memory.save_context(input, output.clone());
        Ok(output)
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn clear_memory(&mut self) {
        self.memory.clear();
    }

    /// Give the memory back so it can be attached to a rebuilt chain.
    pub fn into_memory(self) -> ConversationMemory {
        self.memory
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("model", &self.client.model())
            .field("template", &self.template)
            .field("memory", &self.memory.len())
            .finish()
    }
}
