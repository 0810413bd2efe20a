mod chain;
mod memory;
mod template;
mod transcript;

pub use chain::Chain;
pub use memory::ConversationMemory;
pub use template::PromptTemplate;
pub use transcript::{ChatTurn, Transcript, TurnRole};
