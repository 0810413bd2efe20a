/// PromptDesk: centralized constants.
/// Endpoints, defaults, file names and environment variables live here.

// ─── Models ───────────────────────────────────────────────────────────────────

pub mod models {
    pub const ANTHROPIC_HAIKU: &str = "claude-3-haiku-20240307";
    pub const ANTHROPIC_SONNET: &str = "claude-3-sonnet-20240229";
    pub const ANTHROPIC_OPUS: &str = "claude-3-opus-20240229";
    pub const GEMINI_PRO: &str = "gemini-1.5-pro-latest";
    pub const GROQ_LLAMA3: &str = "llama3-70b-8192";
    pub const GROQ_MIXTRAL: &str = "mixtral-8x7b-32768";
    pub const COHERE_DEFAULT: &str = "command-r";
    pub const OLLAMA_PHI3: &str = "phi3";
}

// ─── API Endpoints ────────────────────────────────────────────────────────────

pub mod endpoints {
    pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
    pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai";
    pub const GOOGLE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
    pub const COHERE_BASE_URL: &str = "https://api.cohere.ai";
    pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";
}

// ─── Environment ──────────────────────────────────────────────────────────────

pub mod env {
    pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
    pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
    pub const COHERE_API_KEY: &str = "COHERE_API_KEY";
    /// Outbound proxy used by providers flagged `use_proxy`.
    pub const PROXY: &str = "PROXY";
}

// ─── Default Settings ─────────────────────────────────────────────────────────

pub mod defaults {
    pub const TEMPERATURE: f32 = 0.7;
    pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";
    /// Library entry used as the startup system prompt when present.
    pub const SYSTEM_PROMPT_KEY: &str = "default";
    /// Turns echoed back after each message.
    pub const DISPLAY_TURNS: usize = 2;
    pub const MAX_TOKENS: u32 = 4096;
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;
    pub const MIN_TEMPERATURE: f32 = 0.0;
    pub const MAX_TEMPERATURE: f32 = 1.0;
}

// ─── Config Paths ─────────────────────────────────────────────────────────────

pub mod paths {
    pub const CONFIG_DIR: &str = "promptdesk";
    pub const CONFIG_FILE: &str = "config.toml";
    pub const SYSTEM_PROMPTS_FILE: &str = "system_prompts.json";
    pub const USER_PROMPTS_FILE: &str = "user_prompts.json";
    pub const TRANSCRIPT_FILE: &str = "chat_history.json";
    pub const PLAIN_TEXT_EXTENSION: &str = "txt";
}
