use crate::constants::defaults;
use crate::context::{Chain, ChatTurn, ConversationMemory, PromptTemplate, Transcript};
use crate::error::{DeskError, Result};
use crate::llm::{ClientFactory, ProviderRegistry};
use crate::session::{
    validate_prompt, validate_prompt_name, validate_temperature, SessionDefaults, SessionState,
};
use crate::store::{PromptStore, SystemPromptEntry, SystemPromptLibrary, UserPromptLibrary};
use std::path::PathBuf;

/// Owns the single chat session: active provider, system prompt, temperature,
/// transcript and the chain bound to them.
///
/// Whenever the provider, temperature or system prompt changes the chain is
/// rebuilt before the call returns. A rebuild either replaces the whole chain
/// or leaves the previous one in place.
pub struct SessionManager {
    registry: ProviderRegistry,
    factory: Box<dyn ClientFactory>,
    store: PromptStore,
    provider: Option<String>,
    temperature: f32,
    system_prompt: String,
    transcript: Transcript,
    chain: Option<Chain>,
}

impl SessionManager {
    /// Create an unconfigured session. A `default` entry in the system prompt
    /// library takes precedence over `defaults`.
    pub fn new(
        registry: ProviderRegistry,
        factory: Box<dyn ClientFactory>,
        store: PromptStore,
        defaults: SessionDefaults,
    ) -> Self {
        let (temperature, system_prompt) =
            match store.system_prompts().get(defaults::SYSTEM_PROMPT_KEY) {
                Some(entry) if !entry.text.trim().is_empty() => {
                    (entry.temperature, entry.text.clone())
                }
                _ => (defaults.temperature, defaults.system_prompt),
            };

        Self {
            registry,
            factory,
            store,
            provider: None,
            temperature,
            system_prompt,
            transcript: Transcript::new(),
            chain: None,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.chain.is_some() {
            SessionState::Ready
        } else {
            SessionState::Unconfigured
        }
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Messages currently replayed to the provider on each turn.
    pub fn memory_len(&self) -> usize {
        self.chain.as_ref().map_or(0, |c| c.memory().len())
    }

    pub fn providers(&self) -> Vec<String> {
        self.registry.list_identifiers()
    }

    pub fn system_prompts(&self) -> &SystemPromptLibrary {
        self.store.system_prompts()
    }

    pub fn user_prompts(&self) -> &UserPromptLibrary {
        self.store.user_prompts()
    }

    /// Activate a provider and rebuild the chain. Memory and transcript carry over.
    pub fn select_provider(&mut self, identifier: &str) -> Result<()> {
        let system_prompt = self.system_prompt.clone();
        self.rebind(identifier, self.temperature, &system_prompt, false)?;
        self.provider = Some(identifier.to_string());

        tracing::info!(provider = identifier, "Provider activated");
        Ok(())
    }

    /// Replace the system prompt and temperature. Starts a fresh conversation.
    pub fn set_system_prompt(&mut self, text: &str, temperature: f32) -> Result<()> {
        let temperature = validate_temperature(temperature)?;
        validate_prompt(text)?;

        if let Some(provider) = self.provider.clone() {
            self.rebind(&provider, temperature, text, true)?;
        }

        self.system_prompt = text.to_string();
        self.temperature = temperature;
        self.transcript.clear();

        tracing::info!(temperature, "System prompt updated");
        Ok(())
    }

    /// Change only the sampling temperature. Memory and transcript are kept.
    pub fn set_temperature(&mut self, value: f32) -> Result<()> {
        let value = validate_temperature(value)?;

        if let Some(provider) = self.provider.clone() {
            let system_prompt = self.system_prompt.clone();
            self.rebind(&provider, value, &system_prompt, false)?;
        }

        self.temperature = value;
        tracing::info!(temperature = value, "Temperature updated");
        Ok(())
    }

    /// Send one user turn and return the two newest transcript entries.
    ///
    /// On a provider failure the user turn stays recorded and no assistant turn
    /// is added.
    pub async fn send_message(&mut self, user_text: &str) -> Result<&[ChatTurn]> {
        if user_text.trim().is_empty() {
            return Err(DeskError::EmptyInput);
        }
        let chain = self.chain.as_mut().ok_or(DeskError::NotConfigured)?;

        self.transcript.push(ChatTurn::user(user_text));

        match chain.predict(user_text).await {
            Ok(reply) => {
                self.transcript.push(ChatTurn::assistant(reply));
                Ok(self.transcript.tail(defaults::DISPLAY_TURNS))
            }
            Err(err) => {
                let err = match err {
                    DeskError::ProviderCall(_) => err,
                    other => DeskError::ProviderCall(other.to_string()),
                };
                tracing::warn!(provider = ?self.provider, error = %err, "Provider call failed");
                Err(err)
            }
        }
    }

    /// Forget the conversation. Always succeeds.
    pub fn clear_memory(&mut self) {
        if let Some(chain) = self.chain.as_mut() {
            chain.clear_memory();
        }
        self.transcript.clear();
    }

    /// Save the transcript as JSON and as a plain-text sibling.
    /// Returns the plain-text path when it was (re)written.
    pub fn save_transcript(&mut self) -> Result<Option<PathBuf>> {
        let transcripts = self.store.transcripts_mut();
        transcripts.replace(&self.transcript);
        transcripts.persist()?;
        transcripts.export_plain_text()
    }

    /// Switch to a stored system prompt preset.
    pub fn apply_system_prompt(&mut self, name: &str) -> Result<()> {
        let entry = self
            .store
            .system_prompts()
            .get(name)
            .cloned()
            .ok_or_else(|| DeskError::UnknownPrompt(name.to_string()))?;
        self.set_system_prompt(&entry.text, entry.temperature)
    }

    /// Add or overwrite a system prompt preset. Not written to disk until
    /// `persist_libraries`.
    pub fn save_system_prompt(&mut self, name: &str, temperature: f32, text: &str) -> Result<()> {
        validate_prompt_name(name)?;
        validate_prompt(text)?;
        let entry = SystemPromptEntry::new(temperature, text)?;
        self.store.system_prompts_mut().upsert(name.trim(), entry);
        Ok(())
    }

    /// Add or overwrite a user prompt.
    pub fn save_user_prompt(&mut self, name: &str, text: &str) -> Result<()> {
        validate_prompt_name(name)?;
        validate_prompt(text)?;
        self.store
            .user_prompts_mut()
            .upsert(name.trim(), text.to_string());
        Ok(())
    }

    pub fn user_prompt(&self, name: &str) -> Result<&str> {
        self.store
            .user_prompts()
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| DeskError::UnknownPrompt(name.to_string()))
    }

    /// Write any modified prompt library to disk.
    pub fn persist_libraries(&mut self) -> Result<usize> {
        self.store.persist_libraries()
    }

    /// Build a new client and chain for the given triple and swap it in.
    /// Client construction is the only fallible step and runs before any mutation.
    fn rebind(
        &mut self,
        provider: &str,
        temperature: f32,
        system_prompt: &str,
        reset_memory: bool,
    ) -> Result<()> {
        let config = self.registry.resolve(provider)?;
        let client = self.factory.build(config, temperature)?;

        let memory = if reset_memory {
            ConversationMemory::new()
        } else {
            self.chain
                .take()
                .map(Chain::into_memory)
                .unwrap_or_default()
        };

        let chain = Chain::new(client, PromptTemplate::new(system_prompt), memory);
        tracing::info!(
            provider,
            model = chain.model(),
            temperature,
            "Chain rebuilt"
        );
        self.chain = Some(chain);
        Ok(())
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("provider", &self.provider)
            .field("temperature", &self.temperature)
            .field("transcript", &self.transcript.len())
            .field("chain", &self.chain)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmClient, LlmResponse, Message, ProviderConfig, Role};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Records what each built client was configured with and what it was asked.
    #[derive(Default)]
    struct Probe {
        builds: Mutex<Vec<(String, f32)>>,
        requests: Mutex<Vec<Vec<Message>>>,
    }

    struct ProbeClient {
        probe: Arc<Probe>,
        model: String,
    }

    #[async_trait::async_trait]
    impl LlmClient for ProbeClient {
        async fn chat(&self, messages: &[Message]) -> std::result::Result<LlmResponse, DeskError> {
            self.probe.requests.lock().unwrap().push(messages.to_vec());
            Ok(LlmResponse::text("ok"))
        }

        fn model(&self) -> &str {
            &self.model
        }
    }

    struct ProbeFactory(Arc<Probe>);

    impl ClientFactory for ProbeFactory {
        fn build(&self, config: &ProviderConfig, temperature: f32) -> Result<Box<dyn LlmClient>> {
            self.0
                .builds
                .lock()
                .unwrap()
                .push((config.id.clone(), temperature));
            Ok(Box::new(ProbeClient {
                probe: self.0.clone(),
                model: config.model.clone(),
            }))
        }
    }

    fn session(dir: &TempDir) -> (SessionManager, Arc<Probe>) {
        let probe = Arc::new(Probe::default());
        let manager = SessionManager::new(
            ProviderRegistry::builtin(),
            Box::new(ProbeFactory(probe.clone())),
            PromptStore::open(dir.path()).unwrap(),
            SessionDefaults::default(),
        );
        (manager, probe)
    }

    #[test]
    fn test_library_default_entry_wins_over_settings() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("system_prompts.json"),
            r#"{"default": [0.1, "From the library"]}"#,
        )
        .unwrap();

        let (manager, _) = session(&dir);
        assert_eq!(manager.system_prompt(), "From the library");
        assert_eq!(manager.temperature(), 0.1);
    }

    #[test]
    fn test_set_temperature_rebuilds_with_new_value() {
        let dir = TempDir::new().unwrap();
        let (mut manager, probe) = session(&dir);
        manager.select_provider("Ollama-phi3").unwrap();
        manager.set_temperature(0.9).unwrap();

        let builds = probe.builds.lock().unwrap();
        assert_eq!(builds.len(), 2);
        assert_eq!(builds[1], ("Ollama-phi3".to_string(), 0.9));
    }

    #[test]
    fn test_settings_change_before_provider_does_not_build() {
        let dir = TempDir::new().unwrap();
        let (mut manager, probe) = session(&dir);
        manager.set_temperature(0.3).unwrap();
        manager.set_system_prompt("Short answers.", 0.4).unwrap();

        assert!(probe.builds.lock().unwrap().is_empty());
        assert_eq!(manager.state(), SessionState::Unconfigured);
        assert_eq!(manager.temperature(), 0.4);
    }

    #[tokio::test]
    async fn test_system_prompt_reaches_provider_first() {
        let dir = TempDir::new().unwrap();
        let (mut manager, probe) = session(&dir);
        manager.select_provider("Ollama-phi3").unwrap();
        manager.set_system_prompt("Answer in French.", 0.2).unwrap();
        manager.send_message("Hello").await.unwrap();

        let requests = probe.requests.lock().unwrap();
        assert_eq!(requests[0][0].role, Role::System);
        assert_eq!(requests[0][0].content, "Answer in French.");
        assert_eq!(requests[0][1].content, "Hello");
    }

    #[tokio::test]
    async fn test_provider_switch_keeps_memory() {
        let dir = TempDir::new().unwrap();
        let (mut manager, probe) = session(&dir);
        manager.select_provider("Ollama-phi3").unwrap();
        manager.send_message("first").await.unwrap();
        manager.select_provider("Groq-llama3-70b-8192").unwrap();
        manager.send_message("second").await.unwrap();

        let requests = probe.requests.lock().unwrap();
        // system, first, ok, second
        assert_eq!(requests[1].len(), 4);
        assert_eq!(manager.transcript().len(), 4);
        assert_eq!(manager.memory_len(), 4);
    }

    #[tokio::test]
    async fn test_send_before_provider_is_not_configured() {
        let dir = TempDir::new().unwrap();
        let (mut manager, _) = session(&dir);
        let result = manager.send_message("hi").await;
        assert!(matches!(result, Err(DeskError::NotConfigured)));
        assert!(manager.transcript().is_empty());
    }

    #[test]
    fn test_apply_unknown_preset() {
        let dir = TempDir::new().unwrap();
        let (mut manager, _) = session(&dir);
        assert!(matches!(
            manager.apply_system_prompt("nope"),
            Err(DeskError::UnknownPrompt(_))
        ));
    }

    #[test]
    fn test_save_prompt_validation() {
        let dir = TempDir::new().unwrap();
        let (mut manager, _) = session(&dir);

        assert!(matches!(
            manager.save_system_prompt(" ", 0.5, "text"),
            Err(DeskError::EmptyPromptName)
        ));
        assert!(matches!(
            manager.save_system_prompt("hot", 1.5, "text"),
            Err(DeskError::InvalidTemperature(_))
        ));
        assert!(matches!(
            manager.save_user_prompt("empty", ""),
            Err(DeskError::EmptyPrompt)
        ));
        assert!(manager.system_prompts().is_empty());
        assert!(manager.user_prompts().is_empty());
    }
}
