use promptdesk_core::*;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ========================================================================
// Scripted client
// ========================================================================

/// Replies from a queue; `Err` entries simulate provider failures.
struct ScriptedLlm {
    replies: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
    model: String,
}

#[async_trait::async_trait]
impl LlmClient for ScriptedLlm {
    async fn chat(&self, _messages: &[Message]) -> std::result::Result<LlmResponse, DeskError> {
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(LlmResponse::text(text)),
            Some(Err(reason)) => Err(DeskError::ProviderCall(reason)),
            None => Ok(LlmResponse::text("(no script)")),
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Clone, Default)]
struct ScriptedFactory {
    replies: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
}

impl ScriptedFactory {
    fn reply(&self, text: &str) {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
    }

    fn fail(&self, reason: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(reason.to_string()));
    }
}

impl ClientFactory for ScriptedFactory {
    fn build(&self, config: &ProviderConfig, _temperature: f32) -> Result<Box<dyn LlmClient>> {
        Ok(Box::new(ScriptedLlm {
            replies: self.replies.clone(),
            model: config.model.clone(),
        }))
    }
}

fn scripted_session(dir: &TempDir) -> (SessionManager, ScriptedFactory) {
    let factory = ScriptedFactory::default();
    let session = SessionManager::new(
        ProviderRegistry::builtin(),
        Box::new(factory.clone()),
        PromptStore::open(dir.path()).unwrap(),
        SessionDefaults::default(),
    );
    (session, factory)
}

// ========================================================================
// Temperature
// ========================================================================

#[test]
fn test_set_temperature_accepts_only_unit_range() {
    let dir = TempDir::new().unwrap();
    let (mut session, _) = scripted_session(&dir);
    session.select_provider("Ollama-phi3").unwrap();

    for t in [0.0, 0.25, 1.0] {
        session.set_temperature(t).unwrap();
        assert_eq!(session.temperature(), t);
    }

    for t in [-0.1, 1.1, 42.0] {
        let result = session.set_temperature(t);
        assert!(matches!(result, Err(DeskError::InvalidTemperature(_))));
        assert_eq!(session.temperature(), 1.0);
    }
}

#[tokio::test]
async fn test_set_temperature_keeps_conversation() {
    let dir = TempDir::new().unwrap();
    let (mut session, factory) = scripted_session(&dir);
    session.select_provider("Ollama-phi3").unwrap();
    factory.reply("Hi there");
    session.send_message("Hello").await.unwrap();

    session.set_temperature(0.3).unwrap();

    assert_eq!(session.temperature(), 0.3);
    assert_eq!(session.transcript().len(), 2);
    assert_eq!(session.memory_len(), 2);
    assert_eq!(session.system_prompt(), "You are a helpful assistant.");
}

// ========================================================================
// Provider selection
// ========================================================================

#[test]
fn test_unknown_provider_leaves_previous_binding() {
    let dir = TempDir::new().unwrap();
    let (mut session, _) = scripted_session(&dir);
    session.select_provider("Anthropic-Haiku").unwrap();

    let result = session.select_provider("Nonexistent-Model");
    assert!(matches!(result, Err(DeskError::UnknownProvider(_))));
    assert_eq!(session.provider(), Some("Anthropic-Haiku"));
    assert_eq!(session.state(), SessionState::Ready);
}

#[test]
fn test_every_registered_provider_selectable() {
    let dir = TempDir::new().unwrap();
    let (mut session, _) = scripted_session(&dir);
    for id in session.providers() {
        session.select_provider(&id).unwrap();
        assert_eq!(session.provider(), Some(id.as_str()));
    }
}

#[test]
fn test_missing_credential_does_not_switch() {
    let dir = TempDir::new().unwrap();
    let registry = ProviderRegistry::builtin();
    let factory = HttpClientFactory::new(Credentials::default());
    let mut session = SessionManager::new(
        registry,
        Box::new(factory),
        PromptStore::open(dir.path()).unwrap(),
        SessionDefaults::default(),
    );

    session.select_provider("Ollama-phi3").unwrap();
    let result = session.select_provider("Anthropic-Opus");
    assert!(matches!(result, Err(DeskError::MissingCredential { .. })));
    assert_eq!(session.provider(), Some("Ollama-phi3"));
}

#[tokio::test]
async fn test_local_provider_rejects_empty_input() {
    let dir = TempDir::new().unwrap();
    let factory = HttpClientFactory::new(Credentials::default());
    let mut session = SessionManager::new(
        ProviderRegistry::builtin(),
        Box::new(factory),
        PromptStore::open(dir.path()).unwrap(),
        SessionDefaults::default(),
    );
    assert_eq!(session.state(), SessionState::Unconfigured);

    session.select_provider("Ollama-phi3").unwrap();
    assert_eq!(session.state(), SessionState::Ready);

    let result = session.send_message("").await;
    assert!(matches!(result, Err(DeskError::EmptyInput)));
    assert!(session.transcript().is_empty());
}

// ========================================================================
// Messaging
// ========================================================================

#[tokio::test]
async fn test_send_message_returns_latest_exchange() {
    let dir = TempDir::new().unwrap();
    let (mut session, factory) = scripted_session(&dir);
    session.select_provider("Ollama-phi3").unwrap();
    session
        .set_system_prompt("You are a helpful assistant", 0.2)
        .unwrap();
    factory.reply("Hi there");

    let tail = session.send_message("Hello").await.unwrap();
    assert_eq!(tail, &[ChatTurn::user("Hello"), ChatTurn::assistant("Hi there")]);
}

#[tokio::test]
async fn test_tail_is_windowed_but_transcript_is_complete() {
    let dir = TempDir::new().unwrap();
    let (mut session, factory) = scripted_session(&dir);
    session.select_provider("Groq-mixtral-8x7b-32768").unwrap();
    factory.reply("one");
    factory.reply("two");

    session.send_message("first").await.unwrap();
    let tail = session.send_message("second").await.unwrap().to_vec();

    assert_eq!(tail.len(), 2);
    assert_eq!(tail[1].text, "two");
    assert_eq!(session.transcript().len(), 4);
}

#[tokio::test]
async fn test_timeout_then_clear_memory() {
    let dir = TempDir::new().unwrap();
    let (mut session, factory) = scripted_session(&dir);
    session.select_provider("Cohere").unwrap();
    factory.fail("request timed out");

    let result = session.send_message("ping").await;
    assert!(matches!(result, Err(DeskError::ProviderCall(_))));
    assert_eq!(session.transcript().turns(), &[ChatTurn::user("ping")]);
    assert_eq!(session.memory_len(), 0);

    session.clear_memory();
    assert!(session.transcript().is_empty());
}

#[tokio::test]
async fn test_clear_memory_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let (mut session, factory) = scripted_session(&dir);
    session.select_provider("Ollama-phi3").unwrap();
    factory.reply("pong");
    session.send_message("ping").await.unwrap();

    session.clear_memory();
    assert!(session.transcript().is_empty());
    session.clear_memory();
    assert!(session.transcript().is_empty());
    assert_eq!(session.memory_len(), 0);
}

// ========================================================================
// System prompt
// ========================================================================

#[tokio::test]
async fn test_empty_system_prompt_leaves_session_untouched() {
    let dir = TempDir::new().unwrap();
    let (mut session, factory) = scripted_session(&dir);
    session.select_provider("Ollama-phi3").unwrap();
    factory.reply("Hi there");
    session.send_message("Hello").await.unwrap();
    let before = session.system_prompt().to_string();

    let result = session.set_system_prompt("", 0.5);
    assert!(matches!(result, Err(DeskError::EmptyPrompt)));
    assert_eq!(session.system_prompt(), before);
    assert_eq!(session.transcript().len(), 2);
    assert_eq!(session.temperature(), 0.7);
}

#[tokio::test]
async fn test_new_system_prompt_starts_fresh_conversation() {
    let dir = TempDir::new().unwrap();
    let (mut session, factory) = scripted_session(&dir);
    session.select_provider("Ollama-phi3").unwrap();
    factory.reply("Hi there");
    session.send_message("Hello").await.unwrap();

    session.set_system_prompt("Be terse.", 0.1).unwrap();
    assert!(session.transcript().is_empty());
    assert_eq!(session.memory_len(), 0);
    assert_eq!(session.temperature(), 0.1);
}

#[test]
fn test_saved_preset_can_be_applied() {
    let dir = TempDir::new().unwrap();
    let (mut session, _) = scripted_session(&dir);
    session
        .save_system_prompt("pirate", 0.9, "Talk like a pirate.")
        .unwrap();
    session.apply_system_prompt("pirate").unwrap();

    assert_eq!(session.system_prompt(), "Talk like a pirate.");
    assert_eq!(session.temperature(), 0.9);
}

/// Builds clients until its budget runs out, then fails like a missing key would.
struct LimitedFactory {
    inner: ScriptedFactory,
    builds_left: AtomicUsize,
}

impl ClientFactory for LimitedFactory {
    fn build(&self, config: &ProviderConfig, temperature: f32) -> Result<Box<dyn LlmClient>> {
        let remaining = self.builds_left.load(Ordering::SeqCst);
        if remaining == 0 {
            return Err(DeskError::missing_credential(&config.id, "TEST_API_KEY"));
        }
        self.builds_left.store(remaining - 1, Ordering::SeqCst);
        self.inner.build(config, temperature)
    }
}

/// A ready session with one exchange whose factory refuses further builds.
async fn session_with_exhausted_factory(dir: &TempDir) -> (SessionManager, ScriptedFactory) {
    let scripted = ScriptedFactory::default();
    let factory = LimitedFactory {
        inner: scripted.clone(),
        builds_left: AtomicUsize::new(2),
    };
    let mut session = SessionManager::new(
        ProviderRegistry::builtin(),
        Box::new(factory),
        PromptStore::open(dir.path()).unwrap(),
        SessionDefaults::default(),
    );
    session.select_provider("Ollama-phi3").unwrap();
    session.set_temperature(0.3).unwrap();
    scripted.reply("Hi there");
    session.send_message("Hello").await.unwrap();
    (session, scripted)
}

#[tokio::test]
async fn test_failed_rebuild_on_system_prompt_keeps_previous_chain() {
    let dir = TempDir::new().unwrap();
    let (mut session, scripted) = session_with_exhausted_factory(&dir).await;

    let result = session.set_system_prompt("new", 0.9);
    assert!(matches!(result, Err(DeskError::MissingCredential { .. })));

    assert_eq!(session.system_prompt(), "You are a helpful assistant.");
    assert_eq!(session.temperature(), 0.3);
    assert_eq!(session.transcript().len(), 2);
    assert_eq!(session.memory_len(), 2);
    assert_eq!(session.state(), SessionState::Ready);

    scripted.reply("still here");
    let tail = session.send_message("Are you there?").await.unwrap();
    assert_eq!(tail[1], ChatTurn::assistant("still here"));
}

#[tokio::test]
async fn test_failed_rebuild_on_temperature_keeps_previous_chain() {
    let dir = TempDir::new().unwrap();
    let (mut session, _) = session_with_exhausted_factory(&dir).await;

    assert!(session.set_temperature(0.9).is_err());
    assert_eq!(session.temperature(), 0.3);
    assert_eq!(session.memory_len(), 2);
    assert_eq!(session.provider(), Some("Ollama-phi3"));
}

// ========================================================================
// Persistence through the session
// ========================================================================

#[tokio::test]
async fn test_save_transcript_writes_json_and_text() {
    let dir = TempDir::new().unwrap();
    let (mut session, factory) = scripted_session(&dir);
    session.select_provider("Ollama-phi3").unwrap();
    factory.reply("Hi there");
    session.send_message("Hello").await.unwrap();

    let exported = session.save_transcript().unwrap().unwrap();
    assert_eq!(
        std::fs::read_to_string(exported).unwrap(),
        "USER: Hello\n  AI: Hi there\n"
    );

    let json = std::fs::read_to_string(dir.path().join("chat_history.json")).unwrap();
    let turns: Vec<String> = serde_json::from_str(&json).unwrap();
    assert_eq!(turns, vec!["USER: Hello\n", "  AI: Hi there\n"]);

    // Nothing changed since the last save
    assert!(session.save_transcript().unwrap().is_none());
}

#[test]
fn test_prompt_libraries_survive_restart() {
    let dir = TempDir::new().unwrap();
    {
        let (mut session, _) = scripted_session(&dir);
        session
            .save_system_prompt("reviewer", 0.3, "Review the code.")
            .unwrap();
        session
            .save_user_prompt("explain", "Explain this step by step:")
            .unwrap();
        assert_eq!(session.persist_libraries().unwrap(), 2);
    }

    let (session, _) = scripted_session(&dir);
    let entry = session.system_prompts().get("reviewer").unwrap();
    assert_eq!(entry.text, "Review the code.");
    assert_eq!(entry.temperature, 0.3);
    assert_eq!(
        session.user_prompt("explain").unwrap(),
        "Explain this step by step:"
    );
    assert!(matches!(
        session.user_prompt("missing"),
        Err(DeskError::UnknownPrompt(_))
    ));
}
