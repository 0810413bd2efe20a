use anyhow::{Context, Result};
use promptdesk_core::{
    open_in_viewer, Credentials, HttpClientFactory, PromptStore, SessionManager, Settings,
};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};

use crate::commands::{self, CommandResult};

/// Command-line overrides applied on top of the settings file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub provider: Option<String>,
    pub temperature: Option<f32>,
    pub system_prompt: Option<String>,
    pub data_dir: Option<PathBuf>,
}

/// What the loop should do after one line of input.
#[derive(Debug, PartialEq)]
pub enum Step {
    Continue(Vec<String>),
    Quit,
}

// ── Startup ─────────────────────────────────────────────────────────────

pub fn build_session(settings: &Settings, overrides: &Overrides) -> Result<SessionManager> {
    let registry = settings
        .build_provider_registry()
        .context("Invalid provider table")?;
    let credentials = Credentials::from_env(&registry);
    let factory = HttpClientFactory::new(credentials).with_timeout(settings.request_timeout());

    let data_dir = overrides
        .data_dir
        .clone()
        .unwrap_or_else(|| settings.data_dir());
    let store = PromptStore::open(&data_dir)
        .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;

    let mut session = SessionManager::new(
        registry,
        Box::new(factory),
        store,
        settings.session_defaults()?,
    );
    apply_overrides(&mut session, settings, overrides)?;
    Ok(session)
}

/// Apply startup choices in an order that builds the chain at most once per step.
pub fn apply_overrides(
    session: &mut SessionManager,
    settings: &Settings,
    overrides: &Overrides,
) -> Result<()> {
    if let Some(prompt) = &overrides.system_prompt {
        let temperature = overrides.temperature.unwrap_or(session.temperature());
        session.set_system_prompt(prompt, temperature)?;
    } else if let Some(temperature) = overrides.temperature {
        session.set_temperature(temperature)?;
    }

    if let Some(provider) = &overrides.provider {
        session.select_provider(provider)?;
    } else if let Some(provider) = &settings.default_provider {
        // A configured default that cannot be bound leaves the session unconfigured
        if let Err(e) = session.select_provider(provider) {
            tracing::warn!(provider = %provider, error = %e, "Default provider not activated");
        }
    }

    Ok(())
}

// ── Single-prompt mode ──────────────────────────────────────────────────

pub async fn run_single_prompt(session: &mut SessionManager, prompt: &str) -> Result<()> {
    let tail = session.send_message(prompt).await?;
    if let Some(reply) = tail.last() {
        println!("{}", reply.text);
    }
    Ok(())
}

// ── Interactive mode ────────────────────────────────────────────────────

pub async fn run_repl(mut session: SessionManager, open_exports: bool) -> Result<()> {
    let input = BufReader::new(tokio::io::stdin());
    run_repl_with(&mut session, input, tokio::io::stdout(), open_exports).await
}

/// Drive the loop over any line source and sink. Prompt libraries are written
/// on exit, including when the loop stops on an I/O error.
pub async fn run_repl_with<R, W>(
    session: &mut SessionManager,
    input: R,
    mut output: W,
    open_exports: bool,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let outcome = repl_loop(session, input.lines(), &mut output, open_exports).await;

    let written = session.persist_libraries()?;
    tracing::debug!(written, "Prompt libraries persisted on exit");
    outcome
}

async fn repl_loop<R, W>(
    session: &mut SessionManager,
    mut lines: Lines<R>,
    output: &mut W,
    open_exports: bool,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(banner(session).as_bytes()).await?;

    loop {
        output.write_all(b"> ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }

        match handle_input(session, &line, open_exports).await {
            Step::Continue(entries) => {
                for entry in entries {
                    output.write_all(entry.as_bytes()).await?;
                    output.write_all(b"\n").await?;
                }
            }
            Step::Quit => return Ok(()),
        }
    }
}

fn banner(session: &SessionManager) -> String {
    let provider = session.provider().unwrap_or("none (use /provider <id>)");
    format!(
        "PromptDesk v{}\nProvider: {provider}  Temperature: {}\nType /help for commands.\n",
        env!("CARGO_PKG_VERSION"),
        session.temperature()
    )
}

/// Handle one line: a slash command or a chat message.
pub async fn handle_input(session: &mut SessionManager, line: &str, open_exports: bool) -> Step {
    match commands::handle_command(line) {
        CommandResult::NotACommand => Step::Continue(send(session, line.trim()).await),
        CommandResult::Quit => Step::Quit,
        result => Step::Continue(handle_command_result(session, result, open_exports).await),
    }
}

async fn send(session: &mut SessionManager, text: &str) -> Vec<String> {
    match session.send_message(text).await {
        Ok(tail) => tail.iter().map(ToString::to_string).collect(),
        Err(e) => vec![format!("Error: {e}")],
    }
}

async fn handle_command_result(
    session: &mut SessionManager,
    result: CommandResult,
    open_exports: bool,
) -> Vec<String> {
    let outcome: promptdesk_core::Result<String> = match result {
        CommandResult::Message(msg) => Ok(msg),
        CommandResult::Clear => {
            session.clear_memory();
            Ok("Conversation cleared.".into())
        }
        CommandResult::ListProviders => {
            let active = session.provider().map(str::to_string);
            let list = session
                .providers()
                .into_iter()
                .map(|id| {
                    let marker = if Some(&id) == active.as_ref() { "*" } else { " " };
                    format!(" {marker} {id}")
                })
                .collect::<Vec<_>>()
                .join("\n");
            Ok(format!("Providers:\n{list}"))
        }
        CommandResult::ProviderChanged(id) => session
            .select_provider(&id)
            .map(|_| format!("Provider changed to: {id}")),
        CommandResult::TemperatureChanged(value) => session
            .set_temperature(value)
            .map(|_| format!("Temperature set to {value}")),
        CommandResult::SystemPromptChanged(text) => {
            let temperature = session.temperature();
            session
                .set_system_prompt(&text, temperature)
                .map(|_| "System prompt updated. Conversation cleared.".to_string())
        }
        CommandResult::ApplyPreset(name) => session.apply_system_prompt(&name).map(|_| {
            format!(
                "Preset '{name}' applied (temperature {}). Conversation cleared.",
                session.temperature()
            )
        }),
        CommandResult::ListPresets => Ok(list_or_empty(
            "System prompt presets",
            session
                .system_prompts()
                .entries()
                .iter()
                .map(|(name, entry)| format!("  {name} [{}]: {}", entry.temperature, entry.text)),
        )),
        CommandResult::ListPrompts => Ok(list_or_empty(
            "User prompts",
            session
                .user_prompts()
                .entries()
                .iter()
                .map(|(name, text)| format!("  {name}: {text}")),
        )),
        CommandResult::UsePrompt { name, extra } => {
            let text = match session.user_prompt(&name) {
                Ok(stored) => match extra {
                    Some(extra) => format!("{stored}\n{extra}"),
                    None => stored.to_string(),
                },
                Err(e) => return vec![format!("Error: {e}")],
            };
            return send(session, &text).await;
        }
        CommandResult::SavePreset {
            name,
            temperature,
            text,
        } => session
            .save_system_prompt(&name, temperature, &text)
            .map(|_| format!("Preset '{name}' saved.")),
        CommandResult::SavePrompt { name, text } => session
            .save_user_prompt(&name, &text)
            .map(|_| format!("Prompt '{name}' saved.")),
        CommandResult::SaveTranscript => match session.save_transcript() {
            Ok(Some(path)) => {
                if open_exports {
                    if let Err(e) = open_in_viewer(&path).await {
                        tracing::warn!(error = %e, "Could not open transcript viewer");
                    }
                }
                Ok(format!("Transcript saved to {}", path.display()))
            }
            Ok(None) => Ok("Transcript unchanged since last save.".into()),
            Err(e) => Err(e),
        },
        CommandResult::NotACommand | CommandResult::Quit => Ok(String::new()),
    };

    match outcome {
        Ok(msg) => vec![msg],
        Err(e) => vec![format!("Error: {e}")],
    }
}

fn list_or_empty(title: &str, items: impl Iterator<Item = String>) -> String {
    let items: Vec<String> = items.collect();
    if items.is_empty() {
        format!("{title}: none")
    } else {
        format!("{title}:\n{}", items.join("\n"))
    }
}

