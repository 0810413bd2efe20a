/// Result of processing a slash command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Display a message to the user.
    Message(String),
    /// Forget the conversation.
    Clear,
    /// Quit the application.
    Quit,
    /// Not a command - treat as regular input.
    NotACommand,
    /// List registered providers.
    ListProviders,
    /// Activate a provider.
    ProviderChanged(String),
    /// Change the sampling temperature.
    TemperatureChanged(f32),
    /// Replace the system prompt, keeping the current temperature.
    SystemPromptChanged(String),
    /// Apply a stored system prompt preset.
    ApplyPreset(String),
    /// List stored system prompt presets.
    ListPresets,
    /// List stored user prompts.
    ListPrompts,
    /// Send a stored user prompt, optionally followed by extra text.
    UsePrompt { name: String, extra: Option<String> },
    /// Store a system prompt preset.
    SavePreset {
        name: String,
        temperature: f32,
        text: String,
    },
    /// Store a user prompt.
    SavePrompt { name: String, text: String },
    /// Save the transcript.
    SaveTranscript,
}

pub fn handle_command(input: &str) -> CommandResult {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/help" | "/h" => show_help(),
        "/exit" | "/quit" | "/q" => CommandResult::Quit,
        "/clear" => CommandResult::Clear,
        "/save" => CommandResult::SaveTranscript,

        // Provider and sampling
        "/providers" => CommandResult::ListProviders,
        "/provider" => {
            if arg.is_empty() {
                CommandResult::Message(
                    "Usage: /provider <id>\nUse /providers to list identifiers.".into(),
                )
            } else {
                CommandResult::ProviderChanged(arg.to_string())
            }
        }
        "/temperature" | "/temp" => match arg.parse::<f32>() {
            Ok(value) => CommandResult::TemperatureChanged(value),
            Err(_) => CommandResult::Message("Usage: /temperature <0.0-1.0>".into()),
        },

        // System prompts
        "/system" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /system <prompt text>".into())
            } else {
                CommandResult::SystemPromptChanged(arg.to_string())
            }
        }
        "/preset" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /preset <name>".into())
            } else {
                CommandResult::ApplyPreset(arg.to_string())
            }
        }
        "/presets" => CommandResult::ListPresets,
        "/save-preset" => parse_save_preset(arg),

        // User prompts
        "/prompts" => CommandResult::ListPrompts,
        "/use" => {
            let mut split = arg.splitn(2, ' ');
            match split.next().filter(|name| !name.is_empty()) {
                Some(name) => CommandResult::UsePrompt {
                    name: name.to_string(),
                    extra: split
                        .next()
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                },
                None => CommandResult::Message("Usage: /use <name> [extra text]".into()),
            }
        }
        "/save-prompt" => {
            let mut split = arg.splitn(2, ' ');
            match (split.next().filter(|n| !n.is_empty()), split.next()) {
                (Some(name), Some(text)) if !text.trim().is_empty() => CommandResult::SavePrompt {
                    name: name.to_string(),
                    text: text.trim().to_string(),
                },
                _ => CommandResult::Message("Usage: /save-prompt <name> <text>".into()),
            }
        }

        "/version" => CommandResult::Message(format!(
            "PromptDesk v{}",
            env!("CARGO_PKG_VERSION")
        )),

        // Unknown command
        _ => {
            if input.starts_with('/') {
                CommandResult::Message(format!("Unknown command: {cmd}. Type /help for commands."))
            } else {
                CommandResult::NotACommand
            }
        }
    }
}

fn parse_save_preset(arg: &str) -> CommandResult {
    const USAGE: &str = "Usage: /save-preset <name> <temperature> <text>";

    let mut split = arg.splitn(3, ' ');
    let name = split.next().filter(|n| !n.is_empty());
    let temperature = split.next().and_then(|t| t.parse::<f32>().ok());
    let text = split.next().map(str::trim).filter(|t| !t.is_empty());

    match (name, temperature, text) {
        (Some(name), Some(temperature), Some(text)) => CommandResult::SavePreset {
            name: name.to_string(),
            temperature,
            text: text.to_string(),
        },
        _ => CommandResult::Message(USAGE.into()),
    }
}

fn show_help() -> CommandResult {
    let help_text = "\
PromptDesk Commands

  CONVERSATION
    /clear                          Forget the conversation
    /save                           Save the transcript (JSON + plain text)

  PROVIDER
    /providers                      List provider identifiers
    /provider <id>                  Switch provider (keeps the conversation)
    /temperature <t>                Set temperature (0.0 - 1.0)

  SYSTEM PROMPTS
    /system <text>                  Replace the system prompt (starts over)
    /presets                        List stored presets
    /preset <name>                  Apply a stored preset
    /save-preset <name> <t> <text>  Store a preset

  USER PROMPTS
    /prompts                        List stored prompts
    /use <name> [extra text]        Send a stored prompt
    /save-prompt <name> <text>      Store a prompt

  OTHER
    /help, /h                       Show this help message
    /version                        Show version information
    /exit, /quit, /q                Quit";

    CommandResult::Message(help_text.into())
}
