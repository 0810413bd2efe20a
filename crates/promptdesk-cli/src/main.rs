use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod app;
mod commands;

#[derive(Parser)]
#[command(name = "promptdesk")]
#[command(about = "PromptDesk - chat with hosted and local LLMs from the terminal")]
#[command(version)]
struct Cli {
    /// Run a single prompt and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// Provider identifier to activate (see /providers)
    #[arg(long)]
    provider: Option<String>,

    /// Sampling temperature between 0 and 1
    #[arg(short, long)]
    temperature: Option<f32>,

    /// System prompt for this session
    #[arg(short, long)]
    system_prompt: Option<String>,

    /// Directory holding prompt libraries and the saved transcript
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Settings file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => promptdesk_core::Settings::load_from(path)?,
        None => promptdesk_core::Settings::load(),
    };

    let overrides = app::Overrides {
        provider: cli.provider,
        temperature: cli.temperature,
        system_prompt: cli.system_prompt,
        data_dir: cli.data_dir,
    };
    let mut session = app::build_session(&settings, &overrides)?;

    if let Some(prompt) = cli.prompt {
        app::run_single_prompt(&mut session, &prompt).await?;
    } else {
        app::run_repl(session, settings.open_exports).await?;
    }

    Ok(())
}
