// Library interface for promptdesk-cli
// This allows integration tests to access internal modules

// NOTE: Since app.rs and commands.rs are also declared in main.rs,
// we need to use a path attribute to reference the same source file
// to avoid "file loaded multiple times" errors.

#[path = "app.rs"]
pub mod app;

#[path = "commands.rs"]
pub mod commands;

// Re-export commonly used items for easier testing
pub use app::{handle_input, Overrides, Step};
pub use commands::{handle_command, CommandResult};
