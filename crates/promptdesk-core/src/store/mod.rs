mod document;
mod library;
mod transcript;
pub mod viewer;

pub use document::JsonDocument;
pub use library::{PromptLibrary, SystemPromptEntry, SystemPromptLibrary, UserPromptLibrary};
pub use transcript::TranscriptStore;
pub use viewer::open_in_viewer;

use crate::constants::paths;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Owns the three backing documents kept in one data directory.
#[derive(Debug)]
pub struct PromptStore {
    dir: PathBuf,
    system_prompts: SystemPromptLibrary,
    user_prompts: UserPromptLibrary,
    transcripts: TranscriptStore,
}

impl PromptStore {
    /// Load every document under `dir`. Missing files start out empty.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        Ok(Self {
            system_prompts: SystemPromptLibrary::load(dir.join(paths::SYSTEM_PROMPTS_FILE))?,
            user_prompts: UserPromptLibrary::load(dir.join(paths::USER_PROMPTS_FILE))?,
            transcripts: TranscriptStore::load(dir.join(paths::TRANSCRIPT_FILE))?,
            dir,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn system_prompts(&self) -> &SystemPromptLibrary {
        &self.system_prompts
    }

    pub fn system_prompts_mut(&mut self) -> &mut SystemPromptLibrary {
        &mut self.system_prompts
    }

    pub fn user_prompts(&self) -> &UserPromptLibrary {
        &self.user_prompts
    }

    pub fn user_prompts_mut(&mut self) -> &mut UserPromptLibrary {
        &mut self.user_prompts
    }

    pub fn transcripts(&self) -> &TranscriptStore {
        &self.transcripts
    }

    pub fn transcripts_mut(&mut self) -> &mut TranscriptStore {
        &mut self.transcripts
    }

    /// Persist both prompt libraries. Returns how many documents were written.
    pub fn persist_libraries(&mut self) -> Result<usize> {
        let mut written = 0;
        if self.system_prompts.persist()? {
            written += 1;
        }
        if self.user_prompts.persist()? {
            written += 1;
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_empty_dir() {
        let dir = TempDir::new().unwrap();
        let store = PromptStore::open(dir.path()).unwrap();
        assert!(store.system_prompts().is_empty());
        assert!(store.user_prompts().is_empty());
        assert!(store.transcripts().turns().is_empty());
    }

    #[test]
    fn test_persist_libraries_counts_only_dirty_documents() {
        let dir = TempDir::new().unwrap();
        let mut store = PromptStore::open(dir.path()).unwrap();
        assert_eq!(store.persist_libraries().unwrap(), 0);

        store
            .user_prompts_mut()
            .upsert("summarize", "Summarize this:".to_string());
        assert_eq!(store.persist_libraries().unwrap(), 1);
        assert!(dir.path().join("user_prompts.json").exists());
        assert!(!dir.path().join("system_prompts.json").exists());
    }
}
