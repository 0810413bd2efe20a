use crate::constants::paths;
use crate::context::{ChatTurn, Transcript};
use crate::error::{DeskError, Result};
use crate::store::document::{write_atomic, JsonDocument};
use std::path::{Path, PathBuf};

/// Saved chat transcript: a JSON document of rendered turns plus a plain-text sibling.
///
/// The JSON document and the plain-text export track changes separately, so
/// writing one never marks the other as clean.
#[derive(Debug)]
pub struct TranscriptStore {
    document: JsonDocument<Vec<String>>,
    export_pending: bool,
}

impl TranscriptStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            document: JsonDocument::load(path)?,
            export_pending: false,
        })
    }

    pub fn turns(&self) -> &[String] {
        self.document.content()
    }

    pub fn append(&mut self, turn: &ChatTurn) {
        self.export_pending = true;
        self.document.update(|turns| turns.push(turn.render()));
    }

    /// Replace the stored turns with the given transcript. Identical content is a no-op.
    pub fn replace(&mut self, transcript: &Transcript) {
        let rendered = transcript.rendered();
        if rendered == *self.document.content() {
            return;
        }
        self.export_pending = true;
        self.document.update(|turns| *turns = rendered);
    }

    pub fn persist(&mut self) -> Result<bool> {
        self.document.persist()
    }

    pub fn is_dirty(&self) -> bool {
        self.document.is_dirty()
    }

    pub fn is_export_pending(&self) -> bool {
        self.export_pending
    }

    pub fn path(&self) -> &Path {
        self.document.path()
    }

    pub fn plain_text_path(&self) -> PathBuf {
        self.document.path().with_extension(paths::PLAIN_TEXT_EXTENSION)
    }

    /// Write the human-readable rendering if anything changed since the last export.
    /// Returns the path written, for opening in a viewer.
    pub fn export_plain_text(&mut self) -> Result<Option<PathBuf>> {
        if !self.export_pending {
            return Ok(None);
        }

        let path = self.plain_text_path();
        if path == self.document.path() {
            return Err(DeskError::Persistence(format!(
                "Plain-text export would overwrite {}",
                path.display()
            )));
        }

        write_atomic(&path, &self.turns().concat())?;
        self.export_pending = false;

        tracing::info!(path = %path.display(), "Exported transcript as plain text");
        Ok(Some(path))
    }
}
