use crate::error::{DeskError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A JSON backing document held in memory with a dirty flag.
///
/// Mutations only touch memory; `persist` writes through when something changed
/// since the last write.
#[derive(Debug)]
pub struct JsonDocument<T> {
    path: PathBuf,
    content: T,
    dirty: bool,
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Load the document, or start from an empty value when the file does not exist yet.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let content = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| DeskError::persistence("read", &path, e))?;
            if raw.trim().is_empty() {
                T::default()
            } else {
                serde_json::from_str(&raw).map_err(|e| DeskError::persistence("parse", &path, e))?
            }
        } else {
            T::default()
        };

        Ok(Self {
            path,
            content,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &T {
        &self.content
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mutate the in-memory content and mark the document dirty.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        self.dirty = true;
        f(&mut self.content)
    }

    /// Write the document if dirty. Returns whether a write happened.
    pub fn persist(&mut self) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }

        let contents = serde_json::to_string_pretty(&self.content)
            .map_err(|e| DeskError::persistence("serialize", &self.path, e))?;
        write_atomic(&self.path, &contents)?;
        self.dirty = false;

        tracing::info!(path = %self.path.display(), "Persisted document");
        Ok(true)
    }
}

/// Write through a temporary sibling and rename it into place.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DeskError::persistence("create", parent, e))?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, contents).map_err(|e| DeskError::persistence("write", &tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| DeskError::persistence("rename", path, e))?;
    Ok(())
}
