use crate::error::{DeskError, Result};
use crate::store::document::JsonDocument;
use crate::validate_temperature;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A named system prompt preset. Stored on disk as a `[temperature, text]` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f32, String)", into = "(f32, String)")]
pub struct SystemPromptEntry {
    pub temperature: f32,
    pub text: String,
}

impl SystemPromptEntry {
    pub fn new(temperature: f32, text: impl Into<String>) -> Result<Self> {
        Ok(Self {
            temperature: validate_temperature(temperature)?,
            text: text.into(),
        })
    }
}

impl TryFrom<(f32, String)> for SystemPromptEntry {
    type Error = DeskError;

    fn try_from((temperature, text): (f32, String)) -> Result<Self> {
        Self::new(temperature, text)
    }
}

impl From<SystemPromptEntry> for (f32, String) {
    fn from(entry: SystemPromptEntry) -> Self {
        (entry.temperature, entry.text)
    }
}

/// A persisted name → value mapping with last-write-wins upserts.
#[derive(Debug)]
pub struct PromptLibrary<V> {
    document: JsonDocument<BTreeMap<String, V>>,
}

pub type SystemPromptLibrary = PromptLibrary<SystemPromptEntry>;
pub type UserPromptLibrary = PromptLibrary<String>;

impl<V> PromptLibrary<V>
where
    V: Serialize + DeserializeOwned,
{
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            document: JsonDocument::load(path)?,
        })
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.document.content().get(name)
    }

    /// Names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.document.content().keys().cloned().collect()
    }

    pub fn entries(&self) -> &BTreeMap<String, V> {
        self.document.content()
    }

    /// Insert or replace an entry. Returns the previous value for that name.
    pub fn upsert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        let name = name.into();
        self.document.update(|entries| entries.insert(name, value))
    }

    pub fn persist(&mut self) -> Result<bool> {
        self.document.persist()
    }

    pub fn is_dirty(&self) -> bool {
        self.document.is_dirty()
    }

    pub fn path(&self) -> &Path {
        self.document.path()
    }

    pub fn len(&self) -> usize {
        self.document.content().len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.content().is_empty()
    }
}
