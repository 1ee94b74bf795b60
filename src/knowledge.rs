//! Static question/answer knowledge base.
//!
//! Loaded once at startup from a JSON file and never mutated afterwards.
//! The file is an object whose collection key (default `insurance_faq`)
//! holds the entries:
//!
//! ```json
//! { "insurance_faq": [ { "question": "...", "answer": "..." } ] }
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::config::KnowledgeConfig;

/// One question/answer pair. A field absent from the file reads as `""`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KnowledgeEntry {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

impl KnowledgeEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Ordered, read-only list of entries. Duplicate questions are kept in
/// file order.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    pub fn new(entries: Vec<KnowledgeEntry>) -> Self {
        Self { entries }
    }

    /// Parses a knowledge file's JSON text, reading entries from `collection_key`.
    pub fn from_json_str(content: &str, collection_key: &str) -> Result<Self> {
        let root: serde_json::Value =
            serde_json::from_str(content).with_context(|| "Knowledge file is not valid JSON")?;

        let collection = match root.get(collection_key) {
            Some(value) => value,
            None => bail!("Knowledge file has no top-level '{}' key", collection_key),
        };
        if !collection.is_array() {
            bail!("Knowledge file key '{}' must hold a list", collection_key);
        }

        let entries: Vec<KnowledgeEntry> = serde_json::from_value(collection.clone())
            .with_context(|| format!("Invalid entries under '{}'", collection_key))?;

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Loads the knowledge base described by `[knowledge]`.
///
/// Any failure here is fatal for the caller: the service has nothing to
/// ground its answers on without the file.
pub fn load_knowledge_base(config: &KnowledgeConfig) -> Result<KnowledgeBase> {
    load_from_path(&config.path, &config.collection_key)
}

pub fn load_from_path(path: &Path, collection_key: &str) -> Result<KnowledgeBase> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read knowledge file: {}", path.display()))?;
    let kb = KnowledgeBase::from_json_str(&content, collection_key)
        .with_context(|| format!("Failed to load knowledge file: {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        entries = kb.len(),
        "knowledge base loaded"
    );
    Ok(kb)
}
