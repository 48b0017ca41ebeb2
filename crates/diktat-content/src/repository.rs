//! Content repository implementations.
//!
//! `FsContentRepository` reads a directory of dictation files on every call,
//! so edits on disk show up without a restart. `MemoryContentRepository`
//! holds parsed dictations in memory for tests and embedding.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, warn};

use diktat_core::error::{DiktatError, Result};
use diktat_core::types::{ContentRepository, Dictation, DictationId};

use crate::parser::parse_dictation;

/// Dictations stored as files in a single directory.
#[derive(Debug, Clone)]
pub struct FsContentRepository {
    dir: PathBuf,
    extension: String,
}

impl FsContentRepository {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }
}

impl ContentRepository for FsContentRepository {
    fn list_dictations(&self) -> Result<Vec<DictationId>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(dir = %self.dir.display(), "Dictation directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(&self.extension) {
                    ids.push(name.to_string());
                }
            }
        }
        ids.sort();
        debug!(count = ids.len(), dir = %self.dir.display(), "Listed dictations");
        Ok(ids)
    }

    fn load_dictation(&self, id: &str) -> Result<Dictation> {
        // Only listed names are readable, which rules out path traversal.
        if !self.list_dictations()?.iter().any(|known| known == id) {
            return Err(DiktatError::NotFound(format!("Unknown dictation '{}'", id)));
        }
        let text = std::fs::read_to_string(self.dir.join(id)).map_err(|e| {
            DiktatError::Content(format!("Failed to read dictation '{}': {}", id, e))
        })?;
        Ok(parse_dictation(id, &text))
    }
}

/// Dictations held in memory, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentRepository {
    dictations: BTreeMap<DictationId, Dictation>,
}

impl MemoryContentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text` in the dictation file format and add it under `id`.
    pub fn with_text(mut self, id: &str, text: &str) -> Self {
        self.insert(parse_dictation(id, text));
        self
    }

    pub fn insert(&mut self, dictation: Dictation) {
        self.dictations.insert(dictation.id.clone(), dictation);
    }
}

impl ContentRepository for MemoryContentRepository {
    fn list_dictations(&self) -> Result<Vec<DictationId>> {
        Ok(self.dictations.keys().cloned().collect())
    }

    fn load_dictation(&self, id: &str) -> Result<Dictation> {
        self.dictations
            .get(id)
            .cloned()
            .ok_or_else(|| DiktatError::NotFound(format!("Unknown dictation '{}'", id)))
    }
}
