use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::category::CategorySet;
use crate::core::document::{Document, DocumentId};
use crate::error::StoreError;

use super::LocalStore;

/// Side state kept next to the documents: the current-document pointer and
/// the tracked category names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreState {
    #[serde(default)]
    current: Option<DocumentId>,
    #[serde(default)]
    categories: Option<CategorySet>,
}

/// Documents as individual JSON files under `<root>/documents/<id>.json`,
/// plus a `state.json` for the pointer and category list.
pub struct FileStore {
    documents_dir: PathBuf,
    state_path: PathBuf,
}

impl FileStore {
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let documents_dir = data_dir.join("documents");
        std::fs::create_dir_all(&documents_dir).map_err(|e| io_err(&documents_dir, &e))?;
        Ok(Self {
            documents_dir,
            state_path: data_dir.join("state.json"),
        })
    }

    fn document_path(&self, id: &DocumentId) -> PathBuf {
        // Both id forms ("local-<uuid>", decimal) are filename-safe.
        self.documents_dir.join(format!("{}.json", id))
    }

    fn read_state(&self) -> Result<StoreState, StoreError> {
        match std::fs::read_to_string(&self.state_path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| corrupt_err(&self.state_path, &e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreState::default()),
            Err(e) => Err(io_err(&self.state_path, &e)),
        }
    }

    fn write_state(&self, state: &StoreState) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| corrupt_err(&self.state_path, &e))?;
        std::fs::write(&self.state_path, json).map_err(|e| io_err(&self.state_path, &e))
    }
}

impl LocalStore for FileStore {
    fn all_documents(&self) -> Result<Vec<Document>, StoreError> {
        let entries =
            std::fs::read_dir(&self.documents_dir).map_err(|e| io_err(&self.documents_dir, &e))?;

        let mut docs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_err(&self.documents_dir, &e))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = std::fs::read_to_string(&path).map_err(|e| io_err(&path, &e))?;
            let doc: Document =
                serde_json::from_str(&content).map_err(|e| corrupt_err(&path, &e))?;
            docs.push(doc);
        }
        // Stable listing order for the CLI and the sync sweep.
        docs.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.to_string().cmp(&b.id.to_string())));
        Ok(docs)
    }

    fn document(&self, id: &DocumentId) -> Result<Option<Document>, StoreError> {
        let path = self.document_path(id);
        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|e| corrupt_err(&path, &e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(&path, &e)),
        }
    }

    fn save_document(&self, doc: &Document) -> Result<(), StoreError> {
        let path = self.document_path(&doc.id);
        let json = serde_json::to_string_pretty(doc).map_err(|e| corrupt_err(&path, &e))?;
        std::fs::write(&path, json).map_err(|e| io_err(&path, &e))
    }

    fn delete_document(&self, id: &DocumentId) -> Result<Option<Document>, StoreError> {
        let Some(doc) = self.document(id)? else {
            return Ok(None);
        };
        let path = self.document_path(id);
        std::fs::remove_file(&path).map_err(|e| io_err(&path, &e))?;
        Ok(Some(doc))
    }

    fn categories(&self) -> Result<CategorySet, StoreError> {
        Ok(self.read_state()?.categories.unwrap_or_default())
    }

    fn save_categories(&self, categories: &CategorySet) -> Result<(), StoreError> {
        let mut state = self.read_state()?;
        state.categories = Some(categories.clone());
        self.write_state(&state)
    }

    fn current_document_id(&self) -> Result<Option<DocumentId>, StoreError> {
        Ok(self.read_state()?.current)
    }

    fn set_current_document_id(&self, id: Option<&DocumentId>) -> Result<(), StoreError> {
        let mut state = self.read_state()?;
        state.current = id.cloned();
        self.write_state(&state)
    }

    fn clear(&self) -> Result<(), StoreError> {
        std::fs::remove_dir_all(&self.documents_dir)
            .map_err(|e| io_err(&self.documents_dir, &e))?;
        std::fs::create_dir_all(&self.documents_dir)
            .map_err(|e| io_err(&self.documents_dir, &e))?;
        match std::fs::remove_file(&self.state_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(&self.state_path, &e)),
        }
    }
}

fn io_err(path: &Path, e: &std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

fn corrupt_err(path: &Path, e: &serde_json::Error) -> StoreError {
    StoreError::Corrupt {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}
