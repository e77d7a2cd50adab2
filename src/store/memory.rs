use std::collections::HashMap;
use std::sync::Mutex;

use crate::core::category::CategorySet;
use crate::core::document::{Document, DocumentId};
use crate::error::StoreError;

use super::LocalStore;

#[derive(Default)]
struct Inner {
    docs: HashMap<DocumentId, Document>,
    categories: Option<CategorySet>,
    current: Option<DocumentId>,
    save_calls: usize,
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save_document` calls so far. Lets tests assert save
    /// idempotence without peeking at internals.
    pub fn save_calls(&self) -> usize {
        self.inner.lock().unwrap().save_calls
    }
}

impl LocalStore for MemoryStore {
    fn all_documents(&self) -> Result<Vec<Document>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut docs: Vec<Document> = inner.docs.values().cloned().collect();
        docs.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.id.to_string().cmp(&b.id.to_string()))
        });
        Ok(docs)
    }

    fn document(&self, id: &DocumentId) -> Result<Option<Document>, StoreError> {
        Ok(self.inner.lock().unwrap().docs.get(id).cloned())
    }

    fn save_document(&self, doc: &Document) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.save_calls += 1;
        inner.docs.insert(doc.id.clone(), doc.clone());
        Ok(())
    }

    fn delete_document(&self, id: &DocumentId) -> Result<Option<Document>, StoreError> {
        Ok(self.inner.lock().unwrap().docs.remove(id))
    }

    fn categories(&self) -> Result<CategorySet, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .categories
            .clone()
            .unwrap_or_default())
    }

    fn save_categories(&self, categories: &CategorySet) -> Result<(), StoreError> {
        self.inner.lock().unwrap().categories = Some(categories.clone());
        Ok(())
    }

    fn current_document_id(&self) -> Result<Option<DocumentId>, StoreError> {
        Ok(self.inner.lock().unwrap().current.clone())
    }

    fn set_current_document_id(&self, id: Option<&DocumentId>) -> Result<(), StoreError> {
        self.inner.lock().unwrap().current = id.cloned();
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.docs.clear();
        inner.categories = None;
        inner.current = None;
        Ok(())
    }
}
