pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::core::category::CategorySet;
use crate::core::document::{Document, DocumentId};
use crate::error::StoreError;

/// Local persistence of documents and categories, keyed by document id.
///
/// This is the durability floor: every mutation the service performs lands
/// here first, before any remote write is attempted. Implementations use
/// interior mutability so one store can be shared across async tasks.
pub trait LocalStore: Send + Sync {
    fn all_documents(&self) -> Result<Vec<Document>, StoreError>;

    fn document(&self, id: &DocumentId) -> Result<Option<Document>, StoreError>;

    fn save_document(&self, doc: &Document) -> Result<(), StoreError>;

    /// Remove a document, returning it if it existed.
    fn delete_document(&self, id: &DocumentId) -> Result<Option<Document>, StoreError>;

    fn categories(&self) -> Result<CategorySet, StoreError>;

    fn save_categories(&self, categories: &CategorySet) -> Result<(), StoreError>;

    fn current_document_id(&self) -> Result<Option<DocumentId>, StoreError>;

    fn set_current_document_id(&self, id: Option<&DocumentId>) -> Result<(), StoreError>;

    /// Wipe documents, categories and the current pointer.
    fn clear(&self) -> Result<(), StoreError>;
}
