pub mod autosave;

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::Shared;

use crate::core::category::{self, CategorySet};
use crate::core::document::{Document, DocumentId};
use crate::error::{ApiError, ServiceError, StoreError};
use crate::notify::Notifier;
use crate::store::LocalStore;
use crate::sync::api::{DocumentPayload, RemoteApi};
use crate::sync::{SyncEngine, SyncOutcome};

/// Bounded exponential backoff for failed remote writes.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Delay before the given attempt (1-based): base, 2x base, 4x base...
    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

type SaveFuture = Pin<Box<dyn Future<Output = Result<Document, ServiceError>> + Send>>;
type SharedSave = Shared<SaveFuture>;

enum PushError {
    Remote(ApiError),
    Store(StoreError),
}

struct ServiceInner<S, R> {
    store: S,
    api: R,
    notifier: Box<dyn Notifier>,
    authenticated: AtomicBool,
    retry: RetryPolicy,
    /// In-flight save per document id; concurrent callers of the same id
    /// await this instead of issuing a duplicate write.
    pending: Mutex<HashMap<DocumentId, SharedSave>>,
    /// Retry attempt counters for documents whose remote write failed.
    attempts: Mutex<HashMap<DocumentId, u32>>,
}

/// Orchestrates dual-write persistence: local-first (the durability
/// guarantee), remote best-effort, with identity migration once the backend
/// assigns a permanent id.
pub struct DocumentService<S, R> {
    inner: Arc<ServiceInner<S, R>>,
}

impl<S, R> Clone for DocumentService<S, R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S, R> DocumentService<S, R>
where
    S: LocalStore + 'static,
    R: RemoteApi + 'static,
{
    pub fn new(store: S, api: R, notifier: Box<dyn Notifier>) -> Self {
        Self::with_retry(store, api, notifier, RetryPolicy::default())
    }

    pub fn with_retry(store: S, api: R, notifier: Box<dyn Notifier>, retry: RetryPolicy) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                store,
                api,
                notifier,
                authenticated: AtomicBool::new(false),
                retry,
                pending: Mutex::new(HashMap::new()),
                attempts: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn store(&self) -> &S {
        &self.inner.store
    }

    pub fn set_authenticated(&self, on: bool) {
        self.inner.authenticated.store(on, Ordering::Relaxed);
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.authenticated.load(Ordering::Relaxed)
    }

    /// Save a document: locally always, remotely when authenticated.
    ///
    /// Returns the best available state: the remote-confirmed version when
    /// the backend accepted the write, otherwise the locally saved version.
    /// Remote failures never turn a successful local save into an `Err`;
    /// they are classified, notified and (when transient) retried.
    pub async fn save_document(&self, doc: Document) -> Result<Document, ServiceError> {
        if doc.name.trim().is_empty() {
            return Err(ServiceError::EmptyName);
        }

        let id = doc.id.clone();
        let (fut, owns) = {
            let mut pending = self.inner.pending.lock().unwrap();
            match pending.get(&id) {
                Some(inflight) => (inflight.clone(), false),
                None => {
                    let svc = self.clone();
                    let work: SaveFuture = Box::pin(async move { svc.perform_save(doc).await });
                    let shared = work.shared();
                    pending.insert(id.clone(), shared.clone());
                    (shared, true)
                }
            }
        };

        let result = fut.await;
        if owns {
            self.inner.pending.lock().unwrap().remove(&id);
        }
        result
    }

    async fn perform_save(&self, doc: Document) -> Result<Document, ServiceError> {
        // Step 1, always: the local write. Store failures are fatal; there
        // is nothing beneath the local store to fall back to.
        self.inner.store.save_document(&doc)?;
        log::debug!("Saved '{}' locally ({})", doc.name, doc.id);

        if !self.is_authenticated() {
            return Ok(doc);
        }

        // Step 2: best-effort remote write.
        match self.push_remote(&doc).await {
            Ok(synced) => {
                if self.clear_attempts(&doc.id) {
                    self.inner
                        .notifier
                        .success(&format!("'{}' synced", synced.name));
                }
                Ok(synced)
            }
            Err(PushError::Store(e)) => Err(e.into()),
            Err(PushError::Remote(e)) if e.is_retryable() => {
                log::warn!("Remote save of '{}' failed ({}), will retry", doc.name, e);
                if self.attempt_count(&doc.id) == 0 {
                    self.inner
                        .notifier
                        .warning(&format!("'{}' saved locally; sync will be retried", doc.name));
                }
                self.schedule_retry(doc.id.clone());
                Ok(doc)
            }
            Err(PushError::Remote(e)) => {
                self.clear_attempts(&doc.id);
                self.inner
                    .notifier
                    .error(&format!("'{}' saved locally but not synced: {}", doc.name, e));
                Ok(doc)
            }
        }
    }

    /// Create or update on the backend, then reconcile the local entry with
    /// what the backend returned.
    async fn push_remote(&self, doc: &Document) -> Result<Document, PushError> {
        let payload = DocumentPayload::from_document(doc);
        let confirmed = match doc.id.remote() {
            None => self
                .inner
                .api
                .create_document(&payload)
                .await
                .map_err(PushError::Remote)?,
            Some(n) => self
                .inner
                .api
                .update_document(n, &payload)
                .await
                .map_err(PushError::Remote)?,
        };

        let synced = confirmed.into_document();
        self.migrate_identity(&doc.id, &synced)
            .map_err(PushError::Store)?;
        Ok(synced)
    }

    /// Replace the old identifier with the backend-confirmed one everywhere
    /// it is referenced: store entry and current-document pointer. A
    /// migration, not a copy.
    fn migrate_identity(&self, old: &DocumentId, synced: &Document) -> Result<(), StoreError> {
        self.inner.store.save_document(synced)?;
        if *old != synced.id {
            log::info!("Migrated document id {} -> {}", old, synced.id);
            self.inner.store.delete_document(old)?;
            if self.inner.store.current_document_id()?.as_ref() == Some(old) {
                self.inner.store.set_current_document_id(Some(&synced.id))?;
            }
        }
        Ok(())
    }

    fn attempt_count(&self, id: &DocumentId) -> u32 {
        *self.inner.attempts.lock().unwrap().get(id).unwrap_or(&0)
    }

    /// Remove the retry counter; true when a retry was actually pending.
    fn clear_attempts(&self, id: &DocumentId) -> bool {
        self.inner.attempts.lock().unwrap().remove(id).is_some()
    }

    fn schedule_retry(&self, id: DocumentId) {
        let attempt = {
            let mut attempts = self.inner.attempts.lock().unwrap();
            let counter = attempts.entry(id.clone()).or_insert(0);
            *counter += 1;
            *counter
        };

        if attempt > self.inner.retry.max_attempts {
            // Abandoned silently: the document stays local-only until the
            // next explicit save or sync.
            log::info!("Giving up on syncing {} after {} attempts", id, attempt - 1);
            self.clear_attempts(&id);
            return;
        }

        let delay = self.inner.retry.delay_for(attempt);
        log::debug!("Retry {} for {} in {:?}", attempt, id, delay);

        let svc = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !svc.is_authenticated() {
                svc.clear_attempts(&id);
                return;
            }
            // The document may have been deleted or superseded meanwhile.
            let doc = match svc.inner.store.document(&id) {
                Ok(Some(doc)) => doc,
                Ok(None) => {
                    svc.clear_attempts(&id);
                    return;
                }
                Err(e) => {
                    log::error!("Retry aborted, store unreadable: {}", e);
                    return;
                }
            };
            // Re-enter through the save path so the retry shares the
            // in-flight map with user-initiated saves.
            if let Err(e) = svc.save_document(doc).await {
                log::error!("Retry save of {} failed: {}", id, e);
            }
        });
    }

    /// Load from the local store only; it mirrors everything the user can
    /// currently access.
    pub fn load_document(&self, id: &DocumentId) -> Result<Document, ServiceError> {
        self.inner
            .store
            .document(id)?
            .ok_or_else(|| ServiceError::NotFound(id.clone()))
    }

    pub fn list_documents(&self) -> Result<Vec<Document>, ServiceError> {
        Ok(self.inner.store.all_documents()?)
    }

    /// Delete locally, then best-effort on the backend. Remote failures are
    /// logged, not surfaced; the local deletion already satisfied the
    /// user-visible action.
    pub async fn delete_document(&self, id: &DocumentId) -> Result<Document, ServiceError> {
        let Some(doc) = self.inner.store.delete_document(id)? else {
            return Err(ServiceError::NotFound(id.clone()));
        };
        if self.inner.store.current_document_id()?.as_ref() == Some(id) {
            self.inner.store.set_current_document_id(None)?;
        }
        self.clear_attempts(id);

        if self.is_authenticated() {
            if let Some(n) = id.remote() {
                if let Err(e) = self.inner.api.delete_document(n).await {
                    log::warn!("Remote delete of {} failed: {}", n, e);
                }
            }
        }
        Ok(doc)
    }

    pub fn current_document(&self) -> Result<Option<Document>, ServiceError> {
        match self.inner.store.current_document_id()? {
            Some(id) => Ok(self.inner.store.document(&id)?),
            None => Ok(None),
        }
    }

    pub async fn set_current_document(&self, id: &DocumentId) -> Result<(), ServiceError> {
        if self.inner.store.document(id)?.is_none() {
            return Err(ServiceError::NotFound(id.clone()));
        }
        self.inner.store.set_current_document_id(Some(id))?;

        if self.is_authenticated() {
            if let Some(n) = id.remote() {
                if let Err(e) = self.inner.api.set_current_document_id(n).await {
                    log::warn!("Failed to mirror current document to backend: {}", e);
                }
            }
        }
        Ok(())
    }

    pub fn categories(&self) -> Result<CategorySet, ServiceError> {
        Ok(self.inner.store.categories()?)
    }

    pub fn create_category(&self, name: &str) -> Result<CategorySet, ServiceError> {
        let mut cats = self.inner.store.categories()?;
        if cats.add(name) {
            self.inner.store.save_categories(&cats)?;
        }
        Ok(cats)
    }

    /// Delete a category; its documents move to "General". Protected and
    /// unknown names are a no-op returning the unchanged list.
    pub async fn delete_category(&self, name: &str) -> Result<CategorySet, ServiceError> {
        let mut cats = self.inner.store.categories()?;
        if !cats.remove(name) {
            return Ok(cats);
        }
        for mut doc in self.inner.store.all_documents()? {
            if doc.category == name {
                doc.category = category::GENERAL.to_string();
                // Through the save path so backend copies follow.
                self.save_document(doc).await?;
            }
        }
        self.inner.store.save_categories(&cats)?;
        Ok(cats)
    }

    /// Rename a category, relabeling its documents. Protected names are a
    /// no-op returning the unchanged list.
    pub async fn rename_category(&self, old: &str, new: &str) -> Result<CategorySet, ServiceError> {
        let mut cats = self.inner.store.categories()?;
        if !cats.rename(old, new) {
            return Ok(cats);
        }
        for mut doc in self.inner.store.all_documents()? {
            if doc.category == old {
                doc.category = new.to_string();
                self.save_document(doc).await?;
            }
        }
        self.inner.store.save_categories(&cats)?;
        Ok(cats)
    }

    /// Reconcile local and backend document sets. Called when
    /// authentication is newly established.
    pub async fn sync_with_backend(&self) -> Result<SyncOutcome, ServiceError> {
        if !self.is_authenticated() {
            log::warn!("Sync requested while unauthenticated; skipping");
            return Ok(SyncOutcome::default());
        }

        let local = self.inner.store.all_documents()?;
        let engine = SyncEngine::new(&self.inner.api);
        let outcome = match engine.sync_documents(&local).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.inner.notifier.error(&format!("Sync failed: {}", e));
                return Err(ServiceError::Remote(e));
            }
        };

        let mut cats = self.inner.store.categories()?;
        let mut cats_dirty = false;

        for doc in &outcome.pulled {
            self.inner.store.save_document(doc)?;
            if cats.add(&doc.category) {
                cats_dirty = true;
            }
        }

        for (old, synced) in &outcome.migrations {
            self.migrate_identity(old, synced)?;
            self.clear_attempts(old);
            if cats.add(&synced.category) {
                cats_dirty = true;
            }
        }

        if cats_dirty {
            self.inner.store.save_categories(&cats)?;
        }

        // Adopt the backend's current-document pointer when this client has
        // none of its own.
        if self.inner.store.current_document_id()?.is_none() {
            match self.inner.api.current_document_id().await {
                Ok(Some(n)) => {
                    let id = DocumentId::Remote(n);
                    if self.inner.store.document(&id)?.is_some() {
                        self.inner.store.set_current_document_id(Some(&id))?;
                    }
                }
                Ok(None) => {}
                Err(e) => log::warn!("Failed to fetch current document pointer: {}", e),
            }
        }

        for err in &outcome.errors {
            log::warn!("{}", err);
        }
        if !outcome.conflicts.is_empty() {
            self.inner.notifier.warning(&format!(
                "{} document(s) have sync conflicts; local copies kept",
                outcome.conflicts.len()
            ));
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::{MockApi, RecordingNotifier};

    fn service(
        api: MockApi,
    ) -> (DocumentService<MemoryStore, MockApi>, RecordingNotifier) {
        let notifier = RecordingNotifier::new();
        let retry = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
        };
        let svc = DocumentService::with_retry(
            MemoryStore::new(),
            api,
            Box::new(notifier.clone()),
            retry,
        );
        (svc, notifier)
    }

    fn doc(name: &str, content: &str) -> Document {
        let mut d = Document::new(name);
        d.content = content.to_string();
        d
    }

    #[test]
    fn backoff_doubles_per_attempt_from_the_base_delay() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        };
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
    }

    #[tokio::test]
    async fn unauthenticated_save_is_local_only() {
        let (svc, _) = service(MockApi::new());
        let saved = svc
            .save_document(doc("Notes", "Hello"))
            .await
            .unwrap();

        assert!(saved.id.is_local());
        assert!(saved.created_at.is_none());
        // Read-your-write: the local store has it immediately.
        let loaded = svc.load_document(&saved.id).unwrap();
        assert_eq!(loaded.content, "Hello");
        // No remote call was attempted.
        assert_eq!(svc.inner.api.create_calls(), 0);
        assert_eq!(svc.inner.api.update_calls(), 0);
    }

    #[tokio::test]
    async fn empty_name_is_rejected_before_any_write() {
        let (svc, _) = service(MockApi::new());
        let err = svc.save_document(doc("  ", "body")).await.unwrap_err();
        assert_eq!(err, ServiceError::EmptyName);
        assert_eq!(svc.store().save_calls(), 0);
    }

    #[tokio::test]
    async fn authenticated_save_migrates_to_backend_id() {
        let (svc, _) = service(MockApi::starting_at(42));
        svc.set_authenticated(true);

        let temp = doc("Notes", "Hello");
        let temp_id = temp.id.clone();
        let saved = svc.save_document(temp).await.unwrap();

        assert_eq!(saved.id, DocumentId::Remote(42));
        assert!(saved.created_at.is_some());
        // The temporary entry is gone; the permanent one is readable.
        assert!(svc.store().document(&temp_id).unwrap().is_none());
        assert_eq!(
            svc.load_document(&DocumentId::Remote(42)).unwrap().content,
            "Hello"
        );
    }

    #[tokio::test]
    async fn current_pointer_follows_identity_migration() {
        let (svc, _) = service(MockApi::starting_at(42));
        svc.set_authenticated(true);

        let temp = doc("Notes", "Hello");
        let temp_id = temp.id.clone();
        svc.store().save_document(&temp).unwrap();
        svc.store().set_current_document_id(Some(&temp_id)).unwrap();

        svc.save_document(temp).await.unwrap();

        assert_eq!(
            svc.store().current_document_id().unwrap(),
            Some(DocumentId::Remote(42))
        );
    }

    #[tokio::test]
    async fn existing_backend_document_is_updated_not_created() {
        let (svc, _) = service(MockApi::new());
        svc.set_authenticated(true);
        let id = svc.inner.api.seed_remote("Notes", "General", "v1");

        let mut d = doc("Notes", "v2");
        d.id = DocumentId::Remote(id);
        let saved = svc.save_document(d).await.unwrap();

        assert_eq!(saved.id, DocumentId::Remote(id));
        assert_eq!(svc.inner.api.create_calls(), 0);
        assert_eq!(svc.inner.api.update_calls(), 1);
        assert_eq!(svc.inner.api.remote_doc(id).unwrap().content, "v2");
    }

    #[tokio::test]
    async fn rapid_saves_of_one_document_issue_one_remote_write() {
        let (svc, _) = service(MockApi::new());
        svc.set_authenticated(true);

        let d = doc("Notes", "Hello");
        let (a, b) = tokio::join!(svc.save_document(d.clone()), svc.save_document(d.clone()));
        let (a, b) = (a.unwrap(), b.unwrap());

        // Both callers observed the same operation.
        assert_eq!(a.id, b.id);
        assert_eq!(svc.inner.api.create_calls(), 1);
        assert_eq!(svc.store().save_calls(), 2); // initial write + migrated entry
    }

    #[tokio::test(start_paused = true)]
    async fn retryable_failure_keeps_local_copy_and_retries() {
        let (svc, notifier) = service(MockApi::starting_at(42));
        svc.set_authenticated(true);
        svc.inner.api.fail_next(ApiError::Network("offline".into()));

        let temp = doc("Notes", "Hello");
        let temp_id = temp.id.clone();
        let saved = svc.save_document(temp).await.unwrap();

        // The local copy is authoritative in the interim.
        assert_eq!(saved.id, temp_id);
        assert_eq!(svc.load_document(&temp_id).unwrap().content, "Hello");
        assert_eq!(notifier.warnings().len(), 1);

        // Let the scheduled retry fire; the second create succeeds.
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(svc.inner.api.create_calls(), 2);
        assert!(svc.store().document(&temp_id).unwrap().is_none());
        assert_eq!(
            svc.load_document(&DocumentId::Remote(42)).unwrap().content,
            "Hello"
        );
        assert_eq!(notifier.successes(), vec!["'Notes' synced".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_stop_after_the_attempt_cap() {
        let (svc, _) = service(MockApi::new());
        svc.set_authenticated(true);
        svc.inner.api.fail_always(ApiError::Server(503));

        svc.save_document(doc("Notes", "Hello")).await.unwrap();

        // base 100ms, then 200ms, then 400ms; run well past all of them.
        tokio::time::sleep(Duration::from_secs(60)).await;

        // Initial attempt plus exactly three retries, then silence.
        assert_eq!(svc.inner.api.create_calls(), 4);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(svc.inner.api.create_calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_failure_is_surfaced_and_not_retried() {
        let (svc, notifier) = service(MockApi::new());
        svc.set_authenticated(true);
        svc.inner.api.fail_next(ApiError::Conflict("Notes".into()));

        let saved = svc.save_document(doc("Notes", "Hello")).await.unwrap();

        // Local copy remains saved but unsynced.
        assert!(saved.id.is_local());
        assert_eq!(notifier.errors().len(), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(svc.inner.api.create_calls(), 1);
    }

    #[tokio::test]
    async fn delete_issues_exactly_one_remote_delete() {
        let (svc, _) = service(MockApi::new());
        svc.set_authenticated(true);
        let mut d = doc("Notes", "Hello");
        d.id = DocumentId::Remote(42);
        svc.store().save_document(&d).unwrap();

        svc.delete_document(&DocumentId::Remote(42)).await.unwrap();

        assert!(svc.store().document(&DocumentId::Remote(42)).unwrap().is_none());
        assert_eq!(svc.inner.api.delete_calls(), 1);
        assert_eq!(svc.inner.api.deleted_ids(), vec![42]);
    }

    #[tokio::test]
    async fn deleting_local_only_document_skips_the_backend() {
        let (svc, _) = service(MockApi::new());
        svc.set_authenticated(true);
        let d = doc("Notes", "Hello");
        let id = d.id.clone();
        svc.store().save_document(&d).unwrap();

        svc.delete_document(&id).await.unwrap();
        assert_eq!(svc.inner.api.delete_calls(), 0);
    }

    #[tokio::test]
    async fn deleting_missing_document_is_not_found() {
        let (svc, _) = service(MockApi::new());
        let err = svc
            .delete_document(&DocumentId::Remote(9))
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::NotFound(DocumentId::Remote(9)));
    }

    #[tokio::test]
    async fn protected_categories_cannot_be_deleted_or_renamed() {
        let (svc, _) = service(MockApi::new());
        let before = svc.categories().unwrap();

        let after = svc.delete_category(category::GENERAL).await.unwrap();
        assert_eq!(after, before);
        let after = svc.rename_category(category::DRAFTS, "Scratch").await.unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn deleting_a_category_moves_documents_to_general() {
        let (svc, _) = service(MockApi::new());
        svc.create_category("Work").unwrap();
        let mut d = doc("Plan", "body");
        d.category = "Work".to_string();
        let id = d.id.clone();
        svc.save_document(d).await.unwrap();

        let cats = svc.delete_category("Work").await.unwrap();

        assert!(!cats.contains("Work"));
        assert_eq!(svc.load_document(&id).unwrap().category, category::GENERAL);
    }

    #[tokio::test]
    async fn sync_reconciles_identical_duplicate_into_one_document() {
        let (svc, _) = service(MockApi::new());
        svc.set_authenticated(true);
        let remote_id = svc.inner.api.seed_remote("Notes", "General", "Hello");

        let local = doc("Notes", "Hello");
        let local_id = local.id.clone();
        svc.store().save_document(&local).unwrap();

        let outcome = svc.sync_with_backend().await.unwrap();

        assert_eq!(outcome.adopted, 1);
        let all = svc.list_documents().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, DocumentId::Remote(remote_id));
        assert!(svc.store().document(&local_id).unwrap().is_none());
    }

    #[tokio::test]
    async fn sync_conflict_preserves_local_content_and_warns() {
        let (svc, notifier) = service(MockApi::new());
        svc.set_authenticated(true);
        svc.inner.api.seed_remote("Notes", "General", "server version");

        let local = doc("Notes", "local version");
        let local_id = local.id.clone();
        svc.store().save_document(&local).unwrap();

        let outcome = svc.sync_with_backend().await.unwrap();

        assert_eq!(outcome.conflicts.len(), 1);
        assert_eq!(
            svc.load_document(&local_id).unwrap().content,
            "local version"
        );
        assert_eq!(notifier.warnings().len(), 1);
    }

    #[tokio::test]
    async fn sync_imports_backend_documents_and_their_categories() {
        let (svc, _) = service(MockApi::new());
        svc.set_authenticated(true);
        let id = svc.inner.api.seed_remote("Minutes", "Meetings", "agenda");
        svc.inner.api.set_current_document_id(id).await.unwrap();

        svc.sync_with_backend().await.unwrap();

        assert_eq!(
            svc.load_document(&DocumentId::Remote(id)).unwrap().name,
            "Minutes"
        );
        assert!(svc.categories().unwrap().contains("Meetings"));
        // The backend's current pointer is adopted when none is set locally.
        assert_eq!(
            svc.current_document().unwrap().map(|d| d.id),
            Some(DocumentId::Remote(id))
        );
    }

    #[tokio::test]
    async fn sync_while_unauthenticated_is_a_noop() {
        let (svc, _) = service(MockApi::new());
        svc.inner.api.seed_remote("Notes", "General", "Hello");

        let outcome = svc.sync_with_backend().await.unwrap();

        assert!(outcome.pulled.is_empty());
        assert!(svc.list_documents().unwrap().is_empty());
    }
}
