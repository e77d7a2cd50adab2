pub mod api;

use std::collections::{HashMap, HashSet};

use crate::core::document::{Document, DocumentId};
use crate::error::ApiError;
use api::{DocumentPayload, RemoteApi};

/// A local-only document and a backend document that appear to be the same
/// logical document (matching name and category) but with divergent content.
/// Resolution is deferred to the user; the local version stays the working
/// copy.
#[derive(Debug, Clone)]
pub struct SyncConflict {
    pub local_id: DocumentId,
    pub remote_id: u64,
    pub name: String,
    pub category: String,
}

/// What a reconciliation pass decided. The engine computes; the service
/// applies this to the local store.
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    /// Backend documents to upsert locally (new or refreshed).
    pub pulled: Vec<Document>,
    /// Identity migrations: temporary local id replaced by the
    /// backend-confirmed document.
    pub migrations: Vec<(DocumentId, Document)>,
    /// Number of local-only documents created on the backend.
    pub pushed: usize,
    /// Number of local-only documents silently reconciled with an identical
    /// backend copy.
    pub adopted: usize,
    /// Divergent-content matches needing user resolution.
    pub conflicts: Vec<SyncConflict>,
    /// Non-fatal per-document errors encountered during the sweep.
    pub errors: Vec<String>,
}

/// Reconciles the local document set against the full backend list. Run when
/// authentication is newly established.
pub struct SyncEngine<'a, R> {
    api: &'a R,
}

impl<'a, R: RemoteApi> SyncEngine<'a, R> {
    pub fn new(api: &'a R) -> Self {
        Self { api }
    }

    pub async fn sync_documents(&self, local: &[Document]) -> Result<SyncOutcome, ApiError> {
        let mut outcome = SyncOutcome::default();

        log::info!("Starting sync with {} local documents", local.len());

        // Only the initial listing is fatal; per-document failures are
        // collected and the sweep continues.
        let remote = self.api.list_documents().await?;
        log::info!("Got {} remote documents", remote.len());

        let remote_by_slot: HashMap<(&str, &str), usize> = remote
            .iter()
            .enumerate()
            .map(|(i, r)| ((r.name.as_str(), r.category.as_str()), i))
            .collect();

        let local_by_remote: HashMap<u64, &Document> = local
            .iter()
            .filter_map(|d| d.id.remote().map(|n| (n, d)))
            .collect();

        // Step 1: reconcile local-only documents (temporary ids).
        let mut claimed: HashSet<u64> = HashSet::new();
        for doc in local.iter().filter(|d| d.id.is_local()) {
            match remote_by_slot
                .get(&(doc.name.as_str(), doc.category.as_str()))
                .map(|&i| &remote[i])
            {
                Some(matched) if matched.content == doc.content => {
                    // Same name, category and content: adopt the backend
                    // identity and timestamps, discard the duplicate.
                    log::info!("Adopting backend copy of '{}' (id {})", doc.name, matched.id);
                    claimed.insert(matched.id);
                    outcome
                        .migrations
                        .push((doc.id.clone(), matched.clone().into_document()));
                    outcome.adopted += 1;
                }
                Some(matched) => {
                    log::info!(
                        "Conflict: '{}' in '{}' differs from backend id {}",
                        doc.name,
                        doc.category,
                        matched.id
                    );
                    claimed.insert(matched.id);
                    outcome.conflicts.push(SyncConflict {
                        local_id: doc.id.clone(),
                        remote_id: matched.id,
                        name: doc.name.clone(),
                        category: doc.category.clone(),
                    });
                }
                None => {
                    let payload = DocumentPayload::from_document(doc);
                    match self.api.create_document(&payload).await {
                        Ok(created) => {
                            log::info!("Migrated '{}' to backend id {}", doc.name, created.id);
                            claimed.insert(created.id);
                            outcome
                                .migrations
                                .push((doc.id.clone(), created.into_document()));
                            outcome.pushed += 1;
                        }
                        Err(e) => {
                            log::warn!("Failed to migrate '{}': {}", doc.name, e);
                            outcome
                                .errors
                                .push(format!("Failed to migrate '{}': {}", doc.name, e));
                        }
                    }
                }
            }
        }

        // Step 2: pull the rest of the backend set into the local mirror.
        // Ids claimed by an adoption or a conflict above are skipped; a
        // conflicting backend copy must not land next to the kept local one.
        for r in &remote {
            if claimed.contains(&r.id) {
                continue;
            }
            match local_by_remote.get(&r.id) {
                None => {
                    log::info!("Importing backend document '{}' (id {})", r.name, r.id);
                    outcome.pulled.push(r.clone().into_document());
                }
                Some(known) => {
                    if known.content != r.content
                        || known.name != r.name
                        || known.category != r.category
                    {
                        log::debug!("Refreshing '{}' from backend (id {})", r.name, r.id);
                        outcome.pulled.push(r.clone().into_document());
                    }
                }
            }
        }

        log::info!(
            "Sync pass complete: {} pulled, {} pushed, {} adopted, {} conflicts, {} errors",
            outcome.pulled.len(),
            outcome.pushed,
            outcome.adopted,
            outcome.conflicts.len(),
            outcome.errors.len()
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockApi;

    fn local_doc(name: &str, content: &str) -> Document {
        let mut doc = Document::new(name);
        doc.content = content.to_string();
        doc
    }

    #[tokio::test]
    async fn identical_local_copy_adopts_backend_identity() {
        let api = MockApi::new();
        let id = api.seed_remote("Notes", "General", "Hello");
        let local = vec![local_doc("Notes", "Hello")];

        let outcome = SyncEngine::new(&api).sync_documents(&local).await.unwrap();

        assert_eq!(outcome.adopted, 1);
        assert!(outcome.conflicts.is_empty());
        assert_eq!(outcome.migrations.len(), 1);
        let (old, new) = &outcome.migrations[0];
        assert_eq!(old, &local[0].id);
        assert_eq!(new.id, DocumentId::Remote(id));
        // The backend copy is claimed by the migration, not re-imported.
        assert!(outcome.pulled.is_empty());
        assert_eq!(api.create_calls(), 0);
    }

    #[tokio::test]
    async fn divergent_content_records_conflict_and_keeps_local() {
        let api = MockApi::new();
        let id = api.seed_remote("Notes", "General", "server version");
        let local = vec![local_doc("Notes", "local version")];

        let outcome = SyncEngine::new(&api).sync_documents(&local).await.unwrap();

        assert_eq!(outcome.conflicts.len(), 1);
        assert_eq!(outcome.conflicts[0].remote_id, id);
        assert_eq!(outcome.conflicts[0].local_id, local[0].id);
        // Neither side is written: no migration, no pull, no push.
        assert!(outcome.migrations.is_empty());
        assert!(outcome.pulled.is_empty());
        assert_eq!(outcome.pushed, 0);
        assert_eq!(api.create_calls(), 0);
    }

    #[tokio::test]
    async fn unmatched_local_document_is_pushed() {
        let api = MockApi::new();
        let local = vec![local_doc("Fresh", "body")];

        let outcome = SyncEngine::new(&api).sync_documents(&local).await.unwrap();

        assert_eq!(outcome.pushed, 1);
        assert_eq!(api.create_calls(), 1);
        assert_eq!(outcome.migrations.len(), 1);
        assert!(outcome.migrations[0].1.id.remote().is_some());
    }

    #[tokio::test]
    async fn backend_only_documents_are_imported() {
        let api = MockApi::new();
        let id = api.seed_remote("ServerDoc", "General", "body");

        let outcome = SyncEngine::new(&api).sync_documents(&[]).await.unwrap();

        assert_eq!(outcome.pulled.len(), 1);
        assert_eq!(outcome.pulled[0].id, DocumentId::Remote(id));
    }

    #[tokio::test]
    async fn push_failure_is_collected_not_fatal() {
        let api = MockApi::new();
        api.fail_next(ApiError::Server(502));
        let local = vec![local_doc("Fresh", "body"), local_doc("Other", "text")];

        let outcome = SyncEngine::new(&api).sync_documents(&local).await.unwrap();

        // First create fails, the sweep continues with the second.
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.pushed, 1);
    }

    #[tokio::test]
    async fn synced_document_is_refreshed_from_backend() {
        let api = MockApi::new();
        let id = api.seed_remote("Notes", "General", "newer server content");
        let mut known = local_doc("Notes", "stale mirror");
        known.id = DocumentId::Remote(id);

        let outcome = SyncEngine::new(&api).sync_documents(&[known]).await.unwrap();

        assert_eq!(outcome.pulled.len(), 1);
        assert_eq!(outcome.pulled[0].content, "newer server content");
    }
}
