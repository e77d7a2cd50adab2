use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::core::document::Document;
use crate::store::LocalStore;
use crate::sync::api::RemoteApi;

use super::DocumentService;

/// Debounced auto-save.
///
/// Each edit reschedules the single pending save; only the delay elapsing
/// without a newer edit commits. An aborted task never ran its save, so a
/// keystroke burst collapses into one write.
pub struct Autosaver<S, R>
where
    S: LocalStore + 'static,
    R: RemoteApi + 'static,
{
    service: DocumentService<S, R>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<S, R> Autosaver<S, R>
where
    S: LocalStore + 'static,
    R: RemoteApi + 'static,
{
    pub fn new(service: DocumentService<S, R>, delay: Duration) -> Self {
        Self {
            service,
            delay,
            pending: Mutex::new(None),
        }
    }

    /// (Re)arm the timer with the latest document state.
    pub fn schedule(&self, doc: Document) {
        let mut pending = self.pending.lock().unwrap();
        if let Some(handle) = pending.take() {
            handle.abort();
        }
        let svc = self.service.clone();
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            log::debug!("Auto-saving '{}'", doc.name);
            if let Err(e) = svc.save_document(doc).await {
                log::error!("Auto-save failed: {}", e);
            }
        }));
    }

    /// Drop the pending save, e.g. when the document is closed after an
    /// explicit save.
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.lock().unwrap().take() {
            handle.abort();
        }
    }
}
