//! Test doubles shared by the sync and service test modules.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::error::ApiError;
use crate::notify::Notifier;
use crate::sync::api::{DocumentPayload, RemoteApi, RemoteDocument};

#[derive(Default)]
struct MockState {
    docs: Vec<RemoteDocument>,
    next_id: u64,
    fail_queue: VecDeque<ApiError>,
    fail_always: Option<ApiError>,
    create_calls: usize,
    update_calls: usize,
    delete_calls: usize,
    list_calls: usize,
    deleted_ids: Vec<u64>,
    current: Option<u64>,
}

/// Scripted backend. Mutating calls (create/update/delete) consume scripted
/// failures; listing and the current pointer always succeed so sync tests
/// can target the push path specifically.
pub(crate) struct MockApi {
    state: Mutex<MockState>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_id: 1,
                ..MockState::default()
            }),
        }
    }

    /// Ids the backend will assign, starting here.
    pub fn starting_at(next_id: u64) -> Self {
        let api = Self::new();
        api.state.lock().unwrap().next_id = next_id;
        api
    }

    pub fn seed_remote(&self, name: &str, category: &str, content: &str) -> u64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        let now = Utc::now();
        state.docs.push(RemoteDocument {
            id,
            name: name.to_string(),
            content: content.to_string(),
            category: category.to_string(),
            created_at: now,
            updated_at: now,
        });
        id
    }

    /// Fail the next mutating call with `err`, once.
    pub fn fail_next(&self, err: ApiError) {
        self.state.lock().unwrap().fail_queue.push_back(err);
    }

    /// Fail every mutating call with `err` until cleared.
    pub fn fail_always(&self, err: ApiError) {
        self.state.lock().unwrap().fail_always = Some(err);
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    pub fn update_calls(&self) -> usize {
        self.state.lock().unwrap().update_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.state.lock().unwrap().delete_calls
    }

    pub fn deleted_ids(&self) -> Vec<u64> {
        self.state.lock().unwrap().deleted_ids.clone()
    }

    pub fn remote_doc(&self, id: u64) -> Option<RemoteDocument> {
        self.state
            .lock()
            .unwrap()
            .docs
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }
}

fn take_failure(state: &mut MockState) -> Option<ApiError> {
    state
        .fail_queue
        .pop_front()
        .or_else(|| state.fail_always.clone())
}

impl RemoteApi for MockApi {
    async fn create_document(&self, payload: &DocumentPayload) -> Result<RemoteDocument, ApiError> {
        // Suspend once, like real I/O would, so overlapping callers are
        // observable by the in-flight save map.
        tokio::task::yield_now().await;
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;
        if let Some(err) = take_failure(&mut state) {
            return Err(err);
        }
        let id = state.next_id;
        state.next_id += 1;
        let now = Utc::now();
        let doc = RemoteDocument {
            id,
            name: payload.name.clone(),
            content: payload.content.clone(),
            category: payload.category.clone(),
            created_at: now,
            updated_at: now,
        };
        state.docs.push(doc.clone());
        Ok(doc)
    }

    async fn update_document(
        &self,
        id: u64,
        payload: &DocumentPayload,
    ) -> Result<RemoteDocument, ApiError> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().unwrap();
        state.update_calls += 1;
        if let Some(err) = take_failure(&mut state) {
            return Err(err);
        }
        let Some(doc) = state.docs.iter_mut().find(|d| d.id == id) else {
            return Err(ApiError::NotFound(id.to_string()));
        };
        doc.name = payload.name.clone();
        doc.content = payload.content.clone();
        doc.category = payload.category.clone();
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn delete_document(&self, id: u64) -> Result<(), ApiError> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().unwrap();
        state.delete_calls += 1;
        if let Some(err) = take_failure(&mut state) {
            return Err(err);
        }
        state.docs.retain(|d| d.id != id);
        state.deleted_ids.push(id);
        Ok(())
    }

    async fn list_documents(&self) -> Result<Vec<RemoteDocument>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        Ok(state.docs.clone())
    }

    async fn current_document_id(&self) -> Result<Option<u64>, ApiError> {
        Ok(self.state.lock().unwrap().current)
    }

    async fn set_current_document_id(&self, id: u64) -> Result<(), ApiError> {
        self.state.lock().unwrap().current = Some(id);
        Ok(())
    }
}

/// Notification sink that records everything for assertions.
#[derive(Clone, Default)]
pub(crate) struct RecordingNotifier {
    events: Arc<Mutex<Vec<(&'static str, String)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn of_kind(&self, kind: &str) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn successes(&self) -> Vec<String> {
        self.of_kind("success")
    }

    pub fn warnings(&self) -> Vec<String> {
        self.of_kind("warning")
    }

    pub fn errors(&self) -> Vec<String> {
        self.of_kind("error")
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(("success", message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(("warning", message.to_string()));
    }

    fn error(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(("error", message.to_string()));
    }
}
