use std::future::Future;

use chrono::{DateTime, Utc};
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::core::document::{Document, DocumentId};
use crate::error::ApiError;

/// Body of a create/update call. The id never travels in the payload; it is
/// either assigned by the backend (create) or part of the route (update).
#[derive(Debug, Clone, Serialize)]
pub struct DocumentPayload {
    pub name: String,
    pub content: String,
    pub category: String,
}

impl DocumentPayload {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            name: doc.name.clone(),
            content: doc.content.clone(),
            category: doc.category.clone(),
        }
    }
}

/// A document as the backend returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteDocument {
    pub id: u64,
    pub name: String,
    pub content: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RemoteDocument {
    pub fn into_document(self) -> Document {
        Document {
            id: DocumentId::Remote(self.id),
            name: self.name,
            category: self.category,
            content: self.content,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}

/// The backend document API: authoritative CRUD plus the shared
/// current-document pointer.
pub trait RemoteApi: Send + Sync {
    fn create_document(
        &self,
        payload: &DocumentPayload,
    ) -> impl Future<Output = Result<RemoteDocument, ApiError>> + Send;

    fn update_document(
        &self,
        id: u64,
        payload: &DocumentPayload,
    ) -> impl Future<Output = Result<RemoteDocument, ApiError>> + Send;

    fn delete_document(&self, id: u64) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn list_documents(&self) -> impl Future<Output = Result<Vec<RemoteDocument>, ApiError>> + Send;

    fn current_document_id(&self)
    -> impl Future<Output = Result<Option<u64>, ApiError>> + Send;

    fn set_current_document_id(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CurrentPointer {
    id: Option<u64>,
}

/// JSON client for the document backend.
#[derive(Clone)]
pub struct HttpApi {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl HttpApi {
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(str::to_string),
            http,
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let req = self.http.request(method, url);
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Read the body and fold a non-success status into a classified error.
    async fn check(resp: reqwest::Response) -> Result<(StatusCode, String), ApiError> {
        let status = resp.status();
        let text = resp.text().await.map_err(transport_err)?;
        if status.is_success() {
            Ok((status, text))
        } else {
            Err(status_err(status, &text))
        }
    }

    async fn json_response<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, ApiError> {
        let (status, text) = Self::check(resp).await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Rejected {
            status: status.as_u16(),
            message: format!("unparseable response: {}", e),
        })
    }
}

impl RemoteApi for HttpApi {
    async fn create_document(&self, payload: &DocumentPayload) -> Result<RemoteDocument, ApiError> {
        log::debug!("POST /documents name={}", payload.name);
        let resp = self
            .request(Method::POST, "/documents")
            .json(payload)
            .send()
            .await
            .map_err(transport_err)?;
        Self::json_response(resp).await
    }

    async fn update_document(
        &self,
        id: u64,
        payload: &DocumentPayload,
    ) -> Result<RemoteDocument, ApiError> {
        log::debug!("PUT /documents/{}", id);
        let resp = self
            .request(Method::PUT, &format!("/documents/{}", id))
            .json(payload)
            .send()
            .await
            .map_err(transport_err)?;
        Self::json_response(resp).await
    }

    async fn delete_document(&self, id: u64) -> Result<(), ApiError> {
        log::debug!("DELETE /documents/{}", id);
        let resp = self
            .request(Method::DELETE, &format!("/documents/{}", id))
            .send()
            .await
            .map_err(transport_err)?;
        // Already gone on the backend satisfies a delete.
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check(resp).await.map(|_| ())
    }

    async fn list_documents(&self) -> Result<Vec<RemoteDocument>, ApiError> {
        log::debug!("GET /documents");
        let resp = self
            .request(Method::GET, "/documents")
            .send()
            .await
            .map_err(transport_err)?;
        Self::json_response(resp).await
    }

    async fn current_document_id(&self) -> Result<Option<u64>, ApiError> {
        let resp = self
            .request(Method::GET, "/documents/current")
            .send()
            .await
            .map_err(transport_err)?;
        let pointer: CurrentPointer = Self::json_response(resp).await?;
        Ok(pointer.id)
    }

    async fn set_current_document_id(&self, id: u64) -> Result<(), ApiError> {
        let resp = self
            .request(Method::PUT, "/documents/current")
            .json(&CurrentPointer { id: Some(id) })
            .send()
            .await
            .map_err(transport_err)?;
        Self::check(resp).await.map(|_| ())
    }
}

fn transport_err(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network(e.to_string())
    }
}

fn status_err(status: StatusCode, body: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::AuthExpired,
        StatusCode::CONFLICT => ApiError::Conflict(body.to_string()),
        StatusCode::NOT_FOUND => ApiError::NotFound(body.to_string()),
        s if s.is_server_error() => ApiError::Server(s.as_u16()),
        s => ApiError::Rejected {
            status: s.as_u16(),
            message: body.to_string(),
        },
    }
}
