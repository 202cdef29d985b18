//! Backend contracts for identity, documents and file storage.
//!
//! DESIGN
//! ======
//! The blog delegates all persistence to a backend-as-a-service. Each
//! capability the app needs is an async trait so services depend on the
//! contract, not on HTTP. `appwrite` speaks the real REST API; `memory`
//! implements the same contracts in-process for tests and local demos.
//!
//! Identity payloads are fixed by the provider and come back typed. Documents
//! are generic key/value records; turning them into posts (and rejecting
//! malformed ones) is the content service's job.

pub mod appwrite;
pub mod memory;

use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::model::{ImageFile, Session, User};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by backend calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("request failed: {0}")]
    Request(String),

    /// Missing or invalid session, or bad credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// The addressed document, file or account does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A resource with the same id or unique field already exists.
    #[error("{0}")]
    Conflict(String),

    /// Any other non-success status.
    #[error("{message} (status {status})")]
    Status { status: u16, message: String },

    /// The response body did not match the expected schema.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl BackendError {
    /// Map an HTTP status and provider message onto a typed error.
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => Self::Unauthorized(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            _ => Self::Status { status, message },
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// A stored document: system fields plus the free-form attribute map.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub created_at: Option<OffsetDateTime>,
    pub updated_at: Option<OffsetDateTime>,
    pub data: Map<String, Value>,
}

/// Metadata of a stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub mime: String,
    pub size: u64,
}

/// Attribute-equality filter for listing documents. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    pub equal: Vec<(String, Value)>,
    pub limit: Option<u32>,
}

impl DocumentQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn equal(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.equal.push((attribute.into(), value.into()));
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `data` satisfies every equality clause.
    #[must_use]
    pub fn matches(&self, data: &Map<String, Value>) -> bool {
        self.equal
            .iter()
            .all(|(attribute, value)| data.get(attribute) == Some(value))
    }
}

// =============================================================================
// CONTRACTS
// =============================================================================

/// Account and session management.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a new account. Does not sign in.
    async fn create_account(&self, email: &str, password: &str, name: &str) -> Result<User, BackendError>;

    /// Start an email/password session.
    async fn create_session(&self, email: &str, password: &str) -> Result<Session, BackendError>;

    /// Profile of the account behind the active session.
    async fn current_account(&self) -> Result<User, BackendError>;

    /// Invalidate every session of the current account.
    async fn delete_sessions(&self) -> Result<(), BackendError>;
}

/// CRUD over the posts collection.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_document(&self, id: &str, data: Map<String, Value>) -> Result<Document, BackendError>;

    /// Replace the given attributes of an existing document.
    async fn update_document(&self, id: &str, data: Map<String, Value>) -> Result<Document, BackendError>;

    async fn delete_document(&self, id: &str) -> Result<(), BackendError>;

    async fn get_document(&self, id: &str) -> Result<Document, BackendError>;

    async fn list_documents(&self, query: &DocumentQuery) -> Result<Vec<Document>, BackendError>;
}

/// Binary storage for featured images.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload_file(&self, file: &ImageFile) -> Result<StoredFile, BackendError>;

    async fn get_file(&self, id: &str) -> Result<StoredFile, BackendError>;

    async fn delete_file(&self, id: &str) -> Result<(), BackendError>;

    /// Directly renderable URL for a stored file. Pure; no request is made.
    fn preview_url(&self, id: &str) -> String;
}
