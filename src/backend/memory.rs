//! In-memory backend implementing every contract without a network.
//!
//! DESIGN
//! ======
//! One mutex over the whole store keeps behavior linear and easy to reason
//! about in tests. Error messages mirror the hosted provider's wording so
//! forms render the same text either way.
//!
//! Failure injection: `fail(op)` makes every later call of that operation
//! return a request error until `recover(op)` is called. Tests use it to
//! exercise abort and best-effort cleanup paths.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{BackendError, Document, DocumentQuery, DocumentStore, IdentityProvider, ObjectStore, StoredFile};
use crate::model::{ImageFile, Session, User};

/// Base used to build preview URLs for in-memory files.
pub const MEMORY_PREVIEW_BASE: &str = "memory://files";

/// Backend operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateAccount,
    CreateSession,
    CurrentAccount,
    DeleteSessions,
    CreateDocument,
    UpdateDocument,
    DeleteDocument,
    GetDocument,
    ListDocuments,
    UploadFile,
    GetFile,
    DeleteFile,
}

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct Store {
    /// Accounts keyed by lower-cased email.
    accounts: HashMap<String, Account>,
    /// User id of the active session.
    session: Option<String>,
    documents: BTreeMap<String, Document>,
    files: BTreeMap<String, (StoredFile, Vec<u8>)>,
    failing: HashSet<Operation>,
}

#[derive(Default)]
pub struct MemoryBackend {
    store: Mutex<Store>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call of `op` fail.
    pub fn fail(&self, op: Operation) {
        self.lock().failing.insert(op);
    }

    /// Undo [`MemoryBackend::fail`].
    pub fn recover(&self, op: Operation) {
        self.lock().failing.remove(&op);
    }

    #[must_use]
    pub fn document_count(&self) -> usize {
        self.lock().documents.len()
    }

    #[must_use]
    pub fn file_ids(&self) -> Vec<String> {
        self.lock().files.keys().cloned().collect()
    }

    #[must_use]
    pub fn file_bytes(&self, id: &str) -> Option<Vec<u8>> {
        self.lock().files.get(id).map(|(_, bytes)| bytes.clone())
    }

    /// Insert a document directly, bypassing validation. For seeding fixtures.
    pub fn seed_document(&self, id: &str, data: Map<String, Value>) {
        let now = OffsetDateTime::now_utc();
        self.lock().documents.insert(
            id.to_owned(),
            Document { id: id.to_owned(), created_at: Some(now), updated_at: Some(now), data },
        );
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        // A panic while holding the lock leaves plain data behind; keep going.
        self.store.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Lock the store, failing if `op` has been marked as failing.
    fn enter(&self, op: Operation) -> Result<MutexGuard<'_, Store>, BackendError> {
        let store = self.lock();
        if store.failing.contains(&op) {
            return Err(BackendError::Request(format!("injected failure: {op:?}")));
        }
        Ok(store)
    }
}

fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn document_not_found() -> BackendError {
    BackendError::NotFound("Document with the requested ID could not be found.".into())
}

fn file_not_found() -> BackendError {
    BackendError::NotFound("The requested file could not be found.".into())
}

// =============================================================================
// IDENTITY
// =============================================================================

#[async_trait::async_trait]
impl IdentityProvider for MemoryBackend {
    async fn create_account(&self, email: &str, password: &str, name: &str) -> Result<User, BackendError> {
        let mut store = self.enter(Operation::CreateAccount)?;
        let key = email.trim().to_ascii_lowercase();
        if store.accounts.contains_key(&key) {
            return Err(BackendError::Conflict(
                "A user with the same id, email, or phone already exists in this project.".into(),
            ));
        }
        let user = User { id: generate_id(), email: email.trim().to_owned(), name: name.to_owned() };
        store.accounts.insert(key, Account { user: user.clone(), password: password.to_owned() });
        Ok(user)
    }

    async fn create_session(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let mut store = self.enter(Operation::CreateSession)?;
        let key = email.trim().to_ascii_lowercase();
        let user_id = match store.accounts.get(&key) {
            Some(account) if account.password == password => account.user.id.clone(),
            _ => {
                return Err(BackendError::Unauthorized(
                    "Invalid credentials. Please check the email and password.".into(),
                ));
            }
        };
        store.session = Some(user_id.clone());
        Ok(Session { id: generate_id(), user_id, expires_at: None })
    }

    async fn current_account(&self) -> Result<User, BackendError> {
        let store = self.enter(Operation::CurrentAccount)?;
        let unauthorized = || BackendError::Unauthorized("User (role: guests) missing scope (account)".into());
        let user_id = store.session.as_deref().ok_or_else(unauthorized)?;
        store
            .accounts
            .values()
            .find(|account| account.user.id == user_id)
            .map(|account| account.user.clone())
            .ok_or_else(unauthorized)
    }

    async fn delete_sessions(&self) -> Result<(), BackendError> {
        let mut store = self.enter(Operation::DeleteSessions)?;
        if store.session.take().is_none() {
            return Err(BackendError::Unauthorized("User (role: guests) missing scope (account)".into()));
        }
        Ok(())
    }
}

// =============================================================================
// DOCUMENTS
// =============================================================================

#[async_trait::async_trait]
impl DocumentStore for MemoryBackend {
    async fn create_document(&self, id: &str, data: Map<String, Value>) -> Result<Document, BackendError> {
        let mut store = self.enter(Operation::CreateDocument)?;
        let id = if id.is_empty() { generate_id() } else { id.to_owned() };
        if store.documents.contains_key(&id) {
            return Err(BackendError::Conflict("Document with the requested ID already exists.".into()));
        }
        let now = OffsetDateTime::now_utc();
        let document = Document { id: id.clone(), created_at: Some(now), updated_at: Some(now), data };
        store.documents.insert(id, document.clone());
        Ok(document)
    }

    async fn update_document(&self, id: &str, data: Map<String, Value>) -> Result<Document, BackendError> {
        let mut store = self.enter(Operation::UpdateDocument)?;
        let document = store.documents.get_mut(id).ok_or_else(document_not_found)?;
        document.data.extend(data);
        document.updated_at = Some(OffsetDateTime::now_utc());
        Ok(document.clone())
    }

    async fn delete_document(&self, id: &str) -> Result<(), BackendError> {
        let mut store = self.enter(Operation::DeleteDocument)?;
        store.documents.remove(id).map(|_| ()).ok_or_else(document_not_found)
    }

    async fn get_document(&self, id: &str) -> Result<Document, BackendError> {
        let store = self.enter(Operation::GetDocument)?;
        store.documents.get(id).cloned().ok_or_else(document_not_found)
    }

    async fn list_documents(&self, query: &DocumentQuery) -> Result<Vec<Document>, BackendError> {
        let store = self.enter(Operation::ListDocuments)?;
        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        Ok(store
            .documents
            .values()
            .filter(|doc| query.matches(&doc.data))
            .take(limit)
            .cloned()
            .collect())
    }
}

// =============================================================================
// FILES
// =============================================================================

#[async_trait::async_trait]
impl ObjectStore for MemoryBackend {
    async fn upload_file(&self, file: &ImageFile) -> Result<StoredFile, BackendError> {
        let mut store = self.enter(Operation::UploadFile)?;
        let stored = StoredFile {
            id: generate_id(),
            name: file.name.clone(),
            mime: file.mime.clone(),
            size: file.bytes.len() as u64,
        };
        store.files.insert(stored.id.clone(), (stored.clone(), file.bytes.clone()));
        Ok(stored)
    }

    async fn get_file(&self, id: &str) -> Result<StoredFile, BackendError> {
        let store = self.enter(Operation::GetFile)?;
        store.files.get(id).map(|(meta, _)| meta.clone()).ok_or_else(file_not_found)
    }

    async fn delete_file(&self, id: &str) -> Result<(), BackendError> {
        let mut store = self.enter(Operation::DeleteFile)?;
        store.files.remove(id).map(|_| ()).ok_or_else(file_not_found)
    }

    fn preview_url(&self, id: &str) -> String {
        format!("{MEMORY_PREVIEW_BASE}/{id}/preview")
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
