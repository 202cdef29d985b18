//! Appwrite REST backend.
//!
//! ARCHITECTURE
//! ============
//! One `reqwest::Client` per process, carrying the project header and a
//! cookie jar. Appwrite returns the session as a `Set-Cookie`; the jar replays
//! it on later calls. The `X-Fallback-Cookies` header Appwrite also returns is
//! kept and echoed back for deployments whose cookie domain does not match
//! the endpoint host.
//!
//! Wire structs live at the bottom of the file and are converted into the
//! crate's domain types before leaving this module.

use std::sync::RwLock;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

use super::{BackendError, Document, DocumentQuery, DocumentStore, IdentityProvider, ObjectStore, StoredFile};
use crate::config::BackendConfig;
use crate::model::{ImageFile, Session, User};

/// Asks Appwrite to generate the id server-side.
pub const UNIQUE_ID: &str = "unique()";

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const RESPONSE_FORMAT_HEADER: &str = "X-Appwrite-Response-Format";
const RESPONSE_FORMAT: &str = "1.5.0";
const FALLBACK_COOKIES_HEADER: &str = "X-Fallback-Cookies";

pub struct AppwriteBackend {
    http: reqwest::Client,
    base: Url,
    project_id: String,
    database_id: String,
    collection_id: String,
    bucket_id: String,
    fallback_cookies: RwLock<Option<String>>,
}

impl AppwriteBackend {
    /// Build a backend client from typed config.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::HttpClientBuild`] if the endpoint is not a
    /// usable base URL, the project id is not a valid header value, or the
    /// HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let base = Url::parse(&config.endpoint).map_err(|e| BackendError::HttpClientBuild(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(BackendError::HttpClientBuild(format!("endpoint is not a base URL: {}", config.endpoint)));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            PROJECT_HEADER,
            HeaderValue::from_str(&config.project_id).map_err(|e| BackendError::HttpClientBuild(e.to_string()))?,
        );
        headers.insert(RESPONSE_FORMAT_HEADER, HeaderValue::from_static(RESPONSE_FORMAT));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| BackendError::HttpClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            base,
            project_id: config.project_id.clone(),
            database_id: config.database_id.clone(),
            collection_id: config.collection_id.clone(),
            bucket_id: config.bucket_id.clone(),
            fallback_cookies: RwLock::new(None),
        })
    }

    /// Endpoint URL with `segments` appended, each percent-encoded.
    fn endpoint_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn document_url(&self, id: Option<&str>) -> Url {
        let mut segments =
            vec!["databases", self.database_id.as_str(), "collections", self.collection_id.as_str(), "documents"];
        segments.extend(id);
        self.endpoint_url(&segments)
    }

    fn file_url(&self, id: Option<&str>) -> Url {
        let mut segments = vec!["storage", "buckets", self.bucket_id.as_str(), "files"];
        segments.extend(id);
        self.endpoint_url(&segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "appwrite request");
        let builder = self.http.request(method, url);
        let fallback = self
            .fallback_cookies
            .read()
            .ok()
            .and_then(|guard| guard.clone());
        match fallback {
            Some(cookies) => builder.header(FALLBACK_COOKIES_HEADER, cookies),
            None => builder,
        }
    }

    fn set_fallback_cookies(&self, value: Option<String>) {
        if let Ok(mut guard) = self.fallback_cookies.write() {
            *guard = value;
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(error_from_body(status.as_u16(), &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response = self.send(request).await?;
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| BackendError::Parse(e.to_string()))
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

#[async_trait::async_trait]
impl IdentityProvider for AppwriteBackend {
    async fn create_account(&self, email: &str, password: &str, name: &str) -> Result<User, BackendError> {
        let body = serde_json::json!({
            "userId": UNIQUE_ID,
            "email": email,
            "password": password,
            "name": name,
        });
        let request = self.request(Method::POST, self.endpoint_url(&["account"])).json(&body);
        let account: AccountWire = self.send_json(request).await?;
        Ok(account.into())
    }

    async fn create_session(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let request = self
            .request(Method::POST, self.endpoint_url(&["account", "sessions", "email"]))
            .json(&body);
        let response = self.send(request).await?;

        let fallback = response
            .headers()
            .get(FALLBACK_COOKIES_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_owned);
        if fallback.is_some() {
            self.set_fallback_cookies(fallback);
        }

        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        parse_session(&text)
    }

    async fn current_account(&self) -> Result<User, BackendError> {
        let request = self.request(Method::GET, self.endpoint_url(&["account"]));
        let account: AccountWire = self.send_json(request).await?;
        Ok(account.into())
    }

    async fn delete_sessions(&self) -> Result<(), BackendError> {
        let request = self.request(Method::DELETE, self.endpoint_url(&["account", "sessions"]));
        self.send(request).await?;
        self.set_fallback_cookies(None);
        Ok(())
    }
}

// =============================================================================
// DOCUMENTS
// =============================================================================

#[async_trait::async_trait]
impl DocumentStore for AppwriteBackend {
    async fn create_document(&self, id: &str, data: Map<String, Value>) -> Result<Document, BackendError> {
        let body = serde_json::json!({ "documentId": id, "data": data });
        let request = self.request(Method::POST, self.document_url(None)).json(&body);
        let value: Value = self.send_json(request).await?;
        parse_document(value)
    }

    async fn update_document(&self, id: &str, data: Map<String, Value>) -> Result<Document, BackendError> {
        let body = serde_json::json!({ "data": data });
        let request = self.request(Method::PATCH, self.document_url(Some(id))).json(&body);
        let value: Value = self.send_json(request).await?;
        parse_document(value)
    }

    async fn delete_document(&self, id: &str) -> Result<(), BackendError> {
        let request = self.request(Method::DELETE, self.document_url(Some(id)));
        self.send(request).await?;
        Ok(())
    }

    async fn get_document(&self, id: &str) -> Result<Document, BackendError> {
        let request = self.request(Method::GET, self.document_url(Some(id)));
        let value: Value = self.send_json(request).await?;
        parse_document(value)
    }

    async fn list_documents(&self, query: &DocumentQuery) -> Result<Vec<Document>, BackendError> {
        let params = query_params(query)
            .into_iter()
            .map(|q| ("queries[]", q))
            .collect::<Vec<_>>();
        let request = self.request(Method::GET, self.document_url(None)).query(&params);
        let list: DocumentListWire = self.send_json(request).await?;
        list.documents.into_iter().map(parse_document).collect()
    }
}

// =============================================================================
// FILES
// =============================================================================

#[async_trait::async_trait]
impl ObjectStore for AppwriteBackend {
    async fn upload_file(&self, file: &ImageFile) -> Result<StoredFile, BackendError> {
        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime)
            .map_err(|e| BackendError::Request(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("fileId", UNIQUE_ID)
            .part("file", part);
        let request = self.request(Method::POST, self.file_url(None)).multipart(form);
        let stored: FileWire = self.send_json(request).await?;
        Ok(stored.into())
    }

    async fn get_file(&self, id: &str) -> Result<StoredFile, BackendError> {
        let request = self.request(Method::GET, self.file_url(Some(id)));
        let stored: FileWire = self.send_json(request).await?;
        Ok(stored.into())
    }

    async fn delete_file(&self, id: &str) -> Result<(), BackendError> {
        let request = self.request(Method::DELETE, self.file_url(Some(id)));
        self.send(request).await?;
        Ok(())
    }

    fn preview_url(&self, id: &str) -> String {
        let mut url = self.endpoint_url(&["storage", "buckets", self.bucket_id.as_str(), "files", id, "preview"]);
        url.query_pairs_mut().append_pair("project", &self.project_id);
        url.to_string()
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
struct ErrorWire {
    message: String,
}

#[derive(Debug, Deserialize)]
struct AccountWire {
    #[serde(rename = "$id")]
    id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    name: String,
}

impl From<AccountWire> for User {
    fn from(wire: AccountWire) -> Self {
        Self { id: wire.id, email: wire.email, name: wire.name }
    }
}

#[derive(Debug, Deserialize)]
struct SessionWire {
    #[serde(rename = "$id")]
    id: String,
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(default)]
    expire: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentListWire {
    #[serde(default)]
    documents: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct FileWire {
    #[serde(rename = "$id")]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "mimeType", default)]
    mime_type: String,
    #[serde(rename = "sizeOriginal", default)]
    size_original: u64,
}

impl From<FileWire> for StoredFile {
    fn from(wire: FileWire) -> Self {
        Self { id: wire.id, name: wire.name, mime: wire.mime_type, size: wire.size_original }
    }
}

/// Typed error from a non-success response, preferring Appwrite's JSON message.
pub(crate) fn error_from_body(status: u16, body: &str) -> BackendError {
    let message = serde_json::from_str::<ErrorWire>(body)
        .map(|e| e.message)
        .ok()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() { format!("HTTP {status}") } else { trimmed.to_owned() }
        });
    BackendError::from_status(status, message)
}

pub(crate) fn parse_timestamp(raw: Option<&str>) -> Option<OffsetDateTime> {
    raw.and_then(|s| OffsetDateTime::parse(s, &Rfc3339).ok())
}

pub(crate) fn parse_session(body: &str) -> Result<Session, BackendError> {
    let wire: SessionWire = serde_json::from_str(body).map_err(|e| BackendError::Parse(e.to_string()))?;
    Ok(Session { id: wire.id, user_id: wire.user_id, expires_at: parse_timestamp(wire.expire.as_deref()) })
}

/// Split a raw document into system fields and user attributes.
///
/// Every `$`-prefixed key is a system field; only `$id`, `$createdAt` and
/// `$updatedAt` are kept.
pub(crate) fn parse_document(value: Value) -> Result<Document, BackendError> {
    let Value::Object(mut map) = value else {
        return Err(BackendError::Parse("document is not a JSON object".into()));
    };
    let id = match map.remove("$id") {
        Some(Value::String(id)) => id,
        _ => return Err(BackendError::Parse("document is missing `$id`".into())),
    };
    let created_at = parse_timestamp(map.get("$createdAt").and_then(Value::as_str));
    let updated_at = parse_timestamp(map.get("$updatedAt").and_then(Value::as_str));
    map.retain(|key, _| !key.starts_with('$'));
    Ok(Document { id, created_at, updated_at, data: map })
}

/// Appwrite JSON query strings for a [`DocumentQuery`].
pub(crate) fn query_params(query: &DocumentQuery) -> Vec<String> {
    let mut params = query
        .equal
        .iter()
        .map(|(attribute, value)| {
            serde_json::json!({ "method": "equal", "attribute": attribute, "values": [value] }).to_string()
        })
        .collect::<Vec<_>>();
    if let Some(limit) = query.limit {
        params.push(serde_json::json!({ "method": "limit", "values": [limit] }).to_string());
    }
    params
}

#[cfg(test)]
#[path = "appwrite_test.rs"]
mod tests;
