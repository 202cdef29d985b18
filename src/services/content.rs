//! Posts and their featured images.
//!
//! DESIGN
//! ======
//! Documents come back from the store as loose attribute maps. This module is
//! the boundary where they become [`Post`]s: a record missing a required
//! attribute, or carrying an unknown status, is rejected instead of being
//! rendered half-empty.
//!
//! Attribute names (`title`, `content`, `featuredImage`, `status`, `userId`,
//! `authorName`) match the collection schema of the hosted backend.
//!
//! TRADE-OFFS
//! ==========
//! Listing skips malformed records with a warning so one bad document does
//! not blank the whole feed. Single reads report them as errors.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::backend::{BackendError, Document, DocumentQuery, DocumentStore, ObjectStore, StoredFile};
use crate::model::{ImageFile, Post, PostFields, PostStatus, is_allowed_image_type};

pub const ATTR_TITLE: &str = "title";
pub const ATTR_CONTENT: &str = "content";
pub const ATTR_FEATURED_IMAGE: &str = "featuredImage";
pub const ATTR_STATUS: &str = "status";
pub const ATTR_USER_ID: &str = "userId";
pub const ATTR_AUTHOR_NAME: &str = "authorName";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    /// The store rejected or failed the request.
    #[error("{0}")]
    Store(#[from] BackendError),

    /// A stored document does not have the shape of a post.
    #[error("invalid post record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    /// A required input was empty.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("unsupported image type: {0}")]
    UnsupportedImageType(String),
}

/// Listing filter. The default matches every post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    pub author_id: Option<String>,
    pub limit: Option<u32>,
}

impl PostFilter {
    #[must_use]
    pub fn active() -> Self {
        Self { status: Some(PostStatus::Active), ..Self::default() }
    }

    fn to_query(&self) -> DocumentQuery {
        let mut query = DocumentQuery::new();
        if let Some(status) = self.status {
            query = query.equal(ATTR_STATUS, status.as_str());
        }
        if let Some(author_id) = &self.author_id {
            query = query.equal(ATTR_USER_ID, author_id.as_str());
        }
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        query
    }
}

#[derive(Clone)]
pub struct ContentClient {
    documents: Arc<dyn DocumentStore>,
    files: Arc<dyn ObjectStore>,
}

impl ContentClient {
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentStore>, files: Arc<dyn ObjectStore>) -> Self {
        Self { documents, files }
    }

    // =========================================================================
    // POSTS
    // =========================================================================

    /// Persist a new post under `slug`.
    ///
    /// # Errors
    ///
    /// [`ContentError::MissingField`] for an empty slug, title, content,
    /// featured image or author; [`ContentError::Store`] if the store refuses
    /// (a taken slug comes back as a conflict).
    pub async fn create_post(&self, slug: &str, fields: &PostFields) -> Result<Post, ContentError> {
        if slug.trim().is_empty() {
            return Err(ContentError::MissingField("slug"));
        }
        let data = fields_to_data(fields)?;
        let document = self.documents.create_document(slug, data).await?;
        let post = post_from_document(document)?;
        info!(post_id = %post.id, author_id = %post.author_id, "post created");
        Ok(post)
    }

    /// Replace every writable attribute of post `id`.
    ///
    /// # Errors
    ///
    /// Same as [`ContentClient::create_post`]; a missing post is a
    /// [`BackendError::NotFound`] store error.
    pub async fn update_post(&self, id: &str, fields: &PostFields) -> Result<Post, ContentError> {
        let data = fields_to_data(fields)?;
        let document = self.documents.update_document(id, data).await?;
        let post = post_from_document(document)?;
        info!(post_id = %post.id, "post updated");
        Ok(post)
    }

    /// Delete post `id`. `Ok(false)` when there was nothing to delete.
    ///
    /// # Errors
    ///
    /// [`ContentError::Store`] for any failure other than not-found.
    pub async fn delete_post(&self, id: &str) -> Result<bool, ContentError> {
        match self.documents.delete_document(id).await {
            Ok(()) => {
                info!(post_id = %id, "post deleted");
                Ok(true)
            }
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// # Errors
    ///
    /// [`ContentError::Store`] for failures other than not-found, or
    /// [`ContentError::InvalidRecord`] if the document is not a post.
    pub async fn get_post(&self, id: &str) -> Result<Option<Post>, ContentError> {
        match self.documents.get_document(id).await {
            Ok(document) => post_from_document(document).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// # Errors
    ///
    /// [`ContentError::Store`] if the query fails.
    pub async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, ContentError> {
        let documents = self.documents.list_documents(&filter.to_query()).await?;
        Ok(documents
            .into_iter()
            .filter_map(|document| match post_from_document(document) {
                Ok(post) => Some(post),
                Err(e) => {
                    warn!(error = %e, "skipping malformed post record");
                    None
                }
            })
            .collect())
    }

    // =========================================================================
    // FILES
    // =========================================================================

    /// Store an image and return its file id.
    ///
    /// Only checks the MIME type; size limits belong to the caller.
    ///
    /// # Errors
    ///
    /// [`ContentError::UnsupportedImageType`] or [`ContentError::Store`].
    pub async fn upload_file(&self, image: &ImageFile) -> Result<String, ContentError> {
        if !is_allowed_image_type(&image.mime) {
            return Err(ContentError::UnsupportedImageType(image.mime.clone()));
        }
        let stored = self.files.upload_file(image).await?;
        info!(file_id = %stored.id, size = stored.size, "file uploaded");
        Ok(stored.id)
    }

    /// Best-effort delete. Failures are logged, never returned.
    pub async fn delete_file(&self, id: &str) -> bool {
        match self.files.delete_file(id).await {
            Ok(()) => {
                info!(file_id = %id, "file deleted");
                true
            }
            Err(e) => {
                warn!(file_id = %id, error = %e, "file delete failed; object may be orphaned");
                false
            }
        }
    }

    /// # Errors
    ///
    /// [`ContentError::Store`] for failures other than not-found.
    pub async fn get_file(&self, id: &str) -> Result<Option<StoredFile>, ContentError> {
        match self.files.get_file(id).await {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[must_use]
    pub fn file_preview_url(&self, id: &str) -> String {
        self.files.preview_url(id)
    }
}

// =============================================================================
// RECORD CONVERSION
// =============================================================================

fn fields_to_data(fields: &PostFields) -> Result<Map<String, Value>, ContentError> {
    let required = [
        (ATTR_TITLE, &fields.title),
        (ATTR_CONTENT, &fields.content),
        (ATTR_FEATURED_IMAGE, &fields.featured_image),
        (ATTR_USER_ID, &fields.author_id),
    ];
    if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(ContentError::MissingField(*name));
    }

    let mut data = Map::new();
    data.insert(ATTR_TITLE.into(), fields.title.trim().into());
    data.insert(ATTR_CONTENT.into(), fields.content.clone().into());
    data.insert(ATTR_FEATURED_IMAGE.into(), fields.featured_image.clone().into());
    data.insert(ATTR_STATUS.into(), fields.status.as_str().into());
    data.insert(ATTR_USER_ID.into(), fields.author_id.clone().into());
    Ok(data)
}

pub(crate) fn post_from_document(document: Document) -> Result<Post, ContentError> {
    let Document { id, created_at, updated_at, data } = document;
    let invalid = |reason: String| ContentError::InvalidRecord { id: id.clone(), reason };
    let text = |name: &str| -> Result<String, ContentError> {
        data.get(name)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| invalid(format!("missing text attribute `{name}`")))
    };

    let title = text(ATTR_TITLE)?;
    let content = text(ATTR_CONTENT)?;
    let featured_image = text(ATTR_FEATURED_IMAGE)?;
    let author_id = text(ATTR_USER_ID)?;
    let status = text(ATTR_STATUS)?
        .parse::<PostStatus>()
        .map_err(|e| invalid(e.to_string()))?;
    let author_name = data
        .get(ATTR_AUTHOR_NAME)
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .map(str::to_owned);

    Ok(Post {
        slug: id.clone(),
        id,
        title,
        content,
        status,
        featured_image,
        author_id,
        author_name,
        created_at,
        updated_at,
    })
}

#[cfg(test)]
#[path = "content_test.rs"]
mod tests;
