//! Domain types for users, sessions, posts and image uploads.
//!
//! DESIGN
//! ======
//! These are the strict shapes the rest of the crate works with. Backend
//! adapters translate the provider's permissive payloads into them at the
//! boundary, so nothing above `backend` ever touches raw JSON.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Image MIME types accepted as a featured image.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpg", "image/jpeg", "image/gif"];

/// Upper bound on featured image size, enforced by the editor.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Longest id the document store accepts; slugs double as post ids.
pub const MAX_SLUG_LEN: usize = 36;

// =============================================================================
// IDENTITY
// =============================================================================

/// Account profile as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// Server-issued session handle. The secret stays inside the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub expires_at: Option<OffsetDateTime>,
}

// =============================================================================
// POSTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Active,
    Inactive,
}

impl PostStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown post status `{0}` (expected `active` or `inactive`)")]
pub struct ParseStatusError(String);

impl FromStr for PostStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(ParseStatusError(other.to_owned())),
        }
    }
}

/// A stored blog post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Document id. Equal to the slug the post was created with.
    pub id: String,
    pub slug: String,
    pub title: String,
    /// Rich-text HTML.
    pub content: String,
    pub status: PostStatus,
    /// File id of the featured image in the object store.
    pub featured_image: String,
    pub author_id: String,
    /// Display name, present only when the document carries one.
    pub author_name: Option<String>,
    pub created_at: Option<OffsetDateTime>,
    pub updated_at: Option<OffsetDateTime>,
}

impl Post {
    /// Client-side authorship check; not a security boundary.
    #[must_use]
    pub fn is_authored_by(&self, user: &User) -> bool {
        self.author_id == user.id
    }
}

/// Write schema for creating or fully replacing a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFields {
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub featured_image: String,
    pub author_id: String,
}

// =============================================================================
// IMAGES
// =============================================================================

/// Binary image payload headed for the object store.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageFile {
    #[must_use]
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), mime: mime.into(), bytes }
    }

    /// Read an image from disk, guessing its MIME type from the extension.
    ///
    /// Unknown extensions get `application/octet-stream`, which the editor
    /// then rejects as an unsupported type.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be read.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map_or_else(|| "image".to_owned(), |n| n.to_string_lossy().into_owned());
        let mime = image_mime_for(path).unwrap_or("application/octet-stream");
        Ok(Self::new(name, mime, bytes))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn is_allowed_type(&self) -> bool {
        is_allowed_image_type(&self.mime)
    }
}

#[must_use]
pub fn is_allowed_image_type(mime: &str) -> bool {
    let mime = mime.trim().to_ascii_lowercase();
    ALLOWED_IMAGE_TYPES.contains(&mime.as_str())
}

/// MIME type for the image extensions the editor accepts.
#[must_use]
pub fn image_mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
