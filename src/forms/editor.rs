//! Post editor: the create and edit workflow behind `/add-post` and
//! `/edit-post/:slug`.
//!
//! DESIGN
//! ======
//! One submission walks `Idle -> Validating -> Submitting -> Success` or ends
//! in `Failed`, which immediately drops back to `Idle` with every field kept
//! and the message in `error()`. The phase is published on a `watch` channel
//! so a progress indicator can follow it without borrowing the editor;
//! watchers may only see the settled `Idle`.
//!
//! IMAGE ORDERING
//! ==============
//! New post: upload first, then create the document. If the create fails the
//! fresh upload is deleted so it does not linger unreferenced.
//!
//! Existing post with a new image: upload, point the post at it, and only
//! then delete the old image. If the update fails the new upload is deleted
//! and the old image stays referenced. Both deletes are best-effort; a failed
//! one leaves an orphaned object and a warning in the log.
//!
//! The slug is the document id, so it is fixed once a post exists. Edit mode
//! still tracks the slug field for display, but it is neither validated nor
//! written; updates go to the existing id.

use tokio::sync::watch;
use tracing::{debug, info};

use super::{FieldErrors, FormError, require};
use crate::model::{ImageFile, MAX_IMAGE_BYTES, MAX_SLUG_LEN, Post, PostFields, PostStatus, User};
use crate::routes::Route;
use crate::services::content::{ATTR_FEATURED_IMAGE, ContentClient, ContentError};
use crate::state::auth::AuthState;
use crate::text::{slugify, strip_html};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(Post),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Success,
    Failed,
}

pub struct PostEditor {
    mode: EditorMode,
    title: String,
    slug: String,
    content: String,
    status: PostStatus,
    image: Option<ImageFile>,
    error: Option<String>,
    phase: watch::Sender<EditorPhase>,
    client: ContentClient,
    auth: AuthState,
}

impl PostEditor {
    /// Empty editor for a new post.
    #[must_use]
    pub fn create(client: ContentClient, auth: AuthState) -> Self {
        Self::with_mode(client, auth, EditorMode::Create)
    }

    /// Editor pre-filled from an existing post.
    #[must_use]
    pub fn edit(client: ContentClient, auth: AuthState, post: Post) -> Self {
        Self::with_mode(client, auth, EditorMode::Edit(post))
    }

    fn with_mode(client: ContentClient, auth: AuthState, mode: EditorMode) -> Self {
        let (title, slug, content, status) = match &mode {
            EditorMode::Create => (String::new(), String::new(), String::new(), PostStatus::Active),
            EditorMode::Edit(post) => (post.title.clone(), post.id.clone(), post.content.clone(), post.status),
        };
        let (phase, _rx) = watch::channel(EditorPhase::Idle);
        Self { mode, title, slug, content, status, image: None, error: None, phase, client, auth }
    }

    // =========================================================================
    // FIELDS
    // =========================================================================

    #[must_use]
    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn status(&self) -> PostStatus {
        self.status
    }

    #[must_use]
    pub fn image(&self) -> Option<&ImageFile> {
        self.image.as_ref()
    }

    /// Message from the last failed submission.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Set the title and derive the slug from it.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.slug = slugify(&self.title);
    }

    /// Manual slug edit, normalized as typed.
    pub fn set_slug(&mut self, slug: &str) {
        self.slug = slugify(slug);
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn set_status(&mut self, status: PostStatus) {
        self.status = status;
    }

    pub fn set_image(&mut self, image: Option<ImageFile>) {
        self.image = image;
    }

    // =========================================================================
    // PHASE
    // =========================================================================

    #[must_use]
    pub fn phase(&self) -> EditorPhase {
        *self.phase.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<EditorPhase> {
        self.phase.subscribe()
    }

    /// Back to `Idle`, e.g. after a submit future was dropped mid-flight.
    pub fn reset(&mut self) {
        self.error = None;
        self.phase.send_replace(EditorPhase::Idle);
    }

    // =========================================================================
    // SUBMIT
    // =========================================================================

    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require(&mut errors, "title", &self.title, "Title is required");

        // Existing posts keep their id; only a new slug becomes one.
        if self.mode == EditorMode::Create {
            let slug = slugify(&self.slug);
            if slug.is_empty() {
                errors.add("slug", "Slug is required");
            } else if slug.len() > MAX_SLUG_LEN {
                errors.add("slug", format!("Slug must be at most {MAX_SLUG_LEN} characters"));
            } else if !slug.starts_with(|c: char| c.is_ascii_alphanumeric()) {
                errors.add("slug", "Slug must start with a letter or digit");
            }
        }

        if strip_html(&self.content).trim().is_empty() {
            errors.add("content", "Content is required");
        }

        match &self.image {
            None if self.mode == EditorMode::Create => errors.add("image", "Featured image is required"),
            None => {}
            Some(image) if !image.is_allowed_type() => {
                errors.add("image", "Image must be PNG, JPG, JPEG or GIF");
            }
            Some(image) if image.len() > MAX_IMAGE_BYTES => {
                errors.add("image", "Image must be at most 5MB");
            }
            Some(_) => {}
        }
        errors
    }

    /// Run one submission and return the post page to navigate to.
    ///
    /// # Errors
    ///
    /// [`FormError::AlreadySubmitting`], [`FormError::Invalid`],
    /// [`FormError::NotAuthenticated`] or [`FormError::Content`]. On any of
    /// the last three the editor publishes `Failed`, then settles back to
    /// `Idle` with its fields intact and the message in [`Self::error`].
    pub async fn submit(&mut self) -> Result<Route, FormError> {
        if self.phase() == EditorPhase::Submitting {
            return Err(FormError::AlreadySubmitting);
        }
        self.error = None;
        self.phase.send_replace(EditorPhase::Validating);

        let checked = self
            .validate()
            .into_result()
            .and_then(|()| self.auth.user().ok_or(FormError::NotAuthenticated));
        let user = match checked {
            Ok(user) => user,
            Err(e) => return Err(self.fail(e)),
        };

        self.phase.send_replace(EditorPhase::Submitting);
        let result = match &self.mode {
            EditorMode::Create => self.create_post(&user).await,
            EditorMode::Edit(post) => self.update_post(post).await,
        };

        match result {
            Ok(post) => {
                let route = Route::Post(post.id.clone());
                self.slug.clone_from(&post.id);
                self.mode = EditorMode::Edit(post);
                self.image = None;
                self.phase.send_replace(EditorPhase::Success);
                Ok(route)
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Record the error and hand the form back for editing.
    fn fail(&mut self, error: FormError) -> FormError {
        self.error = Some(error.to_string());
        self.phase.send_replace(EditorPhase::Failed);
        self.phase.send_replace(EditorPhase::Idle);
        error
    }

    fn fields(&self, featured_image: String, author_id: String) -> PostFields {
        PostFields {
            title: self.title.trim().to_owned(),
            content: self.content.clone(),
            status: self.status,
            featured_image,
            author_id,
        }
    }

    async fn create_post(&self, user: &User) -> Result<Post, ContentError> {
        let Some(image) = &self.image else {
            return Err(ContentError::MissingField(ATTR_FEATURED_IMAGE));
        };
        let file_id = self.client.upload_file(image).await?;

        let slug = slugify(&self.slug);
        let fields = self.fields(file_id.clone(), user.id.clone());
        match self.client.create_post(&slug, &fields).await {
            Ok(post) => Ok(post),
            Err(e) => {
                info!(file_id = %file_id, "post create failed; removing uploaded image");
                self.client.delete_file(&file_id).await;
                Err(e)
            }
        }
    }

    async fn update_post(&self, post: &Post) -> Result<Post, ContentError> {
        let slug = slugify(&self.slug);
        if slug != post.id {
            debug!(post_id = %post.id, slug = %slug, "slug edits do not rename existing posts");
        }

        let Some(image) = &self.image else {
            let fields = self.fields(post.featured_image.clone(), post.author_id.clone());
            return self.client.update_post(&post.id, &fields).await;
        };

        let new_id = self.client.upload_file(image).await?;
        let fields = self.fields(new_id.clone(), post.author_id.clone());
        match self.client.update_post(&post.id, &fields).await {
            Ok(updated) => {
                self.client.delete_file(&post.featured_image).await;
                Ok(updated)
            }
            Err(e) => {
                info!(file_id = %new_id, "post update failed; removing uploaded image");
                self.client.delete_file(&new_id).await;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[path = "editor_test.rs"]
mod tests;
