//! Post detail page.
//!
//! Authorship only decides which controls are shown. The backend enforces
//! permissions on its own; `delete` refusing non-authors is a courtesy
//! check, not protection.

use tracing::info;

use super::{ViewError, author_label};
use crate::model::Post;
use crate::routes::Route;
use crate::services::content::{ContentClient, ContentError};
use crate::state::auth::AuthState;
use crate::text::{format_date, reading_time};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostLoad {
    Found(PostDetail),
    /// Nothing to show; go here instead.
    Redirect(Route),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDetail {
    pub post: Post,
    pub image_url: String,
    pub author: String,
    pub date: Option<String>,
    pub reading_time: String,
    /// Show edit and delete controls.
    pub is_author: bool,
}

impl PostDetail {
    /// Load the post stored under `slug`. A missing post redirects home.
    ///
    /// # Errors
    ///
    /// [`ContentError`] for store failures and malformed records.
    pub async fn load(client: &ContentClient, auth: &AuthState, slug: &str) -> Result<PostLoad, ContentError> {
        let Some(post) = client.get_post(slug).await? else {
            return Ok(PostLoad::Redirect(Route::Home));
        };
        let is_author = auth.user().is_some_and(|user| post.is_authored_by(&user));
        Ok(PostLoad::Found(Self {
            image_url: client.file_preview_url(&post.featured_image),
            author: author_label(&post).to_owned(),
            date: post.created_at.map(format_date),
            reading_time: reading_time(&post.content),
            is_author,
            post,
        }))
    }

    #[must_use]
    pub fn edit_route(&self) -> Route {
        Route::EditPost(self.post.id.clone())
    }

    /// Delete the post, then its featured image, and return home.
    ///
    /// The image goes only once the document is gone; its delete is
    /// best-effort.
    ///
    /// # Errors
    ///
    /// [`ViewError::NotAuthenticated`] or [`ViewError::NotAuthor`] before any
    /// request, [`ViewError::Content`] if the document delete failed.
    pub async fn delete(&self, client: &ContentClient, auth: &AuthState) -> Result<Route, ViewError> {
        let user = auth.user().ok_or(ViewError::NotAuthenticated)?;
        if !self.post.is_authored_by(&user) {
            return Err(ViewError::NotAuthor);
        }

        if client.delete_post(&self.post.id).await? {
            client.delete_file(&self.post.featured_image).await;
        } else {
            info!(post_id = %self.post.id, "post already gone");
        }
        Ok(Route::Home)
    }
}

#[cfg(test)]
#[path = "post_test.rs"]
mod tests;
