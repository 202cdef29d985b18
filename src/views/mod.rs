//! View models for the post pages.
//!
//! DESIGN
//! ======
//! A view loads what its page needs through the content client and exposes
//! plain display values (preview URLs, formatted dates, excerpts). Loads that
//! end in navigation instead of a page return the target route.

pub mod all_posts;
pub mod edit_post;
pub mod home;
pub mod post;

use crate::model::Post;
use crate::routes::Route;
use crate::services::content::{ContentClient, ContentError};
use crate::text::{excerpt, format_date};

/// Author shown when a post carries no display name.
pub const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("{0}")]
    Content(#[from] ContentError),
    #[error("you must be signed in")]
    NotAuthenticated,
    #[error("only the author can change this post")]
    NotAuthor,
}

/// One entry of a post listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCard {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub excerpt: String,
    pub author: String,
    pub date: Option<String>,
}

impl PostCard {
    #[must_use]
    pub fn new(post: &Post, client: &ContentClient) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            image_url: client.file_preview_url(&post.featured_image),
            excerpt: excerpt(&post.content),
            author: author_label(post).to_owned(),
            date: post.created_at.map(format_date),
        }
    }

    #[must_use]
    pub fn route(&self) -> Route {
        Route::Post(self.id.clone())
    }
}

pub(crate) fn author_label(post: &Post) -> &str {
    post.author_name.as_deref().unwrap_or(ANONYMOUS)
}

pub(crate) fn cards(posts: &[Post], client: &ContentClient) -> Vec<PostCard> {
    posts.iter().map(|post| PostCard::new(post, client)).collect()
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
