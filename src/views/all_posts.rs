//! All-posts page: every post plus a title search.

use super::{PostCard, cards};
use crate::services::content::{ContentClient, ContentError, PostFilter};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllPostsView {
    posts: Vec<PostCard>,
    query: String,
}

impl AllPostsView {
    /// # Errors
    ///
    /// [`ContentError`] if the listing fails.
    pub async fn load(client: &ContentClient) -> Result<Self, ContentError> {
        let mut view = Self::default();
        view.refresh(client).await?;
        Ok(view)
    }

    /// Re-fetch the listing, keeping the search query.
    ///
    /// # Errors
    ///
    /// [`ContentError`] if the listing fails; the previous posts are kept.
    pub async fn refresh(&mut self, client: &ContentClient) -> Result<(), ContentError> {
        let posts = client.list_posts(&PostFilter::default()).await?;
        self.posts = cards(&posts, client);
        Ok(())
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.posts.len()
    }

    /// Posts whose title contains the query, ignoring case.
    #[must_use]
    pub fn visible(&self) -> Vec<&PostCard> {
        let needle = self.query.trim().to_lowercase();
        self.posts
            .iter()
            .filter(|card| needle.is_empty() || card.title.to_lowercase().contains(&needle))
            .collect()
    }
}

#[cfg(test)]
#[path = "all_posts_test.rs"]
mod tests;
