//! Home page: every post as a card.

use super::{PostCard, cards};
use crate::services::content::{ContentClient, ContentError, PostFilter};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeView {
    pub posts: Vec<PostCard>,
}

impl HomeView {
    /// # Errors
    ///
    /// [`ContentError`] if the listing fails.
    pub async fn load(client: &ContentClient) -> Result<Self, ContentError> {
        let posts = client.list_posts(&PostFilter::default()).await?;
        Ok(Self { posts: cards(&posts, client) })
    }

    /// Nothing published yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}
