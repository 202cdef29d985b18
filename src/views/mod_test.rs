use std::sync::Arc;

use time::macros::datetime;

use super::*;
use crate::backend::memory::MemoryBackend;
use crate::model::PostStatus;

fn post(author_name: Option<&str>) -> Post {
    Post {
        id: "hello".into(),
        slug: "hello".into(),
        title: "Hello".into(),
        content: format!("<p>{}</p>", "x".repeat(150)),
        status: PostStatus::Active,
        featured_image: "img-1".into(),
        author_id: "u1".into(),
        author_name: author_name.map(str::to_owned),
        created_at: Some(datetime!(2024-01-05 10:00 UTC)),
        updated_at: None,
    }
}

#[test]
fn card_derives_display_values() {
    let backend = Arc::new(MemoryBackend::new());
    let client = ContentClient::new(backend.clone(), backend);

    let card = PostCard::new(&post(Some("Ada")), &client);
    assert_eq!(card.image_url, "memory://files/img-1/preview");
    assert_eq!(card.excerpt, format!("{}...", "x".repeat(100)));
    assert_eq!(card.author, "Ada");
    assert_eq!(card.date.as_deref(), Some("January 5, 2024"));
    assert_eq!(card.route(), Route::Post("hello".into()));
}

#[test]
fn card_falls_back_to_anonymous() {
    let backend = Arc::new(MemoryBackend::new());
    let client = ContentClient::new(backend.clone(), backend);
    assert_eq!(PostCard::new(&post(None), &client).author, ANONYMOUS);
}
