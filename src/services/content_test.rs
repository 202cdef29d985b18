use super::*;
use crate::backend::memory::{MemoryBackend, Operation};

fn client() -> (ContentClient, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    (ContentClient::new(backend.clone(), backend.clone()), backend)
}

fn fields(title: &str, image: &str) -> PostFields {
    PostFields {
        title: title.into(),
        content: "<p>Body text</p>".into(),
        status: PostStatus::Active,
        featured_image: image.into(),
        author_id: "author-1".into(),
    }
}

fn png() -> ImageFile {
    ImageFile::new("cover.png", "image/png", vec![0x89, b'P', b'N', b'G'])
}

// =============================================================================
// create / get
// =============================================================================

#[tokio::test]
async fn create_post_uses_slug_as_id() {
    let (content, _) = client();
    let post = content.create_post("hello-world", &fields("Hello World", "img-1")).await.unwrap();
    assert_eq!(post.id, "hello-world");
    assert_eq!(post.slug, "hello-world");
    assert_eq!(post.author_id, "author-1");
    assert_eq!(post.status, PostStatus::Active);
    assert!(post.created_at.is_some());

    let fetched = content.get_post("hello-world").await.unwrap().unwrap();
    assert_eq!(fetched, post);
}

#[tokio::test]
async fn create_post_rejects_missing_fields_before_store() {
    let (content, backend) = client();
    let err = content.create_post("slug", &fields("  ", "img-1")).await.unwrap_err();
    assert_eq!(err, ContentError::MissingField(ATTR_TITLE));

    let err = content.create_post("slug", &fields("Title", "")).await.unwrap_err();
    assert_eq!(err, ContentError::MissingField(ATTR_FEATURED_IMAGE));

    let err = content.create_post(" ", &fields("Title", "img")).await.unwrap_err();
    assert_eq!(err, ContentError::MissingField("slug"));

    assert_eq!(backend.document_count(), 0);
}

#[tokio::test]
async fn create_post_duplicate_slug_is_store_conflict() {
    let (content, _) = client();
    content.create_post("same", &fields("Same", "img-1")).await.unwrap();
    let err = content.create_post("same", &fields("Same", "img-2")).await.unwrap_err();
    assert!(matches!(err, ContentError::Store(BackendError::Conflict(_))));
}

#[tokio::test]
async fn get_missing_post_is_none() {
    let (content, _) = client();
    assert_eq!(content.get_post("ghost").await.unwrap(), None);
}

#[tokio::test]
async fn get_post_propagates_store_failure() {
    let (content, backend) = client();
    backend.fail(Operation::GetDocument);
    assert!(matches!(content.get_post("any").await, Err(ContentError::Store(_))));
}

// =============================================================================
// record validation
// =============================================================================

#[tokio::test]
async fn get_post_rejects_malformed_record() {
    let (content, backend) = client();
    let mut data = Map::new();
    data.insert(ATTR_TITLE.into(), "No body".into());
    backend.seed_document("broken", data);

    let err = content.get_post("broken").await.unwrap_err();
    assert!(matches!(err, ContentError::InvalidRecord { ref id, .. } if id == "broken"));
}

#[tokio::test]
async fn unknown_status_is_invalid() {
    let (content, backend) = client();
    let mut data = fields_to_data(&fields("Draft", "img")).unwrap();
    data.insert(ATTR_STATUS.into(), "draft".into());
    backend.seed_document("draft", data);

    let err = content.get_post("draft").await.unwrap_err();
    assert!(err.to_string().contains("draft"));
}

#[tokio::test]
async fn author_name_is_read_when_present() {
    let (content, backend) = client();
    let mut data = fields_to_data(&fields("Named", "img")).unwrap();
    data.insert(ATTR_AUTHOR_NAME.into(), "Ada".into());
    backend.seed_document("named", data);

    let post = content.get_post("named").await.unwrap().unwrap();
    assert_eq!(post.author_name.as_deref(), Some("Ada"));
}

// =============================================================================
// list
// =============================================================================

#[tokio::test]
async fn list_without_filter_returns_everything() {
    let (content, _) = client();
    content.create_post("a", &fields("A", "i1")).await.unwrap();
    let mut hidden = fields("B", "i2");
    hidden.status = PostStatus::Inactive;
    content.create_post("b", &hidden).await.unwrap();

    assert_eq!(content.list_posts(&PostFilter::default()).await.unwrap().len(), 2);

    let active = content.list_posts(&PostFilter::active()).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, "a");
}

#[tokio::test]
async fn list_filters_by_author() {
    let (content, _) = client();
    content.create_post("mine", &fields("Mine", "i1")).await.unwrap();
    let mut theirs = fields("Theirs", "i2");
    theirs.author_id = "author-2".into();
    content.create_post("theirs", &theirs).await.unwrap();

    let filter = PostFilter { author_id: Some("author-2".into()), ..PostFilter::default() };
    let posts = content.list_posts(&filter).await.unwrap();
    assert_eq!(posts.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["theirs"]);
}

#[tokio::test]
async fn list_skips_malformed_records() {
    let (content, backend) = client();
    content.create_post("good", &fields("Good", "i1")).await.unwrap();
    backend.seed_document("bad", Map::new());

    let posts = content.list_posts(&PostFilter::default()).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, "good");
}

// =============================================================================
// update / delete
// =============================================================================

#[tokio::test]
async fn update_post_replaces_fields() {
    let (content, _) = client();
    content.create_post("post", &fields("Before", "i1")).await.unwrap();

    let mut next = fields("After", "i2");
    next.status = PostStatus::Inactive;
    let updated = content.update_post("post", &next).await.unwrap();
    assert_eq!(updated.title, "After");
    assert_eq!(updated.featured_image, "i2");
    assert_eq!(updated.status, PostStatus::Inactive);
    assert_eq!(updated.id, "post");
}

#[tokio::test]
async fn update_missing_post_is_not_found() {
    let (content, _) = client();
    let err = content.update_post("ghost", &fields("X", "i")).await.unwrap_err();
    assert!(matches!(err, ContentError::Store(ref e) if e.is_not_found()));
}

#[tokio::test]
async fn delete_post_reports_whether_anything_was_deleted() {
    let (content, _) = client();
    content.create_post("post", &fields("Post", "i1")).await.unwrap();
    assert!(content.delete_post("post").await.unwrap());
    assert!(!content.delete_post("post").await.unwrap());
}

// =============================================================================
// files
// =============================================================================

#[tokio::test]
async fn upload_file_returns_id() {
    let (content, backend) = client();
    let id = content.upload_file(&png()).await.unwrap();
    assert_eq!(backend.file_ids(), vec![id.clone()]);
    assert_eq!(content.get_file(&id).await.unwrap().unwrap().name, "cover.png");
}

#[tokio::test]
async fn upload_file_rejects_non_images() {
    let (content, backend) = client();
    let pdf = ImageFile::new("doc.pdf", "application/pdf", vec![1]);
    let err = content.upload_file(&pdf).await.unwrap_err();
    assert_eq!(err, ContentError::UnsupportedImageType("application/pdf".into()));
    assert!(backend.file_ids().is_empty());
}

#[tokio::test]
async fn delete_file_is_best_effort() {
    let (content, backend) = client();
    let id = content.upload_file(&png()).await.unwrap();

    backend.fail(Operation::DeleteFile);
    assert!(!content.delete_file(&id).await);
    assert_eq!(backend.file_ids().len(), 1);

    backend.recover(Operation::DeleteFile);
    assert!(content.delete_file(&id).await);
    assert_eq!(content.get_file(&id).await.unwrap(), None);
}

#[test]
fn preview_url_delegates_to_store() {
    let (content, _) = client();
    assert_eq!(content.file_preview_url("abc"), "memory://files/abc/preview");
}
