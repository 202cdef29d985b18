use super::*;

fn data(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), v.clone())).collect()
}

// =============================================================================
// Identity
// =============================================================================

#[tokio::test]
async fn account_then_session_then_profile() {
    let backend = MemoryBackend::new();
    let user = backend.create_account("ada@example.com", "secret1", "Ada").await.unwrap();
    let session = backend.create_session("ADA@example.com", "secret1").await.unwrap();
    assert_eq!(session.user_id, user.id);
    assert_eq!(backend.current_account().await.unwrap(), user);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let backend = MemoryBackend::new();
    backend.create_account("ada@example.com", "secret1", "Ada").await.unwrap();
    let err = backend.create_account("ada@example.com", "other", "Ada 2").await.unwrap_err();
    assert!(matches!(err, BackendError::Conflict(_)));
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let backend = MemoryBackend::new();
    backend.create_account("ada@example.com", "secret1", "Ada").await.unwrap();
    let err = backend.create_session("ada@example.com", "nope").await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn profile_without_session_is_unauthorized() {
    let backend = MemoryBackend::new();
    assert!(backend.current_account().await.unwrap_err().is_unauthorized());
}

#[tokio::test]
async fn delete_sessions_signs_out() {
    let backend = MemoryBackend::new();
    backend.create_account("ada@example.com", "secret1", "Ada").await.unwrap();
    backend.create_session("ada@example.com", "secret1").await.unwrap();
    backend.delete_sessions().await.unwrap();
    assert!(backend.current_account().await.is_err());
    assert!(backend.delete_sessions().await.is_err());
}

// =============================================================================
// Documents
// =============================================================================

#[tokio::test]
async fn create_get_update_delete_document() {
    let backend = MemoryBackend::new();
    let created = backend
        .create_document("hello", data(&[("title", "Hello".into()), ("status", "active".into())]))
        .await
        .unwrap();
    assert_eq!(created.id, "hello");
    assert!(created.created_at.is_some());

    let updated = backend
        .update_document("hello", data(&[("title", "Hello again".into())]))
        .await
        .unwrap();
    assert_eq!(updated.data.get("title"), Some(&Value::from("Hello again")));
    assert_eq!(updated.data.get("status"), Some(&Value::from("active")));

    backend.delete_document("hello").await.unwrap();
    assert!(backend.get_document("hello").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn duplicate_document_id_conflicts() {
    let backend = MemoryBackend::new();
    backend.create_document("same", Map::new()).await.unwrap();
    let err = backend.create_document("same", Map::new()).await.unwrap_err();
    assert!(matches!(err, BackendError::Conflict(_)));
}

#[tokio::test]
async fn update_missing_document_is_not_found() {
    let backend = MemoryBackend::new();
    assert!(backend.update_document("ghost", Map::new()).await.unwrap_err().is_not_found());
    assert!(backend.delete_document("ghost").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn list_documents_filters_and_limits() {
    let backend = MemoryBackend::new();
    backend.seed_document("a", data(&[("status", "active".into())]));
    backend.seed_document("b", data(&[("status", "inactive".into())]));
    backend.seed_document("c", data(&[("status", "active".into())]));

    assert_eq!(backend.list_documents(&DocumentQuery::new()).await.unwrap().len(), 3);

    let active = backend
        .list_documents(&DocumentQuery::new().equal("status", "active"))
        .await
        .unwrap();
    assert_eq!(active.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), vec!["a", "c"]);

    let limited = backend.list_documents(&DocumentQuery::new().limit(1)).await.unwrap();
    assert_eq!(limited.len(), 1);
}

// =============================================================================
// Files
// =============================================================================

#[tokio::test]
async fn upload_get_delete_file() {
    let backend = MemoryBackend::new();
    let image = ImageFile::new("a.png", "image/png", vec![1, 2, 3]);
    let stored = backend.upload_file(&image).await.unwrap();
    assert_eq!(stored.size, 3);
    assert_eq!(backend.get_file(&stored.id).await.unwrap().mime, "image/png");
    assert_eq!(backend.file_bytes(&stored.id), Some(vec![1, 2, 3]));

    backend.delete_file(&stored.id).await.unwrap();
    assert!(backend.get_file(&stored.id).await.unwrap_err().is_not_found());
    assert!(backend.file_ids().is_empty());
}

#[test]
fn preview_url_is_deterministic() {
    let backend = MemoryBackend::new();
    assert_eq!(backend.preview_url("f1"), "memory://files/f1/preview");
}

// =============================================================================
// Failure injection
// =============================================================================

#[tokio::test]
async fn injected_failure_until_recovered() {
    let backend = MemoryBackend::new();
    let image = ImageFile::new("a.png", "image/png", vec![1]);

    backend.fail(Operation::UploadFile);
    assert!(matches!(backend.upload_file(&image).await, Err(BackendError::Request(_))));
    assert!(backend.file_ids().is_empty());

    backend.recover(Operation::UploadFile);
    assert!(backend.upload_file(&image).await.is_ok());
}
