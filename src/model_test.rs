use super::*;
use std::io::Write;

fn sample_post(author_id: &str) -> Post {
    Post {
        id: "first-post".into(),
        slug: "first-post".into(),
        title: "First post".into(),
        content: "<p>hi</p>".into(),
        status: PostStatus::Active,
        featured_image: "img-1".into(),
        author_id: author_id.into(),
        author_name: None,
        created_at: None,
        updated_at: None,
    }
}

// =============================================================================
// PostStatus
// =============================================================================

#[test]
fn status_parses_case_insensitively() {
    assert_eq!("Active".parse::<PostStatus>().unwrap(), PostStatus::Active);
    assert_eq!(" inactive ".parse::<PostStatus>().unwrap(), PostStatus::Inactive);
}

#[test]
fn status_rejects_unknown() {
    let err = "draft".parse::<PostStatus>().unwrap_err();
    assert!(err.to_string().contains("draft"));
}

#[test]
fn status_serializes_lowercase() {
    assert_eq!(serde_json::to_value(PostStatus::Inactive).unwrap(), serde_json::json!("inactive"));
    assert_eq!(PostStatus::default(), PostStatus::Active);
}

// =============================================================================
// Post authorship
// =============================================================================

#[test]
fn is_authored_by_matches_user_id() {
    let user = User { id: "u1".into(), email: "a@b.co".into(), name: "A".into() };
    assert!(sample_post("u1").is_authored_by(&user));
    assert!(!sample_post("u2").is_authored_by(&user));
}

// =============================================================================
// Images
// =============================================================================

#[test]
fn allowed_image_types() {
    assert!(is_allowed_image_type("image/png"));
    assert!(is_allowed_image_type("IMAGE/JPEG"));
    assert!(is_allowed_image_type("image/gif"));
    assert!(!is_allowed_image_type("image/webp"));
    assert!(!is_allowed_image_type("application/pdf"));
}

#[test]
fn mime_from_extension() {
    assert_eq!(image_mime_for(Path::new("a/photo.JPG")), Some("image/jpeg"));
    assert_eq!(image_mime_for(Path::new("banner.png")), Some("image/png"));
    assert_eq!(image_mime_for(Path::new("notes.txt")), None);
    assert_eq!(image_mime_for(Path::new("noext")), None);
}

#[test]
fn image_debug_hides_bytes() {
    let image = ImageFile::new("a.png", "image/png", vec![1, 2, 3]);
    let out = format!("{image:?}");
    assert!(out.contains("len: 3"));
    assert!(!out.contains("[1, 2, 3]"));
}

#[tokio::test]
async fn image_from_path_reads_bytes_and_mime() {
    let mut file = tempfile::Builder::new().suffix(".gif").tempfile().unwrap();
    file.write_all(b"GIF89a").unwrap();

    let image = ImageFile::from_path(file.path()).await.unwrap();
    assert_eq!(image.mime, "image/gif");
    assert_eq!(image.bytes, b"GIF89a");
    assert!(image.is_allowed_type());
    assert!(image.name.ends_with(".gif"));
}

#[tokio::test]
async fn image_from_path_unknown_extension_is_rejected_type() {
    let mut file = tempfile::Builder::new().suffix(".bmp").tempfile().unwrap();
    file.write_all(b"BM").unwrap();

    let image = ImageFile::from_path(file.path()).await.unwrap();
    assert_eq!(image.mime, "application/octet-stream");
    assert!(!image.is_allowed_type());
}

#[tokio::test]
async fn image_from_missing_path_errors() {
    let dir = tempfile::tempdir().unwrap();
    assert!(ImageFile::from_path(&dir.path().join("missing.png")).await.is_err());
}
