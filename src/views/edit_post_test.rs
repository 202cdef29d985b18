use std::sync::Arc;

use super::*;
use crate::backend::memory::MemoryBackend;
use crate::model::{PostFields, PostStatus, User};

fn user(id: &str) -> User {
    User { id: id.into(), email: format!("{id}@example.com"), name: id.into() }
}

async fn setup() -> ContentClient {
    let backend = Arc::new(MemoryBackend::new());
    let client = ContentClient::new(backend.clone(), backend);
    let fields = PostFields {
        title: "Hello".into(),
        content: "<p>Body</p>".into(),
        status: PostStatus::Active,
        featured_image: "img".into(),
        author_id: "author".into(),
    };
    client.create_post("hello", &fields).await.unwrap();
    client
}

fn redirect(load: EditLoad) -> Route {
    match load {
        EditLoad::Redirect(route) => route,
        EditLoad::Editor(_) => panic!("expected a redirect"),
    }
}

#[tokio::test]
async fn author_gets_prefilled_editor() {
    let client = setup().await;
    let auth = AuthState::new();
    auth.login(user("author"));

    match load_editor(&client, &auth, "hello").await.unwrap() {
        EditLoad::Editor(editor) => {
            assert_eq!(editor.title(), "Hello");
            assert_eq!(editor.slug(), "hello");
        }
        EditLoad::Redirect(route) => panic!("unexpected redirect to {route}"),
    }
}

#[tokio::test]
async fn redirects() {
    let client = setup().await;
    let auth = AuthState::new();
    auth.logout();
    assert_eq!(redirect(load_editor(&client, &auth, "hello").await.unwrap()), Route::Login);

    auth.login(user("author"));
    assert_eq!(redirect(load_editor(&client, &auth, "ghost").await.unwrap()), Route::Home);

    auth.login(user("someone-else"));
    assert_eq!(redirect(load_editor(&client, &auth, "hello").await.unwrap()), Route::Post("hello".into()));
}
