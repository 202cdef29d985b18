//! Edit page loader: fetch the post and hand it to an editor.

use tracing::debug;

use crate::forms::editor::PostEditor;
use crate::routes::Route;
use crate::services::content::{ContentClient, ContentError};
use crate::state::auth::AuthState;

pub enum EditLoad {
    Editor(Box<PostEditor>),
    Redirect(Route),
}

/// Missing posts redirect home; posts by someone else redirect to their
/// read-only page.
///
/// # Errors
///
/// [`ContentError`] for store failures and malformed records.
pub async fn load_editor(client: &ContentClient, auth: &AuthState, slug: &str) -> Result<EditLoad, ContentError> {
    let Some(user) = auth.user() else {
        return Ok(EditLoad::Redirect(Route::Login));
    };
    let Some(post) = client.get_post(slug).await? else {
        return Ok(EditLoad::Redirect(Route::Home));
    };
    if !post.is_authored_by(&user) {
        debug!(post_id = %post.id, user_id = %user.id, "edit refused for non-author");
        return Ok(EditLoad::Redirect(Route::Post(post.id)));
    }
    Ok(EditLoad::Editor(Box::new(PostEditor::edit(client.clone(), auth.clone(), post))))
}

#[cfg(test)]
#[path = "edit_post_test.rs"]
mod tests;
