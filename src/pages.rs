use axum::{extract::State, response::Html, routing::get, Router};
use serde_json::json;

use crate::{
    account::services::avatar_url,
    auth::{extractors::MaybeUser, repo::User},
    errors::AppResult,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(home))
}

/// Landing page; shows the signed-in user when the session cookie checks
/// out, the anonymous variant otherwise.
async fn home(State(state): State<AppState>, MaybeUser(user_id): MaybeUser) -> AppResult<Html<String>> {
    let mut data = json!({ "title": "Home" });
    if let Some(user_id) = user_id {
        if let Some(user) = User::find_by_id(&state.db, user_id).await? {
            data["username"] = json!(user.username);
            data["avatar_url"] = json!(avatar_url(&state, &user).await?);
        }
    }
    Ok(Html(state.renderer.render("home", &data)))
}
