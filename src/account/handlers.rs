use axum::{
    extract::{Multipart, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use bytes::Bytes;
use serde_json::json;
use tracing::{info, instrument};

use crate::{
    account::services::{avatar_url, store_avatar},
    auth::{
        dto::PublicUser,
        extractors::CurrentUser,
        handlers::{validate_email, validate_username},
        repo::User,
    },
    errors::{AppError, AppResult},
    state::AppState,
};

async fn load_user(state: &AppState, user_id: uuid::Uuid) -> AppResult<User> {
    User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::Auth("account no longer exists".into()))
}

#[instrument(skip(state))]
pub async fn account_page(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<Html<String>> {
    let user = load_user(&state, user_id).await?;
    let avatar = avatar_url(&state, &user).await?;
    let page = state.renderer.render(
        "account",
        &json!({
            "title": "Account",
            "user": PublicUser::from(&user),
            "avatar_url": avatar,
        }),
    );
    Ok(Html(page))
}

/// POST /account: multipart form carrying username, email and an optional
/// replacement avatar.
#[instrument(skip(state, multipart))]
pub async fn update_account(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let user = load_user(&state, user_id).await?;

    let mut username = user.username.clone();
    let mut email = user.email.clone();
    let mut picture: Option<(Bytes, String)> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let malformed = |_| AppError::Validation("malformed multipart body".into());
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("username") => username = field.text().await.map_err(malformed)?.trim().to_string(),
            Some("email") => email = field.text().await.map_err(malformed)?.trim().to_lowercase(),
            Some("picture") => {
                let content_type = field
                    .content_type()
                    .map(|ct| ct.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let data = field.bytes().await.map_err(malformed)?;
                // browsers send an empty file part when nothing was picked
                if !data.is_empty() {
                    picture = Some((data, content_type));
                }
            }
            _ => {}
        }
    }

    validate_username(&username)?;
    validate_email(&email)?;

    let image_file = match picture {
        Some((data, content_type)) => {
            Some(store_avatar(&state, user_id, &user.image_file, data, &content_type).await?)
        }
        None => None,
    };

    User::update_profile(&state.db, user_id, &username, &email, image_file.as_deref()).await?;

    info!(user_id = %user_id, avatar_replaced = image_file.is_some(), "account updated");
    Ok(Redirect::to("/account").into_response())
}
