use anyhow::Context;
use bytes::Bytes;
use tracing::warn;
use uuid::Uuid;

use crate::{
    auth::repo::{User, DEFAULT_AVATAR},
    errors::{AppError, AppResult},
    state::AppState,
};

const PRESIGN_TTL_SECS: u64 = 600;

fn ext_for_content_type(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Upload a new avatar and return its storage key. The previous object is
/// removed best-effort; a stale leftover only wastes a little space.
pub async fn store_avatar(
    state: &AppState,
    user_id: Uuid,
    previous: &str,
    data: Bytes,
    content_type: &str,
) -> AppResult<String> {
    let ext = ext_for_content_type(content_type).ok_or_else(|| {
        AppError::Validation(format!("unsupported avatar content type {content_type}"))
    })?;
    let key = format!("avatars/{}/{}.{}", user_id, Uuid::new_v4(), ext);

    state
        .storage
        .put_object(&key, data, content_type)
        .await
        .with_context(|| format!("upload avatar {key}"))?;

    if previous != DEFAULT_AVATAR {
        if let Err(e) = state.storage.delete_object(previous).await {
            warn!(error = %e, key = previous, "failed to delete previous avatar");
        }
    }

    Ok(key)
}

/// Where the browser should fetch the avatar from: a presigned object URL,
/// or the bundled default image when nothing was uploaded yet.
pub async fn avatar_url(state: &AppState, user: &User) -> AppResult<String> {
    if user.image_file == DEFAULT_AVATAR {
        return Ok(format!("/static/{DEFAULT_AVATAR}"));
    }
    let url = state
        .storage
        .presign_get(&user.image_file, PRESIGN_TTL_SECS)
        .await
        .with_context(|| format!("presign avatar {}", user.image_file))?;
    Ok(url)
}
