use axum::{
    extract::State,
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::{Duration, OffsetDateTime};
use tracing::{info, instrument};

use crate::{
    activities::{duration::parse_duration_spec, repo::Activity},
    auth::extractors::CurrentUser,
    errors::AppResult,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RecordActivityRequest {
    pub duration: String,
}

#[derive(Debug, Serialize)]
pub struct RecordActivityResponse {
    pub message: &'static str,
}

/// POST /record_activity: the client sends how long the activity ran as
/// `"HH:MM:SS"`; the recorded span is anchored at the current instant.
#[instrument(skip(state, payload))]
pub async fn record_activity(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<RecordActivityRequest>,
) -> AppResult<Json<RecordActivityResponse>> {
    let seconds = parse_duration_spec(&payload.duration)?;
    let start_time = OffsetDateTime::now_utc();
    let end_time = start_time + Duration::seconds(seconds);

    let activity = Activity::record(&state.db, user_id, start_time, end_time).await?;

    info!(activity_id = %activity.id, user_id = %user_id, seconds, "activity recorded");
    Ok(Json(RecordActivityResponse {
        message: "Activity recorded successfully",
    }))
}

/// GET /activity: every recorded activity, newest first. Like the charts
/// this page is global rather than scoped to the signed-in user.
#[instrument(skip(state))]
pub async fn all_activity(
    State(state): State<AppState>,
    CurrentUser(_user_id): CurrentUser,
) -> AppResult<Html<String>> {
    let activities = Activity::list_all(&state.db).await?;
    let page = state.renderer.render(
        "activity",
        &json!({ "title": "Activity", "activities": activities }),
    );
    Ok(Html(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_message_matches_the_client_contract() {
        let json = serde_json::to_value(RecordActivityResponse {
            message: "Activity recorded successfully",
        })
        .unwrap();
        assert_eq!(json["message"], "Activity recorded successfully");
    }

    #[test]
    fn request_body_shape() {
        let req: RecordActivityRequest =
            serde_json::from_str(r#"{"duration": "00:25:00"}"#).unwrap();
        assert_eq!(req.duration, "00:25:00");
    }
}
