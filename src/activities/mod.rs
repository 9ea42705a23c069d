use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub mod duration;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/record_activity", post(handlers::record_activity))
        .route("/activity", get(handlers::all_activity))
}
