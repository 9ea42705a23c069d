use axum::{routing::get, Router};

use crate::state::AppState;

pub mod aggregate;
pub mod handlers;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/daychart", get(handlers::daychart))
        .route("/weekchart", get(handlers::weekchart))
        .route("/monthchart", get(handlers::monthchart))
        .route("/yearchart", get(handlers::yearchart))
}
