use axum::{routing::get, Router};

use crate::state::AppState;

pub mod handlers;
pub mod services;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/account",
        get(handlers::account_page).post(handlers::update_account),
    )
}
