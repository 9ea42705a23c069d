use axum::Router;

use crate::state::AppState;

pub mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod sessions;
pub mod tokens;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
