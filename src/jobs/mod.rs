use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod filter;
pub mod fixtures;
pub mod handlers;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::jobs_routes())
}
