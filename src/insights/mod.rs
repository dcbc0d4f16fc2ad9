use crate::state::AppState;
use axum::Router;

pub mod classifier;
pub mod client;
mod dto;
pub mod handlers;
pub mod prompts;
pub mod sections;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::insights_routes())
}
