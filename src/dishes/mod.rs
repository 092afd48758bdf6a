mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;

use crate::state::AppState;
use axum::Router;

pub use repo::DishIndex;
pub use repo_types::DishRecord;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::search_routes())
}
