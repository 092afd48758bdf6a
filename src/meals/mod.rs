mod dto;
pub mod handlers;
pub mod repo_types;
pub mod services;
pub mod store;

use crate::state::AppState;
use axum::Router;

pub use repo_types::{DailyLog, MealSnapshot};
pub use services::{DayReport, MealRow};
pub use store::{JsonFileStore, LogStore, MemoryStore};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::page_routes())
        .merge(handlers::write_routes())
}
