pub mod client;
mod dto;
pub mod gemini;
pub mod handlers;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use client::{AdviceClient, AdviceError};
pub use dto::AdviceResult;
pub use gemini::GeminiClient;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::advice_routes())
}
