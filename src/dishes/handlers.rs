use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::{debug, instrument};

use super::dto::AutocompleteQuery;
use crate::state::AppState;

pub fn search_routes() -> Router<AppState> {
    Router::new().route("/autocomplete", get(autocomplete))
}

#[instrument(skip(state))]
pub async fn autocomplete(
    State(state): State<AppState>,
    Query(query): Query<AutocompleteQuery>,
) -> Json<Vec<String>> {
    let suggestions = state.dishes.suggest(&query.q);
    debug!(count = suggestions.len(), "autocomplete");
    Json(suggestions)
}
