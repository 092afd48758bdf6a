use axum::{extract::State, http::StatusCode, routing::post, Router};
use tracing::{info, instrument};

use super::services::get_advice;
use crate::{
    meals::{services::day_report, store::today_key},
    state::AppState,
    views::{internal, FlashKind, Page},
};

pub fn advice_routes() -> Router<AppState> {
    Router::new().route("/gemini_advice", post(gemini_advice))
}

#[instrument(skip(state))]
pub async fn gemini_advice(State(state): State<AppState>) -> Result<Page, (StatusCode, String)> {
    let day = today_key();
    let log = state.log.load().await.map_err(internal)?;

    let Some(report) = day_report(&log, &day) else {
        info!(%day, "no meals logged; skipping advice");
        return Ok(Page::flash(FlashKind::Info, "No meals logged today!"));
    };

    info!(
        model = %state.config.gemini.model,
        meals = report.meals.len(),
        "requesting advice"
    );
    let advice = get_advice(state.advisor.as_ref(), &report.meals).await;
    Ok(Page::Insights {
        meals: report.meals,
        totals: report.totals,
        gemini_advice: Some(advice),
    })
}
