use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Form, Router,
};
use tracing::{info, instrument, warn};

use super::dto::LogMealForm;
use super::services::{day_report, log_dish, LogOutcome};
use super::store::today_key;
use crate::{
    state::AppState,
    views::{internal, FlashKind, Page},
};

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/insights", get(insights))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/log_meal", post(log_meal))
}

pub async fn home() -> Page {
    Page::index()
}

#[instrument(skip(state))]
pub async fn log_meal(
    State(state): State<AppState>,
    Form(form): Form<LogMealForm>,
) -> Result<Page, (StatusCode, String)> {
    let dish_name = form.dish_name.unwrap_or_default();
    let day = today_key();

    match log_dish(state.log.as_ref(), &state.dishes, &dish_name, &day)
        .await
        .map_err(internal)?
    {
        LogOutcome::Logged => Ok(Page::flash(
            FlashKind::Success,
            format!("{dish_name} logged successfully!"),
        )),
        LogOutcome::NotFound => {
            warn!(%dish_name, "dish not in catalog");
            Ok(Page::flash(FlashKind::Error, "Dish not found!"))
        }
    }
}

#[instrument(skip(state))]
pub async fn insights(State(state): State<AppState>) -> Result<Page, (StatusCode, String)> {
    let day = today_key();
    let log = state.log.load().await.map_err(internal)?;

    let Some(report) = day_report(&log, &day) else {
        info!(%day, "no meals logged");
        return Ok(Page::flash(FlashKind::Info, "No meals logged today!"));
    };

    Ok(Page::Insights {
        meals: report.meals,
        totals: report.totals,
        gemini_advice: None,
    })
}
