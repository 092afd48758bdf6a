use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::advice::AdviceResult;
use crate::meals::MealRow;
use crate::nutrients::Totals;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

/// One-shot status message shown above a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flash {
    pub category: FlashKind,
    pub message: String,
}

/// Page payloads. Rendering is left to the client; the server only
/// decides which page to show and with what data.
#[derive(Debug, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Page {
    Index {
        flashes: Vec<Flash>,
    },
    Insights {
        meals: Vec<MealRow>,
        totals: Totals,
        #[serde(skip_serializing_if = "Option::is_none")]
        gemini_advice: Option<AdviceResult>,
    },
}

impl Page {
    pub fn index() -> Self {
        Page::Index { flashes: vec![] }
    }

    pub fn flash(category: FlashKind, message: impl Into<String>) -> Self {
        Page::Index {
            flashes: vec![Flash {
                category,
                message: message.into(),
            }],
        }
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Logs the cause and hides it from the client.
pub(crate) fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %format!("{e:#}"), "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
}
