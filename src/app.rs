use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{advice, dishes, meals};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(meals::router())
        .merge(dishes::router())
        .merge(advice::router())
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::{AdviceClient, AdviceError};
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_and_home() {
        let app = build_app(AppState::fake());
        let res = app.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let (status, body) = send(&app, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"page": "index", "flashes": []}));
    }

    #[tokio::test]
    async fn autocomplete_returns_matching_names() {
        let app = build_app(AppState::fake());
        let (status, body) = send(&app, get("/autocomplete?q=pan")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(["Paneer Tikka"]));

        let (_, body) = send(&app, get("/autocomplete")).await;
        assert_eq!(body, json!(["Paneer Tikka", "Dal Fry"]));
    }

    #[tokio::test]
    async fn unknown_dish_flashes_error() {
        let app = build_app(AppState::fake());
        let (status, body) = send(&app, post_form("/log_meal", "dish_name=Pizza")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["flashes"][0]["category"], json!("error"));
        assert_eq!(body["flashes"][0]["message"], json!("Dish not found!"));

        let (_, body) = send(&app, post_form("/log_meal", "")).await;
        assert_eq!(body["flashes"][0]["message"], json!("Dish not found!"));
    }

    #[tokio::test]
    async fn empty_day_flashes_info() {
        let app = build_app(AppState::fake());
        for req in [get("/insights"), post_form("/gemini_advice", "")] {
            let (status, body) = send(&app, req).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["page"], json!("index"));
            assert_eq!(body["flashes"][0]["category"], json!("info"));
            assert_eq!(body["flashes"][0]["message"], json!("No meals logged today!"));
        }
    }

    #[tokio::test]
    async fn logged_meals_add_up_on_insights() {
        let app = build_app(AppState::fake());

        let (_, body) = send(&app, post_form("/log_meal", "dish_name=Paneer+Tikka")).await;
        assert_eq!(body["flashes"][0]["category"], json!("success"));
        assert_eq!(
            body["flashes"][0]["message"],
            json!("Paneer Tikka logged successfully!")
        );
        send(&app, post_form("/log_meal", "dish_name=dal+fry")).await;

        let (status, body) = send(&app, get("/insights")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], json!("insights"));
        assert_eq!(body["meals"][0]["Dish_Name"], json!("Paneer Tikka"));
        assert_eq!(body["meals"][1]["Dish_Name"], json!("Dal Fry"));
        assert_eq!(body["meals"][1]["Free_Sugar"], json!(0.0));
        assert_eq!(body["totals"]["Calories"], json!(430.0));
        assert_eq!(body["totals"]["Protein"], json!(28.0));
        assert_eq!(body["totals"]["Fats"], json!(21.0));
        assert_eq!(body["totals"]["Carbohydrates"], json!(28.0));
        assert!(body.get("gemini_advice").is_none());
    }

    #[tokio::test]
    async fn advice_is_attached_to_insights() {
        let app = build_app(AppState::fake());
        send(&app, post_form("/log_meal", "dish_name=Dal+Fry")).await;

        let (status, body) = send(&app, post_form("/gemini_advice", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], json!("insights"));
        assert_eq!(body["totals"]["Calories"], json!(180.0));
        assert_eq!(
            body["gemini_advice"],
            json!({
                "summary": "You ate 1 meals.",
                "key_nutrients": ["Protein"],
                "tips": "Add vegetables.",
                "warnings": ""
            })
        );
    }

    struct DownAdvisor;

    #[async_trait]
    impl AdviceClient for DownAdvisor {
        async fn generate(&self, _meals_summary: &str) -> Result<String, AdviceError> {
            Err(AdviceError::Api {
                status: 503,
                message: "unavailable".into(),
            })
        }
    }

    #[tokio::test]
    async fn advice_failure_falls_back_without_error() {
        let app = build_app(AppState::fake().with_advisor(Arc::new(DownAdvisor)));
        send(&app, post_form("/log_meal", "dish_name=Dal+Fry")).await;

        let (status, body) = send(&app, post_form("/gemini_advice", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["gemini_advice"],
            json!({
                "summary": "Could not get AI advice.",
                "key_nutrients": [],
                "tips": "",
                "warnings": ""
            })
        );
    }
}
