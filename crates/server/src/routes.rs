//! HTTP routes: conversion endpoint and health check.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use url::Url;

use pagemark_core::{FetchConfig, Mode, convert, fetch_url};

use crate::rate_limit::{RateLimiter, client_key};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<RateLimiter>,
    pub fetch: FetchConfig,
}

impl Default for AppState {
    fn default() -> Self {
        Self { limiter: Arc::new(RateLimiter::default()), fetch: FetchConfig::default() }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    url: String,
    #[serde(default, rename = "enableDetailedResponse")]
    enable_detailed_response: bool,
}

/// One entry of the JSON response array.
#[derive(Debug, Serialize)]
pub struct MarkdownResponse {
    url: String,
    md: String,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/convert",
            get(convert_page)
                .layer(middleware::from_fn_with_state(state.clone(), enforce_rate_limit)),
        )
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(60)))
        .with_state(state)
}

fn error_response(status: StatusCode, error: &str, details: Option<String>) -> Response {
    let body = match details {
        Some(details) => serde_json::json!({ "error": error, "details": details }),
        None => serde_json::json!({ "error": error }),
    };
    (status, Json(body)).into_response()
}

fn is_valid_url(raw: &str) -> bool {
    matches!(Url::parse(raw), Ok(url) if matches!(url.scheme(), "http" | "https"))
}

/// GET /convert?url=...&enableDetailedResponse=bool
///
/// Fetches the page, runs the pipeline, and answers JSON `[{url, md}]` when
/// the client accepts `application/json`, plain text otherwise.
async fn convert_page(
    State(state): State<AppState>, headers: HeaderMap, Query(query): Query<ConvertQuery>,
) -> Response {
    if !is_valid_url(&query.url) {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Invalid URL provided, should be a full URL starting with http:// or https://",
            None,
        );
    }

    let html = match fetch_url(&query.url, &state.fetch).await {
        Ok(html) => html,
        Err(err) => {
            tracing::error!(url = %query.url, error = %err, "fetch failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch URL", Some(err.to_string()));
        }
    };

    let mode = if query.enable_detailed_response { Mode::Detailed } else { Mode::Summary };

    let result = match convert(&html, mode) {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(url = %query.url, error = %err, "conversion failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to convert page", Some(err.to_string()));
        }
    };

    if result.used_fallback {
        tracing::debug!(url = %query.url, "extraction fell back to full page");
    }

    let wants_json = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"));

    if wants_json {
        Json(vec![MarkdownResponse { url: query.url, md: result.markdown }]).into_response()
    } else {
        result.markdown.into_response()
    }
}

/// GET /health: liveness of the rate-limit counter store.
async fn health(State(state): State<AppState>) -> Response {
    if state.limiter.is_healthy() {
        Json(serde_json::json!({ "status": "ok" })).into_response()
    } else {
        error_response(StatusCode::SERVICE_UNAVAILABLE, "Rate limit store unavailable", None)
    }
}

/// Admission control, applied to /convert only.
async fn enforce_rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let key = client_key(request.headers());
    if !state.limiter.check(&key) {
        tracing::warn!(%key, "rate limit exceeded");
        return error_response(StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded, try again later", None);
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_state(limit: u32) -> AppState {
        AppState {
            limiter: Arc::new(RateLimiter::new(limit, Duration::from_secs(60))),
            fetch: FetchConfig::default(),
        }
    }

    async fn send(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = send(router(test_state(5)), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("ok"));
    }

    #[tokio::test]
    async fn convert_requires_url_param() {
        let (status, _) = send(router(test_state(5)), "/convert").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn convert_rejects_non_http_url() {
        let (status, body) = send(router(test_state(5)), "/convert?url=ftp%3A%2F%2Fx.com").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Invalid URL"));
    }

    #[tokio::test]
    async fn rate_limit_kicks_in() {
        let app = router(test_state(2));
        // Invalid URLs still count against the window; admission runs first.
        let uri = "/convert?url=not-a-url";
        let (first, _) = send(app.clone(), uri).await;
        let (second, _) = send(app.clone(), uri).await;
        let (third, body) = send(app, uri).await;
        assert_eq!(first, StatusCode::BAD_REQUEST);
        assert_eq!(second, StatusCode::BAD_REQUEST);
        assert_eq!(third, StatusCode::TOO_MANY_REQUESTS);
        assert!(body.contains("Rate limit"));
    }

    #[test]
    fn is_valid_url_accepts_http_and_https() {
        assert!(is_valid_url("https://example.com/a"));
        assert!(is_valid_url("http://example.com"));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url("javascript:alert(1)"));
    }
}
