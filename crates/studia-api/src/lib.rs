//! # studia-api
//!
//! HTTP surface of the document extraction service.
//!
//! The router is built here rather than in `main.rs` so integration tests can
//! drive it with in-memory collaborators.

pub mod auth;
pub mod error;
pub mod handlers;

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use governor::{Quota, RateLimiter};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use studia_core::defaults;
use studia_core::IdentityProvider;
use studia_extract::ExtractionService;

pub use error::ApiError;

/// Default browser origin allowed by CORS (local frontend dev server).
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub extraction: Arc<ExtractionService>,
    pub identity: Arc<dyn IdentityProvider>,
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

impl AppState {
    pub fn new(extraction: Arc<ExtractionService>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            extraction,
            identity,
            rate_limiter: None,
        }
    }

    pub fn with_rate_limit(mut self, requests: u64, period_secs: u64) -> Self {
        self.rate_limiter = build_rate_limiter(requests, period_secs);
        self
    }
}

/// Listener and middleware settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rate_limit_enabled: bool,
    pub rate_limit_requests: u64,
    pub rate_limit_period_secs: u64,
    pub allowed_origins: Vec<HeaderValue>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults::SERVER_PORT),
            rate_limit_enabled: std::env::var("RATE_LIMIT_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            rate_limit_requests: std::env::var("RATE_LIMIT_REQUESTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults::RATE_LIMIT_REQUESTS),
            rate_limit_period_secs: std::env::var("RATE_LIMIT_PERIOD_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults::RATE_LIMIT_PERIOD_SECS),
            allowed_origins: parse_allowed_origins(std::env::var("ALLOWED_ORIGINS").ok().as_deref()),
        }
    }
}

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Parse a comma-separated origin list, skipping invalid entries.
/// Falls back to [`DEFAULT_ALLOWED_ORIGIN`] when unset or empty.
pub fn parse_allowed_origins(raw: Option<&str>) -> Vec<HeaderValue> {
    let raw = raw.unwrap_or("").trim();
    if raw.is_empty() {
        return vec![HeaderValue::from_static(DEFAULT_ALLOWED_ORIGIN)];
    }

    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

/// Global limiter allowing `requests` per `period_secs`, or `None` when either
/// value is zero.
pub fn build_rate_limiter(requests: u64, period_secs: u64) -> Option<Arc<GlobalRateLimiter>> {
    let burst = NonZeroU32::new(u32::try_from(requests).unwrap_or(u32::MAX))?;
    let quota = Quota::with_period(Duration::from_secs(period_secs) / burst.get())?
        .allow_burst(burst);
    Some(Arc::new(RateLimiter::direct(quota)))
}

async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!(subsystem = "api", "Rate limit exceeded");
            return ApiError::TooManyRequests(
                "Too many requests. Please wait before retrying".to_string(),
            )
            .into_response();
        }
    }
    next.run(request).await
}

fn cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("apikey"),
            HeaderName::from_static("x-client-info"),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Build the application router.
pub fn router(state: AppState, allowed_origins: Vec<HeaderValue>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/functions/v1/extract-document-text",
            post(handlers::extract_document_text),
        )
        .route(
            "/api/v1/materials/extract",
            post(handlers::extract_document_text),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors_layer(allowed_origins))
        .layer(RequestBodyLimitLayer::new(defaults::MAX_BODY_SIZE_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allowed_origins_default() {
        let origins = parse_allowed_origins(None);
        assert_eq!(origins, vec![HeaderValue::from_static(DEFAULT_ALLOWED_ORIGIN)]);
        assert_eq!(parse_allowed_origins(Some("  ")).len(), 1);
    }

    #[test]
    fn test_parse_allowed_origins_list() {
        let origins =
            parse_allowed_origins(Some("https://app.studia.dev, http://localhost:3000,,"));
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "https://app.studia.dev");
        assert_eq!(origins[1], "http://localhost:3000");
    }

    #[test]
    fn test_build_rate_limiter_rejects_zero() {
        assert!(build_rate_limiter(0, 60).is_none());
        assert!(build_rate_limiter(10, 0).is_none());
    }

    #[test]
    fn test_rate_limiter_allows_burst_then_blocks() {
        let limiter = build_rate_limiter(2, 60).unwrap();
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }
}
