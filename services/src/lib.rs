//! Batch file ingest service: accepts multipart uploads and stores them in
//! object storage.

use crate::config::Config;
use crate::state::AppState;
use crate::storage::FileStorage;
use axum::{
    Router,
    extract::{DefaultBodyLimit, Extension, Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{any, get, post},
};
use stashbox_utils::version_info::{RuntimeEnv, format_version_for_runtime_env};
use stashbox_utils::wire::UPLOAD_PATH;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod ingest;
pub mod state;
pub mod storage;
pub mod telemetry;

/// Builds the service router on top of the given object store.
pub fn routes<S>(storage: S, config: Config) -> Router
where
    S: FileStorage,
{
    let state = AppState::new(storage);

    Router::new()
        .route("/is-health", get(health_check::<S>))
        .route(
            UPLOAD_PATH,
            post(ingest::upload::<S>)
                .fallback(ingest::method_not_allowed)
                .layer(DefaultBodyLimit::max(ingest::MAX_REQUEST_BYTES)),
        )
        .fallback(any(catch_all))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    http_request.method = ?request.method(),
                    http_request.uri = ?request.uri(),
                    http_request.version = ?request.version(),
                    http_request.user_agent = ?request.headers().get(axum::http::header::USER_AGENT),
                )
            }),
        )
        .layer(Extension(config))
        .with_state(state)
}

async fn health_check<S>(
    State(state): State<AppState<S>>,
    Extension(config): Extension<Config>,
) -> impl IntoResponse
where
    S: FileStorage,
{
    let mut response = if state.storage.could_connected().await {
        (StatusCode::OK, "OK").into_response()
    } else {
        (StatusCode::BAD_GATEWAY, "502").into_response()
    };

    let env_value = config.environment().to_string();
    if let Ok(value) = HeaderValue::from_str(&env_value) {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-service-env"), value);
    }

    let runtime_env: RuntimeEnv = config.environment().into();
    let version_value = format_version_for_runtime_env(runtime_env);
    if let Ok(value) = HeaderValue::from_str(&version_value) {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-service-version"), value);
    }

    response
}

async fn catch_all() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nothing to see here")
}
