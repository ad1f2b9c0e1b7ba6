use std::any::Any;
use std::sync::Arc;

use axum::{
    http::{header::CONTENT_TYPE, Response, StatusCode},
    middleware,
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use http_body_util::Full;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    handlers::{invoke, stop, stream},
    middleware::{auth, logging},
    routes::{self, agents, conversations, health},
    state::AppState,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    // Everything except /health sits behind the bearer gate
    let protected = Router::new()
        .route("/agents", get(agents::list_agents))
        .route("/conversations", get(conversations::list_conversations))
        .route(
            "/conversations/:thread_id",
            get(conversations::get_conversation),
        )
        .route("/:agent_id/invoke", post(invoke::invoke_agent))
        .route("/:agent_id/stream", post(stream::stream_agent))
        .route("/:agent_id/stop", post(stop::stop_generation))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    // No request timeout: streamed runs stay open until completion, stop or
    // disconnect.
    Router::new()
        .route("/health", get(health::health_check))
        .merge(protected)
        .fallback(routes::not_found)
        .layer(middleware::from_fn(logging::log_request))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let mut cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(AnyOrigin);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors = cors.allow_origin(AnyOrigin);
        } else {
            for origin in &config.cors.origins {
                if let Ok(parsed) = origin.parse::<axum::http::HeaderValue>() {
                    cors = cors.allow_origin(parsed);
                }
            }
        }

        cors
    } else {
        CorsLayer::permissive()
    }
}

/// Last-resort handler: a panicking route becomes a generic 500 instead of a
/// dropped connection or a dead process.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Full<Bytes>> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("handler panicked: {}", detail);

    let body = serde_json::json!({
        "error": "internal_error",
        "message": "Unexpected server error",
    })
    .to_string();

    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::from(body))
        .unwrap()
}
