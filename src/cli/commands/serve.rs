//! HTTP endpoint answering weather questions.
//!
//! `POST /` (and `POST /ask`) takes `{"question": "..."}` and responds with the
//! plain answer text. A missing or malformed body counts as an empty question.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::NimbusError;
use crate::pipeline::WeatherPipeline;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Shared application state.
struct AppState {
    pipeline: WeatherPipeline,
}

/// Run the HTTP server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    let pipeline = WeatherPipeline::from_settings(&settings)?;
    let state = Arc::new(AppState { pipeline });

    let addr = format!(
        "{}:{}",
        host.unwrap_or_else(|| settings.server.host.clone()),
        port.unwrap_or(settings.server.port)
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Nimbus Weather Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Ask", "POST /  {\"question\": \"...\"}");
    Output::kv("Ask", "POST /ask");
    Output::kv("Health", "GET  /health");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", post(on_post))
        .route("/ask", post(on_post))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

/// Extract the question from a request body, defaulting to empty.
fn parse_question(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json.get("question").and_then(|q| q.as_str()).map(str::to_string))
        .unwrap_or_default()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn on_post(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    let question = parse_question(&body);

    match state.pipeline.answer(&question).await {
        Ok(result) => (StatusCode::OK, result.answer.to_string()).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

fn error_response(e: &NimbusError) -> (StatusCode, String) {
    error!(kind = e.kind(), "Failed to answer question: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("error: {}: {}", e.kind(), e),
    )
}
