use crate::errors::EngineError;
use crate::server::tools::{self, Tool, ToolSpec};
use crate::state::{AppState, CounterSnapshot};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use portable_atomic::Ordering::Relaxed;
use serde_json::Value;
use std::sync::Arc;

/// GET /health -- liveness plus the address this instance was bound to
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "bind_addr": state.config.bind_addr(),
    }))
}

/// GET /api/tools -- tool catalog
pub async fn list_tools(State(state): State<Arc<AppState>>) -> Json<Vec<ToolSpec>> {
    state.counters.catalog_reads.fetch_add(1, Relaxed);
    Json(Tool::ALL.iter().map(|t| t.spec()).collect())
}

/// POST /api/tools/{name} -- run one tool. Body is a JSON object of
/// arguments; an empty body means no arguments.
pub async fn call_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    let result = name.parse::<Tool>().and_then(|tool| {
        let args = parse_args(&body)?;
        // report dates default to the server's calendar day
        let today = chrono::Local::now().date_naive();
        tools::run(tool, &args, today)
    });

    match result {
        Ok(output) => {
            state.counters.record_call(true);
            tracing::info!(tool = output.tool, "tool call completed");
            Json(output).into_response()
        }
        Err(e) => {
            state.counters.record_call(false);
            tracing::warn!(tool = %name, "tool call rejected: {e}");
            error_response(&e)
        }
    }
}

/// GET /api/counters -- request counters (lock-free reads)
pub async fn get_counters(State(state): State<Arc<AppState>>) -> Json<CounterSnapshot> {
    Json(state.counters.snapshot())
}

fn parse_args(body: &[u8]) -> Result<Value, EngineError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    let args: Value = serde_json::from_slice(body)?;
    if !args.is_object() {
        return Err(EngineError::Parse("arguments must be a JSON object".to_string()));
    }
    Ok(args)
}

fn error_response(e: &EngineError) -> Response {
    let status = match e {
        EngineError::UnknownTool(_) => StatusCode::NOT_FOUND,
        EngineError::InvalidInput(_) | EngineError::Parse(_) => StatusCode::BAD_REQUEST,
        EngineError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
}
