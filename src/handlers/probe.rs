use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::handlers::internal_error;
use crate::models::ProbeResponse;
use crate::state::AppState;

// GET /test - diagnostic endpoint, runs a bus scan and returns the raw output
pub async fn probe_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.run_cec("scan".to_string()).await {
        Ok(output) => Json(ProbeResponse { output }).into_response(),
        Err(err) => internal_error(&state, "CEC probe command failed", &err),
    }
}
