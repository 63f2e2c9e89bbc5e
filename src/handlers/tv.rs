use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::sync::Arc;

use crate::handlers::internal_error;
use crate::models::TvStateResponse;
use crate::power::tv_power_on;
use crate::state::AppState;

// GET /tv-state - ask the TV for its power status and interpret the answer
pub async fn tv_state_handler(State(state): State<Arc<AppState>>) -> Response {
    match state
        .run_cec(format!("pow {}", state.cec_logical_addr))
        .await
    {
        Ok(output) => Json(TvStateResponse {
            tv_on: tv_power_on(&output),
        })
        .into_response(),
        Err(err) => internal_error(&state, "could not read TV power state", &err),
    }
}

// POST /tv-on
pub async fn tv_on_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.run_cec(format!("on {}", state.cec_logical_addr)).await {
        Ok(_) => Json(json!({})).into_response(),
        Err(err) => internal_error(&state, "could not power the TV on", &err),
    }
}

// POST /tv-off - standby, not a hard off; that is all CEC offers
pub async fn tv_off_handler(State(state): State<Arc<AppState>>) -> Response {
    match state
        .run_cec(format!("standby {}", state.cec_logical_addr))
        .await
    {
        Ok(_) => Json(json!({})).into_response(),
        Err(err) => internal_error(&state, "could not put the TV on standby", &err),
    }
}
