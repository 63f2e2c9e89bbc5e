mod health;
mod metrics;
mod probe;
mod tv;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use probe::probe_handler;
pub use tv::{tv_off_handler, tv_on_handler, tv_state_handler};

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::CecError;
use crate::models::ErrorResponse;
use crate::state::AppState;

// The client always gets the same opaque 500; the real reason only goes to
// the log so internal paths and adapter chatter never leak out.
pub(crate) fn internal_error(state: &AppState, message: &str, err: &CecError) -> Response {
    state
        .logger
        .error(message, Some(json!({"error": err.to_string()})));

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal Server Error".to_string(),
        }),
    )
        .into_response()
}
