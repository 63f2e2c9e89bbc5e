use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::state::AppState;

// Per-request access log, one JSON line per request in access.log. Sits
// outside the rate limiter so rejected requests show up too.
pub async fn access_log_middleware(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    state.access_log.info(
        "request",
        Some(json!({
            "method": method,
            "path": path,
            "status": response.status().as_u16(),
            "ip": addr.ip().to_string(),
            "latency_ms": started.elapsed().as_secs_f64() * 1000.0,
        })),
    );

    response
}
