mod access_log;
mod cec;
mod config;
mod error;
mod handlers;
mod logger;
mod metrics;
mod models;
mod power;
mod rate_limit;
mod state;
#[cfg(test)]
mod testutil;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use clap::Parser;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::access_log::access_log_middleware;
use crate::cec::CecRunner;
use crate::config::Args;
use crate::logger::Logger;
use crate::models::CecJob;
use crate::rate_limit::{RateLimiter, rate_limit_middleware};
use crate::state::AppState;

fn cors_layer(allowed_origins: Option<&str>) -> CorsLayer {
    let origins = match allowed_origins {
        Some(list) => {
            let parsed: Vec<HeaderValue> = list
                .split(',')
                .map(|o| o.trim())
                .filter(|o| !o.is_empty())
                .filter_map(|o| o.parse().ok())
                .collect();
            AllowOrigin::list(parsed)
        }
        // no configured list: reflect the request origin
        None => AllowOrigin::mirror_request(),
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

fn build_router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/tv-state", get(handlers::tv_state_handler))
        .route("/tv-on", post(handlers::tv_on_handler))
        .route("/tv-off", post(handlers::tv_off_handler))
        .route("/test", get(handlers::probe_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        // outside the rate limiter, so 429s are recorded too
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            access_log_middleware,
        ))
        .layer(cors)
        .with_state(state)
}

// this is main async function with tokio
#[tokio::main]
async fn main() {
    // parse cli arguments (environment variables fill in the rest)
    let args = Args::parse();

    let logger = Arc::new(Logger::new(&args.log_dir));
    let access_log = Arc::new(Logger::to_file(&args.log_dir, "access.log"));

    // spawn the CEC worker - it owns the adapter, one command in flight
    let (cec_tx, cec_rx) = mpsc::channel::<CecJob>(32);
    let runner = CecRunner::new(
        args.cec_client_path.clone(),
        Duration::from_secs(args.cec_timeout_secs),
        logger.clone(),
    );
    tokio::spawn(cec::cec_worker(cec_rx, runner));

    // creating shared state
    let state = Arc::new(AppState {
        cec_tx,
        cec_logical_addr: args.cec_logical_addr.clone(),
        rate_limiter: RateLimiter::new(args.rate_limit, Duration::from_secs(args.rate_window)),
        logger: logger.clone(),
        access_log,
        started_at: Instant::now(),
    });

    // periodically drop expired rate-limit entries
    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(60));
        loop {
            tick.tick().await;
            sweeper.rate_limiter.sweep();
        }
    });

    let app = build_router(state, cors_layer(args.allowed_origins.as_deref()));

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    logger.info(
        "server started",
        Some(json!({
            "port": args.port,
            "url": format!("http://localhost:{}", args.port),
            "cec_client": args.cec_client_path,
        })),
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
