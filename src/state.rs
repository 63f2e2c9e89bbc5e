use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};

use crate::error::CecError;
use crate::logger::Logger;
use crate::models::CecJob;
use crate::rate_limit::RateLimiter;

// app's shared state
pub struct AppState {
    pub cec_tx: mpsc::Sender<CecJob>, // queue into the CEC worker
    pub cec_logical_addr: String,     // TV's logical address, usually "0"
    pub rate_limiter: RateLimiter,
    pub logger: Arc<Logger>,     // app.log
    pub access_log: Arc<Logger>, // access.log, written once per request
    pub started_at: Instant,
}

impl AppState {
    // hand a command to the worker and wait for its output
    pub async fn run_cec(&self, command: String) -> Result<String, CecError> {
        let (response_tx, response_rx) = oneshot::channel();

        self.cec_tx
            .send(CecJob {
                command,
                response_tx,
            })
            .await
            .map_err(|_| CecError::WorkerGone)?;

        response_rx.await.map_err(|_| CecError::WorkerGone)?
    }
}
