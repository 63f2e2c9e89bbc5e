use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::CecError;

// GET /health response format
#[derive(Deserialize, Serialize, Clone)]
pub struct HealthResponse {
    pub ok: bool,
    pub timestamp: String,
    pub uptime: u64,
    pub memory: MemoryInfo,
}

#[derive(Deserialize, Serialize, Clone)]
pub struct MemoryInfo {
    pub used: u64,  // MB, this process
    pub total: u64, // MB, whole machine
}

// GET /tv-state response format
#[derive(Deserialize, Serialize, Clone)]
pub struct TvStateResponse {
    #[serde(rename = "tvOn")]
    pub tv_on: bool,
}

// GET /test response format
#[derive(Deserialize, Serialize, Clone)]
pub struct ProbeResponse {
    pub output: String,
}

// Generic failure body - the detail stays in the log
#[derive(Deserialize, Serialize, Clone)]
pub struct ErrorResponse {
    pub error: String,
}

// Queued CEC command - holds the command + response channel
pub struct CecJob {
    pub command: String, // e.g. "pow 0"
    pub response_tx: oneshot::Sender<Result<String, CecError>>, // one-time channel to send back the output
}
