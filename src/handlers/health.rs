use axum::Json;
use axum::extract::State;
use lazy_static::lazy_static;
use parking_lot::Mutex;
use std::sync::Arc;
use sysinfo::{ProcessesToUpdate, System};

use crate::models::{HealthResponse, MemoryInfo};
use crate::state::AppState;

lazy_static! {
    static ref SYSTEM: Mutex<System> = Mutex::new(System::new());
}

fn memory_info() -> MemoryInfo {
    let mut sys = SYSTEM.lock();
    sys.refresh_memory();
    let total = sys.total_memory() / 1024 / 1024;

    let used = match sysinfo::get_current_pid() {
        Ok(pid) => {
            sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
            sys.process(pid).map(|p| p.memory() / 1024 / 1024).unwrap_or(0)
        }
        Err(_) => 0,
    };

    MemoryInfo { used, total }
}

// health handler - never touches the CEC adapter
// TODO: probe the adapter for real once cec-client grows a cheap query
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime: state.started_at.elapsed().as_secs(),
        memory: memory_info(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_figures_are_sane() {
        let info = memory_info();
        assert!(info.total > 0);
        assert!(info.used <= info.total);
    }
}
