use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// Everything that can go wrong while running a CEC command.
// MissingClientPath / ClientNotFound are configuration errors and are raised
// before anything is spawned; the rest are execution errors.
#[derive(Debug, Error)]
pub enum CecError {
    #[error("CEC_CLIENT_PATH is not configured")]
    MissingClientPath,

    #[error("cec-client not found at {0}")]
    ClientNotFound(PathBuf),

    #[error("cec-client timed out after {0:?}")]
    Timeout(Duration),

    #[error("cec-client exited with code {code:?}: {output}")]
    CommandFailed { code: Option<i32>, output: String },

    #[error("failed to run cec-client: {0}")]
    Io(#[from] std::io::Error),

    #[error("CEC worker is not running")]
    WorkerGone,
}

impl CecError {
    // configuration errors never spawn a process
    pub fn is_configuration(&self) -> bool {
        matches!(self, CecError::MissingClientPath | CecError::ClientNotFound(_))
    }
}
