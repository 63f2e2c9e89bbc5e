use clap::Parser;
use std::path::PathBuf;

// CLI argument structure
// Every option can also come from the environment, which is how the gateway
// is configured when it runs under a process manager.
#[derive(Parser, Debug, Clone)]
#[command(name = "cec-gateway")]
#[command(about = "Local HTTP bridge for controlling a TV over HDMI-CEC")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8765)]
    pub port: u16,

    // Allowed CORS origins (comma-separated)
    // Unset mirrors whatever origin the request carries
    #[arg(long, env = "ALLOWED_ORIGINS")]
    pub allowed_origins: Option<String>,

    // Path to the cec-client binary
    // CEC endpoints report a configuration error while this is unset
    #[arg(long, env = "CEC_CLIENT_PATH")]
    pub cec_client_path: Option<PathBuf>,

    // CEC logical address of the TV
    #[arg(long, env = "CEC_LOGICAL_ADDR", default_value = "0")]
    pub cec_logical_addr: String,

    // Directory holding the append-only app.log
    #[arg(long, env = "LOG_DIR", default_value = "log")]
    pub log_dir: PathBuf,

    // Timeout for a single cec-client invocation, in seconds
    #[arg(long, env = "CEC_TIMEOUT_SECS", default_value_t = 10)]
    pub cec_timeout_secs: u64,

    // Rate limit max requests per window
    #[arg(long, default_value_t = 100)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, default_value_t = 60)]
    pub rate_window: u64,
}
