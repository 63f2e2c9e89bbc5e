use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

// One line in app.log
#[derive(Serialize)]
struct LogEntry<'a> {
    timestamp: String,
    level: &'static str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a Value>,
}

// Writes every event to the console and appends it as one JSON object per
// line to app.log. Logging never fails: if the file sink is broken the
// failure goes to the console and the caller is not bothered.
pub struct Logger {
    file: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(log_dir: &Path) -> Self {
        Self::to_file(log_dir, "app.log")
    }

    // same logger, different file - used for access.log
    pub fn to_file(log_dir: &Path, file_name: &str) -> Self {
        if let Err(e) = fs::create_dir_all(log_dir) {
            eprintln!("[WARN] could not create log dir {}: {}", log_dir.display(), e);
        }

        let path = log_dir.join(file_name);
        let file = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(f) => Some(Mutex::new(f)),
            Err(e) => {
                eprintln!("[WARN] could not open {}: {} - console only", path.display(), e);
                None
            }
        };

        Self { file }
    }

    // console-only logger, used by tests
    pub fn disabled() -> Self {
        Self { file: None }
    }

    pub fn log(&self, level: LogLevel, message: &str, data: Option<Value>) {
        let entry = LogEntry {
            timestamp: Utc::now().to_rfc3339(),
            level: level.as_str(),
            message,
            data: data.as_ref(),
        };

        // console sink
        let tag = level.as_str().to_uppercase();
        let extra = data
            .as_ref()
            .map(|d| format!(" {}", d))
            .unwrap_or_default();
        match level {
            LogLevel::Warn | LogLevel::Error => eprintln!("[{}] {}{}", tag, message, extra),
            _ => println!("[{}] {}{}", tag, message, extra),
        }

        // file sink
        if let Some(file) = &self.file {
            if let Ok(line) = serde_json::to_string(&entry) {
                let mut f = file.lock();
                if let Err(e) = writeln!(f, "{}", line) {
                    eprintln!("[WARN] log file write failed: {}", e);
                }
            }
        }
    }

    pub fn debug(&self, message: &str, data: Option<Value>) {
        self.log(LogLevel::Debug, message, data);
    }

    pub fn info(&self, message: &str, data: Option<Value>) {
        self.log(LogLevel::Info, message, data);
    }

    pub fn warn(&self, message: &str, data: Option<Value>) {
        self.log(LogLevel::Warn, message, data);
    }

    pub fn error(&self, message: &str, data: Option<Value>) {
        self.log(LogLevel::Error, message, data);
    }
}
