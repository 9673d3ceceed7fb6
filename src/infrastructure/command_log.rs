use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const COMMAND_LOG_FILE: &str = "commands.log";

/// Append-only JSON-lines journal of dashboard command outcomes.
///
/// Every record is also forwarded to the `log` facade. Write failures are
/// swallowed: the journal never fails a command.
#[derive(Debug)]
pub struct CommandLog {
    path: PathBuf,
    log_guard: Mutex<()>,
}

impl CommandLog {
    pub fn new(logs_dir: &Path) -> Self {
        Self {
            path: logs_dir.join(COMMAND_LOG_FILE),
            log_guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log_info(&self, command: &str, message: &str) {
        log::info!("{command}: {message}");
        self.append_log("info", command, message);
    }

    pub fn log_error(&self, command: &str, message: &str) {
        log::error!("{command}: {message}");
        self.append_log("error", command, message);
    }

    fn append_log(&self, level: &str, command: &str, message: &str) {
        let Ok(_guard) = self.log_guard.lock() else {
            return;
        };
        let payload = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "level": level,
            "command": command,
            "message": message,
        });

        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(file, "{}", payload);
        }
    }
}
