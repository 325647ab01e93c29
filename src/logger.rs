// stdout belongs to the game screen, so log lines go to an append-only file.
// Without a file (or before init) logging is a no-op.
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use chrono::Local;

use crate::error::Result;

static LOGGER: OnceLock<Logger> = OnceLock::new();

pub struct Logger {
    prefix: Option<String>,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl Logger {
    fn new(prefix: Option<String>, sink: Box<dyn Write + Send>) -> Self {
        Self {
            prefix,
            sink: Mutex::new(sink),
        }
    }

    fn format_line(&self, message: &str) -> String {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        if let Some(ref prefix) = self.prefix {
            format!("[{}][{}] {}", timestamp, prefix, message)
        } else {
            format!("[{}] {}", timestamp, message)
        }
    }

    pub fn log(&self, message: &str) {
        let line = self.format_line(message);
        if let Ok(mut sink) = self.sink.lock() {
            // a failing log write must never take the game down
            let _ = writeln!(sink, "{}", line);
            let _ = sink.flush();
        }
    }
}

pub fn init_logger(prefix: Option<String>, log_file: Option<&Path>) -> Result<()> {
    let sink: Box<dyn Write + Send> = match log_file {
        Some(path) => Box::new(OpenOptions::new().create(true).append(true).open(path)?),
        None => Box::new(std::io::sink()),
    };
    LOGGER.get_or_init(|| Logger::new(prefix, sink));
    Ok(())
}

pub fn log(message: &str) {
    if let Some(logger) = LOGGER.get() {
        logger.log(message);
    }
}

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {
        $crate::logger::log(&format!($($arg)*))
    };
}
