//! Log writer module
//!
//! Thread-safe log writing to files or stdout/stderr, with info and warning
//! lines suppressed below the configured level.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Minimum severity written; access lines are always written
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Unknown names fall back to `Info`
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "warn" | "warning" => Self::Warn,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }
}

/// Log output target
enum LogTarget {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

impl LogTarget {
    fn open(path: Option<&str>, fallback: Self) -> io::Result<Self> {
        match path {
            Some(p) => Ok(Self::File(Mutex::new(open_log_file(p)?))),
            None => Ok(fallback),
        }
    }

    fn write_line(&self, message: &str) {
        match self {
            Self::Stdout => println!("{message}"),
            Self::Stderr => eprintln!("{message}"),
            Self::File(file) => {
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{message}");
                }
            }
        }
    }
}

/// Thread-safe log writer
pub struct LogWriter {
    access: LogTarget,
    error: LogTarget,
    level: LogLevel,
}

impl LogWriter {
    fn new(
        access_log_file: Option<&str>,
        error_log_file: Option<&str>,
        level: LogLevel,
    ) -> io::Result<Self> {
        Ok(Self {
            access: LogTarget::open(access_log_file, LogTarget::Stdout)?,
            error: LogTarget::open(error_log_file, LogTarget::Stderr)?,
            level,
        })
    }

    /// Write to access log
    pub fn write_access(&self, message: &str) {
        self.access.write_line(message);
    }

    /// Write to error log
    pub fn write_error(&self, message: &str) {
        self.error.write_line(message);
    }

    /// Write warning message (to error log target)
    pub fn write_warning(&self, message: &str) {
        if self.level <= LogLevel::Warn {
            self.error.write_line(message);
        }
    }

    /// Write info message (to access log target)
    pub fn write_info(&self, message: &str) {
        if self.level == LogLevel::Info {
            self.access.write_line(message);
        }
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the global log writer
///
/// Returns error if log files cannot be opened or the writer is already set.
pub fn init(
    access_log_file: Option<&str>,
    error_log_file: Option<&str>,
    level: LogLevel,
) -> io::Result<()> {
    let writer = LogWriter::new(access_log_file, error_log_file, level)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer, if initialized
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_target_appends_lines() {
        let path = std::env::temp_dir().join(format!("records-api-writer-{}.log", std::process::id()));
        let path_str = path.to_str().unwrap();

        let writer = LogWriter::new(Some(path_str), None, LogLevel::Warn).unwrap();
        writer.write_access("first");
        writer.write_info("suppressed");
        writer.write_access("second");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_error_level_suppresses_warnings() {
        let path = std::env::temp_dir().join(format!("records-api-errors-{}.log", std::process::id()));
        let path_str = path.to_str().unwrap();

        let writer = LogWriter::new(None, Some(path_str), LogLevel::Error).unwrap();
        writer.write_warning("[WARN] dropped");
        writer.write_error("[ERROR] kept");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "[ERROR] kept\n");
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("info"), LogLevel::Info);
        assert_eq!(LogLevel::parse("WARN"), LogLevel::Warn);
        assert_eq!(LogLevel::parse("error"), LogLevel::Error);
        assert_eq!(LogLevel::parse("debug"), LogLevel::Info);
    }

    #[test]
    fn test_open_log_file_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("records-api-logs-{}", std::process::id()));
        let path = dir.join("nested").join("error.log");
        assert!(open_log_file(path.to_str().unwrap()).is_ok());
        assert!(path.exists());
        std::fs::remove_dir_all(dir).unwrap();
    }
}
