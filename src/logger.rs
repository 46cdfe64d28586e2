use std::io::Write;
use std::path::{Path, PathBuf};

use time::OffsetDateTime;

use crate::error::Result;

/// Sink for the human-readable operations log. This is the log that
/// whoever maintains the station reads, as opposed to the `log` crate
/// diagnostics which are only of interest while debugging.
pub trait Logger {
    fn log(&mut self, message: &str);
}

impl Logger for Vec<String> {
    fn log(&mut self, message: &str) {
        self.push(message.to_string());
    }
}

/// Appends timestamped lines to a file, and mirrors each message to stdout.
pub struct FileLogger {
    path: PathBuf,
}

impl FileLogger {
    /// Creates the log file if it doesn't exist yet. Existing logs are
    /// appended to, never truncated.
    pub fn open(path: &Path) -> Result<FileLogger> {
        if path.is_file() {
            println!("Logfile present.");
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(FileLogger {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        // Reopened for every line so that the file can be moved away (or
        // deleted) while we're running.
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }
}

impl Logger for FileLogger {
    fn log(&mut self, message: &str) {
        let line = format_line(now(), message);
        if let Err(e) = self.append(&line) {
            // Losing the log file must not stop data collection.
            log::warn!("failed to append to {}: {e}", self.path.display());
        }
        println!("{message}");
    }
}

fn now() -> OffsetDateTime {
    // now_local() fails if the local offset can't be determined safely (e.g.
    // with multiple threads on some platforms). UTC is better than nothing.
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

pub fn format_line(date_time: OffsetDateTime, message: &str) -> String {
    let format = time::macros::format_description!(
        version = 2,
        "[month]-[day]-[year] [hour]:[minute]:[second]"
    );
    let timestamp = date_time.format(&format).unwrap_or_default();
    format!("{timestamp} - {message}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line() {
        let date_time = time::macros::datetime!(2024-03-05 07:08:09 UTC);
        assert_eq!(
            format_line(date_time, "Unit scanning."),
            "03-05-2024 07:08:09 - Unit scanning."
        );
    }

    #[test]
    fn test_file_logger_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        std::fs::write(&path, "existing line\n").unwrap();

        let mut logger = FileLogger::open(&path).unwrap();
        logger.log("first");
        logger.log("second");

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "existing line");
        assert!(lines[1].ends_with(" - first"), "got {}", lines[1]);
        assert!(lines[2].ends_with(" - second"), "got {}", lines[2]);
        // MM-DD-YYYY HH:MM:SS
        assert_eq!(lines[1].find(" - "), Some(19));
    }

    #[test]
    fn test_file_logger_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let logger = FileLogger::open(&path).unwrap();
        assert!(logger.path().is_file());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_vec_logger() {
        let mut logger: Vec<String> = Vec::new();
        logger.log("a");
        logger.log("b");
        assert_eq!(logger, vec!["a".to_string(), "b".to_string()]);
    }
}
