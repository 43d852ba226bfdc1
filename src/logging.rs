use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

pub const LOG_FILE_NAME: &str = "bushy.log";

/// Append-only session log, one `timestamp [LEVEL] text` entry per line.
pub struct Logger {
    path: PathBuf,
    file: File,
}

impl Logger {
    /// `~/.bushy/logs/bushy.log`
    pub fn for_user() -> Result<Self> {
        let home = dirs::home_dir().context("no home directory for ~/.bushy/logs")?;
        Self::open(log_path_in(&home))
    }

    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log dir: {}", dir.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open log file: {}", path.display()))?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Multi-line messages (git output) get one timestamped entry per line.
    pub fn log(&self, level: &str, message: &str) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let entry: String = message
            .lines()
            .map(|line| format!("{timestamp} [{level}] {line}\n"))
            .collect();
        (&self.file)
            .write_all(entry.as_bytes())
            .with_context(|| format!("failed to write log file: {}", self.path.display()))
    }
}

pub fn log_path_in(home: &Path) -> PathBuf {
    crate::config::bushy_dir_in(home)
        .join("logs")
        .join(LOG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn open_creates_the_logs_directory() {
        let home = tempdir().unwrap();
        let path = log_path_in(home.path());

        let logger = Logger::open(path.clone()).unwrap();

        assert_eq!(logger.path(), home.path().join(".bushy/logs/bushy.log"));
        assert!(path.exists());
    }

    #[test]
    fn log_splits_git_output_into_entries() {
        let dir = tempdir().unwrap();
        let logger = Logger::open(dir.path().join(LOG_FILE_NAME)).unwrap();

        logger.log("INFO", "Story: Add login").unwrap();
        logger.log("DEBUG", "git branch\n* master").unwrap();
        logger.log("DEBUG", "").unwrap();

        let content = std::fs::read_to_string(logger.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("[INFO] Story: Add login"));
        assert!(lines[1].ends_with("[DEBUG] git branch"));
        assert!(lines[2].ends_with("[DEBUG] * master"));
    }

    #[test]
    fn reopening_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOG_FILE_NAME);

        Logger::open(path.clone()).unwrap().log("INFO", "first").unwrap();
        Logger::open(path.clone()).unwrap().log("INFO", "second").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("first") && content.contains("second"));
    }

    #[test]
    fn open_fails_when_parent_is_a_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("logs");
        std::fs::write(&blocker, "").unwrap();

        let err = Logger::open(blocker.join(LOG_FILE_NAME)).err().unwrap();
        assert!(err.to_string().contains("failed to create log dir"));
    }
}
