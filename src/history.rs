use anyhow::Result;
use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct AlertEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl AlertEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
        }
    }

    pub fn to_log_line(&self) -> String {
        format!("[{}] {}\n", self.timestamp.to_rfc3339(), self.message)
    }
}

/// Append-only alert log under the data directory. Every notification the
/// monitor delivers is also written here, one timestamped line per alert.
pub struct AlertLog {
    log_path: PathBuf,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::at(Config::data_dir().join("alerts.log"))
    }

    pub fn at(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    pub fn append(&self, entry: &AlertEntry) -> Result<()> {
        if let Some(parent) = self.log_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        write!(file, "{}", entry.to_log_line())?;
        Ok(())
    }

    /// Most recent entries first when a limit is given, oldest first otherwise.
    pub fn read(&self, limit: Option<usize>) -> Result<Vec<AlertEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.log_path)?;
        let entries: Vec<AlertEntry> = content.lines().filter_map(Self::parse_line).collect();

        let result = if let Some(n) = limit {
            entries.into_iter().rev().take(n).collect()
        } else {
            entries
        };

        Ok(result)
    }

    fn parse_line(line: &str) -> Option<AlertEntry> {
        let rest = line.strip_prefix('[')?;
        let (stamp, message) = rest.split_once("] ")?;
        let timestamp = DateTime::parse_from_rfc3339(stamp)
            .ok()?
            .with_timezone(&Utc);

        Some(AlertEntry {
            timestamp,
            message: message.to_string(),
        })
    }

}

impl Default for AlertLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let log = AlertLog::at(dir.path().join("alerts.log"));

        log.append(&AlertEntry::new("WSI scanning has started.")).unwrap();
        log.append(&AlertEntry::new("Slide Saved: S1.svs")).unwrap();

        let entries = log.read(None).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "WSI scanning has started.");
        assert_eq!(entries[1].message, "Slide Saved: S1.svs");
    }

    #[test]
    fn limit_returns_most_recent_first() {
        let dir = tempfile::tempdir().unwrap();
        let log = AlertLog::at(dir.path().join("alerts.log"));

        for i in 0..5 {
            log.append(&AlertEntry::new(format!("alert {}", i))).unwrap();
        }

        let entries = log.read(Some(2)).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "alert 4");
        assert_eq!(entries[1].message, "alert 3");
    }

    #[test]
    fn missing_log_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = AlertLog::at(dir.path().join("alerts.log"));
        assert!(log.read(Some(10)).unwrap().is_empty());
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alerts.log");
        fs::write(&path, "garbage\n[2025-06-01T12:00:00+00:00] ok\n").unwrap();

        let log = AlertLog::at(path);
        let entries = log.read(None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "ok");
    }
}
