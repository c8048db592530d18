//! Accumulated textual scan results and saving them to disk

use chrono::{DateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};

use crate::error::{Result, SniperError};
use crate::types::NameCheck;

/// Lines emitted by a scan or by single-name checks, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultLog {
    lines: Vec<String>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn push_check(&mut self, check: &NameCheck) {
        self.lines.push(check.line());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// All lines joined by newlines
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// File name for a snapshot taken at `at`, e.g. `2024-05-01T10-20-30-123Z_Output.txt`
    pub fn file_name(at: DateTime<Utc>) -> String {
        let stamp = at
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .replace([':', '.'], "-");
        format!("{}_Output.txt", stamp)
    }

    /// Write the log into `dir` under a timestamped name
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        self.save_at(dir, Utc::now())
    }

    /// Write the log into `dir` using the timestamp `at`
    pub fn save_at(&self, dir: &Path, at: DateTime<Utc>) -> Result<PathBuf> {
        let content = self.text();
        if content.trim().is_empty() {
            return Err(SniperError::validation("Output is empty. Nothing to save."));
        }

        std::fs::create_dir_all(dir).map_err(|e| {
            SniperError::io(e.to_string(), Some(dir.to_string_lossy().to_string()))
        })?;

        let path = dir.join(Self::file_name(at));
        std::fs::write(&path, content).map_err(|e| {
            SniperError::io(e.to_string(), Some(path.to_string_lossy().to_string()))
        })?;

        tracing::info!(path = %path.display(), lines = %self.lines.len(), "Saved scan output");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_name() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap()
            + chrono::Duration::milliseconds(123);
        assert_eq!(ResultLog::file_name(at), "2024-05-01T10-20-30-123Z_Output.txt");
    }

    #[test]
    fn test_empty_log_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultLog::new();
        let err = log.save(dir.path()).unwrap_err();
        assert!(matches!(err, SniperError::Validation { .. }));

        let mut blank = ResultLog::new();
        blank.push("   ");
        assert!(blank.save(dir.path()).is_err());
    }

    #[test]
    fn test_save_writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = ResultLog::new();
        log.push_check(&NameCheck::available("abc"));
        log.push("Notch is claimed - 069a79f4");

        let path = log.save(&dir.path().join("out")).unwrap();
        assert!(path.to_string_lossy().ends_with("_Output.txt"));
        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(written, "abc is available\nNotch is claimed - 069a79f4");
    }
}
