use crate::domain::models::notification::ActivityEvent;
use crate::domain::repositories::activity_log::ActivityLog;
use anyhow::{Context, Error};
use std::io::Write;
use std::path::PathBuf;

/// Append-only `history.log`.
pub struct FileActivityLog {
    path: PathBuf,
}

impl FileActivityLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ActivityLog for FileActivityLog {
    fn append(&self, event: &ActivityEvent) -> Result<(), Error> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        writeln!(file, "{}", event.format_line())
            .with_context(|| format!("Failed to append to {}", self.path.display()))
    }

    fn tail(&self, count: usize) -> Result<Vec<String>, Error> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()));
            }
        };
        let lines: Vec<&str> = contents.lines().collect();
        Ok(lines[lines.len().saturating_sub(count)..]
            .iter()
            .map(|line| line.trim_end().to_string())
            .collect())
    }
}
