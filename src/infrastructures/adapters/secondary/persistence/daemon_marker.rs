use crate::domain::repositories::daemon_marker::{DaemonMarker, MarkerState};
use anyhow::{Context, Error};
use std::path::PathBuf;

/// `daemon.pid` holding the decimal process id of the running daemon.
pub struct PidFileMarker {
    path: PathBuf,
}

impl PidFileMarker {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl DaemonMarker for PidFileMarker {
    fn read(&self) -> MarkerState {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|pid| *pid > 0)
                .map_or(MarkerState::Unreadable, MarkerState::Pid),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => MarkerState::Absent,
            Err(e) => {
                tracing::debug!("Cannot read {}: {e}", self.path.display());
                MarkerState::Unreadable
            }
        }
    }

    fn write(&self, pid: u32) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&self.path, pid.to_string())
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    fn remove(&self) -> Result<(), Error> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", self.path.display())),
        }
    }
}
