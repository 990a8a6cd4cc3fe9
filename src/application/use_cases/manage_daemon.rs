use crate::domain::errors::MonitorError;
use crate::domain::external_apis::process::{Launch, ProcessControl};
use crate::domain::repositories::daemon_marker::{DaemonMarker, MarkerState};
use anyhow::{Context, Error};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    Stopped,
    Running { pid: u32 },
}

/// Preconditions checked before a daemon is launched.
#[derive(Debug, Clone, Copy)]
pub struct StartRequest {
    pub watched_repos: usize,
    pub run_source_tool: &'static str,
    pub run_source_available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Launched { pid: u32 },
    /// No detach primitive; the caller runs the poll loop in this process.
    RunInForeground,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped { pid: u32 },
    NotRunning,
}

/// Single-instance start/stop/status on top of the pid marker.
pub struct ManageDaemonInteractor<P: ProcessControl + 'static> {
    marker: Arc<dyn DaemonMarker>,
    processes: Arc<P>,
}

impl<P: ProcessControl + 'static> ManageDaemonInteractor<P> {
    pub fn new(marker: Arc<dyn DaemonMarker>, processes: Arc<P>) -> Self {
        Self { marker, processes }
    }

    /// Current state. A marker naming a dead process, or holding garbage, is
    /// deleted on the way.
    pub fn state(&self) -> DaemonState {
        match self.marker.read() {
            MarkerState::Absent => DaemonState::Stopped,
            MarkerState::Pid(pid) if self.processes.is_alive(pid) => DaemonState::Running { pid },
            MarkerState::Pid(pid) => {
                tracing::info!("Removing stale PID file (PID {pid} is not running)");
                self.clear_marker();
                DaemonState::Stopped
            }
            MarkerState::Unreadable => {
                tracing::info!("Removing unreadable PID file");
                self.clear_marker();
                DaemonState::Stopped
            }
        }
    }

    pub fn start(&self, request: StartRequest) -> Result<StartOutcome, Error> {
        if let DaemonState::Running { pid } = self.state() {
            return Err(MonitorError::AlreadyRunning { pid }.into());
        }
        if request.watched_repos == 0 {
            return Err(MonitorError::NoRepositories.into());
        }
        if !request.run_source_available {
            return Err(MonitorError::SourceUnavailable {
                tool: request.run_source_tool,
            }
            .into());
        }

        match self.processes.launch_daemon()? {
            Launch::Detached { pid } => {
                self.marker
                    .write(pid)
                    .context("Failed to write daemon PID file")?;
                tracing::info!("Launched daemon (PID {pid})");
                Ok(StartOutcome::Launched { pid })
            }
            Launch::Foreground => {
                self.marker
                    .write(self.processes.current_pid())
                    .context("Failed to write daemon PID file")?;
                Ok(StartOutcome::RunInForeground)
            }
        }
    }

    /// Called by the daemon process itself before entering the loop. The
    /// marker is released when the returned claim is dropped, unwinding included.
    pub fn claim(&self) -> Result<DaemonClaim<'_, P>, Error> {
        let own = self.processes.current_pid();
        if let DaemonState::Running { pid } = self.state() {
            if pid != own {
                return Err(MonitorError::AlreadyRunning { pid }.into());
            }
        }
        self.marker
            .write(own)
            .context("Failed to write daemon PID file")?;
        Ok(DaemonClaim {
            manager: self,
            pid: own,
        })
    }

    /// Removes the marker if it still names this process.
    pub fn release(&self) {
        let own = self.processes.current_pid();
        if self.marker.read() == MarkerState::Pid(own) {
            self.clear_marker();
            tracing::info!("PID file removed");
        }
    }

    pub async fn stop(&self) -> Result<StopOutcome, Error> {
        let DaemonState::Running { pid } = self.state() else {
            return Ok(StopOutcome::NotRunning);
        };
        if let Err(e) = self.processes.terminate(pid).await {
            if self.processes.is_alive(pid) {
                return Err(e.context(format!("Failed to stop daemon (PID {pid})")));
            }
            tracing::info!("Removing stale PID file (PID {pid} exited before it could be stopped)");
            self.clear_marker();
            return Ok(StopOutcome::NotRunning);
        }
        self.clear_marker();
        Ok(StopOutcome::Stopped { pid })
    }

    fn clear_marker(&self) {
        if let Err(e) = self.marker.remove() {
            tracing::warn!("Failed to remove PID file: {e:#}");
        }
    }
}

/// The daemon's hold on the marker.
pub struct DaemonClaim<'a, P: ProcessControl + 'static> {
    manager: &'a ManageDaemonInteractor<P>,
    pid: u32,
}

impl<P: ProcessControl + 'static> DaemonClaim<'_, P> {
    pub fn pid(&self) -> u32 {
        self.pid
    }
}

impl<P: ProcessControl + 'static> Drop for DaemonClaim<'_, P> {
    fn drop(&mut self) {
        self.manager.release();
    }
}
