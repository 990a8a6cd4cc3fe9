//! In-memory fakes for the domain ports, shared by unit tests.

use crate::domain::errors::{ConfigError, LedgerError};
use crate::domain::external_apis::github::RunSource;
use crate::domain::external_apis::process::{Launch, ProcessControl};
use crate::domain::external_apis::speech::SpeechNotifier;
use crate::domain::models::config::{MonitorConfig, SpeechCommand};
use crate::domain::models::notification::{ActivityEvent, LedgerEntry};
use crate::domain::models::repo::WatchedRepo;
use crate::domain::models::run::RunRecord;
use crate::domain::repositories::activity_log::ActivityLog;
use crate::domain::repositories::config::ConfigStore;
use crate::domain::repositories::daemon_marker::{DaemonMarker, MarkerState};
use crate::domain::repositories::ledger::NotificationLedger;
use crate::domain::repositories::watch_list::{AddOutcome, RemoveOutcome, WatchList};
use anyhow::{Error, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeRunSource {
    runs: Mutex<HashMap<String, Result<Option<RunRecord>, String>>>,
    pub available: bool,
}

impl FakeRunSource {
    pub fn set(&self, repo: &str, answer: Result<Option<RunRecord>, String>) {
        self.runs.lock().unwrap().insert(repo.to_string(), answer);
    }
}

#[async_trait]
impl RunSource for FakeRunSource {
    fn tool_name(&self) -> &'static str {
        "gh"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn latest_run(&self, repo: &WatchedRepo) -> Result<Option<RunRecord>, Error> {
        match self.runs.lock().unwrap().get(repo.as_str()) {
            Some(Ok(run)) => Ok(run.clone()),
            Some(Err(message)) => Err(anyhow!(message.clone())),
            None => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct RecordingSpeech {
    messages: Mutex<Vec<String>>,
    failure: Mutex<Option<String>>,
}

impl RecordingSpeech {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }
}

#[async_trait]
impl SpeechNotifier for RecordingSpeech {
    async fn speak(
        &self,
        message: &str,
        _command_override: Option<&SpeechCommand>,
    ) -> Result<bool, Error> {
        if let Some(failure) = self.failure.lock().unwrap().clone() {
            return Err(anyhow!(failure));
        }
        self.messages.lock().unwrap().push(message.to_string());
        Ok(true)
    }
}

#[derive(Default)]
pub struct MemoryLedger {
    entries: Mutex<HashMap<String, LedgerEntry>>,
    records: Mutex<usize>,
}

impl MemoryLedger {
    pub fn record_count(&self) -> usize {
        *self.records.lock().unwrap()
    }
}

impl NotificationLedger for MemoryLedger {
    fn has(&self, run_id: &str) -> Result<bool, LedgerError> {
        Ok(self.entries.lock().unwrap().contains_key(run_id))
    }

    fn record(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        *self.records.lock().unwrap() += 1;
        self.entries
            .lock()
            .unwrap()
            .insert(entry.run_id.clone(), entry.clone());
        Ok(())
    }

    fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<usize, LedgerError> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, entry| entry.notified_at >= cutoff);
        Ok(before - entries.len())
    }
}

pub struct FailingLedger;

impl NotificationLedger for FailingLedger {
    fn has(&self, _run_id: &str) -> Result<bool, LedgerError> {
        Err(LedgerError::Poisoned)
    }

    fn record(&self, _entry: &LedgerEntry) -> Result<(), LedgerError> {
        Err(LedgerError::Poisoned)
    }

    fn purge_before(&self, _cutoff: DateTime<Utc>) -> Result<usize, LedgerError> {
        Err(LedgerError::Poisoned)
    }
}

#[derive(Default)]
pub struct MemoryActivityLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryActivityLog {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl ActivityLog for MemoryActivityLog {
    fn append(&self, event: &ActivityEvent) -> Result<(), Error> {
        self.lines.lock().unwrap().push(event.format_line());
        Ok(())
    }

    fn tail(&self, count: usize) -> Result<Vec<String>, Error> {
        let lines = self.lines.lock().unwrap();
        Ok(lines[lines.len().saturating_sub(count)..].to_vec())
    }
}

#[derive(Default)]
pub struct MemoryWatchList {
    repos: Mutex<Vec<WatchedRepo>>,
}

impl MemoryWatchList {
    pub fn with(repos: &[&str]) -> Self {
        Self {
            repos: Mutex::new(
                repos
                    .iter()
                    .map(|repo| WatchedRepo::parse(repo).unwrap())
                    .collect(),
            ),
        }
    }
}

impl WatchList for MemoryWatchList {
    fn load(&self) -> Result<Vec<WatchedRepo>, Error> {
        Ok(self.repos.lock().unwrap().clone())
    }

    fn add(&self, repo: &WatchedRepo) -> Result<AddOutcome, Error> {
        let mut repos = self.repos.lock().unwrap();
        if repos.contains(repo) {
            return Ok(AddOutcome::AlreadyWatched);
        }
        repos.push(repo.clone());
        Ok(AddOutcome::Added)
    }

    fn remove(&self, repo: &WatchedRepo) -> Result<RemoveOutcome, Error> {
        let mut repos = self.repos.lock().unwrap();
        let before = repos.len();
        repos.retain(|watched| watched != repo);
        if repos.len() == before {
            Ok(RemoveOutcome::NotWatched)
        } else {
            Ok(RemoveOutcome::Removed)
        }
    }
}

#[derive(Default)]
pub struct MemoryConfigStore {
    config: Mutex<MonitorConfig>,
}

impl MemoryConfigStore {
    pub fn with(config: MonitorConfig) -> Self {
        Self {
            config: Mutex::new(config),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<MonitorConfig, ConfigError> {
        Ok(self.config.lock().unwrap().clone())
    }

    fn save(&self, config: &MonitorConfig) -> Result<(), ConfigError> {
        *self.config.lock().unwrap() = config.clone();
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryMarker {
    state: Mutex<Option<MarkerState>>,
}

impl MemoryMarker {
    pub fn holding(state: MarkerState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }
}

impl DaemonMarker for MemoryMarker {
    fn read(&self) -> MarkerState {
        self.state.lock().unwrap().unwrap_or(MarkerState::Absent)
    }

    fn write(&self, pid: u32) -> Result<(), Error> {
        *self.state.lock().unwrap() = Some(MarkerState::Pid(pid));
        Ok(())
    }

    fn remove(&self) -> Result<(), Error> {
        *self.state.lock().unwrap() = None;
        Ok(())
    }
}

/// Process table where only the listed pids are alive.
pub struct FakeProcesses {
    pub own_pid: u32,
    pub alive: Mutex<HashSet<u32>>,
    pub terminated: Mutex<Vec<u32>>,
    pub launch: Launch,
    /// When set, `terminate` fails; the flag says whether the pid survives.
    terminate_failure: Mutex<Option<bool>>,
}

impl FakeProcesses {
    pub fn new(own_pid: u32, alive: &[u32], launch: Launch) -> Self {
        Self {
            own_pid,
            alive: Mutex::new(alive.iter().copied().collect()),
            terminated: Mutex::new(Vec::new()),
            launch,
            terminate_failure: Mutex::new(None),
        }
    }

    pub fn fail_terminate(&self, still_alive: bool) {
        *self.terminate_failure.lock().unwrap() = Some(still_alive);
    }
}

#[async_trait]
impl ProcessControl for FakeProcesses {
    fn current_pid(&self) -> u32 {
        self.own_pid
    }

    fn is_alive(&self, pid: u32) -> bool {
        self.alive.lock().unwrap().contains(&pid)
    }

    async fn terminate(&self, pid: u32) -> Result<(), Error> {
        let failure = *self.terminate_failure.lock().unwrap();
        if let Some(still_alive) = failure {
            if !still_alive {
                self.alive.lock().unwrap().remove(&pid);
            }
            return Err(anyhow!("taskkill exited with exit code: 128"));
        }
        self.alive.lock().unwrap().remove(&pid);
        self.terminated.lock().unwrap().push(pid);
        Ok(())
    }

    fn launch_daemon(&self) -> Result<Launch, Error> {
        if let Launch::Detached { pid } = self.launch {
            self.alive.lock().unwrap().insert(pid);
        }
        Ok(self.launch)
    }
}
