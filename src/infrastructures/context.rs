use crate::application::use_cases::manage_daemon::ManageDaemonInteractor;
use crate::application::use_cases::poll_workflow_runs::{PollStores, PollWorkflowRunsInteractor};
use crate::domain::errors::MonitorError;
use crate::domain::repositories::ledger::{NotificationLedger, ledger_retention};
use crate::infrastructures::adapters::secondary::external_apis::github::GhCliRunSource;
use crate::infrastructures::adapters::secondary::external_apis::speech::CommandSpeechNotifier;
use crate::infrastructures::adapters::secondary::persistence::activity_log::FileActivityLog;
use crate::infrastructures::adapters::secondary::persistence::config::JsonConfigStore;
use crate::infrastructures::adapters::secondary::persistence::daemon_marker::PidFileMarker;
use crate::infrastructures::adapters::secondary::persistence::ledger::SqliteNotificationLedger;
use crate::infrastructures::adapters::secondary::persistence::watch_list::FileWatchList;
use crate::infrastructures::adapters::secondary::process::os_process::OsProcessControl;
use crate::infrastructures::paths::MonitorPaths;
use anyhow::{Context, Error};
use std::sync::Arc;

pub type PollInteractor = PollWorkflowRunsInteractor<GhCliRunSource, CommandSpeechNotifier>;
pub type DaemonManager = ManageDaemonInteractor<OsProcessControl>;

/// Every adapter, wired once at process entry.
pub struct AppContext {
    pub watch_list: Arc<FileWatchList>,
    pub config: Arc<JsonConfigStore>,
    pub ledger: Arc<SqliteNotificationLedger>,
    pub activity_log: Arc<FileActivityLog>,
    pub marker: Arc<PidFileMarker>,
    pub run_source: Arc<GhCliRunSource>,
    pub speech: Arc<CommandSpeechNotifier>,
    pub processes: Arc<OsProcessControl>,
}

impl AppContext {
    /// Creates the state directory, opens the ledger and drops expired entries.
    pub fn build(paths: &MonitorPaths) -> Result<Self, Error> {
        paths
            .ensure_dirs()
            .with_context(|| format!("Failed to create {}", paths.root().display()))?;

        let ledger = SqliteNotificationLedger::open(&paths.ledger_file).map_err(MonitorError::from)?;
        let purged = ledger
            .purge_older_than(ledger_retention())
            .map_err(MonitorError::from)?;
        if purged > 0 {
            tracing::debug!("Dropped {purged} expired ledger entries");
        }

        Ok(Self {
            watch_list: Arc::new(FileWatchList::new(paths.repos_file.clone())),
            config: Arc::new(JsonConfigStore::new(paths.config_file.clone())),
            ledger: Arc::new(ledger),
            activity_log: Arc::new(FileActivityLog::new(paths.history_file.clone())),
            marker: Arc::new(PidFileMarker::new(paths.pid_file.clone())),
            run_source: Arc::new(GhCliRunSource::new()),
            speech: Arc::new(CommandSpeechNotifier::new()),
            processes: Arc::new(OsProcessControl::new(
                paths.root.clone(),
                paths.daemon_log.clone(),
            )),
        })
    }

    pub fn poll_interactor(&self) -> PollInteractor {
        PollWorkflowRunsInteractor::new(
            self.run_source.clone(),
            self.speech.clone(),
            PollStores {
                watch_list: self.watch_list.clone(),
                config: self.config.clone(),
                ledger: self.ledger.clone(),
                activity_log: self.activity_log.clone(),
            },
        )
    }

    pub fn daemon_manager(&self) -> DaemonManager {
        ManageDaemonInteractor::new(self.marker.clone(), self.processes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::notification::LedgerEntry;
    use chrono::{TimeDelta, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_build_purges_expired_ledger_entries() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MonitorPaths::for_root(temp_dir.path().join("home"));
        {
            let ledger = SqliteNotificationLedger::open(&paths.ledger_file).unwrap();
            for (run_id, age) in [("old", 8), ("new", 1)] {
                ledger
                    .record(&LedgerEntry {
                        run_id: run_id.to_string(),
                        repo: "acme/widgets".to_string(),
                        workflow_name: "CI".to_string(),
                        conclusion: "success".to_string(),
                        notified_at: Utc::now() - TimeDelta::days(age),
                    })
                    .unwrap();
            }
        }

        let context = AppContext::build(&paths).unwrap();

        assert!(!context.ledger.has("old").unwrap());
        assert!(context.ledger.has("new").unwrap());
    }

    #[test]
    fn test_corrupt_ledger_is_a_monitor_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MonitorPaths::for_root(temp_dir.path());
        std::fs::write(&paths.ledger_file, vec![b'x'; 4096]).unwrap();

        let Err(err) = AppContext::build(&paths) else {
            panic!("corrupt ledger opened");
        };
        assert!(matches!(
            err.downcast_ref::<MonitorError>(),
            Some(MonitorError::Ledger(_))
        ));
    }
}
