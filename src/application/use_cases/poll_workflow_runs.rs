use crate::domain::errors::LedgerError;
use crate::domain::external_apis::github::RunSource;
use crate::domain::external_apis::speech::SpeechNotifier;
use crate::domain::models::config::MonitorConfig;
use crate::domain::models::notification::{
    ActivityEvent, LedgerEntry, announcement, should_speak,
};
use crate::domain::models::repo::WatchedRepo;
use crate::domain::models::run::{Conclusion, RunRecord, RunStatus};
use crate::domain::repositories::activity_log::ActivityLog;
use crate::domain::repositories::config::ConfigStore;
use crate::domain::repositories::ledger::NotificationLedger;
use crate::domain::repositories::watch_list::WatchList;
use anyhow::{Context, Error};
use async_stream::try_stream;
use chrono::{Local, Utc};
use futures_util::Stream;
use std::sync::Arc;
use std::time::Duration;

/// Storage the poll cycle reads from and writes to.
#[derive(Clone)]
pub struct PollStores {
    pub watch_list: Arc<dyn WatchList>,
    pub config: Arc<dyn ConfigStore>,
    pub ledger: Arc<dyn NotificationLedger>,
    pub activity_log: Arc<dyn ActivityLog>,
}

#[derive(Debug, Clone)]
pub struct PollWorkflowRunsUseCaseInput {
    /// Sleep between the end of one cycle and the start of the next.
    pub interval: Duration,
}

/// A run announced during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub repo: WatchedRepo,
    pub run_id: String,
    pub workflow_name: String,
    pub conclusion: Conclusion,
    pub spoken: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOutcome {
    /// The run source timed out or failed; retried next cycle.
    Unavailable,
    NoRuns,
    InProgress { run_id: String, status: String },
    AlreadyNotified { run_id: String },
    Notified(Notification),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollWorkflowRunsUseCaseOutput {
    pub outcomes: Vec<(WatchedRepo, RepoOutcome)>,
}

impl PollWorkflowRunsUseCaseOutput {
    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.outcomes.iter().filter_map(|(_, outcome)| match outcome {
            RepoOutcome::Notified(notification) => Some(notification),
            _ => None,
        })
    }

    pub fn unavailable_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, RepoOutcome::Unavailable))
            .count()
    }
}

pub trait PollWorkflowRunsUseCase {
    fn execute(
        &self,
        input: PollWorkflowRunsUseCaseInput,
    ) -> impl Stream<Item = Result<PollWorkflowRunsUseCaseOutput, Error>> + Send;
}

pub struct PollWorkflowRunsInteractor<S: RunSource + 'static, N: SpeechNotifier + 'static> {
    run_source: Arc<S>,
    speech: Arc<N>,
    stores: PollStores,
}

impl<S: RunSource + 'static, N: SpeechNotifier + 'static> Clone for PollWorkflowRunsInteractor<S, N> {
    fn clone(&self) -> Self {
        Self {
            run_source: self.run_source.clone(),
            speech: self.speech.clone(),
            stores: self.stores.clone(),
        }
    }
}

impl<S: RunSource + 'static, N: SpeechNotifier + 'static> PollWorkflowRunsInteractor<S, N> {
    pub fn new(run_source: Arc<S>, speech: Arc<N>, stores: PollStores) -> Self {
        Self {
            run_source,
            speech,
            stores,
        }
    }

    /// Polls every watched repository once.
    ///
    /// Only a ledger failure aborts the cycle; everything else is logged and
    /// the affected repository is retried on the next cycle.
    #[tracing::instrument(name = "poll_cycle", skip(self))]
    pub async fn run_cycle(&self) -> Result<PollWorkflowRunsUseCaseOutput, LedgerError> {
        let config = self.stores.config.load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {e}");
            MonitorConfig::default()
        });
        let repos = self.stores.watch_list.load().unwrap_or_else(|e| {
            tracing::warn!("Failed to read watch list, skipping cycle: {e:#}");
            Vec::new()
        });

        let mut output = PollWorkflowRunsUseCaseOutput::default();
        for repo in repos {
            let outcome = self.poll_repo(&repo, &config).await?;
            output.outcomes.push((repo, outcome));
        }
        Ok(output)
    }

    async fn poll_repo(
        &self,
        repo: &WatchedRepo,
        config: &MonitorConfig,
    ) -> Result<RepoOutcome, LedgerError> {
        let run = match self.run_source.latest_run(repo).await {
            Ok(Some(run)) => run,
            Ok(None) => {
                tracing::debug!("No runs reported for {repo}");
                return Ok(RepoOutcome::NoRuns);
            }
            Err(e) => {
                tracing::warn!("Error checking {repo}: {e:#}");
                return Ok(RepoOutcome::Unavailable);
            }
        };

        if let RunStatus::Pending(status) = &run.status {
            tracing::debug!("Run {} of {repo} is {status}", run.run_id);
            return Ok(RepoOutcome::InProgress {
                run_id: run.run_id,
                status: status.clone(),
            });
        }

        if self.stores.ledger.has(&run.run_id)? {
            return Ok(RepoOutcome::AlreadyNotified { run_id: run.run_id });
        }

        let notification = self.announce(repo, run, config).await?;
        Ok(RepoOutcome::Notified(notification))
    }

    /// Log, speak, then record. The ledger write comes last so that a crash
    /// in between repeats the announcement instead of losing it.
    async fn announce(
        &self,
        repo: &WatchedRepo,
        run: RunRecord,
        config: &MonitorConfig,
    ) -> Result<Notification, LedgerError> {
        let event = ActivityEvent {
            at: Local::now(),
            repo: repo.clone(),
            workflow_name: run.workflow_name.clone(),
            conclusion: run.conclusion.clone(),
        };
        if let Err(e) = self.stores.activity_log.append(&event) {
            tracing::warn!("Failed to append to activity log: {e:#}");
        }

        let mut spoken = false;
        if config.speech_enabled && should_speak(&run.conclusion, config) {
            let message = announcement(repo, &run);
            match self
                .speech
                .speak(&message, config.speech_command.as_ref())
                .await
            {
                Ok(played) => spoken = played,
                Err(e) => tracing::warn!("Speech error for '{message}': {e:#}"),
            }
        }

        self.stores.ledger.record(&LedgerEntry {
            run_id: run.run_id.clone(),
            repo: repo.to_string(),
            workflow_name: run.workflow_name.clone(),
            conclusion: run.conclusion.to_string(),
            notified_at: Utc::now(),
        })?;

        tracing::info!(
            "{} {repo} - {}: {}",
            run.conclusion.icon(),
            run.workflow_name,
            run.conclusion
        );

        Ok(Notification {
            repo: repo.clone(),
            run_id: run.run_id,
            workflow_name: run.workflow_name,
            conclusion: run.conclusion,
            spoken,
        })
    }
}

impl<S: RunSource + 'static, N: SpeechNotifier + 'static> PollWorkflowRunsUseCase
    for PollWorkflowRunsInteractor<S, N>
{
    fn execute(
        &self,
        input: PollWorkflowRunsUseCaseInput,
    ) -> impl Stream<Item = Result<PollWorkflowRunsUseCaseOutput, Error>> + Send {
        let interactor = self.clone();

        try_stream! {
            loop {
                let output = interactor
                    .run_cycle()
                    .await
                    .context("Notification ledger failed during poll cycle")?;
                tracing::info!(
                    "Checked {} repositories, {} new notifications, {} unavailable",
                    output.outcomes.len(),
                    output.notifications().count(),
                    output.unavailable_count()
                );
                yield output;

                tracing::debug!("Waiting for {} seconds...", input.interval.as_secs());
                tokio::time::sleep(input.interval).await;
            }
        }
    }
}
