use crate::application::use_cases::poll_workflow_runs::{
    PollWorkflowRunsUseCase, PollWorkflowRunsUseCaseInput, RepoOutcome,
};
use crate::domain::models::config::MonitorConfig;
use crate::domain::repositories::config::ConfigStore;
use crate::infrastructures::context::AppContext;
use anyhow::{Context, Error};
use futures_util::StreamExt;
use std::future::Future;
use std::time::Duration;

/// Body of the daemon process: claims the marker, polls until signalled,
/// and removes the marker on every way out.
#[tracing::instrument(name = "run_daemon", skip(context))]
pub async fn run_daemon(context: &AppContext) -> Result<(), Error> {
    let manager = context.daemon_manager();
    let claim = manager.claim()?;
    let pid = claim.pid();

    let result: Result<(), Error> = async {
        let shutdown = shutdown_signal()?;
        // The interval is fixed for the life of the daemon.
        let config = context.config.load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {e}");
            MonitorConfig::default()
        });
        tracing::info!(
            "Daemon started (PID {pid}), checking every {}s",
            config.interval().as_secs()
        );
        poll_until(context.poll_interactor(), config.interval(), shutdown).await
    }
    .await;

    drop(claim);
    match &result {
        Ok(()) => tracing::info!("Daemon stopped"),
        Err(e) => tracing::error!("Daemon exiting: {e:#}"),
    }
    result
}

async fn poll_until<U: PollWorkflowRunsUseCase>(
    interactor: U,
    interval: Duration,
    shutdown: impl Future<Output = &'static str>,
) -> Result<(), Error> {
    let stream = interactor.execute(PollWorkflowRunsUseCaseInput { interval });
    tokio::pin!(stream);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            next = stream.next() => {
                match next {
                    Some(Ok(output)) => {
                        for (repo, outcome) in &output.outcomes {
                            if let RepoOutcome::InProgress { run_id, status } = outcome {
                                tracing::debug!("{repo}: run {run_id} is {status}");
                            }
                        }
                    }
                    Some(Err(e)) => return Err(e),
                    None => return Ok(()),
                }
            },
            signal = &mut shutdown => {
                tracing::info!("Received {signal}, shutting down");
                return Ok(());
            },
        }
    }
}

#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = &'static str>, Error> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    let mut interrupt =
        signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;
    Ok(async move {
        tokio::select! {
            _ = terminate.recv() => "SIGTERM",
            _ = interrupt.recv() => "SIGINT",
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = &'static str>, Error> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
        "Ctrl-C"
    })
}
