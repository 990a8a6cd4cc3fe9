use crate::application::use_cases::manage_daemon::{
    DaemonState, StartOutcome, StartRequest, StopOutcome,
};
use crate::domain::errors::MonitorError;
use crate::domain::external_apis::github::RunSource;
use crate::domain::models::config::{ConfigKey, MonitorConfig};
use crate::domain::models::repo::WatchedRepo;
use crate::domain::repositories::activity_log::ActivityLog;
use crate::domain::repositories::config::ConfigStore;
use crate::domain::repositories::watch_list::{AddOutcome, RemoveOutcome, WatchList};
use crate::infrastructures::adapters::primary::daemon::run_daemon;
use crate::infrastructures::context::AppContext;
use anyhow::Error;
use clap::{Parser, Subcommand};

pub const DEFAULT_HISTORY_LINES: usize = 20;

/// Watch GitHub Actions runs and announce each result once.
#[derive(Parser, Debug)]
#[command(name = "ci-monitor", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start the background monitor.
    Start,
    /// Stop the background monitor.
    Stop,
    /// Show whether the monitor is running.
    Status,
    /// Add a repository to the watch list.
    Add {
        /// Repository as owner/repo.
        repo: String,
    },
    /// Remove a repository from the watch list.
    Remove {
        /// Repository as owner/repo.
        repo: String,
    },
    /// List watched repositories.
    List,
    /// Show recent notifications.
    History {
        /// Number of entries to show.
        #[arg(short = 'n', default_value_t = DEFAULT_HISTORY_LINES)]
        n: usize,
    },
    /// Check every repository once, now.
    Check,
    /// Show or change configuration.
    Config {
        /// Key to show or set.
        key: Option<String>,
        /// New value for the key.
        value: Option<String>,
    },
    /// Poll loop of a started monitor.
    #[command(hide = true)]
    RunDaemon,
}

impl Command {
    /// The daemon logs more and writes to a file rather than a terminal.
    pub fn is_daemon(&self) -> bool {
        matches!(self, Self::RunDaemon)
    }
}

pub async fn dispatch(command: Command, context: &AppContext) -> Result<(), Error> {
    match command {
        Command::Start => start(context).await,
        Command::Stop => stop(context).await,
        Command::Status => status(context),
        Command::Add { repo } => add(context, &repo),
        Command::Remove { repo } => remove(context, &repo),
        Command::List => list(context),
        Command::History { n } => history(context, n),
        Command::Check => check(context).await,
        Command::Config { key, value } => config(context, key.as_deref(), value.as_deref()),
        Command::RunDaemon => run_daemon(context).await,
    }
}

fn load_config(context: &AppContext) -> Result<MonitorConfig, Error> {
    Ok(context.config.load().map_err(MonitorError::from)?)
}

fn parse_repo(raw: &str) -> Result<WatchedRepo, Error> {
    Ok(WatchedRepo::parse(raw).map_err(MonitorError::from)?)
}

async fn start(context: &AppContext) -> Result<(), Error> {
    let repos = context.watch_list.load()?;
    let config = load_config(context)?;
    let request = StartRequest {
        watched_repos: repos.len(),
        run_source_tool: context.run_source.tool_name(),
        run_source_available: context.run_source.is_available(),
    };

    match context.daemon_manager().start(request)? {
        StartOutcome::Launched { pid } => {
            println!("✅ CI Monitor started (PID: {pid})");
            println!(
                "   Monitoring {} repositories every {}s",
                repos.len(),
                config.interval().as_secs()
            );
            println!("   View activity: ci-monitor history");
            println!("   Stop daemon:   ci-monitor stop");
            Ok(())
        }
        StartOutcome::RunInForeground => {
            println!("Running in foreground mode (Ctrl-C to stop)...");
            run_daemon(context).await
        }
    }
}

async fn stop(context: &AppContext) -> Result<(), Error> {
    match context.daemon_manager().stop().await? {
        StopOutcome::Stopped { pid } => println!("✅ Daemon stopped (was PID: {pid})"),
        StopOutcome::NotRunning => println!("Daemon is not running."),
    }
    Ok(())
}

fn status(context: &AppContext) -> Result<(), Error> {
    let repos = context.watch_list.load()?;
    let config = load_config(context)?;

    match context.daemon_manager().state() {
        DaemonState::Running { pid } => {
            println!("✅ CI Monitor is RUNNING (PID: {pid})");
            println!("   Monitoring: {} repositories", repos.len());
            println!("   Interval:   {} seconds", config.interval().as_secs());
            println!(
                "   Speech:     {}",
                if config.speech_enabled { "enabled" } else { "disabled" }
            );
        }
        DaemonState::Stopped => {
            println!("⚪ CI Monitor is NOT running");
            println!("   Start with: ci-monitor start");
        }
    }
    println!();
    print_repos(&repos, "Watched repositories:");
    Ok(())
}

fn print_repos(repos: &[WatchedRepo], header: &str) {
    if repos.is_empty() {
        println!("No repositories configured.");
        println!("Add repos with: ci-monitor add <owner/repo>");
        return;
    }
    println!("{header}");
    for repo in repos {
        println!("   • {repo}");
    }
}

fn add(context: &AppContext, raw: &str) -> Result<(), Error> {
    let repo = parse_repo(raw)?;
    match context.watch_list.add(&repo)? {
        AddOutcome::Added => println!("✅ Added '{repo}' to watch list."),
        AddOutcome::AlreadyWatched => println!("Repository '{repo}' is already being monitored."),
    }
    Ok(())
}

fn remove(context: &AppContext, raw: &str) -> Result<(), Error> {
    let repo = parse_repo(raw)?;
    match context.watch_list.remove(&repo)? {
        RemoveOutcome::Removed => println!("✅ Removed '{repo}' from watch list."),
        RemoveOutcome::NotWatched => println!("Repository '{repo}' is not in the watch list."),
    }
    Ok(())
}

fn list(context: &AppContext) -> Result<(), Error> {
    print_repos(&context.watch_list.load()?, "Monitored repositories:");
    Ok(())
}

fn history(context: &AppContext, count: usize) -> Result<(), Error> {
    let lines = context.activity_log.tail(count)?;
    if lines.is_empty() {
        println!("No history yet.");
        return Ok(());
    }
    println!("Recent CI/CD Activity:");
    println!("{}", "-".repeat(60));
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

async fn check(context: &AppContext) -> Result<(), Error> {
    let repos = context.watch_list.load()?;
    if repos.is_empty() {
        println!("No repositories configured.");
        return Ok(());
    }

    println!("Checking {} repositories...", repos.len());
    let output = context
        .poll_interactor()
        .run_cycle()
        .await
        .map_err(MonitorError::from)?;
    for notification in output.notifications() {
        println!(
            "{} {} - {}: {}",
            notification.conclusion.icon(),
            notification.repo,
            notification.workflow_name,
            notification.conclusion
        );
    }
    println!("Done.");
    Ok(())
}

fn config(context: &AppContext, key: Option<&str>, value: Option<&str>) -> Result<(), Error> {
    let mut config = load_config(context)?;

    let Some(key) = key else {
        println!("Current configuration:");
        for key in ConfigKey::ALL {
            let label = format!("{key}:");
            println!("  {label:16} {}", config.display_value(key));
        }
        println!();
        println!("Modify with: ci-monitor config <key> <value>");
        println!("Example: ci-monitor config speech_enabled false");
        return Ok(());
    };

    let key: ConfigKey = key.parse().map_err(MonitorError::from)?;
    let Some(value) = value else {
        println!("Current value of {key}: {}", config.display_value(key));
        return Ok(());
    };

    config.set(key, value).map_err(MonitorError::from)?;
    context.config.save(&config).map_err(MonitorError::from)?;
    println!("✅ Set {key} = {}", config.display_value(key));
    Ok(())
}
