use crate::domain::models::repo::RepoIdError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("ledger lock poisoned")]
    Poisoned,
    #[error("failed to create ledger directory: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown config key: {0}")]
    UnknownKey(String),
    #[error("invalid value for {key}: '{value}' (expected {expected})")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures reported to the user with a suggested remedy.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("daemon is already running (PID: {pid})")]
    AlreadyRunning { pid: u32 },
    #[error("no repositories configured")]
    NoRepositories,
    #[error("required tool `{tool}` not found")]
    SourceUnavailable { tool: &'static str },
    #[error(transparent)]
    InvalidRepo(#[from] RepoIdError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("notification ledger unavailable: {0}")]
    Ledger(#[from] LedgerError),
}

impl MonitorError {
    pub fn remedy(&self) -> Option<String> {
        match self {
            Self::AlreadyRunning { .. } => {
                Some("Use 'ci-monitor stop' to stop it first.".to_string())
            }
            Self::NoRepositories => {
                Some("Add repos first: ci-monitor add <owner/repo>".to_string())
            }
            Self::SourceUnavailable { tool } => Some(format!(
                "Install `{tool}` (https://cli.github.com/) and run `{tool} auth login`."
            )),
            Self::InvalidRepo(_) => Some("Use: ci-monitor add owner/repo".to_string()),
            Self::Config(ConfigError::UnknownKey(_)) => Some(format!(
                "Valid keys: {}",
                crate::domain::models::config::ConfigKey::valid_names()
            )),
            Self::Config(_) => None,
            Self::Ledger(_) => Some(
                "Check permissions of the state directory or move state.db aside.".to_string(),
            ),
        }
    }
}
