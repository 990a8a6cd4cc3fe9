use crate::domain::models::repo::WatchedRepo;
use crate::domain::models::run::RunRecord;
use anyhow::Error;
use async_trait::async_trait;
use std::time::Duration;

/// Upper bound for a single run-source query.
pub const RUN_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait RunSource: Send + Sync {
    /// Name of the external tool the source shells out to.
    fn tool_name(&self) -> &'static str;

    /// Whether the external tool can be found on this host.
    fn is_available(&self) -> bool;

    /// Latest workflow run of `repo`.
    ///
    /// `Ok(None)` means the tool answered but has no run to report (empty list
    /// or non-zero exit). `Err` is a timeout or an unusable answer.
    async fn latest_run(&self, repo: &WatchedRepo) -> Result<Option<RunRecord>, Error>;
}
