use crate::domain::external_apis::github::{RUN_QUERY_TIMEOUT, RunSource};
use crate::domain::models::repo::WatchedRepo;
use crate::domain::models::run::RunRecord;
use crate::infrastructures::adapters::secondary::process::command::{
    find_on_path, output_with_timeout,
};
use anyhow::{Context, Error};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const RUN_FIELDS: &str = "databaseId,status,conclusion,name,updatedAt";

#[derive(Deserialize, Debug, Clone)]
struct GhRunResponse {
    #[serde(rename = "databaseId")]
    database_id: u64,
    status: String,
    // Empty string (or absent) until the run completes
    #[serde(default)]
    conclusion: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(rename = "updatedAt", default)]
    updated_at: Option<String>,
}

/// Reads workflow runs through the already-authenticated `gh` CLI.
pub struct GhCliRunSource {
    gh_bin: String,
    timeout: Duration,
}

impl GhCliRunSource {
    pub fn new() -> Self {
        Self {
            gh_bin: "gh".to_owned(),
            timeout: RUN_QUERY_TIMEOUT,
        }
    }

    #[cfg(test)]
    fn with_binary(gh_bin: &str, timeout: Duration) -> Self {
        Self {
            gh_bin: gh_bin.to_owned(),
            timeout,
        }
    }
}

impl Default for GhCliRunSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses `gh run list --json` output into the newest run, if any.
fn parse_latest_run(stdout: &[u8]) -> Result<Option<RunRecord>, Error> {
    let runs: Vec<GhRunResponse> =
        serde_json::from_slice(stdout).context("Failed to parse gh run list output")?;

    Ok(runs.into_iter().next().map(|run| {
        tracing::trace!(
            "Run {} last updated at {}",
            run.database_id,
            run.updated_at.as_deref().unwrap_or("unknown")
        );
        RunRecord::new(
            run.database_id.to_string(),
            &run.status,
            run.conclusion.as_deref().unwrap_or_default(),
            &run.name,
        )
    }))
}

#[async_trait]
impl RunSource for GhCliRunSource {
    fn tool_name(&self) -> &'static str {
        "gh"
    }

    fn is_available(&self) -> bool {
        find_on_path(&self.gh_bin).is_some()
    }

    #[tracing::instrument(name = "GhCliRunSource::latest_run", skip(self), fields(repo = %repo))]
    async fn latest_run(&self, repo: &WatchedRepo) -> Result<Option<RunRecord>, Error> {
        let output = output_with_timeout(
            &self.gh_bin,
            [
                "run",
                "list",
                "--repo",
                repo.as_str(),
                "--limit",
                "1",
                "--json",
                RUN_FIELDS,
            ],
            self.timeout,
        )
        .await
        .with_context(|| format!("Failed to query workflow runs for {repo}"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!("gh run list for {repo} failed: {}", stderr.trim());
            return Ok(None);
        }

        parse_latest_run(&output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::run::{Conclusion, RunStatus};

    #[test]
    fn test_parses_completed_run() {
        let stdout = br#"[{"databaseId":123,"status":"completed","conclusion":"success","name":"Tests","updatedAt":"2024-01-01T00:00:00Z"}]"#;

        let run = parse_latest_run(stdout).unwrap().unwrap();

        assert_eq!(run.run_id, "123");
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.conclusion, Conclusion::Success);
        assert_eq!(run.workflow_name, "Tests");
    }

    #[test]
    fn test_parses_in_progress_run_with_empty_conclusion() {
        let stdout = br#"[{"databaseId":9,"status":"in_progress","conclusion":"","name":"CI","updatedAt":"2024-01-01T00:00:00Z"}]"#;

        let run = parse_latest_run(stdout).unwrap().unwrap();

        assert_eq!(run.status, RunStatus::Pending("in_progress".to_string()));
        assert_eq!(run.conclusion, Conclusion::Other(String::new()));
    }

    #[test]
    fn test_empty_list_means_no_run() {
        assert_eq!(parse_latest_run(b"[]").unwrap(), None);
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(parse_latest_run(b"not json").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_maps_to_no_run() {
        let source = GhCliRunSource::with_binary("false", Duration::from_secs(5));
        let repo = WatchedRepo::parse("acme/widgets").unwrap();

        assert_eq!(source.latest_run(&repo).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let source = GhCliRunSource::with_binary("gh-missing-for-tests", Duration::from_secs(5));
        let repo = WatchedRepo::parse("acme/widgets").unwrap();

        assert!(!source.is_available());
        assert!(source.latest_run(&repo).await.is_err());
    }
}
