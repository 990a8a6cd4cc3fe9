use std::fmt;

/// Name reported when the provider leaves the workflow name empty.
pub const DEFAULT_WORKFLOW_NAME: &str = "Workflow";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Queued, waiting or in progress. Keeps the provider's raw status.
    Pending(String),
    Completed,
}

impl RunStatus {
    pub fn from_provider(status: &str) -> Self {
        if status == "completed" {
            Self::Completed
        } else {
            Self::Pending(status.to_string())
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending(status) => f.write_str(status),
            Self::Completed => f.write_str("completed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conclusion {
    Success,
    Failure,
    /// Any other provider value (`cancelled`, `skipped`, `timed_out`, or empty).
    Other(String),
}

impl Conclusion {
    pub fn from_provider(conclusion: &str) -> Self {
        match conclusion {
            "success" => Self::Success,
            "failure" => Self::Failure,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Other(value) => value,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Success => "✅",
            Self::Failure => "❌",
            Self::Other(_) => "⚠️",
        }
    }
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the latest workflow run of a repository, fetched fresh each poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    pub run_id: String,
    pub status: RunStatus,
    pub conclusion: Conclusion,
    pub workflow_name: String,
}

impl RunRecord {
    pub fn new(
        run_id: impl Into<String>,
        status: &str,
        conclusion: &str,
        workflow_name: &str,
    ) -> Self {
        let workflow_name = if workflow_name.trim().is_empty() {
            DEFAULT_WORKFLOW_NAME.to_string()
        } else {
            workflow_name.to_string()
        };
        Self {
            run_id: run_id.into(),
            status: RunStatus::from_provider(status),
            conclusion: Conclusion::from_provider(conclusion),
            workflow_name,
        }
    }
}
