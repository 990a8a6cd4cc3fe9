use crate::domain::models::config::MonitorConfig;
use crate::domain::models::repo::WatchedRepo;
use crate::domain::models::run::{Conclusion, RunRecord};
use chrono::{DateTime, Local, Utc};

/// A run that has been announced, as stored in the notification ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub run_id: String,
    pub repo: String,
    pub workflow_name: String,
    pub conclusion: String,
    pub notified_at: DateTime<Utc>,
}

/// One line of the activity log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEvent {
    pub at: DateTime<Local>,
    pub repo: WatchedRepo,
    pub workflow_name: String,
    pub conclusion: Conclusion,
}

impl ActivityEvent {
    pub fn format_line(&self) -> String {
        format!(
            "{} | {:20} | {:15} | {} {}",
            self.at.format("%Y-%m-%d %H:%M:%S"),
            self.repo.short_name(),
            self.workflow_name,
            self.conclusion.icon(),
            self.conclusion
        )
    }
}

/// Whether a completed run with this conclusion should be spoken aloud.
/// Conclusions other than success and failure are always spoken.
pub fn should_speak(conclusion: &Conclusion, config: &MonitorConfig) -> bool {
    match conclusion {
        Conclusion::Success => config.notify_success,
        Conclusion::Failure => config.notify_failure,
        Conclusion::Other(_) => true,
    }
}

pub fn announcement(repo: &WatchedRepo, run: &RunRecord) -> String {
    let name = repo.short_name();
    let workflow = &run.workflow_name;
    match &run.conclusion {
        Conclusion::Success => format!("{name}: {workflow} passed"),
        Conclusion::Failure => format!("Attention! {name}: {workflow} failed"),
        Conclusion::Other(other) => format!("{name}: {workflow} completed with {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn widgets() -> WatchedRepo {
        WatchedRepo::parse("acme/widgets").unwrap()
    }

    #[test]
    fn test_announcement_wording_follows_conclusion() {
        let passed = RunRecord::new("1", "completed", "success", "CI");
        let failed = RunRecord::new("2", "completed", "failure", "Deploy");
        let cancelled = RunRecord::new("3", "completed", "cancelled", "Nightly");

        assert_eq!(announcement(&widgets(), &passed), "widgets: CI passed");
        assert_eq!(
            announcement(&widgets(), &failed),
            "Attention! widgets: Deploy failed"
        );
        assert_eq!(
            announcement(&widgets(), &cancelled),
            "widgets: Nightly completed with cancelled"
        );
    }

    #[test]
    fn test_gating_respects_config_for_success_and_failure_only() {
        let config = MonitorConfig {
            notify_success: false,
            notify_failure: false,
            ..MonitorConfig::default()
        };
        assert!(!should_speak(&Conclusion::Success, &config));
        assert!(!should_speak(&Conclusion::Failure, &config));
        assert!(should_speak(
            &Conclusion::Other("timed_out".to_string()),
            &config
        ));
        assert!(should_speak(&Conclusion::Success, &MonitorConfig::default()));
    }

    #[test]
    fn test_log_line_pads_columns() {
        let event = ActivityEvent {
            at: Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap(),
            repo: widgets(),
            workflow_name: "CI".to_string(),
            conclusion: Conclusion::Success,
        };
        assert_eq!(
            event.format_line(),
            format!("2024-03-09 14:05:00 | {:20} | {:15} | ✅ success", "widgets", "CI")
        );
    }
}
