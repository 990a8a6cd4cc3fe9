pub mod manage_daemon;
pub mod poll_workflow_runs;
