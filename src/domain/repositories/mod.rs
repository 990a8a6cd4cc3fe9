pub mod activity_log;
pub mod config;
pub mod daemon_marker;
pub mod ledger;
pub mod watch_list;
