use crate::domain::errors::LedgerError;
use crate::domain::models::notification::LedgerEntry;
use chrono::{DateTime, TimeDelta, Utc};

/// Announced runs are remembered for this many days.
pub const LEDGER_RETENTION_DAYS: i64 = 7;

pub fn ledger_retention() -> TimeDelta {
    TimeDelta::days(LEDGER_RETENTION_DAYS)
}

/// Persistent set of run ids that have already been announced.
pub trait NotificationLedger: Send + Sync {
    fn has(&self, run_id: &str) -> Result<bool, LedgerError>;

    /// Inserts or replaces the entry keyed by `entry.run_id`.
    fn record(&self, entry: &LedgerEntry) -> Result<(), LedgerError>;

    /// Removes entries notified strictly before `cutoff`. Returns the count removed.
    fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<usize, LedgerError>;

    fn purge_older_than(&self, retention: TimeDelta) -> Result<usize, LedgerError> {
        self.purge_before(Utc::now() - retention)
    }
}
