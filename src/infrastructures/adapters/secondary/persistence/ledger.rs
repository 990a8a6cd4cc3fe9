//! SQLite-backed notification ledger.
//!
//! `notified_at` is stored as a fixed-width UTC RFC 3339 string, so string
//! comparison in SQL is chronological comparison.

use crate::domain::errors::LedgerError;
use crate::domain::models::notification::LedgerEntry;
use crate::domain::repositories::ledger::NotificationLedger;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS notified_runs (
        run_id TEXT PRIMARY KEY,
        repo TEXT NOT NULL,
        workflow TEXT NOT NULL,
        conclusion TEXT NOT NULL,
        notified_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_notified_runs_notified_at
        ON notified_runs (notified_at);
";

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub struct SqliteNotificationLedger {
    conn: Mutex<Connection>,
}

impl SqliteNotificationLedger {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        // The daemon and foreground commands share the file.
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, LedgerError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, LedgerError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, LedgerError> {
        self.conn.lock().map_err(|_| LedgerError::Poisoned)
    }

    #[cfg(test)]
    fn get(&self, run_id: &str) -> Result<Option<LedgerEntry>, LedgerError> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT run_id, repo, workflow, conclusion, notified_at
                 FROM notified_runs WHERE run_id = ?1",
                params![run_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        Ok(row.map(|(run_id, repo, workflow_name, conclusion, notified_at)| {
            let notified_at = DateTime::parse_from_rfc3339(&notified_at)
                .map_or_else(|_| DateTime::<Utc>::default(), |at| at.with_timezone(&Utc));
            LedgerEntry {
                run_id,
                repo,
                workflow_name,
                conclusion,
                notified_at,
            }
        }))
    }

    #[cfg(test)]
    fn entry_count(&self) -> Result<usize, LedgerError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM notified_runs", [], |row| {
            row.get(0)
        })?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

impl NotificationLedger for SqliteNotificationLedger {
    fn has(&self, run_id: &str) -> Result<bool, LedgerError> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM notified_runs WHERE run_id = ?1",
                params![run_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn record(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO notified_runs
                 (run_id, repo, workflow, conclusion, notified_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.run_id,
                entry.repo,
                entry.workflow_name,
                entry.conclusion,
                timestamp(entry.notified_at),
            ],
        )?;
        Ok(())
    }

    fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<usize, LedgerError> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM notified_runs WHERE notified_at < ?1",
            params![timestamp(cutoff)],
        )?;
        tracing::debug!("Purged {removed} ledger entries older than {cutoff}");
        Ok(removed)
    }
}
