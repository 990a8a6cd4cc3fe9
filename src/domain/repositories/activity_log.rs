use crate::domain::models::notification::ActivityEvent;
use anyhow::Error;

pub trait ActivityLog: Send + Sync {
    fn append(&self, event: &ActivityEvent) -> Result<(), Error>;

    /// The last `count` lines, oldest first.
    fn tail(&self, count: usize) -> Result<Vec<String>, Error>;
}
