use crate::domain::models::repo::WatchedRepo;
use anyhow::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyWatched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotWatched,
}

pub trait WatchList: Send + Sync {
    fn load(&self) -> Result<Vec<WatchedRepo>, Error>;
    fn add(&self, repo: &WatchedRepo) -> Result<AddOutcome, Error>;
    fn remove(&self, repo: &WatchedRepo) -> Result<RemoveOutcome, Error>;
}
