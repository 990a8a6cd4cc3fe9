use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid repository '{0}', expected the form owner/repo")]
pub struct RepoIdError(pub String);

/// A watched repository identifier in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WatchedRepo {
    full_name: String,
    split_at: usize,
}

impl WatchedRepo {
    pub fn parse(value: &str) -> Result<Self, RepoIdError> {
        let trimmed = value.trim();
        if trimmed.matches(SEPARATOR).count() != 1 {
            return Err(RepoIdError(value.to_string()));
        }
        let split_at = trimmed
            .find(SEPARATOR)
            .ok_or_else(|| RepoIdError(value.to_string()))?;
        let (owner, name) = (&trimmed[..split_at], &trimmed[split_at + 1..]);
        if owner.is_empty() || name.is_empty() || trimmed.contains(char::is_whitespace) {
            return Err(RepoIdError(value.to_string()));
        }
        Ok(Self {
            full_name: trimmed.to_string(),
            split_at,
        })
    }

    /// Repository name without the owner, used in announcements and the log.
    pub fn short_name(&self) -> &str {
        &self.full_name[self.split_at + 1..]
    }

    pub fn as_str(&self) -> &str {
        &self.full_name
    }
}

impl FromStr for WatchedRepo {
    type Err = RepoIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for WatchedRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}
