//! Locations of every file the monitor keeps.

use std::path::{Path, PathBuf};

/// Overrides the state directory. Also how the daemon child inherits it.
pub const HOME_ENV: &str = "CI_MONITOR_HOME";

const DIR_NAME: &str = ".ci-monitor";
const FALLBACK_DIR: &str = "/tmp/ci-monitor";

#[derive(Debug, Clone)]
pub struct MonitorPaths {
    pub root: PathBuf,
    pub repos_file: PathBuf,
    pub config_file: PathBuf,
    pub ledger_file: PathBuf,
    pub history_file: PathBuf,
    pub pid_file: PathBuf,
    pub daemon_log: PathBuf,
}

impl MonitorPaths {
    /// `$CI_MONITOR_HOME`, else `~/.ci-monitor`.
    pub fn from_env() -> Self {
        match std::env::var_os(HOME_ENV) {
            Some(dir) if !dir.is_empty() => Self::for_root(PathBuf::from(dir)),
            _ => Self::for_root(Self::default_root()),
        }
    }

    fn default_root() -> PathBuf {
        dirs::home_dir().map_or_else(|| PathBuf::from(FALLBACK_DIR), |home| home.join(DIR_NAME))
    }

    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            repos_file: root.join("repos.txt"),
            config_file: root.join("config.json"),
            ledger_file: root.join("state.db"),
            history_file: root.join("history.log"),
            pid_file: root.join("daemon.pid"),
            daemon_log: root.join("daemon.log"),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the state directory, private to the user on Unix.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.root, std::fs::Permissions::from_mode(0o700))?;
        }

        Ok(())
    }
}
