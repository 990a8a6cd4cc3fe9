use crate::domain::external_apis::process::{Launch, ProcessControl};
use anyhow::{Context, Error};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// Hidden subcommand the detached child runs.
pub const DAEMON_SUBCOMMAND: &str = "run-daemon";

const STOP_WAIT: Duration = Duration::from_secs(5);
const STOP_POLL: Duration = Duration::from_millis(100);

/// Signals and spawns real OS processes.
pub struct OsProcessControl {
    home: PathBuf,
    daemon_log: PathBuf,
}

impl OsProcessControl {
    /// `home` is handed to the child so it resolves the same state directory.
    pub fn new(home: PathBuf, daemon_log: PathBuf) -> Self {
        Self { home, daemon_log }
    }

    async fn wait_for_exit(&self, pid: u32) {
        let mut waited = Duration::ZERO;
        while waited < STOP_WAIT && self.is_alive(pid) {
            tokio::time::sleep(STOP_POLL).await;
            waited += STOP_POLL;
        }
        if self.is_alive(pid) {
            tracing::warn!("PID {pid} still running {}s after termination", STOP_WAIT.as_secs());
        }
    }
}

#[cfg(unix)]
fn signal(pid: u32, signal: libc::c_int) -> std::io::Result<()> {
    let pid = libc::pid_t::try_from(pid)
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "pid out of range"))?;
    // SAFETY: kill(2) has no memory-safety preconditions.
    if unsafe { libc::kill(pid, signal) } == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[async_trait]
impl ProcessControl for OsProcessControl {
    fn current_pid(&self) -> u32 {
        std::process::id()
    }

    #[cfg(unix)]
    fn is_alive(&self, pid: u32) -> bool {
        match signal(pid, 0) {
            Ok(()) => true,
            // Exists, owned by someone else.
            Err(e) => e.raw_os_error() == Some(libc::EPERM),
        }
    }

    #[cfg(not(unix))]
    fn is_alive(&self, pid: u32) -> bool {
        let filter = format!("PID eq {pid}");
        match std::process::Command::new("tasklist")
            .args(["/FI", filter.as_str(), "/NH", "/FO", "CSV"])
            .stdin(std::process::Stdio::null())
            .output()
        {
            Ok(output) => String::from_utf8_lossy(&output.stdout).contains(&format!("\"{pid}\"")),
            Err(e) => {
                tracing::debug!("tasklist failed, assuming PID {pid} is alive: {e}");
                true
            }
        }
    }

    #[cfg(unix)]
    async fn terminate(&self, pid: u32) -> Result<(), Error> {
        signal(pid, libc::SIGTERM).with_context(|| format!("Failed to signal PID {pid}"))?;
        self.wait_for_exit(pid).await;
        Ok(())
    }

    #[cfg(not(unix))]
    async fn terminate(&self, pid: u32) -> Result<(), Error> {
        let status = tokio::process::Command::new("taskkill")
            .args(["/PID", &pid.to_string()])
            .status()
            .await
            .context("Failed to run taskkill")?;
        if !status.success() {
            anyhow::bail!("taskkill exited with {status}");
        }
        self.wait_for_exit(pid).await;
        Ok(())
    }

    #[cfg(unix)]
    fn launch_daemon(&self) -> Result<Launch, Error> {
        use std::os::unix::process::CommandExt;

        let exe = std::env::current_exe().context("Failed to find ci-monitor executable")?;
        let log = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.daemon_log)
            .with_context(|| format!("Failed to open log file {}", self.daemon_log.display()))?;
        let stderr = log.try_clone().context("Failed to clone log file handle")?;

        let child = std::process::Command::new(exe)
            .arg(DAEMON_SUBCOMMAND)
            .env(crate::infrastructures::paths::HOME_ENV, &self.home)
            .stdin(std::process::Stdio::null())
            .stdout(log)
            .stderr(stderr)
            // Own process group so it survives the parent's terminal.
            .process_group(0)
            .spawn()
            .context("Failed to spawn daemon process")?;

        Ok(Launch::Detached { pid: child.id() })
    }

    #[cfg(not(unix))]
    fn launch_daemon(&self) -> Result<Launch, Error> {
        Ok(Launch::Foreground)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn control() -> OsProcessControl {
        let dir = std::env::temp_dir();
        OsProcessControl::new(dir.clone(), dir.join("ci-monitor-test.log"))
    }

    #[test]
    fn test_current_process_is_alive() {
        let control = control();
        assert!(control.is_alive(control.current_pid()));
    }

    #[test]
    fn test_exited_child_is_not_alive() {
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();

        assert!(!control().is_alive(pid));
    }

    #[tokio::test]
    async fn test_terminate_stops_a_running_process() {
        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id();

        // A zombie still answers kill(0), so reap from another thread.
        let reaper = std::thread::spawn(move || child.wait());
        control().terminate(pid).await.unwrap();
        let status = reaper.join().unwrap().unwrap();

        assert!(!status.success());
        assert!(!control().is_alive(pid));
    }
}
