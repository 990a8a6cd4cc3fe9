use anyhow::Error;
use async_trait::async_trait;

/// How a daemon launch went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    /// A detached child is running the loop.
    Detached { pid: u32 },
    /// This platform cannot detach; the caller runs the loop itself.
    Foreground,
}

#[async_trait]
pub trait ProcessControl: Send + Sync {
    fn current_pid(&self) -> u32;
    fn is_alive(&self, pid: u32) -> bool;
    /// Sends the termination signal to `pid` and waits briefly for it to exit.
    async fn terminate(&self, pid: u32) -> Result<(), Error>;
    fn launch_daemon(&self) -> Result<Launch, Error>;
}
