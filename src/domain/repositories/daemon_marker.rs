use anyhow::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerState {
    Absent,
    Pid(u32),
    /// The marker exists but does not hold a process id.
    Unreadable,
}

/// On-disk record of the running daemon's process id.
pub trait DaemonMarker: Send + Sync {
    fn read(&self) -> MarkerState;
    fn write(&self, pid: u32) -> Result<(), Error>;
    fn remove(&self) -> Result<(), Error>;
}
