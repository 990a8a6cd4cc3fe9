use anyhow::{Context, Error, anyhow};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Find a binary on $PATH.
pub fn find_on_path(name: &str) -> Option<PathBuf> {
    std::env::var_os("PATH").and_then(|paths| {
        std::env::split_paths(&paths).find_map(|dir| {
            let full = dir.join(name);
            if full.is_file() {
                return Some(full);
            }
            if cfg!(windows) {
                let exe = dir.join(format!("{name}.exe"));
                if exe.is_file() {
                    return Some(exe);
                }
            }
            None
        })
    })
}

/// Runs `program` to completion, killing it if it outlives `timeout`.
pub async fn output_with_timeout<I, A>(
    program: &str,
    args: I,
    timeout: Duration,
) -> Result<Output, Error>
where
    I: IntoIterator<Item = A>,
    A: AsRef<OsStr>,
{
    let mut command = tokio::process::Command::new(program);
    command.args(args).stdin(Stdio::null()).kill_on_drop(true);

    tokio::time::timeout(timeout, command.output())
        .await
        .map_err(|_| anyhow!("`{program}` timed out after {}s", timeout.as_secs()))?
        .with_context(|| format!("Failed to run `{program}`"))
}

/// Like [`output_with_timeout`], feeding `input` on stdin.
pub async fn output_with_input<I, A>(
    program: &str,
    args: I,
    input: &str,
    timeout: Duration,
) -> Result<Output, Error>
where
    I: IntoIterator<Item = A>,
    A: AsRef<OsStr>,
{
    let mut child = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to run `{program}`"))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| anyhow!("`{program}` has no stdin"))?;
    let input = input.to_owned();
    let run = async move {
        stdin.write_all(input.as_bytes()).await?;
        drop(stdin);
        child.wait_with_output().await
    };

    tokio::time::timeout(timeout, run)
        .await
        .map_err(|_| anyhow!("`{program}` timed out after {}s", timeout.as_secs()))?
        .with_context(|| format!("Failed to run `{program}`"))
}
