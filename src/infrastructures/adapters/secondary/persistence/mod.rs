pub mod activity_log;
pub mod config;
pub mod daemon_marker;
pub mod ledger;
pub mod watch_list;

use std::path::Path;

/// Replaces `path` by writing a sibling temp file and renaming it over.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)
}
