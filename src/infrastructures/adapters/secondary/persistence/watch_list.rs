use super::write_atomic;
use crate::domain::models::repo::WatchedRepo;
use crate::domain::repositories::watch_list::{AddOutcome, RemoveOutcome, WatchList};
use anyhow::{Context, Error};
use std::path::PathBuf;

/// Newline-delimited `owner/name` list. Lines starting with `#` are comments.
pub struct FileWatchList {
    path: PathBuf,
}

impl FileWatchList {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_lines(&self) -> Result<Vec<String>, Error> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents.lines().map(str::to_owned).collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read {}", self.path.display()))
            }
        }
    }

    fn write_lines(&self, lines: &[String]) -> Result<(), Error> {
        let mut contents = lines.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        write_atomic(&self.path, contents.as_bytes())
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

fn is_entry(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

impl WatchList for FileWatchList {
    fn load(&self) -> Result<Vec<WatchedRepo>, Error> {
        let mut repos: Vec<WatchedRepo> = Vec::new();
        for line in self.read_lines()?.iter().filter(|line| is_entry(line)) {
            match WatchedRepo::parse(line) {
                Ok(repo) if !repos.contains(&repo) => repos.push(repo),
                Ok(_) => {}
                Err(e) => tracing::warn!("Skipping line in {}: {e}", self.path.display()),
            }
        }
        Ok(repos)
    }

    fn add(&self, repo: &WatchedRepo) -> Result<AddOutcome, Error> {
        if self.load()?.contains(repo) {
            return Ok(AddOutcome::AlreadyWatched);
        }
        let mut lines = self.read_lines()?;
        lines.push(repo.to_string());
        self.write_lines(&lines)?;
        Ok(AddOutcome::Added)
    }

    fn remove(&self, repo: &WatchedRepo) -> Result<RemoveOutcome, Error> {
        let lines = self.read_lines()?;
        let kept: Vec<String> = lines
            .iter()
            .filter(|line| !(is_entry(line) && line.trim() == repo.as_str()))
            .cloned()
            .collect();
        if kept.len() == lines.len() {
            return Ok(RemoveOutcome::NotWatched);
        }
        self.write_lines(&kept)?;
        Ok(RemoveOutcome::Removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn list(dir: &TempDir) -> FileWatchList {
        FileWatchList::new(dir.path().join("repos.txt"))
    }

    fn repo(name: &str) -> WatchedRepo {
        WatchedRepo::parse(name).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(list(&dir).load().unwrap().is_empty());
    }

    #[test]
    fn test_comments_blank_and_invalid_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("repos.txt"),
            "# work\nowner/repo1\n\n  owner/repo2  \nbroken\nother/repo3\n",
        )
        .unwrap();

        let repos = list(&dir).load().unwrap();
        let names: Vec<&str> = repos.iter().map(WatchedRepo::as_str).collect();
        assert_eq!(names, ["owner/repo1", "owner/repo2", "other/repo3"]);
    }

    #[test]
    fn test_add_then_remove_restores_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("repos.txt");
        std::fs::write(&path, "# mine\nacme/widgets\n").unwrap();
        let before = std::fs::read_to_string(&path).unwrap();
        let watch_list = list(&dir);

        assert_eq!(watch_list.add(&repo("owner/repo")).unwrap(), AddOutcome::Added);
        assert_eq!(watch_list.load().unwrap().len(), 2);
        assert_eq!(
            watch_list.remove(&repo("owner/repo")).unwrap(),
            RemoveOutcome::Removed
        );

        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_duplicates_and_unknown_removals_change_nothing() {
        let dir = TempDir::new().unwrap();
        let watch_list = list(&dir);
        watch_list.add(&repo("owner/repo")).unwrap();

        assert_eq!(
            watch_list.add(&repo("owner/repo")).unwrap(),
            AddOutcome::AlreadyWatched
        );
        assert_eq!(
            watch_list.remove(&repo("owner/other")).unwrap(),
            RemoveOutcome::NotWatched
        );
        assert_eq!(watch_list.load().unwrap(), vec![repo("owner/repo")]);
    }

    #[test]
    fn test_rewrite_leaves_no_temp_file_behind() {
        let dir = TempDir::new().unwrap();
        let watch_list = list(&dir);
        watch_list.add(&repo("owner/repo")).unwrap();
        watch_list.remove(&repo("owner/repo")).unwrap();

        assert!(!dir.path().join("repos.txt.tmp").exists());
        assert_eq!(std::fs::read_to_string(dir.path().join("repos.txt")).unwrap(), "");
    }
}
