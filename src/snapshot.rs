use std::{
    cmp::Ordering,
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use chrono::{DateTime, Local};
use log::{debug, trace};

use crate::error::NotifyError;

/// A candidate file found while scanning the watched directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub path: PathBuf,
    pub modified: SystemTime,

    /// Size at the time of the scan, used to detect a file still being written
    pub len: u64,
}

impl DirectoryEntry {
    /// Local time rendering of `modified` for log and user facing messages
    pub fn modified_display(&self) -> String {
        let modified: DateTime<Local> = self.modified.into();
        modified.format("%F %T").to_string()
    }

    /// Newer wins, on equal times the greater file name wins
    fn newest_order(&self, other: &Self) -> Ordering {
        self.modified
            .cmp(&other.modified)
            .then_with(|| self.path.file_name().cmp(&other.path.file_name()))
    }
}

/// Returns the most recently modified regular file of `dir`.
///
/// Does not recurse. Symlinks are followed, so a link to a directory is
/// skipped like the directory itself. FIFOs, sockets and device nodes are
/// skipped too, reading them could block forever.
pub fn newest_file(dir: &Path) -> Result<DirectoryEntry, NotifyError> {
    debug!("Scanning {dir:?} for the newest file");
    let read_dir = fs::read_dir(dir).map_err(|e| NotifyError::filesystem(dir, e))?;

    let mut newest: Option<DirectoryEntry> = None;
    for entry in read_dir {
        let entry = entry.map_err(|e| NotifyError::filesystem(dir, e))?;
        let path = entry.path();
        let metadata = fs::metadata(&path).map_err(|e| NotifyError::filesystem(&path, e))?;
        if !metadata.is_file() {
            trace!("Skipping {path:?}, not a regular file");
            continue;
        }
        let modified = metadata
            .modified()
            .map_err(|e| NotifyError::filesystem(&path, e))?;
        let candidate = DirectoryEntry {
            path,
            modified,
            len: metadata.len(),
        };
        trace!("Candidate {candidate:?}");

        newest = match newest {
            Some(current) if current.newest_order(&candidate) != Ordering::Less => Some(current),
            _ => Some(candidate),
        };
    }

    newest.ok_or_else(|| NotifyError::NoAttachment {
        dir: dir.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs::File, time::Duration};

    use tempfile::TempDir;

    /// Creates `name` in `dir` with its modification time `offset` seconds after a fixed epoch
    fn touch(dir: &Path, name: &str, offset: u64) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, name.as_bytes()).unwrap();
        set_mtime(&path, offset);
        path
    }

    fn set_mtime(path: &Path, offset: u64) {
        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + offset);
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    fn name_of(entry: &DirectoryEntry) -> &str {
        entry.path.file_name().unwrap().to_str().unwrap()
    }

    #[test]
    fn picks_strictly_newest() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "c.jpg", 5);
        touch(dir.path(), "a.jpg", 30);
        touch(dir.path(), "b.jpg", 20);

        let actual = newest_file(dir.path()).unwrap();

        assert_eq!(name_of(&actual), "a.jpg");
        assert_eq!(actual.len, "a.jpg".len() as u64);
    }

    #[test]
    fn newer_file_beats_older_file_and_subdirectory() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.jpg", 0);
        touch(dir.path(), "b.jpg", 10);
        fs::create_dir(dir.path().join("old")).unwrap();

        let actual = newest_file(dir.path()).unwrap();

        assert_eq!(name_of(&actual), "b.jpg");
    }

    #[test]
    fn newest_subdirectory_is_never_selected() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.jpg", 0);
        let sub = dir.path().join("zzz");
        fs::create_dir(&sub).unwrap();
        // Writing into the subdirectory bumps its mtime past a.jpg
        fs::write(sub.join("inner.jpg"), b"inner").unwrap();

        let actual = newest_file(dir.path()).unwrap();

        assert_eq!(name_of(&actual), "a.jpg");
    }

    #[test]
    fn modified_display_is_date_and_time() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.jpg", 0);

        let display = newest_file(dir.path()).unwrap().modified_display();

        // e.g. "2023-11-14 22:13:20", exact value depends on the local zone
        assert_eq!(display.len(), 19);
        assert_eq!(&display[4..5], "-");
        assert_eq!(&display[10..11], " ");
        assert_eq!(&display[13..14], ":");
    }

    #[test]
    fn tie_goes_to_greatest_name() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b.jpg", 10);
        touch(dir.path(), "c.jpg", 10);
        touch(dir.path(), "a.jpg", 10);

        let actual = newest_file(dir.path()).unwrap();

        assert_eq!(name_of(&actual), "c.jpg");
    }

    #[cfg(unix)]
    #[test]
    fn special_files_are_never_selected() {
        use std::os::unix::net::UnixListener;

        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.jpg", 0);
        // Bound after a.jpg so its mtime is far newer
        let _listener = UnixListener::bind(dir.path().join("zzz.sock")).unwrap();

        let actual = newest_file(dir.path()).unwrap();

        assert_eq!(name_of(&actual), "a.jpg");
    }

    #[cfg(unix)]
    #[test]
    fn only_special_files() {
        use std::os::unix::net::UnixListener;

        let dir = TempDir::new().unwrap();
        let _listener = UnixListener::bind(dir.path().join("cam.sock")).unwrap();

        let actual = newest_file(dir.path()).unwrap_err();

        assert!(matches!(actual, NotifyError::NoAttachment { .. }));
    }

    #[test]
    fn empty_directory() {
        let dir = TempDir::new().unwrap();

        let actual = newest_file(dir.path()).unwrap_err();

        assert!(matches!(actual, NotifyError::NoAttachment { .. }));
    }

    #[test]
    fn only_subdirectories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("old")).unwrap();
        fs::create_dir(dir.path().join("older")).unwrap();

        let actual = newest_file(dir.path()).unwrap_err();

        assert!(matches!(actual, NotifyError::NoAttachment { .. }));
    }

    #[test]
    fn missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("not_here");

        let actual = newest_file(&missing).unwrap_err();

        match actual {
            NotifyError::Filesystem { path, .. } => assert_eq!(path, missing),
            other => panic!("expected filesystem error, got {other:?}"),
        }
    }

    #[test]
    fn path_is_a_file() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "a.jpg", 0);

        let actual = newest_file(&file).unwrap_err();

        assert!(matches!(actual, NotifyError::Filesystem { .. }));
    }
}
