//! Location of the checker's resume history.
//!
//! The history database lives in the platform cache directory unless a
//! path is given on the command line.

use edinet_data::{DataError, HistoryStore};
use std::path::{Path, PathBuf};

/// Get the default history directory path.
///
/// Uses platform-specific cache directories:
/// - Linux: `~/.cache/edinet/`
/// - macOS: `~/Library/Caches/edinet/`
/// - Windows: `%LOCALAPPDATA%\edinet\`
pub(crate) fn default_history_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("edinet")
}

/// Get the default history database path.
pub(crate) fn default_history_path() -> PathBuf {
    default_history_dir().join("history.db")
}

/// Open the history, creating the directory if needed.
pub(crate) fn open_history(path: Option<&Path>) -> Result<HistoryStore, DataError> {
    let path = path.map_or_else(default_history_path, Path::to_path_buf);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    HistoryStore::new(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_default_history_path() {
        let path = default_history_path();
        assert!(path.ends_with("edinet/history.db"));
    }

    #[test]
    fn test_open_history_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.db");
        let date = NaiveDate::from_ymd_opt(2024, 6, 17).unwrap();

        let history = open_history(Some(&path)).unwrap();
        history.put_count(date, 12).unwrap();
        drop(history);

        let reopened = open_history(Some(&path)).unwrap();
        assert_eq!(reopened.get_count(date).unwrap(), Some(12));
    }
}
