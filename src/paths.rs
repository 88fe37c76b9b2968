//! Path resolution for snapshot output
//!
//! Every snapshot lands in the configured output directory (default `json/`)
//! under a name built from the local time of the write:
//!
//! ```text
//! json/
//! ├── 10172026-143005_ranks.json
//! ├── 10172026-143005_failed.json
//! ├── 10172026-143012_pairs.json
//! ├── 10172026-143020_candles.json
//! └── fetcher_20261017.log   (only with output.write_log_file)
//! ```

use chrono::{DateTime, Local, TimeZone};
use std::path::{Path, PathBuf};

use crate::logger::{self, LogTag};

/// `MMDDYYYY-HHMMSS`, the snapshot file name prefix
pub const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%m%d%Y-%H%M%S";

// =============================================================================
// FILE NAMES
// =============================================================================

pub fn snapshot_timestamp() -> String {
    format_snapshot_timestamp(&Local::now())
}

pub fn format_snapshot_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(SNAPSHOT_TIMESTAMP_FORMAT).to_string()
}

/// `<dir>/<timestamp>_<suffix>.json`
pub fn snapshot_path(dir: &Path, timestamp: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{}_{}.json", timestamp, suffix))
}

// =============================================================================
// DIRECTORIES
// =============================================================================

/// Create `dir` (and parents) if it does not exist yet
pub fn ensure_directory(dir: &Path) -> std::io::Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        logger::debug(
            LogTag::Snapshot,
            &format!("Created directory: {}", dir.display()),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_timestamp_layout() {
        let at = Utc.with_ymd_and_hms(2018, 6, 3, 9, 5, 7).unwrap();
        assert_eq!(format_snapshot_timestamp(&at), "06032018-090507");
        assert_eq!(snapshot_timestamp().len(), "MMDDYYYY-HHMMSS".len());
    }

    #[test]
    fn test_snapshot_path() {
        let path = snapshot_path(Path::new("json"), "06032018-090507", "ranks");
        assert_eq!(path, PathBuf::from("json/06032018-090507_ranks.json"));
    }

    #[test]
    fn test_ensure_directory_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("json").join("nested");
        ensure_directory(&dir).unwrap();
        ensure_directory(&dir).unwrap();
        assert!(dir.is_dir());
    }
}
