/// JSON snapshot files
///
/// Snapshots are pretty-printed with four-space indentation, keys sorted at
/// every level and non-ASCII text written as UTF-8 rather than escaped.
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::FetchError;
use crate::fetcher::FilteredPairs;
use crate::logger::{self, LogTag};
use crate::paths;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Ranks,
    Failed,
    Pairs,
    Candles,
}

impl SnapshotKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            SnapshotKind::Ranks => "ranks",
            SnapshotKind::Failed => "failed",
            SnapshotKind::Pairs => "pairs",
            SnapshotKind::Candles => "candles",
        }
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// Render `data` in snapshot layout
pub fn to_snapshot_json<T: Serialize>(data: &T) -> Result<Vec<u8>, FetchError> {
    // Map-backed Value keeps its keys sorted
    let value = serde_json::to_value(data)?;

    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Write `<dir>/<timestamp>_<kind>.json`, creating `dir` when needed
pub async fn write_snapshot<T: Serialize>(
    dir: &Path,
    timestamp: &str,
    kind: SnapshotKind,
    data: &T,
) -> Result<PathBuf, FetchError> {
    let bytes = to_snapshot_json(data)?;

    tokio::fs::create_dir_all(dir).await?;
    let path = paths::snapshot_path(dir, timestamp, kind.suffix());
    tokio::fs::write(&path, &bytes).await?;

    logger::info(
        LogTag::Snapshot,
        &format!("Wrote {} snapshot: {} ({} bytes)", kind, path.display(), bytes.len()),
    );
    Ok(path)
}

pub async fn read_snapshot<T: DeserializeOwned>(path: &Path) -> Result<T, FetchError> {
    let contents = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&contents).map_err(|e| {
        FetchError::Parse(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Load a ranks snapshot (or a hand-made file of the same shape) as pricing input
pub async fn read_ranked_products(path: &Path) -> Result<FilteredPairs, FetchError> {
    let ranked: FilteredPairs = read_snapshot(path).await?;
    logger::debug(
        LogTag::Snapshot,
        &format!("Loaded {} ranked listings from {}", ranked.total_len(), path.display()),
    );
    Ok(ranked)
}

/// Untyped variant used by the debug tool
pub async fn read_snapshot_value(path: &Path) -> Result<Value, FetchError> {
    read_snapshot(path).await
}
