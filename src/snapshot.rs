//! Snapshot codec (C5): serializes a symbol's book and pending triggers to
//! a durable JSON blob and back, per §4.5 and the "Snapshot file" shape in
//! §6.
//!
//! Grounded in the teacher crate's `OrderBookSnapshotPackage`
//! (`src/orderbook/snapshot.rs`): a versioned wrapper carrying a hex SHA-256
//! checksum of the serialized payload, validated on load before the inner
//! snapshot is trusted.

use std::fmt;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::order::Order;

/// Format version for the on-disk snapshot package. Bumped on breaking
/// changes to [`BookSnapshot`]'s shape.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Errors from loading a snapshot file. Per §7, corruption is recoverable
/// at the call site: `load_state` reports `false` and leaves the
/// in-memory book untouched rather than propagating this type further.
#[derive(Debug)]
#[non_exhaustive]
pub enum SnapshotError {
    Io(std::io::Error),
    Deserialize(serde_json::Error),
    ChecksumMismatch { expected: String, actual: String },
    UnsupportedVersion(u32),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Io(e) => write!(f, "snapshot io error: {e}"),
            SnapshotError::Deserialize(e) => write!(f, "snapshot deserialize error: {e}"),
            SnapshotError::ChecksumMismatch { expected, actual } => write!(
                f,
                "snapshot checksum mismatch: expected {expected}, got {actual}"
            ),
            SnapshotError::UnsupportedVersion(v) => {
                write!(f, "unsupported snapshot version: {v}")
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

/// Logical snapshot of one symbol's book and trigger store, per §6:
/// `{symbol, bids: [[price, [order, ...]], ...], asks: [...], triggers: [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub symbol: String,
    pub bids: Vec<(Decimal, Vec<Order>)>,
    pub asks: Vec<(Decimal, Vec<Order>)>,
    pub triggers: Vec<Order>,
}

/// Checksummed, versioned envelope persisted to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotPackage {
    version: u32,
    snapshot: BookSnapshot,
    checksum: String,
}

impl SnapshotPackage {
    fn new(snapshot: BookSnapshot) -> Result<Self, SnapshotError> {
        let checksum = Self::compute_checksum(&snapshot)?;
        Ok(Self {
            version: SNAPSHOT_FORMAT_VERSION,
            snapshot,
            checksum,
        })
    }

    fn compute_checksum(snapshot: &BookSnapshot) -> Result<String, SnapshotError> {
        let payload = serde_json::to_vec(snapshot).map_err(SnapshotError::Deserialize)?;
        let mut hasher = Sha256::new();
        hasher.update(payload);
        Ok(format!("{:x}", hasher.finalize()))
    }

    fn into_validated(self) -> Result<BookSnapshot, SnapshotError> {
        if self.version != SNAPSHOT_FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        let computed = Self::compute_checksum(&self.snapshot)?;
        if computed != self.checksum {
            return Err(SnapshotError::ChecksumMismatch {
                expected: self.checksum,
                actual: computed,
            });
        }
        Ok(self.snapshot)
    }
}

/// The file path a symbol's snapshot is written to under `state_dir`.
#[must_use]
pub fn snapshot_path(state_dir: &Path, symbol: &str) -> PathBuf {
    state_dir.join(format!("{symbol}.json"))
}

/// Serializes `snapshot` to a checksummed JSON package and writes it to
/// `state_dir/{symbol}.json`, creating `state_dir` if necessary.
pub fn save_to_file(state_dir: &Path, snapshot: &BookSnapshot) -> Result<(), SnapshotError> {
    std::fs::create_dir_all(state_dir).map_err(SnapshotError::Io)?;
    let package = SnapshotPackage::new(snapshot.clone())?;
    let json = serde_json::to_string(&package).map_err(SnapshotError::Deserialize)?;
    let path = snapshot_path(state_dir, &snapshot.symbol);
    std::fs::write(&path, json).map_err(SnapshotError::Io)?;
    info!(symbol = %snapshot.symbol, path = %path.display(), "snapshot saved");
    Ok(())
}

/// Loads and validates a symbol's snapshot file. Returns `Ok(None)` if the
/// file is simply absent (snapshots are advisory, per §4.5); returns
/// `Err` only for a file that exists but fails to parse or validate.
pub fn load_from_file(
    state_dir: &Path,
    symbol: &str,
) -> Result<Option<BookSnapshot>, SnapshotError> {
    let path = snapshot_path(state_dir, symbol);
    let bytes = match std::fs::read_to_string(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(SnapshotError::Io(e)),
    };
    let package: SnapshotPackage =
        serde_json::from_str(&bytes).map_err(SnapshotError::Deserialize)?;
    match package.into_validated() {
        Ok(snapshot) => {
            info!(symbol, path = %path.display(), "snapshot loaded");
            Ok(Some(snapshot))
        }
        Err(e) => {
            warn!(symbol, error = %e, "snapshot failed validation; treating as absent");
            Err(e)
        }
    }
}
