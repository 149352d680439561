//! Persisted match state, checkpointed against the ledger file.

use crate::state::Match;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// File name of the match snapshot inside a store directory.
pub const SNAPSHOT_FILE: &str = "match.snapshot.json";

/// Match state together with the ledger position it reflects.
///
/// The snapshot is only trusted when `offset` is the current end of the
/// ledger and `hash` matches the last ledger line. Anything else means the
/// ledger moved on without the snapshot (or was edited), and the state is
/// rebuilt by replaying the ledger.
///
/// ```text
/// $ jq '{offset, hash, set: .state.currentSet}' match.snapshot.json
/// { "offset": 1284, "hash": "a3f2e1b09c4d...", "set": 2 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct MatchSnapshot {
    pub state: Match,

    /// Byte offset into the ledger just past the last event this state includes.
    pub offset: u64,

    /// Hex-encoded xxh64 hash of the last ledger line, empty for an empty ledger.
    pub hash: String,
}

impl MatchSnapshot {
    pub fn new(state: Match, offset: u64, hash: String) -> Self {
        MatchSnapshot {
            state,
            offset,
            hash,
        }
    }
}

/// Save a snapshot atomically to disk.
///
/// Writes to a `.tmp` file first, syncs, then renames to the final path, so a
/// crash mid-write leaves the previous snapshot intact.
pub fn save(path: &Path, snapshot: &MatchSnapshot) -> io::Result<()> {
    let tmp_path = path.with_extension("json.tmp");

    let json = serde_json::to_string_pretty(snapshot)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_data()?;
    drop(file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Load a snapshot from disk.
///
/// Returns `Ok(None)` if the file is missing or does not parse; an unreadable
/// snapshot is treated as absent and the caller replays the ledger.
pub fn load(path: &Path) -> io::Result<Option<MatchSnapshot>> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    match serde_json::from_str(&contents) {
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(e) => {
            log::warn!("{}: unreadable snapshot ignored: {e}", path.display());
            Ok(None)
        }
    }
}
