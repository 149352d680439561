//! Persistence collaborators for a [`MatchSession`](crate::MatchSession).

use crate::archive::{self, ARCHIVE_FILE};
use crate::error::StoreError;
use crate::event::VolleyEvent;
use crate::log::{LedgerReader, LedgerWriter};
use crate::snapshot::{self, MatchSnapshot, SNAPSHOT_FILE};
use crate::state::Match;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// What a store hands back on load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredMatch {
    /// The last saved match state, if the store trusts it.
    pub state: Option<Match>,
    /// The persisted ledger, in append order.
    pub events: Vec<VolleyEvent>,
}

/// Load-on-start and save-on-mutate hooks.
///
/// A failed `save` or `clear` does not undo the in-memory change the session
/// already made; the session reports the error to its caller.
pub trait MatchStore {
    /// Read whatever was persisted. `None` means nothing was.
    fn load(&mut self) -> Result<Option<StoredMatch>, StoreError>;

    /// Persist every event not yet saved and the match state after them.
    ///
    /// A failed `save` must leave nothing of `appended` behind: the session
    /// hands the same events back on its next save.
    fn save(&mut self, state: &Match, appended: &[VolleyEvent]) -> Result<(), StoreError>;

    /// Drop the ledger and persist `state` as the fresh match.
    fn clear(&mut self, state: &Match) -> Result<(), StoreError>;
}

/// Store that keeps everything in memory. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Option<Match>,
    events: Vec<VolleyEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn state(&self) -> Option<&Match> {
        self.state.as_ref()
    }

    pub fn events(&self) -> &[VolleyEvent] {
        &self.events
    }
}

impl MatchStore for MemoryStore {
    fn load(&mut self) -> Result<Option<StoredMatch>, StoreError> {
        if self.state.is_none() && self.events.is_empty() {
            return Ok(None);
        }
        Ok(Some(StoredMatch {
            state: self.state.clone(),
            events: self.events.clone(),
        }))
    }

    fn save(&mut self, state: &Match, appended: &[VolleyEvent]) -> Result<(), StoreError> {
        self.events.extend_from_slice(appended);
        self.state = Some(state.clone());
        Ok(())
    }

    fn clear(&mut self, state: &Match) -> Result<(), StoreError> {
        self.events.clear();
        self.state = Some(state.clone());
        Ok(())
    }
}

/// Store backed by a directory:
///
/// ```text
/// <dir>/events.jsonl          ledger, one event per line
/// <dir>/match.snapshot.json   match state + ledger offset and hash
/// <dir>/archive.jsonl.zst     ledgers cleared by resets
/// ```
///
/// Only one `DirStore` may be open on a directory at a time.
#[derive(Debug)]
pub struct DirStore {
    dir: PathBuf,
    writer: LedgerWriter,
    snapshot_path: PathBuf,
    archive_path: PathBuf,
}

impl DirStore {
    /// Open or create a store in `dir`.
    ///
    /// # Errors
    ///
    /// [`StoreError::Locked`] if another store holds the directory, or
    /// [`StoreError::Io`] if it cannot be created or read.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        let writer = LedgerWriter::open(&dir).map_err(|e| {
            if e.kind() == io::ErrorKind::AlreadyExists {
                StoreError::Locked {
                    path: LedgerReader::new(&dir).log_path().to_path_buf(),
                }
            } else {
                StoreError::Io(e)
            }
        })?;
        Ok(DirStore {
            snapshot_path: dir.join(SNAPSHOT_FILE),
            archive_path: dir.join(ARCHIVE_FILE),
            dir,
            writer,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// A lock-free reader over this store's ledger, for live followers.
    pub fn reader(&self) -> LedgerReader {
        self.writer.reader()
    }

    /// Events of every ledger cleared by a reset, oldest first.
    pub fn archived_events(&self) -> Result<Vec<VolleyEvent>, StoreError> {
        archive::read_events(&self.archive_path)
    }

    fn snapshot_matches_ledger(&self, snap: &MatchSnapshot) -> bool {
        snap.offset == self.writer.end_offset() && snap.hash == self.writer.last_hash()
    }

    fn write_snapshot(&self, state: &Match) -> Result<(), StoreError> {
        let snap = MatchSnapshot::new(
            state.clone(),
            self.writer.end_offset(),
            self.writer.last_hash().to_string(),
        );
        snapshot::save(&self.snapshot_path, &snap)?;
        Ok(())
    }
}

impl MatchStore for DirStore {
    fn load(&mut self) -> Result<Option<StoredMatch>, StoreError> {
        let events = self
            .reader()
            .read_from(0)?
            .map(|r| r.map(|(event, _, _)| event))
            .collect::<Result<Vec<_>, _>>()?;

        let state = match snapshot::load(&self.snapshot_path)? {
            Some(snap) if self.snapshot_matches_ledger(&snap) => Some(snap.state),
            Some(snap) => {
                log::warn!(
                    "{}: snapshot at offset {} does not match ledger end {}, replaying",
                    self.dir.display(),
                    snap.offset,
                    self.writer.end_offset()
                );
                None
            }
            None => None,
        };

        if state.is_none() && events.is_empty() {
            return Ok(None);
        }
        Ok(Some(StoredMatch { state, events }))
    }

    /// Appends every event, then the snapshot. On failure the ledger is cut
    /// back to where it was, so a retry with the same events writes them once.
    fn save(&mut self, state: &Match, appended: &[VolleyEvent]) -> Result<(), StoreError> {
        let start = self.writer.end_offset();
        let start_hash = self.writer.last_hash().to_string();

        let written = appended
            .iter()
            .try_for_each(|event| self.writer.append(event).map(drop))
            .map_err(StoreError::from)
            .and_then(|()| self.write_snapshot(state));

        if written.is_err() && self.writer.end_offset() != start {
            if let Err(e) = self.writer.rewind(start, start_hash) {
                log::error!("{}: could not roll back ledger: {e}", self.dir.display());
            }
        }
        written
    }

    fn clear(&mut self, state: &Match) -> Result<(), StoreError> {
        let end = self.writer.end_offset();
        if end > 0 {
            let mut ledger = Vec::with_capacity(end as usize);
            File::open(self.reader().log_path())?
                .take(end)
                .read_to_end(&mut ledger)?;
            archive::append_frame(&self.archive_path, &ledger)?;
        }
        self.writer.truncate()?;
        self.write_snapshot(state)
    }
}
