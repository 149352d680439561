//! Compressed history of ledgers cleared by a match reset.
//!
//! Each reset appends one zstd frame holding the cleared JSONL bytes. The
//! decoder reads through all frames as one stream.

use crate::error::StoreError;
use crate::event::VolleyEvent;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// File name of the archive inside a store directory.
pub const ARCHIVE_FILE: &str = "archive.jsonl.zst";

/// Compress `ledger` and append it as a new frame. Empty input writes nothing.
pub fn append_frame(archive_path: &Path, ledger: &[u8]) -> io::Result<()> {
    if ledger.is_empty() {
        return Ok(());
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(archive_path)?;
    let mut encoder = zstd::Encoder::new(file, 3)?;
    encoder.write_all(ledger)?;
    let file = encoder.finish()?;
    file.sync_data()?;
    Ok(())
}

/// Every archived event, oldest reset first. Empty if there is no archive.
pub fn read_events(archive_path: &Path) -> Result<Vec<VolleyEvent>, StoreError> {
    if !archive_path.exists() {
        return Ok(Vec::new());
    }
    let decoder = zstd::Decoder::new(File::open(archive_path)?)?;
    let mut events = Vec::new();
    for (i, line) in BufReader::new(decoder).lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let event = serde_json::from_str(&line)
            .map_err(|source| StoreError::Corrupt { line: i + 1, source })?;
        events.push(event);
    }
    Ok(events)
}
