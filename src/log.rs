//! On-disk ledger file: one JSON event per line, append-only.

use crate::error::StoreError;
use crate::event::VolleyEvent;
use fs2::FileExt;
use notify::{RecursiveMode, Watcher};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Lines, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

/// File name of the active ledger inside a store directory.
pub const LEDGER_FILE: &str = "events.jsonl";

/// Compute xxh64 hash of raw line bytes (without trailing newline), hex-encoded.
pub fn line_hash(line: &[u8]) -> String {
    let hash = xxhash_rust::xxh64::xxh64(line, 0);
    format!("{:016x}", hash)
}

/// Position of a freshly appended line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendResult {
    pub start_offset: u64,
    pub end_offset: u64,
    pub line_hash: String,
}

/// Outcome of [`LedgerReader::wait_for_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitResult {
    /// The ledger grew past the offset; carries the new size.
    NewData(u64),
    /// The ledger is now shorter than the offset (the match was reset);
    /// carries the new size. Readers should restart from 0.
    Truncated(u64),
    /// Nothing changed before the timeout.
    Timeout,
}

/// Lock-free, read-only access to a ledger file.
///
/// Any number of readers may follow a ledger while one [`LedgerWriter`]
/// appends to it, including from other processes.
#[derive(Debug, Clone)]
pub struct LedgerReader {
    dir: PathBuf,
    log_path: PathBuf,
}

impl LedgerReader {
    /// Reader for the ledger in `dir`. Does no I/O.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let log_path = dir.join(LEDGER_FILE);
        LedgerReader { dir, log_path }
    }

    /// Returns the path to the ledger file.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Read events starting at the given byte offset.
    ///
    /// Yields `(event, next_byte_offset, line_hash)` for each complete line.
    /// Empty lines are skipped. A trailing line without newline (crash
    /// mid-write) ends the iteration.
    pub fn read_from(&self, offset: u64) -> io::Result<EventLines> {
        let mut file = File::open(&self.log_path)?;
        file.seek(SeekFrom::Start(offset))?;

        let file_len = file.metadata()?.len();
        let reader = BufReader::new(file);

        Ok(EventLines {
            lines: reader.lines(),
            pos: offset,
            file_len,
            line_no: 0,
        })
    }

    /// Current size of the ledger file; 0 if it does not exist yet.
    pub fn active_log_size(&self) -> io::Result<u64> {
        match fs::metadata(&self.log_path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e),
        }
    }

    /// Whether anything was written past `offset`.
    pub fn has_new_events(&self, offset: u64) -> io::Result<bool> {
        Ok(self.active_log_size()? > offset)
    }

    /// Read the line immediately before the given byte offset and return its hash.
    ///
    /// The offset should point to the byte after the newline of the last consumed line.
    /// Returns `None` if offset is 0 or beyond the end of the file.
    pub fn read_line_hash_before(&self, offset: u64) -> io::Result<Option<String>> {
        if offset == 0 {
            return Ok(None);
        }

        let mut file = File::open(&self.log_path)?;
        let file_len = file.metadata()?.len();

        if offset > file_len {
            return Ok(None);
        }

        // offset - 1 is the '\n' closing the line we want
        let newline_pos = offset - 1;
        let mut start = 0u64;

        if newline_pos > 0 {
            let scan_start = newline_pos.saturating_sub(8192);
            file.seek(SeekFrom::Start(scan_start))?;
            let mut buf = vec![0u8; (newline_pos - scan_start) as usize];
            file.read_exact(&mut buf)?;

            start = match buf.iter().rposition(|&b| b == b'\n') {
                Some(pos) => scan_start + pos as u64 + 1,
                None => scan_start,
            };
        }

        file.seek(SeekFrom::Start(start))?;
        let mut line_buf = vec![0u8; (newline_pos - start) as usize];
        file.read_exact(&mut line_buf)?;

        Ok(Some(line_hash(&line_buf)))
    }

    /// Block until the ledger size differs from `offset`, or `timeout` passes.
    ///
    /// Returns immediately if data past `offset` already exists. Otherwise a
    /// file-system watcher on the store directory wakes the caller, so live
    /// scoreboards follow the match without polling.
    pub fn wait_for_events(&self, offset: u64, timeout: Duration) -> io::Result<WaitResult> {
        if let Some(result) = self.compare_size(offset)? {
            return Ok(result);
        }

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            if res.is_ok() {
                let _ = tx.send(());
            }
        })
        .map_err(io::Error::other)?;
        watcher
            .watch(&self.dir, RecursiveMode::NonRecursive)
            .map_err(io::Error::other)?;

        let deadline = Instant::now() + timeout;
        loop {
            // Re-check after the watch is armed so a write racing the setup is not missed.
            if let Some(result) = self.compare_size(offset)? {
                return Ok(result);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(WaitResult::Timeout);
            }
            match rx.recv_timeout(remaining) {
                Ok(()) => continue,
                Err(RecvTimeoutError::Timeout) => return Ok(WaitResult::Timeout),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(io::Error::other("ledger watcher stopped"));
                }
            }
        }
    }

    fn compare_size(&self, offset: u64) -> io::Result<Option<WaitResult>> {
        let size = self.active_log_size()?;
        Ok(match size.cmp(&offset) {
            std::cmp::Ordering::Greater => Some(WaitResult::NewData(size)),
            std::cmp::Ordering::Less => Some(WaitResult::Truncated(size)),
            std::cmp::Ordering::Equal => None,
        })
    }
}

/// Exclusive appender for a ledger file.
///
/// Holds an advisory lock on the file for its lifetime; a second writer on
/// the same directory fails with [`io::ErrorKind::AlreadyExists`].
#[derive(Debug)]
pub struct LedgerWriter {
    reader: LedgerReader,
    file: File,
    end_offset: u64,
    last_hash: String,
}

impl LedgerWriter {
    /// Open or create the ledger in `dir` and take the writer lock.
    ///
    /// A partial trailing line left by a crash is cut off so the next append
    /// starts on a fresh line.
    pub fn open(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let reader = LedgerReader::new(dir);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(reader.log_path())?;

        if FileExt::try_lock_exclusive(&file).is_err() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!(
                    "another writer holds the lock on {}",
                    reader.log_path().display()
                ),
            ));
        }

        let (end_offset, last_hash) = scan_complete_lines(reader.log_path())?;
        let file_len = file.metadata()?.len();
        if end_offset < file_len {
            log::warn!(
                "{}: dropping {} bytes of partial trailing line",
                reader.log_path().display(),
                file_len - end_offset
            );
            file.set_len(end_offset)?;
        }

        Ok(LedgerWriter {
            reader,
            file,
            end_offset,
            last_hash,
        })
    }

    /// Append one event as a JSON line and sync it to disk.
    ///
    /// Bytes past the last complete line (left by an earlier failed write)
    /// are cut off first. If this write fails, the file is cut back to where
    /// it started, so a failed append never leaves a partial line behind.
    pub fn append(&mut self, event: &VolleyEvent) -> io::Result<AppendResult> {
        let json = serde_json::to_string(event)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let start_offset = self.end_offset;

        let file_len = self.file.metadata()?.len();
        if file_len != start_offset {
            log::warn!(
                "{}: ledger is {file_len} bytes, expected {start_offset}; cutting back",
                self.reader.log_path().display()
            );
            self.file.set_len(start_offset)?;
        }

        let written = writeln!(self.file, "{json}").and_then(|()| self.file.sync_data());
        if let Err(e) = written {
            if let Err(undo) = self.file.set_len(start_offset) {
                log::error!(
                    "{}: could not drop failed append: {undo}",
                    self.reader.log_path().display()
                );
            }
            return Err(e);
        }

        let line_hash = line_hash(json.as_bytes());
        self.end_offset = start_offset + json.len() as u64 + 1;
        self.last_hash = line_hash.clone();
        Ok(AppendResult {
            start_offset,
            end_offset: self.end_offset,
            line_hash,
        })
    }

    /// Empty the ledger file, keeping the lock.
    pub fn truncate(&mut self) -> io::Result<()> {
        self.file.set_len(0)?;
        self.file.sync_data()?;
        self.end_offset = 0;
        self.last_hash.clear();
        Ok(())
    }

    /// Cut the ledger back to a position returned by an earlier append,
    /// dropping everything written after it.
    pub(crate) fn rewind(&mut self, offset: u64, hash: String) -> io::Result<()> {
        self.end_offset = offset;
        self.last_hash = hash;
        self.file.set_len(offset)?;
        self.file.sync_data()
    }

    /// A reader over the same ledger.
    pub fn reader(&self) -> LedgerReader {
        self.reader.clone()
    }

    /// Byte offset just past the last complete line.
    pub fn end_offset(&self) -> u64 {
        self.end_offset
    }

    /// Hash of the last complete line, empty for an empty ledger.
    pub fn last_hash(&self) -> &str {
        &self.last_hash
    }
}

/// Walk the ledger and return the end of its last complete line and that
/// line's hash.
fn scan_complete_lines(path: &Path) -> io::Result<(u64, String)> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut buf = Vec::new();
    let mut end = 0u64;
    let mut hash = String::new();
    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf)?;
        if n == 0 || buf.last() != Some(&b'\n') {
            break;
        }
        end += n as u64;
        let line = &buf[..n - 1];
        if !line.is_empty() {
            hash = line_hash(line);
        }
    }
    Ok((end, hash))
}

/// Iterator returned by [`LedgerReader::read_from`].
pub struct EventLines {
    lines: Lines<BufReader<File>>,
    pos: u64,
    file_len: u64,
    line_no: usize,
}

impl Iterator for EventLines {
    type Item = Result<(VolleyEvent, u64, String), StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            let line_bytes = line.len() as u64;

            // Content running up to EOF without a newline is a partial write.
            if self.pos + line_bytes >= self.file_len {
                return None;
            }

            let next_pos = self.pos + line_bytes + 1;

            if line.is_empty() {
                self.pos = next_pos;
                continue;
            }

            let hash = line_hash(line.as_bytes());

            let event: VolleyEvent = match serde_json::from_str(&line) {
                Ok(e) => e,
                Err(source) => {
                    return Some(Err(StoreError::Corrupt {
                        line: self.line_no,
                        source,
                    }));
                }
            };

            self.pos = next_pos;
            return Some(Ok((event, next_pos, hash)));
        }
    }
}
