//! Append-only operation journal with checksums
//!
//! # Binary format (per entry)
//! ```text
//! [body_len: u32]
//! [sequence: u64]
//! [payload_len: u32][payload: bytes]   // JSON-serialized Operation
//! [checksum: u32]                      // CRC32C over sequence ++ payload
//! ```
//!
//! Sequences are dense from 0; a gap or checksum mismatch on read is a
//! corruption error, not something to skip past.

use crc32c::crc32c;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ops::Operation;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("sequence error: expected {expected}, got {got}")]
    SequenceGap { expected: u64, got: u64 },

    #[error("corrupted entry at offset {offset}: {detail}")]
    Corrupted { offset: usize, detail: String },
}

// ── Journal Entry ───────────────────────────────────────────────────

/// A single persisted operation with its sequence and checksum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub sequence: u64,
    pub payload: Vec<u8>,
    pub checksum: u32,
}

impl JournalEntry {
    /// Create an entry, computing the CRC32C checksum
    pub fn new(sequence: u64, payload: Vec<u8>) -> Self {
        let checksum = Self::compute_checksum(sequence, &payload);
        Self {
            sequence,
            payload,
            checksum,
        }
    }

    /// Serialize an operation into an entry
    pub fn from_operation(sequence: u64, op: &Operation) -> Result<Self, JournalError> {
        let payload =
            serde_json::to_vec(op).map_err(|e| JournalError::Serialization(e.to_string()))?;
        Ok(Self::new(sequence, payload))
    }

    /// Decode the payload back into an operation
    pub fn operation(&self) -> Result<Operation, JournalError> {
        serde_json::from_slice(&self.payload)
            .map_err(|e| JournalError::Serialization(e.to_string()))
    }

    fn compute_checksum(sequence: u64, payload: &[u8]) -> u32 {
        let mut buf = Vec::with_capacity(8 + payload.len());
        buf.extend_from_slice(&sequence.to_le_bytes());
        buf.extend_from_slice(payload);
        crc32c(&buf)
    }

    /// Validate the stored checksum against a recomputed value
    pub fn verify_checksum(&self) -> bool {
        Self::compute_checksum(self.sequence, &self.payload) == self.checksum
    }

    /// Serialize to the binary wire format
    pub fn to_bytes(&self) -> Vec<u8> {
        let payload_len = self.payload.len() as u32;
        // body = 8 (seq) + 4 (payload_len) + payload + 4 (crc)
        let body_len: u32 = 8 + 4 + payload_len + 4;

        let mut buf = Vec::with_capacity(4 + body_len as usize);
        buf.extend_from_slice(&body_len.to_le_bytes());
        buf.extend_from_slice(&self.sequence.to_le_bytes());
        buf.extend_from_slice(&payload_len.to_le_bytes());
        buf.extend_from_slice(&self.payload);
        buf.extend_from_slice(&self.checksum.to_le_bytes());
        buf
    }

    /// Deserialize from the binary wire format
    ///
    /// Returns `(entry, bytes_consumed)`. `offset` is only used to report
    /// where in the file a corrupt entry sat.
    pub fn from_bytes(data: &[u8], offset: usize) -> Result<(Self, usize), JournalError> {
        let corrupted = |detail: &str| JournalError::Corrupted {
            offset,
            detail: detail.to_string(),
        };

        if data.len() < 4 {
            return Err(corrupted("truncated length prefix"));
        }
        let body_len = u32::from_le_bytes(data[0..4].try_into().unwrap()) as usize;
        if body_len < 16 {
            return Err(corrupted("implausibly small body"));
        }
        let total = 4 + body_len;
        if data.len() < total {
            return Err(corrupted("truncated entry body"));
        }

        let body = &data[4..total];
        let sequence = u64::from_le_bytes(body[0..8].try_into().unwrap());
        let payload_len = u32::from_le_bytes(body[8..12].try_into().unwrap()) as usize;
        if 12 + payload_len + 4 != body.len() {
            return Err(corrupted("payload length disagrees with body length"));
        }
        let payload = body[12..12 + payload_len].to_vec();
        let checksum = u32::from_le_bytes(body[12 + payload_len..].try_into().unwrap());

        let entry = Self {
            sequence,
            payload,
            checksum,
        };
        if !entry.verify_checksum() {
            return Err(corrupted("checksum mismatch"));
        }
        Ok((entry, total))
    }
}

// ── Journal Writer ──────────────────────────────────────────────────

/// Controls when buffered data is flushed and fsynced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPolicy {
    /// Flush and fsync after every append
    EveryWrite,
    /// Flush after every append, fsync every N appends
    FsyncEveryN(usize),
}

/// Configuration for the journal writer
#[derive(Debug, Clone)]
pub struct JournalConfig {
    pub path: PathBuf,
    pub sync_policy: SyncPolicy,
}

impl JournalConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sync_policy: SyncPolicy::EveryWrite,
        }
    }
}

/// Append-only journal writer with dense sequence numbering
pub struct JournalWriter {
    config: JournalConfig,
    writer: BufWriter<File>,
    next_sequence: u64,
    writes_since_fsync: usize,
}

impl JournalWriter {
    /// Open (or create) the journal, resuming after existing entries
    pub fn open(config: JournalConfig) -> Result<Self, JournalError> {
        let next_sequence = if config.path.exists() {
            let entries = JournalReader::open(&config.path)?.read_all()?;
            entries.last().map(|e| e.sequence + 1).unwrap_or(0)
        } else {
            0
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)?;

        Ok(Self {
            config,
            writer: BufWriter::new(file),
            next_sequence,
            writes_since_fsync: 0,
        })
    }

    /// The sequence the next appended operation receives
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Append one accepted operation
    pub fn append(&mut self, op: &Operation) -> Result<JournalEntry, JournalError> {
        let entry = JournalEntry::from_operation(self.next_sequence, op)?;
        self.writer.write_all(&entry.to_bytes())?;
        self.next_sequence += 1;
        self.writes_since_fsync += 1;

        self.writer.flush()?;
        let fsync = match self.config.sync_policy {
            SyncPolicy::EveryWrite => true,
            SyncPolicy::FsyncEveryN(n) => self.writes_since_fsync >= n,
        };
        if fsync {
            self.writer.get_ref().sync_all()?;
            self.writes_since_fsync = 0;
        }
        Ok(entry)
    }

    /// Force flush + fsync (used before shutdown)
    pub fn sync(&mut self) -> Result<(), JournalError> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        self.writes_since_fsync = 0;
        Ok(())
    }
}

// ── Journal Reader ──────────────────────────────────────────────────

/// Reads a journal back, verifying checksums and sequence density
pub struct JournalReader {
    data: Vec<u8>,
}

impl JournalReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, JournalError> {
        let mut data = Vec::new();
        File::open(path)?.read_to_end(&mut data)?;
        Ok(Self { data })
    }

    /// Decode every entry, failing on the first corruption or gap
    pub fn read_all(&self) -> Result<Vec<JournalEntry>, JournalError> {
        let mut entries = Vec::new();
        let mut offset = 0usize;
        let mut expected = 0u64;
        while offset < self.data.len() {
            let (entry, consumed) = JournalEntry::from_bytes(&self.data[offset..], offset)?;
            if entry.sequence != expected {
                return Err(JournalError::SequenceGap {
                    expected,
                    got: entry.sequence,
                });
            }
            expected += 1;
            offset += consumed;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Decode every entry into operations
    pub fn operations(&self) -> Result<Vec<Operation>, JournalError> {
        self.read_all()?
            .iter()
            .map(JournalEntry::operation)
            .collect()
    }
}

// ── Tests ───────────────────────────────────────────────────────────
