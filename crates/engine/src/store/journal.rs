use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use docket_common::protocol::Operation;
use docket_common::types::Scope;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::any::AnyDocument;
use crate::document::DocumentHeader;

const FRAME_HEADER_BYTES: usize = 8;
const MAX_RECORD_BYTES: usize = 16 << 20;
const JOURNAL_EXTENSION: &str = "journal";

/// One journal entry. A journal starts with `Created` and continues with
/// one `Applied` per operation, in application order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum JournalRecord {
    Created {
        header: DocumentHeader,
        #[serde(rename = "initialState")]
        initial_state: Value,
    },
    Applied {
        scope: Scope,
        operation: Operation,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalReplaySummary {
    pub records: usize,
    pub truncated: bool,
    pub checksum_failed: bool,
}

/// Per-document append-only journal:
/// [len:u32 little-endian][checksum:u32 little-endian][payload:len bytes]
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create journal directory `{}`", parent.display())
            })?;
        }
        open_append(&path)
            .with_context(|| format!("failed to open journal file `{}`", path.display()))?;
        Ok(Self { path })
    }

    pub fn for_document(base_dir: impl AsRef<Path>, document_id: Uuid) -> Result<Self> {
        Self::open(base_dir.as_ref().join(format!("{document_id}.{JOURNAL_EXTENSION}")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &JournalRecord) -> Result<()> {
        let payload = serde_json::to_vec(record).context("failed to encode journal record")?;
        let len = u32::try_from(payload.len()).context("journal record exceeds u32::MAX")?;
        let mut frame = Vec::with_capacity(FRAME_HEADER_BYTES + payload.len());
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(&checksum(&payload).to_le_bytes());
        frame.extend_from_slice(&payload);

        let mut file = open_append(&self.path).with_context(|| {
            format!("failed to open journal file `{}` for append", self.path.display())
        })?;
        file.write_all(&frame).context("failed to write journal frame")?;
        file.sync_data().context("failed to fsync journal file")?;
        debug!(path = %self.path.display(), bytes = frame.len(), "journal record appended");
        Ok(())
    }

    /// Replay records in order. A torn or corrupt frame ends the journal:
    /// replay stops there and the file is truncated to the last good frame.
    pub fn replay<F>(&self, mut on_record: F) -> Result<JournalReplaySummary>
    where
        F: FnMut(JournalRecord) -> Result<()>,
    {
        let mut file = OpenOptions::new().read(true).open(&self.path).with_context(|| {
            format!("failed to open journal file `{}` for replay", self.path.display())
        })?;

        let mut records = 0usize;
        let mut truncate_to = None;
        let mut checksum_failed = false;
        loop {
            let frame_offset =
                file.stream_position().context("failed to read journal stream position")?;
            let mut header = [0u8; FRAME_HEADER_BYTES];
            let bytes_read = file.read(&mut header).context("failed reading journal frame header")?;
            if bytes_read == 0 {
                break;
            }
            if bytes_read < FRAME_HEADER_BYTES
                && file.read_exact(&mut header[bytes_read..]).is_err()
            {
                truncate_to = Some(frame_offset);
                break;
            }

            let [l0, l1, l2, l3, c0, c1, c2, c3] = header;
            let len = u32::from_le_bytes([l0, l1, l2, l3]) as usize;
            let expected_checksum = u32::from_le_bytes([c0, c1, c2, c3]);
            if len > MAX_RECORD_BYTES {
                truncate_to = Some(frame_offset);
                break;
            }

            let mut payload = vec![0u8; len];
            if file.read_exact(&mut payload).is_err() {
                truncate_to = Some(frame_offset);
                break;
            }
            if checksum(&payload) != expected_checksum {
                truncate_to = Some(frame_offset);
                checksum_failed = true;
                break;
            }

            let record = match serde_json::from_slice::<JournalRecord>(&payload) {
                Ok(record) => record,
                Err(error) => {
                    warn!(%error, offset = frame_offset, "undecodable journal record");
                    truncate_to = Some(frame_offset);
                    checksum_failed = true;
                    break;
                }
            };
            on_record(record).context("failed to apply journal record")?;
            records = records.saturating_add(1);
        }

        drop(file);
        if let Some(offset) = truncate_to {
            warn!(path = %self.path.display(), offset, "truncating journal tail");
            truncate(&self.path, offset)?;
        }

        Ok(JournalReplaySummary { records, truncated: truncate_to.is_some(), checksum_failed })
    }

    /// Rebuild the document recorded in this journal. `None` for an empty journal.
    pub fn load(&self) -> Result<Option<(AnyDocument, JournalReplaySummary)>> {
        let mut document: Option<AnyDocument> = None;
        let summary = self.replay(|record| {
            document = Some(match (document.take(), record) {
                (None, JournalRecord::Created { header, initial_state }) => {
                    AnyDocument::restore(&header, initial_state)?
                }
                (Some(current), JournalRecord::Applied { scope, operation }) => {
                    current.apply_operation(scope, &operation).with_context(|| {
                        format!("failed to apply {scope} operation {}", operation.index)
                    })?
                }
                (None, JournalRecord::Applied { .. }) => {
                    bail!("journal does not start with a Created record")
                }
                (Some(current), JournalRecord::Created { .. }) => {
                    bail!("journal for {} has a second Created record", current.id())
                }
            });
            Ok(())
        })?;
        Ok(document.map(|document| (document, summary)))
    }
}

/// Journal files directly under `base_dir`, sorted by path.
pub fn journal_paths(base_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let base_dir = base_dir.as_ref();
    if !base_dir.exists() {
        return Ok(Vec::new());
    }
    let mut paths = fs::read_dir(base_dir)
        .with_context(|| format!("failed to list journal directory `{}`", base_dir.display()))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == JOURNAL_EXTENSION))
        .collect::<Vec<_>>();
    paths.sort();
    Ok(paths)
}

fn open_append(path: &Path) -> std::io::Result<fs::File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn checksum(payload: &[u8]) -> u32 {
    // FNV-1a 32-bit.
    let mut hash = 0x811c9dc5u32;
    for byte in payload {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

fn truncate(path: &Path, offset: u64) -> Result<()> {
    let file = OpenOptions::new().write(true).open(path).with_context(|| {
        format!("failed to open journal file `{}` for truncation", path.display())
    })?;
    file.set_len(offset).with_context(|| {
        format!("failed to truncate journal file `{}` to {offset}", path.display())
    })?;
    file.sync_data()
        .with_context(|| format!("failed to fsync truncated journal `{}`", path.display()))?;
    Ok(())
}
