//! Record Store
//!
//! The public engine over one record file.
//!
//! ## Responsibilities
//! - Assign identifiers through the header
//! - Append, locate, list, find, delete and update slots
//! - Reuse a slot in place when the new payload fits in N + G
//! - Explicit compaction on request (never implicit)
//!
//! Every operation rescans the file from the first slot; nothing is cached.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Result, SlotError};
use crate::record::{check_id_prefix, Record, RecordId};
use crate::storage::{
    encode_slot, header, read_slot_header_at, ScanMode, SlotScanner, Tombstone,
};

/// Builds an empty record for the codec to decode into
type Factory<R> = Box<dyn Fn() -> R + Send>;

/// Single-file record store
///
/// ## Access Model
/// - One accessor for the file's lifetime; no internal locking
/// - The file handle is owned by the store and closed when it is dropped
/// - Wrap in [`SharedRecordStore`](crate::SharedRecordStore) to share it
pub struct RecordStore<R: Record> {
    /// Store configuration
    config: Config,

    /// Path of the data file
    path: PathBuf,

    /// Open read/write handle, held for the store's lifetime
    file: File,

    /// Produces blank records for decoding
    factory: Factory<R>,
}

/// Space accounting from one pass over the file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Slots with an active tombstone
    pub active: u64,
    /// Slots with a deleted tombstone
    pub deleted: u64,
    /// Payload bytes of active slots
    pub payload_bytes: u64,
    /// Garbage bytes trailing active slots
    pub garbage_bytes: u64,
    /// Whole-slot bytes of deleted slots, their garbage included
    pub dead_bytes: u64,
    /// File length including the header
    pub file_len: u64,
}

impl StoreStats {
    /// Bytes a compaction would give back
    pub fn reclaimable_bytes(&self) -> u64 {
        self.dead_bytes + self.garbage_bytes
    }
}

impl<R: Record + Default + 'static> RecordStore<R> {
    /// Open or create a store, using `R::default` as the record factory
    pub fn open(config: Config) -> Result<Self> {
        Self::open_with_factory(config, R::default)
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the data file at `path`.
    pub fn open_path(path: &Path) -> Result<Self> {
        let mut config = Config::default();
        if let Some(parent) = path.parent() {
            config.data_dir = parent.to_path_buf();
        }
        config.file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::open(config)
    }
}

impl<R: Record> RecordStore<R> {
    /// Open or create a store with a caller-supplied record factory
    ///
    /// On startup:
    /// 1. Create the data directory if it doesn't exist
    /// 2. Open the data file (never truncated)
    /// 3. Write a zero header if the file is shorter than one
    pub fn open_with_factory<F>(config: Config, factory: F) -> Result<Self>
    where
        F: Fn() -> R + Send + 'static,
    {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;

        let path = config.file_path();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let last_id = header::initialize(&mut file)?;
        if config.sync_writes {
            file.sync_data()?;
        }

        let file_len = file.metadata()?.len();
        info!(path = %path.display(), last_id, file_len, "record store opened");

        Ok(Self {
            config,
            path,
            file,
            factory: Box::new(factory),
        })
    }

    // =========================================================================
    // CRUD Operations
    // =========================================================================

    /// Append a record and return its identifier
    ///
    /// A record with `id() <= 0` gets the next identifier from the header,
    /// which is only advanced once the payload encodes successfully. A record
    /// that already carries an identifier keeps it; duplicates are not
    /// detected.
    pub fn insert(&mut self, record: &mut R) -> Result<RecordId> {
        let original_id = record.id();

        let payload = if original_id <= 0 {
            let id = header::peek_next(&mut self.file)?;
            record.set_id(id);

            let payload = match encode_checked(record) {
                Ok(payload) => payload,
                Err(e) => {
                    record.set_id(original_id);
                    return Err(e);
                }
            };
            header::overwrite(&mut self.file, id)?;
            payload
        } else {
            encode_checked(record)?
        };

        let address = self.append_slot(&payload)?;
        debug!(id = record.id(), address, len = payload.len(), "inserted record");

        self.after_write()?;
        Ok(record.id())
    }

    /// Address of the active slot holding `id`
    ///
    /// Reads only the identifier prefix of each payload. Deleted slots with
    /// a matching identifier are skipped.
    pub fn locate(&mut self, id: RecordId) -> Result<Option<u64>> {
        for slot in SlotScanner::new(&mut self.file, ScanMode::IdPrefix)? {
            let slot = slot?;
            if slot.is_active() && slot.id_prefix() == Some(id) {
                return Ok(Some(slot.address));
            }
        }
        Ok(None)
    }

    /// All active records in physical file order
    pub fn list(&mut self) -> Result<Vec<R>> {
        let mut records = Vec::new();

        for slot in SlotScanner::new(&mut self.file, ScanMode::Payload)? {
            let slot = slot?;
            if !slot.is_active() {
                continue;
            }
            if let Some(payload) = slot.into_payload() {
                records.push(decode_with(&self.factory, &payload)?);
            }
        }

        Ok(records)
    }

    /// Decode the active record with identifier `id`
    pub fn find(&mut self, id: RecordId) -> Result<Option<R>> {
        for slot in SlotScanner::new(&mut self.file, ScanMode::Payload)? {
            let slot = slot?;
            if !slot.is_active() {
                continue;
            }
            if let Some(payload) = slot.into_payload() {
                let record = decode_with(&self.factory, &payload)?;
                if record.id() == id {
                    return Ok(Some(record));
                }
            }
        }
        Ok(None)
    }

    /// Mark the slot holding `id` as deleted
    ///
    /// Only the tombstone byte changes; lengths and payload stay on disk.
    /// Returns `false` if no active slot holds `id`.
    pub fn delete(&mut self, id: RecordId) -> Result<bool> {
        let mut found = None;

        for slot in SlotScanner::new(&mut self.file, ScanMode::Payload)? {
            let slot = slot?;
            if !slot.is_active() {
                continue;
            }
            let address = slot.address;
            if let Some(payload) = slot.into_payload() {
                if decode_with(&self.factory, &payload)?.id() == id {
                    found = Some(address);
                    break;
                }
            }
        }

        let Some(address) = found else {
            return Ok(false);
        };

        self.mark_deleted(address)?;
        debug!(id, address, "deleted record");

        self.after_write()?;
        Ok(true)
    }

    /// Rewrite a stored record
    ///
    /// If the new payload fits in the old slot's N + G it is written at the
    /// same address and the remainder becomes garbage. Otherwise the record
    /// is appended at the end of the file and the old slot is tombstoned.
    /// The append happens before the tombstone write, so an interrupted
    /// relocation leaves two active copies rather than none.
    /// Returns `false` if `record` has no identifier or is not stored.
    pub fn update(&mut self, record: &R) -> Result<bool> {
        let id = record.id();
        if id <= 0 {
            return Ok(false);
        }

        let Some(address) = self.locate(id)? else {
            return Ok(false);
        };

        let payload = encode_checked(record)?;
        let file_len = self.file_len()?;
        let current = read_slot_header_at(&mut self.file, address, file_len)?;
        let available = current.available();
        let new_len = payload.len() as u64;

        if available >= new_len {
            let garbage_len = available - new_len;
            self.write_slot_at(address, &payload, garbage_len)?;
            debug!(id, address, new_len, garbage_len, "updated record in place");
        } else {
            // New slot first; the old one stays active until the copy is written.
            let new_address = self.append_slot(&payload)?;
            self.mark_deleted(address)?;
            debug!(
                id,
                old_address = address,
                new_address,
                new_len,
                available,
                "relocated record"
            );
        }

        self.after_write()?;
        Ok(true)
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Count slots and wasted space in one prefix-only pass
    pub fn stats(&mut self) -> Result<StoreStats> {
        let mut stats = StoreStats::default();

        for slot in SlotScanner::new(&mut self.file, ScanMode::IdPrefix)? {
            let header = slot?.header;
            if header.is_active() {
                stats.active += 1;
                stats.payload_bytes += header.payload_len as u64;
                stats.garbage_bytes += header.garbage_len as u64;
            } else {
                stats.deleted += 1;
                stats.dead_bytes += header.slot_len();
            }
        }

        stats.file_len = self.file_len()?;
        Ok(stats)
    }

    /// Rewrite the file keeping only active slots, without garbage
    ///
    /// Slot order, payload bytes and the header are preserved, so addresses
    /// change but identifiers and `list` order do not. The new file is built
    /// next to the old one and renamed over it. Returns the bytes reclaimed.
    pub fn compact(&mut self) -> Result<u64> {
        let old_len = self.file_len()?;
        let tmp_path = self
            .config
            .data_dir
            .join(format!("{}.compact", self.config.file_name));

        let compacted = match self.write_compacted(&tmp_path) {
            Ok(file) => file,
            Err(e) => {
                remove_leftover(&tmp_path);
                return Err(e);
            }
        };

        // The handle follows the inode through the rename, so nothing can
        // fail between replacing the file and swapping the handle.
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            drop(compacted);
            remove_leftover(&tmp_path);
            return Err(e.into());
        }
        self.file = compacted;

        let new_len = self.file_len()?;
        let reclaimed = old_len.saturating_sub(new_len);
        info!(path = %self.path.display(), old_len, new_len, reclaimed, "compacted record file");

        Ok(reclaimed)
    }

    /// Force file contents to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_data()?;
        Ok(())
    }

    /// Close the store gracefully
    ///
    /// Syncs to disk; the handle is released when `self` drops.
    pub fn close(mut self) -> Result<()> {
        self.sync()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Last identifier issued by the header
    pub fn last_assigned_id(&mut self) -> Result<RecordId> {
        header::peek(&mut self.file)
    }

    /// Current file length in bytes
    pub fn file_len(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    /// Path of the data file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Write an active slot with no garbage at the end of the file
    fn append_slot(&mut self, payload: &[u8]) -> Result<u64> {
        let address = self.file.seek(SeekFrom::End(0))?;
        self.write_slot_at(address, payload, 0)?;
        Ok(address)
    }

    fn write_slot_at(&mut self, address: u64, payload: &[u8], garbage_len: u64) -> Result<()> {
        let slot = encode_slot(Tombstone::Active, payload, garbage_len)?;
        self.file.seek(SeekFrom::Start(address))?;
        self.file.write_all(&slot)?;
        Ok(())
    }

    fn mark_deleted(&mut self, address: u64) -> Result<()> {
        self.file.seek(SeekFrom::Start(address))?;
        self.file.write_all(&[Tombstone::Deleted.as_byte()])?;
        Ok(())
    }

    fn after_write(&mut self) -> Result<()> {
        if self.config.sync_writes {
            self.file.sync_data()?;
        }
        Ok(())
    }

    /// Build the compacted copy and return a read/write handle to it
    fn write_compacted(&mut self, tmp_path: &Path) -> Result<File> {
        let last_id = header::peek(&mut self.file)?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(tmp_path)?;
        let mut out = BufWriter::new(file);
        header::overwrite(&mut out, last_id)?;

        for slot in SlotScanner::new(&mut self.file, ScanMode::Payload)? {
            let slot = slot?;
            if !slot.is_active() {
                continue;
            }
            if let Some(payload) = slot.into_payload() {
                out.write_all(&encode_slot(Tombstone::Active, &payload, 0)?)?;
            }
        }

        let file = out
            .into_inner()
            .map_err(|e| SlotError::Io(e.into_error()))?;
        file.sync_all()?;
        Ok(file)
    }
}

impl<R: Record> fmt::Debug for RecordStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("path", &self.path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Encode and enforce the identifier prefix contract
fn encode_checked<R: Record>(record: &R) -> Result<Vec<u8>> {
    let payload = record.encode()?;
    check_id_prefix(record.id(), &payload)?;
    Ok(payload)
}

/// Best-effort removal of a compaction temp file
fn remove_leftover(tmp_path: &Path) {
    match fs::remove_file(tmp_path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            warn!(path = %tmp_path.display(), error = %e, "failed to remove compaction temp file");
        }
    }
}

fn decode_with<R: Record>(factory: &Factory<R>, payload: &[u8]) -> Result<R> {
    let mut record = factory();
    record.decode(payload)?;
    Ok(record)
}
