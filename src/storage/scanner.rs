//! Slot Scanner
//!
//! Forward-only iteration over the slot region, from the end of the header
//! to the end of the file.

use std::io::{BufReader, Read, Seek, SeekFrom};

use bytes::Buf;
use tracing::warn;

use crate::error::{Result, SlotError};
use crate::record::{read_id_prefix, RecordId, ID_PREFIX_LEN};

use super::slot::{check_within, decode_len};
use super::{SlotHeader, Tombstone, HEADER_SIZE, LEN_SIZE, TOMBSTONE_SIZE};

/// How much of each payload the scanner reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Only the leading identifier bytes; the rest is skipped
    IdPrefix,
    /// The whole payload
    Payload,
}

/// What the scanner read from a slot's payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotBody {
    /// `None` if the payload is shorter than the identifier prefix
    IdPrefix(Option<RecordId>),
    Payload(Vec<u8>),
}

/// One slot as seen by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedSlot {
    /// File offset of the tombstone byte
    pub address: u64,
    pub header: SlotHeader,
    pub body: SlotBody,
}

impl ScannedSlot {
    pub fn is_active(&self) -> bool {
        self.header.is_active()
    }

    /// Identifier prefix of the payload, whichever mode produced it
    pub fn id_prefix(&self) -> Option<RecordId> {
        match &self.body {
            SlotBody::IdPrefix(id) => *id,
            SlotBody::Payload(payload) => read_id_prefix(payload),
        }
    }

    /// Full payload, `None` for slots scanned in [`ScanMode::IdPrefix`]
    pub fn into_payload(self) -> Option<Vec<u8>> {
        match self.body {
            SlotBody::Payload(payload) => Some(payload),
            SlotBody::IdPrefix(_) => None,
        }
    }
}

/// Iterator over every slot in a record file, in physical order
///
/// Each call reads the tombstone and payload length, then the payload (or
/// its prefix), then the garbage length, and skips the garbage. A length
/// that runs past the end of the file yields `Corruption` and ends the scan.
pub struct SlotScanner<'a, F: Read + Seek> {
    reader: BufReader<&'a mut F>,
    mode: ScanMode,
    /// Offset of the next slot
    position: u64,
    /// File length captured when the scan started
    end: u64,
    failed: bool,
}

impl<'a, F: Read + Seek> SlotScanner<'a, F> {
    /// Start a scan at the first slot
    pub fn new(file: &'a mut F, mode: ScanMode) -> Result<Self> {
        let end = file.seek(SeekFrom::End(0))?;
        file.seek(SeekFrom::Start(HEADER_SIZE))?;

        Ok(Self {
            reader: BufReader::new(file),
            mode,
            position: HEADER_SIZE,
            end,
            failed: false,
        })
    }

    fn read_slot(&mut self) -> Result<ScannedSlot> {
        let address = self.position;

        check_within(address, address + TOMBSTONE_SIZE + LEN_SIZE, self.end, "slot header")?;
        let mut head = [0u8; (TOMBSTONE_SIZE + LEN_SIZE) as usize];
        self.reader.read_exact(&mut head)?;

        let mut buf = &head[..];
        let tombstone = Tombstone::from_byte(buf.get_u8(), address)?;
        let payload_len = decode_len(buf.get_i32(), address, "payload")?;

        let garbage_field = address + TOMBSTONE_SIZE + LEN_SIZE + payload_len as u64;
        check_within(address, garbage_field + LEN_SIZE, self.end, "payload")?;

        let body = match self.mode {
            ScanMode::IdPrefix if payload_len as usize >= ID_PREFIX_LEN => {
                let mut prefix = [0u8; ID_PREFIX_LEN];
                self.reader.read_exact(&mut prefix)?;
                self.reader
                    .seek_relative(payload_len as i64 - ID_PREFIX_LEN as i64)?;
                SlotBody::IdPrefix(Some(RecordId::from_be_bytes(prefix)))
            }
            ScanMode::IdPrefix => {
                self.reader.seek_relative(payload_len as i64)?;
                SlotBody::IdPrefix(None)
            }
            ScanMode::Payload => {
                let mut payload = vec![0u8; payload_len as usize];
                self.reader.read_exact(&mut payload)?;
                SlotBody::Payload(payload)
            }
        };

        let mut field = [0u8; LEN_SIZE as usize];
        self.reader.read_exact(&mut field)?;
        let garbage_len = decode_len(i32::from_be_bytes(field), address, "garbage")?;

        let header = SlotHeader {
            tombstone,
            payload_len,
            garbage_len,
        };
        let next = address + header.slot_len();
        check_within(address, next, self.end, "garbage")?;
        self.reader.seek_relative(garbage_len as i64)?;

        self.position = next;

        Ok(ScannedSlot {
            address,
            header,
            body,
        })
    }
}

impl<'a, F: Read + Seek> Iterator for SlotScanner<'a, F> {
    type Item = Result<ScannedSlot>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.position >= self.end {
            return None;
        }

        match self.read_slot() {
            Ok(slot) => Some(Ok(slot)),
            Err(e) => {
                self.failed = true;
                if let SlotError::Corruption { offset, reason } = &e {
                    warn!(offset, reason = %reason, "corrupt slot, stopping scan");
                }
                Some(Err(e))
            }
        }
    }
}
