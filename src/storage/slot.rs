//! Slot Format
//!
//! Encoding of a single slot and the header-only read used by updates.

use std::io::{Read, Seek, SeekFrom};

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Result, SlotError};

use super::{LEN_SIZE, SLOT_OVERHEAD, TOMBSTONE_SIZE};

/// Liveness marker at the start of every slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tombstone {
    /// Slot holds a live record (`' '`)
    Active = 0x20,
    /// Slot was deleted or relocated (`'*'`)
    Deleted = 0x2A,
}

impl Tombstone {
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Decode a tombstone byte read at `offset`
    pub fn from_byte(byte: u8, offset: u64) -> Result<Self> {
        match byte {
            0x20 => Ok(Tombstone::Active),
            0x2A => Ok(Tombstone::Deleted),
            other => Err(SlotError::corruption(
                offset,
                format!("unknown tombstone byte 0x{:02X}", other),
            )),
        }
    }
}

/// Fixed-width fields of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotHeader {
    pub tombstone: Tombstone,
    /// Payload length N
    pub payload_len: u32,
    /// Unused bytes after the garbage length field, G
    pub garbage_len: u32,
}

impl SlotHeader {
    pub fn is_active(&self) -> bool {
        self.tombstone == Tombstone::Active
    }

    /// Bytes usable by a rewrite that keeps the slot start: N + G
    pub fn available(&self) -> u64 {
        self.payload_len as u64 + self.garbage_len as u64
    }

    /// Total bytes occupied on disk: 1 + 4 + N + 4 + G
    pub fn slot_len(&self) -> u64 {
        SLOT_OVERHEAD + self.available()
    }
}

/// Lay out a slot: tombstone, N, payload, G
///
/// The G garbage bytes themselves are not part of the buffer; whatever
/// already sits on disk after the garbage length field stays there.
pub fn encode_slot(tombstone: Tombstone, payload: &[u8], garbage_len: u64) -> Result<BytesMut> {
    let payload_len = len_field(payload.len() as u64, "payload")?;
    let garbage_len = len_field(garbage_len, "garbage")?;

    let mut buf = BytesMut::with_capacity(SLOT_OVERHEAD as usize + payload.len());
    buf.put_u8(tombstone.as_byte());
    buf.put_i32(payload_len);
    buf.put_slice(payload);
    buf.put_i32(garbage_len);
    Ok(buf)
}

/// Read the header of the slot at `address` without loading its payload
///
/// `file_len` bounds every length so a corrupt slot fails instead of
/// reading past the end of the file.
pub fn read_slot_header_at<F: Read + Seek>(
    file: &mut F,
    address: u64,
    file_len: u64,
) -> Result<SlotHeader> {
    let head_end = address + TOMBSTONE_SIZE + LEN_SIZE;
    if head_end > file_len {
        return Err(SlotError::corruption(address, "truncated slot header"));
    }

    let mut head = [0u8; (TOMBSTONE_SIZE + LEN_SIZE) as usize];
    file.seek(SeekFrom::Start(address))?;
    file.read_exact(&mut head)?;

    let mut buf = &head[..];
    let tombstone = Tombstone::from_byte(buf.get_u8(), address)?;
    let payload_len = decode_len(buf.get_i32(), address, "payload")?;

    let garbage_field = head_end + payload_len as u64;
    check_within(address, garbage_field + LEN_SIZE, file_len, "payload")?;

    let mut field = [0u8; LEN_SIZE as usize];
    file.seek(SeekFrom::Start(garbage_field))?;
    file.read_exact(&mut field)?;
    let garbage_len = decode_len(i32::from_be_bytes(field), address, "garbage")?;

    let header = SlotHeader {
        tombstone,
        payload_len,
        garbage_len,
    };
    check_within(address, address + header.slot_len(), file_len, "garbage")?;

    Ok(header)
}

// =============================================================================
// Length Helpers (shared with the scanner)
// =============================================================================

/// Convert an on-disk length field, rejecting negatives
pub(super) fn decode_len(raw: i32, address: u64, what: &str) -> Result<u32> {
    u32::try_from(raw).map_err(|_| {
        SlotError::corruption(address, format!("negative {} length {}", what, raw))
    })
}

/// Fail if a slot region ending at `end` runs past `file_len`
pub(super) fn check_within(address: u64, end: u64, file_len: u64, what: &str) -> Result<()> {
    if end > file_len {
        return Err(SlotError::corruption(
            address,
            format!(
                "{} length runs past end of file ({} > {})",
                what, end, file_len
            ),
        ));
    }
    Ok(())
}

fn len_field(len: u64, what: &str) -> Result<i32> {
    i32::try_from(len)
        .map_err(|_| SlotError::Codec(format!("{} of {} bytes does not fit a slot", what, len)))
}
