//! Header Manager
//!
//! Reads and writes the last assigned identifier at offset 0.
//!
//! Works on any `Read + Write + Seek` handle so the compactor can write a
//! header into a fresh file the same way the store does.

use std::io::{Read, Seek, SeekFrom, Write};

use tracing::debug;

use crate::error::{Result, SlotError};
use crate::record::RecordId;

use super::HEADER_SIZE;

/// Write a zero header if the file is too short to hold one
///
/// Returns the identifier stored in the header afterwards.
pub fn initialize<F: Read + Write + Seek>(file: &mut F) -> Result<RecordId> {
    let len = file.seek(SeekFrom::End(0))?;

    if len < HEADER_SIZE {
        debug!(len, "writing fresh header");
        overwrite(file, 0)?;
        return Ok(0);
    }

    peek(file)
}

/// Read the last assigned identifier
pub fn peek<F: Read + Seek>(file: &mut F) -> Result<RecordId> {
    let mut buf = [0u8; HEADER_SIZE as usize];
    file.seek(SeekFrom::Start(0))?;
    file.read_exact(&mut buf)?;

    let last_id = RecordId::from_be_bytes(buf);
    if last_id < 0 {
        return Err(SlotError::corruption(
            0,
            format!("negative last assigned identifier {}", last_id),
        ));
    }

    Ok(last_id)
}

/// Replace the last assigned identifier
pub fn overwrite<F: Write + Seek>(file: &mut F, last_id: RecordId) -> Result<()> {
    file.seek(SeekFrom::Start(0))?;
    file.write_all(&last_id.to_be_bytes())?;
    Ok(())
}

/// Identifier the next call to [`next_id`] would issue, without issuing it
pub fn peek_next<F: Read + Seek>(file: &mut F) -> Result<RecordId> {
    peek(file)?.checked_add(1).ok_or(SlotError::IdExhausted)
}

/// Issue a new identifier: read, increment, write back
///
/// Not atomic across processes; the store assumes a single writer.
pub fn next_id<F: Read + Write + Seek>(file: &mut F) -> Result<RecordId> {
    let id = peek_next(file)?;
    overwrite(file, id)?;
    Ok(id)
}
