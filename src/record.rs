//! Record Codec Contract
//!
//! The store never looks inside a payload except for its first four bytes.
//! Every storable type implements [`Record`] and must encode its identifier
//! first, as a big-endian `i32`:
//!
//! ```text
//! ┌──────────────┬───────────────────────────────┐
//! │ Id (4, BE)   │ Codec-defined body            │
//! └──────────────┴───────────────────────────────┘
//! ```
//!
//! The offset-locating scan reads that prefix directly instead of decoding,
//! and the store rejects any payload whose prefix does not match the
//! record's identifier before writing it.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, SlotError};

/// Record identifier. Values `<= 0` mean "not yet assigned".
pub type RecordId = i32;

/// Width of the identifier prefix every payload starts with
pub const ID_PREFIX_LEN: usize = 4;

/// Capability required of any type persisted in a [`RecordStore`](crate::RecordStore)
pub trait Record {
    /// Current identifier (`<= 0` until the store assigns one)
    fn id(&self) -> RecordId;

    /// Overwrite the identifier
    fn set_id(&mut self, id: RecordId);

    /// Encode into an opaque byte sequence starting with [`id_prefix`]
    fn encode(&self) -> Result<Vec<u8>>;

    /// Fill `self` from bytes produced by [`Record::encode`]
    fn decode(&mut self, bytes: &[u8]) -> Result<()>;
}

/// Encoded identifier prefix for `id`
pub fn id_prefix(id: RecordId) -> [u8; ID_PREFIX_LEN] {
    id.to_be_bytes()
}

/// Read the identifier prefix of a payload, `None` if it is too short
pub fn read_id_prefix(payload: &[u8]) -> Option<RecordId> {
    let prefix: [u8; ID_PREFIX_LEN] = payload.get(..ID_PREFIX_LEN)?.try_into().ok()?;
    Some(RecordId::from_be_bytes(prefix))
}

/// Verify that `payload` leads with `id`
pub(crate) fn check_id_prefix(id: RecordId, payload: &[u8]) -> Result<()> {
    match read_id_prefix(payload) {
        Some(found) if found == id => Ok(()),
        Some(found) => Err(SlotError::Codec(format!(
            "payload leads with identifier {} but record has {}",
            found, id
        ))),
        None => Err(SlotError::Codec(format!(
            "payload of {} bytes cannot hold the identifier prefix",
            payload.len()
        ))),
    }
}

// =============================================================================
// Bincode Helper Codec
// =============================================================================

/// Encode `body` with bincode behind the identifier prefix
///
/// Lets a record implement [`Record::encode`] as
/// `encode_with_id(self.id, &(&self.title, &self.body))`.
pub fn encode_with_id<T: Serialize + ?Sized>(id: RecordId, body: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(ID_PREFIX_LEN + 32);
    buf.extend_from_slice(&id_prefix(id));
    bincode::serialize_into(&mut buf, body)?;
    Ok(buf)
}

/// Inverse of [`encode_with_id`]
pub fn decode_with_id<T: DeserializeOwned>(bytes: &[u8]) -> Result<(RecordId, T)> {
    let id = read_id_prefix(bytes).ok_or_else(|| {
        SlotError::Codec(format!(
            "payload of {} bytes cannot hold the identifier prefix",
            bytes.len()
        ))
    })?;
    let body = bincode::deserialize(&bytes[ID_PREFIX_LEN..])?;
    Ok((id, body))
}
