//! Storage Module
//!
//! On-disk layout of a record file and the primitives that read and write it.
//!
//! ## Responsibilities
//! - Own the fixed-size header (last assigned identifier)
//! - Encode and decode slot headers
//! - Walk the slot region forward, bounds-checking every length
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (4 bytes)                                        │
//! │   LastAssignedId: i32 BE                                │
//! ├─────────────────────────────────────────────────────────┤
//! │ Slot (variable)                                         │
//! │   Tombstone (1) | PayloadLen N: i32 BE (4) | Payload (N)│
//! │   GarbageLen G: i32 BE (4) | Garbage (G)                │
//! │   Tombstone: 0x20 = active, 0x2A = deleted              │
//! ├─────────────────────────────────────────────────────────┤
//! │ ... slots packed back to back until end of file ...     │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod header;
mod scanner;
mod slot;

pub use scanner::{ScanMode, ScannedSlot, SlotBody, SlotScanner};
pub use slot::{encode_slot, read_slot_header_at, SlotHeader, Tombstone};

// =============================================================================
// Shared Constants (used by header, slot, scanner)
// =============================================================================

/// Header size: LastAssignedId (4) = 4 bytes. Slots start right after it.
pub const HEADER_SIZE: u64 = 4;

/// Tombstone marker width
pub const TOMBSTONE_SIZE: u64 = 1;

/// Width of the payload and garbage length fields
pub const LEN_SIZE: u64 = 4;

/// Fixed bytes of every slot: Tombstone (1) + PayloadLen (4) + GarbageLen (4)
pub const SLOT_OVERHEAD: u64 = TOMBSTONE_SIZE + 2 * LEN_SIZE;
