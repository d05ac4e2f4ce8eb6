//! # slotfile
//!
//! A single-file, variable-length record store with:
//! - Monotonic identifiers kept in a 4-byte file header
//! - Tombstoned slots (logical deletion, no data erased)
//! - In-place update when the new payload fits, relocation otherwise
//! - Reuse of garbage left behind by shrinking updates
//! - Explicit, caller-triggered compaction
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 SharedRecordStore (optional)                 │
//! │                  (Single-Writer Mutex)                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      RecordStore                             │
//! │     insert / locate / list / find / delete / update          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼─────────────────────┐
//!          │            │                     │
//!          ▼            ▼                     ▼
//!   ┌─────────────┐ ┌─────────────┐   ┌─────────────┐
//!   │   Header    │ │ SlotScanner │   │   Record    │
//!   │ (last id)   │ │ (fwd scan)  │   │   (codec)   │
//!   └─────────────┘ └─────────────┘   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod storage;
pub mod store;
pub mod shared;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SlotError, Result};
pub use config::Config;
pub use record::{Record, RecordId};
pub use store::{RecordStore, StoreStats};
pub use shared::SharedRecordStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of slotfile
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
