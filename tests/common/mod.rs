//! Shared fixtures for integration tests

#![allow(dead_code)]

use slotfile::record::{id_prefix, read_id_prefix, ID_PREFIX_LEN};
use slotfile::{Config, Record, RecordId, RecordStore, SlotError};
use tempfile::TempDir;

// =============================================================================
// Test Record
// =============================================================================

/// Identifier prefix followed by the raw UTF-8 name, so payload length is
/// always `4 + name.len()`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    pub id: RecordId,
    pub name: String,
}

impl Item {
    pub fn new(name: &str) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
        }
    }

    pub fn with_id(id: RecordId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

impl Record for Item {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn encode(&self) -> slotfile::Result<Vec<u8>> {
        let mut bytes = id_prefix(self.id).to_vec();
        bytes.extend_from_slice(self.name.as_bytes());
        Ok(bytes)
    }

    fn decode(&mut self, bytes: &[u8]) -> slotfile::Result<()> {
        self.id = read_id_prefix(bytes).ok_or_else(|| SlotError::Codec("short payload".into()))?;
        self.name = String::from_utf8(bytes[ID_PREFIX_LEN..].to_vec())
            .map_err(|e| SlotError::Codec(e.to_string()))?;
        Ok(())
    }
}

/// Codec that breaks the identifier-first contract
#[derive(Debug, Clone, Default)]
pub struct Misplaced {
    pub id: RecordId,
}

impl Record for Misplaced {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn encode(&self) -> slotfile::Result<Vec<u8>> {
        let mut bytes = vec![0xFF];
        bytes.extend_from_slice(&id_prefix(self.id));
        Ok(bytes)
    }

    fn decode(&mut self, bytes: &[u8]) -> slotfile::Result<()> {
        self.id = read_id_prefix(&bytes[1..]).unwrap_or_default();
        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

pub fn test_config(temp_dir: &TempDir) -> Config {
    Config::builder()
        .data_dir(temp_dir.path())
        .file_name("items.db")
        .build()
}

pub fn setup_temp_store() -> (TempDir, RecordStore<Item>) {
    let temp_dir = TempDir::new().unwrap();
    let store = RecordStore::open(test_config(&temp_dir)).unwrap();
    (temp_dir, store)
}

pub fn reopen(temp_dir: &TempDir) -> RecordStore<Item> {
    RecordStore::open(test_config(temp_dir)).unwrap()
}

/// Size of a slot holding an `Item` with this name and no garbage
pub fn slot_size(name: &str) -> u64 {
    9 + 4 + name.len() as u64
}
