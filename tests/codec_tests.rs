//! Tests for the bincode helper codec
//!
//! These tests verify:
//! - Serde-derived records round-trip through the store
//! - The helper always leads with the identifier, so locate works
//! - Decode failures surface as errors

mod common;

use serde::{Deserialize, Serialize};
use slotfile::record::{decode_with_id, encode_with_id};
use slotfile::{Record, RecordId, RecordStore, SlotError};
use tempfile::TempDir;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Contact {
    #[serde(skip)]
    id: RecordId,
    name: String,
    phones: Vec<String>,
    age: u8,
}

impl Record for Contact {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn encode(&self) -> slotfile::Result<Vec<u8>> {
        encode_with_id(self.id, self)
    }

    fn decode(&mut self, bytes: &[u8]) -> slotfile::Result<()> {
        let (id, contact): (RecordId, Contact) = decode_with_id(bytes)?;
        *self = Contact { id, ..contact };
        Ok(())
    }
}

fn contact(name: &str, phones: &[&str]) -> Contact {
    Contact {
        id: 0,
        name: name.to_string(),
        phones: phones.iter().map(|p| p.to_string()).collect(),
        age: 30,
    }
}

#[test]
fn test_serde_record_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let mut store: RecordStore<Contact> =
        RecordStore::open(common::test_config(&temp_dir)).unwrap();

    let mut ana = contact("Ana", &["555-0100"]);
    let mut bruno = contact("Bruno", &[]);
    store.insert(&mut ana).unwrap();
    store.insert(&mut bruno).unwrap();

    assert_eq!(store.find(1).unwrap(), Some(ana.clone()));
    assert_eq!(store.list().unwrap(), vec![ana, bruno]);
}

#[test]
fn test_serde_record_update_paths() {
    let temp_dir = TempDir::new().unwrap();
    let mut store: RecordStore<Contact> =
        RecordStore::open(common::test_config(&temp_dir)).unwrap();

    let mut ana = contact("Ana", &["555-0100", "555-0101"]);
    store.insert(&mut ana).unwrap();
    store.insert(&mut contact("Bruno", &[])).unwrap();

    ana.phones.pop();
    assert!(store.update(&ana).unwrap());
    assert_eq!(store.locate(1).unwrap(), Some(4));

    ana.phones = vec!["1".repeat(40)];
    assert!(store.update(&ana).unwrap());
    assert_ne!(store.locate(1).unwrap(), Some(4));
    assert_eq!(store.find(1).unwrap(), Some(ana));
}

#[test]
fn test_helper_rejects_short_payload() {
    let result: slotfile::Result<(RecordId, String)> = decode_with_id(&[0, 1]);

    assert!(matches!(result, Err(SlotError::Codec(_))));
}

#[test]
fn test_helper_reports_bad_body() {
    let result: slotfile::Result<(RecordId, String)> = decode_with_id(&[0, 0, 0, 1, 0xFF]);

    assert!(matches!(result, Err(SlotError::Serialization(_))));
}
