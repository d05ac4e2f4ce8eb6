//! Shared Record Store
//!
//! Single-writer lock around a [`RecordStore`] for callers that need to
//! reach one file from several threads.
//!
//! Every call takes the lock for the whole operation, so scans and writes
//! never interleave. Use [`SharedRecordStore::lock`] to run several
//! operations as one critical section.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::error::Result;
use crate::record::{Record, RecordId};
use crate::store::{RecordStore, StoreStats};

/// Cloneable handle serializing access to one record store
pub struct SharedRecordStore<R: Record> {
    inner: Arc<Mutex<RecordStore<R>>>,
}

impl<R: Record> Clone for SharedRecordStore<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Record> From<RecordStore<R>> for SharedRecordStore<R> {
    fn from(store: RecordStore<R>) -> Self {
        Self::new(store)
    }
}

impl<R: Record> SharedRecordStore<R> {
    pub fn new(store: RecordStore<R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Exclusive access for a multi-operation sequence
    pub fn lock(&self) -> MutexGuard<'_, RecordStore<R>> {
        self.inner.lock()
    }

    pub fn insert(&self, record: &mut R) -> Result<RecordId> {
        self.inner.lock().insert(record)
    }

    pub fn locate(&self, id: RecordId) -> Result<Option<u64>> {
        self.inner.lock().locate(id)
    }

    pub fn list(&self) -> Result<Vec<R>> {
        self.inner.lock().list()
    }

    pub fn find(&self, id: RecordId) -> Result<Option<R>> {
        self.inner.lock().find(id)
    }

    pub fn delete(&self, id: RecordId) -> Result<bool> {
        self.inner.lock().delete(id)
    }

    pub fn update(&self, record: &R) -> Result<bool> {
        self.inner.lock().update(record)
    }

    pub fn stats(&self) -> Result<StoreStats> {
        self.inner.lock().stats()
    }

    pub fn compact(&self) -> Result<u64> {
        self.inner.lock().compact()
    }

    pub fn sync(&self) -> Result<()> {
        self.inner.lock().sync()
    }

    pub fn last_assigned_id(&self) -> Result<RecordId> {
        self.inner.lock().last_assigned_id()
    }
}
