//! Handle table: opaque handle to live object.

use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;

use tether_core::error::{Result, TetherError};
use tether_core::object::ObjectRef;

/// Resolves the opaque handles carried in message headers.
pub trait HandleTable: Send + Sync {
    /// Look up a live object, `NotFound` if the handle names nothing.
    fn lookup_by_handle(&self, handle: u32) -> Result<ObjectRef>;
}

/// Process-local handle table.
///
/// Handle zero is never allocated, so a message that left its `handle`
/// field defaulted resolves to `NotFound` here.
pub struct InMemoryHandleTable {
    entries: DashMap<u32, ObjectRef>,
    next: AtomicU32,
}

impl Default for InMemoryHandleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryHandleTable {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next: AtomicU32::new(1),
        }
    }

    /// Register an object and return its freshly assigned handle.
    pub fn insert(&self, object: ObjectRef) -> u32 {
        let handle = self.next.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(handle, object);
        handle
    }

    /// Drop a handle, returning the object it named.
    pub fn remove(&self, handle: u32) -> Option<ObjectRef> {
        self.entries.remove(&handle).map(|(_, obj)| obj)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HandleTable for InMemoryHandleTable {
    fn lookup_by_handle(&self, handle: u32) -> Result<ObjectRef> {
        self.entries
            .get(&handle)
            .map(|e| e.value().clone())
            .ok_or(TetherError::NotFound)
    }
}
