// Serial-keyed entity registry with batched membership events

use crate::core::Serial;
use crate::engine::assets::Handle;
use crate::game::WorldError;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Entity shared between the simulation and readers such as a render thread
pub type Shared<T> = Arc<RwLock<T>>;

/// Anything identified by a server serial
pub trait HasSerial {
    fn serial(&self) -> Serial;
}

/// Membership change flushed by `EntityCollection::process_delta`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionChange {
    Added(Vec<Serial>),
    Removed(Vec<Serial>),
}

struct Slot<T> {
    generation: u32,
    entity: Shared<T>,
}

/// Concurrent set of entities keyed by serial.
///
/// Individual operations are atomic; callers reading from another thread
/// see membership change between calls. Additions and removals are recorded
/// and reported once by `process_delta`.
pub struct EntityCollection<T> {
    entries: RwLock<HashMap<Serial, Slot<T>>>,
    added: Mutex<Vec<Serial>>,
    removed: Mutex<Vec<Serial>>,
    next_generation: AtomicU32,
}

impl<T: HasSerial> EntityCollection<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            added: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
            next_generation: AtomicU32::new(1),
        }
    }

    /// Add an entity, false when its serial is already present
    pub fn add(&self, entity: T) -> bool {
        self.insert_shared(Arc::new(RwLock::new(entity)))
    }

    /// Add an entity that is already shared with another collection
    pub fn insert_shared(&self, entity: Shared<T>) -> bool {
        let serial = entity.read().serial();

        {
            let mut entries = self.entries.write();
            if entries.contains_key(&serial) {
                return false;
            }

            let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
            entries.insert(serial, Slot { generation, entity });
        }

        self.added.lock().push(serial);
        true
    }

    /// Remove an entity, returning it if it was present
    pub fn remove(&self, serial: Serial) -> Option<Shared<T>> {
        let slot = self.entries.write().remove(&serial)?;
        self.removed.lock().push(serial);
        Some(slot.entity)
    }

    /// Look up an entity by serial
    pub fn get(&self, serial: Serial) -> Option<Shared<T>> {
        self.entries
            .read()
            .get(&serial)
            .map(|slot| Arc::clone(&slot.entity))
    }

    /// Issue a generational handle for a present entity
    pub fn handle(&self, serial: Serial) -> Option<Handle<T>> {
        self.entries
            .read()
            .get(&serial)
            .map(|slot| Handle::new(serial, slot.generation))
    }

    /// Resolve a handle, failing if the entity is gone or was replaced
    pub fn resolve(&self, handle: Handle<T>) -> Result<Shared<T>, WorldError> {
        let entries = self.entries.read();
        let slot = entries
            .get(&handle.serial())
            .ok_or(WorldError::UnknownEntity(handle.serial()))?;

        if slot.generation != handle.generation() {
            return Err(WorldError::StaleHandle(handle.serial()));
        }

        Ok(Arc::clone(&slot.entity))
    }

    pub fn contains(&self, serial: Serial) -> bool {
        self.entries.read().contains_key(&serial)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of the present serials
    pub fn serials(&self) -> Vec<Serial> {
        self.entries.read().keys().copied().collect()
    }

    /// Snapshot of the present entities
    pub fn values(&self) -> Vec<Shared<T>> {
        self.entries
            .read()
            .values()
            .map(|slot| Arc::clone(&slot.entity))
            .collect()
    }

    /// Remove everything, reporting each serial as removed
    pub fn clear(&self) -> Vec<Shared<T>> {
        let drained: Vec<(Serial, Slot<T>)> = self.entries.write().drain().collect();
        self.removed
            .lock()
            .extend(drained.iter().map(|(serial, _)| *serial));
        drained.into_iter().map(|(_, slot)| slot.entity).collect()
    }

    /// Flush pending additions and removals as batched events
    pub fn process_delta(&self) -> Vec<CollectionChange> {
        let mut changes = Vec::new();

        let added = std::mem::take(&mut *self.added.lock());
        if !added.is_empty() {
            changes.push(CollectionChange::Added(added));
        }

        let removed = std::mem::take(&mut *self.removed.lock());
        if !removed.is_empty() {
            changes.push(CollectionChange::Removed(removed));
        }

        changes
    }
}

impl<T: HasSerial> Default for EntityCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EntityCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityCollection")
            .field("len", &self.entries.read().len())
            .field("pending_added", &self.added.lock().len())
            .field("pending_removed", &self.removed.lock().len())
            .finish()
    }
}
