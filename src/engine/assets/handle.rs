// Type-safe generational handles to world entities

use crate::core::Serial;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Type-safe handle to an entity stored in a collection
///
/// The `T` parameter ensures handles can only be resolved against the
/// collection of the matching entity type. The generation detects handles
/// that outlived the entity they pointed to: a serial that was removed and
/// re-added gets a fresh generation.
pub struct Handle<T> {
    pub(crate) serial: Serial,
    pub(crate) generation: u32,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// Create a new handle
    pub(crate) fn new(serial: Serial, generation: u32) -> Self {
        Self {
            serial,
            generation,
            _phantom: PhantomData,
        }
    }

    /// Serial the handle points at
    pub fn serial(&self) -> Serial {
        self.serial
    }

    /// Generation captured when the handle was issued
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Drop the type parameter
    pub fn erase(&self) -> EntityHandle {
        EntityHandle {
            serial: self.serial,
            generation: self.generation,
        }
    }
}

// Manual impls so `T` itself needs none of these traits

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.serial == other.serial && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.serial.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}, gen {})", self.serial, self.generation)
    }
}

/// Handle with the entity type erased, used where items and mobiles mix
/// (effect endpoints, world lookups)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    pub serial: Serial,
    pub generation: u32,
}

impl<T> From<Handle<T>> for EntityHandle {
    fn from(handle: Handle<T>) -> Self {
        handle.erase()
    }
}
