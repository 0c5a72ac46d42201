//! The shared mapping from identity keys to live callables.
//!
//! A [`Registry`] is an explicit, process-scoped object: create one at
//! startup (or one per test) and hand clones to every handle bound against
//! it. Clones are cheap and share the same underlying map, so an override
//! installed through one clone is visible through all of them.
//!
//! Thread-safe via `std::sync::Mutex` (non-async, held briefly): `register`,
//! `lookup`, and `replace` are each atomic. Callables are cloned out of
//! their slot and never run under the lock, so re-entrant invocation cannot
//! deadlock.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::key::IdentityKey;

/// A registered callable: shareable, thread-safe, arguments passed by value.
///
/// Multi-argument dependencies take a tuple for `A`; zero-argument ones take
/// `()`.
pub type Callable<A, R> = Arc<dyn Fn(A) -> R + Send + Sync>;

/// Type-erased slot. Always holds the `Callable<A, R>` it was registered
/// with; lookups recover the type by downcast.
type Slot = Box<dyn Any + Send + Sync>;

/// The shared mapping from identity key to currently active callable.
///
/// Starts empty, grows by registration, and entries are only ever replaced
/// by overrides, never removed. There is no teardown; the registry lives as
/// long as the last clone.
#[derive(Clone)]
pub struct Registry {
    slots: Arc<Mutex<HashMap<IdentityKey, Slot>>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Inserts `callable` under `key`, failing if the key is already taken.
    pub fn register<A, R>(&self, key: IdentityKey, callable: Callable<A, R>) -> Result<()>
    where
        A: 'static,
        R: 'static,
    {
        let mut slots = self.lock_slots();
        if slots.contains_key(&key) {
            return Err(RegistryError::DuplicateKey(key));
        }
        slots.insert(key.clone(), Box::new(callable));
        drop(slots);
        debug!(key = %key, "Registered dependency");
        Ok(())
    }

    /// Returns the currently active callable for `key`.
    ///
    /// The callable is cloned out of its slot; the lock is released before
    /// the caller can run it.
    pub fn lookup<A, R>(&self, key: &IdentityKey) -> Result<Callable<A, R>>
    where
        A: 'static,
        R: 'static,
    {
        let slots = self.lock_slots();
        let slot = slots
            .get(key)
            .ok_or_else(|| RegistryError::KeyNotFound(key.clone()))?;
        slot.downcast_ref::<Callable<A, R>>()
            .cloned()
            .ok_or_else(|| RegistryError::SignatureMismatch(key.clone()))
    }

    /// Unconditionally swaps in `callable`, returning the previous occupant.
    ///
    /// No existence check: override paths are expected to have registered
    /// first. Returns `None` when the key was vacant or the previous slot
    /// held a different signature.
    pub fn replace<A, R>(
        &self,
        key: IdentityKey,
        callable: Callable<A, R>,
    ) -> Option<Callable<A, R>>
    where
        A: 'static,
        R: 'static,
    {
        let previous = self.lock_slots().insert(key, Box::new(callable));
        previous
            .and_then(|slot| slot.downcast::<Callable<A, R>>().ok())
            .map(|boxed| *boxed)
    }

    /// Whether `key` currently has a registration.
    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.lock_slots().contains_key(key)
    }

    /// Number of registered identities.
    pub fn len(&self) -> usize {
        self.lock_slots().len()
    }

    /// Whether nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.lock_slots().is_empty()
    }

    /// Locks the slot map, recovering from poisoning. Callables never run
    /// under the lock, so a panic can only have interrupted a map operation
    /// that left the map coherent.
    fn lock_slots(&self) -> MutexGuard<'_, HashMap<IdentityKey, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.len())
            .finish()
    }
}
