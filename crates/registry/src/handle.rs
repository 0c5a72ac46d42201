//! Handles: the caller-facing wrapper around one registered dependency.
//!
//! A [`Handle`] binds a callable into a [`Registry`] under an identity key
//! and forwards every invocation to whatever the registry currently maps
//! that key to. Substitution happens in the registry, not the handle, so
//! call sites holding the handle never change:
//!
//! - [`Handle::scoped_override`] swaps in a substitute until the returned
//!   guard drops, on normal exit or unwind.
//! - [`Handle::permanent_override`] swaps with no automatic restoration.
//! - [`Handle::restore`] forces the mapping back to the construction-time
//!   original.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::key::IdentityKey;
use crate::registry::{Callable, Registry};

type RestoreFn = Box<dyn FnOnce() + Send>;

/// Caller-facing wrapper around one registered dependency.
///
/// `A` is the argument type (a tuple for multi-argument callables, `()` for
/// none) and `R` the return type. The handle owns its key, a copy of the
/// originally registered callable, and a clone of the registry it is bound
/// to.
pub struct Handle<A, R> {
    key: IdentityKey,
    original: Callable<A, R>,
    registry: Registry,
}

impl<A, R> Handle<A, R>
where
    A: 'static,
    R: 'static,
{
    /// Registers `callable` under `key` and returns the handle on success.
    ///
    /// `key` is anything convertible to an [`IdentityKey`]: an explicit
    /// label, a captured [`crate::key::CallSite`], or a pre-built key. Fails
    /// with [`RegistryError::DuplicateKey`] when the identity is already
    /// taken.
    pub fn bind<K, F>(registry: &Registry, key: K, callable: F) -> Result<Self>
    where
        K: Into<IdentityKey>,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let key = key.into();
        let original: Callable<A, R> = Arc::new(callable);
        registry.register(key.clone(), original.clone())?;
        Ok(Self {
            key,
            original,
            registry: registry.clone(),
        })
    }

    /// The identity key this handle is bound to.
    pub fn key(&self) -> &IdentityKey {
        &self.key
    }

    /// Invokes the currently active callable for this handle's key.
    ///
    /// The callable's result is returned unchanged; the handle adds no error
    /// translation. A missing key means the registry was mutated behind the
    /// handle's back and surfaces as [`RegistryError::DependencyMissing`].
    pub fn invoke(&self, args: A) -> Result<R> {
        let active = self.lookup_active()?;
        Ok(active(args))
    }

    /// Swaps in `substitute` until the returned guard is dropped.
    ///
    /// The guard records the callable active immediately before this call,
    /// which may itself be an earlier substitute, and writes it back on
    /// drop. Drop runs on every exit path, unwinding included. Guards nest
    /// LIFO: drop order must reverse acquisition order, which block scoping
    /// gives naturally. Concurrent overrides of the same key from
    /// independent threads are unsupported (see crate docs).
    pub fn scoped_override<F>(&self, substitute: F) -> Result<OverrideGuard>
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let saved = self.lookup_active()?;
        let substitute: Callable<A, R> = Arc::new(substitute);
        self.registry.replace(self.key.clone(), substitute);
        debug!(key = %self.key, "Installed scoped override");

        let registry = self.registry.clone();
        let key = self.key.clone();
        let restore: RestoreFn = Box::new(move || {
            registry.replace(key, saved);
        });
        Ok(OverrideGuard {
            key: self.key.clone(),
            restore: Some(restore),
        })
    }

    /// Runs `block` with `substitute` active, restoring the prior mapping
    /// before returning.
    ///
    /// Closure-bracket form of [`Handle::scoped_override`] for overrides
    /// that live exactly as long as one block.
    pub fn with_override<F, B, T>(&self, substitute: F, block: B) -> Result<T>
    where
        F: Fn(A) -> R + Send + Sync + 'static,
        B: FnOnce() -> T,
    {
        let _guard = self.scoped_override(substitute)?;
        Ok(block())
    }

    /// Swaps in `substitute` with no automatic restoration.
    ///
    /// For longer-lived substitutions such as feature flips. Revert
    /// explicitly with [`Handle::restore`].
    pub fn permanent_override<F>(&self, substitute: F)
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let substitute: Callable<A, R> = Arc::new(substitute);
        self.registry.replace(self.key.clone(), substitute);
        debug!(key = %self.key, "Installed permanent override");
    }

    /// Forces the mapping back to the callable captured at construction,
    /// bypassing whatever scoped or permanent overrides are active.
    ///
    /// A blunt reset, distinct from the one-level undo of
    /// [`Handle::scoped_override`].
    pub fn restore(&self) {
        self.registry.replace(self.key.clone(), self.original.clone());
        debug!(key = %self.key, "Restored original dependency");
    }

    /// Fetches the active callable, translating a registry-level miss into
    /// the invocation-level [`RegistryError::DependencyMissing`].
    fn lookup_active(&self) -> Result<Callable<A, R>> {
        self.registry.lookup(&self.key).map_err(|err| match err {
            RegistryError::KeyNotFound(key) => RegistryError::DependencyMissing(key),
            other => other,
        })
    }
}

impl<A, R> fmt::Debug for Handle<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle").field("key", &self.key).finish()
    }
}

/// Reverts a scoped override when dropped.
///
/// Holds the callable that was active immediately before the override and
/// writes it back on drop. Drop runs during unwinding too, so a panic
/// inside the protected block never leaks the substitute.
#[must_use = "dropping the guard immediately reverts the override"]
pub struct OverrideGuard {
    key: IdentityKey,
    restore: Option<RestoreFn>,
}

impl Drop for OverrideGuard {
    fn drop(&mut self) {
        if let Some(restore) = self.restore.take() {
            restore();
            debug!(key = %self.key, "Released scoped override");
        }
    }
}

impl fmt::Debug for OverrideGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverrideGuard")
            .field("key", &self.key)
            .finish()
    }
}

/// Binds `callable` into `registry` under its call-site identity.
///
/// One-step form of [`Handle::bind`] using the [`call_site!`] strategy: the
/// key is derived from the expansion site, so binding the same callable
/// text from two different lines registers two distinct dependencies, and
/// binding twice from one line fails as a duplicate.
///
/// ```
/// use patchbay_registry::{bind, Registry};
///
/// fn add((a, b): (i32, i32)) -> i32 {
///     a + b
/// }
///
/// let registry = Registry::new();
/// let handle = bind!(&registry, add).unwrap();
/// assert_eq!(handle.invoke((2, 3)).unwrap(), 5);
/// ```
#[macro_export]
macro_rules! bind {
    ($registry:expr, $callable:expr) => {
        $crate::Handle::bind($registry, $crate::call_site!($callable), $callable)
    };
}
