//! # Patchbay Registry
//!
//! A process-wide dependency substitution registry: register a callable
//! under a stable identity, invoke it through a [`Handle`], and swap the
//! implementation in and out without touching call sites. Built for test
//! doubles and runtime feature swapping.
//!
//! ```text
//! ┌────────┐  invoke   ┌────────┐  lookup / replace  ┌─────────────────┐
//! │ caller │──────────▶│ Handle │───────────────────▶│ Registry        │
//! └────────┘           └────────┘                    │ key ─▶ callable │
//!                           │                        └─────────────────┘
//!                  scoped_override returns an
//!                  OverrideGuard (restores on drop)
//! ```
//!
//! ## Design Philosophy
//!
//! - **Explicit registry instances.** No ambient global: create a
//!   [`Registry`] and pass it where it is needed. Clones share state, so a
//!   per-test registry gives full isolation.
//! - **Identity by digest.** Dependencies are addressed by an
//!   [`IdentityKey`], the SHA-256 of either an explicit label (recommended)
//!   or a [`CallSite`] captured by [`call_site!`].
//! - **Substitution lives in the registry, not the handle.** Handles are
//!   immutable; overrides replace the mapping, so every caller observes the
//!   swap at once.
//! - **Guaranteed restoration.** [`Handle::scoped_override`] returns an
//!   [`OverrideGuard`] that restores the prior mapping on drop, unwinding
//!   included.
//!
//! ## Example
//!
//! ```
//! use patchbay_registry::{Handle, Registry};
//!
//! let registry = Registry::new();
//! let add = Handle::bind(&registry, "math.add", |(a, b): (i32, i32)| a + b)?;
//! assert_eq!(add.invoke((2, 3))?, 5);
//!
//! {
//!     let _guard = add.scoped_override(|(a, b)| a * b)?;
//!     assert_eq!(add.invoke((2, 3))?, 6);
//! }
//! assert_eq!(add.invoke((2, 3))?, 5);
//! # Ok::<(), patchbay_registry::RegistryError>(())
//! ```
//!
//! ## Concurrency
//!
//! All registry operations are individually atomic behind one mutex, and
//! callables never run under the lock. Scoped overrides of the *same* key
//! from concurrent threads are unsupported: restore-to-prior is only
//! correct under strict LIFO nesting on a single logical thread of control.

pub mod error;
pub mod handle;
pub mod key;
pub mod registry;

// Re-export key types at crate root for ergonomics
pub use error::{RegistryError, Result};
pub use handle::{Handle, OverrideGuard};
pub use key::{CallSite, IdentityKey};
pub use registry::{Callable, Registry};
