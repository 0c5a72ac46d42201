//! Identity keys: stable, digest-based identifiers for registered callables.
//!
//! A dependency is addressed by an [`IdentityKey`], the SHA-256 hex digest
//! of its defining identity. Two derivation strategies are supported:
//!
//! - **Explicit label** ([`IdentityKey::from_label`]): the caller supplies a
//!   stable string. Recommended; labels survive refactors that move code.
//! - **Call site** ([`IdentityKey::from_call_site`], usually via the
//!   [`call_site!`] macro): hashes `{module_path}.{name}:{line}:{file}`, so
//!   the same definition site always derives the same key. Keys change when
//!   the registration site moves.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// An opaque, deterministic identifier for a registered dependency.
///
/// Equal inputs always derive equal keys; the cryptographic digest makes
/// accidental collisions between distinct identities vanishingly unlikely.
/// Keys derived from call sites are stable for the lifetime of the process
/// but not across edits that move the registration site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Derives a key from an explicit label.
    ///
    /// The recommended strategy: collisions are entirely in the caller's
    /// control and the key survives moving the registration code.
    pub fn from_label(label: &str) -> Self {
        Self::digest(label.as_bytes())
    }

    /// Derives a key from a registration site captured by [`call_site!`].
    pub fn from_call_site(site: &CallSite) -> Self {
        Self::digest(site.identity().as_bytes())
    }

    /// The hex digest as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn digest(identity: &[u8]) -> Self {
        let hash = Sha256::digest(identity);
        Self(format!("{hash:x}"))
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IdentityKey {
    fn from(label: &str) -> Self {
        Self::from_label(label)
    }
}

impl From<CallSite> for IdentityKey {
    fn from(site: CallSite) -> Self {
        Self::from_call_site(&site)
    }
}

/// The defining position of a callable, captured where it is registered.
///
/// Two expansions of [`call_site!`] on the same source line produce the same
/// `CallSite` and therefore the same key; binding both is rejected as a
/// duplicate. Closures instantiated in a loop share one site, so register
/// each logical dependency from its own line or fall back to explicit
/// labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallSite {
    /// Module path at the registration site (`module_path!`).
    pub module_path: &'static str,
    /// The callable expression as written at the registration site.
    pub name: &'static str,
    /// Source file (`file!`).
    pub file: &'static str,
    /// Source line (`line!`).
    pub line: u32,
}

impl CallSite {
    /// Identity string fed to the digest: `{module_path}.{name}:{line}:{file}`.
    fn identity(&self) -> String {
        format!(
            "{}.{}:{}:{}",
            self.module_path, self.name, self.line, self.file
        )
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} ({}:{})",
            self.module_path, self.name, self.file, self.line
        )
    }
}

/// Captures the [`CallSite`] of a callable at the point of expansion.
///
/// ```
/// use patchbay_registry::{call_site, IdentityKey};
///
/// fn add((a, b): (i32, i32)) -> i32 {
///     a + b
/// }
///
/// let site = call_site!(add);
/// assert_eq!(IdentityKey::from_call_site(&site), IdentityKey::from(site));
/// ```
#[macro_export]
macro_rules! call_site {
    ($callable:expr) => {
        $crate::key::CallSite {
            module_path: module_path!(),
            name: stringify!($callable),
            file: file!(),
            line: line!(),
        }
    };
}
