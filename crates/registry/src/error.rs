//! Error types for registry and handle operations.
//!
//! Uses `thiserror` for ergonomic error definitions. Every failure carries
//! the identity key it concerns.

use thiserror::Error;

use crate::key::IdentityKey;

/// Failures surfaced by registry and handle operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The identity is already registered. Raised at construction time:
    /// binding the same logical dependency twice in one process is a
    /// programmer error, reported immediately rather than at first use.
    #[error("Dependency already registered: {0}")]
    DuplicateKey(IdentityKey),

    /// No registration exists for the key.
    #[error("Dependency not found: {0}")]
    KeyNotFound(IdentityKey),

    /// A handle's key vanished between registration and invocation. The
    /// public API never removes entries, so this signals the registry was
    /// mutated behind the handle's back.
    #[error("Registered dependency missing at invocation: {0}")]
    DependencyMissing(IdentityKey),

    /// The slot exists but was registered with different argument or return
    /// types than the lookup asked for.
    #[error("Dependency registered with a different signature: {0}")]
    SignatureMismatch(IdentityKey),
}

/// Result type alias using [`RegistryError`].
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_displays_the_key() {
        let key = IdentityKey::from_label("math.add");
        let err = RegistryError::DuplicateKey(key.clone());
        assert!(err.to_string().contains("already registered"));
        assert!(err.to_string().contains(key.as_str()));
    }

    #[test]
    fn missing_dependency_displays_the_key() {
        let key = IdentityKey::from_label("math.add");
        let err = RegistryError::DependencyMissing(key.clone());
        assert!(err.to_string().contains("missing at invocation"));
        assert!(err.to_string().contains(key.as_str()));
    }
}
