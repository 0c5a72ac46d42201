//! A two-variant success/error container.

use serde::{Deserialize, Serialize};

/// Either a success value or an error value.
///
/// A passive alternative to [`std::result::Result`] for APIs that pass
/// outcomes around as plain data: construction, discrimination, and
/// accessors only, no combinators. Convert with
/// [`SimpleResult::into_result`] (or `From`) where `?` and combinators are
/// wanted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimpleResult<S, E> {
    /// The operation produced a value.
    Success(S),
    /// The operation failed with an error value.
    Error(E),
}

impl<S, E> SimpleResult<S, E> {
    /// Wraps a success value.
    pub fn success(value: S) -> Self {
        Self::Success(value)
    }

    /// Wraps an error value.
    pub fn error(error: E) -> Self {
        Self::Error(error)
    }

    /// Whether this holds a success value.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Whether this holds an error value.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The success value, if present.
    pub fn value(&self) -> Option<&S> {
        match self {
            Self::Success(value) => Some(value),
            Self::Error(_) => None,
        }
    }

    /// The error value, if present.
    pub fn error_value(&self) -> Option<&E> {
        match self {
            Self::Success(_) => None,
            Self::Error(error) => Some(error),
        }
    }

    /// Consumes the container, returning the success value if present.
    pub fn into_value(self) -> Option<S> {
        match self {
            Self::Success(value) => Some(value),
            Self::Error(_) => None,
        }
    }

    /// Consumes the container, returning the error value if present.
    pub fn into_error_value(self) -> Option<E> {
        match self {
            Self::Success(_) => None,
            Self::Error(error) => Some(error),
        }
    }

    /// Converts into a [`std::result::Result`].
    pub fn into_result(self) -> Result<S, E> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Error(error) => Err(error),
        }
    }
}

impl<S, E> From<Result<S, E>> for SimpleResult<S, E> {
    fn from(result: Result<S, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Error(error),
        }
    }
}

impl<S, E> From<SimpleResult<S, E>> for Result<S, E> {
    fn from(result: SimpleResult<S, E>) -> Self {
        result.into_result()
    }
}
