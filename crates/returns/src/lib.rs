//! # Patchbay Returns
//!
//! Plain success/error value holders: [`SimpleResult`] carries either a
//! success value or an error value, and [`SimpleError`] is a minimal error
//! payload (message, optional machine-readable code, optional structured
//! context).
//!
//! Both are passive data carriers meant to cross API boundaries as values.
//! [`SimpleResult`] does not replace [`std::result::Result`]; it converts to
//! and from it at the edges where callers want `?` and combinators.

pub mod error;
pub mod result;

pub use error::SimpleError;
pub use result::SimpleResult;
