//! Sea-level contribution of ice-sheet geometry changes
//!
//! Re-exports [`slc_core`] and, with the `python` feature enabled, builds the
//! `_lib` Python extension module on top of it.

pub use slc_core::{constants, errors, field, methods};

#[cfg(feature = "python")]
pub mod python;
