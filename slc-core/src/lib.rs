//! Sea-level contribution of ice-sheet geometry changes
//!
//! Converts gridded ice thickness, bed elevation and sea-surface elevation of a
//! reference and a perturbed state into a global-mean sea-level contribution.
//! See [`methods`] for the available methodologies.

pub mod constants;
pub mod field;
pub mod methods;

pub mod errors;
