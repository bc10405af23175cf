//! Core error types.
//!
//! # Re-exports
//!
//! - [`SolverError`] from `error`

pub mod error;

pub use error::SolverError;
