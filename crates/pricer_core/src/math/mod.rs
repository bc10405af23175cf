//! Numerical building blocks.
//!
//! - [`solvers`]: Bracketing root-finders and their configuration

pub mod solvers;
