//! CLI command implementations
//!
//! Each submodule implements a specific CLI command. Commands split into a
//! pure `report` step and a `run` step that loads input and writes output.

pub mod calibrate;
pub mod index;
pub mod risk;
pub mod spread;
pub mod stress;
