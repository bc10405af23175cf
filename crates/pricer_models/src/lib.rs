//! # Pricer Models (L2: Business Logic)
//!
//! CDS valuation, spread calibration and index aggregation.
//!
//! This crate provides:
//! - Standard normal CDF and inverse CDF (`analytical`)
//! - CDS contract parameters and the valuation engine (`instruments::credit`)
//! - Price-to-spread inversion by bisection (`calibration`)
//! - Index aggregation from ratings or constituent quotes (`instruments::credit::index`)
//!
//! ## Design Principles
//!
//! - **Generic pricing** over `T: Float`; aggregation pipelines run on `f64`
//! - **Builder pattern** for validated, immutable contract parameters
//! - **Borrowed market data**: tables and curves are passed by reference
//!
//! ## Feature Flags
//!
//! - `serde`: Serialisation for valuations, index results and calibration output

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod calibration;
pub mod instruments;
