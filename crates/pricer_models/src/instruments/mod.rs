//! Credit instrument definitions.
//!
//! # Architecture
//!
//! - All types generic over `T: Float`; pipelines run on `f64`
//! - Contract parameters are validated once by a builder and then immutable
//! - Curves are borrowed, never owned, by the pricer
//!
//! # Modules
//!
//! - [`credit`]: CDS contract parameters, valuation engine, index aggregation
//!
//! # Examples
//!
//! ```
//! use pricer_models::instruments::credit::{value_from_default_probability, ContractParameters};
//!
//! let params = ContractParameters::<f64>::builder().build().unwrap();
//! let valuation = value_from_default_probability(&params, 0.0652).unwrap();
//! assert!(valuation.fair_spread > 0.008);
//! ```

mod error;

pub mod credit;

pub use error::CreditError;
