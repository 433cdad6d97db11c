//! Shared domain types and policy for the leptospirosis risk pipeline
//!
//! This crate holds everything that is pure computation: risk normalization,
//! classification, factor attribution, recommendation selection and the
//! region/country registry. It performs no I/O.

pub mod error;
pub mod models;
pub mod recommendation;
pub mod registry;
pub mod stats;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use recommendation::*;
pub use registry::*;
pub use types::*;
pub use validation::*;
