//! Common utilities shared across all crates.
//!
//! This crate provides:
//! - The error taxonomy and classified errors
//! - The response envelope
//! - Configuration structures
//! - Persistence error translation (`database` feature)

pub mod config;
#[cfg(feature = "database")]
pub mod db_error;
pub mod error;
pub mod response;

pub use config::*;
#[cfg(feature = "database")]
pub use db_error::classify_db_error;
pub use error::{
    validation_error, ApiResult, BoxError, ClassifiedError, ErrorCode, Severity, TaxonomyEntry,
};
pub use response::{ApiResponse, Pagination, Params, ResponseData};
