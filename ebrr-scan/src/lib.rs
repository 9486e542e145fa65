//! ebrr-scan library interface
//!
//! Scans eBird historic observations for a state's counties and flags the
//! records a review committee should look at. Exposed as a library for the
//! binary and for integration testing.

pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::error::{ScanError, ScanResult};
