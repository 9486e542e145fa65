//! # eBird Records Review common library
//!
//! Shared code for the records review tools:
//! - Error type used across crates
//! - TOML configuration loading
//! - Credential and path resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
