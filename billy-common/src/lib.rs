//! Shared infrastructure for the Billy service.
//!
//! Provides configuration loading, the unified error type, and logging setup
//! used by the other workspace crates.

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod logging;

pub use config::Config;
pub use error::{Error, Result};
