//! Melo CLI
//!
//! Terminal front end for the Melo backend: configuration loading, listing
//! and editing the catalog, and a playback session that walks a queue with a
//! simulated media element.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod render;
pub mod session;

pub use crate::config::{CliConfig, Overrides};
pub use crate::error::{CliError, Result};
