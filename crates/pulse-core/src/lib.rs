//! Core types, configuration, and error handling for Pulseboard.
//!
//! This crate provides the shared foundation used by the other crates:
//! - [`PulseError`]: unified error type using `thiserror`
//! - [`PulseConfig`]: configuration loaded from `.pulse.toml`
//! - Shared types: [`OutputFormat`], [`SortKey`]

mod config;
mod error;
mod types;

pub use config::{DashboardConfig, InputConfig, PulseConfig, ReportConfig};
pub use error::PulseError;
pub use types::{OutputFormat, SortKey};

/// A convenience `Result` type for Pulseboard operations.
pub type Result<T> = std::result::Result<T, PulseError>;
