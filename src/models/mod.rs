// src/models/mod.rs

//! Domain models for the scraper.
//!
//! This module contains the work items, the rows persisted to the sinks
//! and the application configuration.

mod config;
mod record;

// Re-export all public types
pub use config::{Config, EndpointConfig, InputConfig, PacingConfig, PathsConfig, ResolvedPaths};
pub use record::{FailureKind, FailureRecord, Item, ResultRecord, RetryRecord};
