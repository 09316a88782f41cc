//! Sift Common - shared configuration and logging for the Sift screener.
//!
//! This crate provides:
//! - Configuration types and loading (JSON file + environment overrides)
//! - Logging setup with noise filtering

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod logging;

pub use config::{
    ApiConfig, Config, DeliveryConfig, ObservabilityConfig, SmtpConfig, UniverseEntry,
};
pub use logging::init_logging;
