//! Configuration and path management for hlds-console
//!
//! This crate provides:
//! - Directory utilities for config and cache files
//! - Configuration file loading (TOML)
//! - Console configuration (ConsoleConfig)

pub mod config_file;
pub mod console_config;
pub mod paths;

pub use config_file::load_config_file;
pub use console_config::ConsoleConfig;
pub use paths::{cache_dir, config_dir};
