//! Configuration module
//!
//! Handles loading and validating settings from a YAML file and
//! environment variables.

mod settings;

pub use settings::*;
