//! Configuration loading and platform path resolution.

pub mod settings;

pub use settings::{config_dir, Settings};
