//! Configuration module for the voice test.
//!
//! Provides CLI argument parsing merged with an optional local env file.

#[allow(clippy::module_inception)]
mod config;
mod env_file;

pub use config::AppConfig;
pub use env_file::VOICE_KEY;
