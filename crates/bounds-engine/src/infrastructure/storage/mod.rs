//! Storage infrastructure: read-only configuration file loading.
//!
//! The `config` sub-module reads the TOML configuration file from the
//! platform-appropriate directory (or an explicit path) and falls back to
//! defaults when the file does not exist.  Nothing is ever written back.

pub mod config;
