//! Storage infrastructure: the optional configuration file.
//!
//! The `config` sub-module reads a TOML file from `--config` or the
//! platform-appropriate directory and supplies defaults when it is absent.
//! Nothing is ever written back; the pairing credential is never persisted.

pub mod config;
