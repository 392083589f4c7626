//! Mcumake - Makefile generator for embedded board packages
//!
//! This library resolves board build configurations from installed vendor
//! packages and turns them into deterministic, self-contained Makefiles.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Resolution and generation logic (no I/O operations)
//! - [`infra`] - Infrastructure layer (package discovery, source trees)
//! - [`error`] - Error types and handling

pub mod cli;
pub mod core;
pub mod error;
pub mod infra;
