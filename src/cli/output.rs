//! Output formatting
//!
//! This module provides utilities for displaying status messages and
//! machine-readable JSON to the user.

use std::sync::OnceLock;

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

static OUTPUT_CONFIG: OnceLock<OutputConfig> = OnceLock::new();

/// Global output configuration from the top-level CLI flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Suppress all output except errors
    pub quiet: bool,
    /// Emit machine-readable JSON instead of human text
    pub json: bool,
    /// Verbosity level from repeated -v flags
    pub verbose: u8,
}

impl OutputConfig {
    /// Create an output configuration
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Install this configuration globally. A second install is ignored.
    pub fn apply_global(self) {
        let _ = OUTPUT_CONFIG.set(self);
    }

    /// The globally installed configuration
    pub fn global() -> Self {
        OUTPUT_CONFIG.get().copied().unwrap_or_default()
    }
}

/// Whether success and progress messages should be suppressed
pub fn is_quiet() -> bool {
    OutputConfig::global().quiet
}

/// Print a success line unless quiet mode is active
pub fn success(message: &str) {
    if !is_quiet() {
        println!("{} {message}", status::SUCCESS);
    }
}

/// Print a warning line on stderr unless quiet mode is active
pub fn warning(message: &str) {
    if !is_quiet() {
        eprintln!("{} {message}", status::WARNING);
    }
}

/// Print a JSON value on stdout
pub fn print_json(value: &serde_json::Value) {
    println!("{value:#}");
}

/// Display an error and its cause chain on stderr
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}
