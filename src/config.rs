//! Command-line configuration for `slidetool`.
//!
//! Commands are grouped the way the C `slidetool` groups them:
//!
//! ```text
//! slidetool slide open <FILE...>
//! slidetool slide vendor <FILE...>
//! slidetool slide version
//! slidetool prop list [--json] [--drop-empty] <FILE>
//! slidetool prop get <FILE> <NAME...>
//! ```
//!
//! # Environment Variables
//!
//! - `SLIDETOOL_CACHE_SIZE` - Tile cache capacity in bytes shared by the slides
//!   a command opens (default: the library's private per-slide cache)
//! - `RUST_LOG` - Overrides the log filter

use std::path::PathBuf;

use clap::{Parser, Subcommand};

// =============================================================================
// Default Values
// =============================================================================

/// Log filter without `--verbose`.
pub const DEFAULT_LOG_FILTER: &str = "fastslide=warn,slidetool=warn";

/// Log filter with `--verbose`.
pub const VERBOSE_LOG_FILTER: &str = "fastslide=debug,slidetool=debug";

/// Smallest cache capacity accepted on the command line (1MB).
pub const MIN_CACHE_SIZE: usize = 1024 * 1024;

// =============================================================================
// CLI Arguments
// =============================================================================

/// slidetool - Inspect whole-slide images with OpenSlide.
#[derive(Parser, Debug, Clone)]
#[command(name = "slidetool")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Tile cache capacity in bytes, shared by every slide the command opens.
    #[arg(long, global = true, env = "SLIDETOOL_CACHE_SIZE")]
    pub cache_size: Option<usize>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Commands related to slide files
    #[command(subcommand)]
    Slide(SlideCommand),

    /// Commands related to slide properties
    #[command(subcommand)]
    Prop(PropCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum SlideCommand {
    /// Try opening a slide
    #[command(long_about = "Check whether OpenSlide can open a slide.")]
    Open {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },

    /// Get slide vendor
    #[command(long_about = "Print the detected OpenSlide vendor name for a slide.")]
    Vendor {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the OpenSlide library version
    Version,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum PropCommand {
    /// List slide properties
    List {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the properties as a JSON object.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Leave out properties whose value is empty.
        #[arg(long, default_value_t = false)]
        drop_empty: bool,
    },

    /// Get slide property values
    Get {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(value_name = "NAME", required = true)]
        names: Vec<String>,
    },
}

impl Cli {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(size) = self.cache_size {
            if size < MIN_CACHE_SIZE {
                return Err(format!(
                    "cache_size must be at least {} bytes (got {}). \
                     Set --cache-size or SLIDETOOL_CACHE_SIZE",
                    MIN_CACHE_SIZE, size
                ));
            }
        }
        Ok(())
    }

    /// Log filter selected by `--verbose`.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            VERBOSE_LOG_FILTER
        } else {
            DEFAULT_LOG_FILTER
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
