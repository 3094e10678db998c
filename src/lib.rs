//! # fastslide
//!
//! Safe handles around a whole-slide-image decoding library (OpenSlide).
//!
//! The library does all the decoding work: format detection, pyramid
//! construction, tile decompression, color conversion and ICC extraction.
//! This crate turns its raw handles and output parameters into owned Rust
//! values with typed errors, and ships the `slidetool` CLI.
//!
//! ## Architecture
//!
//! - [`native`] - Traits describing the library primitives, and the
//!   OpenSlide binding (feature `openslide`)
//! - [`slide`] - [`Slide`] and [`SlideCache`] handles, property names
//! - [`error`] - [`SlideError`]
//! - [`config`] - CLI definition
//! - [`cli`] - Command handlers
//!
//! ## Error model
//!
//! [`Slide::open`] always returns a handle. Check it with
//! [`Slide::has_error`] or [`Slide::check_error`]; every query re-checks the
//! library's error state and returns `Err` once it is set. Errors are never
//! cleared.
//!
//! ## Example
//!
//! ```rust,ignore
//! use fastslide::native::openslide::OpenSlide;
//! use fastslide::Slide;
//!
//! let slide = Slide::open(&OpenSlide, "CMU-1.svs");
//! if slide.has_error() {
//!     eprintln!("{}", slide.error_message().unwrap_or_default());
//!     return;
//! }
//!
//! let levels = slide.level_count()?;
//! let (width, height) = slide.level0_dimensions()?;
//! let mut pixels = vec![0u32; 256 * 256];
//! slide.read_region(&mut pixels, 0, 0, 0, 256, 256)?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod native;
pub mod slide;

// Re-export commonly used types
pub use cli::SlideTool;
pub use config::{Cli, Command, PropCommand, SlideCommand};
pub use error::SlideError;
pub use native::{NativeSlide, SlideLibrary};
pub use slide::properties;
pub use slide::{EmptyValues, OpenOptions, PropertyMap, Slide, SlideCache};
