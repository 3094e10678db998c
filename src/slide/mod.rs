//! Slide and cache handles.
//!
//! ```text
//! ┌──────────────────────────┐      ┌──────────────────────────┐
//! │        Slide<L>          │─────▶│      SlideCache<C>       │
//! │ (error state, properties)│ 0..1 │  (shared, Arc-counted)   │
//! └────────────┬─────────────┘      └────────────┬─────────────┘
//!              │                                 │
//!              ▼                                 ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │             SlideLibrary / NativeSlide traits                │
//! │        (OpenSlide binding, or an in-memory fake)             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use fastslide::native::openslide::OpenSlide;
//! use fastslide::{OpenOptions, Slide, SlideCache};
//!
//! let cache = SlideCache::create(&OpenSlide, 64 * 1024 * 1024)?;
//! let slide = Slide::open_with(&OpenSlide, "CMU-1.svs", OpenOptions::new().with_cache(cache));
//! slide.check_error()?;
//!
//! let pixels = slide.read_region_vec(0, 0, 0, 256, 256)?;
//! ```

mod cache;
mod handle;
pub mod properties;

pub use cache::SlideCache;
pub use handle::Slide;
pub use properties::{EmptyValues, OpenOptions, PropertyMap};
