//! Seam to the external slide-decoding library.
//!
//! Every decoding concern (format detection, tile lookup, decompression,
//! color conversion, ICC extraction) lives inside the library. This module
//! only describes the primitives the handles in [`crate::slide`] call.
//!
//! Primitives never return `Result`. Like the C API they mirror, a failing
//! call leaves its mark in the slide's error string, which callers re-check
//! through [`NativeSlide::error`] after each call that can set it.
//!
//! The real binding lives in [`openslide`] behind the `openslide` feature.

#[cfg(feature = "openslide")]
pub mod openslide;

use std::path::Path;

/// Process-level entry points of a slide library.
pub trait SlideLibrary {
    /// Per-slide native resource. Dropping it closes the slide.
    type Slide: NativeSlide<Cache = Self::Cache>;

    /// Native tile cache object. Dropping it releases the library's reference.
    type Cache;

    /// Name of the vendor whose signature matches `path`, if any.
    fn detect_vendor(&self, path: &Path) -> Option<String>;

    /// Open a slide. `None` means the library did not produce a handle.
    fn open(&self, path: &Path) -> Option<Self::Slide>;

    /// Allocate a cache holding up to `capacity` bytes of decoded tiles.
    fn create_cache(&self, capacity: usize) -> Option<Self::Cache>;

    /// Library version string.
    fn version(&self) -> Option<String>;
}

/// Per-slide primitives of a slide library.
///
/// Out-of-range levels and unknown associated-image names are not validated
/// here; the library reports them through its error string or zero sizes.
pub trait NativeSlide {
    type Cache;

    /// Current error string. Once set, the library keeps reporting it.
    fn error(&self) -> Option<String>;

    /// Use `cache` for decoded tiles of this slide.
    fn set_cache(&mut self, cache: &Self::Cache);

    fn level_count(&self) -> i32;
    fn level0_dimensions(&self) -> (i64, i64);
    fn level_dimensions(&self, level: i32) -> (i64, i64);
    fn level_downsample(&self, level: i32) -> f64;
    fn best_level_for_downsample(&self, downsample: f64) -> i32;

    /// Write `width * height` premultiplied ARGB pixels into `dest`.
    ///
    /// `dest` has already been checked to hold exactly that many pixels.
    fn read_region(&self, dest: &mut [u32], x: i64, y: i64, level: i32, width: i64, height: i64);

    fn property_names(&self) -> Vec<String>;
    fn property_value(&self, name: &str) -> Option<String>;

    fn associated_image_names(&self) -> Vec<String>;
    fn associated_image_dimensions(&self, name: &str) -> (i64, i64);
    fn read_associated_image(&self, name: &str, dest: &mut [u32]);

    fn associated_image_icc_profile_size(&self, name: &str) -> i64;
    fn read_associated_image_icc_profile(&self, name: &str, dest: &mut [u8]);

    fn icc_profile_size(&self) -> i64;
    fn read_icc_profile(&self, dest: &mut [u8]);
}
