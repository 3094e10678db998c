//! Slide handle.
//!
//! [`Slide::open`] always returns a handle. Failures before the library hands
//! back a native slide are recorded on the handle and never cleared; failures
//! reported by the library are read from its live error string. Every query
//! checks the error state before and after calling into the library, so an
//! error raised mid-call still surfaces as `Err`.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::SlideError;
use crate::native::{NativeSlide, SlideLibrary};

use super::cache::SlideCache;
use super::properties::{
    self, alias_name, format_downsample, EmptyValues, OpenOptions, PropertyMap,
    PROPERTY_NAME_BOUNDS_HEIGHT, PROPERTY_NAME_BOUNDS_WIDTH, PROPERTY_NAME_ICC_SIZE,
    PROPERTY_NAME_LEVEL_COUNT, PROPERTY_NAME_VENDOR,
};

enum SlideState<S> {
    /// Never opened; the error is permanent.
    Unopened(SlideError),
    /// Native slide held. It may still carry a library error.
    Open(S),
}

/// An opened (or failed-to-open) whole-slide image.
///
/// The native slide is owned exclusively and closed exactly once when the
/// handle drops. Handles can be moved but not cloned.
pub struct Slide<L: SlideLibrary> {
    path: PathBuf,
    // Declared before `cache` so the slide closes before the cache is released.
    state: SlideState<L::Slide>,
    properties: PropertyMap,
    empty_values: EmptyValues,
    cache: Option<SlideCache<L::Cache>>,
}

impl<L: SlideLibrary> Slide<L> {
    // =========================================================================
    // Library-level queries
    // =========================================================================

    /// Vendor whose signature matches `path`. `None` if undetected or unreadable.
    pub fn detect_vendor(library: &L, path: impl AsRef<Path>) -> Option<String> {
        library
            .detect_vendor(path.as_ref())
            .filter(|vendor| !vendor.is_empty())
    }

    /// Version string of the slide library.
    pub fn version(library: &L) -> String {
        library.version().unwrap_or_default()
    }

    // =========================================================================
    // Open
    // =========================================================================

    /// Open `path` with default options.
    pub fn open(library: &L, path: impl AsRef<Path>) -> Self {
        Self::open_with(library, path, OpenOptions::default())
    }

    /// Open `path`.
    ///
    /// The returned handle must be checked with [`Slide::has_error`]; opening
    /// never fails outright.
    pub fn open_with(library: &L, path: impl AsRef<Path>, options: OpenOptions<L::Cache>) -> Self {
        let path = path.as_ref().to_path_buf();
        let OpenOptions {
            cache,
            empty_values,
            namespace_alias,
        } = options;

        let unopened = |path: PathBuf, err: SlideError| {
            debug!("Slide {} not opened: {}", path.display(), err);
            Self {
                path,
                state: SlideState::Unopened(err),
                properties: PropertyMap::new(),
                empty_values,
                cache: None,
            }
        };

        if File::open(&path).is_err() {
            return unopened(path.clone(), SlideError::Inaccessible(path));
        }

        let vendor = match Self::detect_vendor(library, &path) {
            Some(vendor) => vendor,
            None => return unopened(path.clone(), SlideError::UnrecognizedFormat(path)),
        };

        debug!("Opening {} slide {}", vendor, path.display());
        let mut native = match library.open(&path) {
            Some(native) => native,
            None => return unopened(path.clone(), SlideError::OpenFailed(path)),
        };

        if let Some(ref cache) = cache {
            native.set_cache(cache.native());
        }

        let properties = match native.error() {
            Some(err) => {
                debug!("Slide {} opened with error: {}", path.display(), err);
                PropertyMap::new()
            }
            None => collect_properties(&native, vendor, empty_values, namespace_alias.as_deref()),
        };

        Self {
            path,
            state: SlideState::Open(native),
            properties,
            empty_values,
            cache,
        }
    }

    // =========================================================================
    // Error state
    // =========================================================================

    /// Path the slide was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the native slide is held (it may still be in an error state).
    pub fn is_open(&self) -> bool {
        matches!(self.state, SlideState::Open(_))
    }

    /// Cache attached at open time.
    pub fn cache(&self) -> Option<&SlideCache<L::Cache>> {
        self.cache.as_ref()
    }

    pub fn has_error(&self) -> bool {
        match &self.state {
            SlideState::Unopened(_) => true,
            SlideState::Open(native) => native.error().is_some(),
        }
    }

    /// The recorded open failure, or the library's live error string.
    pub fn error_message(&self) -> Option<String> {
        match &self.state {
            SlideState::Unopened(err) => Some(err.to_string()),
            SlideState::Open(native) => native.error(),
        }
    }

    /// Fail with the current error, if any.
    pub fn check_error(&self) -> Result<(), SlideError> {
        self.native().map(|_| ())
    }

    fn native(&self) -> Result<&L::Slide, SlideError> {
        match &self.state {
            SlideState::Unopened(err) => Err(err.clone()),
            SlideState::Open(native) => match native.error() {
                Some(message) => Err(SlideError::Library(message)),
                None => Ok(native),
            },
        }
    }

    /// Run `f` against the native slide between two error checks.
    fn query<T>(&self, f: impl FnOnce(&L::Slide) -> T) -> Result<T, SlideError> {
        let value = f(self.native()?);
        self.check_error()?;
        Ok(value)
    }

    // =========================================================================
    // Levels
    // =========================================================================

    pub fn level_count(&self) -> Result<i32, SlideError> {
        self.query(|native| native.level_count())
    }

    /// `(width, height)` of level 0.
    pub fn level0_dimensions(&self) -> Result<(i64, i64), SlideError> {
        self.query(|native| native.level0_dimensions())
    }

    pub fn level_dimensions(&self, level: i32) -> Result<(i64, i64), SlideError> {
        self.query(|native| native.level_dimensions(level))
    }

    pub fn level_downsample(&self, level: i32) -> Result<f64, SlideError> {
        self.query(|native| native.level_downsample(level))
    }

    pub fn best_level_for_downsample(&self, downsample: f64) -> Result<i32, SlideError> {
        self.query(|native| native.best_level_for_downsample(downsample))
    }

    // =========================================================================
    // Regions
    // =========================================================================

    /// Read a `width` x `height` region at level-0 coordinates `(x, y)` into
    /// `dest` as premultiplied ARGB pixels.
    ///
    /// `dest` must hold exactly `width * height` pixels; it is never resized.
    pub fn read_region(
        &self,
        dest: &mut [u32],
        x: i64,
        y: i64,
        level: i32,
        width: i64,
        height: i64,
    ) -> Result<(), SlideError> {
        check_len(dest.len(), pixel_count(width, height)?)?;
        self.query(|native| native.read_region(dest, x, y, level, width, height))
    }

    /// Like [`Slide::read_region`], allocating the pixel buffer.
    pub fn read_region_vec(
        &self,
        x: i64,
        y: i64,
        level: i32,
        width: i64,
        height: i64,
    ) -> Result<Vec<u32>, SlideError> {
        self.check_error()?;
        let mut pixels = vec![0u32; pixel_count(width, height)?];
        self.read_region(&mut pixels, x, y, level, width, height)?;
        Ok(pixels)
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Names of the properties the library reports.
    pub fn property_names(&self) -> Result<Vec<String>, SlideError> {
        self.query(|native| native.property_names())
    }

    /// Value of one property, from the cached mapping when it was populated.
    pub fn property_value(&self, name: &str) -> Result<Option<String>, SlideError> {
        self.check_error()?;
        if !self.properties.is_empty() {
            return Ok(self.properties.get(name).cloned());
        }
        self.query(|native| native.property_value(name))
    }

    /// All properties.
    ///
    /// Returns the mapping populated at open time. If that is empty, the
    /// mapping is rebuilt from the library with one query per name.
    pub fn properties(&self) -> Result<PropertyMap, SlideError> {
        self.check_error()?;
        if !self.properties.is_empty() {
            return Ok(self.properties.clone());
        }

        let mut properties = PropertyMap::new();
        for name in self.property_names()? {
            if let Some(value) = self.query(|native| native.property_value(&name))? {
                if self.empty_values.admits(&value) {
                    properties.insert(name, value);
                }
            }
        }
        Ok(properties)
    }

    // =========================================================================
    // Associated images
    // =========================================================================

    pub fn associated_image_names(&self) -> Result<Vec<String>, SlideError> {
        self.query(|native| native.associated_image_names())
    }

    pub fn associated_image_dimensions(&self, name: &str) -> Result<(i64, i64), SlideError> {
        self.query(|native| native.associated_image_dimensions(name))
    }

    /// Read associated image `name` into `dest`, which must hold exactly
    /// `width * height` pixels of that image.
    pub fn read_associated_image(&self, name: &str, dest: &mut [u32]) -> Result<(), SlideError> {
        let (width, height) = self.associated_image_dimensions(name)?;
        check_len(dest.len(), pixel_count(width, height)?)?;
        self.query(|native| native.read_associated_image(name, dest))
    }

    /// Like [`Slide::read_associated_image`], allocating the pixel buffer.
    pub fn read_associated_image_vec(&self, name: &str) -> Result<Vec<u32>, SlideError> {
        let (width, height) = self.associated_image_dimensions(name)?;
        let mut pixels = vec![0u32; pixel_count(width, height)?];
        self.read_associated_image(name, &mut pixels)?;
        Ok(pixels)
    }

    // =========================================================================
    // ICC profiles
    // =========================================================================

    /// Size in bytes of the ICC profile of associated image `name`, 0 if none.
    pub fn associated_image_icc_profile_size(&self, name: &str) -> Result<i64, SlideError> {
        self.query(|native| native.associated_image_icc_profile_size(name))
    }

    /// Copy the ICC profile of associated image `name` into `dest`, which must
    /// be exactly [`Slide::associated_image_icc_profile_size`] bytes long.
    pub fn read_associated_image_icc_profile(
        &self,
        name: &str,
        dest: &mut [u8],
    ) -> Result<(), SlideError> {
        let size = byte_count(self.associated_image_icc_profile_size(name)?)?;
        check_len(dest.len(), size)?;
        if size == 0 {
            return Ok(());
        }
        self.query(|native| native.read_associated_image_icc_profile(name, dest))
    }

    /// ICC profile of associated image `name`, `None` if it has none.
    pub fn associated_image_icc_profile(&self, name: &str) -> Result<Option<Vec<u8>>, SlideError> {
        let size = byte_count(self.associated_image_icc_profile_size(name)?)?;
        if size == 0 {
            return Ok(None);
        }
        let mut profile = vec![0u8; size];
        self.read_associated_image_icc_profile(name, &mut profile)?;
        Ok(Some(profile))
    }

    /// Size in bytes of the slide's ICC profile, 0 if none.
    pub fn icc_profile_size(&self) -> Result<i64, SlideError> {
        self.query(|native| native.icc_profile_size())
    }

    /// Copy the slide's ICC profile into `dest`, which must be exactly
    /// [`Slide::icc_profile_size`] bytes long.
    pub fn read_icc_profile(&self, dest: &mut [u8]) -> Result<(), SlideError> {
        let size = byte_count(self.icc_profile_size()?)?;
        check_len(dest.len(), size)?;
        if size == 0 {
            return Ok(());
        }
        self.query(|native| native.read_icc_profile(dest))
    }

    /// The slide's ICC profile, `None` if it has none.
    pub fn icc_profile(&self) -> Result<Option<Vec<u8>>, SlideError> {
        let size = byte_count(self.icc_profile_size()?)?;
        if size == 0 {
            return Ok(None);
        }
        let mut profile = vec![0u8; size];
        self.read_icc_profile(&mut profile)?;
        Ok(Some(profile))
    }
}

impl<L: SlideLibrary> fmt::Debug for Slide<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slide")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .field("error", &self.error_message())
            .field("properties", &self.properties.len())
            .finish()
    }
}

/// Populate the property mapping of a freshly opened, error-free slide.
///
/// Synthesized keys are written first so that values the library reports
/// under the same names take precedence.
fn collect_properties<S: NativeSlide>(
    native: &S,
    vendor: String,
    empty_values: EmptyValues,
    namespace_alias: Option<&str>,
) -> PropertyMap {
    let mut props = PropertyMap::new();
    props.insert(PROPERTY_NAME_VENDOR.to_string(), vendor);

    let level_count = native.level_count();
    props.insert(PROPERTY_NAME_LEVEL_COUNT.to_string(), level_count.to_string());

    let (width, height) = native.level0_dimensions();
    props.insert(PROPERTY_NAME_BOUNDS_WIDTH.to_string(), width.to_string());
    props.insert(PROPERTY_NAME_BOUNDS_HEIGHT.to_string(), height.to_string());

    for level in 0..level_count {
        let (width, height) = native.level_dimensions(level);
        let downsample = native.level_downsample(level);
        props.insert(properties::level_width(level), width.to_string());
        props.insert(properties::level_height(level), height.to_string());
        props.insert(
            properties::level_downsample(level),
            format_downsample(downsample),
        );
    }

    for name in native.associated_image_names() {
        let (width, height) = native.associated_image_dimensions(&name);
        props.insert(properties::associated_image_width(&name), width.to_string());
        props.insert(properties::associated_image_height(&name), height.to_string());

        let icc_size = native.associated_image_icc_profile_size(&name);
        if icc_size > 0 {
            props.insert(properties::associated_image_icc_size(&name), icc_size.to_string());
        }
    }

    let icc_size = native.icc_profile_size();
    if icc_size > 0 {
        props.insert(PROPERTY_NAME_ICC_SIZE.to_string(), icc_size.to_string());
    }

    for name in native.property_names() {
        let Some(value) = native.property_value(&name) else {
            continue;
        };
        if !empty_values.admits(&value) {
            continue;
        }
        if let Some(alias) = namespace_alias.and_then(|prefix| alias_name(&name, prefix)) {
            props.insert(alias, value.clone());
        }
        props.insert(name, value);
    }

    debug!("Collected {} properties", props.len());
    props
}

fn pixel_count(width: i64, height: i64) -> Result<usize, SlideError> {
    let w = usize::try_from(width).map_err(|_| SlideError::InvalidSize(width))?;
    let h = usize::try_from(height).map_err(|_| SlideError::InvalidSize(height))?;
    w.checked_mul(h)
        .ok_or(SlideError::InvalidSize(width.saturating_mul(height)))
}

fn byte_count(size: i64) -> Result<usize, SlideError> {
    usize::try_from(size).map_err(|_| SlideError::InvalidSize(size))
}

fn check_len(actual: usize, expected: usize) -> Result<(), SlideError> {
    if actual == expected {
        Ok(())
    } else {
        Err(SlideError::BufferSize { expected, actual })
    }
}
