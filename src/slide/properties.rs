//! Property names and the cached property mapping.
//!
//! Every value is a string; numbers are stored in decimal form. Names live
//! under the `openslide.` namespace, with per-level and per-associated-image
//! keys built by the functions below.

use std::collections::BTreeMap;

use super::cache::SlideCache;

/// Ordered property mapping, name to value.
pub type PropertyMap = BTreeMap<String, String>;

/// Namespace prefix of the standard property names.
pub const NAMESPACE: &str = "openslide";

pub const PROPERTY_NAME_VENDOR: &str = "openslide.vendor";
pub const PROPERTY_NAME_BACKGROUND_COLOR: &str = "openslide.background-color";
pub const PROPERTY_NAME_BOUNDS_HEIGHT: &str = "openslide.bounds-height";
pub const PROPERTY_NAME_BOUNDS_WIDTH: &str = "openslide.bounds-width";
pub const PROPERTY_NAME_BOUNDS_X: &str = "openslide.bounds-x";
pub const PROPERTY_NAME_BOUNDS_Y: &str = "openslide.bounds-y";
pub const PROPERTY_NAME_COMMENT: &str = "openslide.comment";
pub const PROPERTY_NAME_MPP_X: &str = "openslide.mpp-x";
pub const PROPERTY_NAME_MPP_Y: &str = "openslide.mpp-y";
pub const PROPERTY_NAME_OBJECTIVE_POWER: &str = "openslide.objective-power";
pub const PROPERTY_NAME_QUICKHASH1: &str = "openslide.quickhash-1";
pub const PROPERTY_NAME_LEVEL_COUNT: &str = "openslide.level-count";
pub const PROPERTY_NAME_ICC_SIZE: &str = "openslide.icc-size";

/// `openslide.level[<level>].width`
pub fn level_width(level: i32) -> String {
    format!("{NAMESPACE}.level[{level}].width")
}

/// `openslide.level[<level>].height`
pub fn level_height(level: i32) -> String {
    format!("{NAMESPACE}.level[{level}].height")
}

/// `openslide.level[<level>].downsample`
pub fn level_downsample(level: i32) -> String {
    format!("{NAMESPACE}.level[{level}].downsample")
}

/// `openslide.associated-image[<name>].width`
pub fn associated_image_width(name: &str) -> String {
    format!("{NAMESPACE}.associated-image[{name}].width")
}

/// `openslide.associated-image[<name>].height`
pub fn associated_image_height(name: &str) -> String {
    format!("{NAMESPACE}.associated-image[{name}].height")
}

/// `openslide.associated-image[<name>].icc-size`
pub fn associated_image_icc_size(name: &str) -> String {
    format!("{NAMESPACE}.associated-image[{name}].icc-size")
}

/// Downsample factors keep six fractional digits, e.g. `4.000000`.
pub fn format_downsample(downsample: f64) -> String {
    format!("{downsample:.6}")
}

// =============================================================================
// Open Options
// =============================================================================

/// What to do with native properties whose value is the empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyValues {
    /// Store them like any other value.
    #[default]
    Keep,
    /// Leave them out of the mapping.
    Drop,
}

impl EmptyValues {
    pub(crate) fn admits(self, value: &str) -> bool {
        match self {
            EmptyValues::Keep => true,
            EmptyValues::Drop => !value.is_empty(),
        }
    }
}

/// Options applied when a slide is opened.
pub struct OpenOptions<C> {
    pub(crate) cache: Option<SlideCache<C>>,
    pub(crate) empty_values: EmptyValues,
    pub(crate) namespace_alias: Option<String>,
}

impl<C> Default for OpenOptions<C> {
    fn default() -> Self {
        Self {
            cache: None,
            empty_values: EmptyValues::Keep,
            namespace_alias: None,
        }
    }
}

impl<C> OpenOptions<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `cache` to the slide before any read.
    pub fn with_cache(mut self, cache: SlideCache<C>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_empty_values(mut self, empty_values: EmptyValues) -> Self {
        self.empty_values = empty_values;
        self
    }

    /// Also publish every native `openslide.` key under `<prefix>.`.
    pub fn with_namespace_alias(mut self, prefix: impl Into<String>) -> Self {
        self.namespace_alias = Some(prefix.into());
        self
    }
}

/// Rewrite the `openslide.` prefix of `name` to `<alias>.`.
///
/// Returns `None` for names outside the standard namespace.
pub(crate) fn alias_name(name: &str, alias: &str) -> Option<String> {
    name.strip_prefix(NAMESPACE)
        .filter(|rest| rest.starts_with('.'))
        .map(|rest| format!("{alias}{rest}"))
}
