//! Binding to the system `libopenslide`, through the `openslide-sys`
//! generated declarations.
//!
//! Raw pointers never leave this module. [`OpenSlideHandle`] closes its
//! `openslide_t` and [`OpenSlideCache`] releases its `openslide_cache_t`
//! exactly once, in `Drop`.

use std::ffi::{c_char, CStr, CString};
use std::path::Path;
use std::ptr::NonNull;

use openslide_sys::sys;

use super::{NativeSlide, SlideLibrary};

/// Copy a borrowed C string, treating NULL as absent.
///
/// # Safety
/// `ptr` must be NULL or point to a NUL-terminated string valid for the call.
unsafe fn borrowed_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}

/// Copy a NULL-terminated array of C strings.
///
/// # Safety
/// `list` must be NULL or a NULL-terminated array of valid C strings.
unsafe fn borrowed_string_list(list: *const *const c_char) -> Vec<String> {
    let mut out = Vec::new();
    if list.is_null() {
        return out;
    }
    let mut i = 0;
    loop {
        let item = *list.add(i);
        if item.is_null() {
            break;
        }
        out.push(CStr::from_ptr(item).to_string_lossy().into_owned());
        i += 1;
    }
    out
}

#[cfg(unix)]
fn path_to_cstring(path: &Path) -> Option<CString> {
    use std::os::unix::ffi::OsStrExt;

    CString::new(path.as_os_str().as_bytes()).ok()
}

#[cfg(not(unix))]
fn path_to_cstring(path: &Path) -> Option<CString> {
    CString::new(path.to_str()?).ok()
}

// =============================================================================
// Library
// =============================================================================

/// The system OpenSlide library.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSlide;

impl SlideLibrary for OpenSlide {
    type Slide = OpenSlideHandle;
    type Cache = OpenSlideCache;

    fn detect_vendor(&self, path: &Path) -> Option<String> {
        let filename = path_to_cstring(path)?;
        // SAFETY: filename is a valid C string; the result is a static string or NULL.
        unsafe { borrowed_string(sys::openslide_detect_vendor(filename.as_ptr())) }
    }

    fn open(&self, path: &Path) -> Option<OpenSlideHandle> {
        let filename = path_to_cstring(path)?;
        // SAFETY: filename is a valid C string for the duration of the call.
        let osr = unsafe { sys::openslide_open(filename.as_ptr()) };
        NonNull::new(osr).map(|osr| OpenSlideHandle { osr })
    }

    fn create_cache(&self, capacity: usize) -> Option<OpenSlideCache> {
        // SAFETY: plain allocation call.
        let cache = unsafe { sys::openslide_cache_create(capacity) };
        NonNull::new(cache).map(|cache| OpenSlideCache { cache })
    }

    fn version(&self) -> Option<String> {
        // SAFETY: returns a static string.
        unsafe { borrowed_string(sys::openslide_get_version()) }
    }
}

/// Version of the linked OpenSlide library.
pub fn version() -> String {
    OpenSlide.version().unwrap_or_default()
}

// =============================================================================
// Cache
// =============================================================================

/// Owned reference to an `openslide_cache_t`.
pub struct OpenSlideCache {
    cache: NonNull<sys::openslide_cache_t>,
}

// SAFETY: OpenSlide caches are internally locked and may be shared across
// slides used from different threads.
unsafe impl Send for OpenSlideCache {}
unsafe impl Sync for OpenSlideCache {}

impl Drop for OpenSlideCache {
    fn drop(&mut self) {
        // SAFETY: we own one reference, released here exactly once.
        unsafe { sys::openslide_cache_release(self.cache.as_ptr()) }
    }
}

// =============================================================================
// Slide
// =============================================================================

/// Owned `openslide_t`.
pub struct OpenSlideHandle {
    osr: NonNull<sys::openslide_t>,
}

// SAFETY: the handle may move between threads; it is not Sync, so concurrent
// calls still need external locking.
unsafe impl Send for OpenSlideHandle {}

impl Drop for OpenSlideHandle {
    fn drop(&mut self) {
        // SAFETY: osr came from openslide_open and is closed only here.
        unsafe { sys::openslide_close(self.osr.as_ptr()) }
    }
}

impl OpenSlideHandle {
    fn raw(&self) -> *mut sys::openslide_t {
        self.osr.as_ptr()
    }
}

// SAFETY (all methods below): `self.raw()` is a live handle for as long as
// `self` exists, name strings are NUL-terminated for the duration of each
// call, and destination buffers have been length-checked by the caller.
impl NativeSlide for OpenSlideHandle {
    type Cache = OpenSlideCache;

    fn error(&self) -> Option<String> {
        unsafe { borrowed_string(sys::openslide_get_error(self.raw())) }
    }

    fn set_cache(&mut self, cache: &OpenSlideCache) {
        // OpenSlide takes its own reference to the cache.
        unsafe { sys::openslide_set_cache(self.raw(), cache.cache.as_ptr()) }
    }

    fn level_count(&self) -> i32 {
        unsafe { sys::openslide_get_level_count(self.raw()) }
    }

    fn level0_dimensions(&self) -> (i64, i64) {
        let (mut w, mut h) = (0i64, 0i64);
        unsafe { sys::openslide_get_level0_dimensions(self.raw(), &mut w, &mut h) };
        (w, h)
    }

    fn level_dimensions(&self, level: i32) -> (i64, i64) {
        let (mut w, mut h) = (0i64, 0i64);
        unsafe { sys::openslide_get_level_dimensions(self.raw(), level, &mut w, &mut h) };
        (w, h)
    }

    fn level_downsample(&self, level: i32) -> f64 {
        unsafe { sys::openslide_get_level_downsample(self.raw(), level) }
    }

    fn best_level_for_downsample(&self, downsample: f64) -> i32 {
        unsafe { sys::openslide_get_best_level_for_downsample(self.raw(), downsample) }
    }

    fn read_region(&self, dest: &mut [u32], x: i64, y: i64, level: i32, width: i64, height: i64) {
        unsafe {
            sys::openslide_read_region(self.raw(), dest.as_mut_ptr(), x, y, level, width, height)
        }
    }

    fn property_names(&self) -> Vec<String> {
        unsafe { borrowed_string_list(sys::openslide_get_property_names(self.raw())) }
    }

    fn property_value(&self, name: &str) -> Option<String> {
        let name = CString::new(name).ok()?;
        unsafe { borrowed_string(sys::openslide_get_property_value(self.raw(), name.as_ptr())) }
    }

    fn associated_image_names(&self) -> Vec<String> {
        unsafe { borrowed_string_list(sys::openslide_get_associated_image_names(self.raw())) }
    }

    fn associated_image_dimensions(&self, name: &str) -> (i64, i64) {
        let (mut w, mut h) = (-1i64, -1i64);
        if let Ok(name) = CString::new(name) {
            unsafe {
                sys::openslide_get_associated_image_dimensions(
                    self.raw(),
                    name.as_ptr(),
                    &mut w,
                    &mut h,
                )
            };
        }
        (w, h)
    }

    fn read_associated_image(&self, name: &str, dest: &mut [u32]) {
        if let Ok(name) = CString::new(name) {
            unsafe {
                sys::openslide_read_associated_image(self.raw(), name.as_ptr(), dest.as_mut_ptr())
            }
        }
    }

    fn associated_image_icc_profile_size(&self, name: &str) -> i64 {
        match CString::new(name) {
            Ok(name) => unsafe {
                sys::openslide_get_associated_image_icc_profile_size(self.raw(), name.as_ptr())
            },
            Err(_) => -1,
        }
    }

    fn read_associated_image_icc_profile(&self, name: &str, dest: &mut [u8]) {
        if let Ok(name) = CString::new(name) {
            unsafe {
                sys::openslide_read_associated_image_icc_profile(
                    self.raw(),
                    name.as_ptr(),
                    dest.as_mut_ptr().cast(),
                )
            }
        }
    }

    fn icc_profile_size(&self) -> i64 {
        unsafe { sys::openslide_get_icc_profile_size(self.raw()) }
    }

    fn read_icc_profile(&self, dest: &mut [u8]) {
        unsafe { sys::openslide_read_icc_profile(self.raw(), dest.as_mut_ptr().cast()) }
    }
}
