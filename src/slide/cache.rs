//! Shared decode-tile cache.
//!
//! The cache itself lives inside the slide library; [`SlideCache`] owns one
//! native reference and hands out clones of an `Arc` so several slides can use
//! the same capacity budget. The native object is released when the last clone
//! drops.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::SlideError;
use crate::native::SlideLibrary;

/// Shareable handle to a native tile cache.
pub struct SlideCache<C> {
    inner: Arc<C>,
    capacity: usize,
}

impl<C> SlideCache<C> {
    /// Allocate a cache holding up to `capacity` bytes of decoded tiles.
    ///
    /// # Errors
    ///
    /// Returns `SlideError::CacheCreation` if the library cannot allocate it.
    pub fn create<L>(library: &L, capacity: usize) -> Result<Self, SlideError>
    where
        L: SlideLibrary<Cache = C>,
    {
        let native = library
            .create_cache(capacity)
            .ok_or(SlideError::CacheCreation { capacity })?;
        debug!("Created slide cache with capacity {} bytes", capacity);
        Ok(Self {
            inner: Arc::new(native),
            capacity,
        })
    }

    /// Capacity in bytes requested at creation.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live handles sharing this cache, slides included.
    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    pub(crate) fn native(&self) -> &C {
        &self.inner
    }
}

// Manual impl: cloning shares the native object and must not require `C: Clone`.
impl<C> Clone for SlideCache<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            capacity: self.capacity,
        }
    }
}

impl<C> fmt::Debug for SlideCache<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlideCache")
            .field("capacity", &self.capacity)
            .field("holders", &self.holders())
            .finish()
    }
}
