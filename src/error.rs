use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by slide and cache handles.
///
/// Precondition failures (`Inaccessible`, `UnrecognizedFormat`, `OpenFailed`)
/// are recorded on the handle at open time and re-raised by every query.
/// `Library` carries the live error string of the native library verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlideError {
    /// The path could not be opened for reading
    #[error("File does not exist or cannot be accessed: {}", .0.display())]
    Inaccessible(PathBuf),

    /// No vendor matched the file's signature
    #[error("Unrecognized file format: {}", .0.display())]
    UnrecognizedFormat(PathBuf),

    /// The library's open primitive returned nothing
    #[error("Failed to open slide file: {}", .0.display())]
    OpenFailed(PathBuf),

    /// Error string reported by the native library
    #[error("{0}")]
    Library(String),

    /// The native cache object could not be allocated
    #[error("Failed to create slide cache with capacity {capacity} bytes")]
    CacheCreation { capacity: usize },

    /// Destination buffer length does not match what the read will write
    #[error("Destination buffer holds {actual} elements, read needs exactly {expected}")]
    BufferSize { expected: usize, actual: usize },

    /// A requested dimension or size was negative or overflows the address space
    #[error("Invalid size {0}")]
    InvalidSize(i64),
}
