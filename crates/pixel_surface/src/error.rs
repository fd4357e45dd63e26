//! Error types for surface creation and the per-frame update cycle

use thiserror::Error;

/// Errors reported by [`crate::Surface`] and the platform backends
///
/// Construction failures (`BackendInit`) are fatal to the call that raised
/// them and never leak native resources. Per-frame failures (`CacheAlloc`,
/// `FrameSize`, `Native`) leave the surface open; the caller may simply try
/// again on the next frame. `Closed` indicates a call after the surface was
/// torn down, which is a caller bug in correct usage.
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// The display could not be opened, the required 32-bit pixel depth is
    /// unavailable, or native window creation failed
    #[error("backend initialization failed: {0}")]
    BackendInit(String),

    /// Allocating the intermediate scaler buffer failed; the surface stays
    /// open and the next update may retry
    #[error("scaler cache allocation failed for {width}x{height} viewport")]
    CacheAlloc {
        /// Requested cache width in pixels
        width: u32,
        /// Requested cache height in pixels
        height: u32,
    },

    /// The surface has already been closed; no native operation was performed
    #[error("surface has been closed")]
    Closed,

    /// The supplied frame buffer does not hold `width * height` pixels
    #[error("frame buffer holds {actual} pixels, expected {expected} for {width}x{height}")]
    FrameSize {
        /// Pixel count implied by the declared dimensions
        expected: usize,
        /// Pixel count actually supplied
        actual: usize,
        /// Declared frame width
        width: u32,
        /// Declared frame height
        height: u32,
    },

    /// A native event-pump or pixel-submission call failed
    #[error("native display operation failed: {0}")]
    Native(String),
}

/// Convenience alias used throughout the crate
pub type SurfaceResult<T> = Result<T, SurfaceError>;
