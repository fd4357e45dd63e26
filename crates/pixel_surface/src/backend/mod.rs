//! Platform presentation backends
//!
//! One concrete [`PresentBackend`](crate::surface::backend::PresentBackend)
//! implementation exists per supported OS and is selected at build time.
//! The update cycle in `surface::handle` never sees a concrete type, only
//! the trait.

#[cfg(test)]
pub(crate) mod mock;

#[cfg(unix)]
pub(crate) mod x11;

#[cfg(windows)]
pub(crate) mod win32;

use crate::error::SurfaceResult;
use crate::surface::backend::PresentBackend;

/// Open the native backend for the current platform
#[cfg(unix)]
pub(crate) fn open_native(
    title: &str,
    width: u32,
    height: u32,
) -> SurfaceResult<Box<dyn PresentBackend>> {
    Ok(Box::new(x11::X11Backend::open(title, width, height)?))
}

/// Open the native backend for the current platform
#[cfg(windows)]
pub(crate) fn open_native(
    title: &str,
    width: u32,
    height: u32,
) -> SurfaceResult<Box<dyn PresentBackend>> {
    Ok(Box::new(win32::Win32Backend::open(title, width, height)?))
}
