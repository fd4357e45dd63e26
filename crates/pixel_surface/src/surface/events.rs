//! Events a backend reports back to the surface during a pump
//!
//! Only the notifications the update cycle acts on are modeled; everything
//! else stays inside the backend and takes the platform's default path.

/// A native window notification relevant to the update cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SurfaceEvent {
    /// The window client area changed size
    Resized {
        /// New client width in pixels
        width: u32,
        /// New client height in pixels
        height: u32,
    },
    /// The user or the OS asked the window to close
    ///
    /// Both an explicit close request and a destroy notification map here;
    /// the surface treats them identically and irreversibly.
    CloseRequested,
}
