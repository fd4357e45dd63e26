//! Viewport geometry and the state that tracks it across resize events
//!
//! The viewport is the sub-rectangle of the native window that receives
//! pixel content. A resize event always resets it to cover the full new
//! client area at the origin, which keeps the containment invariant
//! (`viewport` inside `window`) trivially true.

use std::fmt;

/// Width and height of a pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Size {
    /// Zero-by-zero size
    pub const ZERO: Self = Self { width: 0, height: 0 };

    /// Create a size from width and height
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels covered by this size
    pub const fn area(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// True when either dimension is zero
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Destination rectangle inside the window where content is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Horizontal offset of the rectangle from the window origin
    pub x: i32,
    /// Vertical offset of the rectangle from the window origin
    pub y: i32,
    /// Rectangle dimensions
    pub size: Size,
}

impl Viewport {
    /// Viewport covering `size` at the window origin
    pub const fn at_origin(size: Size) -> Self {
        Self { x: 0, y: 0, size }
    }

    /// True when this viewport lies fully inside a window of `window` size
    pub fn contained_in(self, window: Size) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x as i64 + i64::from(self.size.width) <= i64::from(window.width)
            && self.y as i64 + i64::from(self.size.height) <= i64::from(window.height)
    }
}

/// Tracks window client size, last submitted buffer size, and the viewport
///
/// Owned by the surface handle; mutated only by resize events and by each
/// frame's buffer dimensions.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ViewportState {
    window: Size,
    buffer: Size,
    viewport: Viewport,
}

impl ViewportState {
    /// Initial state: buffer size and viewport both equal the window size
    pub(crate) fn new(window: Size) -> Self {
        Self {
            window,
            buffer: window,
            viewport: Viewport::at_origin(window),
        }
    }

    pub(crate) fn window_size(&self) -> Size {
        self.window
    }

    pub(crate) fn buffer_size(&self) -> Size {
        self.buffer
    }

    pub(crate) fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Apply a native resize: the viewport snaps back to the full new
    /// client area at the origin
    pub(crate) fn apply_resize(&mut self, window: Size) {
        self.window = window;
        self.viewport = Viewport::at_origin(window);
    }

    /// Record the dimensions of the buffer submitted this frame
    pub(crate) fn set_buffer_size(&mut self, buffer: Size) {
        self.buffer = buffer;
    }

    /// True when the current buffer must be resampled to fit the viewport
    pub(crate) fn needs_scaling(&self) -> bool {
        self.buffer != self.viewport.size
    }
}
