//! The long-lived surface handle and its per-frame update cycle
//!
//! A [`Surface`] owns one native window, the viewport state describing
//! where content lands inside it, and a scaler cache for frames whose
//! dimensions do not match the viewport. The caller drives it with one
//! [`Surface::update`] per rendered frame.
//!
//! # Lifecycle
//!
//! A surface is `Open` from construction until a close is observed. The
//! same `update` call that observes the close tears the backend down and
//! reports [`UpdateStatus::Terminated`]; every later call fails with
//! [`SurfaceError::Closed`] without touching native state. The close
//! transition is irreversible.

use crate::backend;
use crate::config::SurfaceConfig;
use crate::error::{SurfaceError, SurfaceResult};
use crate::scale::{scale_nearest, ScalerCache};
use crate::surface::backend::PresentBackend;
use crate::surface::events::SurfaceEvent;
use crate::surface::viewport::{Size, Viewport, ViewportState};

/// One frame of 32-bit packed pixels, borrowed for a single update call
///
/// The surface never retains the slice; the caller may reuse or free the
/// memory as soon as [`Surface::update`] returns.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pixels: &'a [u32],
    size: Size,
}

impl<'a> Frame<'a> {
    /// Wrap a pixel slice with its dimensions
    ///
    /// # Errors
    /// [`SurfaceError::FrameSize`] if `pixels` does not hold exactly
    /// `width * height` elements.
    pub fn new(pixels: &'a [u32], width: u32, height: u32) -> SurfaceResult<Self> {
        let size = Size::new(width, height);
        if pixels.len() != size.area() {
            return Err(SurfaceError::FrameSize {
                expected: size.area(),
                actual: pixels.len(),
                width,
                height,
            });
        }
        Ok(Self { pixels, size })
    }

    /// The wrapped pixels
    pub fn pixels(&self) -> &'a [u32] {
        self.pixels
    }

    /// Frame dimensions
    pub fn size(&self) -> Size {
        self.size
    }
}

/// Outcome of one [`Surface::update`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    /// The frame is on screen
    Presented,
    /// No frame was supplied; only events were pumped
    Polled,
    /// A close was observed and all native resources have been released;
    /// stop calling `update` on this surface
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceState {
    Open,
    /// A close was observed during the current event pump; teardown happens
    /// before the same `update` call returns
    Closing,
    Closed,
}

/// Handle to one open presentation window
///
/// Single-threaded by design: no internal locking, and `update` never
/// blocks waiting for input.
pub struct Surface {
    state: SurfaceState,
    viewport: ViewportState,
    cache: ScalerCache,
    backend: Box<dyn PresentBackend>,
    pending: Vec<SurfaceEvent>,
}

impl Surface {
    /// Open a native window centered on the primary display with a client
    /// area of exactly `width x height`
    ///
    /// # Errors
    /// [`SurfaceError::BackendInit`] if the display cannot be opened, a
    /// 32-bit pixel depth is unavailable, or window creation fails. No
    /// native resources are leaked on failure.
    pub fn open(title: &str, width: u32, height: u32) -> SurfaceResult<Self> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::BackendInit(format!(
                "window dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let backend = backend::open_native(title, width, height)?;
        log::info!("surface \"{title}\" opened at {width}x{height}");
        Ok(Self::from_backend(backend, Size::new(width, height)))
    }

    /// Open a surface from a [`SurfaceConfig`]
    ///
    /// # Errors
    /// Same as [`Surface::open`].
    pub fn open_with(config: &SurfaceConfig) -> SurfaceResult<Self> {
        Self::open(&config.title, config.width, config.height)
    }

    pub(crate) fn from_backend(backend: Box<dyn PresentBackend>, initial: Size) -> Self {
        Self {
            state: SurfaceState::Open,
            viewport: ViewportState::new(initial),
            cache: ScalerCache::new(),
            backend,
            pending: Vec::new(),
        }
    }

    /// Pump native events and, if a frame is supplied, put it on screen
    ///
    /// Resize events reset the viewport to the full new client area and
    /// invalidate the scaler cache. If the frame's dimensions differ from
    /// the viewport, the frame is resampled into the cache first; otherwise
    /// it is presented directly.
    ///
    /// # Errors
    /// - [`SurfaceError::Closed`] if the surface was already terminated
    ///   (no native operation is performed)
    /// - [`SurfaceError::CacheAlloc`] if the scaler cache cannot be
    ///   allocated; the surface stays open and the next call may retry
    /// - [`SurfaceError::Native`] if event pumping or pixel submission
    ///   fails; the surface stays open
    pub fn update(&mut self, frame: Option<Frame<'_>>) -> SurfaceResult<UpdateStatus> {
        if self.state == SurfaceState::Closed {
            return Err(SurfaceError::Closed);
        }

        let mut events = std::mem::take(&mut self.pending);
        let pumped = self.backend.pump_events(&mut events);
        for event in events.drain(..) {
            match event {
                SurfaceEvent::Resized { width, height } => {
                    let size = Size::new(width, height);
                    log::debug!("window resized to {size}");
                    self.viewport.apply_resize(size);
                    self.cache.invalidate();
                }
                SurfaceEvent::CloseRequested => {
                    self.state = SurfaceState::Closing;
                }
            }
        }
        self.pending = events;

        // A close observed this pump always wins, even over a pump that
        // failed partway through draining.
        if self.state == SurfaceState::Closing {
            log::info!("close requested, releasing surface");
            self.backend.destroy();
            self.state = SurfaceState::Closed;
            return Ok(UpdateStatus::Terminated);
        }
        pumped?;

        let Some(frame) = frame else {
            return Ok(UpdateStatus::Polled);
        };

        self.viewport.set_buffer_size(frame.size());
        let viewport = self.viewport.viewport();
        if viewport.size.is_empty() || frame.size().is_empty() {
            // Nothing visible to map the buffer onto.
            return Ok(UpdateStatus::Presented);
        }

        if self.viewport.needs_scaling() {
            self.cache.ensure(viewport.size)?;
            scale_nearest(
                frame.pixels(),
                frame.size(),
                self.cache.pixels_mut(),
                viewport.size,
            );
            self.backend
                .present(self.cache.pixels(), viewport.size, viewport)?;
        } else {
            self.backend.present(frame.pixels(), frame.size(), viewport)?;
        }

        Ok(UpdateStatus::Presented)
    }

    /// Pump events without presenting; shorthand for `update(None)`
    ///
    /// # Errors
    /// Same as [`Surface::update`].
    pub fn poll(&mut self) -> SurfaceResult<UpdateStatus> {
        self.update(None)
    }

    /// Tear the surface down before a close event arrives
    ///
    /// Idempotent; after this every `update` fails with
    /// [`SurfaceError::Closed`].
    pub fn close(&mut self) {
        if self.state != SurfaceState::Closed {
            self.backend.destroy();
            self.state = SurfaceState::Closed;
        }
    }

    /// True until a close has been observed or [`Surface::close`] called
    pub fn is_open(&self) -> bool {
        self.state == SurfaceState::Open
    }

    /// Current native window client size
    pub fn window_size(&self) -> Size {
        self.viewport.window_size()
    }

    /// Dimensions of the most recently submitted frame
    pub fn buffer_size(&self) -> Size {
        self.viewport.buffer_size()
    }

    /// Rectangle inside the window where content is drawn
    pub fn viewport(&self) -> Viewport {
        self.viewport.viewport()
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;

    fn open_mock(width: u32, height: u32) -> (Surface, crate::backend::mock::SharedMockState) {
        let (backend, state) = MockBackend::new();
        let surface = Surface::from_backend(Box::new(backend), Size::new(width, height));
        (surface, state)
    }

    fn solid_frame(width: u32, height: u32, color: u32) -> Vec<u32> {
        vec![color; (width * height) as usize]
    }

    #[test]
    fn test_first_update_presents_unscaled() {
        let (mut surface, state) = open_mock(320, 240);
        let pixels = solid_frame(320, 240, 0x00ff_0000);
        let frame = Frame::new(&pixels, 320, 240).unwrap();

        let status = surface.update(Some(frame)).unwrap();
        assert_eq!(status, UpdateStatus::Presented);

        let mock = state.borrow();
        assert_eq!(mock.presented.len(), 1);
        assert_eq!(mock.presented[0].size, Size::new(320, 240));
        assert_eq!((mock.presented[0].viewport.x, mock.presented[0].viewport.y), (0, 0));
        // Unscaled path: the caller's pixels went straight through.
        assert!(mock.presented[0].pixels.iter().all(|&px| px == 0x00ff_0000));
        drop(mock);
        assert!(surface.cache.is_empty());
    }

    #[test]
    fn test_resize_presents_through_rebuilt_cache() {
        let (mut surface, state) = open_mock(320, 240);
        state
            .borrow_mut()
            .queued
            .push_back(SurfaceEvent::Resized { width: 640, height: 480 });

        let pixels = solid_frame(320, 240, 0x0000_00ff);
        let frame = Frame::new(&pixels, 320, 240).unwrap();
        let status = surface.update(Some(frame)).unwrap();
        assert_eq!(status, UpdateStatus::Presented);

        assert_eq!(surface.window_size(), Size::new(640, 480));
        assert_eq!(surface.viewport().size, Size::new(640, 480));
        // Cache dimensions track the viewport whenever scaling is active.
        assert_eq!(surface.cache.size(), Size::new(640, 480));

        let mock = state.borrow();
        assert_eq!(mock.presented.len(), 1);
        assert_eq!(mock.presented[0].size, Size::new(640, 480));
        assert_eq!(mock.presented[0].pixels.len(), 640 * 480);
        assert!(mock.presented[0].pixels.iter().all(|&px| px == 0x0000_00ff));
    }

    #[test]
    fn test_matching_buffer_after_resize_skips_scaling() {
        let (mut surface, state) = open_mock(320, 240);
        state
            .borrow_mut()
            .queued
            .push_back(SurfaceEvent::Resized { width: 640, height: 480 });

        let pixels = solid_frame(640, 480, 0x00ab_cdef);
        let frame = Frame::new(&pixels, 640, 480).unwrap();
        surface.update(Some(frame)).unwrap();

        assert!(surface.cache.is_empty());
        assert_eq!(state.borrow().presented[0].size, Size::new(640, 480));
    }

    #[test]
    fn test_close_event_terminates_and_releases_once() {
        let (mut surface, state) = open_mock(320, 240);
        state.borrow_mut().queued.push_back(SurfaceEvent::CloseRequested);

        let pixels = solid_frame(320, 240, 0);
        let frame = Frame::new(&pixels, 320, 240).unwrap();
        let status = surface.update(Some(frame)).unwrap();
        assert_eq!(status, UpdateStatus::Terminated);
        assert!(!surface.is_open());

        {
            let mock = state.borrow();
            assert_eq!(mock.destroy_calls, 1);
            // The closing update must not present.
            assert!(mock.presented.is_empty());
        }

        // Every later call is the caller-bug case and performs no native work.
        assert!(matches!(surface.update(None), Err(SurfaceError::Closed)));
        assert!(matches!(
            surface.update(Some(Frame::new(&pixels, 320, 240).unwrap())),
            Err(SurfaceError::Closed)
        ));
        drop(surface);
        assert_eq!(state.borrow().destroy_calls, 1);
    }

    #[test]
    fn test_close_beats_resize_in_same_pump() {
        let (mut surface, state) = open_mock(320, 240);
        {
            let mut mock = state.borrow_mut();
            mock.queued.push_back(SurfaceEvent::Resized { width: 100, height: 100 });
            mock.queued.push_back(SurfaceEvent::CloseRequested);
        }

        let pixels = solid_frame(320, 240, 0);
        let frame = Frame::new(&pixels, 320, 240).unwrap();
        assert_eq!(surface.update(Some(frame)).unwrap(), UpdateStatus::Terminated);
        assert!(state.borrow().presented.is_empty());
    }

    #[test]
    fn test_poll_only_pumps_events() {
        let (mut surface, state) = open_mock(320, 240);
        state
            .borrow_mut()
            .queued
            .push_back(SurfaceEvent::Resized { width: 800, height: 600 });

        assert_eq!(surface.poll().unwrap(), UpdateStatus::Polled);
        assert_eq!(surface.window_size(), Size::new(800, 600));
        assert!(state.borrow().presented.is_empty());
    }

    #[test]
    fn test_poll_observing_close_terminates() {
        let (mut surface, state) = open_mock(320, 240);
        state.borrow_mut().queued.push_back(SurfaceEvent::CloseRequested);
        assert_eq!(surface.poll().unwrap(), UpdateStatus::Terminated);
        assert_eq!(state.borrow().destroy_calls, 1);
    }

    #[test]
    fn test_explicit_close_is_idempotent() {
        let (mut surface, state) = open_mock(320, 240);
        surface.close();
        surface.close();
        assert_eq!(state.borrow().destroy_calls, 1);
        assert!(matches!(surface.poll(), Err(SurfaceError::Closed)));
    }

    #[test]
    fn test_drop_releases_abandoned_surface() {
        let (surface, state) = open_mock(320, 240);
        drop(surface);
        assert_eq!(state.borrow().destroy_calls, 1);
    }

    #[test]
    fn test_frame_dimension_validation() {
        let pixels = vec![0u32; 100];
        assert!(Frame::new(&pixels, 10, 10).is_ok());

        let err = Frame::new(&pixels, 20, 10).unwrap_err();
        assert!(matches!(
            err,
            SurfaceError::FrameSize { expected: 200, actual: 100, .. }
        ));
    }

    #[test]
    fn test_present_failure_keeps_surface_open() {
        let (mut surface, state) = open_mock(64, 64);
        state.borrow_mut().fail_next_present = true;

        let pixels = solid_frame(64, 64, 0x0012_3456);
        let frame = Frame::new(&pixels, 64, 64).unwrap();
        assert!(matches!(surface.update(Some(frame)), Err(SurfaceError::Native(_))));
        assert!(surface.is_open());

        // Next frame goes through normally.
        let frame = Frame::new(&pixels, 64, 64).unwrap();
        assert_eq!(surface.update(Some(frame)).unwrap(), UpdateStatus::Presented);
    }

    #[test]
    fn test_scaled_content_comes_from_source() {
        let (mut surface, state) = open_mock(2, 2);
        state
            .borrow_mut()
            .queued
            .push_back(SurfaceEvent::Resized { width: 4, height: 4 });

        let pixels = vec![0x11, 0x22, 0x33, 0x44];
        let frame = Frame::new(&pixels, 2, 2).unwrap();
        surface.update(Some(frame)).unwrap();

        let mock = state.borrow();
        for px in &mock.presented[0].pixels {
            assert!(pixels.contains(px));
        }
    }
}
