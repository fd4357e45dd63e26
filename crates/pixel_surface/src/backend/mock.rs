//! Scripted backend for exercising the update cycle in tests
//!
//! Tests queue native events up front and inspect what the surface asked
//! the backend to do afterwards. State is shared through an `Rc` so the
//! test keeps visibility after the backend moves into the surface.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::{SurfaceError, SurfaceResult};
use crate::surface::backend::PresentBackend;
use crate::surface::events::SurfaceEvent;
use crate::surface::viewport::{Size, Viewport};

/// One recorded `present` invocation
pub(crate) struct PresentCall {
    pub(crate) pixels: Vec<u32>,
    pub(crate) size: Size,
    pub(crate) viewport: Viewport,
}

/// Observable state shared between a test and its [`MockBackend`]
#[derive(Default)]
pub(crate) struct MockState {
    /// Events the next pump will deliver, in order
    pub(crate) queued: VecDeque<SurfaceEvent>,
    /// Every present call the surface issued
    pub(crate) presented: Vec<PresentCall>,
    /// Raw count of destroy invocations (exactly-once is asserted on this)
    pub(crate) destroy_calls: usize,
    /// Make the next present fail with a native error
    pub(crate) fail_next_present: bool,
}

pub(crate) type SharedMockState = Rc<RefCell<MockState>>;

pub(crate) struct MockBackend {
    state: SharedMockState,
    destroyed: bool,
}

impl MockBackend {
    pub(crate) fn new() -> (Self, SharedMockState) {
        let state = Rc::new(RefCell::new(MockState::default()));
        (
            Self {
                state: Rc::clone(&state),
                destroyed: false,
            },
            state,
        )
    }
}

impl PresentBackend for MockBackend {
    fn pump_events(&mut self, out: &mut Vec<SurfaceEvent>) -> SurfaceResult<()> {
        assert!(!self.destroyed, "pump after destroy");
        out.extend(self.state.borrow_mut().queued.drain(..));
        Ok(())
    }

    fn present(&mut self, pixels: &[u32], size: Size, viewport: Viewport) -> SurfaceResult<()> {
        assert!(!self.destroyed, "present after destroy");
        let mut state = self.state.borrow_mut();
        if state.fail_next_present {
            state.fail_next_present = false;
            return Err(SurfaceError::Native("scripted present failure".into()));
        }
        state.presented.push(PresentCall {
            pixels: pixels.to_vec(),
            size,
            viewport,
        });
        Ok(())
    }

    fn destroy(&mut self) {
        self.state.borrow_mut().destroy_calls += 1;
        self.destroyed = true;
    }
}
