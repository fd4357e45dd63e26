//! # pixel_surface
//!
//! A minimal framebuffer-to-screen presenter for applications that own
//! their own pixel data: emulators, software renderers, simple games.
//!
//! The crate opens one native window per [`Surface`] and puts a
//! caller-supplied buffer of 32-bit packed pixels on screen once per
//! frame. When the window is resized, frames are resampled to the new
//! viewport with a nearest-neighbor scaler; close requests surface as a
//! terminal [`UpdateStatus::Terminated`]. There is no GPU, no input
//! handling, and no multi-window management.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pixel_surface::{Frame, Surface, UpdateStatus};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut surface = Surface::open("demo", 320, 240)?;
//!     let pixels = vec![0u32; 320 * 240];
//!     loop {
//!         // ... draw into `pixels` ...
//!         let frame = Frame::new(&pixels, 320, 240)?;
//!         if surface.update(Some(frame))? == UpdateStatus::Terminated {
//!             break;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Surfaces are single-threaded: call [`Surface::update`] once per
//! rendered frame from one thread. The frame buffer is borrowed only for
//! the duration of the call.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

pub mod config;
pub mod error;
pub mod scale;
pub mod surface;

mod backend;

pub use config::{ConfigError, SurfaceConfig};
pub use error::{SurfaceError, SurfaceResult};
pub use scale::scale_nearest;
pub use surface::{Frame, Size, Surface, UpdateStatus, Viewport};

/// Common imports for crate users
pub mod prelude {
    pub use crate::config::SurfaceConfig;
    pub use crate::error::{SurfaceError, SurfaceResult};
    pub use crate::surface::{Frame, Size, Surface, UpdateStatus, Viewport};
}
