//! X11 presentation backend built on `x11rb`
//!
//! Owns the display connection, one window, and the graphics context used
//! for pixel submission. The WM_DELETE_WINDOW atom is interned per
//! instance, so no process-wide protocol state exists.
//!
//! Pixel submission uses `PutImage` in Z-pixmap format. The X protocol
//! caps the size of a single request, so large frames are sent as runs of
//! whole rows that each fit the negotiated limit.

use thiserror::Error;
use x11rb::connection::{Connection, RequestConnection};
use x11rb::properties::WmSizeHints;
use x11rb::protocol::xproto::{
    Atom, AtomEnum, BackingStore, ConnectionExt as _, CreateGCAux, CreateWindowAux, EventMask,
    Gcontext, ImageFormat, PropMode, Window, WindowClass,
};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use crate::error::{SurfaceError, SurfaceResult};
use crate::surface::backend::PresentBackend;
use crate::surface::events::SurfaceEvent;
use crate::surface::viewport::{Size, Viewport};

/// Rough per-request protocol overhead subtracted from the request budget.
const REQUEST_HEADER_SLACK: usize = 1024;

#[derive(Error, Debug)]
enum X11Error {
    #[error(transparent)]
    Connect(#[from] x11rb::errors::ConnectError),
    #[error(transparent)]
    Connection(#[from] x11rb::errors::ConnectionError),
    #[error(transparent)]
    Reply(#[from] x11rb::errors::ReplyError),
    #[error(transparent)]
    Id(#[from] x11rb::errors::ReplyOrIdError),
    #[error("display reports {0} bits per pixel at root depth, need 32")]
    UnsupportedDepth(u8),
}

fn native(err: impl std::fmt::Display) -> SurfaceError {
    SurfaceError::Native(err.to_string())
}

pub(crate) struct X11Backend {
    conn: RustConnection,
    window: Window,
    gc: Gcontext,
    wm_delete_window: Atom,
    depth: u8,
    max_request_bytes: usize,
    alive: bool,
}

impl X11Backend {
    /// Connect to the display and create a mapped, centered window
    ///
    /// # Errors
    /// [`SurfaceError::BackendInit`] if the display cannot be opened, the
    /// root depth is not backed by a 32-bit pixmap format, or any creation
    /// request fails. Dropping the half-built connection releases every
    /// server-side resource it allocated, so failures never leak.
    pub(crate) fn open(title: &str, width: u32, height: u32) -> SurfaceResult<Self> {
        Self::open_inner(title, width, height)
            .map_err(|err| SurfaceError::BackendInit(err.to_string()))
    }

    fn open_inner(title: &str, width: u32, height: u32) -> Result<Self, X11Error> {
        let (conn, screen_num) = x11rb::connect(None)?;
        let screen = &conn.setup().roots[screen_num];
        let depth = screen.root_depth;

        let bits_per_pixel = conn
            .setup()
            .pixmap_formats
            .iter()
            .find(|format| format.depth == depth)
            .map_or(0, |format| format.bits_per_pixel);
        if bits_per_pixel != 32 {
            return Err(X11Error::UnsupportedDepth(bits_per_pixel));
        }

        let screen_width = i32::from(screen.width_in_pixels);
        let screen_height = i32::from(screen.height_in_pixels);
        let x = (screen_width - width as i32) / 2;
        let y = (screen_height - height as i32) / 2;

        let window = conn.generate_id()?;
        let aux = CreateWindowAux::new()
            .background_pixel(screen.black_pixel)
            .border_pixel(screen.black_pixel)
            .backing_store(BackingStore::NOT_USEFUL)
            .event_mask(EventMask::STRUCTURE_NOTIFY | EventMask::EXPOSURE);
        conn.create_window(
            depth,
            window,
            screen.root,
            x as i16,
            y as i16,
            width as u16,
            height as u16,
            0,
            WindowClass::INPUT_OUTPUT,
            screen.root_visual,
            &aux,
        )?;

        conn.change_property8(
            PropMode::REPLACE,
            window,
            AtomEnum::WM_NAME,
            AtomEnum::STRING,
            title.as_bytes(),
        )?;

        let wm_protocols = conn.intern_atom(false, b"WM_PROTOCOLS")?.reply()?.atom;
        let wm_delete_window = conn.intern_atom(false, b"WM_DELETE_WINDOW")?.reply()?.atom;
        conn.change_property32(
            PropMode::REPLACE,
            window,
            wm_protocols,
            AtomEnum::ATOM,
            &[wm_delete_window],
        )?;

        let mut hints = WmSizeHints::default();
        hints.min_size = Some((width as i32, height as i32));
        hints.max_size = Some((screen_width, screen_height));
        hints.set_normal_hints(&conn, window)?;

        let gc = conn.generate_id()?;
        conn.create_gc(gc, window, &CreateGCAux::new().graphics_exposures(0))?;

        conn.map_window(window)?;
        conn.flush()?;

        let max_request_bytes = conn.maximum_request_bytes();
        log::debug!("X11 window {window:#x} created, depth {depth}, request budget {max_request_bytes} bytes");

        Ok(Self {
            conn,
            window,
            gc,
            wm_delete_window,
            depth,
            max_request_bytes,
            alive: true,
        })
    }
}

impl PresentBackend for X11Backend {
    fn pump_events(&mut self, out: &mut Vec<SurfaceEvent>) -> SurfaceResult<()> {
        if !self.alive {
            return Ok(());
        }
        while let Some(event) = self.conn.poll_for_event().map_err(native)? {
            match event {
                Event::ConfigureNotify(ev) => out.push(SurfaceEvent::Resized {
                    width: ev.width.into(),
                    height: ev.height.into(),
                }),
                Event::ClientMessage(ev) => {
                    if ev.format == 32 && ev.data.as_data32()[0] == self.wm_delete_window {
                        out.push(SurfaceEvent::CloseRequested);
                    }
                }
                Event::DestroyNotify(_) => out.push(SurfaceEvent::CloseRequested),
                // Expose needs no special handling; the caller presents a
                // full frame every update.
                _ => {}
            }
        }
        Ok(())
    }

    fn present(&mut self, pixels: &[u32], size: Size, viewport: Viewport) -> SurfaceResult<()> {
        if !self.alive || size.is_empty() {
            return Ok(());
        }
        let bytes: &[u8] = bytemuck::cast_slice(pixels);
        let row_bytes = size.width as usize * 4;
        let budget = self
            .max_request_bytes
            .saturating_sub(REQUEST_HEADER_SLACK)
            .max(row_bytes);
        let rows_per_chunk = (budget / row_bytes).max(1) as u32;

        let mut row = 0u32;
        while row < size.height {
            let rows = rows_per_chunk.min(size.height - row);
            let start = row as usize * row_bytes;
            let end = start + rows as usize * row_bytes;
            self.conn
                .put_image(
                    ImageFormat::Z_PIXMAP,
                    self.window,
                    self.gc,
                    size.width as u16,
                    rows as u16,
                    viewport.x as i16,
                    (viewport.y + row as i32) as i16,
                    0,
                    self.depth,
                    &bytes[start..end],
                )
                .map_err(native)?;
            row += rows;
        }
        self.conn.flush().map_err(native)?;
        Ok(())
    }

    fn destroy(&mut self) {
        if !self.alive {
            return;
        }
        self.alive = false;
        let _ = self.conn.free_gc(self.gc);
        let _ = self.conn.destroy_window(self.window);
        let _ = self.conn.flush();
        log::info!("X11 window {:#x} destroyed", self.window);
    }
}
