//! Win32 presentation backend built on `winapi`
//!
//! Each backend registers its own window class (sequence-numbered, not
//! keyed on the caller's title) and unregisters it on destroy, so nothing
//! process-global survives the surface. Events observed by the window
//! procedure are parked in a heap queue reachable through `GWLP_USERDATA`
//! and handed to the surface on the next pump; the frame buffer itself is
//! only ever touched synchronously inside `present`.

use std::ffi::OsStr;
use std::iter::once;
use std::os::windows::ffi::OsStrExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::{mem, ptr};

use winapi::shared::minwindef::{HINSTANCE, HIWORD, LOWORD, LPARAM, LRESULT, UINT, WPARAM};
use winapi::shared::windef::{HDC, HWND, RECT};
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::libloaderapi::GetModuleHandleW;
use winapi::um::wingdi::{
    StretchDIBits, BITMAPINFO, BITMAPINFOHEADER, BI_BITFIELDS, DIB_RGB_COLORS, SRCCOPY,
};
use winapi::um::winuser::{
    AdjustWindowRect, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetDC,
    GetSystemMetrics, GetWindowLongPtrW, LoadCursorW, PeekMessageW, RegisterClassW, ReleaseDC,
    SetWindowLongPtrW, ShowWindow, TranslateMessage, UnregisterClassW, CS_HREDRAW, CS_OWNDC,
    CS_VREDRAW, GWLP_USERDATA, IDC_ARROW, MSG, PM_REMOVE, SM_CXSCREEN, SM_CYSCREEN, SW_NORMAL,
    WM_CLOSE, WM_DESTROY, WM_SIZE, WNDCLASSW, WS_OVERLAPPEDWINDOW,
};

use crate::error::{SurfaceError, SurfaceResult};
use crate::surface::backend::PresentBackend;
use crate::surface::events::SurfaceEvent;
use crate::surface::viewport::{Size, Viewport};

static CLASS_SEQ: AtomicUsize = AtomicUsize::new(0);

/// `BITMAPINFO` with the three `BI_BITFIELDS` color masks in place.
#[repr(C)]
struct BitmapInfo {
    header: BITMAPINFOHEADER,
    masks: [u32; 3],
}

#[derive(Default)]
struct EventQueue {
    events: Vec<SurfaceEvent>,
}

fn wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(once(0)).collect()
}

fn init_err(what: &str) -> SurfaceError {
    SurfaceError::BackendInit(format!("{what} failed (error {})", unsafe { GetLastError() }))
}

unsafe extern "system" fn wndproc(hwnd: HWND, msg: UINT, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let queue = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *mut EventQueue;
    match msg {
        WM_SIZE => {
            if !queue.is_null() {
                (*queue).events.push(SurfaceEvent::Resized {
                    width: u32::from(LOWORD(lparam as u32)),
                    height: u32::from(HIWORD(lparam as u32)),
                });
            }
            0
        }
        WM_CLOSE | WM_DESTROY => {
            if !queue.is_null() {
                (*queue).events.push(SurfaceEvent::CloseRequested);
            }
            0
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

pub(crate) struct Win32Backend {
    hwnd: HWND,
    hdc: HDC,
    hinstance: HINSTANCE,
    class_name: Vec<u16>,
    queue: *mut EventQueue,
    bmi: BitmapInfo,
    alive: bool,
}

impl Win32Backend {
    /// Register a window class and create a visible, centered window whose
    /// client area is exactly `width x height`
    ///
    /// # Errors
    /// [`SurfaceError::BackendInit`] on any creation failure; everything
    /// registered or created up to that point is released first.
    pub(crate) fn open(title: &str, width: u32, height: u32) -> SurfaceResult<Self> {
        let class_name = wide(&format!(
            "pixel_surface_{}",
            CLASS_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        let title_w = wide(title);

        unsafe {
            let hinstance = GetModuleHandleW(ptr::null());

            let wc = WNDCLASSW {
                style: CS_OWNDC | CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(wndproc),
                cbClsExtra: 0,
                cbWndExtra: 0,
                hInstance: hinstance,
                hIcon: ptr::null_mut(),
                hCursor: LoadCursorW(ptr::null_mut(), IDC_ARROW),
                hbrBackground: ptr::null_mut(),
                lpszMenuName: ptr::null(),
                lpszClassName: class_name.as_ptr(),
            };
            if RegisterClassW(&wc) == 0 {
                return Err(init_err("RegisterClassW"));
            }

            // Grow the rectangle so the *client* area matches the request.
            let mut rect = RECT {
                left: 0,
                top: 0,
                right: width as i32,
                bottom: height as i32,
            };
            AdjustWindowRect(&mut rect, WS_OVERLAPPEDWINDOW, 0);
            let outer_width = rect.right - rect.left;
            let outer_height = rect.bottom - rect.top;

            let x = (GetSystemMetrics(SM_CXSCREEN) - outer_width) / 2;
            let y = (GetSystemMetrics(SM_CYSCREEN) - outer_height) / 2;

            let hwnd = CreateWindowExW(
                0,
                class_name.as_ptr(),
                title_w.as_ptr(),
                WS_OVERLAPPEDWINDOW,
                x,
                y,
                outer_width,
                outer_height,
                ptr::null_mut(),
                ptr::null_mut(),
                hinstance,
                ptr::null_mut(),
            );
            if hwnd.is_null() {
                let err = init_err("CreateWindowExW");
                UnregisterClassW(class_name.as_ptr(), hinstance);
                return Err(err);
            }

            let queue = Box::into_raw(Box::new(EventQueue::default()));
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, queue as isize);
            ShowWindow(hwnd, SW_NORMAL);

            let hdc = GetDC(hwnd);
            if hdc.is_null() {
                let err = init_err("GetDC");
                SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
                drop(Box::from_raw(queue));
                DestroyWindow(hwnd);
                UnregisterClassW(class_name.as_ptr(), hinstance);
                return Err(err);
            }

            let mut header: BITMAPINFOHEADER = mem::zeroed();
            header.biSize = mem::size_of::<BITMAPINFOHEADER>() as u32;
            header.biPlanes = 1;
            header.biBitCount = 32;
            header.biCompression = BI_BITFIELDS;
            header.biWidth = width as i32;
            header.biHeight = -(height as i32); // top-down row order
            let bmi = BitmapInfo {
                header,
                masks: [0x00ff_0000, 0x0000_ff00, 0x0000_00ff],
            };

            log::debug!("Win32 window {hwnd:?} created, client area {width}x{height}");

            Ok(Self {
                hwnd,
                hdc,
                hinstance,
                class_name,
                queue,
                bmi,
                alive: true,
            })
        }
    }
}

impl PresentBackend for Win32Backend {
    fn pump_events(&mut self, out: &mut Vec<SurfaceEvent>) -> SurfaceResult<()> {
        if !self.alive {
            return Ok(());
        }
        unsafe {
            let mut msg: MSG = mem::zeroed();
            while PeekMessageW(&mut msg, self.hwnd, 0, 0, PM_REMOVE) != 0 {
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
            out.append(&mut (*self.queue).events);
        }
        Ok(())
    }

    fn present(&mut self, pixels: &[u32], size: Size, viewport: Viewport) -> SurfaceResult<()> {
        if !self.alive || size.is_empty() {
            return Ok(());
        }
        self.bmi.header.biWidth = size.width as i32;
        self.bmi.header.biHeight = -(size.height as i32);

        let copied = unsafe {
            StretchDIBits(
                self.hdc,
                viewport.x,
                viewport.y,
                viewport.size.width as i32,
                viewport.size.height as i32,
                0,
                0,
                size.width as i32,
                size.height as i32,
                pixels.as_ptr().cast(),
                ptr::addr_of!(self.bmi).cast::<BITMAPINFO>(),
                DIB_RGB_COLORS,
                SRCCOPY,
            )
        };
        if copied == 0 {
            return Err(SurfaceError::Native("StretchDIBits copied no scanlines".into()));
        }
        Ok(())
    }

    fn destroy(&mut self) {
        if !self.alive {
            return;
        }
        self.alive = false;
        unsafe {
            // Clear the userdata first so WM_DESTROY dispatched below does
            // not touch the queue we are about to free.
            SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, 0);
            ReleaseDC(self.hwnd, self.hdc);
            DestroyWindow(self.hwnd);
            UnregisterClassW(self.class_name.as_ptr(), self.hinstance);
            drop(Box::from_raw(self.queue));
        }
        log::info!("Win32 window destroyed");
    }
}
