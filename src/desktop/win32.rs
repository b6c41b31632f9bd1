//! Native window services on top of `windows-sys`.

use std::ffi::c_void;
use std::mem;
use std::ptr;

use windows_sys::Win32::Foundation::{GetLastError, HWND, LPARAM, RECT, SetLastError};
use windows_sys::Win32::Graphics::Gdi::{
    BI_RGB, BITMAPINFO, BITMAPINFOHEADER, CreateCompatibleBitmap, CreateCompatibleDC,
    DIB_RGB_COLORS, DeleteDC, DeleteObject, GetDIBits, GetWindowDC, ReleaseDC, SelectObject,
};
use windows_sys::Win32::Storage::Xps::PrintWindow;
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{GetAsyncKeyState, VK_LBUTTON};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GW_HWNDPREV, GWL_EXSTYLE, GWL_STYLE, GetClassNameW, GetWindow, GetWindowLongW,
    GetWindowRect, GetWindowTextLengthW, GetWindowTextW, IsWindow, IsWindowVisible,
    SWP_ASYNCWINDOWPOS, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, SetWindowLongW,
    SetWindowPos,
};

use super::{
    Image, PositionFlags, WindowCapture, WindowEnumerator, WindowHandle, WindowPositioner,
    ZAnchor,
};
use crate::drivers::mouse::MouseButtonSource;
use crate::error::NativeError;
use crate::geometry::Rect;

/// `PrintWindow` flag that asks DWM-composed windows to render their full
/// contents instead of a blank frame.
const PW_RENDERFULLCONTENT: u32 = 0x0000_0002;

fn hwnd(handle: WindowHandle) -> HWND {
    handle.0 as usize as HWND
}

fn handle_of(hwnd: HWND) -> WindowHandle {
    WindowHandle(hwnd as usize as u64)
}

/// Stateless view of the Win32 window manager.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Desktop;

impl Win32Desktop {
    pub fn new() -> Self {
        Self
    }

    fn ensure_window(&self, handle: WindowHandle) -> Result<HWND, NativeError> {
        let raw = hwnd(handle);
        // SAFETY: IsWindow accepts any value and only inspects the handle table.
        if unsafe { IsWindow(raw) } == 0 {
            return Err(NativeError::WindowGone(handle));
        }
        Ok(raw)
    }

    fn window_long(&self, handle: WindowHandle, index: i32) -> Result<u32, NativeError> {
        let raw = self.ensure_window(handle)?;
        // SAFETY: `raw` was validated above; GetWindowLongW tolerates windows
        // that disappear concurrently by returning 0 with an error set.
        unsafe {
            SetLastError(0);
            let value = GetWindowLongW(raw, index);
            if value == 0 && GetLastError() != 0 {
                return Err(NativeError::CallFailed {
                    call: "GetWindowLongW",
                    handle,
                });
            }
            Ok(value as u32)
        }
    }
}

unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> i32 {
    // SAFETY: `lparam` is the address of the Vec passed by `top_level_windows`,
    // which outlives the EnumWindows call.
    let handles = unsafe { &mut *(lparam as *mut Vec<WindowHandle>) };
    handles.push(handle_of(hwnd));
    1
}

fn read_wide(buffer: &[u16], len: i32) -> String {
    let len = len.max(0) as usize;
    String::from_utf16_lossy(&buffer[..len.min(buffer.len())])
}

impl WindowEnumerator for Win32Desktop {
    fn top_level_windows(&self) -> Vec<WindowHandle> {
        let mut handles: Vec<WindowHandle> = Vec::new();
        // SAFETY: the callback only touches the Vec behind `lparam`.
        let ok = unsafe {
            EnumWindows(
                Some(collect_window),
                &mut handles as *mut Vec<WindowHandle> as LPARAM,
            )
        };
        if ok == 0 {
            tracing::debug!("EnumWindows stopped early");
        }
        handles
    }

    fn window_rect(&self, handle: WindowHandle) -> Result<Rect, NativeError> {
        let raw = self.ensure_window(handle)?;
        let mut rect = RECT {
            left: 0,
            top: 0,
            right: 0,
            bottom: 0,
        };
        // SAFETY: `rect` is a valid out pointer for the duration of the call.
        if unsafe { GetWindowRect(raw, &mut rect) } == 0 {
            return Err(NativeError::CallFailed {
                call: "GetWindowRect",
                handle,
            });
        }
        Ok(Rect::from_edges(rect.left, rect.top, rect.right, rect.bottom))
    }

    fn extended_style(&self, handle: WindowHandle) -> Result<u32, NativeError> {
        self.window_long(handle, GWL_EXSTYLE)
    }

    fn is_visible(&self, handle: WindowHandle) -> bool {
        // SAFETY: IsWindowVisible accepts stale handles and returns FALSE.
        unsafe { IsWindowVisible(hwnd(handle)) != 0 }
    }

    fn class_name(&self, handle: WindowHandle) -> Result<String, NativeError> {
        let raw = self.ensure_window(handle)?;
        let mut buffer = [0u16; 256];
        // SAFETY: the buffer length passed matches the allocation.
        let len = unsafe { GetClassNameW(raw, buffer.as_mut_ptr(), buffer.len() as i32) };
        if len == 0 {
            return Err(NativeError::CallFailed {
                call: "GetClassNameW",
                handle,
            });
        }
        Ok(read_wide(&buffer, len))
    }

    fn window_text(&self, handle: WindowHandle) -> Result<String, NativeError> {
        let raw = self.ensure_window(handle)?;
        // SAFETY: length query only.
        let expected = unsafe { GetWindowTextLengthW(raw) };
        if expected <= 0 {
            return Ok(String::new());
        }
        let mut buffer = vec![0u16; expected as usize + 1];
        // SAFETY: the buffer length passed matches the allocation.
        let len = unsafe { GetWindowTextW(raw, buffer.as_mut_ptr(), buffer.len() as i32) };
        Ok(read_wide(&buffer, len))
    }
}

impl WindowPositioner for Win32Desktop {
    fn set_window_position(
        &self,
        handle: WindowHandle,
        anchor: ZAnchor,
        rect: Rect,
        flags: PositionFlags,
    ) -> Result<(), NativeError> {
        let raw = self.ensure_window(handle)?;
        let mut native_flags = 0;
        if flags.asynchronous {
            native_flags |= SWP_ASYNCWINDOWPOS;
        }
        if flags.no_move {
            native_flags |= SWP_NOMOVE;
        }
        if flags.no_size {
            native_flags |= SWP_NOSIZE;
        }
        if flags.no_activate {
            native_flags |= SWP_NOACTIVATE;
        }
        let insert_after: HWND = match anchor {
            ZAnchor::Unchanged => {
                native_flags |= SWP_NOZORDER;
                ptr::null_mut()
            }
            // HWND_TOP is the null handle.
            ZAnchor::Top => ptr::null_mut(),
            ZAnchor::InsertAfter(after) => hwnd(after),
            ZAnchor::Above(below) => {
                // Going in front of `below` means going behind whatever is
                // currently in front of it.
                // SAFETY: GetWindow tolerates stale handles and returns null.
                let previous = unsafe { GetWindow(hwnd(below), GW_HWNDPREV) };
                if previous == raw {
                    // Already directly above; keep the slot.
                    native_flags |= SWP_NOZORDER;
                }
                previous
            }
        };
        // SAFETY: plain value arguments.
        let ok = unsafe {
            SetWindowPos(
                raw,
                insert_after,
                rect.left,
                rect.top,
                rect.width,
                rect.height,
                native_flags,
            )
        };
        if ok == 0 {
            return Err(NativeError::CallFailed {
                call: "SetWindowPos",
                handle,
            });
        }
        Ok(())
    }

    fn window_style(&self, handle: WindowHandle) -> Result<u32, NativeError> {
        self.window_long(handle, GWL_STYLE)
    }

    fn set_window_style(&self, handle: WindowHandle, bits: u32) -> Result<u32, NativeError> {
        let raw = self.ensure_window(handle)?;
        // SAFETY: `raw` was validated; failure is reported through GetLastError.
        unsafe {
            SetLastError(0);
            let previous = SetWindowLongW(raw, GWL_STYLE, bits as i32);
            if previous == 0 && GetLastError() != 0 {
                return Err(NativeError::CallFailed {
                    call: "SetWindowLongW",
                    handle,
                });
            }
            Ok(previous as u32)
        }
    }
}

impl WindowCapture for Win32Desktop {
    fn capture_snapshot(&self, handle: WindowHandle) -> Option<Image> {
        let rect = self.window_rect(handle).ok()?;
        if rect.is_empty() {
            return None;
        }
        let raw = hwnd(handle);
        let (width, height) = (rect.width, rect.height);

        // SAFETY: every GDI object created here is released before returning,
        // and the pixel buffer is sized for `width * height` 32-bit pixels.
        unsafe {
            let window_dc = GetWindowDC(raw);
            if window_dc.is_null() {
                return None;
            }
            let memory_dc = CreateCompatibleDC(window_dc);
            let bitmap = CreateCompatibleBitmap(window_dc, width, height);
            let previous = SelectObject(memory_dc, bitmap as _);

            let printed = PrintWindow(raw, memory_dc, PW_RENDERFULLCONTENT) != 0;

            let mut pixels = vec![0u32; width as usize * height as usize];
            let mut info: BITMAPINFO = mem::zeroed();
            info.bmiHeader = BITMAPINFOHEADER {
                biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                // Negative height requests a top-down DIB.
                biHeight: -height,
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB as _,
                ..mem::zeroed()
            };
            let lines = if printed {
                GetDIBits(
                    memory_dc,
                    bitmap,
                    0,
                    height as u32,
                    pixels.as_mut_ptr() as *mut c_void,
                    &mut info,
                    DIB_RGB_COLORS,
                )
            } else {
                0
            };

            SelectObject(memory_dc, previous);
            DeleteObject(bitmap as _);
            DeleteDC(memory_dc);
            ReleaseDC(raw, window_dc);

            if lines == 0 {
                tracing::debug!(handle = ?handle, "window capture failed");
                return None;
            }
            for pixel in &mut pixels {
                *pixel &= 0x00FF_FFFF;
            }
            Some(Image::new(width as u32, height as u32, pixels))
        }
    }
}

/// Polls the physical left mouse button state.
#[derive(Debug, Default, Clone, Copy)]
pub struct AsyncKeyStateButton;

impl MouseButtonSource for AsyncKeyStateButton {
    fn left_button_down(&mut self) -> bool {
        // SAFETY: GetAsyncKeyState takes a plain virtual-key code.
        let state = unsafe { GetAsyncKeyState(VK_LBUTTON as i32) };
        (state as u16 & 0x8000) != 0
    }
}
