//! In-memory desktop.
//!
//! Keeps a front-to-back list of fake top-level windows and applies
//! positioning/style calls to it the way the native window manager would.
//! Every positioning call is also recorded so callers can inspect what the
//! engine asked for.

use std::cell::{Cell, RefCell};

use super::{
    Image, PositionFlags, WindowCapture, WindowEnumerator, WindowHandle, WindowPositioner,
    WS_EX_TOOLWINDOW, ZAnchor,
};
use crate::error::NativeError;
use crate::geometry::Rect;

/// Default style of a simulated application window (overlapped window with a
/// sizing frame and caption).
pub const DEFAULT_STYLE: u32 = 0x14CF_0000;

#[derive(Debug, Clone)]
struct SimWindow {
    handle: WindowHandle,
    class_name: String,
    title: String,
    rect: Rect,
    style: u32,
    ex_style: u32,
    visible: bool,
}

/// One recorded `set_window_position` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionCall {
    pub handle: WindowHandle,
    pub anchor: ZAnchor,
    pub rect: Rect,
    pub flags: PositionFlags,
}

#[derive(Debug)]
pub struct SimulatedDesktop {
    windows: RefCell<Vec<SimWindow>>,
    next_handle: Cell<u64>,
    position_calls: RefCell<Vec<PositionCall>>,
    capture_enabled: Cell<bool>,
    captures: Cell<usize>,
}

impl Default for SimulatedDesktop {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedDesktop {
    pub fn new() -> Self {
        Self {
            windows: RefCell::new(Vec::new()),
            next_handle: Cell::new(0x100),
            position_calls: RefCell::new(Vec::new()),
            capture_enabled: Cell::new(true),
            captures: Cell::new(0),
        }
    }

    /// Opens a new window on top of the z-order.
    pub fn open_window(&self, class_name: &str, title: &str, rect: Rect) -> WindowHandle {
        self.open(class_name, title, rect, 0)
    }

    /// Opens a tool window (excluded from overlap scans) on top of the z-order.
    pub fn open_tool_window(&self, class_name: &str, rect: Rect) -> WindowHandle {
        self.open(class_name, "", rect, WS_EX_TOOLWINDOW)
    }

    fn open(&self, class_name: &str, title: &str, rect: Rect, ex_style: u32) -> WindowHandle {
        let handle = WindowHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 0x10);
        self.windows.borrow_mut().insert(
            0,
            SimWindow {
                handle,
                class_name: class_name.to_owned(),
                title: title.to_owned(),
                rect,
                style: DEFAULT_STYLE,
                ex_style,
                visible: true,
            },
        );
        handle
    }

    pub fn close_window(&self, handle: WindowHandle) {
        self.windows.borrow_mut().retain(|w| w.handle != handle);
    }

    /// Simulates the user dragging a window to `rect` (the window is raised,
    /// as a native drag activates it).
    pub fn drag_window(&self, handle: WindowHandle, rect: Rect) {
        self.move_window(handle, rect);
        self.raise(handle);
    }

    pub fn move_window(&self, handle: WindowHandle, rect: Rect) {
        self.update(handle, |window| window.rect = rect);
    }

    pub fn raise(&self, handle: WindowHandle) {
        let mut windows = self.windows.borrow_mut();
        if let Some(index) = windows.iter().position(|w| w.handle == handle) {
            let window = windows.remove(index);
            windows.insert(0, window);
        }
    }

    pub fn set_visible(&self, handle: WindowHandle, visible: bool) {
        self.update(handle, |window| window.visible = visible);
    }

    pub fn set_capture_enabled(&self, enabled: bool) {
        self.capture_enabled.set(enabled);
    }

    /// Number of successful captures served so far.
    pub fn capture_count(&self) -> usize {
        self.captures.get()
    }

    pub fn z_order(&self) -> Vec<WindowHandle> {
        self.windows.borrow().iter().map(|w| w.handle).collect()
    }

    pub fn rect_of(&self, handle: WindowHandle) -> Option<Rect> {
        self.windows
            .borrow()
            .iter()
            .find(|w| w.handle == handle)
            .map(|w| w.rect)
    }

    pub fn style_of(&self, handle: WindowHandle) -> Option<u32> {
        self.windows
            .borrow()
            .iter()
            .find(|w| w.handle == handle)
            .map(|w| w.style)
    }

    pub fn position_calls(&self) -> Vec<PositionCall> {
        self.position_calls.borrow().clone()
    }

    pub fn clear_position_calls(&self) {
        self.position_calls.borrow_mut().clear();
    }

    fn update(&self, handle: WindowHandle, f: impl FnOnce(&mut SimWindow)) {
        if let Some(window) = self.windows.borrow_mut().iter_mut().find(|w| w.handle == handle) {
            f(window);
        }
    }

    fn with_window<R>(
        &self,
        handle: WindowHandle,
        f: impl FnOnce(&SimWindow) -> R,
    ) -> Result<R, NativeError> {
        self.windows
            .borrow()
            .iter()
            .find(|w| w.handle == handle)
            .map(f)
            .ok_or(NativeError::WindowGone(handle))
    }
}

impl WindowEnumerator for SimulatedDesktop {
    fn top_level_windows(&self) -> Vec<WindowHandle> {
        self.z_order()
    }

    fn window_rect(&self, handle: WindowHandle) -> Result<Rect, NativeError> {
        self.with_window(handle, |w| w.rect)
    }

    fn extended_style(&self, handle: WindowHandle) -> Result<u32, NativeError> {
        self.with_window(handle, |w| w.ex_style)
    }

    fn is_visible(&self, handle: WindowHandle) -> bool {
        self.with_window(handle, |w| w.visible).unwrap_or(false)
    }

    fn class_name(&self, handle: WindowHandle) -> Result<String, NativeError> {
        self.with_window(handle, |w| w.class_name.clone())
    }

    fn window_text(&self, handle: WindowHandle) -> Result<String, NativeError> {
        self.with_window(handle, |w| w.title.clone())
    }
}

impl WindowPositioner for SimulatedDesktop {
    fn set_window_position(
        &self,
        handle: WindowHandle,
        anchor: ZAnchor,
        rect: Rect,
        flags: PositionFlags,
    ) -> Result<(), NativeError> {
        self.position_calls.borrow_mut().push(PositionCall {
            handle,
            anchor,
            rect,
            flags,
        });

        let mut windows = self.windows.borrow_mut();
        let index = windows
            .iter()
            .position(|w| w.handle == handle)
            .ok_or(NativeError::WindowGone(handle))?;
        let mut window = windows.remove(index);
        if !flags.no_move {
            window.rect.left = rect.left;
            window.rect.top = rect.top;
        }
        if !flags.no_size {
            window.rect.width = rect.width;
            window.rect.height = rect.height;
        }
        let slot = match anchor {
            ZAnchor::Unchanged => index,
            ZAnchor::Top => 0,
            ZAnchor::InsertAfter(after) => match windows.iter().position(|w| w.handle == after) {
                Some(pos) => pos + 1,
                None => index,
            },
            ZAnchor::Above(below) => windows
                .iter()
                .position(|w| w.handle == below)
                .unwrap_or(index),
        };
        let len = windows.len();
        windows.insert(slot.min(len), window);
        Ok(())
    }

    fn window_style(&self, handle: WindowHandle) -> Result<u32, NativeError> {
        self.with_window(handle, |w| w.style)
    }

    fn set_window_style(&self, handle: WindowHandle, bits: u32) -> Result<u32, NativeError> {
        let mut windows = self.windows.borrow_mut();
        let window = windows
            .iter_mut()
            .find(|w| w.handle == handle)
            .ok_or(NativeError::WindowGone(handle))?;
        Ok(std::mem::replace(&mut window.style, bits))
    }
}

impl WindowCapture for SimulatedDesktop {
    fn capture_snapshot(&self, handle: WindowHandle) -> Option<Image> {
        if !self.capture_enabled.get() {
            return None;
        }
        let rect = self.window_rect(handle).ok()?;
        self.captures.set(self.captures.get() + 1);
        let width = rect.width.max(0) as u32;
        let height = rect.height.max(0) as u32;
        // Deterministic per-window color so tests can tell snapshots apart.
        let color = (handle.0 as u32).wrapping_mul(0x9E37_79B9) & 0x00FF_FFFF;
        Some(Image::filled(width, height, color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_windows_open_on_top() {
        let desktop = SimulatedDesktop::new();
        let a = desktop.open_window("A", "a", Rect::new(0, 0, 10, 10));
        let b = desktop.open_window("B", "b", Rect::new(0, 0, 10, 10));
        assert_eq!(desktop.z_order(), vec![b, a]);
        desktop.raise(a);
        assert_eq!(desktop.z_order(), vec![a, b]);
    }

    #[test]
    fn insert_after_restacks_behind_anchor() {
        let desktop = SimulatedDesktop::new();
        let a = desktop.open_window("A", "a", Rect::new(0, 0, 10, 10));
        let b = desktop.open_window("B", "b", Rect::new(0, 0, 10, 10));
        let c = desktop.open_window("C", "c", Rect::new(0, 0, 10, 10));
        // c, b, a -> move c behind a
        desktop
            .set_window_position(
                c,
                ZAnchor::InsertAfter(a),
                Rect::default(),
                PositionFlags::restack(),
            )
            .unwrap();
        assert_eq!(desktop.z_order(), vec![b, a, c]);
        // no_move/no_size keep the rect
        assert_eq!(desktop.rect_of(c), Some(Rect::new(0, 0, 10, 10)));

        // b, a, c -> put b directly above c
        desktop
            .set_window_position(b, ZAnchor::Above(c), Rect::default(), PositionFlags::restack())
            .unwrap();
        assert_eq!(desktop.z_order(), vec![a, b, c]);
    }

    #[test]
    fn geometry_update_moves_and_sizes() {
        let desktop = SimulatedDesktop::new();
        let a = desktop.open_window("A", "a", Rect::new(0, 0, 10, 10));
        desktop
            .set_window_position(
                a,
                ZAnchor::Unchanged,
                Rect::new(5, 6, 70, 80),
                PositionFlags::geometry(),
            )
            .unwrap();
        assert_eq!(desktop.rect_of(a), Some(Rect::new(5, 6, 70, 80)));
        assert_eq!(desktop.position_calls().len(), 1);
    }

    #[test]
    fn calls_on_closed_window_report_gone() {
        let desktop = SimulatedDesktop::new();
        let a = desktop.open_window("A", "a", Rect::new(0, 0, 10, 10));
        desktop.close_window(a);
        assert_eq!(desktop.window_rect(a), Err(NativeError::WindowGone(a)));
        assert_eq!(desktop.set_window_style(a, 0), Err(NativeError::WindowGone(a)));
        assert!(desktop.capture_snapshot(a).is_none());
    }

    #[test]
    fn capture_can_be_disabled() {
        let desktop = SimulatedDesktop::new();
        let a = desktop.open_window("A", "a", Rect::new(0, 0, 4, 3));
        let image = desktop.capture_snapshot(a).unwrap();
        assert_eq!((image.width, image.height, image.pixels.len()), (4, 3, 12));
        desktop.set_capture_enabled(false);
        assert!(desktop.capture_snapshot(a).is_none());
        assert_eq!(desktop.capture_count(), 1);
    }
}
