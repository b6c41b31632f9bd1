//! Native window services consumed by the tiling engine.
//!
//! The engine never talks to the OS directly; it goes through the traits in
//! this module. `win32` implements them with `windows-sys`, `simulated` keeps a
//! desktop in memory for tests, simulation and benchmarks.

pub mod simulated;
#[cfg(windows)]
pub mod win32;

pub use simulated::SimulatedDesktop;

use crate::error::NativeError;
use crate::geometry::Rect;

/// Native style bit that gives a window a sizing border.
pub const WS_THICKFRAME: u32 = 0x0004_0000;
/// Native style bit for a thin-line border.
pub const WS_BORDER: u32 = 0x0080_0000;
/// Extended style bit of tool windows (floating toolbars, tooltips, ...).
pub const WS_EX_TOOLWINDOW: u32 = 0x0000_0080;

/// Opaque identifier of a native top-level window. The window itself is owned
/// by the OS / its process, never by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowHandle(pub u64);

/// Where a positioning call puts the window in the z-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZAnchor {
    /// Keep the current z-order slot.
    Unchanged,
    /// Topmost non-topmost slot.
    Top,
    /// Native insert-after semantics: the window is stacked directly behind
    /// the given handle.
    InsertAfter(WindowHandle),
    /// Stacked directly in front of the given handle.
    Above(WindowHandle),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionFlags {
    /// Post the request to the owning thread instead of waiting for it.
    pub asynchronous: bool,
    pub no_move: bool,
    pub no_size: bool,
    pub no_activate: bool,
}

impl PositionFlags {
    /// Flags for a geometry update of a foreign window.
    pub const fn geometry() -> Self {
        Self {
            asynchronous: true,
            no_move: false,
            no_size: false,
            no_activate: true,
        }
    }

    /// Flags for a pure z-order change: position and size are untouched.
    pub const fn restack() -> Self {
        Self {
            asynchronous: false,
            no_move: true,
            no_size: true,
            no_activate: true,
        }
    }
}

/// Still bitmap of a window's rendered contents (`0x00RRGGBB` per pixel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u32>,
}

impl Image {
    pub fn new(width: u32, height: u32, pixels: Vec<u32>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn filled(width: u32, height: u32, color: u32) -> Self {
        let len = width as usize * height as usize;
        Self::new(width, height, vec![color; len])
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

pub trait WindowEnumerator {
    /// All top-level windows, front-to-back.
    fn top_level_windows(&self) -> Vec<WindowHandle>;
    fn window_rect(&self, handle: WindowHandle) -> Result<Rect, NativeError>;
    fn extended_style(&self, handle: WindowHandle) -> Result<u32, NativeError>;
    fn is_visible(&self, _handle: WindowHandle) -> bool {
        true
    }
    fn class_name(&self, handle: WindowHandle) -> Result<String, NativeError>;
    fn window_text(&self, handle: WindowHandle) -> Result<String, NativeError>;
}

pub trait WindowPositioner {
    fn set_window_position(
        &self,
        handle: WindowHandle,
        anchor: ZAnchor,
        rect: Rect,
        flags: PositionFlags,
    ) -> Result<(), NativeError>;
    fn window_style(&self, handle: WindowHandle) -> Result<u32, NativeError>;
    /// Replaces the style bits and returns the previous ones.
    fn set_window_style(&self, handle: WindowHandle, bits: u32) -> Result<u32, NativeError>;
}

pub trait WindowCapture {
    /// Still image of the window's current contents. `None` when the capture
    /// failed; callers treat that as "nothing to paint".
    fn capture_snapshot(&self, handle: WindowHandle) -> Option<Image>;
}

/// Everything the engine needs from the windowing system.
pub trait Desktop: WindowEnumerator + WindowPositioner + WindowCapture {}

impl<T: WindowEnumerator + WindowPositioner + WindowCapture + ?Sized> Desktop for T {}

/// Startup filter used to adopt already-open windows by class and/or title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowFilter {
    pub class_name: Option<String>,
    pub title_contains: Option<String>,
}

impl WindowFilter {
    pub fn is_empty(&self) -> bool {
        self.class_name.is_none() && self.title_contains.is_none()
    }

    pub fn matches<E: WindowEnumerator + ?Sized>(&self, desktop: &E, handle: WindowHandle) -> bool {
        if self.is_empty() {
            return false;
        }
        if let Some(class) = &self.class_name
            && desktop.class_name(handle).ok().as_deref() != Some(class.as_str())
        {
            return false;
        }
        if let Some(needle) = &self.title_contains
            && !desktop
                .window_text(handle)
                .is_ok_and(|title| title.contains(needle.as_str()))
        {
            return false;
        }
        true
    }

    /// Matching windows in z-order.
    pub fn select<E: WindowEnumerator + ?Sized>(&self, desktop: &E) -> Vec<WindowHandle> {
        desktop
            .top_level_windows()
            .into_iter()
            .filter(|handle| self.matches(desktop, *handle))
            .collect()
    }
}
