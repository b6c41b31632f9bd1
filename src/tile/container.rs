//! A single layout cell holding a foreign window.
//!
//! The container moves the foreign window so it covers its cell exactly and
//! keeps a captured image of it around. The host paints that image while the
//! real window is out of view (parked during a host move) or not yet placed.

use std::rc::Rc;

use crate::desktop::{
    Desktop, Image, PositionFlags, WS_BORDER, WS_THICKFRAME, WindowHandle, WindowPositioner,
    ZAnchor,
};
use crate::error::NativeError;
use crate::geometry::Rect;
use crate::state::HostState;

use super::PaintSurface;

/// Saved window style that is written back when the guard goes away.
///
/// `restore` consumes the guard; if it is dropped without `restore` the style
/// is restored on drop and any failure is only logged.
pub struct StyleGuard<D: WindowPositioner + ?Sized> {
    desktop: Rc<D>,
    handle: WindowHandle,
    original: u32,
    armed: bool,
}

impl<D: WindowPositioner + ?Sized> StyleGuard<D> {
    /// Reads the current style, then replaces it with `(style & !clear) | set`.
    pub fn apply(
        desktop: Rc<D>,
        handle: WindowHandle,
        set: u32,
        clear: u32,
    ) -> Result<Self, NativeError> {
        let original = desktop.window_style(handle)?;
        desktop.set_window_style(handle, (original & !clear) | set)?;
        Ok(Self {
            desktop,
            handle,
            original,
            armed: true,
        })
    }

    pub fn original(&self) -> u32 {
        self.original
    }

    pub fn restore(mut self) -> Result<(), NativeError> {
        self.armed = false;
        self.desktop
            .set_window_style(self.handle, self.original)
            .map(|_| ())
    }
}

impl<D: WindowPositioner + ?Sized> Drop for StyleGuard<D> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(err) = self.desktop.set_window_style(self.handle, self.original) {
            tracing::debug!(handle = ?self.handle, %err, "style restore on drop failed");
        }
    }
}

pub struct TileContainer<D: Desktop + ?Sized> {
    desktop: Rc<D>,
    host: HostState,
    host_window: WindowHandle,
    handle: Option<WindowHandle>,
    style: Option<StyleGuard<D>>,
    geometry: Rect,
    sync_requested: bool,
    snapshot: Option<Image>,
    parked: bool,
}

impl<D: Desktop + ?Sized> TileContainer<D> {
    pub fn new(desktop: Rc<D>, host: HostState, host_window: WindowHandle) -> Self {
        Self {
            desktop,
            host,
            host_window,
            handle: None,
            style: None,
            geometry: Rect::default(),
            sync_requested: false,
            snapshot: None,
            parked: false,
        }
    }

    pub fn handle(&self) -> Option<WindowHandle> {
        self.handle
    }

    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    pub fn snapshot(&self) -> Option<&Image> {
        self.snapshot.as_ref()
    }

    pub fn is_parked(&self) -> bool {
        self.parked
    }

    pub fn sync_requested(&self) -> bool {
        self.sync_requested
    }

    /// Takes over `handle`: swaps its sizing frame for a thin border and
    /// moves it onto the cell right away.
    pub fn grab_window(&mut self, handle: WindowHandle) -> Result<(), NativeError> {
        if let Err(err) = self.release() {
            tracing::debug!(%err, "releasing previous window failed");
        }
        let guard = StyleGuard::apply(self.desktop.clone(), handle, WS_BORDER, WS_THICKFRAME)?;
        tracing::debug!(
            handle = ?handle,
            style = format_args!("{:#010x}", guard.original()),
            "grabbed window"
        );
        self.handle = Some(handle);
        self.style = Some(guard);
        self.request_sync();
        self.sync_window_geometry();
        Ok(())
    }

    /// Forces the next sync to run even while the host is being dragged.
    pub fn request_sync(&mut self) {
        self.sync_requested = true;
    }

    /// Moves the foreign window onto the cell, directly in front of the host
    /// window, and refreshes the snapshot. Returns whether a position update
    /// was issued.
    pub fn sync_window_geometry(&mut self) -> bool {
        let Some(handle) = self.handle else {
            return false;
        };
        if self.host.is_moving() && !self.sync_requested {
            tracing::trace!(handle = ?handle, "host moving; sync skipped");
            return false;
        }
        self.sync_requested = false;
        if self.geometry.is_empty() {
            tracing::trace!(handle = ?handle, "no cell yet; sync skipped");
            return false;
        }
        let result = self.desktop.set_window_position(
            handle,
            ZAnchor::Above(self.host_window),
            self.geometry,
            PositionFlags::geometry(),
        );
        if let Err(err) = result {
            tracing::debug!(handle = ?handle, %err, "geometry sync failed");
            return false;
        }
        self.parked = false;
        self.refresh_snapshot(handle);
        true
    }

    /// Assigns a new cell. Syncs when the cell changed or a sync is pending.
    pub fn set_geometry(&mut self, rect: Rect) {
        if rect == self.geometry && !self.sync_requested {
            return;
        }
        self.geometry = rect;
        self.sync_window_geometry();
    }

    /// Gives the window its original style back. Idempotent.
    pub fn release(&mut self) -> Result<(), NativeError> {
        let handle = self.handle.take();
        self.parked = false;
        match self.style.take() {
            Some(guard) => {
                tracing::debug!(handle = ?handle, "released window");
                guard.restore()
            }
            None => Ok(()),
        }
    }

    /// Captures the window and moves it just above the top of the screen so
    /// the snapshot can be painted in its place while the host moves.
    pub fn park(&mut self) -> bool {
        let Some(handle) = self.handle else {
            return false;
        };
        if self.parked {
            return false;
        }
        self.refresh_snapshot(handle);
        let current = self.desktop.window_rect(handle).unwrap_or(self.geometry);
        let offscreen = Rect::new(current.left, -current.height, current.width, current.height);
        let result = self.desktop.set_window_position(
            handle,
            ZAnchor::Unchanged,
            offscreen,
            PositionFlags::geometry(),
        );
        match result {
            Ok(()) => {
                tracing::trace!(handle = ?handle, "parked");
                self.parked = true;
                true
            }
            Err(err) => {
                tracing::debug!(handle = ?handle, %err, "park failed");
                false
            }
        }
    }

    /// Paints the latest snapshot over the cell. Returns `false` when there
    /// is nothing to paint.
    pub fn paint(&self, surface: &mut dyn PaintSurface) -> bool {
        match &self.snapshot {
            Some(image) if !image.is_empty() => {
                surface.paint_image(self.geometry, image);
                true
            }
            _ => false,
        }
    }

    fn refresh_snapshot(&mut self, handle: WindowHandle) {
        match self.desktop.capture_snapshot(handle) {
            Some(image) => self.snapshot = Some(image),
            None => tracing::debug!(handle = ?handle, "capture failed; keeping previous snapshot"),
        }
    }
}
