//! Root coordinator: tracks the host window's size/move loop and keeps the
//! host stacked directly behind the tiled windows.

use std::collections::BTreeSet;
use std::rc::Rc;

use crate::desktop::{Desktop, PositionFlags, WindowHandle, ZAnchor};
use crate::geometry::Rect;
use crate::state::{HostPhase, HostState, SizeMoveKind};

/// Native size/move notifications of the host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeMoveNotification {
    Enter,
    Moving,
    Sizing,
    Exit,
}

pub struct RootCoordinator<D: Desktop + ?Sized> {
    desktop: Rc<D>,
    host: HostState,
    host_window: WindowHandle,
    managed: BTreeSet<WindowHandle>,
}

impl<D: Desktop + ?Sized> RootCoordinator<D> {
    pub fn new(desktop: Rc<D>, host: HostState, host_window: WindowHandle) -> Self {
        Self {
            desktop,
            host,
            host_window,
            managed: BTreeSet::new(),
        }
    }

    pub fn host_window(&self) -> WindowHandle {
        self.host_window
    }

    /// Updates the published host phase. On exit the host is restacked
    /// behind the tiled windows; the anchor used is returned.
    pub fn handle_notification(
        &mut self,
        notification: SizeMoveNotification,
    ) -> Option<WindowHandle> {
        let phase = match notification {
            SizeMoveNotification::Enter => HostPhase::SizeMove(SizeMoveKind::Pending),
            SizeMoveNotification::Moving => HostPhase::SizeMove(SizeMoveKind::Moving),
            SizeMoveNotification::Sizing => HostPhase::SizeMove(SizeMoveKind::Resizing),
            SizeMoveNotification::Exit => HostPhase::Idle,
        };
        if self.host.phase() != phase {
            tracing::debug!(?phase, "host phase");
        }
        self.host.set_phase(phase);
        match notification {
            SizeMoveNotification::Exit => self.move_under(),
            _ => None,
        }
    }

    /// Restacks the host window directly behind the bottommost managed
    /// window. No-op when nothing is managed.
    pub fn move_under(&self) -> Option<WindowHandle> {
        if self.managed.is_empty() {
            return None;
        }
        let bottom = self
            .desktop
            .top_level_windows()
            .into_iter()
            .rev()
            .find(|handle| self.managed.contains(handle))?;
        let result = self.desktop.set_window_position(
            self.host_window,
            ZAnchor::InsertAfter(bottom),
            Rect::default(),
            PositionFlags::restack(),
        );
        if let Err(err) = result {
            tracing::debug!(anchor = ?bottom, %err, "move under failed");
        }
        Some(bottom)
    }

    pub fn add_handle(&mut self, handle: WindowHandle) -> bool {
        self.managed.insert(handle)
    }

    pub fn remove_handle(&mut self, handle: WindowHandle) -> bool {
        self.managed.remove(&handle)
    }

    pub fn contains(&self, handle: WindowHandle) -> bool {
        self.managed.contains(&handle)
    }

    pub fn managed_handles(&self) -> impl Iterator<Item = WindowHandle> + '_ {
        self.managed.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.managed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.managed.is_empty()
    }
}
