//! The tile surface.
//!
//! The splitter watches for foreign windows dragged over it. A window that
//! enters while the host is idle becomes the pending drop; releasing the left
//! button schedules it to be tiled. Dragging a tiled window back out with the
//! button held releases it to the desktop again.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::desktop::{Desktop, WindowHandle};
use crate::geometry::Rect;
use crate::layout::{Orientation, SplitLayout};
use crate::overlap::{OverlapObserver, ZOrderSnapshot};
use crate::root::RootCoordinator;
use crate::state::{HostSignal, HostState, Subscription};
use crate::tasks::{Deferred, TaskQueue};

use super::{PaintSurface, TileContainer};

/// A tiled window and the container that holds it.
pub struct TileEntry<D: Desktop + ?Sized> {
    pub handle: WindowHandle,
    pub container: TileContainer<D>,
}

pub struct TileSplitter<D: Desktop + ?Sized> {
    desktop: Rc<D>,
    host: HostState,
    signals: Subscription,
    tasks: TaskQueue,
    root: Rc<RefCell<RootCoordinator<D>>>,
    host_window: WindowHandle,
    geometry: Rect,
    layout: SplitLayout<WindowHandle>,
    entries: Vec<TileEntry<D>>,
    pending: Option<WindowHandle>,
}

impl<D: Desktop + ?Sized> TileSplitter<D> {
    pub fn new(
        desktop: Rc<D>,
        host: HostState,
        tasks: TaskQueue,
        root: Rc<RefCell<RootCoordinator<D>>>,
        orientation: Orientation,
        handle_gap: i32,
    ) -> Self {
        let host_window = root.borrow().host_window();
        let signals = host.subscribe();
        Self {
            desktop,
            host,
            signals,
            tasks,
            root,
            host_window,
            geometry: Rect::default(),
            layout: SplitLayout::new(orientation, handle_gap),
            entries: Vec::new(),
            pending: None,
        }
    }

    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    pub fn pending_handle(&self) -> Option<WindowHandle> {
        self.pending
    }

    pub fn is_tiled(&self, handle: WindowHandle) -> bool {
        self.entries.iter().any(|entry| entry.handle == handle)
    }

    /// Tiled handles in layout order.
    pub fn tiled_handles(&self) -> Vec<WindowHandle> {
        self.layout.ids().to_vec()
    }

    pub fn container(&self, handle: WindowHandle) -> Option<&TileContainer<D>> {
        self.entries
            .iter()
            .find(|entry| entry.handle == handle)
            .map(|entry| &entry.container)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reacts to host signals published since the last call. A button
    /// release with a pending drop schedules that window to be tiled at the
    /// end of the turn. A host size/move discards the pending drop.
    pub fn process_signals(&mut self) {
        for signal in self.signals.take() {
            match signal {
                HostSignal::LeftButtonReleased => {
                    if let Some(handle) = self.pending.take() {
                        tracing::debug!(handle = ?handle, "drop on tile surface");
                        self.tasks.schedule(Deferred::AddWindow(handle));
                    }
                }
                HostSignal::SizeMoveStarted => {
                    if let Some(handle) = self.pending.take() {
                        tracing::debug!(handle = ?handle, "host size/move discards drop candidate");
                    }
                }
            }
        }
    }

    /// Tiles `handle` in a new cell. Returns `false` when it is already tiled
    /// or could not be grabbed.
    pub fn add_window(&mut self, handle: WindowHandle) -> bool {
        if self.is_tiled(handle) {
            return false;
        }
        if handle == self.host_window {
            tracing::warn!(handle = ?handle, "refusing to tile the host window");
            return false;
        }
        let mut container =
            TileContainer::new(self.desktop.clone(), self.host.clone(), self.host_window);
        self.layout.push(handle);
        if let Some(cell) = self.cell_of(handle) {
            container.set_geometry(cell);
        }
        if let Err(err) = container.grab_window(handle) {
            tracing::warn!(handle = ?handle, %err, "could not grab window");
            self.layout.remove(handle);
            return false;
        }
        self.root.borrow_mut().add_handle(handle);
        self.entries.push(TileEntry { handle, container });
        tracing::info!(handle = ?handle, tiles = self.entries.len(), "window tiled");
        self.relayout();
        self.check_consistency();
        true
    }

    /// Drops `handle` from the tile surface and gives the window its style
    /// back. Returns `false` when it was not tiled.
    pub fn remove_window(&mut self, handle: WindowHandle) -> bool {
        let Some(index) = self.entries.iter().position(|entry| entry.handle == handle) else {
            return false;
        };
        let mut entry = self.entries.remove(index);
        if let Err(err) = entry.container.release() {
            tracing::debug!(handle = ?handle, %err, "style restore failed");
        }
        self.layout.remove(handle);
        self.root.borrow_mut().remove_handle(handle);
        tracing::info!(handle = ?handle, tiles = self.entries.len(), "window untiled");
        self.relayout();
        self.check_consistency();
        true
    }

    /// Removes every tiled window missing from `snapshot` (closed, hidden).
    pub fn prune_stale(&mut self, snapshot: &ZOrderSnapshot) -> usize {
        let stale: Vec<WindowHandle> = self
            .entries
            .iter()
            .map(|entry| entry.handle)
            .filter(|handle| !snapshot.contains(*handle))
            .collect();
        for handle in &stale {
            tracing::debug!(handle = ?handle, "tiled window vanished");
            self.remove_window(*handle);
        }
        stale.len()
    }

    /// New screen rectangle for the whole tile surface.
    pub fn set_geometry(&mut self, rect: Rect) {
        if rect == self.geometry {
            return;
        }
        self.geometry = rect;
        self.relayout();
    }

    /// Drags the handle after cell `index` by `delta` pixels and pushes the
    /// new cells to every window, even mid-move.
    pub fn drag_handle(&mut self, index: usize, delta: i32) -> bool {
        if !self.layout.drag(self.geometry, index, delta) {
            return false;
        }
        for entry in &mut self.entries {
            entry.container.request_sync();
        }
        self.relayout();
        true
    }

    /// Forces every container back onto its cell.
    pub fn resync_all(&mut self) {
        for entry in &mut self.entries {
            entry.container.request_sync();
            entry.container.sync_window_geometry();
        }
    }

    pub fn park_all(&mut self) -> usize {
        self.entries
            .iter_mut()
            .map(|entry| entry.container.park())
            .filter(|parked| *parked)
            .count()
    }

    pub fn paint_all(&self, surface: &mut dyn PaintSurface) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.container.paint(surface))
            .count()
    }

    fn cell_of(&self, handle: WindowHandle) -> Option<Rect> {
        self.layout
            .cells(self.geometry)
            .into_iter()
            .find_map(|(id, cell)| (id == handle).then_some(cell))
    }

    fn relayout(&mut self) {
        for (handle, cell) in self.layout.cells(self.geometry) {
            if let Some(entry) = self.entries.iter_mut().find(|entry| entry.handle == handle) {
                entry.container.set_geometry(cell);
            }
        }
    }

    fn check_consistency(&self) {
        let tiled: BTreeSet<WindowHandle> = self.entries.iter().map(|entry| entry.handle).collect();
        let managed: BTreeSet<WindowHandle> = self.root.borrow().managed_handles().collect();
        let consistent = tiled == managed && self.layout.len() == tiled.len();
        if !consistent {
            tracing::error!(?tiled, ?managed, "tile bookkeeping out of sync");
        }
        debug_assert!(consistent, "tiled {tiled:?} vs managed {managed:?}");
    }
}

impl<D: Desktop + ?Sized> OverlapObserver for TileSplitter<D> {
    fn overlap_region(&self) -> Rect {
        self.geometry
    }

    fn host_window(&self) -> WindowHandle {
        self.host_window
    }

    fn overlap_enter(&mut self, handle: WindowHandle, _rect: Rect) {
        if self.host.in_size_move() || self.is_tiled(handle) {
            return;
        }
        tracing::debug!(handle = ?handle, "drop candidate");
        self.pending = Some(handle);
    }

    fn overlap_move(&mut self, handle: WindowHandle, rect: Rect) {
        tracing::trace!(handle = ?handle, ?rect, "overlap move");
    }

    fn overlap_exit(&mut self, handle: WindowHandle, _rect: Rect) {
        if self.host.in_size_move() || !self.host.left_button_down() {
            return;
        }
        // Still over the surface: only the z-order changed (host raised).
        // `_rect` is the last reported position, so ask for the current one.
        if let Ok(current) = self.desktop.window_rect(handle)
            && current.intersects(&self.geometry)
        {
            tracing::trace!(handle = ?handle, ?current, "exit by restack ignored");
            return;
        }
        if self.pending == Some(handle) {
            self.pending = None;
        }
        if self.remove_window(handle) {
            tracing::debug!(handle = ?handle, "dragged out of tile surface");
        }
    }
}
