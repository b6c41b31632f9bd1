//! Polling overlap monitor.
//!
//! Every tick the monitor takes a fresh [`ZOrderSnapshot`] of the desktop and,
//! for each registered observer, works out which windows sit in front of the
//! observer's host window and intersect the observer's screen rectangle.
//! Changes since the previous tick are reported edge-triggered:
//!
//! - `overlap_enter` when a window starts overlapping,
//! - `overlap_move` when an overlapping window's rectangle changed,
//! - `overlap_exit` (with the last reported rectangle) when it stopped
//!   overlapping, moved behind the host, or disappeared.
//!
//! A handle gets at most one of the three per observer per tick.

mod snapshot;

pub use snapshot::ZOrderSnapshot;

use std::collections::HashMap;
use std::time::Duration;

use crate::constants::DEFAULT_POLL_INTERVAL;
use crate::desktop::{WindowEnumerator, WindowHandle};
use crate::geometry::Rect;

/// Something that wants to know which windows are dragged over it.
pub trait OverlapObserver {
    /// Screen rectangle to test against.
    fn overlap_region(&self) -> Rect;
    /// Top-level window that contains the observer. Only windows in front of
    /// it count as overlapping.
    fn host_window(&self) -> WindowHandle;
    fn overlap_enter(&mut self, handle: WindowHandle, rect: Rect);
    fn overlap_move(&mut self, _handle: WindowHandle, _rect: Rect) {}
    fn overlap_exit(&mut self, handle: WindowHandle, rect: Rect);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(usize);

/// Windows currently overlapping one observer, with the rectangle last
/// reported for each.
type OverlapSet = HashMap<WindowHandle, Rect>;

#[derive(Debug)]
pub struct OverlapMonitor {
    interval: Duration,
    snapshot: ZOrderSnapshot,
    overlaps: Vec<OverlapSet>,
}

impl Default for OverlapMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl OverlapMonitor {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            snapshot: ZOrderSnapshot::default(),
            overlaps: Vec::new(),
        }
    }

    /// How often `tick` is expected to run.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn register(&mut self) -> ObserverId {
        self.overlaps.push(OverlapSet::new());
        ObserverId(self.overlaps.len() - 1)
    }

    /// Snapshot taken by the most recent scan.
    pub fn snapshot(&self) -> &ZOrderSnapshot {
        &self.snapshot
    }

    pub fn overlapping(&self, id: ObserverId) -> Vec<WindowHandle> {
        let mut handles: Vec<_> = self
            .overlaps
            .get(id.0)
            .map(|set| set.keys().copied().collect())
            .unwrap_or_default();
        handles.sort();
        handles
    }

    /// Replaces the snapshot with a fresh enumeration of the desktop.
    pub fn scan<E: WindowEnumerator + ?Sized>(&mut self, desktop: &E) {
        self.snapshot = ZOrderSnapshot::scan(desktop);
    }

    /// Scans once, then diffs every observer against the new snapshot.
    pub fn tick<E: WindowEnumerator + ?Sized>(
        &mut self,
        desktop: &E,
        observers: &mut [(ObserverId, &mut dyn OverlapObserver)],
    ) {
        self.scan(desktop);
        for (id, observer) in observers.iter_mut() {
            self.check_overlaps(*id, &mut **observer);
        }
    }

    /// Diffs one observer against the current snapshot and fires its
    /// callbacks.
    pub fn check_overlaps(&mut self, id: ObserverId, observer: &mut dyn OverlapObserver) {
        let Some(previous) = self.overlaps.get_mut(id.0) else {
            tracing::warn!(observer = ?id, "overlap check for unregistered observer");
            return;
        };
        let host = observer.host_window();
        let Some(host_z) = self.snapshot.position(host) else {
            // Host hidden or gone: keep the old set rather than reporting
            // every overlap as an exit.
            tracing::trace!(host = ?host, "observer host not in snapshot; skipping");
            return;
        };
        let region = observer.overlap_region();

        let mut current = OverlapSet::new();
        for (handle, rect) in self.snapshot.above(host_z) {
            if !region.intersects(rect) {
                continue;
            }
            current.insert(*handle, *rect);
            match previous.get(handle) {
                None => {
                    tracing::debug!(handle = ?handle, ?rect, "overlap enter");
                    observer.overlap_enter(*handle, *rect);
                }
                Some(cached) if cached != rect => {
                    observer.overlap_move(*handle, *rect);
                }
                Some(_) => {}
            }
        }

        let mut exited: Vec<(WindowHandle, Rect)> = previous
            .iter()
            .filter(|(handle, _)| !current.contains_key(handle))
            .map(|(handle, rect)| (*handle, *rect))
            .collect();
        // Deterministic callback order regardless of hash order.
        exited.sort_by_key(|(handle, _)| *handle);
        for (handle, last) in exited {
            tracing::debug!(handle = ?handle, rect = ?last, "overlap exit");
            observer.overlap_exit(handle, last);
        }

        *previous = current;
    }
}
