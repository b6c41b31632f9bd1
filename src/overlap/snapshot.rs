use std::collections::HashMap;

use crate::desktop::{WS_EX_TOOLWINDOW, WindowEnumerator, WindowHandle};
use crate::geometry::Rect;

/// Front-to-back list of top-level windows captured at one polling instant.
/// A snapshot is never edited; each scan builds a new one.
#[derive(Debug, Clone, Default)]
pub struct ZOrderSnapshot {
    entries: Vec<(WindowHandle, Rect)>,
    positions: HashMap<WindowHandle, usize>,
}

impl ZOrderSnapshot {
    /// Enumerates the desktop, skipping tool windows, hidden windows and
    /// windows whose rectangle cannot be read (typically closed mid-scan).
    pub fn scan<E: WindowEnumerator + ?Sized>(desktop: &E) -> Self {
        let entries = desktop
            .top_level_windows()
            .into_iter()
            .filter(|handle| {
                desktop
                    .extended_style(*handle)
                    .is_ok_and(|style| style & WS_EX_TOOLWINDOW == 0)
            })
            .filter(|handle| desktop.is_visible(*handle))
            .filter_map(|handle| desktop.window_rect(handle).ok().map(|rect| (handle, rect)))
            .collect();
        Self::from_entries(entries)
    }

    pub fn from_entries(entries: Vec<(WindowHandle, Rect)>) -> Self {
        let positions = entries
            .iter()
            .enumerate()
            .map(|(index, (handle, _))| (*handle, index))
            .collect();
        Self { entries, positions }
    }

    /// Z-order index of `handle`; 0 is the topmost window.
    pub fn position(&self, handle: WindowHandle) -> Option<usize> {
        self.positions.get(&handle).copied()
    }

    pub fn contains(&self, handle: WindowHandle) -> bool {
        self.positions.contains_key(&handle)
    }

    pub fn rect(&self, handle: WindowHandle) -> Option<Rect> {
        self.position(handle).map(|index| self.entries[index].1)
    }

    /// Windows stacked in front of the window at `index`.
    pub fn above(&self, index: usize) -> &[(WindowHandle, Rect)] {
        &self.entries[..index.min(self.entries.len())]
    }

    pub fn entries(&self) -> &[(WindowHandle, Rect)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
