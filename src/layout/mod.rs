//! One-axis weighted split layout.
//!
//! Cells share the available extent in proportion to their weights, with a
//! fixed-size handle between neighbours. Dragging a handle trades pixels
//! between the two cells it separates.

use crate::constants::{DEFAULT_HANDLE_GAP, MIN_CELL_SIZE};
use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    /// Cells side by side, handles are vertical bars.
    #[default]
    Horizontal,
    /// Cells stacked top to bottom.
    Vertical,
}

impl Orientation {
    fn extent(self, area: Rect) -> i32 {
        match self {
            Orientation::Horizontal => area.width,
            Orientation::Vertical => area.height,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SplitLayout<Id: Copy + Eq> {
    orientation: Orientation,
    handle_gap: i32,
    min_cell: i32,
    ids: Vec<Id>,
    weights: Vec<f32>,
}

impl<Id: Copy + Eq> Default for SplitLayout<Id> {
    fn default() -> Self {
        Self::new(Orientation::default(), DEFAULT_HANDLE_GAP)
    }
}

impl<Id: Copy + Eq> SplitLayout<Id> {
    pub fn new(orientation: Orientation, handle_gap: i32) -> Self {
        Self {
            orientation,
            handle_gap: handle_gap.max(0),
            min_cell: MIN_CELL_SIZE,
            ids: Vec::new(),
            weights: Vec::new(),
        }
    }

    pub fn with_min_cell(mut self, min_cell: i32) -> Self {
        self.min_cell = min_cell.max(1);
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[Id] {
        &self.ids
    }

    pub fn contains(&self, id: Id) -> bool {
        self.ids.contains(&id)
    }

    /// Appends a cell. New cells get the mean weight of the existing ones so
    /// they start out the same size as an average neighbour.
    pub fn push(&mut self, id: Id) -> bool {
        if self.contains(id) {
            return false;
        }
        let weight = if self.weights.is_empty() {
            1.0
        } else {
            self.weights.iter().sum::<f32>() / self.weights.len() as f32
        };
        self.ids.push(id);
        self.weights.push(weight);
        true
    }

    pub fn remove(&mut self, id: Id) -> bool {
        let Some(index) = self.ids.iter().position(|existing| *existing == id) else {
            return false;
        };
        self.ids.remove(index);
        self.weights.remove(index);
        true
    }

    /// Gap between cells for `area`; shrinks when the area is too small to
    /// fit every handle plus one pixel per cell.
    pub fn gap_size(&self, area: Rect) -> i32 {
        let count = self.ids.len() as i32;
        if count < 2 {
            return 0;
        }
        let total = self.orientation.extent(area);
        let room = (total - count).max(0);
        self.handle_gap.min(room / (count - 1))
    }

    /// Pixel sizes along the split axis, one per cell. The remainder left by
    /// rounding goes to the last cell.
    fn sizes(&self, area: Rect) -> Vec<i32> {
        let count = self.ids.len();
        if count == 0 {
            return Vec::new();
        }
        let gap = self.gap_size(area);
        let total = (self.orientation.extent(area) - gap * (count as i32 - 1)).max(0);
        let total_weight = self.weights.iter().sum::<f32>().max(f32::EPSILON);
        let mut sizes = Vec::with_capacity(count);
        let mut used = 0;
        for (index, weight) in self.weights.iter().enumerate() {
            let size = if index + 1 == count {
                total - used
            } else {
                let portion = ((weight / total_weight) * total as f32).floor() as i32;
                used += portion;
                portion
            };
            sizes.push(size);
        }
        sizes
    }

    /// Cell rectangles within `area`, in layout order.
    pub fn cells(&self, area: Rect) -> Vec<(Id, Rect)> {
        let (cells, _) = self.cells_with_handles(area);
        cells
    }

    /// Cell rectangles plus the handle rectangles between them.
    pub fn cells_with_handles(&self, area: Rect) -> (Vec<(Id, Rect)>, Vec<Rect>) {
        let gap = self.gap_size(area);
        let sizes = self.sizes(area);
        let mut cells = Vec::with_capacity(sizes.len());
        let mut handles = Vec::with_capacity(sizes.len().saturating_sub(1));
        let mut cursor = match self.orientation {
            Orientation::Horizontal => area.left,
            Orientation::Vertical => area.top,
        };
        for (index, (id, size)) in self.ids.iter().zip(sizes).enumerate() {
            let (cell, handle) = match self.orientation {
                Orientation::Horizontal => (
                    Rect::new(cursor, area.top, size, area.height),
                    Rect::new(cursor + size, area.top, gap, area.height),
                ),
                Orientation::Vertical => (
                    Rect::new(area.left, cursor, area.width, size),
                    Rect::new(area.left, cursor + size, area.width, gap),
                ),
            };
            cells.push((*id, cell));
            if index + 1 < self.ids.len() {
                handles.push(handle);
            }
            cursor += size + gap;
        }
        (cells, handles)
    }

    /// Index of the handle under a screen point, if any.
    pub fn hit_test_handle(&self, area: Rect, x: i32, y: i32) -> Option<usize> {
        let (_, handles) = self.cells_with_handles(area);
        handles.iter().position(|handle| handle.contains_point(x, y))
    }

    /// Moves the handle between cell `index` and `index + 1` by `delta`
    /// pixels. Both cells keep at least the minimum cell size when there is
    /// room for it. Returns `false` when there is no such handle.
    pub fn drag(&mut self, area: Rect, index: usize, delta: i32) -> bool {
        if index >= self.ids.len().saturating_sub(1) {
            return false;
        }
        let mut sizes = self.sizes(area);
        let total_pair = sizes[index] + sizes[index + 1];
        let min_size = self.min_cell.min(total_pair / 2);
        let max_left = (total_pair - min_size).max(min_size);
        let left = (sizes[index] + delta).clamp(min_size, max_left);
        sizes[index] = left;
        sizes[index + 1] = total_pair - left;
        self.weights = sizes.iter().map(|size| (*size).max(1) as f32).collect();
        tracing::trace!(index, delta, ?sizes, "split handle dragged");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_split_gives_remainder_to_last_cell() {
        let mut layout = SplitLayout::new(Orientation::Horizontal, 0);
        layout.push(1);
        layout.push(2);
        let cells = layout.cells(Rect::new(0, 0, 11, 5));
        assert_eq!(cells, vec![(1, Rect::new(0, 0, 5, 5)), (2, Rect::new(5, 0, 6, 5))]);
    }

    #[test]
    fn handles_sit_between_cells() {
        let mut layout = SplitLayout::new(Orientation::Vertical, 4);
        layout.push('a');
        layout.push('b');
        let area = Rect::new(10, 20, 100, 204);
        let (cells, handles) = layout.cells_with_handles(area);
        assert_eq!(cells[0].1, Rect::new(10, 20, 100, 100));
        assert_eq!(handles, vec![Rect::new(10, 120, 100, 4)]);
        assert_eq!(cells[1].1, Rect::new(10, 124, 100, 100));
        assert_eq!(layout.hit_test_handle(area, 50, 121), Some(0));
        assert_eq!(layout.hit_test_handle(area, 50, 60), None);
    }

    #[test]
    fn single_cell_fills_area_without_gap() {
        let mut layout = SplitLayout::new(Orientation::Horizontal, 6);
        layout.push(7);
        assert_eq!(layout.gap_size(Rect::new(0, 0, 300, 10)), 0);
        assert_eq!(layout.cells(Rect::new(0, 0, 300, 10)), vec![(7, Rect::new(0, 0, 300, 10))]);
    }

    #[test]
    fn gap_shrinks_in_tiny_areas() {
        let mut layout = SplitLayout::new(Orientation::Horizontal, 6);
        layout.push(1);
        layout.push(2);
        layout.push(3);
        assert_eq!(layout.gap_size(Rect::new(0, 0, 7, 1)), 2);
        assert_eq!(layout.gap_size(Rect::new(0, 0, 3, 1)), 0);
    }

    #[test]
    fn drag_trades_pixels_and_respects_min_size() {
        let mut layout = SplitLayout::new(Orientation::Horizontal, 0).with_min_cell(10);
        layout.push(1);
        layout.push(2);
        let area = Rect::new(0, 0, 100, 10);
        assert!(layout.drag(area, 0, 20));
        let cells = layout.cells(area);
        assert_eq!((cells[0].1.width, cells[1].1.width), (70, 30));

        assert!(layout.drag(area, 0, 500));
        let cells = layout.cells(area);
        assert_eq!((cells[0].1.width, cells[1].1.width), (90, 10));

        assert!(!layout.drag(area, 1, 5));
        assert!(!layout.drag(area, usize::MAX, 5));
        assert!(!SplitLayout::<u8>::new(Orientation::Vertical, 0).drag(area, 0, 5));
    }

    #[test]
    fn push_uses_mean_weight_and_ignores_duplicates() {
        let mut layout = SplitLayout::new(Orientation::Horizontal, 0).with_min_cell(1);
        layout.push(1);
        layout.push(2);
        let area = Rect::new(0, 0, 90, 10);
        layout.drag(area, 0, -15);
        assert!(layout.push(3));
        assert!(!layout.push(3));
        // weights 30 and 60, new cell gets 45 (give or take float rounding)
        let widths: Vec<_> = layout
            .cells(Rect::new(0, 0, 135, 10))
            .iter()
            .map(|(_, r)| r.width)
            .collect();
        assert_eq!(widths.iter().sum::<i32>(), 135);
        assert!((widths[0] - 30).abs() <= 1);
        assert!((widths[2] - 45).abs() <= 2);

        assert!(layout.remove(2));
        assert!(!layout.remove(2));
        assert_eq!(layout.ids(), &[1, 3]);
    }
}
