//! Tiles: foreign windows embedded in layout cells.

pub mod container;
pub mod splitter;

pub use container::{StyleGuard, TileContainer};
pub use splitter::{TileEntry, TileSplitter};

use crate::desktop::Image;
use crate::geometry::Rect;

/// Where the host shell draws snapshot images of tiled windows.
pub trait PaintSurface {
    fn paint_image(&mut self, target: Rect, image: &Image);
}

impl<T: PaintSurface + ?Sized> PaintSurface for &mut T {
    fn paint_image(&mut self, target: Rect, image: &Image) {
        (**self).paint_image(target, image)
    }
}
