pub mod mouse;
pub mod scripted;

use std::io;
use std::time::Duration;

use crate::geometry::Rect;

pub use mouse::{MouseButtonSource, MouseEdgeDriver};
pub use scripted::ScriptedDriver;

/// Notification delivered by the host shell to the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// The host window entered its modal size/move loop.
    EnterSizeMove,
    /// The host window is being dragged.
    Moving,
    /// The host window is being resized.
    Sizing,
    ExitSizeMove,
    LeftButtonDown,
    LeftButtonUp,
    /// The pointer moved over the tile surface.
    PointerOverTiles,
    /// The tile surface was given a new screen rectangle.
    Geometry(Rect),
    /// The user dragged the split handle after cell `index` by `delta` pixels.
    DragHandle { index: usize, delta: i32 },
    Shutdown,
}

pub trait HostDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool>;
    fn read(&mut self) -> io::Result<HostEvent>;
}

impl<T: HostDriver + ?Sized> HostDriver for &mut T {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        (**self).poll(timeout)
    }

    fn read(&mut self) -> io::Result<HostEvent> {
        (**self).read()
    }
}
