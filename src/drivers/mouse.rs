use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use super::{HostDriver, HostEvent};

/// Polled source of the global left mouse button state, for backends that
/// cannot deliver button notifications themselves.
pub trait MouseButtonSource {
    fn left_button_down(&mut self) -> bool;
}

impl<T: MouseButtonSource + ?Sized> MouseButtonSource for &mut T {
    fn left_button_down(&mut self) -> bool {
        (**self).left_button_down()
    }
}

/// Wraps a host driver and turns changes of a polled button source into
/// `LeftButtonDown` / `LeftButtonUp` events, delivered ahead of the wrapped
/// driver's own events.
pub struct MouseEdgeDriver<D, M> {
    inner: D,
    buttons: M,
    last_down: bool,
    pending: VecDeque<HostEvent>,
}

impl<D: HostDriver, M: MouseButtonSource> MouseEdgeDriver<D, M> {
    pub fn new(inner: D, buttons: M) -> Self {
        Self {
            inner,
            buttons,
            last_down: false,
            pending: VecDeque::new(),
        }
    }

    fn sample(&mut self) {
        let down = self.buttons.left_button_down();
        if down != self.last_down {
            self.last_down = down;
            self.pending.push_back(if down {
                HostEvent::LeftButtonDown
            } else {
                HostEvent::LeftButtonUp
            });
        }
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}

impl<D: HostDriver, M: MouseButtonSource> HostDriver for MouseEdgeDriver<D, M> {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        self.sample();
        if !self.pending.is_empty() {
            return Ok(true);
        }
        let ready = self.inner.poll(timeout)?;
        // The button may have changed while the inner driver waited.
        self.sample();
        Ok(ready || !self.pending.is_empty())
    }

    fn read(&mut self) -> io::Result<HostEvent> {
        match self.pending.pop_front() {
            Some(event) => Ok(event),
            None => self.inner.read(),
        }
    }
}
