//! Host state shared by the engine components.
//!
//! A single `HostState` is created per host window and cloned into every
//! component that depends on it. It publishes the global left-button state and
//! the host's size/move phase; components either query it directly or
//! subscribe to edge signals (button released, size/move started).

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

/// Which kind of modal size/move loop the host window is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeMoveKind {
    /// The loop started but the first moving/sizing notification has not
    /// arrived yet.
    Pending,
    Moving,
    Resizing,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostPhase {
    #[default]
    Idle,
    SizeMove(SizeMoveKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSignal {
    LeftButtonReleased,
    /// The host left `Idle` for a size/move loop.
    SizeMoveStarted,
}

#[derive(Debug, Default)]
struct Shared {
    left_button_down: Cell<bool>,
    phase: Cell<HostPhase>,
    subscribers: RefCell<Vec<Weak<RefCell<VecDeque<HostSignal>>>>>,
}

/// Cheap-to-clone handle to the shared host state.
#[derive(Debug, Clone, Default)]
pub struct HostState {
    inner: Rc<Shared>,
}

impl HostState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn left_button_down(&self) -> bool {
        self.inner.left_button_down.get()
    }

    /// Records the current button state; publishes a signal on release.
    pub fn set_left_button_down(&self, down: bool) {
        let was_down = self.inner.left_button_down.replace(down);
        if was_down && !down {
            self.publish(HostSignal::LeftButtonReleased);
        }
    }

    pub fn phase(&self) -> HostPhase {
        self.inner.phase.get()
    }

    pub fn set_phase(&self, phase: HostPhase) {
        let previous = self.inner.phase.replace(phase);
        if previous == HostPhase::Idle && phase != HostPhase::Idle {
            self.publish(HostSignal::SizeMoveStarted);
        }
    }

    /// True while the host is in any size/move loop.
    pub fn in_size_move(&self) -> bool {
        matches!(self.phase(), HostPhase::SizeMove(_))
    }

    /// True while the host window is being dragged (not resized).
    pub fn is_moving(&self) -> bool {
        self.phase() == HostPhase::SizeMove(SizeMoveKind::Moving)
    }

    pub fn is_resizing(&self) -> bool {
        self.phase() == HostPhase::SizeMove(SizeMoveKind::Resizing)
    }

    /// Signals published after this call are queued on the returned
    /// subscription until taken.
    pub fn subscribe(&self) -> Subscription {
        let queue = Rc::new(RefCell::new(VecDeque::new()));
        let mut subscribers = self.inner.subscribers.borrow_mut();
        subscribers.retain(|weak| weak.strong_count() > 0);
        subscribers.push(Rc::downgrade(&queue));
        Subscription { queue }
    }

    fn publish(&self, signal: HostSignal) {
        tracing::trace!(?signal, "host signal");
        for subscriber in self.inner.subscribers.borrow().iter() {
            if let Some(queue) = subscriber.upgrade() {
                queue.borrow_mut().push_back(signal);
            }
        }
    }
}

/// Receiving end of a `HostState` subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    queue: Rc<RefCell<VecDeque<HostSignal>>>,
}

impl Subscription {
    pub fn take(&self) -> Vec<HostSignal> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}
