//! Deferred work queue.
//!
//! Handlers that must not mutate the layout re-entrantly (for example while
//! the OS is still dispatching positioning messages for a foreign window)
//! schedule a task here instead. The compositor drains the queue once per
//! event-loop turn, after all handlers of that turn have returned.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::desktop::WindowHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// Tile a window that was dropped onto the tile surface.
    AddWindow(WindowHandle),
}

/// Shared handle to the queue; clones refer to the same queue.
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    inner: Rc<RefCell<VecDeque<Deferred>>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&self, task: Deferred) {
        tracing::trace!(?task, "scheduled deferred task");
        self.inner.borrow_mut().push_back(task);
    }

    /// Takes every task queued so far. Tasks scheduled while the caller runs
    /// the returned batch wait for the next drain.
    pub fn take_batch(&self) -> Vec<Deferred> {
        self.inner.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}
