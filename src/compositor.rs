//! Wires the overlap monitor, the tile splitter and the root coordinator
//! together and runs them one turn at a time.
//!
//! A turn handles the host events that arrived since the previous one, lets
//! the splitter react to the resulting button/phase signals, polls the
//! desktop when the poll interval has elapsed and finally runs the deferred
//! tasks scheduled during the turn.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Instant;

use crate::config::Config;
use crate::desktop::{Desktop, WindowFilter, WindowHandle};
use crate::drivers::{HostDriver, HostEvent};
use crate::event_loop::{ControlFlow, EventLoop};
use crate::overlap::{ObserverId, OverlapMonitor, OverlapObserver};
use crate::root::{RootCoordinator, SizeMoveNotification};
use crate::state::HostState;
use crate::tasks::{Deferred, TaskQueue};
use crate::tile::{PaintSurface, TileSplitter};

pub struct Compositor<D: Desktop + ?Sized> {
    desktop: Rc<D>,
    config: Config,
    host: HostState,
    tasks: TaskQueue,
    monitor: OverlapMonitor,
    splitter_id: ObserverId,
    splitter: TileSplitter<D>,
    root: Rc<RefCell<RootCoordinator<D>>>,
    last_tick: Option<Instant>,
}

impl<D: Desktop + ?Sized> Compositor<D> {
    pub fn new(desktop: Rc<D>, host_window: WindowHandle, config: Config) -> Self {
        let host = HostState::new();
        let tasks = TaskQueue::new();
        let root = Rc::new(RefCell::new(RootCoordinator::new(
            desktop.clone(),
            host.clone(),
            host_window,
        )));
        let splitter = TileSplitter::new(
            desktop.clone(),
            host.clone(),
            tasks.clone(),
            root.clone(),
            config.orientation,
            config.handle_gap,
        );
        let mut monitor = OverlapMonitor::new(config.poll_interval);
        let splitter_id = monitor.register();
        tracing::debug!(host = ?host_window, interval = ?config.poll_interval, "compositor ready");
        Self {
            desktop,
            config,
            host,
            tasks,
            monitor,
            splitter_id,
            splitter,
            root,
            last_tick: None,
        }
    }

    pub fn host_state(&self) -> &HostState {
        &self.host
    }

    pub fn splitter(&self) -> &TileSplitter<D> {
        &self.splitter
    }

    pub fn monitor(&self) -> &OverlapMonitor {
        &self.monitor
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_managed(&self, handle: WindowHandle) -> bool {
        self.root.borrow().contains(handle)
    }

    pub fn managed_handles(&self) -> Vec<WindowHandle> {
        self.root.borrow().managed_handles().collect()
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Applies one host notification.
    pub fn handle_event(&mut self, event: HostEvent) -> ControlFlow {
        tracing::trace!(?event, "host event");
        match event {
            HostEvent::EnterSizeMove => {
                self.root
                    .borrow_mut()
                    .handle_notification(SizeMoveNotification::Enter);
            }
            HostEvent::Moving => {
                let was_moving = self.host.is_moving();
                self.root
                    .borrow_mut()
                    .handle_notification(SizeMoveNotification::Moving);
                if !was_moving {
                    let parked = self.splitter.park_all();
                    tracing::debug!(parked, "host move started");
                }
            }
            HostEvent::Sizing => {
                self.root
                    .borrow_mut()
                    .handle_notification(SizeMoveNotification::Sizing);
            }
            HostEvent::ExitSizeMove => {
                self.splitter.resync_all();
                self.root
                    .borrow_mut()
                    .handle_notification(SizeMoveNotification::Exit);
            }
            HostEvent::LeftButtonDown => self.host.set_left_button_down(true),
            HostEvent::LeftButtonUp => self.host.set_left_button_down(false),
            HostEvent::PointerOverTiles => {
                self.root.borrow().move_under();
            }
            HostEvent::Geometry(rect) => self.splitter.set_geometry(rect),
            HostEvent::DragHandle { index, delta } => {
                self.splitter.drag_handle(index, delta);
            }
            HostEvent::Shutdown => return ControlFlow::Quit,
        }
        ControlFlow::Continue
    }

    /// Scans the desktop, dispatches overlap events to the splitter and
    /// drops tiles whose window went away.
    pub fn tick(&mut self) {
        self.last_tick = Some(Instant::now());
        let mut observers: [(ObserverId, &mut dyn OverlapObserver); 1] =
            [(self.splitter_id, &mut self.splitter)];
        self.monitor.tick(&*self.desktop, &mut observers);
        let pruned = self.splitter.prune_stale(self.monitor.snapshot());
        if pruned > 0 {
            tracing::debug!(pruned, "pruned stale tiles");
        }
    }

    /// Runs the tasks queued before this call. Returns how many windows were
    /// tiled.
    pub fn run_deferred(&mut self) -> usize {
        let mut added = 0;
        for task in self.tasks.take_batch() {
            match task {
                Deferred::AddWindow(handle) => {
                    if self.splitter.add_window(handle) {
                        added += 1;
                    }
                }
            }
        }
        if added > 0 {
            self.root.borrow().move_under();
        }
        added
    }

    /// One event-loop turn.
    pub fn turn(
        &mut self,
        events: impl IntoIterator<Item = HostEvent>,
        tick_due: bool,
    ) -> ControlFlow {
        let mut flow = ControlFlow::Continue;
        for event in events {
            if self.handle_event(event) == ControlFlow::Quit {
                flow = ControlFlow::Quit;
                break;
            }
        }
        self.splitter.process_signals();
        if flow == ControlFlow::Quit {
            return flow;
        }
        if tick_due {
            self.tick();
        }
        self.run_deferred();
        flow
    }

    /// Tiles every open window matching `filter`, in z-order.
    pub fn adopt_matching(&mut self, filter: &WindowFilter) -> usize {
        let host_window = self.root.borrow().host_window();
        let mut adopted = 0;
        for handle in filter.select(&*self.desktop) {
            if handle != host_window && self.splitter.add_window(handle) {
                adopted += 1;
            }
        }
        if adopted > 0 {
            tracing::info!(adopted, "adopted existing windows");
            self.root.borrow().move_under();
        }
        adopted
    }

    /// Adopts the configured windows, then drives turns from `driver` until
    /// it reports shutdown.
    pub fn run<H: HostDriver>(&mut self, driver: H) -> io::Result<()> {
        let filter = self.config.adopt.clone();
        self.adopt_matching(&filter);
        let mut event_loop = EventLoop::new(driver, self.config.poll_interval);
        event_loop.run(|_, event| {
            let flow = match event {
                Some(event) => self.turn([event], false),
                None => {
                    let due = self
                        .last_tick
                        .is_none_or(|at| at.elapsed() >= self.config.poll_interval);
                    self.turn([], due)
                }
            };
            Ok(flow)
        })
    }

    pub fn paint(&self, surface: &mut dyn PaintSurface) -> usize {
        self.splitter.paint_all(surface)
    }
}
