use std::time::Duration;

use muntin::desktop::{SimulatedDesktop, WindowHandle};
use muntin::geometry::Rect;
use muntin::overlap::{ObserverId, OverlapMonitor, OverlapObserver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seen {
    Enter(WindowHandle, Rect),
    Move(WindowHandle, Rect),
    Exit(WindowHandle, Rect),
}

struct Surface {
    host: WindowHandle,
    region: Rect,
    seen: Vec<Seen>,
}

impl Surface {
    fn new(host: WindowHandle, region: Rect) -> Self {
        Self {
            host,
            region,
            seen: Vec::new(),
        }
    }

    fn drain(&mut self) -> Vec<Seen> {
        std::mem::take(&mut self.seen)
    }
}

impl OverlapObserver for Surface {
    fn overlap_region(&self) -> Rect {
        self.region
    }

    fn host_window(&self) -> WindowHandle {
        self.host
    }

    fn overlap_enter(&mut self, handle: WindowHandle, rect: Rect) {
        self.seen.push(Seen::Enter(handle, rect));
    }

    fn overlap_move(&mut self, handle: WindowHandle, rect: Rect) {
        self.seen.push(Seen::Move(handle, rect));
    }

    fn overlap_exit(&mut self, handle: WindowHandle, rect: Rect) {
        self.seen.push(Seen::Exit(handle, rect));
    }
}

struct Fixture {
    desktop: SimulatedDesktop,
    monitor: OverlapMonitor,
    left_id: ObserverId,
    right_id: ObserverId,
    left: Surface,
    right: Surface,
}

impl Fixture {
    fn new() -> (Self, WindowHandle) {
        let desktop = SimulatedDesktop::new();
        // opened first, so it ends up behind both hosts
        let behind = desktop.open_window("App", "behind", Rect::new(10, 10, 50, 50));
        let left_region = Rect::new(0, 0, 400, 400);
        let right_region = Rect::new(500, 0, 400, 400);
        let left_host = desktop.open_window("MuntinHost", "left", left_region);
        let right_host = desktop.open_window("MuntinHost", "right", right_region);
        let mut monitor = OverlapMonitor::new(Duration::from_millis(50));
        let left_id = monitor.register();
        let right_id = monitor.register();
        (
            Self {
                desktop,
                monitor,
                left_id,
                right_id,
                left: Surface::new(left_host, left_region),
                right: Surface::new(right_host, right_region),
            },
            behind,
        )
    }

    fn tick(&mut self) {
        let mut observers: [(ObserverId, &mut dyn OverlapObserver); 2] =
            [(self.left_id, &mut self.left), (self.right_id, &mut self.right)];
        self.monitor.tick(&self.desktop, &mut observers);
    }
}

#[test]
fn windows_are_reported_to_the_surface_they_cross() {
    let (mut f, behind) = Fixture::new();
    let app = f.desktop.open_window("App", "app", Rect::new(20, 20, 50, 50));

    f.tick();
    assert_eq!(f.left.drain(), vec![Seen::Enter(app, Rect::new(20, 20, 50, 50))]);
    assert!(f.right.drain().is_empty());
    assert_eq!(f.monitor.overlapping(f.left_id), vec![app]);
    assert!(!f.monitor.overlapping(f.left_id).contains(&behind));

    // straddling both surfaces
    f.desktop.move_window(app, Rect::new(380, 20, 150, 50));
    f.tick();
    assert_eq!(f.left.drain(), vec![Seen::Move(app, Rect::new(380, 20, 150, 50))]);
    assert_eq!(f.right.drain(), vec![Seen::Enter(app, Rect::new(380, 20, 150, 50))]);

    f.desktop.move_window(app, Rect::new(520, 20, 50, 50));
    f.tick();
    assert_eq!(f.left.drain(), vec![Seen::Exit(app, Rect::new(380, 20, 150, 50))]);
    assert_eq!(f.right.drain(), vec![Seen::Move(app, Rect::new(520, 20, 50, 50))]);

    // a tick without changes reports nothing
    f.tick();
    assert!(f.left.drain().is_empty() && f.right.drain().is_empty());
}

#[test]
fn tool_and_hidden_windows_never_overlap() {
    let (mut f, _behind) = Fixture::new();
    let tool = f.desktop.open_tool_window("Tooltip", Rect::new(30, 30, 20, 20));
    let app = f.desktop.open_window("App", "app", Rect::new(40, 40, 20, 20));
    f.desktop.set_visible(app, false);

    f.tick();
    assert!(f.left.drain().is_empty());

    f.desktop.set_visible(app, true);
    f.tick();
    assert_eq!(f.left.drain(), vec![Seen::Enter(app, Rect::new(40, 40, 20, 20))]);

    f.desktop.set_visible(app, false);
    f.tick();
    assert_eq!(f.left.drain(), vec![Seen::Exit(app, Rect::new(40, 40, 20, 20))]);
    assert!(f.monitor.overlapping(f.left_id).is_empty());
    assert!(!f.monitor.snapshot().contains(tool));
}

#[test]
fn raising_the_host_exits_windows_behind_it() {
    let (mut f, _behind) = Fixture::new();
    let a = f.desktop.open_window("App", "a", Rect::new(20, 20, 50, 50));
    let b = f.desktop.open_window("App", "b", Rect::new(100, 20, 50, 50));
    f.tick();
    assert_eq!(f.left.drain().len(), 2);

    f.desktop.raise(f.left.host);
    f.tick();
    // exits come in handle order
    assert_eq!(
        f.left.drain(),
        vec![
            Seen::Exit(a, Rect::new(20, 20, 50, 50)),
            Seen::Exit(b, Rect::new(100, 20, 50, 50)),
        ]
    );
}

#[test]
fn hidden_host_keeps_its_overlap_set() {
    let (mut f, _behind) = Fixture::new();
    let app = f.desktop.open_window("App", "app", Rect::new(520, 20, 50, 50));
    f.tick();
    assert_eq!(f.right.drain().len(), 1);

    f.desktop.set_visible(f.right.host, false);
    f.desktop.move_window(app, Rect::new(1200, 20, 50, 50));
    f.tick();
    assert!(f.right.drain().is_empty());
    assert_eq!(f.monitor.overlapping(f.right_id), vec![app]);

    f.desktop.set_visible(f.right.host, true);
    f.tick();
    assert_eq!(f.right.drain(), vec![Seen::Exit(app, Rect::new(520, 20, 50, 50))]);
}

#[test]
fn closed_window_exits_with_its_last_rect() {
    let (mut f, _behind) = Fixture::new();
    let app = f.desktop.open_window("App", "app", Rect::new(20, 20, 50, 50));
    f.tick();
    f.desktop.move_window(app, Rect::new(30, 20, 50, 50));
    f.tick();
    f.left.drain();

    f.desktop.close_window(app);
    f.tick();
    assert_eq!(f.left.drain(), vec![Seen::Exit(app, Rect::new(30, 20, 50, 50))]);
    assert_eq!(f.monitor.interval(), Duration::from_millis(50));
}
