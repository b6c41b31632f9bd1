use std::rc::Rc;

use muntin::compositor::Compositor;
use muntin::config::Config;
use muntin::desktop::{SimulatedDesktop, WS_BORDER, WS_THICKFRAME, WindowFilter, WindowHandle};
use muntin::drivers::HostEvent;
use muntin::geometry::Rect;

const SURFACE: Rect = Rect::new(0, 0, 806, 600);

fn setup() -> (Rc<SimulatedDesktop>, WindowHandle, Compositor<SimulatedDesktop>) {
    let desktop = Rc::new(SimulatedDesktop::new());
    let host = desktop.open_window("MuntinHost", "muntin", SURFACE);
    let config = Config {
        adopt: WindowFilter::default(),
        ..Config::default()
    };
    let mut compositor = Compositor::new(desktop.clone(), host, config);
    compositor.turn([HostEvent::Geometry(SURFACE)], false);
    (desktop, host, compositor)
}

/// Button down somewhere else, drag `window` to `rect`, let the monitor see
/// it, release.
fn drag_and_drop(
    desktop: &SimulatedDesktop,
    compositor: &mut Compositor<SimulatedDesktop>,
    window: WindowHandle,
    rect: Rect,
) {
    compositor.turn([HostEvent::LeftButtonDown], false);
    desktop.drag_window(window, rect);
    compositor.turn([], true);
    compositor.turn([HostEvent::LeftButtonUp], false);
}

#[test]
fn dropped_window_is_tiled_exactly_once() {
    let (desktop, host, mut compositor) = setup();
    let h1 = desktop.open_window("App", "h1", Rect::new(1000, 0, 300, 200));

    compositor.turn([], true);
    assert_eq!(compositor.splitter().pending_handle(), None);

    drag_and_drop(&desktop, &mut compositor, h1, Rect::new(10, 10, 50, 50));
    assert_eq!(compositor.managed_handles(), vec![h1]);
    assert_eq!(compositor.splitter().tiled_handles(), vec![h1]);
    assert_eq!(desktop.rect_of(h1), Some(SURFACE));

    let style = desktop.style_of(h1).unwrap();
    assert_eq!(style & WS_THICKFRAME, 0);
    assert_ne!(style & WS_BORDER, 0);
    // host sits directly behind the tile
    assert_eq!(desktop.z_order(), vec![h1, host]);

    // another click with no new enter does not add again
    compositor.turn([HostEvent::LeftButtonDown], false);
    compositor.turn([], true);
    compositor.turn([HostEvent::LeftButtonUp], false);
    assert_eq!(compositor.splitter().len(), 1);
    assert_eq!(compositor.pending_tasks(), 0);
}

#[test]
fn add_is_deferred_to_the_end_of_the_turn() {
    let (desktop, _host, mut compositor) = setup();
    let h1 = desktop.open_window("App", "h1", Rect::new(10, 10, 50, 50));
    compositor.turn([], true);
    assert_eq!(compositor.splitter().pending_handle(), Some(h1));

    // outside a turn the button edges are only recorded
    compositor.handle_event(HostEvent::LeftButtonDown);
    compositor.handle_event(HostEvent::LeftButtonUp);
    assert!(!compositor.is_managed(h1));

    compositor.turn([], false);
    assert!(compositor.is_managed(h1));
}

#[test]
fn second_window_splits_the_surface() {
    let (desktop, host, mut compositor) = setup();
    let h1 = desktop.open_window("App", "h1", Rect::new(1000, 0, 300, 200));
    let h2 = desktop.open_window("App", "h2", Rect::new(1000, 300, 300, 200));

    drag_and_drop(&desktop, &mut compositor, h1, Rect::new(10, 10, 50, 50));
    drag_and_drop(&desktop, &mut compositor, h2, Rect::new(500, 10, 50, 50));

    assert_eq!(compositor.splitter().tiled_handles(), vec![h1, h2]);
    assert_eq!(desktop.rect_of(h1), Some(Rect::new(0, 0, 400, 600)));
    assert_eq!(desktop.rect_of(h2), Some(Rect::new(406, 0, 400, 600)));
    assert_eq!(desktop.z_order().last(), Some(&host));
}

#[test]
fn last_window_entered_wins_the_drop() {
    let (desktop, _host, mut compositor) = setup();
    let h1 = desktop.open_window("App", "h1", Rect::new(1000, 0, 300, 200));
    let h2 = desktop.open_window("App", "h2", Rect::new(1000, 300, 300, 200));

    compositor.turn([HostEvent::LeftButtonDown], false);
    desktop.drag_window(h1, Rect::new(10, 10, 50, 50));
    compositor.turn([], true);
    desktop.drag_window(h2, Rect::new(100, 10, 50, 50));
    compositor.turn([], true);
    compositor.turn([HostEvent::LeftButtonUp], false);

    assert_eq!(compositor.managed_handles(), vec![h2]);
}

#[test]
fn windows_entering_during_host_move_are_not_tiled() {
    let (desktop, _host, mut compositor) = setup();
    let h1 = desktop.open_window("App", "h1", Rect::new(1000, 0, 300, 200));

    compositor.turn([HostEvent::EnterSizeMove, HostEvent::Moving], false);
    desktop.move_window(h1, Rect::new(10, 10, 50, 50));
    compositor.turn([], true);
    compositor.turn([HostEvent::ExitSizeMove], false);
    assert_eq!(compositor.splitter().pending_handle(), None);

    compositor.turn([HostEvent::LeftButtonDown], false);
    compositor.turn([HostEvent::LeftButtonUp], true);
    assert!(compositor.managed_handles().is_empty());
}

#[test]
fn startup_adoption_uses_the_configured_filter() {
    let desktop = Rc::new(SimulatedDesktop::new());
    let host = desktop.open_window("MuntinHost", "muntin", SURFACE);
    let explorer = desktop.open_window("CabinetWClass", "Downloads", Rect::new(900, 0, 300, 300));
    let _other = desktop.open_window("Notepad", "notes", Rect::new(900, 0, 300, 300));

    let mut compositor = Compositor::new(desktop.clone(), host, Config::default());
    compositor.turn([HostEvent::Geometry(SURFACE)], false);
    let filter = compositor.config().adopt.clone();
    assert_eq!(compositor.adopt_matching(&filter), 1);
    assert_eq!(compositor.managed_handles(), vec![explorer]);
    assert_eq!(desktop.rect_of(explorer), Some(SURFACE));
}
