use std::rc::Rc;

use muntin::compositor::Compositor;
use muntin::config::Config;
use muntin::desktop::{Image, SimulatedDesktop, WindowFilter, WindowHandle};
use muntin::drivers::HostEvent;
use muntin::geometry::Rect;
use muntin::tile::PaintSurface;

const SURFACE: Rect = Rect::new(0, 0, 806, 600);

struct Canvas(Vec<Rect>);

impl PaintSurface for Canvas {
    fn paint_image(&mut self, target: Rect, _image: &Image) {
        self.0.push(target);
    }
}

struct Fixture {
    desktop: Rc<SimulatedDesktop>,
    host: WindowHandle,
    compositor: Compositor<SimulatedDesktop>,
    /// Tiled windows in layout order.
    tiles: Vec<WindowHandle>,
}

fn fixture() -> Fixture {
    let desktop = Rc::new(SimulatedDesktop::new());
    let host = desktop.open_window("MuntinHost", "muntin", SURFACE);
    let back = desktop.open_window("Tile", "back", Rect::new(900, 0, 100, 100));
    let front = desktop.open_window("Tile", "front", Rect::new(900, 0, 100, 100));
    let config = Config {
        adopt: WindowFilter {
            class_name: Some("Tile".into()),
            title_contains: None,
        },
        ..Config::default()
    };
    let mut compositor = Compositor::new(desktop.clone(), host, config);
    compositor.turn([HostEvent::Geometry(SURFACE)], false);
    let filter = compositor.config().adopt.clone();
    compositor.adopt_matching(&filter);
    compositor.turn([], true);
    Fixture {
        desktop,
        host,
        compositor,
        tiles: vec![front, back],
    }
}

fn is_parked(f: &Fixture, handle: WindowHandle) -> bool {
    f.compositor
        .splitter()
        .container(handle)
        .is_some_and(|container| container.is_parked())
}

#[test]
fn adopted_windows_sit_in_front_of_the_host() {
    let f = fixture();
    assert_eq!(f.compositor.splitter().tiled_handles(), f.tiles);
    assert_eq!(f.desktop.rect_of(f.tiles[0]), Some(Rect::new(0, 0, 400, 600)));
    assert_eq!(f.desktop.rect_of(f.tiles[1]), Some(Rect::new(406, 0, 400, 600)));
    assert_eq!(f.desktop.z_order().last(), Some(&f.host));
}

#[test]
fn host_move_parks_then_resyncs_on_exit() {
    let mut f = fixture();

    f.compositor
        .turn([HostEvent::EnterSizeMove, HostEvent::Moving], true);
    for tile in &f.tiles {
        assert!(is_parked(&f, *tile));
        assert_eq!(f.desktop.rect_of(*tile).map(|r| r.top), Some(-600));
    }
    // parked windows left the surface but stay tiled
    assert_eq!(f.compositor.managed_handles().len(), 2);

    let mut canvas = Canvas(Vec::new());
    assert_eq!(f.compositor.paint(&mut canvas), 2);
    assert_eq!(
        canvas.0,
        vec![Rect::new(0, 0, 400, 600), Rect::new(406, 0, 400, 600)]
    );

    // repeated moving notifications do not park again
    let calls = f.desktop.position_calls().len();
    f.compositor.turn([HostEvent::Moving], false);
    assert_eq!(f.desktop.position_calls().len(), calls);

    let moved = Rect::new(50, 40, 806, 600);
    f.desktop.move_window(f.host, moved);
    f.compositor.turn([HostEvent::Geometry(moved)], true);
    assert_eq!(f.compositor.splitter().geometry(), moved);
    assert!(is_parked(&f, f.tiles[0]));
    assert_eq!(f.desktop.rect_of(f.tiles[0]).map(|r| r.top), Some(-600));

    f.compositor.turn([HostEvent::ExitSizeMove], true);
    assert_eq!(f.desktop.rect_of(f.tiles[0]), Some(Rect::new(50, 40, 400, 600)));
    assert_eq!(f.desktop.rect_of(f.tiles[1]), Some(Rect::new(456, 40, 400, 600)));
    assert!(!is_parked(&f, f.tiles[0]) && !is_parked(&f, f.tiles[1]));
    assert_eq!(f.desktop.z_order().last(), Some(&f.host));
    assert_eq!(f.desktop.rect_of(f.host), Some(moved));
}

#[test]
fn host_resize_updates_tiles_immediately() {
    let mut f = fixture();
    f.compositor
        .turn([HostEvent::EnterSizeMove, HostEvent::Sizing], false);
    assert!(!is_parked(&f, f.tiles[0]));

    let wider = Rect::new(0, 0, 1006, 600);
    f.compositor.turn([HostEvent::Geometry(wider)], true);
    assert_eq!(f.desktop.rect_of(f.tiles[0]), Some(Rect::new(0, 0, 500, 600)));
    assert_eq!(f.desktop.rect_of(f.tiles[1]), Some(Rect::new(506, 0, 500, 600)));

    f.compositor.turn([HostEvent::ExitSizeMove], true);
    assert_eq!(f.compositor.managed_handles().len(), 2);
}

#[test]
fn handle_drag_resizes_even_while_host_moves() {
    let mut f = fixture();
    f.compositor
        .turn([HostEvent::EnterSizeMove, HostEvent::Moving], false);
    f.compositor
        .turn([HostEvent::DragHandle { index: 0, delta: 50 }], false);
    assert_eq!(f.desktop.rect_of(f.tiles[0]), Some(Rect::new(0, 0, 450, 600)));
    assert_eq!(f.desktop.rect_of(f.tiles[1]), Some(Rect::new(456, 0, 350, 600)));
    f.compositor.turn([HostEvent::ExitSizeMove], false);
    // the dragged split survives the resync
    assert_eq!(f.desktop.rect_of(f.tiles[0]), Some(Rect::new(0, 0, 450, 600)));
}

#[test]
fn out_of_range_handle_drag_is_ignored() {
    let mut f = fixture();
    f.compositor
        .turn([HostEvent::DragHandle { index: usize::MAX, delta: 5 }], false);
    f.compositor
        .turn([HostEvent::DragHandle { index: 1, delta: 5 }], false);
    assert_eq!(f.desktop.rect_of(f.tiles[0]), Some(Rect::new(0, 0, 400, 600)));
    assert_eq!(f.desktop.rect_of(f.tiles[1]), Some(Rect::new(406, 0, 400, 600)));
}

#[test]
fn moving_the_host_forgets_the_drop_candidate() {
    let mut f = fixture();
    let stray = f
        .desktop
        .open_window("Notepad", "stray", Rect::new(1200, 0, 200, 200));
    f.compositor.turn([HostEvent::LeftButtonDown], true);
    f.desktop.drag_window(stray, Rect::new(100, 100, 200, 200));
    f.compositor.turn([], true);
    assert_eq!(f.compositor.splitter().pending_handle(), Some(stray));

    f.compositor.turn(
        [
            HostEvent::EnterSizeMove,
            HostEvent::Moving,
            HostEvent::ExitSizeMove,
            HostEvent::LeftButtonUp,
        ],
        true,
    );
    assert!(!f.compositor.is_managed(stray));
    assert_eq!(f.compositor.splitter().pending_handle(), None);
    assert_eq!(f.compositor.managed_handles().len(), 2);
}

#[test]
fn pointer_over_tiles_restacks_the_raised_host() {
    let mut f = fixture();
    f.desktop.raise(f.host);
    assert_eq!(f.desktop.z_order().first(), Some(&f.host));

    f.compositor.turn([HostEvent::PointerOverTiles], true);
    assert_eq!(f.desktop.z_order().last(), Some(&f.host));
    // windows behind the raised host were never dragged out
    assert_eq!(f.compositor.managed_handles().len(), 2);

    let z = f.desktop.z_order();
    f.compositor.turn([HostEvent::PointerOverTiles], false);
    assert_eq!(f.desktop.z_order(), z);
}
