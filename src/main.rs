use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use indoc::formatdoc;

use muntin::compositor::Compositor;
use muntin::config::{Cli, Command, Config};
use muntin::desktop::{Image, SimulatedDesktop, WS_EX_TOOLWINDOW, WindowEnumerator, WindowHandle};
use muntin::drivers::HostEvent;
use muntin::error::Result;
use muntin::geometry::Rect;
use muntin::overlap::ZOrderSnapshot;
use muntin::tile::PaintSurface;
use muntin::tracing_sub;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("muntin: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::try_from(cli)?;
    tracing_sub::init(&config)?;
    match cli.command {
        Command::Windows { all } => list_native_windows(all),
        Command::Simulate { windows } => simulate(config, windows),
    }
}

#[cfg(windows)]
fn list_native_windows(all: bool) -> Result<()> {
    let desktop = muntin::desktop::win32::Win32Desktop::new();
    print_windows(&desktop, all);
    Ok(())
}

#[cfg(not(windows))]
fn list_native_windows(_all: bool) -> Result<()> {
    Err(muntin::error::MuntinError::Unsupported("listing native windows"))
}

/// Prints windows front to back. Without `all`, only the windows the overlap
/// monitor would consider are listed.
fn print_windows<E: WindowEnumerator + ?Sized>(desktop: &E, all: bool) {
    let handles: Vec<WindowHandle> = if all {
        desktop.top_level_windows()
    } else {
        ZOrderSnapshot::scan(desktop)
            .entries()
            .iter()
            .map(|(handle, _)| *handle)
            .collect()
    };
    println!("{:>4}  {:<18}  {:<24}  {:<28}  title", "z", "handle", "class", "rect");
    for (z, handle) in handles.into_iter().enumerate() {
        let class = desktop.class_name(handle).unwrap_or_default();
        let title = desktop.window_text(handle).unwrap_or_default();
        let rect = desktop
            .window_rect(handle)
            .map(|r| format!("{},{} {}x{}", r.left, r.top, r.width, r.height))
            .unwrap_or_else(|_| "-".to_string());
        let mut flags = String::new();
        if desktop
            .extended_style(handle)
            .is_ok_and(|style| style & WS_EX_TOOLWINDOW != 0)
        {
            flags.push_str(" [tool]");
        }
        if !desktop.is_visible(handle) {
            flags.push_str(" [hidden]");
        }
        println!(
            "{z:>4}  {:<18}  {class:<24.24}  {rect:<28}  {title}{flags}",
            format!("{:#x}", handle.0)
        );
    }
}

#[derive(Default)]
struct PaintTally {
    images: usize,
    pixels: usize,
}

impl PaintSurface for PaintTally {
    fn paint_image(&mut self, _target: Rect, image: &Image) {
        self.images += 1;
        self.pixels += image.pixels.len();
    }
}

/// Drags `count` windows onto a simulated host, moves the host, drags one
/// window back out and closes another, then reports what is left.
fn simulate(config: Config, count: usize) -> Result<()> {
    let desktop = Rc::new(SimulatedDesktop::new());
    let surface = Rect::new(100, 100, 1200, 800);
    let host = desktop.open_window("MuntinHost", "muntin", surface);
    desktop.open_window("CabinetWClass", "Downloads", Rect::new(40, 40, 500, 400));

    let adopt = config.adopt.clone();
    let mut compositor = Compositor::new(desktop.clone(), host, config);
    compositor.turn([HostEvent::Geometry(surface)], true);
    let adopted = compositor.adopt_matching(&adopt);

    let mut dropped = Vec::new();
    for index in 0..count {
        let x = 1500 + index as i32 * 20;
        let app = desktop.open_window(
            "Notepad",
            &format!("notes-{index}.txt"),
            Rect::new(x, 80, 400, 300),
        );
        compositor.turn([HostEvent::LeftButtonDown], false);
        desktop.drag_window(app, Rect::new(300 + index as i32 * 40, 200, 400, 300));
        compositor.turn([], true);
        compositor.turn([HostEvent::LeftButtonUp], false);
        if compositor.is_managed(app) {
            dropped.push(app);
        }
    }

    compositor.turn([HostEvent::DragHandle { index: 0, delta: 60 }], false);

    compositor.turn([HostEvent::EnterSizeMove, HostEvent::Moving], true);
    let moved = Rect::new(160, 140, surface.width, surface.height);
    desktop.move_window(host, moved);
    compositor.turn([HostEvent::Geometry(moved)], true);
    compositor.turn([HostEvent::ExitSizeMove], true);

    let mut released = 0;
    if let Some(&last) = dropped.last() {
        compositor.turn([HostEvent::LeftButtonDown], false);
        desktop.drag_window(last, Rect::new(2200, 300, 400, 300));
        compositor.turn([], true);
        compositor.turn([HostEvent::LeftButtonUp], false);
        if !compositor.is_managed(last) {
            released += 1;
        }
    }

    let mut closed = 0;
    if let Some(&first) = dropped.first()
        && compositor.is_managed(first)
    {
        desktop.close_window(first);
        compositor.turn([], true);
        closed += 1;
    }

    let mut tally = PaintTally::default();
    compositor.paint(&mut tally);

    print_windows(&*desktop, false);
    println!(
        "{}",
        formatdoc! {"

            adopted at startup:   {adopted}
            dropped onto tiles:   {dropped}
            dragged back out:     {released}
            closed while tiled:   {closed}
            still tiled:          {tiled}
            snapshots painted:    {images} ({pixels} px)
            positioning calls:    {calls}",
            dropped = dropped.len(),
            tiled = compositor.managed_handles().len(),
            images = tally.images,
            pixels = tally.pixels,
            calls = desktop.position_calls().len(),
        }
    );
    Ok(())
}
