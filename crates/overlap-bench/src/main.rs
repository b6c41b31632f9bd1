use std::io;
use std::str::FromStr;
use std::time::{Duration, Instant};

use clap::Parser;

use muntin::config::Config;
use muntin::desktop::{SimulatedDesktop, WindowHandle};
use muntin::geometry::Rect;
use muntin::overlap::{OverlapMonitor, OverlapObserver};

const DESKTOP: Rect = Rect {
    left: 0,
    top: 0,
    width: 3840,
    height: 2160,
};

#[derive(Parser, Debug)]
#[command(
    name = "overlap-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Measures overlap monitor ticks against a synthetic desktop"
)]
struct BenchCli {
    /// Number of foreign windows on the synthetic desktop.
    #[arg(short = 'w', long = "windows", value_name = "COUNT", default_value_t = 250)]
    windows: usize,

    /// Number of monitor ticks to measure.
    #[arg(short = 't', long = "ticks", value_name = "TICKS", default_value_t = 2_000)]
    ticks: u64,

    /// Fraction of windows moved between two ticks.
    #[arg(short = 'c', long = "churn", value_name = "FRACTION", default_value_t = 0.05)]
    churn: f64,

    /// Log level for the monitor's own tracing output.
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

struct BenchConfig {
    windows: usize,
    ticks: u64,
    moves_per_tick: usize,
    log_level: tracing::Level,
}

impl TryFrom<&BenchCli> for BenchConfig {
    type Error = String;

    fn try_from(cli: &BenchCli) -> Result<Self, Self::Error> {
        if !(1..=20_000).contains(&cli.windows) {
            return Err("windows must be between 1 and 20000".to_string());
        }
        if !(1..=1_000_000).contains(&cli.ticks) {
            return Err("ticks must be between 1 and 1000000".to_string());
        }
        if !(0.0..=1.0).contains(&cli.churn) {
            return Err("churn must be between 0 and 1".to_string());
        }
        let log_level = tracing::Level::from_str(&cli.log_level)
            .map_err(|_| format!("unknown log level `{}`", cli.log_level))?;
        Ok(Self {
            windows: cli.windows,
            ticks: cli.ticks,
            moves_per_tick: (cli.windows as f64 * cli.churn).ceil() as usize,
            log_level,
        })
    }
}

fn main() -> io::Result<()> {
    let args = BenchCli::parse();
    let config = BenchConfig::try_from(&args)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;
    muntin::tracing_sub::init(&Config {
        log_level: config.log_level,
        ..Config::default()
    })?;

    let stats = run_benchmark(&config);
    tracing::info!(ticks = stats.tick_count, "benchmark finished");
    println!("{}", stats.final_report(&config));
    Ok(())
}

/// Counts callbacks instead of acting on them.
struct CountingObserver {
    host: WindowHandle,
    region: Rect,
    enters: u64,
    moves: u64,
    exits: u64,
}

impl OverlapObserver for CountingObserver {
    fn overlap_region(&self) -> Rect {
        self.region
    }

    fn host_window(&self) -> WindowHandle {
        self.host
    }

    fn overlap_enter(&mut self, _handle: WindowHandle, _rect: Rect) {
        self.enters += 1;
    }

    fn overlap_move(&mut self, _handle: WindowHandle, _rect: Rect) {
        self.moves += 1;
    }

    fn overlap_exit(&mut self, _handle: WindowHandle, _rect: Rect) {
        self.exits += 1;
    }
}

fn run_benchmark(config: &BenchConfig) -> BenchStats {
    let mut rng = Lcg::seeded_from_clock();
    let desktop = SimulatedDesktop::new();
    let region = Rect::new(960, 540, 1920, 1080);
    let host = desktop.open_window("MuntinHost", "host", region);
    let windows: Vec<WindowHandle> = (0..config.windows)
        .map(|index| desktop.open_window("Bench", &format!("w{index}"), rng.rect()))
        .collect();

    let mut monitor = OverlapMonitor::default();
    let id = monitor.register();
    let mut observer = CountingObserver {
        host,
        region,
        enters: 0,
        moves: 0,
        exits: 0,
    };

    let mut stats = BenchStats::new();
    for _ in 0..config.ticks {
        for _ in 0..config.moves_per_tick {
            let window = windows[rng.next() as usize % windows.len()];
            desktop.move_window(window, rng.rect());
        }
        let started = Instant::now();
        monitor.tick(&desktop, &mut [(id, &mut observer as &mut dyn OverlapObserver)]);
        stats.record_tick(started.elapsed());
    }
    stats.enters = observer.enters;
    stats.moves = observer.moves;
    stats.exits = observer.exits;
    stats.mark_completed();
    stats
}

struct BenchStats {
    start: Instant,
    completed_at: Option<Instant>,
    tick_count: u64,
    total_tick_time: Duration,
    fastest_tick: Duration,
    slowest_tick: Duration,
    enters: u64,
    moves: u64,
    exits: u64,
}

impl BenchStats {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            completed_at: None,
            tick_count: 0,
            total_tick_time: Duration::ZERO,
            fastest_tick: Duration::MAX,
            slowest_tick: Duration::ZERO,
            enters: 0,
            moves: 0,
            exits: 0,
        }
    }

    fn elapsed(&self) -> Duration {
        match self.completed_at {
            Some(done) => done.duration_since(self.start),
            None => self.start.elapsed(),
        }
    }

    fn mark_completed(&mut self) {
        self.completed_at = Some(Instant::now());
    }

    fn record_tick(&mut self, tick_time: Duration) {
        self.tick_count = self.tick_count.saturating_add(1);
        self.total_tick_time += tick_time;
        self.fastest_tick = self.fastest_tick.min(tick_time);
        self.slowest_tick = self.slowest_tick.max(tick_time);
    }

    fn average_tick_us(&self) -> f64 {
        if self.tick_count == 0 {
            return 0.0;
        }
        (self.total_tick_time.as_secs_f64() / self.tick_count as f64) * 1_000_000.0
    }

    fn fastest_tick_us(&self) -> f64 {
        if self.tick_count == 0 {
            return 0.0;
        }
        self.fastest_tick.as_secs_f64() * 1_000_000.0
    }

    fn slowest_tick_us(&self) -> f64 {
        self.slowest_tick.as_secs_f64() * 1_000_000.0
    }

    fn final_report(&self, config: &BenchConfig) -> String {
        indoc::formatdoc!(
            r#"
            Overlap bench completed.
            Desktop: {windows} windows, {moves_per_tick} moved per tick
            Ticks: {ticks} in {elapsed:.2}s
            Avg tick: {avg:.1} us | Best: {best:.1} us | Worst: {worst:.1} us
            Events: {enters} enter | {moves} move | {exits} exit
            "#,
            windows = config.windows,
            moves_per_tick = config.moves_per_tick,
            ticks = self.tick_count,
            elapsed = self.elapsed().as_secs_f64(),
            avg = self.average_tick_us(),
            best = self.fastest_tick_us(),
            worst = self.slowest_tick_us(),
            enters = self.enters,
            moves = self.moves,
            exits = self.exits,
        )
    }
}

struct Lcg {
    state: u64,
}

impl Lcg {
    fn seeded_from_clock() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
            ^ 0xA5A5_A5A5_1234_5678;
        Self { state: seed }
    }

    fn next(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    fn rect(&mut self) -> Rect {
        let width = 200 + (self.next() % 800) as i32;
        let height = 150 + (self.next() % 600) as i32;
        let left = (self.next() % (DESKTOP.width - width) as u32) as i32;
        let top = (self.next() % (DESKTOP.height - height) as u32) as i32;
        Rect::new(left, top, width, height)
    }
}
