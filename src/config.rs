//! Runtime configuration and the command line it is parsed from.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;

use crate::constants::{
    DEFAULT_ADOPT_CLASS, DEFAULT_HANDLE_GAP, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_MS,
};
use crate::desktop::WindowFilter;
use crate::error::MuntinError;
use crate::layout::Orientation;

#[derive(Parser, Debug)]
#[command(
    name = "muntin",
    version = env!("CARGO_PKG_VERSION"),
    about = "Drag foreign windows onto a split layout and keep them tiled"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Overlap poll interval.
    #[arg(
        long = "poll-ms",
        value_name = "MILLIS",
        global = true,
        default_value_t = DEFAULT_POLL_MS
    )]
    pub poll_ms: u64,

    /// Split direction of the tile surface.
    #[arg(long, value_enum, global = true, default_value_t = OrientationArg::Horizontal)]
    pub orientation: OrientationArg,

    /// Width of the drag handle between tiles, in pixels.
    #[arg(
        long = "handle-gap",
        value_name = "PIXELS",
        global = true,
        default_value_t = DEFAULT_HANDLE_GAP
    )]
    pub handle_gap: i32,

    /// Window class adopted at startup.
    #[arg(
        long = "adopt-class",
        value_name = "CLASS",
        global = true,
        default_value = DEFAULT_ADOPT_CLASS
    )]
    pub adopt_class: String,

    /// Only adopt windows whose title contains this text.
    #[arg(long = "adopt-title", value_name = "TEXT", global = true)]
    pub adopt_title: Option<String>,

    /// Do not adopt any window at startup.
    #[arg(long = "no-adopt", global = true)]
    pub no_adopt: bool,

    /// Maximum log level (error, warn, info, debug, trace).
    #[arg(long = "log-level", value_name = "LEVEL", global = true, default_value = "info")]
    pub log_level: String,

    /// Append logs to this file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the top-level windows the overlap monitor would see.
    Windows {
        /// Include tool windows and hidden windows.
        #[arg(long)]
        all: bool,
    },
    /// Replay a scripted drag-in / drag-out session on an in-memory desktop.
    Simulate {
        /// Number of foreign windows to drag onto the tile surface.
        #[arg(long, default_value_t = 3)]
        windows: usize,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationArg {
    Horizontal,
    Vertical,
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Horizontal => Orientation::Horizontal,
            OrientationArg::Vertical => Orientation::Vertical,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub poll_interval: Duration,
    pub orientation: Orientation,
    pub handle_gap: i32,
    pub adopt: WindowFilter,
    pub log_level: Level,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            orientation: Orientation::default(),
            handle_gap: DEFAULT_HANDLE_GAP,
            adopt: WindowFilter {
                class_name: Some(DEFAULT_ADOPT_CLASS.to_string()),
                title_contains: None,
            },
            log_level: Level::INFO,
            log_file: None,
        }
    }
}

impl TryFrom<&Cli> for Config {
    type Error = MuntinError;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        if !(10..=5_000).contains(&cli.poll_ms) {
            return Err(MuntinError::Config(
                "poll interval must be between 10 and 5000 ms".to_string(),
            ));
        }
        if !(0..=64).contains(&cli.handle_gap) {
            return Err(MuntinError::Config(
                "handle gap must be between 0 and 64 pixels".to_string(),
            ));
        }
        let log_level = Level::from_str(&cli.log_level)
            .map_err(|_| MuntinError::Config(format!("unknown log level `{}`", cli.log_level)))?;
        let adopt = if cli.no_adopt {
            WindowFilter::default()
        } else {
            WindowFilter {
                class_name: Some(cli.adopt_class.clone()).filter(|class| !class.is_empty()),
                title_contains: cli.adopt_title.clone(),
            }
        };
        Ok(Self {
            poll_interval: Duration::from_millis(cli.poll_ms),
            orientation: cli.orientation.into(),
            handle_gap: cli.handle_gap,
            adopt,
            log_level,
            log_file: cli.log_file.clone(),
        })
    }
}
