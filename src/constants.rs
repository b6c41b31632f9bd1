//! Shared crate-wide constants.

use std::time::Duration;

/// How often the overlap monitor rescans the desktop, in milliseconds.
pub const DEFAULT_POLL_MS: u64 = 200;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(DEFAULT_POLL_MS);

/// Width (or height, for vertical splits) of the draggable handle between two
/// tiles, in pixels.
pub const DEFAULT_HANDLE_GAP: i32 = 6;

/// Smallest size a tile can be dragged down to, in pixels.
pub const MIN_CELL_SIZE: i32 = 40;

/// Window class adopted at startup when no filter is configured
/// (File Explorer windows).
pub const DEFAULT_ADOPT_CLASS: &str = "CabinetWClass";
