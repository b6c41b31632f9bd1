//! Drag-to-tile engine for foreign desktop windows.
//!
//! A polling [`overlap::OverlapMonitor`] notices windows dragged over the
//! tile surface, the [`tile::TileSplitter`] turns drops into tiles and keeps
//! each tiled window aligned with its layout cell, and the
//! [`root::RootCoordinator`] keeps the host window stacked behind them.
//! [`compositor::Compositor`] wires the three together.

pub mod compositor;
pub mod config;
pub mod constants;
pub mod desktop;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod geometry;
pub mod layout;
pub mod overlap;
pub mod root;
pub mod state;
pub mod tasks;
pub mod tile;
pub mod tracing_sub;
