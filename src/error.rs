//! Error types for native window services and the command-line surface.
//!
//! Native failures are expected during normal operation (a foreign window can
//! close at any moment), so the engine logs and skips them. Only the binary
//! and configuration layers surface `MuntinError` to the user.

use thiserror::Error;

use crate::desktop::WindowHandle;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NativeError {
    #[error("window {0:?} no longer exists")]
    WindowGone(WindowHandle),
    #[error("{call} failed for window {handle:?}")]
    CallFailed {
        call: &'static str,
        handle: WindowHandle,
    },
    #[error("native window services are not available on this platform")]
    Unsupported,
}

#[derive(Debug, Error)]
pub enum MuntinError {
    #[error("native error: {0}")]
    Native(#[from] NativeError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("{0} is only available on Windows")]
    Unsupported(&'static str),
}

pub type Result<T, E = MuntinError> = std::result::Result<T, E>;
