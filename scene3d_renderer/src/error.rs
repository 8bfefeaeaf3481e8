//! Error types for the scene renderer
//!
//! Failures inside a frame are logged and turned into skipped work by the
//! scene. These types are what the device boundary reports upward.

use std::fmt;

/// Result type for scene renderer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Scene renderer errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Backend-specific error reported by the graphics device
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (buffer, texture, shader, handle, etc.)
    InvalidResource(String),

    /// Initialization failed (device, resource manager, subsystems)
    InitializationFailed(String),

    /// Graphics device is lost and must be reset before use
    DeviceLost,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::DeviceLost => write!(f, "Graphics device lost"),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an error and build an `Error::BackendError` from the message.
///
/// Intended for `ok_or_else` chains:
///
/// ```ignore
/// let buffer = maybe_buffer.ok_or_else(|| engine_err!("scene3d::Device", "No buffer for {}", label))?;
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::scene3d::Error::BackendError(message)
    }};
}

/// Log an error and return early with `Err(Error::BackendError(..))`.
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
