//! Error types surfaced by the window manager.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failure to build or reach the visual surface of a window.
pub enum SurfaceError {
    /// The desktop container element is not present.
    #[error("desktop container `{0}` not found")]
    MissingContainer(String),
    /// The rendering environment could not create the surface.
    #[error("window surface unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Reasons [`crate::WindowManager::open_window`] can fail.
///
/// The registry is left untouched and no lifecycle event is emitted; surfacing a notification is
/// the caller's job.
pub enum OpenWindowError {
    #[error("could not open window: {0}")]
    Surface(#[from] SurfaceError),
}

#[derive(Debug, Error)]
/// Configuration load failures.
pub enum ConfigError {
    #[error("invalid window manager config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid window manager config: {0}")]
    Invalid(String),
}
