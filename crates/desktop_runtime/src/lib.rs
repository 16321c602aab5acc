//! Window manager core for the browser desktop: the window registry, focus and stacking, drag
//! and resize, responsive layout, and lifecycle notifications on the desktop event bus.

pub mod config;
pub mod deferred;
#[cfg(all(target_arch = "wasm32", feature = "csr"))]
pub mod dom_surface;
pub mod error;
pub mod events;
pub mod geometry;
pub mod interaction;
pub mod layout;
pub mod manager;
pub mod model;
pub mod surface;

pub use config::WindowManagerConfig;
pub use desktop_event_bus::{EventBus, ListenerError, ListenerId, ListenerResult};
pub use error::{ConfigError, OpenWindowError, SurfaceError};
pub use events::WindowEvent;
pub use interaction::WindowInput;
pub use layout::{default_placement_source, PlacementSource, RescaledWindow, ResponsiveLayout};
pub use manager::WindowManager;
pub use model::*;
pub use surface::{HeadlessSurfaceHost, SurfaceCall, SurfaceFrame, SurfaceHandle, SurfaceHost};
