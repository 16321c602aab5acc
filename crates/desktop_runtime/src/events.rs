//! Lifecycle notifications published by the window manager on the desktop bus.

use serde_json::{json, Value};

use crate::model::{AppId, WindowId, WindowRect};

pub const WINDOW_OPENED: &str = "window:opened";
pub const WINDOW_CLOSED: &str = "window:closed";
pub const WINDOW_FOCUSED: &str = "window:focused";
pub const WINDOW_MINIMIZED: &str = "window:minimized";
pub const WINDOW_RESTORED: &str = "window:restored";
pub const WINDOW_MAXIMIZED: &str = "window:maximized";
pub const WINDOW_RESIZE: &str = "window:resize";
pub const DOCK_UPDATE_INDICATOR: &str = "dock:updateIndicator";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEvent {
    Opened {
        window_id: WindowId,
        app_id: AppId,
        title: String,
    },
    Closed {
        window_id: WindowId,
        app_id: AppId,
    },
    Focused {
        window_id: WindowId,
    },
    Minimized {
        window_id: WindowId,
    },
    Restored {
        window_id: WindowId,
    },
    Maximized {
        window_id: WindowId,
        is_maximized: bool,
    },
    Resized {
        window_id: WindowId,
        bounds: WindowRect,
    },
    DockIndicator {
        app_id: AppId,
        active: bool,
    },
}

impl WindowEvent {
    /// Bus topic the event is published under.
    pub const fn topic(&self) -> &'static str {
        match self {
            Self::Opened { .. } => WINDOW_OPENED,
            Self::Closed { .. } => WINDOW_CLOSED,
            Self::Focused { .. } => WINDOW_FOCUSED,
            Self::Minimized { .. } => WINDOW_MINIMIZED,
            Self::Restored { .. } => WINDOW_RESTORED,
            Self::Maximized { .. } => WINDOW_MAXIMIZED,
            Self::Resized { .. } => WINDOW_RESIZE,
            Self::DockIndicator { .. } => DOCK_UPDATE_INDICATOR,
        }
    }

    /// JSON payload with camelCase keys, as consumed by apps and the dock.
    pub fn payload(&self) -> Value {
        match self {
            Self::Opened {
                window_id,
                app_id,
                title,
            } => json!({ "windowId": window_id.0, "appId": app_id.as_str(), "title": title }),
            Self::Closed { window_id, app_id } => {
                json!({ "windowId": window_id.0, "appId": app_id.as_str() })
            }
            Self::Focused { window_id }
            | Self::Minimized { window_id }
            | Self::Restored { window_id } => json!({ "windowId": window_id.0 }),
            Self::Maximized {
                window_id,
                is_maximized,
            } => json!({ "windowId": window_id.0, "isMaximized": is_maximized }),
            Self::Resized { window_id, bounds } => json!({
                "windowId": window_id.0,
                "bounds": {
                    "left": bounds.x,
                    "top": bounds.y,
                    "width": bounds.w,
                    "height": bounds.h,
                },
                "width": bounds.w,
                "height": bounds.h,
            }),
            Self::DockIndicator { app_id, active } => {
                json!({ "appId": app_id.as_str(), "active": active })
            }
        }
    }
}
