//! Core data types owned by the window manager.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};

use crate::surface::SurfaceHandle;

static NEXT_WINDOW_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Process-unique window identifier. Ids are never reused, even across manager instances.
pub struct WindowId(pub u64);

impl WindowId {
    pub(crate) fn next() -> Self {
        Self(NEXT_WINDOW_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Identifier of the application that owns a window (`calculator`, `terminal`, ...).
pub struct AppId(String);

impl AppId {
    /// Creates an app id from any string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for AppId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Window geometry in viewport pixels.
pub struct WindowRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl WindowRect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn clamped_min(self, min_w: i32, min_h: i32) -> Self {
        Self {
            w: self.w.max(min_w),
            h: self.h.max(min_h),
            ..self
        }
    }

    pub const fn right(self) -> i32 {
        self.x + self.w
    }

    pub const fn bottom(self) -> i32 {
        self.y + self.h
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Size of the browser viewport hosting the desktop.
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Screen space reserved for the menu bar (top) and dock (bottom).
pub struct ChromeInsets {
    pub top: i32,
    pub bottom: i32,
}

impl Default for ChromeInsets {
    fn default() -> Self {
        Self {
            top: 32,
            bottom: 52,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Behavioral flags a window is opened with.
pub struct WindowFlags {
    pub resizable: bool,
    pub minimizable: bool,
    pub maximizable: bool,
    pub closable: bool,
}

impl Default for WindowFlags {
    fn default() -> Self {
        Self {
            resizable: true,
            minimizable: true,
            maximizable: true,
            closable: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
/// Caller overrides for [`crate::WindowManager::open_window`].
///
/// Unset width/height fall back to the viewport-relative default size. An unset position, or an
/// explicit `(0, 0)`, requests automatic placement.
pub struct WindowOptions {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub flags: WindowFlags,
}

impl WindowOptions {
    pub fn sized(width: i32, height: i32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_flags(mut self, flags: WindowFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Explicit position, unless it is missing or the `(0, 0)` auto-placement sentinel.
    pub(crate) fn explicit_position(&self) -> Option<(i32, i32)> {
        match (self.x, self.y) {
            (Some(0), Some(0)) | (None, None) => None,
            (x, y) => Some((x.unwrap_or(0), y.unwrap_or(0))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Committed configuration of a window: last settled geometry plus flags.
///
/// Live bounds move during a drag or resize; the configuration only follows once the gesture
/// ends.
pub struct WindowConfig {
    pub rect: WindowRect,
    pub flags: WindowFlags,
}

#[derive(Debug, Clone, PartialEq)]
/// A window tracked by the registry.
pub struct WindowRecord {
    pub id: WindowId,
    pub app_id: AppId,
    pub title: String,
    /// Opaque content supplied by the owning app.
    pub content: String,
    pub rect: WindowRect,
    pub config: WindowConfig,
    pub z_index: u64,
    pub is_minimized: bool,
    pub is_maximized: bool,
    /// Geometry captured when the window was maximized.
    pub original_bounds: Option<WindowRect>,
    pub surface: SurfaceHandle,
}

impl WindowRecord {
    /// Whether drag/resize gestures and responsive rescaling may touch this window.
    pub fn is_interactive(&self) -> bool {
        !self.is_minimized && !self.is_maximized
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: i32,
    pub y: i32,
}

impl PointerPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeEdge {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl ResizeEdge {
    pub const ALL: [ResizeEdge; 8] = [
        ResizeEdge::North,
        ResizeEdge::South,
        ResizeEdge::East,
        ResizeEdge::West,
        ResizeEdge::NorthEast,
        ResizeEdge::NorthWest,
        ResizeEdge::SouthEast,
        ResizeEdge::SouthWest,
    ];

    pub const fn moves_west(self) -> bool {
        matches!(self, Self::West | Self::NorthWest | Self::SouthWest)
    }

    pub const fn moves_east(self) -> bool {
        matches!(self, Self::East | Self::NorthEast | Self::SouthEast)
    }

    pub const fn moves_north(self) -> bool {
        matches!(self, Self::North | Self::NorthEast | Self::NorthWest)
    }

    pub const fn moves_south(self) -> bool {
        matches!(self, Self::South | Self::SouthEast | Self::SouthWest)
    }

    /// CSS class suffix used by surface adapters for the handle element.
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::North => "n",
            Self::South => "s",
            Self::East => "e",
            Self::West => "w",
            Self::NorthEast => "ne",
            Self::NorthWest => "nw",
            Self::SouthEast => "se",
            Self::SouthWest => "sw",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub window_id: WindowId,
    /// Pointer position relative to the window origin at grab time.
    pub grab_offset: PointerPosition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeSession {
    pub window_id: WindowId,
    pub edge: ResizeEdge,
    pub pointer_start: PointerPosition,
    pub rect_start: WindowRect,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// In-flight pointer gesture. At most one of drag or resize is active at a time.
pub struct InteractionState {
    pub dragging: Option<DragSession>,
    pub resizing: Option<ResizeSession>,
}

impl InteractionState {
    pub fn targets(&self, window_id: WindowId) -> bool {
        self.dragging
            .as_ref()
            .is_some_and(|session| session.window_id == window_id)
            || self
                .resizing
                .as_ref()
                .is_some_and(|session| session.window_id == window_id)
    }

    pub fn clear(&mut self) {
        self.dragging = None;
        self.resizing = None;
    }
}
