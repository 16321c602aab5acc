//! Pure window geometry: sizing, placement, clamping, directional resize and rescale.
//!
//! Nothing here touches the registry or a rendering surface; every function maps rectangles and
//! viewport dimensions to new rectangles.

use crate::{
    config::WindowManagerConfig,
    model::{ChromeInsets, PointerPosition, ResizeEdge, Viewport, WindowRect},
};

/// Clamps `value` into `[lo, hi]`. When the range is empty the lower bound wins.
pub fn clamp_range(value: i32, lo: i32, hi: i32) -> i32 {
    if hi < lo {
        lo
    } else {
        value.clamp(lo, hi)
    }
}

fn fraction_of(length: i32, fraction: f64) -> i32 {
    (f64::from(length) * fraction).floor() as i32
}

fn scaled(value: i32, factor: f64) -> i32 {
    (f64::from(value) * factor).round() as i32
}

fn ratio(to: i32, from: i32) -> f64 {
    if from <= 0 {
        1.0
    } else {
        f64::from(to) / f64::from(from)
    }
}

/// Size used for a window opened without an explicit width/height.
pub fn default_size(viewport: Viewport, config: &WindowManagerConfig) -> (i32, i32) {
    let fraction = config.default_viewport_fraction;
    let w = config
        .default_max_width
        .min(fraction_of(viewport.width, fraction))
        .max(config.min_window_width);
    let h = config
        .default_max_height
        .min(fraction_of(viewport.height, fraction))
        .max(config.min_window_height);
    (w, h)
}

/// Randomized initial origin for a `w`×`h` window; `rx`/`ry` are uniform samples in `[0, 1)`.
pub fn initial_position(
    w: i32,
    h: i32,
    viewport: Viewport,
    chrome: ChromeInsets,
    rx: f64,
    ry: f64,
) -> (i32, i32) {
    let free_x = (viewport.width - w).max(0);
    let free_y = (viewport.height - h - chrome.top - chrome.bottom).max(0);
    let x = (rx.clamp(0.0, 1.0) * f64::from(free_x)).floor() as i32;
    let y = (ry.clamp(0.0, 1.0) * f64::from(free_y)).floor() as i32;
    (x.min(free_x), chrome.top + y.min(free_y))
}

/// Keeps the whole window horizontally inside the viewport and the title bar between the chrome.
pub fn clamp_position(rect: WindowRect, viewport: Viewport, chrome: ChromeInsets) -> WindowRect {
    WindowRect {
        x: clamp_range(rect.x, 0, viewport.width - rect.w),
        y: clamp_range(rect.y, chrome.top, viewport.height - rect.h - chrome.bottom),
        ..rect
    }
}

/// Position of a dragged window for the current pointer location.
pub fn drag_to(
    rect: WindowRect,
    pointer: PointerPosition,
    grab_offset: PointerPosition,
    viewport: Viewport,
    chrome: ChromeInsets,
) -> WindowRect {
    let moved = WindowRect {
        x: pointer.x - grab_offset.x,
        y: pointer.y - grab_offset.y,
        ..rect
    };
    clamp_position(moved, viewport, chrome)
}

/// Applies resize deltas for a given edge/corner drag.
pub fn resize_rect(start: WindowRect, edge: ResizeEdge, dx: i32, dy: i32) -> WindowRect {
    match edge {
        ResizeEdge::East => WindowRect {
            w: start.w + dx,
            ..start
        },
        ResizeEdge::West => WindowRect {
            x: start.x + dx,
            w: start.w - dx,
            ..start
        },
        ResizeEdge::South => WindowRect {
            h: start.h + dy,
            ..start
        },
        ResizeEdge::North => WindowRect {
            y: start.y + dy,
            h: start.h - dy,
            ..start
        },
        ResizeEdge::NorthEast => WindowRect {
            y: start.y + dy,
            h: start.h - dy,
            w: start.w + dx,
            ..start
        },
        ResizeEdge::NorthWest => WindowRect {
            x: start.x + dx,
            y: start.y + dy,
            w: start.w - dx,
            h: start.h - dy,
        },
        ResizeEdge::SouthEast => WindowRect {
            w: start.w + dx,
            h: start.h + dy,
            ..start
        },
        ResizeEdge::SouthWest => WindowRect {
            x: start.x + dx,
            w: start.w - dx,
            h: start.h + dy,
            ..start
        },
    }
}

/// Stops the edges that `edge` moves at the viewport boundary. Fixed edges are left alone.
fn hold_moving_edges(
    rect: WindowRect,
    edge: ResizeEdge,
    viewport: Viewport,
    chrome: ChromeInsets,
) -> WindowRect {
    let mut held = rect;
    if edge.moves_west() && held.x < 0 {
        held.w += held.x;
        held.x = 0;
    }
    if edge.moves_east() && held.right() > viewport.width {
        held.w = viewport.width - held.x;
    }
    if edge.moves_north() && held.y < chrome.top {
        held.h -= chrome.top - held.y;
        held.y = chrome.top;
    }
    let floor = viewport.height - chrome.bottom;
    if edge.moves_south() && held.bottom() > floor {
        held.h = floor - held.y;
    }
    held
}

/// Raises width/height to the minimums while keeping the edge opposite the handle in place.
pub fn enforce_min_size(rect: WindowRect, edge: ResizeEdge, min_w: i32, min_h: i32) -> WindowRect {
    let mut sized = rect;
    if sized.w < min_w {
        if edge.moves_west() {
            sized.x = sized.right() - min_w;
        }
        sized.w = min_w;
    }
    if sized.h < min_h {
        if edge.moves_north() {
            sized.y = sized.bottom() - min_h;
        }
        sized.h = min_h;
    }
    sized
}

/// Full resize step: delta, viewport edge hold, minimum size, then position clamp.
///
/// The minimum size wins when it cannot be reconciled with the viewport.
pub fn resize_within_viewport(
    start: WindowRect,
    edge: ResizeEdge,
    dx: i32,
    dy: i32,
    viewport: Viewport,
    config: &WindowManagerConfig,
) -> WindowRect {
    let raw = resize_rect(start, edge, dx, dy);
    let held = hold_moving_edges(raw, edge, viewport, config.chrome);
    let sized = enforce_min_size(
        held,
        edge,
        config.min_window_width,
        config.min_window_height,
    );
    clamp_position(sized, viewport, config.chrome)
}

/// Proportionally maps `rect` from the `from` viewport into the `to` viewport.
pub fn rescale_rect(
    rect: WindowRect,
    from: Viewport,
    to: Viewport,
    config: &WindowManagerConfig,
) -> WindowRect {
    let scale_x = ratio(to.width, from.width);
    let scale_y = ratio(to.height, from.height);
    let reserved = config.responsive_reserved_height;

    let min_w = config
        .min_window_width
        .max(fraction_of(to.width, config.responsive_min_fraction));
    let max_w = fraction_of(to.width, config.responsive_max_fraction);
    let min_h = config
        .min_window_height
        .max(fraction_of(to.height, config.responsive_min_fraction));
    let max_h = fraction_of(to.height - reserved, config.responsive_max_fraction);

    let w = clamp_range(scaled(rect.w, scale_x), min_w, max_w);
    let h = clamp_range(scaled(rect.h, scale_y), min_h, max_h);
    WindowRect {
        x: clamp_range(scaled(rect.x, scale_x), 0, to.width - w),
        y: clamp_range(
            scaled(rect.y, scale_y),
            config.chrome.top,
            to.height - h - reserved,
        ),
        w,
        h,
    }
}

/// Bounds of a maximized window: the viewport minus the menu bar and dock.
pub fn work_area(viewport: Viewport, config: &WindowManagerConfig) -> WindowRect {
    WindowRect {
        x: 0,
        y: config.chrome.top,
        w: viewport.width,
        h: viewport.height - config.chrome.top - config.chrome.bottom,
    }
    .clamped_min(config.min_window_width, config.min_window_height)
}
