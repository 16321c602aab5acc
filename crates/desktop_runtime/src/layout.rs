//! Responsive layout engine: initial placement of new windows and proportional rescaling when
//! the viewport changes.

use crate::{
    config::WindowManagerConfig,
    geometry,
    model::{Viewport, WindowId, WindowOptions, WindowRecord, WindowRect},
};

/// Uniform randomness used to scatter new windows.
pub trait PlacementSource {
    /// Returns a sample in `[0, 1)`.
    fn sample(&mut self) -> f64;
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngPlacement;

#[cfg(not(target_arch = "wasm32"))]
impl PlacementSource for ThreadRngPlacement {
    fn sample(&mut self) -> f64 {
        use rand::Rng;
        rand::rng().random::<f64>()
    }
}

#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct JsMathPlacement;

#[cfg(target_arch = "wasm32")]
impl PlacementSource for JsMathPlacement {
    fn sample(&mut self) -> f64 {
        js_sys::Math::random()
    }
}

/// Platform randomness: `Math.random` in the browser, the thread RNG elsewhere.
pub fn default_placement_source() -> Box<dyn PlacementSource> {
    #[cfg(target_arch = "wasm32")]
    {
        Box::new(JsMathPlacement)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(ThreadRngPlacement)
    }
}

pub struct ResponsiveLayout {
    viewport: Viewport,
    placement: Box<dyn PlacementSource>,
}

impl std::fmt::Debug for ResponsiveLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponsiveLayout")
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

impl ResponsiveLayout {
    pub fn new(viewport: Viewport, placement: Box<dyn PlacementSource>) -> Self {
        Self {
            viewport,
            placement,
        }
    }

    /// Viewport the current window geometry was computed against.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_placement_source(&mut self, placement: Box<dyn PlacementSource>) {
        self.placement = placement;
    }

    /// Bounds for a newly opened window.
    ///
    /// Missing sizes use the viewport-relative default; missing positions (or the `(0, 0)`
    /// sentinel) are scattered randomly over the placement range. Explicit values are clamped.
    pub fn initial_rect(
        &mut self,
        options: &WindowOptions,
        config: &WindowManagerConfig,
    ) -> WindowRect {
        let (default_w, default_h) = geometry::default_size(self.viewport, config);
        let w = options
            .width
            .unwrap_or(default_w)
            .max(config.min_window_width);
        let h = options
            .height
            .unwrap_or(default_h)
            .max(config.min_window_height);

        let (x, y) = match options.explicit_position() {
            Some(position) => position,
            None => {
                let rx = self.placement.sample();
                let ry = self.placement.sample();
                geometry::initial_position(w, h, self.viewport, config.chrome, rx, ry)
            }
        };
        geometry::clamp_position(WindowRect { x, y, w, h }, self.viewport, config.chrome)
    }

    /// Recomputes bounds for a viewport change and remembers `new_viewport`.
    ///
    /// Returns only windows whose geometry changes. Minimized windows are skipped. Maximized
    /// windows are refitted to the new work area and their pre-maximize snapshot is rescaled, so
    /// un-maximizing lands inside the new viewport. An unchanged viewport returns nothing.
    pub fn rescale(
        &mut self,
        new_viewport: Viewport,
        windows: &[WindowRecord],
        config: &WindowManagerConfig,
    ) -> Vec<RescaledWindow> {
        let previous = self.viewport;
        if previous == new_viewport {
            return Vec::new();
        }

        let work_area = geometry::work_area(new_viewport, config);
        let updates = windows
            .iter()
            .filter(|window| !window.is_minimized)
            .filter_map(|window| {
                let rescaled = if window.is_maximized {
                    RescaledWindow {
                        window_id: window.id,
                        rect: work_area,
                        original_bounds: window.original_bounds.map(|bounds| {
                            geometry::rescale_rect(bounds, previous, new_viewport, config)
                        }),
                    }
                } else {
                    RescaledWindow {
                        window_id: window.id,
                        rect: geometry::rescale_rect(window.rect, previous, new_viewport, config),
                        original_bounds: window.original_bounds,
                    }
                };
                (rescaled.rect != window.rect || rescaled.original_bounds != window.original_bounds)
                    .then_some(rescaled)
            })
            .collect();

        self.viewport = new_viewport;
        updates
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// New geometry for one window after a viewport change.
pub struct RescaledWindow {
    pub window_id: WindowId,
    pub rect: WindowRect,
    pub original_bounds: Option<WindowRect>,
}
