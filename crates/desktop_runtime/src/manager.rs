//! Window registry, lifecycle, and focus/stacking controller.
//!
//! [`WindowManager`] is the single owner of window geometry, flags, the z-order counter, and the
//! active-window designation. Apps and shell surfaces hold window ids and go through its methods;
//! nothing else mutates registry state. Operations on unknown ids are silent no-ops because ids may
//! outlive their window while a close transition is still playing.
//!
//! Lifecycle notifications are published synchronously on the shared [`EventBus`]. Listeners run
//! while the manager is mutably borrowed, so they must not call back into it synchronously.

use std::{collections::VecDeque, time::Duration};

use desktop_event_bus::EventBus;
use leptos::logging;

use crate::{
    config::WindowManagerConfig,
    deferred::DeferredQueue,
    error::OpenWindowError,
    events::WindowEvent,
    geometry,
    layout::{default_placement_source, PlacementSource, ResponsiveLayout},
    model::{
        AppId, InteractionState, Viewport, WindowConfig, WindowId, WindowOptions, WindowRecord,
    },
    surface::{SurfaceFrame, SurfaceHandle, SurfaceHost},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DeferredTask {
    /// Close transition finished; drop the surface and announce the close.
    FinishClose {
        window_id: WindowId,
        app_id: AppId,
        surface: SurfaceHandle,
    },
}

pub struct WindowManager {
    pub(crate) config: WindowManagerConfig,
    /// Open windows in creation order.
    pub(crate) windows: Vec<WindowRecord>,
    next_z_index: u64,
    active: Option<WindowId>,
    pub(crate) interaction: InteractionState,
    layout: ResponsiveLayout,
    deferred: DeferredQueue<DeferredTask>,
    bus: EventBus,
    pub(crate) surfaces: Box<dyn SurfaceHost>,
}

impl std::fmt::Debug for WindowManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowManager")
            .field("windows", &self.windows)
            .field("next_z_index", &self.next_z_index)
            .field("active", &self.active)
            .field("interaction", &self.interaction)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl WindowManager {
    pub fn new(
        config: WindowManagerConfig,
        viewport: Viewport,
        bus: EventBus,
        surfaces: Box<dyn SurfaceHost>,
    ) -> Self {
        Self {
            config,
            windows: Vec::new(),
            next_z_index: 0,
            active: None,
            interaction: InteractionState::default(),
            layout: ResponsiveLayout::new(viewport, default_placement_source()),
            deferred: DeferredQueue::new(),
            bus,
            surfaces,
        }
    }

    /// Replaces the randomness used for automatic placement.
    pub fn with_placement_source(mut self, placement: Box<dyn PlacementSource>) -> Self {
        self.layout.set_placement_source(placement);
        self
    }

    pub fn config(&self) -> &WindowManagerConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.layout.viewport()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn get_window(&self, window_id: WindowId) -> Option<&WindowRecord> {
        self.windows.iter().find(|w| w.id == window_id)
    }

    /// Windows owned by `app_id`, in creation order.
    pub fn get_windows_by_app(&self, app_id: &AppId) -> Vec<&WindowRecord> {
        self.windows.iter().filter(|w| &w.app_id == app_id).collect()
    }

    pub fn get_active_window(&self) -> Option<&WindowRecord> {
        self.active.and_then(|id| self.get_window(id))
    }

    pub fn is_active(&self, window_id: WindowId) -> bool {
        self.active == Some(window_id)
    }

    /// All open windows in creation order.
    pub fn windows(&self) -> &[WindowRecord] {
        &self.windows
    }

    /// Open window ids from back to front.
    pub fn stacking_order(&self) -> Vec<WindowId> {
        let mut stack = self
            .windows
            .iter()
            .map(|w| (w.z_index, w.id))
            .collect::<Vec<_>>();
        stack.sort_unstable();
        stack.into_iter().map(|(_, id)| id).collect()
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Creates a window, attaches its surface, and focuses it.
    ///
    /// # Errors
    ///
    /// Returns [`OpenWindowError::Surface`] when the surface host cannot build the window. The
    /// registry is unchanged and no event is emitted.
    pub fn open_window(
        &mut self,
        app_id: impl Into<AppId>,
        title: impl Into<String>,
        content: impl Into<String>,
        options: WindowOptions,
    ) -> Result<WindowId, OpenWindowError> {
        let app_id = app_id.into();
        let title = title.into();
        let content = content.into();
        let rect = self.layout.initial_rect(&options, &self.config);
        let window_id = WindowId::next();

        let surface = match self.surfaces.attach(SurfaceFrame {
            window_id,
            app_id: &app_id,
            title: &title,
            content: &content,
            rect,
            flags: options.flags,
        }) {
            Ok(surface) => surface,
            Err(err) => {
                logging::warn!("open window for `{app_id}` failed: {err}");
                return Err(err.into());
            }
        };
        self.surfaces.apply_bounds(surface, rect);

        let first_for_app = !self.windows.iter().any(|w| w.app_id == app_id);
        self.windows.push(WindowRecord {
            id: window_id,
            app_id: app_id.clone(),
            title: title.clone(),
            content,
            rect,
            config: WindowConfig {
                rect,
                flags: options.flags,
            },
            z_index: 0,
            is_minimized: false,
            is_maximized: false,
            original_bounds: None,
            surface,
        });

        self.emit(WindowEvent::Opened {
            window_id,
            app_id: app_id.clone(),
            title,
        });
        if first_for_app {
            self.emit(WindowEvent::DockIndicator {
                app_id,
                active: true,
            });
        }
        self.focus_window(window_id);
        Ok(window_id)
    }

    /// Raises a window to the front and makes it the active window.
    ///
    /// A minimized window is restored first.
    pub fn focus_window(&mut self, window_id: WindowId) {
        let Some(window) = self.get_window(window_id) else {
            return;
        };
        if window.is_minimized {
            self.restore_window(window_id);
            return;
        }
        self.raise(window_id);
    }

    /// Removes a window from the registry and starts its close transition.
    ///
    /// `window:closed` (and, for an app's last window, the inactive dock indicator) follows once
    /// the transition delay has elapsed; see [`WindowManager::advance_time`].
    pub fn close_window(&mut self, window_id: WindowId) {
        let Some(index) = self.windows.iter().position(|w| w.id == window_id) else {
            return;
        };
        if !self.windows[index].config.flags.closable {
            return;
        }

        let window = self.windows.remove(index);
        if self.interaction.targets(window_id) {
            self.interaction.clear();
        }
        self.surfaces.begin_close(window.surface);
        self.deferred.schedule(
            self.config.close_transition_ms,
            DeferredTask::FinishClose {
                window_id,
                app_id: window.app_id,
                surface: window.surface,
            },
        );

        if self.active == Some(window_id) {
            self.active = None;
            self.focus_topmost_visible();
        }
    }

    pub fn minimize_window(&mut self, window_id: WindowId) {
        let Some(window) = self.windows.iter_mut().find(|w| w.id == window_id) else {
            return;
        };
        if window.is_minimized || !window.config.flags.minimizable {
            return;
        }
        window.is_minimized = true;
        let (surface, z_index) = (window.surface, window.z_index);

        if self.interaction.targets(window_id) {
            self.interaction.clear();
        }
        self.surfaces.set_minimized(surface, true);
        self.emit(WindowEvent::Minimized { window_id });

        if self.active == Some(window_id) {
            self.active = None;
            self.surfaces.set_stacking(surface, z_index, false);
            self.focus_topmost_visible();
        }
    }

    /// Un-minimizes (when minimized) and focuses a window.
    pub fn restore_window(&mut self, window_id: WindowId) {
        let Some(window) = self.windows.iter_mut().find(|w| w.id == window_id) else {
            return;
        };
        if window.is_minimized {
            window.is_minimized = false;
            let surface = window.surface;
            self.surfaces.set_minimized(surface, false);
            self.emit(WindowEvent::Restored { window_id });
        }
        self.raise(window_id);
    }

    /// Maximizes to the work area, or reapplies the bounds captured at maximize time.
    pub fn toggle_maximize_window(&mut self, window_id: WindowId) {
        let viewport = self.viewport();
        let work_area = geometry::work_area(viewport, &self.config);
        let chrome = self.config.chrome;
        let Some(window) = self.windows.iter_mut().find(|w| w.id == window_id) else {
            return;
        };
        if window.is_minimized || !window.config.flags.maximizable {
            return;
        }

        if window.is_maximized {
            let snapshot = window.original_bounds.take().unwrap_or(window.config.rect);
            let restored = geometry::clamp_position(snapshot, viewport, chrome);
            window.rect = restored;
            window.config.rect = restored;
            window.is_maximized = false;
        } else {
            window.original_bounds = Some(window.rect);
            window.rect = work_area;
            window.is_maximized = true;
        }
        let (surface, rect, is_maximized) = (window.surface, window.rect, window.is_maximized);

        if self.interaction.targets(window_id) {
            self.interaction.clear();
        }
        self.surfaces.set_maximized(surface, is_maximized);
        self.surfaces.apply_bounds(surface, rect);
        self.emit(WindowEvent::Maximized {
            window_id,
            is_maximized,
        });
        self.emit(WindowEvent::Resized {
            window_id,
            bounds: rect,
        });
        self.raise(window_id);
    }

    pub fn set_window_title(&mut self, window_id: WindowId, title: impl Into<String>) {
        let Some(window) = self.windows.iter_mut().find(|w| w.id == window_id) else {
            return;
        };
        window.title = title.into();
        self.surfaces.set_title(window.surface, &window.title);
    }

    /// Dock/switcher click: restore a minimized window, minimize the active one, focus otherwise.
    pub fn toggle_taskbar_window(&mut self, window_id: WindowId) {
        let Some(window) = self.get_window(window_id) else {
            return;
        };
        if window.is_minimized {
            self.restore_window(window_id);
        } else if self.is_active(window_id) {
            self.minimize_window(window_id);
        } else {
            self.focus_window(window_id);
        }
    }

    /// Brings the front-most window of `app_id` forward, restoring it when minimized.
    pub fn focus_app(&mut self, app_id: &AppId) -> Option<WindowId> {
        let window_id = self
            .windows
            .iter()
            .filter(|w| &w.app_id == app_id)
            .max_by_key(|w| w.z_index)
            .map(|w| w.id)?;
        self.focus_window(window_id);
        Some(window_id)
    }

    /// Rescales open windows for a new viewport size. Calling it again with the same size does
    /// nothing.
    pub fn handle_viewport_change(&mut self, viewport: Viewport) {
        let updates = self.layout.rescale(viewport, &self.windows, &self.config);
        for update in updates {
            let Some(window) = self.windows.iter_mut().find(|w| w.id == update.window_id) else {
                continue;
            };
            window.original_bounds = update.original_bounds;
            if window.rect == update.rect {
                continue;
            }
            window.rect = update.rect;
            if !window.is_maximized {
                window.config.rect = update.rect;
            }
            let surface = window.surface;
            self.surfaces.apply_bounds(surface, update.rect);
            self.emit(WindowEvent::Resized {
                window_id: update.window_id,
                bounds: update.rect,
            });
        }
    }

    /// Advances the deferred-task clock and runs everything that became due.
    pub fn advance_time(&mut self, elapsed: Duration) {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let mut due = VecDeque::from(self.deferred.advance(elapsed_ms));
        while let Some(task) = due.pop_front() {
            match task {
                DeferredTask::FinishClose {
                    window_id,
                    app_id,
                    surface,
                } => {
                    let closing_same_app = |task: &DeferredTask| match task {
                        DeferredTask::FinishClose { app_id: other, .. } => *other == app_id,
                    };
                    let last_for_app = !self.windows.iter().any(|w| w.app_id == app_id)
                        && !due.iter().any(closing_same_app)
                        && !self.deferred.pending().any(closing_same_app);

                    self.surfaces.detach(surface);
                    self.emit(WindowEvent::Closed {
                        window_id,
                        app_id: app_id.clone(),
                    });
                    if last_for_app {
                        self.emit(WindowEvent::DockIndicator {
                            app_id,
                            active: false,
                        });
                    }
                }
            }
        }
    }

    fn raise(&mut self, window_id: WindowId) {
        self.next_z_index += 1;
        let z_index = self.next_z_index;

        if let Some(previous) = self.active.filter(|id| *id != window_id) {
            if let Some(window) = self.windows.iter().find(|w| w.id == previous) {
                self.surfaces
                    .set_stacking(window.surface, window.z_index, false);
            }
        }

        let Some(window) = self.windows.iter_mut().find(|w| w.id == window_id) else {
            return;
        };
        window.z_index = z_index;
        let surface = window.surface;
        self.active = Some(window_id);
        self.surfaces.set_stacking(surface, z_index, true);
        self.emit(WindowEvent::Focused { window_id });
    }

    fn focus_topmost_visible(&mut self) {
        let next = self
            .windows
            .iter()
            .filter(|w| !w.is_minimized)
            .max_by_key(|w| w.z_index)
            .map(|w| w.id);
        if let Some(window_id) = next {
            self.raise(window_id);
        }
    }

    pub(crate) fn emit(&self, event: WindowEvent) {
        self.bus.emit(event.topic(), &event.payload());
    }
}
