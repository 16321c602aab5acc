//! Pointer-driven drag and resize handling.
//!
//! Surfaces translate raw UI events into [`WindowInput`] values and hand them to
//! [`WindowManager::dispatch`]. Move and release events come from document-level listeners, so a
//! gesture finishes normally even when the pointer is released outside the window.

use std::time::Duration;

use crate::{
    events::WindowEvent,
    geometry,
    manager::WindowManager,
    model::{DragSession, PointerPosition, ResizeEdge, ResizeSession, Viewport, WindowId},
};

#[derive(Debug, Clone, PartialEq)]
/// UI input accepted by [`WindowManager::dispatch`].
pub enum WindowInput {
    /// Pointer pressed anywhere inside a window, content included.
    PointerDownInWindow { window_id: WindowId },
    /// Pointer pressed on the title bar outside the control buttons.
    TitleBarPointerDown {
        window_id: WindowId,
        pointer: PointerPosition,
    },
    TitleBarDoubleClick { window_id: WindowId },
    /// Pointer pressed on one of the eight resize handles.
    ResizeHandlePointerDown {
        window_id: WindowId,
        edge: ResizeEdge,
        pointer: PointerPosition,
    },
    PointerMove { pointer: PointerPosition },
    PointerUp,
    MinimizeButton { window_id: WindowId },
    MaximizeButton { window_id: WindowId },
    CloseButton { window_id: WindowId },
    ViewportChanged { viewport: Viewport },
    Tick { elapsed_ms: u64 },
}

/// Whether a pointer press may start a drag or resize: the main mouse button, or the primary
/// touch/pen contact.
pub fn is_primary_press(pointer_type: &str, button: i16, is_primary: bool) -> bool {
    if pointer_type == "mouse" {
        button == 0
    } else {
        is_primary && button == 0
    }
}

impl WindowManager {
    pub fn dispatch(&mut self, input: WindowInput) {
        match input {
            WindowInput::PointerDownInWindow { window_id } => self.focus_window(window_id),
            WindowInput::TitleBarPointerDown { window_id, pointer } => {
                self.begin_move(window_id, pointer);
            }
            WindowInput::TitleBarDoubleClick { window_id }
            | WindowInput::MaximizeButton { window_id } => self.toggle_maximize_window(window_id),
            WindowInput::ResizeHandlePointerDown {
                window_id,
                edge,
                pointer,
            } => self.begin_resize(window_id, edge, pointer),
            WindowInput::PointerMove { pointer } => {
                if self.interaction.resizing.is_some() {
                    self.update_resize(pointer);
                } else {
                    self.update_move(pointer);
                }
            }
            WindowInput::PointerUp => self.end_pointer_interaction(),
            WindowInput::MinimizeButton { window_id } => self.minimize_window(window_id),
            WindowInput::CloseButton { window_id } => self.close_window(window_id),
            WindowInput::ViewportChanged { viewport } => self.handle_viewport_change(viewport),
            WindowInput::Tick { elapsed_ms } => {
                self.advance_time(Duration::from_millis(elapsed_ms));
            }
        }
    }

    /// Focuses the window and, unless it is maximized, starts a drag. Minimized windows are
    /// ignored.
    pub fn begin_move(&mut self, window_id: WindowId, pointer: PointerPosition) {
        if self.get_window(window_id).map_or(true, |w| w.is_minimized) {
            return;
        }
        self.focus_window(window_id);
        let Some(window) = self.get_window(window_id) else {
            return;
        };
        if !window.is_interactive() {
            return;
        }
        let grab_offset = PointerPosition::new(pointer.x - window.rect.x, pointer.y - window.rect.y);
        self.interaction.resizing = None;
        self.interaction.dragging = Some(DragSession {
            window_id,
            grab_offset,
        });
    }

    pub fn update_move(&mut self, pointer: PointerPosition) {
        let Some(session) = self.interaction.dragging.clone() else {
            return;
        };
        let viewport = self.viewport();
        let chrome = self.config.chrome;
        let Some(window) = self
            .windows
            .iter_mut()
            .find(|w| w.id == session.window_id)
        else {
            self.interaction.dragging = None;
            return;
        };
        if !window.is_interactive() {
            self.interaction.dragging = None;
            return;
        }

        let next = geometry::drag_to(window.rect, pointer, session.grab_offset, viewport, chrome);
        if next != window.rect {
            window.rect = next;
            let surface = window.surface;
            self.surfaces.apply_bounds(surface, next);
        }
    }

    /// Ends the drag and commits the live position to the window configuration.
    pub fn end_move(&mut self) {
        let Some(session) = self.interaction.dragging.take() else {
            return;
        };
        if let Some(window) = self.windows.iter_mut().find(|w| w.id == session.window_id) {
            window.config.rect = window.rect;
        }
    }

    /// Focuses the window and, when it is resizable and not maximized, starts a resize from
    /// `edge`. Minimized windows are ignored.
    pub fn begin_resize(&mut self, window_id: WindowId, edge: ResizeEdge, pointer: PointerPosition) {
        if self.get_window(window_id).map_or(true, |w| w.is_minimized) {
            return;
        }
        self.focus_window(window_id);
        let Some(window) = self.get_window(window_id) else {
            return;
        };
        if !window.is_interactive() || !window.config.flags.resizable {
            return;
        }
        let rect_start = window.rect;
        self.interaction.dragging = None;
        self.interaction.resizing = Some(ResizeSession {
            window_id,
            edge,
            pointer_start: pointer,
            rect_start,
        });
    }

    /// Applies the pointer delta to the resize start bounds and emits `window:resize`.
    pub fn update_resize(&mut self, pointer: PointerPosition) {
        let Some(session) = self.interaction.resizing.clone() else {
            return;
        };
        let dx = pointer.x - session.pointer_start.x;
        let dy = pointer.y - session.pointer_start.y;
        let next = geometry::resize_within_viewport(
            session.rect_start,
            session.edge,
            dx,
            dy,
            self.viewport(),
            &self.config,
        );
        let Some(window) = self
            .windows
            .iter_mut()
            .find(|w| w.id == session.window_id)
        else {
            self.interaction.resizing = None;
            return;
        };
        if !window.is_interactive() {
            self.interaction.resizing = None;
            return;
        }

        window.rect = next;
        let surface = window.surface;
        self.surfaces.apply_bounds(surface, next);
        self.emit(WindowEvent::Resized {
            window_id: session.window_id,
            bounds: next,
        });
    }

    /// Ends the resize and commits the final bounds to the window configuration.
    pub fn end_resize(&mut self) {
        let Some(session) = self.interaction.resizing.take() else {
            return;
        };
        if let Some(window) = self.windows.iter_mut().find(|w| w.id == session.window_id) {
            window.config.rect = window.rect;
        }
    }

    /// Pointer release: finishes whichever gesture is in flight.
    pub fn end_pointer_interaction(&mut self) {
        self.end_move();
        self.end_resize();
    }
}
