//! Rendering-adapter boundary between the registry and whatever draws windows.
//!
//! The registry never reads geometry back from a surface; it pushes computed state through
//! [`SurfaceHost`] and keeps only the opaque [`SurfaceHandle`].

use std::{cell::RefCell, rc::Rc};

use crate::{
    error::SurfaceError,
    model::{AppId, WindowFlags, WindowId, WindowRect},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Opaque reference to a rendered window root, issued by a [`SurfaceHost`].
pub struct SurfaceHandle(pub u64);

#[derive(Debug, Clone, Copy)]
/// Everything a host needs to build the visual root of a new window.
pub struct SurfaceFrame<'a> {
    pub window_id: WindowId,
    pub app_id: &'a AppId,
    pub title: &'a str,
    pub content: &'a str,
    pub rect: WindowRect,
    pub flags: WindowFlags,
}

/// Adapter that renders window state. Implementations must not call back into the manager
/// synchronously from these methods.
pub trait SurfaceHost {
    /// Builds the visual root for a window.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] when the rendering environment cannot host the window.
    fn attach(&mut self, frame: SurfaceFrame<'_>) -> Result<SurfaceHandle, SurfaceError>;

    fn apply_bounds(&mut self, surface: SurfaceHandle, rect: WindowRect);

    fn set_stacking(&mut self, surface: SurfaceHandle, z_index: u64, active: bool);

    fn set_title(&mut self, surface: SurfaceHandle, title: &str);

    fn set_minimized(&mut self, surface: SurfaceHandle, minimized: bool);

    fn set_maximized(&mut self, surface: SurfaceHandle, maximized: bool);

    /// Starts the close transition. The surface stays in place until [`SurfaceHost::detach`].
    fn begin_close(&mut self, surface: SurfaceHandle);

    fn detach(&mut self, surface: SurfaceHandle);
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One call observed by [`HeadlessSurfaceHost`].
pub enum SurfaceCall {
    Attach(SurfaceHandle, WindowId),
    Bounds(SurfaceHandle, WindowRect),
    Stacking(SurfaceHandle, u64, bool),
    Title(SurfaceHandle, String),
    Minimized(SurfaceHandle, bool),
    Maximized(SurfaceHandle, bool),
    BeginClose(SurfaceHandle),
    Detach(SurfaceHandle),
}

#[derive(Debug, Default)]
struct HeadlessState {
    next_handle: u64,
    unavailable: Option<String>,
    attached: Vec<SurfaceHandle>,
    calls: Vec<SurfaceCall>,
}

#[derive(Debug, Clone, Default)]
/// Surface host without a rendering environment.
///
/// Clones share state, so a caller can keep a handle for inspection after boxing one into the
/// manager.
pub struct HeadlessSurfaceHost {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessSurfaceHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent [`SurfaceHost::attach`] calls fail with `reason`; `None` restores them.
    pub fn set_unavailable(&self, reason: Option<&str>) {
        self.state.borrow_mut().unavailable = reason.map(str::to_string);
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.state.borrow().calls.clone()
    }

    /// Surfaces currently attached and not yet detached.
    pub fn attached(&self) -> Vec<SurfaceHandle> {
        self.state.borrow().attached.clone()
    }

    fn record(&self, call: SurfaceCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl SurfaceHost for HeadlessSurfaceHost {
    fn attach(&mut self, frame: SurfaceFrame<'_>) -> Result<SurfaceHandle, SurfaceError> {
        let mut state = self.state.borrow_mut();
        if let Some(reason) = state.unavailable.clone() {
            return Err(SurfaceError::Unavailable(reason));
        }
        state.next_handle += 1;
        let handle = SurfaceHandle(state.next_handle);
        state.attached.push(handle);
        state.calls.push(SurfaceCall::Attach(handle, frame.window_id));
        Ok(handle)
    }

    fn apply_bounds(&mut self, surface: SurfaceHandle, rect: WindowRect) {
        self.record(SurfaceCall::Bounds(surface, rect));
    }

    fn set_stacking(&mut self, surface: SurfaceHandle, z_index: u64, active: bool) {
        self.record(SurfaceCall::Stacking(surface, z_index, active));
    }

    fn set_title(&mut self, surface: SurfaceHandle, title: &str) {
        self.record(SurfaceCall::Title(surface, title.to_string()));
    }

    fn set_minimized(&mut self, surface: SurfaceHandle, minimized: bool) {
        self.record(SurfaceCall::Minimized(surface, minimized));
    }

    fn set_maximized(&mut self, surface: SurfaceHandle, maximized: bool) {
        self.record(SurfaceCall::Maximized(surface, maximized));
    }

    fn begin_close(&mut self, surface: SurfaceHandle) {
        self.record(SurfaceCall::BeginClose(surface));
    }

    fn detach(&mut self, surface: SurfaceHandle) {
        let mut state = self.state.borrow_mut();
        state.attached.retain(|handle| *handle != surface);
        state.calls.push(SurfaceCall::Detach(surface));
    }
}
