//! Browser surface host: windows rendered as Leptos components inside the desktop container.
//!
//! The host keeps one set of signals per window and the manager drives them through
//! [`SurfaceHost`]. Components never touch window state; they turn pointer and button events into
//! [`WindowInput`] values and pass them to the input callback, which routes them to the manager.

use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
    time::Duration,
};

use desktop_event_bus::EventBus;
use leptos::*;
use wasm_bindgen::JsCast;

use crate::{
    config::WindowManagerConfig,
    error::SurfaceError,
    interaction::{is_primary_press, WindowInput},
    manager::WindowManager,
    model::{PointerPosition, ResizeEdge, Viewport, WindowFlags, WindowId, WindowRect},
    surface::{SurfaceFrame, SurfaceHandle, SurfaceHost},
};

const TICK_INTERVAL_MS: u64 = 50;

#[derive(Clone)]
struct WindowFrame {
    handle: SurfaceHandle,
    window_id: WindowId,
    app_id: String,
    content: String,
    flags: WindowFlags,
    title: RwSignal<String>,
    rect: RwSignal<WindowRect>,
    z_index: RwSignal<u64>,
    focused: RwSignal<bool>,
    minimized: RwSignal<bool>,
    maximized: RwSignal<bool>,
    closing: RwSignal<bool>,
}

impl WindowFrame {
    fn dispose(self) {
        self.title.dispose();
        self.rect.dispose();
        self.z_index.dispose();
        self.focused.dispose();
        self.minimized.dispose();
        self.maximized.dispose();
        self.closing.dispose();
    }
}

pub struct DomSurfaceHost {
    container_id: String,
    frames: RwSignal<Vec<WindowFrame>>,
    next_handle: u64,
}

impl DomSurfaceHost {
    fn new(container_id: impl Into<String>, frames: RwSignal<Vec<WindowFrame>>) -> Self {
        Self {
            container_id: container_id.into(),
            frames,
            next_handle: 0,
        }
    }

    fn frame(&self, surface: SurfaceHandle) -> Option<WindowFrame> {
        self.frames.with_untracked(|frames| {
            frames
                .iter()
                .find(|frame| frame.handle == surface)
                .cloned()
        })
    }
}

impl SurfaceHost for DomSurfaceHost {
    fn attach(&mut self, frame: SurfaceFrame<'_>) -> Result<SurfaceHandle, SurfaceError> {
        if document().get_element_by_id(&self.container_id).is_none() {
            return Err(SurfaceError::MissingContainer(self.container_id.clone()));
        }
        self.next_handle += 1;
        let handle = SurfaceHandle(self.next_handle);
        let window = WindowFrame {
            handle,
            window_id: frame.window_id,
            app_id: frame.app_id.to_string(),
            content: frame.content.to_string(),
            flags: frame.flags,
            title: create_rw_signal(frame.title.to_string()),
            rect: create_rw_signal(frame.rect),
            z_index: create_rw_signal(0),
            focused: create_rw_signal(false),
            minimized: create_rw_signal(false),
            maximized: create_rw_signal(false),
            closing: create_rw_signal(false),
        };
        self.frames.update(|frames| frames.push(window));
        Ok(handle)
    }

    fn apply_bounds(&mut self, surface: SurfaceHandle, rect: WindowRect) {
        if let Some(frame) = self.frame(surface) {
            frame.rect.set(rect);
        }
    }

    fn set_stacking(&mut self, surface: SurfaceHandle, z_index: u64, active: bool) {
        if let Some(frame) = self.frame(surface) {
            frame.z_index.set(z_index);
            frame.focused.set(active);
        }
    }

    fn set_title(&mut self, surface: SurfaceHandle, title: &str) {
        if let Some(frame) = self.frame(surface) {
            frame.title.set(title.to_string());
        }
    }

    fn set_minimized(&mut self, surface: SurfaceHandle, minimized: bool) {
        if let Some(frame) = self.frame(surface) {
            frame.minimized.set(minimized);
        }
    }

    fn set_maximized(&mut self, surface: SurfaceHandle, maximized: bool) {
        if let Some(frame) = self.frame(surface) {
            frame.maximized.set(maximized);
        }
    }

    fn begin_close(&mut self, surface: SurfaceHandle) {
        if let Some(frame) = self.frame(surface) {
            frame.closing.set(true);
        }
    }

    fn detach(&mut self, surface: SurfaceHandle) {
        let Some(frame) = self.frame(surface) else {
            return;
        };
        self.frames
            .update(|frames| frames.retain(|frame| frame.handle != surface));
        frame.dispose();
    }
}

/// Builds a window manager rendering into the element with id `container_id` and mounts the
/// window layer, which also listens for pointer moves, releases, viewport changes, and clock
/// ticks for the lifetime of the page.
///
/// # Errors
///
/// Returns [`SurfaceError::MissingContainer`] when the container element does not exist and
/// [`SurfaceError::Unavailable`] when it is not an HTML element.
pub fn mount_desktop(
    container_id: &str,
    config: WindowManagerConfig,
    bus: EventBus,
) -> Result<Rc<RefCell<WindowManager>>, SurfaceError> {
    let container = document()
        .get_element_by_id(container_id)
        .ok_or_else(|| SurfaceError::MissingContainer(container_id.to_string()))?
        .dyn_into::<web_sys::HtmlElement>()
        .map_err(|_| {
            SurfaceError::Unavailable(format!("`{container_id}` is not an HTML element"))
        })?;

    let frames = create_rw_signal(Vec::<WindowFrame>::new());
    let surfaces = DomSurfaceHost::new(container_id, frames);
    let manager = Rc::new(RefCell::new(WindowManager::new(
        config,
        current_viewport(),
        bus,
        Box::new(surfaces),
    )));
    let sink = manager_sink(Rc::downgrade(&manager));
    mount_to(container, move || view! { <DesktopWindowLayer frames=frames sink=sink /> });
    Ok(manager)
}

/// Current `innerWidth` x `innerHeight` of the browser window.
pub fn current_viewport() -> Viewport {
    let window = window();
    let read = |value: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        value.ok().and_then(|value| value.as_f64()).unwrap_or(0.0) as i32
    };
    Viewport::new(read(window.inner_width()), read(window.inner_height()))
}

fn manager_sink(manager: Weak<RefCell<WindowManager>>) -> Callback<WindowInput> {
    Callback::new(move |input: WindowInput| {
        let Some(shared) = manager.upgrade() else {
            return;
        };
        let Ok(mut manager) = shared.try_borrow_mut() else {
            logging::warn!("window manager busy; dropped {input:?}");
            return;
        };
        manager.dispatch(input);
    })
}

#[component]
fn DesktopWindowLayer(
    frames: RwSignal<Vec<WindowFrame>>,
    sink: Callback<WindowInput>,
) -> impl IntoView {
    let move_listener = window_event_listener(ev::pointermove, move |ev| {
        sink.call(WindowInput::PointerMove {
            pointer: pointer_from_pointer_event(&ev),
        });
    });
    let up_listener = window_event_listener(ev::pointerup, move |_| {
        sink.call(WindowInput::PointerUp);
    });
    let cancel_listener = window_event_listener(ev::pointercancel, move |_| {
        sink.call(WindowInput::PointerUp);
    });
    let resize_listener = window_event_listener(ev::resize, move |_| {
        sink.call(WindowInput::ViewportChanged {
            viewport: current_viewport(),
        });
    });
    on_cleanup(move || {
        move_listener.remove();
        up_listener.remove();
        cancel_listener.remove();
        resize_listener.remove();
    });

    let last_tick = Cell::new(js_sys::Date::now());
    match set_interval_with_handle(
        move || {
            let now = js_sys::Date::now();
            let elapsed_ms = (now - last_tick.replace(now)).max(0.0) as u64;
            sink.call(WindowInput::Tick { elapsed_ms });
        },
        Duration::from_millis(TICK_INTERVAL_MS),
    ) {
        Ok(interval) => on_cleanup(move || interval.clear()),
        Err(err) => {
            logging::warn!("window manager clock failed to start: {err:?}");
        }
    }

    view! {
        <For each=move || frames.get() key=|frame| frame.handle let:frame>
            <DesktopWindow frame=frame sink=sink />
        </For>
    }
}

#[component]
fn DesktopWindow(frame: WindowFrame, sink: Callback<WindowInput>) -> impl IntoView {
    let WindowFrame {
        window_id,
        app_id,
        content,
        flags,
        title,
        rect,
        z_index,
        focused,
        minimized,
        maximized,
        closing,
        ..
    } = frame;

    let style = move || {
        let rect = rect.get();
        format!(
            "left:{}px;top:{}px;width:{}px;height:{}px;z-index:{};",
            rect.x,
            rect.y,
            rect.w,
            rect.h,
            z_index.get()
        )
    };
    let focus = move |_: web_sys::PointerEvent| {
        sink.call(WindowInput::PointerDownInWindow { window_id });
    };
    let begin_move = move |ev: web_sys::PointerEvent| {
        if !is_primary_press(&ev.pointer_type(), ev.button(), ev.is_primary()) {
            return;
        }
        try_set_pointer_capture(&ev);
        ev.prevent_default();
        ev.stop_propagation();
        sink.call(WindowInput::TitleBarPointerDown {
            window_id,
            pointer: pointer_from_pointer_event(&ev),
        });
    };
    let titlebar_double_click = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        ev.stop_propagation();
        sink.call(WindowInput::TitleBarDoubleClick { window_id });
    };

    view! {
        <section
            class="desktop-window"
            class:focused=move || focused.get()
            class:minimized=move || minimized.get()
            class:maximized=move || maximized.get()
            class:closing=move || closing.get()
            style=style
            data-window-id=window_id.0.to_string()
            data-app-id=app_id
            role="dialog"
            aria-label=move || title.get()
            on:pointerdown=focus
        >
            <header
                class="titlebar"
                on:pointerdown=begin_move
                on:dblclick=titlebar_double_click
            >
                <div class="titlebar-title">
                    <span>{move || title.get()}</span>
                </div>
                <div class="titlebar-controls">
                    {flags
                        .minimizable
                        .then(|| {
                            view! {
                                <WindowControlButton
                                    class_name="minimize"
                                    label="Minimize window"
                                    input=WindowInput::MinimizeButton { window_id }
                                    sink=sink
                                />
                            }
                        })}
                    {flags
                        .maximizable
                        .then(|| {
                            view! {
                                <WindowControlButton
                                    class_name="maximize"
                                    label="Maximize window"
                                    input=WindowInput::MaximizeButton { window_id }
                                    sink=sink
                                />
                            }
                        })}
                    {flags
                        .closable
                        .then(|| {
                            view! {
                                <WindowControlButton
                                    class_name="close"
                                    label="Close window"
                                    input=WindowInput::CloseButton { window_id }
                                    sink=sink
                                />
                            }
                        })}
                </div>
            </header>
            <div class="window-body" inner_html=content></div>
            <Show when=move || flags.resizable && !maximized.get() fallback=|| ()>
                {ResizeEdge::ALL
                    .into_iter()
                    .map(|edge| {
                        view! { <WindowResizeHandle window_id=window_id edge=edge sink=sink /> }
                    })
                    .collect_view()}
            </Show>
        </section>
    }
}

#[component]
fn WindowControlButton(
    class_name: &'static str,
    label: &'static str,
    input: WindowInput,
    sink: Callback<WindowInput>,
) -> impl IntoView {
    view! {
        <button
            type="button"
            class=format!("window-control {class_name}")
            aria-label=label
            on:pointerdown=move |ev: web_sys::PointerEvent| {
                ev.prevent_default();
                ev.stop_propagation();
            }
            on:dblclick=move |ev: web_sys::MouseEvent| ev.stop_propagation()
            on:click=move |ev: web_sys::MouseEvent| {
                ev.stop_propagation();
                sink.call(input.clone());
            }
        ></button>
    }
}

#[component]
fn WindowResizeHandle(
    window_id: WindowId,
    edge: ResizeEdge,
    sink: Callback<WindowInput>,
) -> impl IntoView {
    let class_name = format!("window-resize-handle {}", edge.css_class());
    let on_pointerdown = move |ev: web_sys::PointerEvent| {
        if !is_primary_press(&ev.pointer_type(), ev.button(), ev.is_primary()) {
            return;
        }
        try_set_pointer_capture(&ev);
        ev.prevent_default();
        ev.stop_propagation();
        sink.call(WindowInput::ResizeHandlePointerDown {
            window_id,
            edge,
            pointer: pointer_from_pointer_event(&ev),
        });
    };

    view! { <div class=class_name on:pointerdown=on_pointerdown></div> }
}

fn try_set_pointer_capture(ev: &web_sys::PointerEvent) {
    if let Some(target) = ev.current_target() {
        if let Ok(element) = target.dyn_into::<web_sys::Element>() {
            let _ = element.set_pointer_capture(ev.pointer_id());
        }
    }
}

fn pointer_from_pointer_event(ev: &web_sys::PointerEvent) -> PointerPosition {
    PointerPosition::new(ev.client_x(), ev.client_y())
}
