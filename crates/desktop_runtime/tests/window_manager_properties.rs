use std::{cell::RefCell, rc::Rc, time::Duration};

use desktop_window_manager::{
    events, EventBus, HeadlessSurfaceHost, ListenerError, PlacementSource, PointerPosition,
    ResizeEdge, Viewport, WindowId, WindowInput, WindowManager, WindowManagerConfig,
    WindowOptions, WindowRect,
};
use pretty_assertions::assert_eq;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::{json, Value};

struct Constant(f64);

impl PlacementSource for Constant {
    fn sample(&mut self) -> f64 {
        self.0
    }
}

type Recorded = Rc<RefCell<Vec<(String, Value)>>>;

const TOPICS: [&str; 8] = [
    events::WINDOW_OPENED,
    events::WINDOW_CLOSED,
    events::WINDOW_FOCUSED,
    events::WINDOW_MINIMIZED,
    events::WINDOW_RESTORED,
    events::WINDOW_MAXIMIZED,
    events::WINDOW_RESIZE,
    events::DOCK_UPDATE_INDICATOR,
];

fn desktop(viewport: Viewport, sample: f64) -> (WindowManager, Recorded) {
    let bus = EventBus::new();
    let recorded: Recorded = Rc::new(RefCell::new(Vec::new()));
    for topic in TOPICS {
        let recorded = recorded.clone();
        bus.on(topic, move |payload: &Value| {
            recorded
                .borrow_mut()
                .push((topic.to_string(), payload.clone()));
            Ok(())
        });
    }
    let manager = WindowManager::new(
        WindowManagerConfig::default(),
        viewport,
        bus,
        Box::new(HeadlessSurfaceHost::new()),
    )
    .with_placement_source(Box::new(Constant(sample)));
    (manager, recorded)
}

fn count(recorded: &Recorded, topic: &str, payload: &Value) -> usize {
    recorded
        .borrow()
        .iter()
        .filter(|(t, p)| t == topic && p == payload)
        .count()
}

fn topics(recorded: &Recorded) -> Vec<String> {
    recorded.borrow().iter().map(|(t, _)| t.clone()).collect()
}

fn assert_within_bounds(rect: WindowRect, viewport: Viewport, config: &WindowManagerConfig) {
    assert!(rect.w >= config.min_window_width, "{rect:?} narrower than minimum");
    assert!(rect.h >= config.min_window_height, "{rect:?} shorter than minimum");
    assert!(rect.x >= 0 && rect.x <= viewport.width - rect.w, "{rect:?} x out of range");
    assert!(
        rect.y >= config.chrome.top
            && rect.y <= viewport.height - rect.h - config.chrome.bottom,
        "{rect:?} y out of range"
    );
}

#[test]
fn most_recently_focused_window_is_strictly_on_top_and_sole_active() {
    let (mut manager, _) = desktop(Viewport::new(1440, 900), 0.3);
    let ids = ["finder", "notes", "mail", "music", "terminal"]
        .into_iter()
        .map(|app| {
            manager
                .open_window(app, app, "", WindowOptions::default())
                .expect("open window")
        })
        .collect::<Vec<_>>();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..200 {
        let target = ids[rng.random_range(0..ids.len())];
        manager.focus_window(target);

        let focused_z = manager.get_window(target).expect("focused window").z_index;
        for window in manager.windows().iter().filter(|w| w.id != target) {
            assert!(focused_z > window.z_index);
        }
        let active = ids.iter().filter(|id| manager.is_active(**id)).count();
        assert_eq!(active, 1);
        assert_eq!(manager.get_active_window().map(|w| w.id), Some(target));
        assert_eq!(manager.stacking_order().last(), Some(&target));
    }
}

#[test]
fn drags_and_resizes_never_leave_the_usable_area() {
    let viewport = Viewport::new(1200, 800);
    let (mut manager, _) = desktop(viewport, 0.5);
    let config = manager.config().clone();
    let ids = (0..3)
        .map(|n| {
            manager
                .open_window(format!("app-{n}"), "Window", "", WindowOptions::default())
                .expect("open window")
        })
        .collect::<Vec<_>>();
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..300 {
        let target = ids[rng.random_range(0..ids.len())];
        let rect = manager.get_window(target).expect("window").rect;
        let pointer = PointerPosition::new(
            rng.random_range(-1500..2700),
            rng.random_range(-1500..2300),
        );
        if rng.random_bool(0.5) {
            manager.dispatch(WindowInput::TitleBarPointerDown {
                window_id: target,
                pointer: PointerPosition::new(rect.x + 40, rect.y + 10),
            });
        } else {
            let edge = ResizeEdge::ALL[rng.random_range(0..ResizeEdge::ALL.len())];
            manager.dispatch(WindowInput::ResizeHandlePointerDown {
                window_id: target,
                edge,
                pointer: PointerPosition::new(rect.x, rect.y),
            });
        }
        manager.dispatch(WindowInput::PointerMove { pointer });
        manager.dispatch(WindowInput::PointerUp);

        let window = manager.get_window(target).expect("window");
        assert_within_bounds(window.rect, viewport, &config);
        assert_eq!(window.rect, window.config.rect);
    }
}

#[test]
fn default_window_size_and_placement_for_1200_by_800() {
    for sample in [0.0, 0.25, 0.5, 0.999] {
        let (mut manager, _) = desktop(Viewport::new(1200, 800), sample);
        let id = manager
            .open_window("finder", "Finder", "", WindowOptions::default())
            .expect("open window");
        let rect = manager.get_window(id).expect("window").rect;

        assert_eq!((rect.w, rect.h), (800, 560));
        assert!((0..=400).contains(&rect.x), "x = {}", rect.x);
        assert!((32..=188).contains(&rect.y), "y = {}", rect.y);
    }
}

#[test]
fn viewport_shrink_rescales_proportionally_and_is_idempotent() {
    let (mut manager, recorded) = desktop(Viewport::new(1600, 1000), 0.5);
    let id = manager
        .open_window("notes", "Notes", "", WindowOptions::sized(800, 600).at(100, 100))
        .expect("open window");
    assert_eq!(
        manager.get_window(id).expect("window").rect,
        WindowRect::new(100, 100, 800, 600)
    );

    manager.handle_viewport_change(Viewport::new(800, 500));
    let rescaled = manager.get_window(id).expect("window").rect;
    assert_eq!(rescaled, WindowRect::new(50, 50, 400, 300));
    assert_eq!(
        count(
            &recorded,
            events::WINDOW_RESIZE,
            &json!({
                "windowId": id.0,
                "bounds": { "left": 50, "top": 50, "width": 400, "height": 300 },
                "width": 400,
                "height": 300,
            })
        ),
        1
    );

    let before = recorded.borrow().len();
    manager.handle_viewport_change(Viewport::new(800, 500));
    assert_eq!(manager.get_window(id).expect("window").rect, rescaled);
    assert_eq!(recorded.borrow().len(), before);
}

#[test]
fn northwest_resize_grows_toward_the_pointer() {
    let (mut manager, recorded) = desktop(Viewport::new(1200, 800), 0.5);
    let id = manager
        .open_window("photos", "Photos", "", WindowOptions::sized(400, 300).at(200, 150))
        .expect("open window");

    manager.dispatch(WindowInput::ResizeHandlePointerDown {
        window_id: id,
        edge: ResizeEdge::NorthWest,
        pointer: PointerPosition::new(200, 150),
    });
    manager.dispatch(WindowInput::PointerMove {
        pointer: PointerPosition::new(150, 120),
    });
    manager.dispatch(WindowInput::PointerUp);

    let window = manager.get_window(id).expect("window");
    assert_eq!(window.rect, WindowRect::new(150, 120, 450, 330));
    assert_eq!(window.config.rect, window.rect);
    assert_eq!(
        recorded
            .borrow()
            .iter()
            .filter(|(topic, _)| topic == events::WINDOW_RESIZE)
            .map(|(_, payload)| payload["width"].clone())
            .collect::<Vec<_>>(),
        vec![json!(450)]
    );
}

#[test]
fn maximize_then_restore_returns_exact_snapshot() {
    let (mut manager, recorded) = desktop(Viewport::new(1280, 800), 0.5);
    let id = manager
        .open_window("browser", "Browser", "", WindowOptions::sized(640, 480).at(123, 77))
        .expect("open window");
    let snapshot = manager.get_window(id).expect("window").rect;

    manager.toggle_maximize_window(id);
    let maximized = manager.get_window(id).expect("window");
    assert!(maximized.is_maximized);
    assert_eq!(maximized.rect, WindowRect::new(0, 32, 1280, 716));
    assert_eq!(maximized.original_bounds, Some(snapshot));

    manager.toggle_maximize_window(id);
    let restored = manager.get_window(id).expect("window");
    assert!(!restored.is_maximized);
    assert_eq!(restored.rect, snapshot);
    assert_eq!(restored.original_bounds, None);
    assert_eq!(
        count(
            &recorded,
            events::WINDOW_MAXIMIZED,
            &json!({ "windowId": id.0, "isMaximized": false })
        ),
        1
    );
}

#[test]
fn unmaximize_after_viewport_shrink_lands_inside_the_new_viewport() {
    let (mut manager, _) = desktop(Viewport::new(1600, 1000), 0.5);
    let config = manager.config().clone();
    let id = manager
        .open_window("browser", "Browser", "", WindowOptions::sized(800, 600).at(700, 300))
        .expect("open window");

    manager.toggle_maximize_window(id);
    manager.handle_viewport_change(Viewport::new(600, 400));
    let maximized = manager.get_window(id).expect("window");
    assert_eq!(maximized.rect, WindowRect::new(0, 32, 600, 316));
    assert_eq!(
        maximized.original_bounds,
        Some(WindowRect::new(263, 60, 300, 240))
    );

    manager.toggle_maximize_window(id);
    let restored = manager.get_window(id).expect("window");
    assert_eq!(restored.rect, WindowRect::new(263, 60, 300, 240));
    assert_within_bounds(restored.rect, Viewport::new(600, 400), &config);
}

#[test]
fn minimize_and_restore_publish_lifecycle_events_in_order() {
    let (mut manager, recorded) = desktop(Viewport::new(1200, 800), 0.5);
    let back = manager
        .open_window("finder", "Finder", "", WindowOptions::default())
        .expect("open window");
    let front = manager
        .open_window("notes", "Notes", "", WindowOptions::default())
        .expect("open window");
    let event = |topic: &str, id: WindowId| (topic.to_string(), json!({ "windowId": id.0 }));

    recorded.borrow_mut().clear();
    manager.minimize_window(front);
    assert_eq!(
        *recorded.borrow(),
        vec![
            event(events::WINDOW_MINIMIZED, front),
            event(events::WINDOW_FOCUSED, back),
        ]
    );

    recorded.borrow_mut().clear();
    manager.focus_window(front);
    assert_eq!(
        *recorded.borrow(),
        vec![
            event(events::WINDOW_RESTORED, front),
            event(events::WINDOW_FOCUSED, front),
        ]
    );

    recorded.borrow_mut().clear();
    manager.minimize_window(back);
    manager.restore_window(back);
    assert_eq!(
        *recorded.borrow(),
        vec![
            event(events::WINDOW_MINIMIZED, back),
            event(events::WINDOW_RESTORED, back),
            event(events::WINDOW_FOCUSED, back),
        ]
    );
    assert!(manager.is_active(back));
}

#[test]
fn focusing_the_active_window_again_still_announces_focus() {
    let (mut manager, recorded) = desktop(Viewport::new(1200, 800), 0.5);
    let id = manager
        .open_window("mail", "Mail", "", WindowOptions::default())
        .expect("open window");
    assert_eq!(
        topics(&recorded),
        vec![
            events::WINDOW_OPENED.to_string(),
            events::DOCK_UPDATE_INDICATOR.to_string(),
            events::WINDOW_FOCUSED.to_string(),
        ]
    );

    manager.focus_window(id);

    assert_eq!(
        count(&recorded, events::WINDOW_FOCUSED, &json!({ "windowId": id.0 })),
        2
    );
}

#[test]
fn closing_last_windows_of_an_app_clears_its_dock_indicator_once() {
    let (mut manager, recorded) = desktop(Viewport::new(1200, 800), 0.5);
    let open = |manager: &mut WindowManager, app: &str| {
        manager
            .open_window(app, app, "", WindowOptions::default())
            .expect("open window")
    };
    let first = open(&mut manager, "notes");
    let second = open(&mut manager, "notes");
    let mail = open(&mut manager, "mail");
    let notes_active = json!({ "appId": "notes", "active": true });
    let notes_inactive = json!({ "appId": "notes", "active": false });
    assert_eq!(count(&recorded, events::DOCK_UPDATE_INDICATOR, &notes_active), 1);

    manager.close_window(first);
    manager.close_window(second);
    assert!(manager.get_window(first).is_none());
    assert!(manager.get_windows_by_app(&"notes".into()).is_empty());
    assert_eq!(manager.get_active_window().map(|w| w.id), Some(mail));

    manager.advance_time(Duration::from_millis(199));
    assert!(!topics(&recorded).contains(&events::WINDOW_CLOSED.to_string()));

    manager.advance_time(Duration::from_millis(1));
    for id in [first, second] {
        assert_eq!(
            count(
                &recorded,
                events::WINDOW_CLOSED,
                &json!({ "windowId": id.0, "appId": "notes" })
            ),
            1
        );
    }
    assert_eq!(count(&recorded, events::DOCK_UPDATE_INDICATOR, &notes_inactive), 1);

    manager.advance_time(Duration::from_secs(5));
    assert_eq!(count(&recorded, events::DOCK_UPDATE_INDICATOR, &notes_inactive), 1);
}

#[test]
fn closing_one_of_several_windows_keeps_the_indicator_lit() {
    let (mut manager, recorded) = desktop(Viewport::new(1200, 800), 0.5);
    let first = manager
        .open_window("notes", "Notes", "", WindowOptions::default())
        .expect("open window");
    let second = manager
        .open_window("notes", "Notes 2", "", WindowOptions::default())
        .expect("open window");

    manager.close_window(first);
    manager.advance_time(Duration::from_millis(200));

    assert_eq!(
        count(
            &recorded,
            events::DOCK_UPDATE_INDICATOR,
            &json!({ "appId": "notes", "active": false })
        ),
        0
    );
    assert_eq!(
        manager
            .get_windows_by_app(&"notes".into())
            .iter()
            .map(|w| w.id)
            .collect::<Vec<WindowId>>(),
        vec![second]
    );
}

#[test]
fn failing_listener_does_not_block_other_subscribers() {
    let bus = EventBus::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    bus.on(events::WINDOW_OPENED, |_: &Value| {
        Err(ListenerError::new("dock not ready"))
    });
    bus.on(events::WINDOW_OPENED, |_: &Value| panic!("listener crashed"));
    {
        let seen = seen.clone();
        bus.on(events::WINDOW_OPENED, move |payload: &Value| {
            seen.borrow_mut().push(payload["appId"].clone());
            Ok(())
        });
    }
    let mut manager = WindowManager::new(
        WindowManagerConfig::default(),
        Viewport::new(1200, 800),
        bus,
        Box::new(HeadlessSurfaceHost::new()),
    )
    .with_placement_source(Box::new(Constant(0.5)));

    manager
        .open_window("calculator", "Calculator", "", WindowOptions::default())
        .expect("open window");

    assert_eq!(*seen.borrow(), vec![json!("calculator")]);
    assert_eq!(manager.window_count(), 1);
}
