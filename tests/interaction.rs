use std::collections::BTreeSet;

use tlmouse::config::Settings;
use tlmouse::host::{HostInterop, Key, LayerCommand, MessageKind, ObjectStore, TimelineObject, UndoTarget};
use tlmouse::input::actions::TimelineDrag;
use tlmouse::input::bindings::Binding;
use tlmouse::input::buttons::{Modifiers, MouseButton};
use tlmouse::memory_host::MemoryHost;
use tlmouse::script::{Replay, Script, ScriptEvent};
use tlmouse::{Dispatch, InteractionDispatcher};

const BLANK: (i32, i32) = (400, 300);

fn layer_y(layer: i32) -> i32 {
    42 + 32 * layer + 10
}

fn rig(settings: Settings, host: MemoryHost) -> Replay {
    Replay::new(InteractionDispatcher::new(settings), host)
}

fn obj(begin: i32, end: i32, layer: i32) -> TimelineObject {
    TimelineObject {
        begin,
        end,
        layer,
        active: true,
        leader: None,
        next: None,
    }
}

fn down(button: MouseButton, (x, y): (i32, i32)) -> ScriptEvent {
    ScriptEvent::Down {
        button,
        x,
        y,
        mods: Modifiers::NONE,
    }
}

fn up(button: MouseButton, (x, y): (i32, i32)) -> ScriptEvent {
    ScriptEvent::Up {
        button,
        x,
        y,
        mods: Modifiers::NONE,
    }
}

fn to((x, y): (i32, i32)) -> ScriptEvent {
    ScriptEvent::Move {
        x,
        y,
        mods: Modifiers::NONE,
    }
}

fn escape() -> ScriptEvent {
    ScriptEvent::Key {
        key: Key::Escape,
        down: true,
    }
}

#[test]
fn chord_zoom_cancel_restores_view_and_frame() {
    let mut settings = Settings::default();
    settings.timeline.drag.l_and_r = Binding::uniform(TimelineDrag::ZoomBi);
    let mut r = rig(settings, MemoryHost::new(10_000));
    r.host.set_frame_scroll(250);
    let view = r.host.view();

    assert!(r.step(down(MouseButton::Left, BLANK)).consumed);
    assert_eq!(r.host.current_frame(), 250 + BLANK.0 - 64);

    // the plain drag is still entering, so the chord takes over
    assert!(r.step(down(MouseButton::Right, BLANK)).consumed);
    assert_eq!(r.host.current_frame(), 0);
    r.step(to((BLANK.0 + 64, BLANK.1 + 48)));
    assert_ne!(r.host.view(), view);

    assert!(r.step(escape()).consumed);
    assert_eq!(r.host.view(), view);
    assert_eq!(r.host.current_frame(), 0);
    assert!(!r.host.has_capture());

    // both releases belong to the canceled chord
    assert!(r.step(up(MouseButton::Left, BLANK)).consumed);
    assert!(r.step(up(MouseButton::Right, BLANK)).consumed);
    assert_eq!(r.host.current_frame(), 0);
}

#[test]
fn escape_aborts_host_object_move() {
    let mut host = MemoryHost::new(1000);
    let id = host.push_object(obj(100, 199, 0));
    let mut r = rig(Settings::default(), host);
    let grab = (64 + 150, layer_y(0));

    r.step(down(MouseButton::Left, grab));
    r.step(to((grab.0 + 50, grab.1)));
    assert_eq!(r.host.object(id).map(|o| o.begin), Some(150));

    r.step(escape());
    assert_eq!(r.host.object(id).copied(), Some(obj(100, 199, 0)));
    assert!(!r.host.has_capture());
    assert!(r.step(up(MouseButton::Left, (grab.0 + 50, grab.1))).consumed);
    assert_eq!(r.host.object(id).map(|o| o.begin), Some(100));
}

#[test]
fn capture_loss_cancels_without_releasing() {
    let mut settings = Settings::default();
    settings.timeline.drag.m = Binding::uniform(TimelineDrag::ZoomBi);
    let mut r = rig(settings, MemoryHost::new(10_000));
    let view = r.host.view();

    r.step(down(MouseButton::Middle, BLANK));
    r.step(to((BLANK.0 - 128, BLANK.1)));
    assert!(r.host.view().zoom_level < view.zoom_level);

    assert!(r.step(ScriptEvent::CaptureLost).consumed);
    assert_eq!(r.host.view(), view);
    assert!(!r.dispatcher.machine().is_active());
}

#[test]
fn layer_paint_applies_first_direction() {
    let mut host = MemoryHost::new(1000);
    let mut hidden = host.layer_setting(2);
    hidden.flags.toggle(tlmouse::host::LayerFlags::HIDDEN);
    host.set_layer_setting(2, hidden);
    let mut r = rig(Settings::default(), host);

    r.step(down(MouseButton::Left, (20, layer_y(1))));
    r.step(to((20, layer_y(4))));
    r.step(up(MouseButton::Left, (20, layer_y(4))));

    let visible: Vec<bool> = (0..6).map(|l| r.host.layer_setting(l).is_visible()).collect();
    assert_eq!(visible, [true, false, false, false, false, true]);
    let undone: Vec<UndoTarget> = r.host.undo_log().iter().map(|&(_, t)| t).collect();
    assert_eq!(
        undone,
        [UndoTarget::Layer(1), UndoTarget::Layer(3), UndoTarget::Layer(4)]
    );

    // starting on a hidden layer shows
    r.step(down(MouseButton::Left, (20, layer_y(3))));
    r.step(to((20, layer_y(2))));
    assert_eq!(r.step(escape()), Dispatch::handled(true));
    assert!(!r.host.layer_setting(2).is_visible());
    assert!(!r.host.layer_setting(3).is_visible());
}

#[test]
fn paint_drag_auto_scrolls_on_timer() {
    let mut r = rig(Settings::default(), MemoryHost::new(1000));
    let below = (20, 640);

    r.step(down(MouseButton::Left, (20, layer_y(15))));
    r.step(to(below));
    assert_eq!(r.host.view().layer_scroll, 1);
    assert!(r.host.pending_timer().is_some());

    assert_eq!(r.step(ScriptEvent::Timer { advance_ms: 100 }), Dispatch::handled(true));
    assert_eq!(r.host.view().layer_scroll, 2);
    assert!(!r.host.layer_setting(19).is_visible());

    r.step(up(MouseButton::Left, below));
    assert_eq!(r.host.pending_timer(), None);
    assert_eq!(r.step(ScriptEvent::Timer { advance_ms: 100 }), Dispatch::PASS);
    assert_eq!(r.host.view().layer_scroll, 2);
}

#[test]
fn press_without_motion_is_a_click() {
    let mut r = rig(Settings::default(), MemoryHost::new(1000));

    r.step(down(MouseButton::Right, BLANK));
    r.step(to((BLANK.0 + 2, BLANK.1 + 2)));
    assert!(r.step(up(MouseButton::Right, BLANK)).consumed);
    let last = r.host.dispatched().last().map(|d| d.message.kind);
    assert_eq!(last, Some(MessageKind::ButtonDown(MouseButton::Right)));

    // a wheel turn while pressed turns the release into a drag end
    let before = r.host.dispatched().len();
    r.step(down(MouseButton::Right, BLANK));
    r.step(ScriptEvent::Wheel {
        x: BLANK.0,
        y: BLANK.1,
        delta: 120,
        mods: Modifiers::NONE,
    });
    r.step(up(MouseButton::Right, BLANK));
    assert_eq!(r.host.dispatched().len(), before);
}

#[test]
fn ctrl_wheel_zooms_around_pointer() {
    let mut r = rig(Settings::default(), MemoryHost::new(10_000));
    r.host.set_frame_scroll(100);
    let frame = 100 + BLANK.0 - 64;

    let d = r.step(ScriptEvent::Wheel {
        x: BLANK.0,
        y: BLANK.1,
        delta: 120,
        mods: Modifiers::CTRL,
    });
    assert!(d.consumed);
    assert_eq!(r.host.view().zoom_level, 21);
    let mapper = tlmouse::timeline::Mapper::new(Settings::default().layout, r.host.view());
    assert_eq!(mapper.point_to_frame(BLANK.0), frame);
}

#[test]
fn layer_wheel_scrolls_rows() {
    let mut r = rig(Settings::default(), MemoryHost::new(1000));
    r.step(ScriptEvent::Wheel {
        x: 20,
        y: layer_y(2),
        delta: -120,
        mods: Modifiers::NONE,
    });
    assert_eq!(r.host.view().layer_scroll, 1);
    assert!(!r.host.key_state(Key::Alt));
}

#[test]
fn layer_double_click_toggles_others() {
    let mut r = rig(Settings::default(), MemoryHost::new(1000));
    let at = (20, layer_y(3));

    r.step(down(MouseButton::Left, at));
    r.step(up(MouseButton::Left, at));
    let d = r.step(ScriptEvent::DoubleClick {
        button: MouseButton::Left,
        x: at.0,
        y: at.1,
        mods: Modifiers::NONE,
    });
    assert!(d.consumed);
    assert!(r.step(up(MouseButton::Left, at)).consumed);
    assert_eq!(r.host.layer_commands(), &[(LayerCommand::ToggleOthers, 3)]);
}

#[test]
fn scripted_session_replays() -> anyhow::Result<()> {
    let script: Script = serde_json::from_str(
        r#"{
            "scene_len": 2000,
            "objects": [
                { "begin": 0, "end": 99, "layer": 0 },
                { "begin": 300, "end": 399, "layer": 0 }
            ],
            "events": [
                { "type": "down", "button": "Left", "x": 114, "y": 52 },
                { "type": "move", "x": 164, "y": 52 },
                { "type": "up", "button": "Left", "x": 164, "y": 52 },
                { "type": "down", "button": "Left", "x": 700, "y": 300, "mods": { "ctrl": true } },
                { "type": "move", "x": 40, "y": 60, "mods": { "ctrl": true } }
            ]
        }"#,
    )?;
    let host = script.build_host()?;
    let mut r = rig(Settings::default(), host);
    let results = r.run(&script);
    assert!(results.iter().all(|d| d.consumed));

    let first = r.host.layer_objects(0)[0];
    assert_eq!(r.host.object(first).map(|o| (o.begin, o.end)), Some((50, 149)));
    assert_eq!(r.host.selection(), BTreeSet::from([first]));
    Ok(())
}
