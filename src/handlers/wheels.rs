//! Wheel actions, shared by the timeline and the layer column.

use crate::constants::{MAX_LAYER_HEIGHT, MIN_LAYER_HEIGHT};
use crate::handlers::zoom::zoom_center_frame;
use crate::host::{KeyOverride, MessageKind, Point, SyntheticMessage, forward, keys};
use crate::input::actions::{WheelAction, WheelOp, ZoomCenter};
use crate::input::buttons::{Buttons, Modifiers};
use crate::input::drag::Env;
use crate::navigation;

/// Runs a wheel action. `None` lets the host handle the wheel itself,
/// otherwise the flag asks for a redraw of the main window.
pub fn perform(
    action: WheelAction,
    env: &mut Env<'_>,
    point: Point,
    delta: i32,
    modifiers: Modifiers,
    center: ZoomCenter,
) -> Option<bool> {
    let (op, reversed) = action.op()?;
    let delta = if reversed { -delta } else { delta };
    Some(run(op, env, point, delta, modifiers, center))
}

fn run(
    op: WheelOp,
    env: &mut Env<'_>,
    point: Point,
    delta: i32,
    modifiers: Modifiers,
    center: ZoomCenter,
) -> bool {
    let walk = &env.settings.walk;
    // positive deltas step toward the left, as the wheel scrolls
    let to_left = delta > 0;
    match op {
        WheelOp::None => false,
        WheelOp::ScrollH => {
            scroll(env, point, delta, &keys::PLAIN);
            false
        }
        WheelOp::ScrollV => {
            scroll(env, point, delta, &keys::ALT);
            false
        }
        WheelOp::ZoomH => zoom_h(env, point, delta, center),
        WheelOp::ZoomV => {
            let height = env.host.view().layer_height;
            let target = (height + if delta > 0 { 1 } else { -1 })
                .clamp(MIN_LAYER_HEIGHT, MAX_LAYER_HEIGHT);
            if target != height {
                env.host.set_layer_height(target);
            }
            false
        }
        _ if !env.host.is_editing() => false,
        WheelOp::MoveOne => {
            let frame = env.host.current_frame() + if to_left { -1 } else { 1 };
            let frame = frame.clamp(0, (env.host.scene_len() - 1).max(0));
            navigation::move_frame(&mut *env.host, walk, frame)
        }
        WheelOp::MoveLen => {
            let mapper = env.mapper();
            navigation::step_length(&mut *env.host, walk, &mapper, to_left)
        }
        WheelOp::StepMidptLayer | WheelOp::StepObjLayer => {
            let mapper = env.mapper();
            let layer = mapper.point_to_layer(point.y).max(mapper.view.layer_scroll);
            let skip_midpoints = op == WheelOp::StepObjLayer;
            navigation::step_boundary(&mut *env.host, walk, Some(layer), to_left, skip_midpoints)
        }
        WheelOp::StepMidptScene | WheelOp::StepObjScene => {
            let skip_midpoints = op == WheelOp::StepObjScene;
            navigation::step_boundary(&mut *env.host, walk, None, to_left, skip_midpoints)
        }
        WheelOp::StepBpm => {
            let division = env.settings.timeline.bpm.get(modifiers).division();
            navigation::step_bpm(&mut *env.host, walk, division, to_left)
        }
        WheelOp::ChangeScene => {
            navigation::set_scene_rel(&mut *env.host, walk, if to_left { -1 } else { 1 })
        }
    }
}

fn scroll(env: &mut Env<'_>, point: Point, delta: i32, overrides: &[KeyOverride]) -> bool {
    let msg = SyntheticMessage::new(MessageKind::Wheel(delta), point, Buttons::empty(), Modifiers::NONE);
    forward(&mut *env.host, msg, overrides)
}

/// Zooms one level in or out around `center`.
pub fn zoom_h(env: &mut Env<'_>, point: Point, delta: i32, center: ZoomCenter) -> bool {
    let mapper = env.mapper();
    let last = env.host.zoom_lengths().len() as i32 - 1;
    if last < 0 {
        return false;
    }
    let level = mapper.view.zoom_level;
    let target = (level + if delta > 0 { 1 } else { -1 }).clamp(0, last);
    if target == level {
        return false;
    }
    let center_frame = zoom_center_frame(&*env.host, &mapper, center, point.x);
    let len = env.host.zoom_lengths()[target as usize];
    env.host.apply_zoom(target, len, center_frame);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::host::{HostInterop, TimelineObject};
    use crate::input::auto_scroll::ScrollTimer;
    use crate::input::drag::Memo;
    use crate::memory_host::MemoryHost;

    fn wheel(host: &mut MemoryHost, action: WheelAction, delta: i32) -> Option<bool> {
        let settings = Settings::default();
        let mut timer = ScrollTimer::new();
        let mut memo = Memo::default();
        let mut env = Env::new(host, &settings, &mut timer, &mut memo);
        perform(action, &mut env, Point::new(300, 50), delta, Modifiers::NONE, ZoomCenter::Mouse)
    }

    #[test]
    fn bypass_is_left_to_the_host() {
        let mut host = MemoryHost::new(100);
        assert_eq!(wheel(&mut host, WheelAction::Bypass, 120), None);
        assert_eq!(wheel(&mut host, WheelAction::None, 120), Some(false));
    }

    #[test]
    fn reversed_actions_flip_direction() {
        let mut host = MemoryHost::new(100);
        host.set_current_frame(50);
        wheel(&mut host, WheelAction::MoveOneP, 120);
        assert_eq!(host.current_frame(), 49);
        wheel(&mut host, WheelAction::MoveOneN, 120);
        assert_eq!(host.current_frame(), 50);
    }

    #[test]
    fn zoom_steps_one_level_and_clamps() {
        let mut host = MemoryHost::new(100);
        let level = host.view().zoom_level;
        wheel(&mut host, WheelAction::ZoomHP, 120);
        assert_eq!(host.view().zoom_level, level + 1);
        for _ in 0..40 {
            wheel(&mut host, WheelAction::ZoomHN, 120);
        }
        assert_eq!(host.view().zoom_level, 0);
        assert_eq!(host.view().zoom_len, host.zoom_lengths()[0]);
    }

    #[test]
    fn scroll_wheels_force_keys() {
        let mut host = MemoryHost::new(100);
        host.set_key_state(crate::host::Key::Ctrl, true);
        wheel(&mut host, WheelAction::ScrollVP, 120);
        let seen = host.dispatched().last().copied().unwrap();
        assert!(seen.alt && !seen.ctrl);
        assert_eq!(seen.message.kind, MessageKind::Wheel(120));
    }

    #[test]
    fn layer_steps_use_pointed_layer() {
        let mut host = MemoryHost::new(1000);
        host.push_object(TimelineObject {
            begin: 100,
            end: 199,
            layer: 0,
            active: true,
            leader: None,
            next: None,
        });
        assert_eq!(wheel(&mut host, WheelAction::MoveObjLayerP, -120), Some(true));
        assert_eq!(host.current_frame(), 100);
        wheel(&mut host, WheelAction::MoveObjLayerN, 120);
        assert_eq!(host.current_frame(), 200);
    }
}
