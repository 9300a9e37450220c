//! Click actions for the object area, blank area and ruler.

use std::collections::BTreeSet;

use crate::constants::{MIDPOINT_PICK_THRESHOLD, MIDPOINT_SNAP_THRESHOLD};
use crate::host::{
    ForcedKeys, HostInterop, Key, KeyOverride, MessageKind, ObjectId, Point, SyntheticMessage,
    UndoTarget, forward, keys,
};
use crate::input::actions::TimelineClick;
use crate::input::buttons::{Buttons, Modifiers, MouseButton};
use crate::input::drag::Env;
use crate::timeline::ObjectSearch;
use crate::timeline::search::{is_active, leader_of};

/// Runs a click action. `true` asks for a redraw of the main window.
pub fn perform(action: TimelineClick, env: &mut Env<'_>, point: Point, modifiers: Modifiers) -> bool {
    match action {
        TimelineClick::None | TimelineClick::Bypass => false,
        TimelineClick::ObjCtrlShiftL => obj_ctrl_shift_l(env, point),
        TimelineClick::ObjLDbl => obj_l_dbl(env, point, modifiers),
        TimelineClick::Rclick => rclick(env.host, point, modifiers),
        TimelineClick::ToggleMidpt => toggle_midpt(env, point),
        TimelineClick::SelectLineLeft => select_line(env, point, false),
        TimelineClick::SelectLineRight => select_line(env, point, true),
        TimelineClick::SelectAll => select_all(env.host),
        TimelineClick::SqueezeLeft => squeeze_left(env, point),
        TimelineClick::SqueezeRight => squeeze_right(env, point),
        TimelineClick::ToggleActive => toggle_active(env, point),
    }
}

/// Refreshes the setting dialog without the host clearing the selection.
fn refresh_dialog_keeping_selection(host: &mut dyn HostInterop) {
    let mut keys = ForcedKeys::new(host, &[KeyOverride::on(Key::Ctrl)]);
    keys.refresh_dialog();
}

fn obj_ctrl_shift_l(env: &mut Env<'_>, point: Point) -> bool {
    let host = &mut *env.host;
    let Some(id) = host.object_at_point(point.x, point.y) else {
        return false;
    };
    let mut selection = host.selection();
    if selection.remove(&id) {
        host.set_selection(selection);
    }
    // step the selection origin back to before the last object drag
    if host.selection_origin() == Some(id)
        && let Some(back) = env.memo.selection_origin
        && host.object(back).is_some()
    {
        host.set_selection_origin(Some(back));
    }

    let down = SyntheticMessage::new(
        MessageKind::ButtonDown(MouseButton::Left),
        point,
        Buttons::LEFT,
        Modifiers::CTRL_SHIFT,
    );
    let up = SyntheticMessage::new(
        MessageKind::ButtonUp(MouseButton::Left),
        point,
        Buttons::empty(),
        Modifiers::CTRL_SHIFT,
    );
    let ret = forward(&mut *host, down, &keys::CTRL_SHIFT);
    forward(&mut *host, up, &keys::CTRL_SHIFT) | ret
}

fn obj_l_dbl(env: &mut Env<'_>, point: Point, modifiers: Modifiers) -> bool {
    let msg = SyntheticMessage::new(
        MessageKind::DoubleClick(MouseButton::Left),
        point,
        Buttons::LEFT,
        modifiers,
    );
    env.host.dispatch_synthetic(msg)
}

/// Forwards a right button press, which opens the host's context menu.
pub fn rclick(host: &mut dyn HostInterop, point: Point, modifiers: Modifiers) -> bool {
    let msg = SyntheticMessage::new(
        MessageKind::ButtonDown(MouseButton::Right),
        point,
        Buttons::RIGHT,
        modifiers,
    );
    host.dispatch_synthetic(msg)
}

fn toggle_midpt(env: &mut Env<'_>, point: Point) -> bool {
    if !env.host.is_editing() {
        return false;
    }
    let mapper = env.mapper();
    let frame = mapper.point_to_frame(point.x);
    let layer = mapper.point_to_layer(point.y);
    if delete_midpt(env, point.x, frame, layer) || add_midpt(env, point.x, frame, layer) {
        env.host.invalidate();
        return true;
    }
    false
}

fn add_midpt(env: &mut Env<'_>, x: i32, frame: i32, layer: i32) -> bool {
    let mapper = env.mapper();
    let host = &mut *env.host;
    let nearby = host.find_nearby_frame(frame, layer);
    let frame = if (x - mapper.frame_to_point(nearby)).abs() < MIDPOINT_SNAP_THRESHOLD {
        nearby
    } else {
        frame
    };

    let mut selection = host.selection();
    let targets: BTreeSet<ObjectId> = if selection.is_empty() {
        let Some(id) = ObjectSearch::new(&*host, layer).object_at_frame(frame) else {
            return false;
        };
        if host.object(id).is_some_and(|o| o.begin == frame) {
            return false;
        }
        BTreeSet::from([id])
    } else {
        selection
            .iter()
            .copied()
            .filter(|&id| host.object(id).is_some_and(|o| o.begin < frame && frame <= o.end))
            .collect()
    };
    if targets.is_empty() {
        return false;
    }

    host.next_undo();
    let extend_selection = !selection.is_empty();
    let mut modified = false;
    for &id in &targets {
        let Some(added) = host.add_midpoint(id, frame) else {
            continue;
        };
        modified = true;
        if extend_selection {
            selection.insert(added);
        }
    }
    if !modified {
        return false;
    }
    if extend_selection {
        host.set_selection(selection);
    }

    // the dialog follows the right half of a split object
    if let Some(dlg) = host.dialog_object()
        && targets.contains(&dlg)
    {
        let next = host.object(dlg).and_then(|o| o.next);
        host.set_dialog_object(next);
    }
    if host.dialog_object().is_some() {
        refresh_dialog_keeping_selection(host);
    }
    true
}

fn delete_midpt(env: &mut Env<'_>, x: i32, frame: i32, layer: i32) -> bool {
    let mapper = env.mapper();
    let host = &mut *env.host;

    let search = ObjectSearch::new(&*host, layer);
    let Some(i) = search.nearest_index(frame) else {
        return false;
    };
    let id_l = search.objects()[i];
    let Some(obj_l) = host.object(id_l).copied() else {
        return false;
    };
    let (frame_l, frame_r) = (obj_l.begin, obj_l.end + 1);
    // a plain gap between two objects, or an object without mid-points
    if frame_r <= frame {
        return false;
    }
    let Some(leader) = obj_l.leader else {
        return false;
    };

    // the mid-point is the begin frame of the chosen segment
    let (id_mid, frame_mid) = match obj_l.next {
        next if leader != id_l && (next.is_none() || 2 * frame <= frame_l + frame_r) => {
            (id_l, frame_l)
        }
        Some(next) => (next, frame_r),
        None => return false,
    };
    if (x - mapper.frame_to_point(frame_mid)).abs() >= MIDPOINT_PICK_THRESHOLD {
        return false;
    }

    let mut selection = host.selection();
    let targets: BTreeSet<ObjectId> = if selection.is_empty() {
        BTreeSet::from([id_mid])
    } else {
        let targets: BTreeSet<ObjectId> = selection
            .iter()
            .copied()
            .filter(|&id| {
                host.object(id)
                    .is_some_and(|o| o.begin == frame_mid && o.leader.is_some_and(|l| l != id))
            })
            .collect();
        if targets.is_empty() {
            return false;
        }
        targets
    };

    host.next_undo();
    let mut modified = false;
    for id in targets {
        let Some(removed) = host.delete_midpoint(id, frame_mid) else {
            continue;
        };
        modified = true;
        selection.remove(&removed);
    }
    if modified {
        host.set_selection(selection);
    }
    modified
}

/// Toggles, as one set, the objects left or right of the clicked frame.
fn select_line(env: &mut Env<'_>, point: Point, to_right: bool) -> bool {
    if !env.host.is_editing() {
        return false;
    }
    let mapper = env.mapper();
    let frame = mapper.point_to_frame(point.x);
    let layer = mapper.point_to_layer(point.y);
    let host = &mut *env.host;
    if host.layer_setting(layer).is_locked() {
        return false;
    }

    let search = ObjectSearch::new(&*host, layer);
    let objects = search.objects();
    if objects.is_empty() {
        return false;
    }
    let nearest = search.nearest_index(frame);
    let targets = if to_right {
        let j = match nearest {
            None => 0,
            Some(j) if host.object(objects[j]).is_some_and(|o| o.end < frame) => j + 1,
            Some(j) => j,
        };
        if j >= objects.len() {
            return false;
        }
        &objects[j..]
    } else {
        let Some(j) = nearest else {
            return false;
        };
        &objects[..=j]
    };

    let mut selection = host.selection();
    let mut contained = true;
    for id in targets {
        contained &= selection.remove(id);
    }
    if !contained {
        selection.extend(targets.iter().copied());
    }
    host.set_selection(selection);
    host.invalidate();
    false
}

fn select_all(host: &mut dyn HostInterop) -> bool {
    if !host.is_editing() {
        return false;
    }
    let prev_count = host.selection().len();
    let mut selection = BTreeSet::new();
    for layer in 0..crate::constants::NUM_LAYERS {
        if host.layer_setting(layer).is_locked() {
            continue;
        }
        selection.extend(host.layer_objects(layer).iter().copied());
    }
    if selection.is_empty() {
        return false;
    }
    if selection.len() == prev_count {
        // everything was selected already
        selection.clear();
    }
    host.set_selection(selection);
    host.invalidate();
    false
}

/// Shifts `objects` by `offset` frames as one undo step.
fn shift_objects(host: &mut dyn HostInterop, objects: &[ObjectId], offset: i32) {
    let dialog = host.dialog_object();
    let mut dialog_moved = false;
    host.next_undo();
    for &id in objects {
        let Some(obj) = host.object(id).copied() else {
            continue;
        };
        host.record_undo(UndoTarget::ObjectPlacement(id));
        host.set_object_frames(id, obj.begin + offset, obj.end + offset);
        dialog_moved |= dialog == Some(id);
    }
    host.invalidate();
    if dialog_moved {
        refresh_dialog_keeping_selection(host);
    }
}

/// Closes the gap left of the clicked point by moving everything right of it.
fn squeeze_left(env: &mut Env<'_>, point: Point) -> bool {
    if !env.host.is_editing() {
        return false;
    }
    let mapper = env.mapper();
    let frame = mapper.point_to_frame(point.x);
    let layer = mapper.point_to_layer(point.y);
    let host = &mut *env.host;
    if host.layer_setting(layer).is_locked() {
        return false;
    }

    let objects = host.layer_objects(layer).to_vec();
    if objects.is_empty() {
        return false;
    }
    let frames = |id: ObjectId| host.object(id).map(|o| (o.begin, o.end));
    let j = match ObjectSearch::new(&*host, layer).nearest_index(frame) {
        None => 0,
        Some(i) if frames(objects[i]).is_some_and(|(_, end)| end < frame) => i + 1,
        Some(i) => i,
    };
    if j >= objects.len() {
        return false;
    }
    let left = match j.checked_sub(1) {
        Some(prev) => frames(objects[prev]).map_or(0, |(_, end)| end + 1),
        None => 0,
    };
    let Some((right, _)) = frames(objects[j]) else {
        return false;
    };
    let gap = right - left;
    if gap <= 0 {
        return false;
    }
    shift_objects(host, &objects[j..], -gap);
    true
}

/// Closes the gap right of the clicked point by moving everything left of it.
fn squeeze_right(env: &mut Env<'_>, point: Point) -> bool {
    if !env.host.is_editing() {
        return false;
    }
    let mapper = env.mapper();
    let frame = mapper.point_to_frame(point.x);
    let layer = mapper.point_to_layer(point.y);
    let host = &mut *env.host;
    if host.layer_setting(layer).is_locked() {
        return false;
    }

    let objects = host.layer_objects(layer).to_vec();
    let Some(i) = ObjectSearch::new(&*host, layer).nearest_index(frame) else {
        return false;
    };
    let Some(left) = host.object(objects[i]).map(|o| o.end + 1) else {
        return false;
    };
    let right = match objects.get(i + 1) {
        Some(&next) => match host.object(next) {
            Some(o) => o.begin,
            None => return false,
        },
        None => host.scene_len(),
    };
    let gap = right - left;
    if gap <= 0 {
        return false;
    }
    shift_objects(host, &objects[..=i], gap);
    true
}

fn toggle_active(env: &mut Env<'_>, point: Point) -> bool {
    let host = &mut *env.host;
    if !host.is_editing() {
        return false;
    }
    let Some(clicked) = host.object_at_point(point.x, point.y) else {
        return false;
    };

    let mut selected = host.selection();
    selected.insert(clicked);
    let targets: BTreeSet<ObjectId> = selected.iter().map(|&id| leader_of(&*host, id)).collect();
    let activate = !is_active(&*host, clicked);
    let dialog = host
        .dialog_object()
        .filter(|&dlg| targets.contains(&leader_of(&*host, dlg)));

    host.next_undo();
    for id in targets {
        if host.object(id).is_some_and(|o| o.active != activate) {
            host.record_undo(UndoTarget::ObjectStatus(id));
            host.set_object_active(id, activate);
        }
    }
    host.invalidate();
    if dialog.is_some() {
        refresh_dialog_keeping_selection(host);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::host::{ObjectStore, TimelineObject};
    use crate::input::auto_scroll::ScrollTimer;
    use crate::input::drag::Memo;
    use crate::memory_host::MemoryHost;

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

    /// Client point of `frame` on `layer` at 1 px per frame.
    fn at(frame: i32, layer: i32) -> Point {
        Point::new(64 + frame, 42 + 32 * layer + 5)
    }

    fn click(host: &mut MemoryHost, action: TimelineClick, point: Point) -> bool {
        let settings = Settings::default();
        let mut timer = ScrollTimer::new();
        let mut memo = Memo::default();
        let mut env = Env::new(host, &settings, &mut timer, &mut memo);
        perform(action, &mut env, point, Modifiers::NONE)
    }

    #[test]
    fn select_line_toggles_as_a_set() {
        let mut host = MemoryHost::new(1000);
        let a = host.push_object(obj(0, 99, 1));
        let b = host.push_object(obj(100, 199, 1));
        let c = host.push_object(obj(300, 399, 1));

        click(&mut host, TimelineClick::SelectLineLeft, at(150, 1));
        assert_eq!(host.selection(), BTreeSet::from([a, b]));
        click(&mut host, TimelineClick::SelectLineLeft, at(150, 1));
        assert!(host.selection().is_empty());

        // from the gap, the right side starts at the next object
        click(&mut host, TimelineClick::SelectLineRight, at(250, 1));
        assert_eq!(host.selection(), BTreeSet::from([c]));
        // partially selected sets get completed
        click(&mut host, TimelineClick::SelectLineRight, at(150, 1));
        assert_eq!(host.selection(), BTreeSet::from([b, c]));
        // nothing right of the last object
        assert!(!click(&mut host, TimelineClick::SelectLineRight, at(500, 1)));
        assert_eq!(host.selection(), BTreeSet::from([b, c]));
    }

    #[test]
    fn select_line_ignores_locked_layers() {
        let mut host = MemoryHost::new(1000);
        host.push_object(obj(0, 99, 1));
        let mut locked = host.layer_setting(1);
        locked.flags.set(crate::host::LayerFlags::LOCKED, true);
        host.set_layer_setting(1, locked);
        click(&mut host, TimelineClick::SelectLineLeft, at(50, 1));
        assert!(host.selection().is_empty());
    }

    #[test]
    fn select_all_twice_deselects() {
        let mut host = MemoryHost::new(1000);
        host.push_object(obj(0, 99, 0));
        host.push_object(obj(0, 99, 5));
        click(&mut host, TimelineClick::SelectAll, at(10, 0));
        assert_eq!(host.selection().len(), 2);
        assert_eq!(host.invalidations(), 1);
        click(&mut host, TimelineClick::SelectAll, at(10, 0));
        assert!(host.selection().is_empty());
        assert_eq!(host.invalidations(), 2);
    }

    #[test]
    fn squeeze_closes_gaps() {
        let mut host = MemoryHost::new(1000);
        let a = host.push_object(obj(10, 99, 2));
        let b = host.push_object(obj(150, 199, 2));
        let c = host.push_object(obj(250, 299, 2));

        // click in the gap before b: b and c shift left by 50
        assert!(click(&mut host, TimelineClick::SqueezeLeft, at(120, 2)));
        assert_eq!(host.object(b).map(|o| o.begin), Some(100));
        assert_eq!(host.object(c).map(|o| o.begin), Some(200));
        assert_eq!(host.object(a).map(|o| o.begin), Some(10));

        // click on a: the gap before a closes
        assert!(click(&mut host, TimelineClick::SqueezeLeft, at(50, 2)));
        assert_eq!(host.object(a).map(|o| o.begin), Some(0));
        assert_eq!(host.object(c).map(|o| (o.begin, o.end)), Some((190, 239)));

        // squeeze right on c pushes everything to the scene end
        assert!(click(&mut host, TimelineClick::SqueezeRight, at(200, 2)));
        assert_eq!(host.object(c).map(|o| o.end), Some(999));
        assert!(!click(&mut host, TimelineClick::SqueezeRight, at(200, 2)));
    }

    #[test]
    fn toggle_active_follows_clicked_chain() {
        let mut host = MemoryHost::new(1000);
        let a = host.push_object(obj(0, 49, 0));
        let b = host.push_object(obj(50, 99, 0));
        host.link_chain(&[a, b]);
        let c = host.push_object(obj(0, 99, 1));
        host.set_object_active(c, false);
        host.set_selection(BTreeSet::from([c]));

        assert!(click(&mut host, TimelineClick::ToggleActive, at(70, 0)));
        assert!(!host.object(a).is_some_and(|o| o.active));
        assert!(!host.object(c).is_some_and(|o| o.active));

        assert!(click(&mut host, TimelineClick::ToggleActive, at(70, 0)));
        assert!(host.object(a).is_some_and(|o| o.active));
        assert!(host.object(c).is_some_and(|o| o.active));
    }

    #[test]
    fn toggle_midpt_adds_then_removes() {
        let mut host = MemoryHost::new(1000);
        let a = host.push_object(obj(0, 199, 0));
        assert!(click(&mut host, TimelineClick::ToggleMidpt, at(100, 0)));
        let b = host.object(a).and_then(|o| o.next).unwrap();
        assert_eq!(host.object(b).map(|o| o.begin), Some(100));
        assert_eq!(host.object(a).map(|o| o.end), Some(99));

        assert!(click(&mut host, TimelineClick::ToggleMidpt, at(105, 0)));
        assert_eq!(host.object(a).map(|o| o.end), Some(199));
        assert!(host.object(b).is_none());
    }
}
