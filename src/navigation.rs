//! Moving the current frame and scene.

use crate::config::WalkSettings;
use crate::constants::{NUM_LAYERS, NUM_SCENES};
use crate::grid::{BeatDivision, BpmGrid};
use crate::host::{ForcedKeys, HostInterop, Key, KeyOverride};
use crate::timeline::{Mapper, ObjectSearch};

/// Sets the current frame; `false` when it already was there.
pub fn move_frame(host: &mut dyn HostInterop, walk: &WalkSettings, frame: i32) -> bool {
    if frame == host.current_frame() {
        return false;
    }
    let mut keys = ForcedKeys::new(host, &[KeyOverride::suppress(Key::Shift, walk.suppress_shift)]);
    keys.set_current_frame(frame);
    true
}

/// Steps to the adjacent object boundary on `layer`, or across every layer
/// of the scene when `layer` is `None`.
pub fn step_boundary(
    host: &mut dyn HostInterop,
    walk: &WalkSettings,
    layer: Option<i32>,
    to_left: bool,
    skip_midpoints: bool,
) -> bool {
    let pos = host.current_frame();
    let len = host.scene_len();
    let store: &dyn HostInterop = &*host;
    let search = move |layer: i32| {
        ObjectSearch::new(store, layer)
            .skip_midpoints(skip_midpoints)
            .skip_inactives(walk.skip_inactive_objects)
    };
    let new_pos = match layer {
        Some(layer) if to_left => search(layer).find_adjacent_left(pos),
        Some(layer) => search(layer).find_adjacent_right(pos).resolve(len),
        None => {
            let layers = (0..NUM_LAYERS)
                .filter(|&l| !walk.skip_hidden_layers || store.layer_setting(l).is_visible());
            if to_left {
                layers
                    .map(|l| search(l).find_adjacent_left(pos))
                    .fold(0, i32::max)
            } else {
                layers
                    .map(|l| search(l).find_adjacent_right(pos).resolve(len))
                    .fold((len - 1).max(0), i32::min)
            }
        }
    };
    if new_pos == pos {
        return false;
    }
    move_frame(host, walk, new_pos)
}

/// Steps by a fixed share of the horizontal scroll size.
pub fn step_length(host: &mut dyn HostInterop, walk: &WalkSettings, mapper: &Mapper, to_left: bool) -> bool {
    let pos = host.current_frame();
    let len = host.scene_len();
    let mut dist = (mapper.horiz_scroll_size() as i64 * walk.step_length_percent as i64 / 100) as i32;
    if to_left {
        dist = -dist;
    }
    let new_pos = pos.saturating_add(dist).clamp(0, (len - 1).max(0));
    if new_pos == pos {
        return false;
    }
    move_frame(host, walk, new_pos)
}

/// Steps to the adjacent line of the BPM grid.
pub fn step_bpm(
    host: &mut dyn HostInterop,
    walk: &WalkSettings,
    division: BeatDivision,
    to_left: bool,
) -> bool {
    let Some(grid) = BpmGrid::new(&host.tempo(), division) else {
        log::debug!("BPM grid unavailable for the current tempo");
        return false;
    };
    let pos = host.current_frame();
    let new_pos = if to_left {
        grid.pos_from_beat(grid.beat_from_pos(pos - 1))
    } else {
        grid.pos_from_beat(grid.beat_from_pos(pos) + 1)
    };
    let new_pos = new_pos.clamp(0, (host.scene_len() - 1).max(0));
    if new_pos == pos {
        return false;
    }
    move_frame(host, walk, new_pos)
}

/// Switches to the scene `delta` away from the current one.
pub fn set_scene_rel(host: &mut dyn HostInterop, walk: &WalkSettings, delta: i32) -> bool {
    let current = host.current_scene();
    let scene = (current + delta).clamp(0, NUM_SCENES - 1);
    if scene == current {
        return false;
    }
    let mut keys = ForcedKeys::new(host, &[KeyOverride::suppress(Key::Shift, walk.suppress_shift)]);
    keys.change_scene(scene);
    log::info!("Switched to scene {}", scene);
    true
}
