use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::*;
use crate::input::actions::{
    BpmStep, LayerClick, LayerDrag, TimelineClick, TimelineDrag, WheelAction, ZoomCenter,
};
use crate::input::bindings::{Binding, ButtonBindings, DragBindings, WheelBindings};
use crate::input::buttons::Modifiers;
use crate::paths::config_path;
use crate::timeline::TimelineLayout;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub timeline: TimelineSettings,
    pub layer: LayerSettings,
    pub zoom_gauge: ZoomGaugeSettings,
    pub scene_button: SceneButtonSettings,
    pub walk: WalkSettings,
    pub layout: TimelineLayout,
}

/// Object area, blank area and ruler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    pub enabled: bool,
    pub drag: DragBindings<TimelineDrag>,
    pub drag_obj: DragBindings<TimelineDrag>,
    pub click: ButtonBindings<TimelineClick>,
    pub click_obj: ButtonBindings<TimelineClick>,
    pub dbl_click: ButtonBindings<TimelineClick>,
    pub dbl_click_obj: ButtonBindings<TimelineClick>,
    pub wheel: WheelBindings<WheelAction>,
    /// Grid step used by BPM snapping and stepping, per held modifiers.
    pub bpm: Binding<BpmStep>,

    pub change_cursor: bool,
    pub wheel_vertical_scrollbar: bool,
    pub zoom_center_wheel: ZoomCenter,
    pub zoom_center_drag: ZoomCenter,

    /// Sub-steps between two zoom levels while drag zooming.
    pub zoom_drag_refine_x: i32,
    /// Pixels per refined zoom step; negative reverses the direction.
    pub zoom_drag_length_x: i32,
    /// Pixels per layer height step; negative reverses the direction.
    pub zoom_drag_length_y: i32,

    /// Keys that flip `skip_midpt_def` while snapping to boundaries.
    pub skip_midpt_key: Modifiers,
    pub skip_midpt_def: bool,
    pub skip_inactives_key: Modifiers,
    pub skip_inactives_def: bool,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        let drag = DragBindings {
            l: Binding::uniform(TimelineDrag::L),
            r: Binding::uniform(TimelineDrag::None),
            m: Binding::uniform(TimelineDrag::None),
            x1: Binding::uniform(TimelineDrag::Bypass),
            x2: Binding::uniform(TimelineDrag::Bypass),
            l_and_r: Binding::uniform(TimelineDrag::None),
        };
        let click = ButtonBindings {
            l: Binding::uniform(TimelineClick::None),
            r: Binding::uniform(TimelineClick::Rclick),
            m: Binding::uniform(TimelineClick::None),
            x1: Binding::uniform(TimelineClick::Bypass),
            x2: Binding::uniform(TimelineClick::Bypass),
        };
        let dbl_click = ButtonBindings {
            l: Binding::uniform(TimelineClick::None),
            r: Binding::uniform(TimelineClick::None),
            m: Binding::uniform(TimelineClick::None),
            x1: Binding::uniform(TimelineClick::Bypass),
            x2: Binding::uniform(TimelineClick::Bypass),
        };
        let wheel = WheelBindings {
            normal: Binding {
                neutral: WheelAction::ScrollHP,
                ctrl: WheelAction::ZoomHP,
                shift: WheelAction::ScrollHP,
                alt: WheelAction::ScrollVP,
                ctrl_shift: WheelAction::ZoomHP,
                ctrl_alt: WheelAction::ZoomHP,
                shift_alt: WheelAction::ScrollVP,
                ctrl_shift_alt: WheelAction::ZoomHP,
            },
            r_button: Binding::uniform(WheelAction::None),
        };

        Self {
            enabled: true,
            drag,
            drag_obj: drag,
            click,
            click_obj: click,
            dbl_click,
            dbl_click_obj: dbl_click,
            wheel,
            bpm: Binding::uniform(BpmStep::Beats(1)).with(Modifiers::SHIFT, BpmStep::Beats(4)),
            change_cursor: true,
            wheel_vertical_scrollbar: true,
            zoom_center_wheel: ZoomCenter::Mouse,
            zoom_center_drag: ZoomCenter::WindowLeft,
            zoom_drag_refine_x: 8,
            zoom_drag_length_x: 64,
            zoom_drag_length_y: 16,
            skip_midpt_key: Modifiers::SHIFT,
            skip_midpt_def: true,
            skip_inactives_key: Modifiers::NONE,
            skip_inactives_def: false,
        }
    }
}

impl TimelineSettings {
    pub fn skip_midpoints(&self, held: Modifiers) -> bool {
        self.skip_midpt_def ^ held.has_any(self.skip_midpt_key)
    }

    pub fn skip_inactives(&self, held: Modifiers) -> bool {
        self.skip_inactives_def ^ held.has_any(self.skip_inactives_key)
    }
}

/// Layer header column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerSettings {
    pub enabled: bool,
    pub drag: DragBindings<LayerDrag>,
    pub click: ButtonBindings<LayerClick>,
    pub dbl_click: ButtonBindings<LayerClick>,
    pub wheel: WheelBindings<WheelAction>,
    /// Minimum interval between two auto-scroll steps of a paint drag.
    pub auto_scroll_delay_ms: u32,
    pub zoom_center_wheel: ZoomCenter,
}

impl Default for LayerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            drag: DragBindings {
                l: Binding::uniform(LayerDrag::ShowHide)
                    .with(Modifiers::CTRL, LayerDrag::SelectAll)
                    .with(Modifiers::SHIFT, LayerDrag::LockUnlock),
                r: Binding::uniform(LayerDrag::None),
                m: Binding::uniform(LayerDrag::None),
                x1: Binding::uniform(LayerDrag::Bypass),
                x2: Binding::uniform(LayerDrag::Bypass),
                l_and_r: Binding::uniform(LayerDrag::None),
            },
            click: ButtonBindings {
                l: Binding::uniform(LayerClick::None),
                r: Binding::uniform(LayerClick::Rclick),
                m: Binding::uniform(LayerClick::Rename),
                x1: Binding::uniform(LayerClick::Bypass),
                x2: Binding::uniform(LayerClick::Bypass),
            },
            dbl_click: ButtonBindings {
                l: Binding::uniform(LayerClick::ToggleOthers),
                r: Binding::uniform(LayerClick::None),
                m: Binding::uniform(LayerClick::None),
                x1: Binding::uniform(LayerClick::Bypass),
                x2: Binding::uniform(LayerClick::Bypass),
            },
            wheel: WheelBindings {
                normal: Binding::uniform(WheelAction::ScrollVP)
                    .with(Modifiers::CTRL, WheelAction::ZoomVP),
                r_button: Binding::uniform(WheelAction::None),
            },
            auto_scroll_delay_ms: 100,
            zoom_center_wheel: ZoomCenter::WindowLeft,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomGaugeSettings {
    pub enabled: bool,
    /// Wheel direction for zooming: -1, 0 (off) or 1.
    pub wheel: i32,
    pub zoom_center: ZoomCenter,
}

impl Default for ZoomGaugeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            wheel: 1,
            zoom_center: ZoomCenter::CurrFrame,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneButtonSettings {
    pub enabled: bool,
    /// Wheel direction for changing scenes: -1, 0 (off) or 1.
    pub wheel: i32,
}

impl Default for SceneButtonSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            wheel: 0,
        }
    }
}

/// Frame stepping by wheel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkSettings {
    /// Force shift off while moving the current frame.
    pub suppress_shift: bool,
    pub skip_inactive_objects: bool,
    /// Scene-wide stepping ignores hidden layers.
    pub skip_hidden_layers: bool,
    /// Length step as a percentage of one scroll step.
    pub step_length_percent: i32,
}

impl Default for WalkSettings {
    fn default() -> Self {
        Self {
            suppress_shift: true,
            skip_inactive_objects: false,
            skip_hidden_layers: false,
            step_length_percent: 100,
        }
    }
}

fn clamp_logged<T: PartialOrd + Copy + std::fmt::Display>(
    key: &str,
    value: &mut T,
    (lo, hi): (T, T),
) {
    let clamped = if *value < lo {
        lo
    } else if *value > hi {
        hi
    } else {
        return;
    };
    log::warn!("{} = {} out of range, using {}", key, value, clamped);
    *value = clamped;
}

impl Settings {
    /// Loads the settings file from the platform config dir, or defaults.
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path()
            && path.exists()
        {
            return Self::load_from(&path);
        }
        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let mut settings: Settings = serde_json::from_str(&contents)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        settings.normalize();
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        if let Some(path) = config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Replaces bindings that cannot apply to their area and clamps tunables.
    pub fn normalize(&mut self) {
        let tl = &mut self.timeline;
        let replaced = tl.drag.normalize(TimelineDrag::valid_on_blank, TimelineDrag::None);
        if replaced > 0 {
            log::warn!("timeline.drag: {} object-only drag(s) replaced with none", replaced);
        }
        let replaced = tl.click.normalize(TimelineClick::valid_on_blank, TimelineClick::None);
        if replaced > 0 {
            log::warn!("timeline.click: {} object-only click(s) replaced with none", replaced);
        }
        let replaced = tl
            .dbl_click
            .normalize(TimelineClick::valid_on_blank_double, TimelineClick::None);
        if replaced > 0 {
            log::warn!(
                "timeline.dbl_click: {} object-only click(s) replaced with none",
                replaced
            );
        }

        clamp_logged("timeline.zoom_drag_refine_x", &mut tl.zoom_drag_refine_x, ZOOM_DRAG_REFINE_RANGE);
        clamp_logged("timeline.zoom_drag_length_x", &mut tl.zoom_drag_length_x, ZOOM_DRAG_LENGTH_RANGE);
        clamp_logged("timeline.zoom_drag_length_y", &mut tl.zoom_drag_length_y, ZOOM_DRAG_LENGTH_RANGE);
        clamp_logged("layer.auto_scroll_delay_ms", &mut self.layer.auto_scroll_delay_ms, AUTO_SCROLL_DELAY_RANGE);
        clamp_logged("zoom_gauge.wheel", &mut self.zoom_gauge.wheel, (-1, 1));
        clamp_logged("scene_button.wheel", &mut self.scene_button.wheel, (-1, 1));
        clamp_logged("walk.step_length_percent", &mut self.walk.step_length_percent, (1, 1000));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_normalize() {
        let mut settings = Settings::default();
        settings.normalize();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_file_fills_defaults_and_normalizes() {
        let json = r#"{
            "timeline": { "zoom_drag_refine_x": 5000, "skip_midpt_def": false },
            "layer": { "auto_scroll_delay_ms": 1 }
        }"#;
        let mut settings: Settings = serde_json::from_str(json).unwrap();
        settings.normalize();
        assert_eq!(settings.timeline.zoom_drag_refine_x, 200);
        assert!(!settings.timeline.skip_midpt_def);
        assert_eq!(settings.layer.auto_scroll_delay_ms, 10);
        assert_eq!(settings.timeline.drag, TimelineSettings::default().drag);
    }

    #[test]
    fn blank_tables_reject_object_actions() {
        let mut settings = Settings::default();
        settings.timeline.drag.l = settings.timeline.drag.l.with(Modifiers::CTRL, TimelineDrag::ObjCtrlL);
        settings.timeline.drag_obj.l = settings.timeline.drag.l;
        settings.timeline.click.r = Binding::uniform(TimelineClick::ToggleActive);
        settings.normalize();
        assert_eq!(settings.timeline.drag.l.ctrl, TimelineDrag::None);
        assert_eq!(settings.timeline.drag_obj.l.ctrl, TimelineDrag::ObjCtrlL);
        assert_eq!(settings.timeline.click.r.neutral, TimelineClick::None);
    }

    #[test]
    fn skip_keys_flip_defaults() {
        let tl = TimelineSettings::default();
        assert!(tl.skip_midpoints(Modifiers::NONE));
        assert!(!tl.skip_midpoints(Modifiers::SHIFT));
        assert!(!tl.skip_inactives(Modifiers::CTRL_SHIFT_ALT));
    }

    #[test]
    fn save_and_load_from_file() -> Result<()> {
        let path = std::env::temp_dir().join(format!("tlmouse-settings-{}.json", std::process::id()));
        let mut settings = Settings::default();
        settings.layer.auto_scroll_delay_ms = 250;
        settings.timeline.bpm.ctrl = BpmStep::Measures(2);
        settings.save_to(&path)?;
        let loaded = Settings::load_from(&path)?;
        std::fs::remove_file(&path)?;
        assert_eq!(loaded, settings);
        Ok(())
    }
}
