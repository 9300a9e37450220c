use serde::{Deserialize, Serialize};

use crate::grid::BeatDivision;

/// Drag actions for the object and blank areas of the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineDrag {
    None,
    // Host drags replayed under controlled modifiers
    L,
    ObjL,
    ObjCtrlL,
    ObjShiftL,
    BkL,
    BkCtrlL,
    AltL,
    // Drags implemented here
    ZoomBi,
    StepBound,
    StepBpm,

    Bypass,
}

impl TimelineDrag {
    pub fn all() -> &'static [TimelineDrag] {
        use TimelineDrag::*;
        &[
            None, L, ObjL, ObjCtrlL, ObjShiftL, BkL, BkCtrlL, AltL, ZoomBi, StepBound, StepBpm,
            Bypass,
        ]
    }

    /// Object-only drags make no sense when starting on a blank area.
    pub fn valid_on_blank(self) -> bool {
        !matches!(
            self,
            TimelineDrag::ObjL | TimelineDrag::ObjCtrlL | TimelineDrag::ObjShiftL
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            TimelineDrag::None => "None",
            TimelineDrag::L => "Default Drag",
            TimelineDrag::ObjL => "Move Object",
            TimelineDrag::ObjCtrlL => "Move Objects (Multi)",
            TimelineDrag::ObjShiftL => "Resize Object",
            TimelineDrag::BkL => "Move Current Frame",
            TimelineDrag::BkCtrlL => "Range Select",
            TimelineDrag::AltL => "Scroll",
            TimelineDrag::ZoomBi => "Zoom Both Axes",
            TimelineDrag::StepBound => "Snap To Boundary",
            TimelineDrag::StepBpm => "Snap To BPM Grid",
            TimelineDrag::Bypass => "Bypass",
        }
    }
}

/// Click and double-click actions for the object and blank areas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineClick {
    None,
    ObjCtrlShiftL,
    ObjLDbl,
    Rclick,
    ToggleMidpt,
    SelectLineLeft,
    SelectLineRight,
    SelectAll,
    SqueezeLeft,
    SqueezeRight,
    ToggleActive,

    Bypass,
}

impl TimelineClick {
    pub fn all() -> &'static [TimelineClick] {
        use TimelineClick::*;
        &[
            None,
            ObjCtrlShiftL,
            ObjLDbl,
            Rclick,
            ToggleMidpt,
            SelectLineLeft,
            SelectLineRight,
            SelectAll,
            SqueezeLeft,
            SqueezeRight,
            ToggleActive,
            Bypass,
        ]
    }

    pub fn valid_on_blank(self) -> bool {
        !matches!(
            self,
            TimelineClick::ObjCtrlShiftL
                | TimelineClick::ObjLDbl
                | TimelineClick::ToggleMidpt
                | TimelineClick::ToggleActive
        )
    }

    /// Double-clicks on blank areas only reject the object forwarding actions.
    pub fn valid_on_blank_double(self) -> bool {
        !matches!(self, TimelineClick::ObjCtrlShiftL | TimelineClick::ObjLDbl)
    }

    pub fn name(&self) -> &'static str {
        match self {
            TimelineClick::None => "None",
            TimelineClick::ObjCtrlShiftL => "Deselect Object",
            TimelineClick::ObjLDbl => "Open Object",
            TimelineClick::Rclick => "Context Menu",
            TimelineClick::ToggleMidpt => "Toggle Mid-point",
            TimelineClick::SelectLineLeft => "Select Left Objects",
            TimelineClick::SelectLineRight => "Select Right Objects",
            TimelineClick::SelectAll => "Select All",
            TimelineClick::SqueezeLeft => "Squeeze Left",
            TimelineClick::SqueezeRight => "Squeeze Right",
            TimelineClick::ToggleActive => "Toggle Active",
            TimelineClick::Bypass => "Bypass",
        }
    }
}

/// Wheel actions, shared by the timeline and the layer area.
/// `*N` variants run the same operation with the wheel delta reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelAction {
    None,
    ScrollHP,
    ScrollHN,
    ScrollVP,
    ScrollVN,
    ZoomHP,
    ZoomHN,
    ZoomVP,
    ZoomVN,
    MoveOneP,
    MoveOneN,
    MoveLenP,
    MoveLenN,
    MoveMidptLayerP,
    MoveMidptLayerN,
    MoveObjLayerP,
    MoveObjLayerN,
    MoveMidptAllP,
    MoveMidptAllN,
    MoveObjAllP,
    MoveObjAllN,
    MoveBpmP,
    MoveBpmN,
    ChangeSceneP,
    ChangeSceneN,

    Bypass,
}

/// What a wheel action does, without its direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WheelOp {
    None,
    ScrollH,
    ScrollV,
    ZoomH,
    ZoomV,
    MoveOne,
    MoveLen,
    StepMidptLayer,
    StepObjLayer,
    StepMidptScene,
    StepObjScene,
    StepBpm,
    ChangeScene,
}

impl WheelAction {
    /// Operation and whether the delta is reversed; `None` means bypass.
    pub fn op(self) -> Option<(WheelOp, bool)> {
        use WheelAction as A;
        let op = match self {
            A::None => (WheelOp::None, false),
            A::ScrollHP => (WheelOp::ScrollH, false),
            A::ScrollHN => (WheelOp::ScrollH, true),
            A::ScrollVP => (WheelOp::ScrollV, false),
            A::ScrollVN => (WheelOp::ScrollV, true),
            A::ZoomHP => (WheelOp::ZoomH, false),
            A::ZoomHN => (WheelOp::ZoomH, true),
            A::ZoomVP => (WheelOp::ZoomV, false),
            A::ZoomVN => (WheelOp::ZoomV, true),
            A::MoveOneP => (WheelOp::MoveOne, false),
            A::MoveOneN => (WheelOp::MoveOne, true),
            A::MoveLenP => (WheelOp::MoveLen, false),
            A::MoveLenN => (WheelOp::MoveLen, true),
            A::MoveMidptLayerP => (WheelOp::StepMidptLayer, false),
            A::MoveMidptLayerN => (WheelOp::StepMidptLayer, true),
            A::MoveObjLayerP => (WheelOp::StepObjLayer, false),
            A::MoveObjLayerN => (WheelOp::StepObjLayer, true),
            A::MoveMidptAllP => (WheelOp::StepMidptScene, false),
            A::MoveMidptAllN => (WheelOp::StepMidptScene, true),
            A::MoveObjAllP => (WheelOp::StepObjScene, false),
            A::MoveObjAllN => (WheelOp::StepObjScene, true),
            A::MoveBpmP => (WheelOp::StepBpm, false),
            A::MoveBpmN => (WheelOp::StepBpm, true),
            A::ChangeSceneP => (WheelOp::ChangeScene, false),
            A::ChangeSceneN => (WheelOp::ChangeScene, true),
            A::Bypass => return None,
        };
        Some(op)
    }

    pub fn category(&self) -> &'static str {
        match self.op() {
            None | Some((WheelOp::None, _)) => "Other",
            Some((WheelOp::ScrollH | WheelOp::ScrollV, _)) => "Scroll",
            Some((WheelOp::ZoomH | WheelOp::ZoomV, _)) => "Zoom",
            Some((WheelOp::ChangeScene, _)) => "Scene",
            Some(_) => "Navigation",
        }
    }
}

/// Drag actions for the layer header area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerDrag {
    None,
    ShowHide,
    LockUnlock,
    LinkCoord,
    MaskAbove,
    SelectAll,
    DragMove,

    Bypass,
}

impl LayerDrag {
    pub fn all() -> &'static [LayerDrag] {
        use LayerDrag::*;
        &[None, ShowHide, LockUnlock, LinkCoord, MaskAbove, SelectAll, DragMove, Bypass]
    }

    pub fn name(&self) -> &'static str {
        match self {
            LayerDrag::None => "None",
            LayerDrag::ShowHide => "Show / Hide",
            LayerDrag::LockUnlock => "Lock / Unlock",
            LayerDrag::LinkCoord => "Link Coordinates",
            LayerDrag::MaskAbove => "Clip By Upper Object",
            LayerDrag::SelectAll => "Select Layer Objects",
            LayerDrag::DragMove => "Reorder Layers",
            LayerDrag::Bypass => "Bypass",
        }
    }
}

/// Click and double-click actions for the layer header area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerClick {
    None,
    Rclick,
    Rename,
    ToggleOthers,
    Insert,
    Remove,

    Bypass,
}

impl LayerClick {
    pub fn all() -> &'static [LayerClick] {
        use LayerClick::*;
        &[None, Rclick, Rename, ToggleOthers, Insert, Remove, Bypass]
    }
}

/// Frame around which horizontal zoom pivots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomCenter {
    CurrFrame,
    WindowLeft,
    WindowCenter,
    WindowRight,
    Mouse,
}

/// Grid step chosen per modifier combination for BPM snapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BpmStep {
    /// `1 / n` of a beat.
    Beats(u8),
    /// `n` whole measures.
    Measures(u8),
}

impl BpmStep {
    pub fn division(self) -> BeatDivision {
        match self {
            BpmStep::Beats(n) => BeatDivision::Fraction {
                numer: 1,
                denom: n.max(1) as i32,
            },
            BpmStep::Measures(n) => BeatDivision::Measures(n.max(1) as i32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_variants_pair_up() {
        assert_eq!(WheelAction::ZoomHN.op(), Some((WheelOp::ZoomH, true)));
        assert_eq!(WheelAction::MoveBpmP.op(), Some((WheelOp::StepBpm, false)));
        assert_eq!(WheelAction::Bypass.op(), None);
        assert_eq!(WheelAction::None.op(), Some((WheelOp::None, false)));
    }

    #[test]
    fn snake_case_names_round_trip() {
        let json = serde_json::to_string(&TimelineDrag::ObjShiftL).unwrap();
        assert_eq!(json, "\"obj_shift_l\"");
        let json = serde_json::to_string(&WheelAction::MoveMidptLayerN).unwrap();
        assert_eq!(json, "\"move_midpt_layer_n\"");
        let step: BpmStep = serde_json::from_str(r#"{"measures":2}"#).unwrap();
        assert_eq!(step.division(), BeatDivision::Measures(2));
    }

    #[test]
    fn blank_filters() {
        assert!(!TimelineDrag::ObjL.valid_on_blank());
        assert!(TimelineDrag::BkL.valid_on_blank());
        assert!(!TimelineClick::ToggleMidpt.valid_on_blank());
        assert!(TimelineClick::ToggleMidpt.valid_on_blank_double());
        assert!(TimelineDrag::all().contains(&TimelineDrag::StepBpm));
    }
}
