//! Placement heuristics: anchor point, base scale and base roll for each
//! accessory archetype.
//!
//! One data-driven table keyed by archetype replaces per-accessory update
//! code. All ratios are load-bearing for visual parity; change them and
//! accessories drift off the face.

use crate::accessories::Archetype;
use crate::constants::{
    CHIN, FOREHEAD_TOP, LEFT_EYE_OUTER, LOWER_LIP, NOSE_TIP, RIGHT_EYE_OUTER, UPPER_LIP,
};
use crate::projection::LandmarkProjector;
use crate::tracking::TrackedFrame;
use nalgebra::Vector3;

/// Facial feature an accessory anchors to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorReference {
    /// Midpoint between the outer eye corners (glasses)
    EyeCenter,
    /// Eye center x, midway between eyes and nose tip vertically (masks)
    FaceCenter,
    /// Mouth center x, upper lip y (mustaches)
    UpperLip,
    /// Mouth center x, chin y (beards)
    Chin,
    /// Eye center x, forehead top y (hats, hair)
    Forehead,
    /// Fixed screen-horizontal center, chin y (clothing)
    TorsoCenter,
}

/// Numeric placement parameters for one accessory
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementParams {
    pub reference: AnchorReference,
    /// Vertical offset from the reference, in eye-distance units (negative
    /// moves up on screen)
    pub vertical_bias: f32,
    /// Fixed depth offset in world units, applied after the gesture offset
    pub depth_bias: f32,
    /// Base scale per eye-distance unit
    pub scale_factor: f32,
    /// Fraction of the interocular roll transferred to the accessory
    pub roll_factor: f32,
}

impl PlacementParams {
    /// Default parameters for an archetype; `None` for avatars, which are
    /// placed by the rig synchronizer instead
    #[must_use]
    pub fn for_archetype(archetype: Archetype) -> Option<Self> {
        let params = match archetype {
            Archetype::Glasses => Self {
                reference: AnchorReference::EyeCenter,
                vertical_bias: 0.0,
                depth_bias: 0.0,
                scale_factor: 1.5,
                roll_factor: 0.5,
            },
            Archetype::FacialHair => Self {
                reference: AnchorReference::UpperLip,
                vertical_bias: -0.05,
                depth_bias: 0.0,
                scale_factor: 1.0,
                roll_factor: 0.5,
            },
            Archetype::Mask => Self {
                reference: AnchorReference::FaceCenter,
                vertical_bias: 0.0,
                depth_bias: 0.0,
                scale_factor: 2.0,
                roll_factor: 0.5,
            },
            Archetype::Hat => Self {
                reference: AnchorReference::Forehead,
                vertical_bias: -0.4,
                depth_bias: -0.15,
                scale_factor: 1.6,
                roll_factor: 0.5,
            },
            Archetype::Hair => Self {
                reference: AnchorReference::Forehead,
                vertical_bias: -0.3,
                depth_bias: 0.0,
                scale_factor: 1.8,
                roll_factor: 0.5,
            },
            Archetype::Clothing => Self {
                reference: AnchorReference::TorsoCenter,
                vertical_bias: 0.8,
                depth_bias: 0.0,
                scale_factor: 2.5,
                roll_factor: 0.0,
            },
            Archetype::Avatar => return None,
        };
        Some(params)
    }
}

/// Face measurements shared by every placement rule, in normalized viewport
/// coordinates
#[derive(Debug, Clone, Copy)]
pub struct FaceMetrics {
    pub eye_center_u: f32,
    pub eye_center_v: f32,
    /// Horizontal distance between the outer eye corners; the universal
    /// scale reference
    pub eye_distance: f32,
    /// Interocular roll angle in radians
    pub eye_angle: f32,
    pub mouth_center_u: f32,
    pub upper_lip_v: f32,
    pub chin_v: f32,
    pub forehead_v: f32,
    pub nose_v: f32,
    pub nose_z: f32,
}

impl FaceMetrics {
    /// Derive metrics from a detected face; `None` when the frame carries no
    /// face
    #[must_use]
    pub fn from_frame(frame: &TrackedFrame, projector: &LandmarkProjector) -> Option<Self> {
        if !frame.has_face() {
            return None;
        }

        let left_eye = projector.project(frame.landmark(LEFT_EYE_OUTER)?);
        let right_eye = projector.project(frame.landmark(RIGHT_EYE_OUTER)?);
        let nose = projector.project(frame.landmark(NOSE_TIP)?);
        let upper_lip = projector.project(frame.landmark(UPPER_LIP)?);
        let lower_lip = projector.project(frame.landmark(LOWER_LIP)?);
        let chin = projector.project(frame.landmark(CHIN)?);
        let forehead = projector.project(frame.landmark(FOREHEAD_TOP)?);

        Some(Self {
            eye_center_u: (left_eye.u + right_eye.u) / 2.0,
            eye_center_v: (left_eye.v + right_eye.v) / 2.0,
            eye_distance: (right_eye.u - left_eye.u).abs(),
            eye_angle: (right_eye.v - left_eye.v).atan2(right_eye.u - left_eye.u),
            mouth_center_u: (upper_lip.u + lower_lip.u) / 2.0,
            upper_lip_v: upper_lip.v,
            chin_v: chin.v,
            forehead_v: forehead.v,
            nose_v: nose.v,
            nose_z: nose.z,
        })
    }
}

/// A computed accessory placement before user offsets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub anchor: Vector3<f32>,
    pub base_scale: f32,
    /// Planar roll in radians, composed additively with the manual z
    /// rotation offset
    pub base_roll: f32,
}

/// Evaluate one placement rule against the current face metrics
#[must_use]
pub fn place(
    params: &PlacementParams,
    metrics: &FaceMetrics,
    projector: &LandmarkProjector,
) -> Placement {
    let (u, v) = match params.reference {
        AnchorReference::EyeCenter => (metrics.eye_center_u, metrics.eye_center_v),
        AnchorReference::FaceCenter => (
            metrics.eye_center_u,
            (metrics.eye_center_v + metrics.nose_v) / 2.0,
        ),
        AnchorReference::UpperLip => (metrics.mouth_center_u, metrics.upper_lip_v),
        AnchorReference::Chin => (metrics.mouth_center_u, metrics.chin_v),
        AnchorReference::Forehead => (metrics.eye_center_u, metrics.forehead_v),
        AnchorReference::TorsoCenter => (0.5, metrics.chin_v),
    };
    let v = v + params.vertical_bias * metrics.eye_distance;

    let mut anchor = projector.to_world(u, v, metrics.nose_z);
    anchor.z += params.depth_bias;

    Placement {
        anchor,
        base_scale: metrics.eye_distance * params.scale_factor,
        base_roll: metrics.eye_angle * params.roll_factor,
    }
}
