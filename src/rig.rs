//! Skeletal rig synchronization: tracked head pose and expression weights
//! mapped onto a loaded bone hierarchy, with an idle-breathing layer on top.
//!
//! Bone and morph-channel names are whatever the loaded asset happens to
//! expose; every lookup defaults to "absent = no-op" so differing rig
//! exports degrade gracefully instead of erroring.

use crate::accessories::AccessoryState;
use crate::assets::LoadedAsset;
use crate::config::RigConfig;
use crate::constants::{
    AVATAR_BASE_Y, AVATAR_REST_SCALE, AVATAR_REST_Y, LEFT_EYE_OUTER, LOWER_SPINE_DAMP,
    NECK_ROTATION_DIVISOR, RIGHT_EYE_OUTER, TORSO_LEAN_DIVISOR,
};
use crate::scene::{NodeId, Scene};
use crate::tracking::TrackedFrame;
use nalgebra::Vector3;
use std::collections::HashMap;

/// Mesh node names that expose expression morph channels
pub const EXPRESSION_MESH_NAMES: [&str; 5] = [
    "Wolf3D_Head",
    "Wolf3D_Teeth",
    "Wolf3D_Beard",
    "Wolf3D_Avatar",
    "Wolf3D_Head_Custom",
];

/// One loaded avatar rig bound to an accessory entry
#[derive(Debug)]
pub struct AvatarRig {
    accessory_id: String,
    calibration_factor: f32,
    root: Option<NodeId>,
    nodes_by_name: HashMap<String, NodeId>,
    expression_meshes: Vec<NodeId>,
    calibrated_scale: Option<f32>,
    breathing_phase: f32,
    generation: u64,
}

impl AvatarRig {
    #[must_use]
    pub fn new(accessory_id: impl Into<String>, calibration_factor: f32) -> Self {
        Self {
            accessory_id: accessory_id.into(),
            calibration_factor,
            root: None,
            nodes_by_name: HashMap::new(),
            expression_meshes: Vec::new(),
            calibrated_scale: None,
            breathing_phase: 0.0,
            generation: 0,
        }
    }

    #[must_use]
    pub fn accessory_id(&self) -> &str {
        &self.accessory_id
    }

    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.root.is_some()
    }

    #[must_use]
    pub fn calibrated_scale(&self) -> Option<f32> {
        self.calibrated_scale
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record the generation of the load currently desired; completions
    /// carrying any other generation are stale and will be discarded
    pub fn begin_load(&mut self, generation: u64) {
        self.generation = generation;
    }

    /// Force the next tracked frame to recompute the interocular scale
    pub fn reset_calibration(&mut self) {
        self.calibrated_scale = None;
    }

    /// Commit a finished load into the scene. Returns false (and changes
    /// nothing) when the completion is stale.
    pub fn commit(&mut self, scene: &mut Scene, generation: u64, asset: &LoadedAsset) -> bool {
        if generation != self.generation {
            log::debug!(
                "Discarding stale load for {} (generation {generation}, want {})",
                self.accessory_id,
                self.generation
            );
            return false;
        }

        if let Some(old_root) = self.root.take() {
            scene.remove_subtree(old_root);
        }
        self.nodes_by_name.clear();
        self.expression_meshes.clear();
        self.calibrated_scale = None;

        let ids = asset.instantiate(scene, None);
        for &id in &ids {
            let Some(node) = scene.node(id) else { continue };
            self.nodes_by_name.insert(node.name.clone(), id);
            if EXPRESSION_MESH_NAMES.contains(&node.name.as_str()) {
                self.expression_meshes.push(id);
            }
        }
        self.root = ids.first().copied();

        // Rest pose until tracking takes over
        if let Some(root) = self.root.and_then(|id| scene.node_mut(id)) {
            root.transform.position = Vector3::new(0.0, AVATAR_REST_Y, 0.0);
            root.transform.scale = Vector3::repeat(AVATAR_REST_SCALE);
            root.visible = false;
        }

        log::info!(
            "Rig {} loaded with {} nodes ({} expression meshes)",
            self.accessory_id,
            ids.len(),
            self.expression_meshes.len()
        );
        true
    }

    /// Show or hide the whole rig
    pub fn set_visible(&self, scene: &mut Scene, visible: bool) {
        if let Some(root) = self.root {
            scene.set_visible(root, visible);
        }
    }

    /// Drive the rig from one tracked frame. Called only while the avatar is
    /// active and a face is detected.
    pub fn sync(
        &mut self,
        scene: &mut Scene,
        frame: &TrackedFrame,
        state: &AccessoryState,
        config: &RigConfig,
    ) {
        let Some(root) = self.root else { return };

        self.breathing_phase += config.breath_phase_step;

        // Scale calibration runs once per activation; raw (uncropped)
        // landmark space is the right reference for body proportions
        if self.calibrated_scale.is_none() {
            if let (Some(left), Some(right)) = (
                frame.landmark(LEFT_EYE_OUTER),
                frame.landmark(RIGHT_EYE_OUTER),
            ) {
                self.calibrated_scale = Some(left.distance(&right) * self.calibration_factor);
            }
        }

        let base_scale = self.calibrated_scale.unwrap_or(config.fallback_scale);
        let final_scale = base_scale * state.scale_offset;

        if let Some(node) = scene.node_mut(root) {
            node.transform.scale = Vector3::repeat(final_scale);
            node.transform.position = Vector3::new(
                state.position_offset.x,
                AVATAR_BASE_Y + state.position_offset.y,
                state.position_offset.z,
            );
            // The root rotation is a manual override, not tracked-driven
            node.transform.rotation = state.rotation_offset;
        }

        self.apply_expressions(scene, frame);
        self.apply_pose(scene, frame, config);
    }

    fn apply_expressions(&self, scene: &mut Scene, frame: &TrackedFrame) {
        if frame.expressions.is_empty() || self.expression_meshes.is_empty() {
            return;
        }
        for weight in &frame.expressions {
            for &mesh_id in &self.expression_meshes {
                if let Some(morph) = scene.node_mut(mesh_id).and_then(|n| n.morph.as_mut()) {
                    morph.set_influence(&weight.name, weight.score);
                }
            }
        }
    }

    fn apply_pose(&self, scene: &mut Scene, frame: &TrackedFrame, config: &RigConfig) {
        let breath =
            (self.breathing_phase * config.breath_rate).sin() * config.breath_intensity;

        // Low spine segments carry a damped fraction of the oscillation
        for name in ["Spine", "Spine1"] {
            if let Some(node) = self.bone_mut(scene, name) {
                node.transform.rotation.x = breath * LOWER_SPINE_DAMP;
            }
        }

        let Some(rotation) = frame.rotation else { return };

        // Mid spine leans with a tenth of the head rotation, added to its
        // breathing term
        if let Some(node) = self.bone_mut(scene, "Spine2") {
            node.transform.rotation = Vector3::new(
                rotation.x / TORSO_LEAN_DIVISOR + breath,
                -rotation.y / TORSO_LEAN_DIVISOR,
                -rotation.z / TORSO_LEAN_DIVISOR,
            );
        }

        // Head takes the tracked rotation directly, sign-flipped for the
        // mirrored camera view
        if let Some(node) = self.bone_mut(scene, "Head") {
            node.transform.rotation = Vector3::new(rotation.x, -rotation.y, -rotation.z);
        }

        if let Some(node) = self.bone_mut(scene, "Neck") {
            node.transform.rotation = Vector3::new(
                rotation.x / NECK_ROTATION_DIVISOR + config.neck_forward_tilt,
                -rotation.y / NECK_ROTATION_DIVISOR,
                -rotation.z / NECK_ROTATION_DIVISOR,
            );
        }
    }

    fn bone_mut<'a>(
        &self,
        scene: &'a mut Scene,
        name: &str,
    ) -> Option<&'a mut crate::scene::SceneNode> {
        self.nodes_by_name
            .get(name)
            .and_then(|&id| scene.node_mut(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::humanoid_asset;
    use crate::constants::MIN_FACE_LANDMARKS;
    use crate::tracking::{ExpressionWeight, HeadRotation, Landmark};

    fn loaded_rig(scene: &mut Scene) -> AvatarRig {
        let mut rig = AvatarRig::new("avatar", 32.0);
        rig.begin_load(1);
        assert!(rig.commit(scene, 1, &humanoid_asset()));
        rig
    }

    fn face_frame() -> TrackedFrame {
        let mut landmarks = vec![Landmark { x: 0.5, y: 0.5, z: 0.0 }; MIN_FACE_LANDMARKS];
        landmarks[LEFT_EYE_OUTER] = Landmark { x: 0.46, y: 0.45, z: 0.0 };
        landmarks[RIGHT_EYE_OUTER] = Landmark { x: 0.54, y: 0.45, z: 0.0 };
        TrackedFrame {
            landmarks,
            rotation: Some(HeadRotation { x: 0.2, y: -0.1, z: 0.05 }),
            ..TrackedFrame::default()
        }
    }

    #[test]
    fn test_commit_builds_node_index() {
        let mut scene = Scene::new();
        let rig = loaded_rig(&mut scene);
        assert!(rig.is_loaded());
        assert_eq!(rig.expression_meshes.len(), 2); // Wolf3D_Head, Wolf3D_Teeth

        let root = scene.node(rig.root().unwrap()).unwrap();
        assert_eq!(root.transform.position.y, AVATAR_REST_Y);
        assert_eq!(root.transform.scale.x, AVATAR_REST_SCALE);
    }

    #[test]
    fn test_stale_commit_is_discarded() {
        let mut scene = Scene::new();
        let mut rig = AvatarRig::new("avatar", 32.0);
        rig.begin_load(2);
        assert!(!rig.commit(&mut scene, 1, &humanoid_asset()));
        assert!(!rig.is_loaded());
        assert!(scene.is_empty());

        assert!(rig.commit(&mut scene, 2, &humanoid_asset()));
        assert!(rig.is_loaded());
    }

    #[test]
    fn test_calibration_runs_once() {
        let mut scene = Scene::new();
        let mut rig = loaded_rig(&mut scene);
        let state = AccessoryState::default();
        let config = RigConfig::default();

        rig.sync(&mut scene, &face_frame(), &state, &config);
        let first = rig.calibrated_scale().unwrap();
        assert!((first - 0.08 * 32.0).abs() < 1e-4);

        // A frame with wider eyes must not change the calibrated scale
        let mut wider = face_frame();
        wider.landmarks[LEFT_EYE_OUTER].x = 0.40;
        wider.landmarks[RIGHT_EYE_OUTER].x = 0.60;
        rig.sync(&mut scene, &wider, &state, &config);
        assert_eq!(rig.calibrated_scale(), Some(first));

        // Reactivation recalibrates
        rig.reset_calibration();
        rig.sync(&mut scene, &wider, &state, &config);
        assert!((rig.calibrated_scale().unwrap() - 0.2 * 32.0).abs() < 1e-4);
    }

    #[test]
    fn test_root_transform_composes_offsets() {
        let mut scene = Scene::new();
        let mut rig = loaded_rig(&mut scene);
        let mut state = AccessoryState::default();
        state.scale_offset = 2.0;
        state.position_offset = Vector3::new(0.1, 0.2, 0.3);
        state.rotation_offset = Vector3::new(0.0, 0.5, 0.0);

        rig.sync(&mut scene, &face_frame(), &state, &RigConfig::default());

        let root = scene.node(rig.root().unwrap()).unwrap();
        let expected_scale = 0.08 * 32.0 * 2.0;
        assert!((root.transform.scale.x - expected_scale).abs() < 1e-3);
        assert!((root.transform.position.y - (AVATAR_BASE_Y + 0.2)).abs() < 1e-6);
        assert_eq!(root.transform.rotation, state.rotation_offset);
    }

    #[test]
    fn test_head_and_neck_follow_tracked_rotation() {
        let mut scene = Scene::new();
        let mut rig = loaded_rig(&mut scene);
        rig.sync(
            &mut scene,
            &face_frame(),
            &AccessoryState::default(),
            &RigConfig::default(),
        );

        let head_id = rig.nodes_by_name["Head"];
        let head = scene.node(head_id).unwrap();
        assert!((head.transform.rotation.x - 0.2).abs() < 1e-6);
        assert!((head.transform.rotation.y - 0.1).abs() < 1e-6); // sign flip
        assert!((head.transform.rotation.z + 0.05).abs() < 1e-6);

        let neck_id = rig.nodes_by_name["Neck"];
        let neck = scene.node(neck_id).unwrap();
        assert!((neck.transform.rotation.x - (0.2 / 5.0 + 0.3)).abs() < 1e-6);
    }

    #[test]
    fn test_breathing_oscillates_spine() {
        let mut scene = Scene::new();
        let mut rig = loaded_rig(&mut scene);
        let state = AccessoryState::default();
        let config = RigConfig::default();
        let spine_id = rig.nodes_by_name["Spine"];

        let mut samples = Vec::new();
        for _ in 0..200 {
            rig.sync(&mut scene, &face_frame(), &state, &config);
            samples.push(scene.node(spine_id).unwrap().transform.rotation.x);
        }

        let max = samples.iter().cloned().fold(f32::MIN, f32::max);
        let min = samples.iter().cloned().fold(f32::MAX, f32::min);
        assert!(max > 0.0 && min < 0.0, "spine should oscillate around zero");
        let bound = config.breath_intensity * LOWER_SPINE_DAMP + 1e-6;
        assert!(max <= bound && min >= -bound);
    }

    #[test]
    fn test_expressions_map_to_matching_channels_only() {
        let mut scene = Scene::new();
        let mut rig = loaded_rig(&mut scene);
        let mut frame = face_frame();
        frame.expressions = vec![
            ExpressionWeight { name: "jawOpen".to_string(), score: 0.6 },
            ExpressionWeight { name: "noSuchChannel".to_string(), score: 1.0 },
        ];

        rig.sync(
            &mut scene,
            &frame,
            &AccessoryState::default(),
            &RigConfig::default(),
        );

        let head_mesh = rig.nodes_by_name["Wolf3D_Head"];
        let morph = scene.node(head_mesh).unwrap().morph.as_ref().unwrap();
        assert_eq!(morph.influence("jawOpen"), Some(0.6));
        assert_eq!(morph.influence("noSuchChannel"), None);

        let teeth = rig.nodes_by_name["Wolf3D_Teeth"];
        let teeth_morph = scene.node(teeth).unwrap().morph.as_ref().unwrap();
        assert_eq!(teeth_morph.influence("jawOpen"), Some(0.6));
    }

    #[test]
    fn test_missing_bones_are_skipped() {
        let mut scene = Scene::new();
        let mut rig = AvatarRig::new("header", 30.0);
        rig.begin_load(1);

        // Head-only asset without a spine chain
        let asset = LoadedAsset {
            nodes: vec![
                crate::assets::LoadedNode {
                    name: "Armature".to_string(),
                    parent: None,
                    morph_channels: Vec::new(),
                },
                crate::assets::LoadedNode {
                    name: "Head".to_string(),
                    parent: Some(0),
                    morph_channels: Vec::new(),
                },
            ],
        };
        assert!(rig.commit(&mut scene, 1, &asset));

        // Must not panic despite Spine/Neck being absent
        rig.sync(
            &mut scene,
            &face_frame(),
            &AccessoryState::default(),
            &RigConfig::default(),
        );
        let head = scene.node(rig.nodes_by_name["Head"]).unwrap();
        assert!((head.transform.rotation.x - 0.2).abs() < 1e-6);
    }
}
