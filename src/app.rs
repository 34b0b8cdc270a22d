//! Render loop driver: per-frame orchestration of the full overlay pipeline.
//!
//! One [`OverlayApp::tick`] call runs per display refresh, independent of any
//! UI update cycle: drain finished asset loads, pull the latest tracked
//! frame, place every active accessory, synchronize every active avatar rig
//! and submit a single render call. When no subject is detected the tick
//! degrades to a cheap hide-everything frame.

use crate::accessories::{builtin_manifest, AccessoryDescriptor, AccessoryStore, LoadStatus};
use crate::anchors::{place, FaceMetrics};
use crate::assets::AssetLoader;
use crate::config::Config;
use crate::constants::DEFAULT_CALIBRATION_FACTOR;
use crate::gestures::{GestureController, GestureEvent};
use crate::projection::LandmarkProjector;
use crate::rig::AvatarRig;
use crate::scene::{Camera, NodeId, Renderer, Scene, Transform};
use crate::tracking::TrackedFrame;
use crate::{Error, Result};
use log::{info, warn};
use nalgebra::Vector3;
use std::collections::HashMap;

/// What a pending load will populate once it completes
#[derive(Debug, Clone)]
enum LoadTarget {
    Accessory(String),
    Rig(String),
}

/// The composed overlay application
pub struct OverlayApp<L: AssetLoader, R: Renderer> {
    config: Config,
    store: AccessoryStore,
    gestures: GestureController,
    scene: Scene,
    camera: Camera,
    renderer: R,
    loader: L,
    rigs: HashMap<String, AvatarRig>,
    groups: HashMap<String, NodeId>,
    pending: HashMap<u64, LoadTarget>,
    next_generation: u64,
    container: (u32, u32),
    video_size: Option<(u32, u32)>,
    face_detected: bool,
}

impl<L: AssetLoader, R: Renderer> OverlayApp<L, R> {
    /// Build the application around a manifest, probing asset availability
    /// and starting accessory model loads
    pub fn new(
        config: Config,
        descriptors: Vec<AccessoryDescriptor>,
        mut loader: L,
        renderer: R,
        container: (u32, u32),
    ) -> Result<Self> {
        config.validate()?;
        info!("Initializing overlay pipeline");

        let camera = Camera::new(
            config.projection.fov_degrees,
            container.0 as f32 / container.1 as f32,
            config.projection.anchor_distance,
        );

        let mut store = AccessoryStore::new(descriptors);
        let mut scene = Scene::new();
        let mut rigs = HashMap::new();
        let mut groups = HashMap::new();
        let mut pending = HashMap::new();
        let mut next_generation = 0u64;

        // Hide manifest entries whose asset is unreachable
        let probed: Vec<(String, bool)> = store
            .iter()
            .map(|e| (e.descriptor.id.clone(), loader.probe(&e.descriptor.asset)))
            .collect();
        for (id, available) in probed {
            if !available {
                info!("Hiding {id}: asset not found");
                store.set_available(&id, false);
            }
        }

        // Accessory props get an empty group node each and load eagerly;
        // avatars get a rig record and load lazily on first activation
        let setup: Vec<(String, String, bool, Option<f32>, bool)> = store
            .iter()
            .map(|e| {
                (
                    e.descriptor.id.clone(),
                    e.descriptor.asset.clone(),
                    e.descriptor.archetype.is_avatar(),
                    e.descriptor.calibration_factor,
                    e.state.available,
                )
            })
            .collect();
        for (id, asset, is_avatar, calibration, available) in setup {
            if is_avatar {
                rigs.insert(
                    id.clone(),
                    AvatarRig::new(id.clone(), calibration.unwrap_or(DEFAULT_CALIBRATION_FACTOR)),
                );
                continue;
            }

            let group = scene.add_node(id.clone(), None);
            scene.set_visible(group, false);
            groups.insert(id.clone(), group);

            if available {
                next_generation += 1;
                loader.begin(&asset, next_generation);
                pending.insert(next_generation, LoadTarget::Accessory(id.clone()));
                store.set_load_status(&id, LoadStatus::Loading);
            }
        }

        Ok(Self {
            gestures: GestureController::new(config.gestures),
            config,
            store,
            scene,
            camera,
            renderer,
            loader,
            rigs,
            groups,
            pending,
            next_generation,
            container,
            video_size: None,
            face_detected: false,
        })
    }

    /// Build the application with the built-in accessory catalog
    pub fn with_builtin_manifest(
        config: Config,
        loader: L,
        renderer: R,
        container: (u32, u32),
    ) -> Result<Self> {
        Self::new(config, builtin_manifest(), loader, renderer, container)
    }

    /// Run one frame of the pipeline
    pub fn tick(&mut self, frame: Option<&TrackedFrame>) {
        self.drain_loads();

        if let Some(size) = frame.and_then(|f| f.video_size) {
            self.video_size = Some(size);
        }
        self.face_detected = frame.is_some_and(TrackedFrame::has_face);

        if self.face_detected {
            if let Some(frame) = frame {
                self.update_accessories(frame);
                self.sync_rigs(frame);
            }
        }

        self.update_visibility();
        self.renderer.render(&self.scene, &self.camera);
    }

    /// Propagate a container resize to the camera and renderer
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == self.container || width == 0 || height == 0 {
            return;
        }
        self.container = (width, height);
        self.camera.set_aspect(width as f32 / height as f32);
        self.renderer.resize(width, height);
    }

    /// Route one gesture event to the selected accessory
    pub fn handle_gesture(&mut self, event: &GestureEvent) {
        self.gestures
            .handle(event, &mut self.store, self.face_detected);
    }

    /// Flip an accessory between inactive and active
    pub fn toggle_accessory(&mut self, id: &str) -> Result<()> {
        let outcome = self
            .store
            .toggle(id)
            .ok_or_else(|| Error::UnknownAccessory(id.to_string()))?;

        if outcome.archetype.is_avatar() && outcome.now_active {
            // Reactivation always recalibrates; load on first activation
            if let Some(rig) = self.rigs.get_mut(id) {
                rig.reset_calibration();
            }
            let needs_load = self
                .store
                .get(id)
                .is_some_and(|e| !matches!(e.state.load, LoadStatus::Loading | LoadStatus::Loaded));
            if needs_load {
                self.begin_rig_load(id)?;
            }
        }
        Ok(())
    }

    /// Make an accessory the sole editing target, forcing it active first
    pub fn select_for_editing(&mut self, id: &str) -> Result<()> {
        let entry = self
            .store
            .get(id)
            .ok_or_else(|| Error::UnknownAccessory(id.to_string()))?;
        let was_active = entry.state.is_active;
        let is_avatar = entry.descriptor.archetype.is_avatar();
        let needs_load = !matches!(entry.state.load, LoadStatus::Loading | LoadStatus::Loaded);

        if !self.store.select_for_editing(id) {
            return Err(Error::AssetUnavailable(id.to_string()));
        }

        // Forcing an avatar active behaves like an activation toggle
        if !was_active && is_avatar {
            if let Some(rig) = self.rigs.get_mut(id) {
                rig.reset_calibration();
            }
            if needs_load {
                self.begin_rig_load(id)?;
            }
        }
        Ok(())
    }

    /// Deactivate everything and reset every offset
    pub fn clear_all(&mut self) {
        self.store.clear_all();
    }

    /// Reset the selected accessory's offsets
    pub fn reset_adjustments(&mut self) {
        self.store.reset_adjustments();
    }

    /// Reset the selected accessory's rotation offsets
    pub fn reset_rotation(&mut self) {
        self.store.reset_rotation();
    }

    /// Point an avatar entry at a different model source. A load already in
    /// flight for the old source becomes stale and will be discarded.
    pub fn set_avatar_source(&mut self, id: &str, source: &str) -> Result<()> {
        let entry = self
            .store
            .get_mut(id)
            .ok_or_else(|| Error::UnknownAccessory(id.to_string()))?;
        if !entry.descriptor.archetype.is_avatar() {
            return Err(Error::InvalidInput(format!(
                "{id} is not an avatar accessory"
            )));
        }

        entry.descriptor.asset = source.to_string();
        let active = entry.state.is_active;
        entry.state.load = LoadStatus::NotLoaded;

        if let Some(rig) = self.rigs.get_mut(id) {
            rig.reset_calibration();
        }
        if active {
            self.begin_rig_load(id)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn face_detected(&self) -> bool {
        self.face_detected
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.store.active_count()
    }

    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.store.loaded_count()
    }

    #[must_use]
    pub fn store(&self) -> &AccessoryStore {
        &self.store
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The selected accessory's current scene transform, if it has a node
    #[must_use]
    pub fn selected_transform(&self) -> Option<(&str, &Transform)> {
        let entry = self.store.selected()?;
        let id = entry.descriptor.id.as_str();
        let node_id = match self.groups.get(id) {
            Some(&group) => group,
            None => self.rigs.get(id)?.root()?,
        };
        Some((id, &self.scene.node(node_id)?.transform))
    }

    fn begin_rig_load(&mut self, id: &str) -> Result<()> {
        let asset = self
            .store
            .get(id)
            .ok_or_else(|| Error::UnknownAccessory(id.to_string()))?
            .descriptor
            .asset
            .clone();

        self.next_generation += 1;
        let generation = self.next_generation;
        if let Some(rig) = self.rigs.get_mut(id) {
            rig.begin_load(generation);
        }
        self.loader.begin(&asset, generation);
        self.pending
            .insert(generation, LoadTarget::Rig(id.to_string()));
        self.store.set_load_status(id, LoadStatus::Loading);
        info!("Loading rig {id} from {asset}");
        Ok(())
    }

    fn drain_loads(&mut self) {
        for completion in self.loader.poll_completed() {
            let Some(target) = self.pending.remove(&completion.generation) else {
                continue;
            };

            match target {
                LoadTarget::Accessory(id) => match completion.result {
                    Ok(asset) => {
                        if let Some(&group) = self.groups.get(&id) {
                            asset.instantiate(&mut self.scene, Some(group));
                        }
                        self.store.set_load_status(&id, LoadStatus::Loaded);
                        info!("Loaded model for {id}");
                    }
                    Err(e) => {
                        self.store.set_load_status(&id, LoadStatus::Failed);
                        warn!("Error loading {id}: {e}");
                    }
                },
                LoadTarget::Rig(id) => {
                    let Some(rig) = self.rigs.get_mut(&id) else {
                        continue;
                    };
                    match completion.result {
                        Ok(asset) => {
                            if rig.commit(&mut self.scene, completion.generation, &asset) {
                                self.store.set_load_status(&id, LoadStatus::Loaded);
                            }
                        }
                        Err(e) => {
                            // A stale failure must not mark the newer load
                            // as failed
                            if completion.generation == rig.generation() {
                                self.store.set_load_status(&id, LoadStatus::Failed);
                                warn!("Error loading rig {id}: {e}");
                            }
                        }
                    }
                }
            }
        }
    }

    fn update_accessories(&mut self, frame: &TrackedFrame) {
        let projector = LandmarkProjector::new(
            self.container,
            self.video_size,
            &self.camera,
            self.config.projection.anchor_distance,
            self.config.projection.depth_scale,
        );
        let Some(metrics) = FaceMetrics::from_frame(frame, &projector) else {
            return;
        };

        for entry in self.store.iter() {
            if !entry.state.is_active || entry.state.load != LoadStatus::Loaded {
                continue;
            }
            let Some(params) = entry.descriptor.placement_params() else {
                continue;
            };
            let Some(&group) = self.groups.get(&entry.descriptor.id) else {
                continue;
            };
            let Some(node) = self.scene.node_mut(group) else {
                continue;
            };

            let placement = place(&params, &metrics, &projector);
            let state = &entry.state;
            node.transform.position = placement.anchor + state.position_offset;
            node.transform.scale = Vector3::repeat(placement.base_scale * state.scale_offset);
            node.transform.rotation = Vector3::new(
                state.rotation_offset.x,
                state.rotation_offset.y,
                placement.base_roll + state.rotation_offset.z,
            );
        }
    }

    fn sync_rigs(&mut self, frame: &TrackedFrame) {
        for rig in self.rigs.values_mut() {
            let Some(entry) = self.store.get(rig.accessory_id()) else {
                continue;
            };
            if !entry.state.is_active || entry.state.load != LoadStatus::Loaded {
                continue;
            }
            rig.sync(&mut self.scene, frame, &entry.state, &self.config.rig);
        }
    }

    fn update_visibility(&mut self) {
        for entry in self.store.iter() {
            let visible = entry.state.is_active
                && self.face_detected
                && entry.state.load == LoadStatus::Loaded;
            let id = entry.descriptor.id.as_str();

            if let Some(&group) = self.groups.get(id) {
                self.scene.set_visible(group, visible);
            } else if let Some(rig) = self.rigs.get(id) {
                rig.set_visible(&mut self.scene, visible);
            }
        }
    }
}
