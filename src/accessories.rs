//! Accessory descriptors, per-object run-time state and the selection state
//! machine.
//!
//! Any number of accessories can be active (visible and face-tracking) at
//! once, but at most one is selected for gesture editing. The store owns
//! those transitions so the invariants hold no matter which UI call site
//! mutates state.

use crate::anchors::PlacementParams;
use nalgebra::Vector3;

/// Category of an accessory, determining its placement heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Archetype {
    Glasses,
    FacialHair,
    Hair,
    Mask,
    Hat,
    Clothing,
    Avatar,
}

impl Archetype {
    /// Whether this entry is a rigged avatar rather than a tracked prop
    #[must_use]
    pub fn is_avatar(self) -> bool {
        self == Self::Avatar
    }
}

/// Static configuration for one accessory, fixed for the session
#[derive(Debug, Clone)]
pub struct AccessoryDescriptor {
    pub id: String,
    pub display_name: String,
    pub archetype: Archetype,
    /// Model reference: an asset path or URL handed to the loader
    pub asset: String,
    /// Placement override; `None` uses the archetype default
    pub placement: Option<PlacementParams>,
    /// Interocular calibration factor for avatar rigs (per rig, tuned
    /// empirically; deliberately not unified across rigs)
    pub calibration_factor: Option<f32>,
}

impl AccessoryDescriptor {
    /// Effective placement parameters; `None` for avatars
    #[must_use]
    pub fn placement_params(&self) -> Option<PlacementParams> {
        self.placement
            .or_else(|| PlacementParams::for_archetype(self.archetype))
    }
}

/// Model load lifecycle of one accessory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    NotLoaded,
    Loading,
    Loaded,
    Failed,
}

/// Mutable run-time record for one accessory
#[derive(Debug, Clone)]
pub struct AccessoryState {
    pub is_active: bool,
    pub is_selected: bool,
    pub scale_offset: f32,
    pub position_offset: Vector3<f32>,
    pub rotation_offset: Vector3<f32>,
    pub load: LoadStatus,
    /// Cleared when the existence probe finds no asset; such entries are
    /// hidden and can never activate
    pub available: bool,
}

impl Default for AccessoryState {
    fn default() -> Self {
        Self {
            is_active: false,
            is_selected: false,
            scale_offset: 1.0,
            position_offset: Vector3::zeros(),
            rotation_offset: Vector3::zeros(),
            load: LoadStatus::NotLoaded,
            available: true,
        }
    }
}

impl AccessoryState {
    /// Restore all gesture offsets to identity
    pub fn reset_adjustments(&mut self) {
        self.scale_offset = 1.0;
        self.position_offset = Vector3::zeros();
        self.rotation_offset = Vector3::zeros();
    }
}

/// Descriptor plus its run-time state
#[derive(Debug, Clone)]
pub struct AccessoryEntry {
    pub descriptor: AccessoryDescriptor,
    pub state: AccessoryState,
}

/// Outcome of a toggle, reported so the caller can kick off rig loads or
/// calibration resets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub now_active: bool,
    pub archetype: Archetype,
}

/// The set of all accessories and the single editing selection
#[derive(Debug, Default)]
pub struct AccessoryStore {
    entries: Vec<AccessoryEntry>,
}

impl AccessoryStore {
    #[must_use]
    pub fn new(descriptors: Vec<AccessoryDescriptor>) -> Self {
        let entries = descriptors
            .into_iter()
            .map(|descriptor| AccessoryEntry {
                descriptor,
                state: AccessoryState::default(),
            })
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&AccessoryEntry> {
        self.entries.iter().find(|e| e.descriptor.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut AccessoryEntry> {
        self.entries.iter_mut().find(|e| e.descriptor.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccessoryEntry> {
        self.entries.iter()
    }

    /// Every currently active accessory; all of them track the face each
    /// frame regardless of which one is selected
    pub fn iter_active(&self) -> impl Iterator<Item = &AccessoryEntry> {
        self.entries.iter().filter(|e| e.state.is_active)
    }

    /// The single accessory receiving gesture input, if any
    #[must_use]
    pub fn selected(&self) -> Option<&AccessoryEntry> {
        self.entries.iter().find(|e| e.state.is_selected)
    }

    pub fn selected_mut(&mut self) -> Option<&mut AccessoryEntry> {
        self.entries.iter_mut().find(|e| e.state.is_selected)
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selected().map(|e| e.descriptor.id.as_str())
    }

    /// Flip an accessory between inactive and active.
    ///
    /// Activating makes the entry the sole selection. Deactivating the
    /// selected entry transfers selection to another active accessory if one
    /// exists. Unavailable entries never activate.
    pub fn toggle(&mut self, id: &str) -> Option<ToggleOutcome> {
        let index = self.entries.iter().position(|e| e.descriptor.id == id)?;
        if !self.entries[index].state.available {
            return None;
        }

        let now_active = !self.entries[index].state.is_active;
        self.entries[index].state.is_active = now_active;

        if now_active {
            self.select_only(index);
        } else {
            let was_selected = self.entries[index].state.is_selected;
            self.entries[index].state.is_selected = false;
            if was_selected {
                if let Some(other) = self.entries.iter().position(|e| e.state.is_active) {
                    self.select_only(other);
                }
            }
        }

        Some(ToggleOutcome {
            now_active,
            archetype: self.entries[index].descriptor.archetype,
        })
    }

    /// Make an accessory the sole editing target, forcing it active first.
    /// Returns false for unknown or unavailable ids.
    pub fn select_for_editing(&mut self, id: &str) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.descriptor.id == id) else {
            return false;
        };
        if !self.entries[index].state.available {
            return false;
        }

        self.entries[index].state.is_active = true;
        self.select_only(index);
        true
    }

    /// Deactivate everything and reset every offset to identity
    pub fn clear_all(&mut self) {
        for entry in &mut self.entries {
            entry.state.is_active = false;
            entry.state.is_selected = false;
            entry.state.reset_adjustments();
        }
    }

    /// Reset only the selected accessory's offsets; no state transition
    pub fn reset_adjustments(&mut self) {
        if let Some(entry) = self.selected_mut() {
            entry.state.reset_adjustments();
        }
    }

    /// Reset only the selected accessory's rotation offsets
    pub fn reset_rotation(&mut self) {
        if let Some(entry) = self.selected_mut() {
            entry.state.rotation_offset = Vector3::zeros();
        }
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|e| e.state.is_active).count()
    }

    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.state.load == LoadStatus::Loaded)
            .count()
    }

    pub fn set_available(&mut self, id: &str, available: bool) {
        if let Some(entry) = self.get_mut(id) {
            entry.state.available = available;
        }
    }

    pub fn set_load_status(&mut self, id: &str, status: LoadStatus) {
        if let Some(entry) = self.get_mut(id) {
            entry.state.load = status;
        }
    }

    /// Whether the selection invariants hold: at most one selected, and a
    /// selected accessory is always active
    #[must_use]
    pub fn invariants_hold(&self) -> bool {
        let selected = self.entries.iter().filter(|e| e.state.is_selected).count();
        selected <= 1
            && self
                .entries
                .iter()
                .all(|e| !e.state.is_selected || e.state.is_active)
    }

    fn select_only(&mut self, index: usize) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.state.is_selected = i == index;
        }
    }
}

/// The static accessory catalog mirroring the shipped model set. Avatar
/// entries carry their per-rig calibration factor.
#[must_use]
pub fn builtin_manifest() -> Vec<AccessoryDescriptor> {
    use crate::anchors::AnchorReference;
    use crate::constants::{DEFAULT_CALIBRATION_FACTOR, HEADER_CALIBRATION_FACTOR};

    let prop = |id: &str, name: &str, archetype: Archetype| AccessoryDescriptor {
        id: id.to_string(),
        display_name: name.to_string(),
        archetype,
        asset: format!("assets/models/{id}.glb"),
        placement: None,
        calibration_factor: None,
    };

    let mut manifest = vec![
        prop("glasses", "Glasses", Archetype::Glasses),
        AccessoryDescriptor {
            placement: Some(PlacementParams {
                reference: AnchorReference::EyeCenter,
                vertical_bias: 0.0,
                depth_bias: 0.0,
                scale_factor: 1.4,
                roll_factor: 0.5,
            }),
            ..prop("glasses1", "Glasses Alt", Archetype::Glasses)
        },
        prop("mustache", "Mustache", Archetype::FacialHair),
        prop("mustache1", "Mustache Alt", Archetype::FacialHair),
        AccessoryDescriptor {
            placement: Some(PlacementParams {
                reference: AnchorReference::Chin,
                vertical_bias: 0.15,
                depth_bias: 0.0,
                scale_factor: 1.2,
                roll_factor: 0.5,
            }),
            ..prop("beard", "Beard", Archetype::FacialHair)
        },
        prop("mask", "Mask", Archetype::Mask),
        prop("mask1", "Mask Alt", Archetype::Mask),
        prop("cap", "Cap", Archetype::Hat),
        prop("cap1", "Cap Alt", Archetype::Hat),
        prop("hair", "Hair", Archetype::Hair),
        prop("hair1", "Hair Alt", Archetype::Hair),
        prop("tshirt", "T-Shirt", Archetype::Clothing),
    ];

    manifest.push(AccessoryDescriptor {
        id: "avatar".to_string(),
        display_name: "Avatar".to_string(),
        archetype: Archetype::Avatar,
        asset: "https://models.readyplayer.me/6984a7a905b43df7aaeb9df1.glb".to_string(),
        placement: None,
        calibration_factor: Some(DEFAULT_CALIBRATION_FACTOR),
    });
    manifest.push(AccessoryDescriptor {
        id: "header".to_string(),
        display_name: "Head Only".to_string(),
        archetype: Archetype::Avatar,
        asset: "assets/models/header.glb".to_string(),
        placement: None,
        calibration_factor: Some(HEADER_CALIBRATION_FACTOR),
    });
    manifest.push(AccessoryDescriptor {
        id: "avatar1".to_string(),
        display_name: "Avatar Alt".to_string(),
        archetype: Archetype::Avatar,
        asset: "assets/models/avatar1.glb".to_string(),
        placement: None,
        calibration_factor: Some(DEFAULT_CALIBRATION_FACTOR),
    });

    manifest
}
