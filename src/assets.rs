//! Asset loader contract and load-completion plumbing.
//!
//! Model loading is the only asynchronous boundary in the system. Requests
//! never block the render loop: [`AssetLoader::begin`] records a request
//! tagged with a generation token, and the driver drains terminal results
//! once per tick through [`AssetLoader::poll_completed`]. A completion whose
//! generation no longer matches the desired source is discarded, so a
//! late-arriving old load can never overwrite a newer selection.

use crate::scene::{MorphChannels, NodeId, Scene};
use crate::Result;
use std::collections::HashSet;

/// Flattened description of one node in a loaded model
#[derive(Debug, Clone)]
pub struct LoadedNode {
    pub name: String,
    /// Index of the parent within the same asset; `None` for subtree roots
    pub parent: Option<usize>,
    /// Morph/expression channel names exposed by this node, in order
    pub morph_channels: Vec<String>,
}

/// A parsed model ready to be instantiated into the scene
#[derive(Debug, Clone, Default)]
pub struct LoadedAsset {
    pub nodes: Vec<LoadedNode>,
}

impl LoadedAsset {
    /// Instantiate this asset under `parent` (or at the top level) and
    /// return the created node ids, aligned with `self.nodes`
    pub fn instantiate(&self, scene: &mut Scene, parent: Option<NodeId>) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let node_parent = match node.parent {
                Some(index) => ids.get(index).copied(),
                None => parent,
            };
            let id = scene.add_node(node.name.clone(), node_parent);
            if !node.morph_channels.is_empty() {
                if let Some(created) = scene.node_mut(id) {
                    created.morph = Some(MorphChannels::new(&node.morph_channels));
                }
            }
            ids.push(id);
        }
        ids
    }
}

/// Terminal result of one load request
#[derive(Debug)]
pub struct LoadCompletion {
    pub generation: u64,
    pub source: String,
    pub result: Result<LoadedAsset>,
}

/// Asynchronous boundary to the model loading machinery
pub trait AssetLoader {
    /// Start loading `source`; must not block
    fn begin(&mut self, source: &str, generation: u64);

    /// Drain every load that finished since the last poll
    fn poll_completed(&mut self) -> Vec<LoadCompletion>;

    /// HEAD-style existence check used to hide manifest entries whose asset
    /// is unreachable
    fn probe(&self, source: &str) -> bool;
}

/// Loader that synthesizes a rigged humanoid for every source, completing
/// after a configurable number of polls. Used by the replay CLI and tests;
/// real deployments plug in a GLTF-backed implementation.
#[derive(Debug, Default)]
pub struct SyntheticLoader {
    pending: Vec<PendingLoad>,
    delay_polls: u32,
    missing: HashSet<String>,
    failing: HashSet<String>,
}

#[derive(Debug)]
struct PendingLoad {
    generation: u64,
    source: String,
    polls_left: u32,
}

impl SyntheticLoader {
    /// Loader whose requests complete on the next poll
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader whose requests complete after `polls` drain calls
    #[must_use]
    pub fn with_delay(polls: u32) -> Self {
        Self {
            delay_polls: polls,
            ..Self::default()
        }
    }

    /// Make `probe` report the source as unreachable
    pub fn mark_missing(&mut self, source: &str) {
        self.missing.insert(source.to_string());
    }

    /// Make loads of `source` fail terminally
    pub fn mark_failing(&mut self, source: &str) {
        self.failing.insert(source.to_string());
    }
}

impl AssetLoader for SyntheticLoader {
    fn begin(&mut self, source: &str, generation: u64) {
        self.pending.push(PendingLoad {
            generation,
            source: source.to_string(),
            polls_left: self.delay_polls,
        });
    }

    fn poll_completed(&mut self) -> Vec<LoadCompletion> {
        let mut done = Vec::new();
        let mut still_pending = Vec::new();

        for mut load in self.pending.drain(..) {
            if load.polls_left > 0 {
                load.polls_left -= 1;
                still_pending.push(load);
                continue;
            }

            let result = if self.failing.contains(&load.source) {
                Err(crate::Error::AssetLoad(format!(
                    "failed to fetch {}",
                    load.source
                )))
            } else {
                Ok(humanoid_asset())
            };
            done.push(LoadCompletion {
                generation: load.generation,
                source: load.source,
                result,
            });
        }

        self.pending = still_pending;
        done
    }

    fn probe(&self, source: &str) -> bool {
        !self.missing.contains(source)
    }
}

/// A canned humanoid hierarchy matching the bone and mesh names the rig
/// synchronizer drives
#[must_use]
pub fn humanoid_asset() -> LoadedAsset {
    let bone = |name: &str, parent: usize| LoadedNode {
        name: name.to_string(),
        parent: Some(parent),
        morph_channels: Vec::new(),
    };
    let mesh = |name: &str, channels: &[&str]| LoadedNode {
        name: name.to_string(),
        parent: Some(0),
        morph_channels: channels.iter().map(|c| (*c).to_string()).collect(),
    };

    LoadedAsset {
        nodes: vec![
            LoadedNode {
                name: "Armature".to_string(),
                parent: None,
                morph_channels: Vec::new(),
            },
            bone("Hips", 0),
            bone("Spine", 1),
            bone("Spine1", 2),
            bone("Spine2", 3),
            bone("Neck", 4),
            bone("Head", 5),
            mesh(
                "Wolf3D_Head",
                &[
                    "browDownLeft",
                    "browDownRight",
                    "eyeBlinkLeft",
                    "eyeBlinkRight",
                    "jawOpen",
                    "mouthSmileLeft",
                    "mouthSmileRight",
                ],
            ),
            mesh("Wolf3D_Teeth", &["jawOpen"]),
            mesh("Wolf3D_Body", &[]),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instantiate_preserves_hierarchy() {
        let mut scene = Scene::new();
        let group = scene.add_node("group", None);
        let ids = humanoid_asset().instantiate(&mut scene, Some(group));

        let root = ids[0];
        assert_eq!(scene.node(root).unwrap().parent(), Some(group));
        assert_eq!(scene.node(root).unwrap().name, "Armature");

        // Head hangs off the neck chain, meshes off the armature root
        let head = ids[6];
        assert_eq!(scene.node(head).unwrap().name, "Head");
        assert_eq!(scene.node(head).unwrap().parent(), Some(ids[5]));

        let head_mesh = ids[7];
        assert!(scene.node(head_mesh).unwrap().morph.is_some());
    }

    #[test]
    fn test_synthetic_loader_delay() {
        let mut loader = SyntheticLoader::with_delay(2);
        loader.begin("assets/models/glasses.glb", 1);

        assert!(loader.poll_completed().is_empty());
        assert!(loader.poll_completed().is_empty());

        let done = loader.poll_completed();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].generation, 1);
        assert!(done[0].result.is_ok());
    }

    #[test]
    fn test_synthetic_loader_failure_and_probe() {
        let mut loader = SyntheticLoader::new();
        loader.mark_failing("bad.glb");
        loader.mark_missing("gone.glb");

        assert!(loader.probe("ok.glb"));
        assert!(!loader.probe("gone.glb"));

        loader.begin("bad.glb", 7);
        let done = loader.poll_completed();
        assert_eq!(done.len(), 1);
        assert!(done[0].result.is_err());
    }
}
