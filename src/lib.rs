//! Face overlay library for real-time face-tracked 3D accessories and
//! avatars.
//!
//! This library turns normalized face-tracker landmarks into a live,
//! gesture-editable 3D overlay:
//! 1. Landmark projection into camera space, corrected for video cropping
//! 2. Per-archetype placement heuristics (anchor, base scale, base roll)
//! 3. A selection state machine: many accessories active, one editable
//! 4. Skeletal-rig synchronization with expression mapping and idle
//!    breathing
//!
//! The landmark tracker, render engine and model parser are external
//! collaborators behind the [`tracking::FrameSource`], [`scene::Renderer`]
//! and [`assets::AssetLoader`] boundaries.
//!
//! # Examples
//!
//! ## Driving the pipeline
//!
//! ```no_run
//! use face_overlay::app::OverlayApp;
//! use face_overlay::assets::SyntheticLoader;
//! use face_overlay::config::Config;
//! use face_overlay::scene::NullRenderer;
//! use face_overlay::tracking::{FrameSource, ReplaySource};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut app = OverlayApp::with_builtin_manifest(
//!     Config::default(),
//!     SyntheticLoader::new(),
//!     NullRenderer::default(),
//!     (1280, 720),
//! )?;
//!
//! app.toggle_accessory("glasses")?;
//! app.toggle_accessory("cap")?;
//!
//! let mut source = ReplaySource::from_file("session.json")?;
//! while let Some(frame) = source.next_frame() {
//!     app.tick(Some(&frame));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Editing the selected accessory with gestures
//!
//! ```no_run
//! use face_overlay::app::OverlayApp;
//! use face_overlay::assets::SyntheticLoader;
//! use face_overlay::config::Config;
//! use face_overlay::gestures::GestureEvent;
//! use face_overlay::scene::NullRenderer;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut app = OverlayApp::with_builtin_manifest(
//!     Config::default(),
//!     SyntheticLoader::new(),
//!     NullRenderer::default(),
//!     (1280, 720),
//! )?;
//! app.toggle_accessory("glasses")?;
//!
//! // Wheel up grows the selected accessory, clamped to [0.3, 3.0]
//! app.handle_gesture(&GestureEvent::Wheel {
//!     delta_y: -100.0,
//!     depth_modifier: false,
//! });
//! # Ok(())
//! # }
//! ```
//!
//! ## Placement math in isolation
//!
//! ```
//! use face_overlay::projection::LandmarkProjector;
//! use face_overlay::scene::Camera;
//! use face_overlay::tracking::Landmark;
//!
//! let camera = Camera::new(45.0, 1280.0 / 720.0, 2.0);
//! let projector = LandmarkProjector::new((1280, 720), Some((1920, 1080)), &camera, 2.0, 0.3);
//!
//! let world = projector.project_to_world(Landmark { x: 0.5, y: 0.5, z: 0.0 });
//! assert!(world.x.abs() < 1e-4);
//! ```

/// Render loop driver composing the full pipeline
pub mod app;

/// Tracker input contract and recorded-session replay
pub mod tracking;

/// Landmark projection from tracker space to camera space
pub mod projection;

/// Placement heuristics per accessory archetype
pub mod anchors;

/// Accessory descriptors, state and the selection state machine
pub mod accessories;

/// Gesture interpretation applied to the selected accessory
pub mod gestures;

/// Avatar rig synchronization and idle breathing
pub mod rig;

/// Scene node arena, camera and render boundary
pub mod scene;

/// Asset loader contract and load-completion plumbing
pub mod assets;

/// Error types and result handling
pub mod error;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
