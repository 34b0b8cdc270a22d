//! Tracker input contract: per-frame landmark, rotation and expression data.
//!
//! The external face tracker delivers one [`TrackedFrame`] per video frame.
//! Frames are ephemeral and consumed read-only by the projection and rig
//! layers; a frame with fewer than [`MIN_FACE_LANDMARKS`] landmarks means no
//! subject was detected.

use crate::constants::MIN_FACE_LANDMARKS;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;

/// A single tracked point in normalized video coordinates.
///
/// `x` and `y` are in `[0, 1]` with y growing downward; `x` is mirrored for
/// selfie view. `z` is a relative depth estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    /// 3D Euclidean distance to another landmark
    #[must_use]
    pub fn distance(&self, other: &Landmark) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Euler head pose estimate in radians
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadRotation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// A named expression score in `[0, 1]`, driving one morph channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionWeight {
    pub name: String,
    pub score: f32,
}

/// One sample of tracker output, produced once per video frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackedFrame {
    /// Ordered landmark sequence; empty or short when no subject is detected
    pub landmarks: Vec<Landmark>,

    /// Head pose estimate, absent when the tracker could not derive one
    pub rotation: Option<HeadRotation>,

    /// Expression weights by category name
    pub expressions: Vec<ExpressionWeight>,

    /// Native pixel dimensions of the source video
    pub video_size: Option<(u32, u32)>,
}

impl TrackedFrame {
    /// Whether this frame carries a full detected face
    #[must_use]
    pub fn has_face(&self) -> bool {
        self.landmarks.len() >= MIN_FACE_LANDMARKS
    }

    /// Landmark by index, if present
    #[must_use]
    pub fn landmark(&self, index: usize) -> Option<Landmark> {
        self.landmarks.get(index).copied()
    }
}

/// Source of tracked frames, one per video frame
pub trait FrameSource {
    /// The next frame, or `None` when the source is exhausted
    fn next_frame(&mut self) -> Option<TrackedFrame>;
}

/// Replays a recorded tracker session from a JSON frame dump
pub struct ReplaySource {
    frames: VecDeque<TrackedFrame>,
}

impl ReplaySource {
    /// Load a recorded session from a JSON file containing an array of frames
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let frames: Vec<TrackedFrame> =
            serde_json::from_str(&content).map_err(|e| Error::ReplayError(e.to_string()))?;
        Ok(Self {
            frames: frames.into(),
        })
    }

    /// Wrap an in-memory frame sequence
    #[must_use]
    pub fn from_frames(frames: Vec<TrackedFrame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    /// Remaining frame count
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the session is exhausted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for ReplaySource {
    fn next_frame(&mut self) -> Option<TrackedFrame> {
        self.frames.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_detection_threshold() {
        let mut frame = TrackedFrame::default();
        assert!(!frame.has_face());

        frame.landmarks = vec![Landmark::default(); MIN_FACE_LANDMARKS - 1];
        assert!(!frame.has_face());

        frame.landmarks.push(Landmark::default());
        assert!(frame.has_face());
    }

    #[test]
    fn test_landmark_distance() {
        let a = Landmark { x: 0.0, y: 0.0, z: 0.0 };
        let b = Landmark { x: 3.0, y: 4.0, z: 0.0 };
        assert!((a.distance(&b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_replay_source_order() {
        let frames = vec![
            TrackedFrame {
                video_size: Some((640, 480)),
                ..TrackedFrame::default()
            },
            TrackedFrame::default(),
        ];
        let mut source = ReplaySource::from_frames(frames);
        assert_eq!(source.len(), 2);

        let first = source.next_frame().unwrap();
        assert_eq!(first.video_size, Some((640, 480)));
        assert!(source.next_frame().is_some());
        assert!(source.next_frame().is_none());
        assert!(source.is_empty());
    }

    #[test]
    fn test_frame_roundtrip() {
        let frame = TrackedFrame {
            landmarks: vec![Landmark { x: 0.5, y: 0.25, z: -0.01 }],
            rotation: Some(HeadRotation { x: 0.1, y: -0.2, z: 0.0 }),
            expressions: vec![ExpressionWeight {
                name: "jawOpen".to_string(),
                score: 0.7,
            }],
            video_size: Some((1920, 1080)),
        };

        let json = serde_json::to_string(&frame).unwrap();
        let back: TrackedFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(back.landmarks, frame.landmarks);
        assert_eq!(back.rotation, frame.rotation);
        assert_eq!(back.expressions, frame.expressions);
        assert_eq!(back.video_size, frame.video_size);
    }
}
