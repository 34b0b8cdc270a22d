//! Landmark projection from normalized tracker space into camera space.
//!
//! The source video is cropped to fill the display container, so raw tracker
//! coordinates must be corrected for the rendered-vs-displayed offset before
//! they can be lifted into the 3D scene through the perspective camera.

use crate::constants::{DEFAULT_VIDEO_HEIGHT, DEFAULT_VIDEO_WIDTH};
use crate::scene::Camera;
use crate::tracking::Landmark;
use nalgebra::Vector3;

/// A landmark in normalized viewport coordinates after crop correction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedLandmark {
    pub u: f32,
    pub v: f32,
    pub z: f32,
}

/// Pure per-frame projector; rebuild whenever the container or video size
/// changes
#[derive(Debug, Clone)]
pub struct LandmarkProjector {
    container_width: f32,
    container_height: f32,
    rendered_width: f32,
    rendered_height: f32,
    crop_offset_x: f32,
    crop_offset_y: f32,
    h_extent: f32,
    v_extent: f32,
    depth_scale: f32,
}

impl LandmarkProjector {
    /// Derive the crop correction and frustum extents for one frame.
    ///
    /// `video_size` falls back to 1280x720 (16:9) when the tracker has not
    /// reported the source dimensions yet.
    #[must_use]
    pub fn new(
        container: (u32, u32),
        video_size: Option<(u32, u32)>,
        camera: &Camera,
        anchor_distance: f32,
        depth_scale: f32,
    ) -> Self {
        let (container_width, container_height) = (container.0 as f32, container.1 as f32);
        let (video_width, video_height) =
            video_size.unwrap_or((DEFAULT_VIDEO_WIDTH, DEFAULT_VIDEO_HEIGHT));

        let video_aspect = video_width as f32 / video_height as f32;
        let container_aspect = container_width / container_height;

        let (rendered_width, rendered_height, crop_offset_x, crop_offset_y) =
            if video_aspect > container_aspect {
                // Video is wider than the container: cropped horizontally
                let rendered_height = container_height;
                let rendered_width = container_height * video_aspect;
                let crop_offset_x = (rendered_width - container_width) / 2.0;
                (rendered_width, rendered_height, crop_offset_x, 0.0)
            } else {
                // Video is taller than the container: cropped vertically
                let rendered_width = container_width;
                let rendered_height = container_width / video_aspect;
                let crop_offset_y = (rendered_height - container_height) / 2.0;
                (rendered_width, rendered_height, 0.0, crop_offset_y)
            };

        let v_extent = 2.0 * (camera.fov_y / 2.0).tan() * anchor_distance;
        let h_extent = v_extent * camera.aspect;

        Self {
            container_width,
            container_height,
            rendered_width,
            rendered_height,
            crop_offset_x,
            crop_offset_y,
            h_extent,
            v_extent,
            depth_scale,
        }
    }

    /// Map a raw tracker landmark into normalized viewport coordinates
    #[must_use]
    pub fn project(&self, landmark: Landmark) -> ProjectedLandmark {
        ProjectedLandmark {
            u: (landmark.x * self.rendered_width - self.crop_offset_x) / self.container_width,
            v: (landmark.y * self.rendered_height - self.crop_offset_y) / self.container_height,
            z: landmark.z,
        }
    }

    /// Lift normalized viewport coordinates into camera space at the anchor
    /// depth. `x` is mirrored for the front-facing camera.
    #[must_use]
    pub fn to_world(&self, u: f32, v: f32, z: f32) -> Vector3<f32> {
        Vector3::new(
            (0.5 - u) * self.h_extent,
            (0.5 - v) * self.v_extent,
            z * self.depth_scale,
        )
    }

    /// Project a raw landmark all the way into camera space
    #[must_use]
    pub fn project_to_world(&self, landmark: Landmark) -> Vector3<f32> {
        let p = self.project(landmark);
        self.to_world(p.u, p.v, p.z)
    }

    /// Horizontal crop offset in container pixels
    #[must_use]
    pub fn crop_offset_x(&self) -> f32 {
        self.crop_offset_x
    }

    /// Vertical crop offset in container pixels
    #[must_use]
    pub fn crop_offset_y(&self) -> f32 {
        self.crop_offset_y
    }
}
