//! Gesture interpretation: pointer, touch and wheel input applied to the
//! selected accessory's offsets.
//!
//! Every continuous handler is a no-op while no accessory is selected or no
//! subject is detected; releases always clear the in-flight session so a
//! stale drag or pinch baseline can never leak into the next interaction.

use crate::accessories::{AccessoryStore, Archetype};
use crate::config::GestureConfig;

/// Rotation axis for discrete rotation controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationAxis {
    X,
    Y,
    Z,
}

/// One event from the gesture input surface
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    /// Touch points currently down (one = drag, two = pinch)
    TouchStart { points: Vec<(f32, f32)> },
    TouchMove { points: Vec<(f32, f32)> },
    /// Touch points remaining after a finger lifted
    TouchEnd { points: Vec<(f32, f32)> },
    /// Wheel scroll; with the modifier held the delta moves depth instead of
    /// scale
    Wheel { delta_y: f32, depth_modifier: bool },
    /// Discrete rotation button press, `direction` is +1 or -1
    RotateStep { axis: RotationAxis, direction: f32 },
}

/// Transient per-interaction record; lives for one press-drag-release or
/// pinch sequence
#[derive(Debug, Clone, Copy, Default)]
struct GestureSession {
    dragging: bool,
    last_x: f32,
    last_y: f32,
    /// Two-finger separation at the previous move; 0 means no pinch in
    /// flight
    pinch_baseline: f32,
}

/// Interprets input streams into relative offset deltas on the selected
/// accessory
#[derive(Debug)]
pub struct GestureController {
    config: GestureConfig,
    session: GestureSession,
}

impl GestureController {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            session: GestureSession::default(),
        }
    }

    /// Whether a drag is currently in flight
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.session.dragging
    }

    /// Apply one input event to the store
    pub fn handle(&mut self, event: &GestureEvent, store: &mut AccessoryStore, face_detected: bool) {
        // Releases always cancel the session, even with nothing selected
        match event {
            GestureEvent::PointerUp => {
                self.session = GestureSession::default();
                return;
            }
            GestureEvent::TouchEnd { points } => {
                self.touch_end(points);
                return;
            }
            _ => {}
        }

        if store.selected().is_none() || !face_detected {
            return;
        }

        match event {
            GestureEvent::PointerDown { x, y } => self.begin_drag(*x, *y),
            GestureEvent::PointerMove { x, y } => self.drag_to(*x, *y, store),
            GestureEvent::TouchStart { points } => match points.as_slice() {
                [(x, y)] => self.begin_drag(*x, *y),
                [a, b] => {
                    self.session.dragging = false;
                    self.session.pinch_baseline = distance(*a, *b);
                }
                _ => {}
            },
            GestureEvent::TouchMove { points } => match points.as_slice() {
                [(x, y)] => self.drag_to(*x, *y, store),
                [a, b] => self.pinch_to(distance(*a, *b), store),
                _ => {}
            },
            GestureEvent::Wheel {
                delta_y,
                depth_modifier,
            } => self.wheel(*delta_y, *depth_modifier, store),
            GestureEvent::RotateStep { axis, direction } => {
                self.rotate_step(*axis, *direction, store);
            }
            // Releases were handled above
            GestureEvent::PointerUp | GestureEvent::TouchEnd { .. } => {}
        }
    }

    fn begin_drag(&mut self, x: f32, y: f32) {
        self.session.dragging = true;
        self.session.last_x = x;
        self.session.last_y = y;
    }

    fn drag_to(&mut self, x: f32, y: f32, store: &mut AccessoryStore) {
        if !self.session.dragging {
            return;
        }
        let dx = x - self.session.last_x;
        let dy = y - self.session.last_y;

        if let Some(entry) = store.selected_mut() {
            entry.state.position_offset.x += dx * self.config.drag_sensitivity;
            entry.state.position_offset.y -= dy * self.config.drag_sensitivity;
        }

        self.session.last_x = x;
        self.session.last_y = y;
    }

    fn pinch_to(&mut self, separation: f32, store: &mut AccessoryStore) {
        // A zero baseline means the pinch just started (or was cancelled);
        // record it and skip the delta rather than scaling off garbage
        if self.session.pinch_baseline <= 0.0 {
            self.session.pinch_baseline = separation;
            return;
        }

        let delta = (separation - self.session.pinch_baseline) * self.config.pinch_sensitivity;
        if let Some(entry) = store.selected_mut() {
            entry.state.scale_offset = (entry.state.scale_offset + delta)
                .clamp(self.config.scale_min, self.config.scale_max);
        }
        self.session.pinch_baseline = separation;
    }

    fn wheel(&mut self, delta_y: f32, depth_modifier: bool, store: &mut AccessoryStore) {
        let Some(entry) = store.selected_mut() else {
            return;
        };

        if depth_modifier {
            entry.state.position_offset.z += -delta_y * self.config.wheel_depth_sensitivity;
            return;
        }

        let old_scale = entry.state.scale_offset;
        let new_scale = (old_scale - delta_y * self.config.wheel_scale_sensitivity)
            .clamp(self.config.scale_min, self.config.scale_max);

        // Full-body avatars scale from their feet; push them down so the
        // change reads as scaling from the visual center
        if entry.descriptor.archetype == Archetype::Avatar {
            let scale_change = new_scale - old_scale;
            entry.state.position_offset.y -=
                scale_change * self.config.avatar_scale_y_compensation;
        }

        entry.state.scale_offset = new_scale;
    }

    fn rotate_step(&mut self, axis: RotationAxis, direction: f32, store: &mut AccessoryStore) {
        let step = direction * self.config.rotation_step;
        if let Some(entry) = store.selected_mut() {
            match axis {
                RotationAxis::X => entry.state.rotation_offset.x += step,
                RotationAxis::Y => entry.state.rotation_offset.y += step,
                RotationAxis::Z => entry.state.rotation_offset.z += step,
            }
        }
    }

    fn touch_end(&mut self, remaining: &[(f32, f32)]) {
        match remaining {
            [] => self.session = GestureSession::default(),
            [(x, y)] if self.session.pinch_baseline > 0.0 => {
                // Two fingers went to one: downgrade pinch to drag with a
                // fresh origin so the accessory does not jump
                self.session.pinch_baseline = 0.0;
                self.begin_drag(*x, *y);
            }
            _ => {}
        }
    }
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    dx.hypot(dy)
}
