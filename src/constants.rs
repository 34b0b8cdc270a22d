//! Constants used throughout the application

/// Minimum landmark count for a detected face (full face mesh)
pub const MIN_FACE_LANDMARKS: usize = 468;

/// Landmark indices consumed by the placement heuristics
pub const LEFT_EYE_OUTER: usize = 33;
pub const RIGHT_EYE_OUTER: usize = 263;
pub const NOSE_TIP: usize = 1;
pub const UPPER_LIP: usize = 13;
pub const LOWER_LIP: usize = 14;
pub const CHIN: usize = 152;
pub const FOREHEAD_TOP: usize = 10;

/// Fallback source video dimensions when the tracker reports none
pub const DEFAULT_VIDEO_WIDTH: u32 = 1280;
pub const DEFAULT_VIDEO_HEIGHT: u32 = 720;

/// Default perspective camera parameters
pub const DEFAULT_FOV_DEGREES: f32 = 45.0;

/// Distance from the camera at which face anchors are placed
pub const DEFAULT_ANCHOR_DISTANCE: f32 = 2.0;

/// Tracked landmark depth is passed through at reduced strength for parallax
pub const DEFAULT_DEPTH_SCALE: f32 = 0.3;

/// Gesture sensitivities
pub const DRAG_SENSITIVITY: f32 = 0.001;
pub const PINCH_SENSITIVITY: f32 = 0.002;
pub const WHEEL_SCALE_SENSITIVITY: f32 = 0.0005;
pub const WHEEL_DEPTH_SENSITIVITY: f32 = 0.002;

/// Increment per discrete rotation button press, in radians
pub const ROTATION_STEP: f32 = 0.25;

/// Manual scale offset clamp range
pub const SCALE_OFFSET_MIN: f32 = 0.3;
pub const SCALE_OFFSET_MAX: f32 = 3.0;

/// Vertical compensation applied when wheel-scaling a full-body avatar so it
/// appears to scale from its visual center rather than its feet
pub const AVATAR_SCALE_Y_COMPENSATION: f32 = 2.0;

/// Avatar rig scale calibration factors (per rig kind, tuned empirically)
pub const DEFAULT_CALIBRATION_FACTOR: f32 = 32.0;
pub const HEADER_CALIBRATION_FACTOR: f32 = 30.0;

/// Scale used until interocular calibration has run
pub const FALLBACK_AVATAR_SCALE: f32 = 2.2;

/// Avatar rest pose applied right after a load commits
pub const AVATAR_REST_Y: f32 = -1.5;
pub const AVATAR_REST_SCALE: f32 = 1.2;

/// Avatar base vertical position while tracking
pub const AVATAR_BASE_Y: f32 = -4.3;

/// Idle breathing animation
pub const BREATH_PHASE_STEP: f32 = 0.036;
pub const BREATH_RATE: f32 = 0.5;
pub const BREATH_INTENSITY: f32 = 0.05;
pub const LOWER_SPINE_DAMP: f32 = 0.2;
pub const TORSO_LEAN_DIVISOR: f32 = 10.0;
pub const NECK_ROTATION_DIVISOR: f32 = 5.0;
pub const NECK_FORWARD_TILT: f32 = 0.3;
