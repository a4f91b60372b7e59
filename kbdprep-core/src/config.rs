/// Centralized constants for the preparation tools
use std::ops::RangeInclusive;

// =============================================================================
// NORMALIZATION
// =============================================================================

/// Uniform scale applied by the normalizer.
///
/// CAD sources are authored in millimetres; the host works in metres.
pub const SHRINK_FACTOR: f64 = 0.01;

/// Rounding step for the lowest-height scan, in source units.
pub const HEIGHT_PRECISION: f64 = 1e-6;

// =============================================================================
// RESERVED NAMES
// =============================================================================

/// Name of the singleton camera used for UV projection.
pub const PROJECTION_CAMERA_NAME: &str = "3DPCamera";

/// Name of the coverage rig camera.
pub const COVERAGE_CAMERA_NAME: &str = "3DCamera";

/// Name of the empty the coverage camera tracks.
pub const COVERAGE_EMPTY_NAME: &str = "3DEmpty";

// =============================================================================
// HOST DEFAULTS
// =============================================================================

/// Render resolution used for the camera frame aspect.
pub const DEFAULT_RESOLUTION: (u32, u32) = (1920, 1080);

/// Accepted dissolve angles, in whole degrees.
pub const DISSOLVE_ANGLE_RANGE: RangeInclusive<u8> = 1..=5;

/// Dissolve angle a fresh scene starts with.
pub const DEFAULT_DISSOLVE_ANGLE: u8 = 2;

/// Tolerance used when welding STL triangle corners into shared vertices.
pub const WELD_EPSILON: f64 = 1e-9;
