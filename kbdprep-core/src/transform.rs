/// Object transforms: scale, XYZ Euler rotation and location
use nalgebra::{Matrix4, Point3, Vector3};

/// Rotation state around three axes (in radians), applied X then Y then Z
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RotationState {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_degrees(x: f64, y: f64, z: f64) -> Self {
        Self::new(x.to_radians(), y.to_radians(), z.to_radians())
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Angles converted back to degrees
    pub fn degrees(&self) -> Vector3<f64> {
        Vector3::new(self.x.to_degrees(), self.y.to_degrees(), self.z.to_degrees())
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Object transform, composed scale -> rotate -> translate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: Vector3<f64>,
    pub rotation: RotationState,
    pub location: Vector3<f64>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation: RotationState::zero(),
            location: Vector3::zeros(),
        }
    }

    pub fn from_location(location: Vector3<f64>) -> Self {
        Self {
            location,
            ..Self::identity()
        }
    }

    /// True when scale is one and rotation and location are zero
    pub fn is_identity(&self) -> bool {
        self.scale == Vector3::new(1.0, 1.0, 1.0)
            && self.rotation.is_zero()
            && self.location == Vector3::zeros()
    }

    /// The object-to-world matrix
    pub fn matrix(&self) -> Matrix4<f64> {
        Self::translation_matrix(self.location.x, self.location.y, self.location.z)
            * Self::rotation_matrix(&self.rotation)
            * Self::scale_matrix(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        self.matrix().transform_point(point)
    }

    /// Create a rotation matrix from a rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f64> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        // Apply rotations in order: X, Y, Z
        rz * ry * rx
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f64, y: f64, z: f64) -> Matrix4<f64> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f64, sy: f64, sz: f64) -> Matrix4<f64> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
