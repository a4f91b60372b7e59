/// Camera data and projection utilities
use nalgebra::{Matrix4, Point2, Point3};

use crate::transform::Transform;

/// Projection mode of a camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Camera data block shared by camera objects
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraData {
    pub mode: ProjectionMode,
    /// Visible extent along the larger frame side (orthographic only).
    pub ortho_scale: f64,
    /// Vertical field of view in radians (perspective only).
    pub fov: f64,
    pub near: f64,
    pub far: f64,
}

impl CameraData {
    pub fn new() -> Self {
        Self {
            mode: ProjectionMode::Perspective,
            ortho_scale: 6.0,
            fov: 39.6_f64.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }

    pub fn orthographic(ortho_scale: f64) -> Self {
        Self {
            mode: ProjectionMode::Orthographic,
            ortho_scale,
            ..Self::new()
        }
    }

    /// Width and height of the orthographic frame for a render resolution.
    ///
    /// The larger image side spans `ortho_scale`.
    pub fn frame_size(&self, width: u32, height: u32) -> (f64, f64) {
        let aspect = width.max(1) as f64 / height.max(1) as f64;
        if aspect >= 1.0 {
            (self.ortho_scale, self.ortho_scale / aspect)
        } else {
            (self.ortho_scale * aspect, self.ortho_scale)
        }
    }
}

impl Default for CameraData {
    fn default() -> Self {
        Self::new()
    }
}

/// A posed camera: data plus the transform of its object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub data: CameraData,
    pub transform: Transform,
}

impl Camera {
    pub fn new(data: CameraData, transform: Transform) -> Self {
        Self { data, transform }
    }

    /// Create the view matrix (world to camera space).
    ///
    /// The camera looks down its local -Z axis with +Y up.
    pub fn view_matrix(&self) -> Matrix4<f64> {
        self.transform
            .matrix()
            .try_inverse()
            .unwrap_or_else(Matrix4::identity)
    }

    /// Create the projection matrix for a render resolution
    pub fn projection_matrix(&self, width: u32, height: u32) -> Matrix4<f64> {
        match self.data.mode {
            ProjectionMode::Perspective => {
                let aspect = width.max(1) as f64 / height.max(1) as f64;
                Matrix4::new_perspective(aspect, self.data.fov, self.data.near, self.data.far)
            }
            ProjectionMode::Orthographic => {
                let (w, h) = self.data.frame_size(width, height);
                Matrix4::new_orthographic(
                    -w / 2.0,
                    w / 2.0,
                    -h / 2.0,
                    h / 2.0,
                    self.data.near,
                    self.data.far,
                )
            }
        }
    }

    /// Project a 3D point to normalized frame coordinates.
    ///
    /// The camera frame maps to `0..1` on both axes; points outside the frame
    /// fall outside that range. Returns `None` for points on the camera plane
    /// of a perspective camera.
    pub fn project_to_frame(
        &self,
        point: &Point3<f64>,
        model_matrix: &Matrix4<f64>,
        width: u32,
        height: u32,
    ) -> Option<Point2<f64>> {
        let view = self.view_matrix();
        let projection = self.projection_matrix(width, height);
        let mvp = projection * view * model_matrix;

        // Transform to clip space, then normalized device coordinates
        let clip = mvp * point.to_homogeneous();
        if clip.w.abs() < 1e-12 {
            return None;
        }
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;

        Some(Point2::new((ndc_x + 1.0) * 0.5, (ndc_y + 1.0) * 0.5))
    }

    /// Camera-space position of a point, in scene units
    pub fn to_camera_space(&self, point: &Point3<f64>, model_matrix: &Matrix4<f64>) -> Point3<f64> {
        (self.view_matrix() * model_matrix).transform_point(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::RotationState;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_camera_data_defaults() {
        let data = CameraData::new();
        assert_eq!(data.mode, ProjectionMode::Perspective);
        assert_eq!(CameraData::orthographic(5.0).mode, ProjectionMode::Orthographic);
    }

    #[test]
    fn test_frame_size_uses_larger_side() {
        let data = CameraData::orthographic(4.0);
        let (w, h) = data.frame_size(1920, 1080);
        assert_relative_eq!(w, 4.0);
        assert_relative_eq!(h, 4.0 * 1080.0 / 1920.0);

        let (w, h) = data.frame_size(500, 1000);
        assert_relative_eq!(w, 2.0);
        assert_relative_eq!(h, 4.0);
    }

    #[test]
    fn test_orthographic_frame_mapping() {
        // Camera above the origin looking straight down
        let camera = Camera::new(
            CameraData::orthographic(2.0),
            Transform::from_location(Vector3::new(0.0, 0.0, 10.0)),
        );
        let model = Matrix4::identity();

        let centre = camera
            .project_to_frame(&Point3::new(0.0, 0.0, 0.0), &model, 1000, 1000)
            .unwrap();
        assert_relative_eq!(centre, Point2::new(0.5, 0.5), epsilon = 1e-12);

        let corner = camera
            .project_to_frame(&Point3::new(1.0, 1.0, 0.0), &model, 1000, 1000)
            .unwrap();
        assert_relative_eq!(corner, Point2::new(1.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_orthographic_ignores_depth() {
        let camera = Camera::new(
            CameraData::orthographic(2.0),
            Transform {
                rotation: RotationState::from_degrees(90.0, 0.0, -90.0),
                ..Transform::from_location(Vector3::new(-9.0, 0.0, 0.0))
            },
        );
        let model = Matrix4::identity();
        let near = camera
            .project_to_frame(&Point3::new(-1.0, 0.5, 0.2), &model, 1000, 1000)
            .unwrap();
        let far = camera
            .project_to_frame(&Point3::new(3.0, 0.5, 0.2), &model, 1000, 1000)
            .unwrap();
        assert_relative_eq!(near, far, epsilon = 1e-12);
    }

    #[test]
    fn test_view_matrix_inverts_pose() {
        let camera = Camera::new(
            CameraData::orthographic(5.0),
            Transform::from_location(Vector3::new(1.0, 2.0, 3.0)),
        );
        let p = camera.to_camera_space(&Point3::new(1.0, 2.0, 3.0), &Matrix4::identity());
        assert_relative_eq!(p, Point3::origin(), epsilon = 1e-12);
    }
}
