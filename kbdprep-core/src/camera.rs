/// Projection camera planning for the three canonical views
use std::fmt;
use std::str::FromStr;

use nalgebra::Vector3;
use tracing::debug;

use crate::error::{PrepError, PrepResult};
use crate::host::{ObjectData, ObjectId, SceneGraph, ViewportControl};
use crate::projection::ProjectionMode;
use crate::registry::{self, Reserved};
use crate::transform::{RotationState, Transform};

/// Which fixed view to project from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Side,
    Top,
    Bottom,
}

impl Direction {
    pub const ALL: [Direction; 3] = [Direction::Side, Direction::Top, Direction::Bottom];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Side => "side",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }

    /// Calibrated camera pose for this view
    pub fn pose(self) -> CameraPose {
        match self {
            Self::Side => CameraPose {
                rotation_degrees: Vector3::new(90.0, 0.0, -90.0),
                location: Vector3::new(-9.4902, 0.0, 0.0),
                ortho_scale: 2.0,
            },
            Self::Top => CameraPose {
                rotation_degrees: Vector3::new(6.0, 0.0, 0.0),
                location: Vector3::new(0.0, 0.6666, 5.0786),
                ortho_scale: 5.0,
            },
            Self::Bottom => CameraPose {
                rotation_degrees: Vector3::new(180.0, 0.0, 0.0),
                location: Vector3::new(0.0, -1.1414, -6.0376),
                ortho_scale: 5.0,
            },
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PrepError::InvalidSetting(format!("unknown direction '{s}'")))
    }
}

/// Orthographic camera placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// XYZ Euler angles in degrees.
    pub rotation_degrees: Vector3<f64>,
    pub location: Vector3<f64>,
    pub ortho_scale: f64,
}

impl CameraPose {
    pub fn transform(&self) -> Transform {
        Transform {
            rotation: RotationState::from_degrees(
                self.rotation_degrees.x,
                self.rotation_degrees.y,
                self.rotation_degrees.z,
            ),
            ..Transform::from_location(self.location)
        }
    }
}

/// Get or create the projection camera and pose it for `direction`.
///
/// The camera becomes the scene's active camera and the viewport switches to
/// camera view, so the view shows exactly what will be projected.
pub fn plan_projection_camera<H>(host: &mut H, direction: Direction) -> PrepResult<ObjectId>
where
    H: SceneGraph + ViewportControl + ?Sized,
{
    let lookup = registry::get_or_create(host, Reserved::ProjectionCamera);
    let id = lookup.id;
    let pose = direction.pose();

    // Never repurpose a user's object that happens to carry the reserved name
    let ObjectData::Camera(mut data) = host.object_data(id)? else {
        return Err(PrepError::ReservedName(Reserved::ProjectionCamera.name().to_string()));
    };
    data.mode = ProjectionMode::Orthographic;
    data.ortho_scale = pose.ortho_scale;
    host.set_camera_data(id, data)?;
    host.set_transform(id, pose.transform())?;
    host.set_active_camera(id)?;

    host.view_camera();
    host.refresh_view();

    debug!(%direction, created = lookup.created, "Posed projection camera");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PROJECTION_CAMERA_NAME;
    use crate::scene::Scene;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_direction() {
        assert_eq!("top".parse::<Direction>().unwrap(), Direction::Top);
        assert_eq!("Bottom".parse::<Direction>().unwrap(), Direction::Bottom);
        assert!("front".parse::<Direction>().is_err());
        assert_eq!(Direction::Side.to_string(), "side");
    }

    #[test]
    fn test_top_pose_literals() {
        let mut scene = Scene::new();
        let cam = plan_projection_camera(&mut scene, Direction::Top).unwrap();

        let t = scene.transform(cam).unwrap();
        assert_eq!(t.location, Vector3::new(0.0, 0.6666, 5.0786));
        assert_relative_eq!(t.rotation.degrees(), Vector3::new(6.0, 0.0, 0.0), epsilon = 1e-12);
        assert_eq!(t.scale, Vector3::new(1.0, 1.0, 1.0));

        let ObjectData::Camera(data) = scene.object_data(cam).unwrap() else {
            panic!("projection camera is not a camera");
        };
        assert_eq!(data.mode, ProjectionMode::Orthographic);
        assert_eq!(data.ortho_scale, 5.0);
    }

    #[test]
    fn test_pose_table() {
        let side = Direction::Side.pose();
        assert_eq!(side.location, Vector3::new(-9.4902, 0.0, 0.0));
        assert_eq!(side.ortho_scale, 2.0);
        let bottom = Direction::Bottom.pose();
        assert_eq!(bottom.rotation_degrees, Vector3::new(180.0, 0.0, 0.0));
        assert_eq!(bottom.location, Vector3::new(0.0, -1.1414, -6.0376));
        assert_eq!(bottom.ortho_scale, 5.0);
    }

    #[test]
    fn test_camera_is_singleton() {
        let mut scene = Scene::new();
        let mut ids = Vec::new();
        for _ in 0..3 {
            for direction in Direction::ALL {
                ids.push(plan_projection_camera(&mut scene, direction).unwrap());
            }
        }
        assert!(ids.iter().all(|&id| id == ids[0]));
        assert_eq!(scene.count_named(PROJECTION_CAMERA_NAME), 1);
        assert_eq!(scene.object_count(), 1);
    }

    #[test]
    fn test_camera_activated_and_viewed() {
        let mut scene = Scene::new();
        let cam = plan_projection_camera(&mut scene, Direction::Side).unwrap();
        assert_eq!(scene.active_camera(), Some(cam));
        assert!(scene.viewport().camera_view);
        assert_eq!(scene.viewport().refreshes, 1);
    }

    #[test]
    fn test_reserved_name_mesh_is_left_alone() {
        let mut scene = Scene::new();
        let cube = crate::geometry::Mesh::cube(1.0);
        let squatter = scene.add_mesh_object(PROJECTION_CAMERA_NAME, cube.clone());

        assert_eq!(
            plan_projection_camera(&mut scene, Direction::Top),
            Err(PrepError::ReservedName(PROJECTION_CAMERA_NAME.to_string()))
        );
        assert!(scene.object_data(squatter).unwrap().mesh().is_some());
        assert_eq!(scene.object_mesh(squatter), Some(&cube));
        assert!(scene.transform(squatter).unwrap().is_identity());
        assert_eq!(scene.active_camera(), None);
        assert!(!scene.viewport().camera_view);
        assert_eq!(scene.object_count(), 1);
    }

    #[test]
    fn test_pose_is_independent_of_mesh() {
        let mut scene = Scene::new();
        scene.add_mesh_object("Big", crate::geometry::Mesh::cube(100.0));
        let cam = plan_projection_camera(&mut scene, Direction::Top).unwrap();
        assert_eq!(scene.transform(cam).unwrap(), Direction::Top.pose().transform());
    }
}
