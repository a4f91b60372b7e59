/// Read-only geometry queries against host meshes
use nalgebra::Point3;

use crate::config::HEIGHT_PRECISION;
use crate::error::{PreconditionError, PrepResult};
use crate::host::{MeshId, MeshQuery, ObjectId, SceneGraph};

/// Round `value` to the nearest multiple of `step`
pub fn round_to(value: f64, step: f64) -> f64 {
    let inverse = (1.0 / step).round();
    (value * inverse).round() / inverse
}

/// Lowest vertex height along +Z, rounded to [`HEIGHT_PRECISION`].
///
/// The scan is seeded at zero and only negative heights lower it, so a mesh
/// lying entirely above the plane reports zero rather than its true minimum.
pub fn lowest_height(positions: &[Point3<f64>]) -> f64 {
    positions
        .iter()
        .map(|p| round_to(p.z, HEIGHT_PRECISION))
        .fold(0.0, |lowest, z| if z < lowest { z } else { lowest })
}

/// Seeded lowest height of a host mesh
pub fn mesh_lowest_height<H: MeshQuery + ?Sized>(host: &H, mesh: MeshId) -> PrepResult<f64> {
    Ok(lowest_height(&host.vertex_positions(mesh)?))
}

/// Mesh data of `object`, or a precondition failure naming the object
pub fn object_mesh<H: SceneGraph + ?Sized>(host: &H, object: ObjectId) -> PrepResult<MeshId> {
    host.object_data(object)?
        .mesh()
        .ok_or_else(|| PreconditionError::NotAMesh(host.object_name(object).unwrap_or_default()).into())
}

/// Whether any face of `mesh` is selected
pub fn has_face_selection<H: MeshQuery + ?Sized>(host: &H, mesh: MeshId) -> PrepResult<bool> {
    Ok(host.selected_face_count(mesh)? > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Mesh;
    use crate::host::{ObjectData, SceneGraph};
    use crate::projection::CameraData;
    use crate::scene::Scene;
    use crate::error::PrepError;

    #[test]
    fn test_round_to_micro() {
        assert_eq!(round_to(-120.000_000_4, 1e-6), -120.0);
        assert_eq!(round_to(-0.000_000_4, 1e-6), 0.0);
        assert_eq!(round_to(1.234_567_8, 1e-6), 1.234_568);
    }

    #[test]
    fn test_lowest_height_negative() {
        let points = [
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(0.0, 0.0, -120.0),
            Point3::new(0.0, 0.0, -3.0),
        ];
        assert_eq!(lowest_height(&points), -120.0);
    }

    #[test]
    fn test_lowest_height_keeps_seed_above_plane() {
        let points = [Point3::new(0.0, 0.0, 5.0), Point3::new(0.0, 0.0, 2.0)];
        assert_eq!(lowest_height(&points), 0.0);
        assert_eq!(lowest_height(&[]), 0.0);
    }

    #[test]
    fn test_object_mesh_rejects_camera() {
        let mut scene = Scene::new();
        let cam = scene.create_object("Cam", ObjectData::Camera(CameraData::new()));
        assert_eq!(
            object_mesh(&scene, cam),
            Err(PrepError::Precondition(PreconditionError::NotAMesh("Cam".into())))
        );
    }

    #[test]
    fn test_face_selection_query() {
        let mut scene = Scene::new();
        let obj = scene.add_mesh_object("Part", Mesh::cube(1.0));
        let mesh = object_mesh(&scene, obj).unwrap();
        assert!(!has_face_selection(&scene, mesh).unwrap());
        scene.mesh_mut(mesh).unwrap().faces[3].selected = true;
        assert!(has_face_selection(&scene, mesh).unwrap());
        assert_eq!(mesh_lowest_height(&scene, mesh).unwrap(), -0.5);
    }
}
