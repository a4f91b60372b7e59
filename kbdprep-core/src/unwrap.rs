/// UV projection from the planned camera
use tracing::info;

use crate::camera::{plan_projection_camera, Direction};
use crate::error::{PreconditionError, PrepResult};
use crate::host::{EditMode, Host, MeshQuery, ObjectId, SceneGraph};
use crate::operator::{require_mode, Operator, Report};
use crate::query::has_face_selection;
use crate::uv::ProjectOptions;

/// Active object that a projection would write to.
///
/// Fails unless the host is in edit mode with a mesh object active and at
/// least one face selected.
pub fn projection_target<H>(host: &H) -> Result<ObjectId, PreconditionError>
where
    H: SceneGraph + MeshQuery + ?Sized,
{
    require_mode(host, EditMode::Edit)?;
    let active = host.active_object().ok_or(PreconditionError::NoActiveObject)?;
    let mesh = host
        .object_data(active)
        .map_err(|_| PreconditionError::NoActiveObject)?
        .mesh()
        .ok_or_else(|| PreconditionError::NotAMesh(host.object_name(active).unwrap_or_default()))?;
    match has_face_selection(host, mesh) {
        Ok(true) => Ok(active),
        _ => Err(PreconditionError::NoFacesSelected),
    }
}

/// Project the selected faces' UVs from the camera posed for `direction`.
///
/// Preconditions are checked first; on failure neither the camera nor any
/// UVs are touched. Returns the number of faces projected.
pub fn project_uv<H: Host + ?Sized>(host: &mut H, direction: Direction) -> PrepResult<usize> {
    let target = projection_target(host)?;
    plan_projection_camera(host, direction)?;
    let faces = host.project_from_view(target, ProjectOptions::raw_camera_bounds())?;
    host.view_camera();
    info!(%direction, faces, "Projected UVs from view");
    Ok(faces)
}

/// Project UVs of the selected faces from a fixed view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectUv {
    pub direction: Direction,
}

impl ProjectUv {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }
}

impl<H: Host + ?Sized> Operator<H> for ProjectUv {
    fn name(&self) -> &'static str {
        "project_uv"
    }

    fn poll(&self, host: &H) -> Result<(), PreconditionError> {
        projection_target(host).map(|_| ())
    }

    fn execute(&mut self, host: &mut H) -> PrepResult<Report> {
        project_uv(host, self.direction)?;
        Ok(Report::info(format!(
            "UV projected from '{}' view",
            self.direction
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PROJECTION_CAMERA_NAME;
    use crate::error::PrepError;
    use crate::geometry::Mesh;
    use crate::operator::run;
    use crate::host::MeshMutate;
    use crate::scene::Scene;

    fn edit_scene() -> (Scene, ObjectId) {
        let mut scene = Scene::new();
        let obj = scene.add_mesh_object("Keycap", Mesh::grid_cube(0.2, 1));
        scene.select_only(obj);
        scene.set_mode(EditMode::Edit);
        (scene, obj)
    }

    #[test]
    fn test_no_faces_selected_touches_nothing() {
        let (mut scene, obj) = edit_scene();
        let before = scene.object_mesh(obj).cloned();

        let err = project_uv(&mut scene, Direction::Top).unwrap_err();
        assert_eq!(err, PrepError::Precondition(PreconditionError::NoFacesSelected));
        assert_eq!(scene.find_object(PROJECTION_CAMERA_NAME), None);
        assert_eq!(scene.active_camera(), None);
        assert!(!scene.viewport().camera_view);
        assert_eq!(scene.object_mesh(obj).cloned(), before);
    }

    #[test]
    fn test_requires_edit_mode() {
        let (mut scene, obj) = edit_scene();
        let mesh = scene.object_data(obj).unwrap().mesh().unwrap();
        scene.mesh_mut(mesh).unwrap().select_all(true);
        scene.set_mode(EditMode::Object);
        assert!(matches!(
            project_uv(&mut scene, Direction::Side),
            Err(PrepError::Precondition(PreconditionError::WrongMode { .. }))
        ));
    }

    #[test]
    fn test_projects_selected_faces_only() {
        let (mut scene, obj) = edit_scene();
        let mesh = scene.object_data(obj).unwrap().mesh().unwrap();
        // +Z side of the cube is the last face
        let top = scene.mesh(mesh).unwrap().face_count() - 1;
        scene.set_face_selected(mesh, top, true).unwrap();

        let faces = project_uv(&mut scene, Direction::Top).unwrap();
        assert_eq!(faces, 1);
        let data = scene.mesh(mesh).unwrap();
        assert!(data.faces[top].uvs.is_some());
        assert!(data.faces[..top].iter().all(|f| f.uvs.is_none()));
        assert!(scene.viewport().camera_view);
    }

    #[test]
    fn test_repeated_projection_overwrites() {
        let (mut scene, obj) = edit_scene();
        let mesh = scene.object_data(obj).unwrap().mesh().unwrap();
        scene.mesh_mut(mesh).unwrap().select_all(true);

        project_uv(&mut scene, Direction::Side).unwrap();
        let side = scene.mesh(mesh).unwrap().faces[0].uvs.clone();
        project_uv(&mut scene, Direction::Bottom).unwrap();
        let bottom = scene.mesh(mesh).unwrap().faces[0].uvs.clone();
        assert_ne!(side, bottom);
        assert_eq!(scene.count_named(PROJECTION_CAMERA_NAME), 1);
    }

    #[test]
    fn test_operator_report() {
        let (mut scene, obj) = edit_scene();
        let mesh = scene.object_data(obj).unwrap().mesh().unwrap();
        scene.mesh_mut(mesh).unwrap().select_all(true);
        let report = run(&mut ProjectUv::new(Direction::Bottom), &mut scene).unwrap();
        assert_eq!(report.message, "UV projected from 'bottom' view");
    }
}
