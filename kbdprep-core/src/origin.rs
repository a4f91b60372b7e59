/// Move an object's origin onto a selected vertex
use nalgebra::{Matrix4, Point3};
use tracing::info;

use crate::error::{PreconditionError, PrepResult};
use crate::host::{EditMode, Host, MeshId, MeshMutate, MeshQuery, ObjectId, SceneGraph};
use crate::operator::{require_mode, single_selection, Operator, Report};

/// Object, mesh and vertex the origin would move to
fn origin_target<H>(host: &H) -> Result<(ObjectId, MeshId, usize), PreconditionError>
where
    H: SceneGraph + MeshQuery + ?Sized,
{
    require_mode(host, EditMode::Edit)?;
    let object = single_selection(host)?;
    let mesh = host
        .object_data(object)
        .ok()
        .and_then(|data| data.mesh())
        .ok_or_else(|| PreconditionError::NotAMesh(host.object_name(object).unwrap_or_default()))?;
    let vertex = host
        .selected_vertices(mesh)
        .ok()
        .and_then(|selected| selected.first().copied())
        .ok_or(PreconditionError::NoVerticesSelected)?;
    Ok((object, mesh, vertex))
}

/// Move the origin of the selected object to its first selected vertex.
///
/// World-space geometry does not move: vertices are shifted by the opposite
/// offset. Returns the new origin in world space.
pub fn origin_to_selected_vertex<H>(host: &mut H) -> PrepResult<Point3<f64>>
where
    H: SceneGraph + MeshQuery + MeshMutate + ?Sized,
{
    let (object, mesh_id, vertex) = origin_target(host)?;
    let mut transform = host.transform(object)?;
    let mut mesh = host.load_mesh(mesh_id)?;
    let local = mesh.positions[vertex];
    let world = transform.apply(&local);

    host.set_mode(EditMode::Object);
    mesh.transform(&Matrix4::new_translation(&-local.coords));
    host.write_mesh(mesh_id, mesh)?;
    host.update_mesh(mesh_id)?;
    transform.location = world.coords;
    host.set_transform(object, transform)?;
    host.set_mode(EditMode::Edit);

    info!(?object, vertex, "Moved origin to selected vertex");
    Ok(world)
}

/// Origin to selected vertex
#[derive(Debug, Clone, Copy, Default)]
pub struct VertexToOrigin;

impl<H: Host + ?Sized> Operator<H> for VertexToOrigin {
    fn name(&self) -> &'static str {
        "vertex_to_origin"
    }

    fn poll(&self, host: &H) -> Result<(), PreconditionError> {
        origin_target(host).map(|_| ())
    }

    fn execute(&mut self, host: &mut H) -> PrepResult<Report> {
        origin_to_selected_vertex(host)?;
        Ok(Report::info("Object Origin Updated"))
    }
}
