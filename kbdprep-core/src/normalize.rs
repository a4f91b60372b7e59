/// Model normalization: rescale, rotation reset, ground anchoring and split
use nalgebra::Vector3;
use tracing::{info, warn};

use crate::config::SHRINK_FACTOR;
use crate::error::{PreconditionError, PrepResult};
use crate::host::{EditMode, Host, MeshMutate, ObjectId, SceneGraph};
use crate::operator::{require_mode, Operator, Report};
use crate::query::{lowest_height, object_mesh};
use crate::separate::separate_loose;
use crate::transform::{RotationState, Transform};

/// What normalization did to an object
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// Objects after the loose-part split, the input object first.
    pub objects: Vec<ObjectId>,
    /// Seeded lowest height in source units.
    pub lowest_height: f64,
    /// Location applied along +Z before baking.
    pub lift: f64,
    /// Every vertex was above the ground plane, so nothing was lowered.
    pub floating: bool,
}

/// Write an object's transform into its vertices and reset it to identity
pub fn bake_transform<H>(host: &mut H, object: ObjectId) -> PrepResult<()>
where
    H: SceneGraph + MeshMutate + ?Sized,
{
    let mesh_id = object_mesh(host, object)?;
    let transform = host.transform(object)?;
    let mut mesh = host.load_mesh(mesh_id)?;
    mesh.transform(&transform.matrix());
    host.write_mesh(mesh_id, mesh)?;
    host.update_mesh(mesh_id)?;
    host.set_transform(object, Transform::identity())
}

/// Transform that rescales, zero-rotates and lifts a mesh whose seeded
/// lowest height is `lowest_height`
pub fn anchor_transform(lowest_height: f64) -> Transform {
    Transform {
        scale: Vector3::new(SHRINK_FACTOR, SHRINK_FACTOR, SHRINK_FACTOR),
        rotation: RotationState::zero(),
        location: Vector3::new(0.0, 0.0, lowest_height.abs() * SHRINK_FACTOR),
    }
}

/// Normalize `object` and split it into loose parts.
///
/// The lowest vertex height is scanned in source units, rounded to
/// [`HEIGHT_PRECISION`](crate::config::HEIGHT_PRECISION) and seeded at zero.
/// The object is lifted by `|lowest| * SHRINK_FACTOR`, which after baking puts
/// the lowest vertex on `z = 0`. A mesh lying wholly above the plane keeps the
/// seed and is not moved down.
///
/// Requires object mode; nothing is modified when the check fails.
pub fn normalize<H>(host: &mut H, object: ObjectId) -> PrepResult<Normalized>
where
    H: SceneGraph + MeshMutate + ?Sized,
{
    require_mode(host, EditMode::Object)?;
    let mesh_id = object_mesh(host, object)?;

    let mesh = host.load_mesh(mesh_id)?;
    let lowest = lowest_height(&mesh.positions);
    let floating = !mesh.is_empty() && mesh.positions.iter().all(|p| p.z > 0.0);
    if floating {
        warn!(
            object = ?object,
            "Mesh lies above the ground plane; height left at the seeded value"
        );
    }

    let transform = anchor_transform(lowest);
    host.set_transform(object, transform)?;
    bake_transform(host, object)?;
    let objects = separate_loose(host, object)?;

    info!(
        object = ?object,
        lowest = lowest,
        parts = objects.len(),
        "Normalized model"
    );
    Ok(Normalized {
        objects,
        lowest_height: lowest,
        lift: transform.location.z,
        floating,
    })
}

/// Normalize the active object: transform, rotate and separate loose parts
#[derive(Debug, Clone, Default)]
pub struct InitializeModel;

impl<H: Host + ?Sized> Operator<H> for InitializeModel {
    fn name(&self) -> &'static str {
        "initialize_model"
    }

    fn poll(&self, host: &H) -> Result<(), PreconditionError> {
        require_mode(host, EditMode::Object)?;
        let active = host.active_object().ok_or(PreconditionError::NoActiveObject)?;
        match host.object_data(active) {
            Ok(data) if data.mesh().is_some() => Ok(()),
            _ => Err(PreconditionError::NotAMesh(
                host.object_name(active).unwrap_or_default(),
            )),
        }
    }

    fn execute(&mut self, host: &mut H) -> PrepResult<Report> {
        let active = host
            .active_object()
            .ok_or(PreconditionError::NoActiveObject)?;
        let name = host.object_name(active)?;
        let result = normalize(host, active)?;
        let message = format!("Initialized '{name}' into {} part(s)", result.objects.len());
        if result.floating {
            Ok(Report::warning(format!("{message}; model lies above the ground plane")))
        } else {
            Ok(Report::info(message))
        }
    }
}
