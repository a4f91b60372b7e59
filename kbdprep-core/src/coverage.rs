/// Camera coverage rig: an orthographic camera tracking an empty
use nalgebra::Vector3;
use tracing::info;

use crate::error::{PreconditionError, PrepError, PrepResult};
use crate::host::{Host, ObjectId, SceneGraph, ViewportControl};
use crate::operator::{single_selection, Operator, Report};
use crate::registry::{self, Reserved};

/// Get or create the rig and look through its camera.
///
/// Parenting and the track-to constraint are only set up when the camera is
/// first created. Returns the camera.
pub fn init_coverage_rig<H>(host: &mut H) -> PrepResult<ObjectId>
where
    H: SceneGraph + ViewportControl + ?Sized,
{
    let empty = registry::get_or_create(host, Reserved::CoverageEmpty).id;
    let camera = registry::get_or_create(host, Reserved::CoverageCamera);
    if camera.created {
        host.set_parent(camera.id, Some(empty))?;
        host.add_track_to(camera.id, empty)?;
    }
    host.set_active_camera(camera.id)?;
    host.view_camera();
    Ok(camera.id)
}

/// Move the rig's empty onto the selected object's location
pub fn set_coverage_target<H: SceneGraph + ?Sized>(host: &mut H) -> PrepResult<Vector3<f64>> {
    let target = single_selection(host)?;
    let empty = registry::find(host, Reserved::CoverageEmpty)
        .ok_or(PrepError::MissingInput("coverage empty"))?;

    let location = host.transform(target)?.location;
    let mut transform = host.transform(empty)?;
    transform.location = location;
    host.set_transform(empty, transform)?;
    info!(?target, x = location.x, y = location.y, z = location.z, "Moved coverage target");
    Ok(location)
}

/// Add a camera tracked to an empty
#[derive(Debug, Clone, Copy, Default)]
pub struct InitCoverageRig;

impl<H: Host + ?Sized> Operator<H> for InitCoverageRig {
    fn name(&self) -> &'static str {
        "init_coverage_rig"
    }

    fn poll(&self, _host: &H) -> Result<(), PreconditionError> {
        Ok(())
    }

    fn execute(&mut self, host: &mut H) -> PrepResult<Report> {
        init_coverage_rig(host)?;
        Ok(Report::info("Camera Initialized"))
    }
}

/// Set the rig's empty to the selected object
#[derive(Debug, Clone, Copy, Default)]
pub struct SetCoverageTarget;

impl<H: Host + ?Sized> Operator<H> for SetCoverageTarget {
    fn name(&self) -> &'static str {
        "set_coverage_target"
    }

    fn poll(&self, host: &H) -> Result<(), PreconditionError> {
        single_selection(host).map(|_| ())
    }

    fn execute(&mut self, host: &mut H) -> PrepResult<Report> {
        let location = set_coverage_target(host)?;
        Ok(Report::info(format!(
            "Empty set to ({:.4}, {:.4}, {:.4})",
            location.x, location.y, location.z
        )))
    }
}
