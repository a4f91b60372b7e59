/// Reserved scene objects, created on first use and reused afterwards
use tracing::{debug, info};

use crate::config::{COVERAGE_CAMERA_NAME, COVERAGE_EMPTY_NAME, PROJECTION_CAMERA_NAME};
use crate::host::{ObjectData, ObjectId, SceneGraph};
use crate::projection::CameraData;

/// Identifiers of the singleton objects the tools maintain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reserved {
    /// Orthographic camera used for UV projection.
    ProjectionCamera,
    /// Camera of the coverage rig.
    CoverageCamera,
    /// Empty the coverage camera tracks.
    CoverageEmpty,
}

impl Reserved {
    pub fn name(self) -> &'static str {
        match self {
            Self::ProjectionCamera => PROJECTION_CAMERA_NAME,
            Self::CoverageCamera => COVERAGE_CAMERA_NAME,
            Self::CoverageEmpty => COVERAGE_EMPTY_NAME,
        }
    }

    /// Data a freshly created object starts with
    fn initial_data(self) -> ObjectData {
        match self {
            Self::ProjectionCamera | Self::CoverageCamera => {
                ObjectData::Camera(CameraData::orthographic(CameraData::new().ortho_scale))
            }
            Self::CoverageEmpty => ObjectData::Empty,
        }
    }
}

/// Result of a get-or-create lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup {
    pub id: ObjectId,
    /// True when the object did not exist before this call.
    pub created: bool,
}

/// Find an existing reserved object by name
pub fn find<H: SceneGraph + ?Sized>(host: &H, reserved: Reserved) -> Option<ObjectId> {
    host.find_object(reserved.name())
}

/// Return the reserved object, creating and linking it if it is missing.
///
/// The name is checked before anything is created, so repeated calls never
/// produce a second object.
pub fn get_or_create<H: SceneGraph + ?Sized>(host: &mut H, reserved: Reserved) -> Lookup {
    if let Some(id) = find(host, reserved) {
        debug!(name = reserved.name(), ?id, "Reusing reserved object");
        return Lookup { id, created: false };
    }
    let id = host.create_object(reserved.name(), reserved.initial_data());
    info!(name = reserved.name(), ?id, "Created reserved object");
    Lookup { id, created: true }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;

    #[test]
    fn test_get_or_create_is_idempotent() {
        let mut scene = Scene::new();
        let first = get_or_create(&mut scene, Reserved::ProjectionCamera);
        assert!(first.created);
        for _ in 0..5 {
            let again = get_or_create(&mut scene, Reserved::ProjectionCamera);
            assert!(!again.created);
            assert_eq!(again.id, first.id);
        }
        assert_eq!(scene.count_named(PROJECTION_CAMERA_NAME), 1);
        assert_eq!(scene.object_count(), 1);
    }

    #[test]
    fn test_reserved_kinds() {
        let mut scene = Scene::new();
        let empty = get_or_create(&mut scene, Reserved::CoverageEmpty).id;
        let camera = get_or_create(&mut scene, Reserved::CoverageCamera).id;
        assert_eq!(scene.object_data(empty).unwrap(), ObjectData::Empty);
        assert!(matches!(
            scene.object_data(camera).unwrap(),
            ObjectData::Camera(CameraData { mode: crate::projection::ProjectionMode::Orthographic, .. })
        ));
        assert_eq!(find(&scene, Reserved::ProjectionCamera), None);
    }
}
