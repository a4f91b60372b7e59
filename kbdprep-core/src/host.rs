/// Capability traits the tools use to talk to the host editor
use std::fmt;

use nalgebra::Point3;

use crate::error::PrepResult;
use crate::geometry::Mesh;
use crate::projection::CameraData;
use crate::transform::Transform;
use crate::uv::ProjectOptions;

/// Handle to an object in the scene graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

/// Handle to a mesh data block, shareable between objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

/// Host editing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditMode {
    /// Whole objects are edited.
    Object,
    /// The active mesh's elements are edited.
    Edit,
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object => f.write_str("OBJECT"),
            Self::Edit => f.write_str("EDIT"),
        }
    }
}

/// What an object carries
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectData {
    Mesh(MeshId),
    Camera(CameraData),
    Empty,
}

impl ObjectData {
    pub fn mesh(&self) -> Option<MeshId> {
        match self {
            Self::Mesh(id) => Some(*id),
            _ => None,
        }
    }
}

/// Read access to mesh data
pub trait MeshQuery {
    fn vertex_positions(&self, mesh: MeshId) -> PrepResult<Vec<Point3<f64>>>;

    fn selected_face_count(&self, mesh: MeshId) -> PrepResult<usize>;

    fn selected_vertices(&self, mesh: MeshId) -> PrepResult<Vec<usize>>;

    fn face_count(&self, mesh: MeshId) -> PrepResult<usize>;
}

/// Write access to mesh data
pub trait MeshMutate {
    /// Copy a mesh into a working buffer.
    fn load_mesh(&self, mesh: MeshId) -> PrepResult<Mesh>;

    /// Replace a mesh's contents with a working buffer.
    fn write_mesh(&mut self, mesh: MeshId, data: Mesh) -> PrepResult<()>;

    /// Signal that dependent state must be refreshed after a write.
    fn update_mesh(&mut self, mesh: MeshId) -> PrepResult<()>;

    fn set_vertex_selected(&mut self, mesh: MeshId, vertex: usize, selected: bool)
        -> PrepResult<()>;

    fn set_face_selected(&mut self, mesh: MeshId, face: usize, selected: bool) -> PrepResult<()>;

    /// Create a new mesh data block.
    fn new_mesh(&mut self, name: &str, data: Mesh) -> MeshId;

    fn rename_mesh(&mut self, mesh: MeshId, name: &str) -> PrepResult<()>;
}

/// Objects, names, transforms and modes
pub trait SceneGraph {
    fn find_object(&self, name: &str) -> Option<ObjectId>;

    /// Create an object and link it into the scene.
    ///
    /// Name collisions are resolved by the host; the returned handle is the
    /// only reliable way to reach the new object.
    fn create_object(&mut self, name: &str, data: ObjectData) -> ObjectId;

    fn object_name(&self, object: ObjectId) -> PrepResult<String>;

    fn rename_object(&mut self, object: ObjectId, name: &str) -> PrepResult<()>;

    fn object_data(&self, object: ObjectId) -> PrepResult<ObjectData>;

    fn set_camera_data(&mut self, object: ObjectId, data: CameraData) -> PrepResult<()>;

    fn transform(&self, object: ObjectId) -> PrepResult<Transform>;

    fn set_transform(&mut self, object: ObjectId, transform: Transform) -> PrepResult<()>;

    fn set_parent(&mut self, child: ObjectId, parent: Option<ObjectId>) -> PrepResult<()>;

    /// Add a constraint that keeps `object` aimed at `target`.
    fn add_track_to(&mut self, object: ObjectId, target: ObjectId) -> PrepResult<()>;

    fn active_object(&self) -> Option<ObjectId>;

    fn selected_objects(&self) -> Vec<ObjectId>;

    fn set_selected(&mut self, object: ObjectId, selected: bool) -> PrepResult<()>;

    fn active_camera(&self) -> Option<ObjectId>;

    fn set_active_camera(&mut self, camera: ObjectId) -> PrepResult<()>;

    fn mode(&self) -> EditMode;

    fn set_mode(&mut self, mode: EditMode);

    /// Render resolution the camera frame is sized against.
    fn resolution(&self) -> (u32, u32);
}

/// 3D viewport control
pub trait ViewportControl {
    /// Look through the active camera.
    fn view_camera(&mut self);

    /// Redraw view regions so they reflect the current camera.
    fn refresh_view(&mut self);
}

/// UV projection service
pub trait UvProjection {
    /// Project the selected faces of `object` from the active camera.
    ///
    /// Returns the number of faces that received UVs.
    fn project_from_view(&mut self, object: ObjectId, options: ProjectOptions)
        -> PrepResult<usize>;
}

/// Everything the operators need from a host.
///
/// Each capability group is its own trait so a host can be assembled from
/// separate services; this bundle is implemented for any type providing all
/// five.
pub trait Host: MeshQuery + MeshMutate + SceneGraph + ViewportControl + UvProjection {}

impl<T> Host for T where T: MeshQuery + MeshMutate + SceneGraph + ViewportControl + UvProjection {}
