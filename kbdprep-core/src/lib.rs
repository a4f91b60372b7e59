/// KBDPrep Core Library - Mesh preparation tools for keyboard CAD models
///
/// Normalizes imported CAD parts, splits them into loose pieces, simplifies
/// their topology and projects UVs from fixed orthographic views. Tools run
/// against any host implementing the capability traits in [`host`]; the
/// in-memory [`scene::Scene`] is the reference implementation.

pub mod camera;
pub mod config;
pub mod coverage;
pub mod dissolve;
pub mod error;
pub mod geometry;
pub mod host;
pub mod normalize;
pub mod operator;
pub mod origin;
pub mod projection;
pub mod query;
pub mod registry;
pub mod rename;
pub mod scene;
pub mod separate;
pub mod settings;
pub mod stl;
pub mod transform;
pub mod unwrap;
pub mod uv;

mod union_find;

// Re-export commonly used types
pub use camera::{plan_projection_camera, CameraPose, Direction};
pub use coverage::{InitCoverageRig, SetCoverageTarget};
pub use dissolve::{dissolve_limited, dissolve_selected, DissolveStats, LimitedDissolve};
pub use error::{PreconditionError, PrepError, PrepResult, StlError};
pub use geometry::{Face, Mesh};
pub use host::{
    EditMode, Host, MeshId, MeshMutate, MeshQuery, ObjectData, ObjectId, SceneGraph,
    UvProjection, ViewportControl,
};
pub use normalize::{normalize, InitializeModel, Normalized};
pub use operator::{run, Operator, Report, ReportLevel};
pub use origin::VertexToOrigin;
pub use projection::{Camera, CameraData, ProjectionMode};
pub use rename::RenameSelected;
pub use scene::Scene;
pub use separate::separate_loose;
pub use settings::{DissolveAngle, ToolSettings};
pub use transform::{RotationState, Transform};
pub use unwrap::{project_uv, ProjectUv};
pub use uv::ProjectOptions;
