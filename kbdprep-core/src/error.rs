/// Error types for the preparation tools
use thiserror::Error;

use crate::host::{EditMode, MeshId, ObjectId};

/// Why an operator refused to run.
///
/// Returned by every precondition check before any state is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreconditionError {
    /// The host is in the wrong editing mode.
    #[error("Expected {expected} mode, found {actual} mode")]
    WrongMode {
        /// Mode the operator needs.
        expected: EditMode,
        /// Mode the host is in.
        actual: EditMode,
    },

    /// No active object.
    #[error("No active object")]
    NoActiveObject,

    /// No objects are selected.
    #[error("No objects selected")]
    NoSelection,

    /// Edit mode with zero selected faces.
    #[error("No Faces Selected")]
    NoFacesSelected,

    /// Edit mode with zero selected vertices.
    #[error("No Vertex Selected")]
    NoVerticesSelected,

    /// The target object carries no mesh.
    #[error("Object '{0}' is not a mesh")]
    NotAMesh(String),

    /// Operator needs exactly one selected object.
    #[error("Expected exactly one selected object, found {0}")]
    MultipleSelection(usize),

    /// Dissolve angle outside the accepted range.
    #[error("Invalid angle: {0} (must be greater than zero)")]
    InvalidAngle(f64),

    /// Rename with an empty name.
    #[error("Name must not be empty")]
    EmptyName,
}

/// Errors raised by STL import.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StlError {
    /// Shorter than the 84 byte binary header.
    #[error("File too small to be a valid STL")]
    TooSmall,

    /// Triangle block truncated.
    #[error("Unexpected end of file at triangle {triangle}")]
    UnexpectedEof {
        /// Index of the triangle that could not be read.
        triangle: usize,
    },

    /// ASCII body failed to parse.
    #[error("Failed to parse ASCII STL: {0}")]
    Ascii(String),
}

/// Errors that can occur while running a tool.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PrepError {
    /// A guarded precondition failed; nothing was mutated.
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// A required scene object does not exist yet.
    #[error("Missing input: {0}")]
    MissingInput(&'static str),

    /// Stale or foreign object handle.
    #[error("Unknown object {0:?}")]
    UnknownObject(ObjectId),

    /// Stale or foreign mesh handle.
    #[error("Unknown mesh {0:?}")]
    UnknownMesh(MeshId),

    /// A user object occupies a name reserved for a tool-owned object.
    #[error("Object '{0}' has a reserved name but the wrong type")]
    ReservedName(String),

    /// A settings value failed validation.
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    /// STL import failed.
    #[error(transparent)]
    Stl(#[from] StlError),
}

/// Result type for preparation tools.
pub type PrepResult<T> = std::result::Result<T, PrepError>;
