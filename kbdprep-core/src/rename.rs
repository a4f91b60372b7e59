/// Rename selected objects and their mesh data
use tracing::info;

use crate::error::{PreconditionError, PrepResult};
use crate::host::{Host, MeshMutate, SceneGraph};
use crate::operator::{Operator, Report};

/// Give every selected object, and its mesh data, the same name.
///
/// Collisions are resolved by the host, so the second object becomes
/// `name.001` and so on.
pub fn rename_selected<H>(host: &mut H, name: &str) -> PrepResult<usize>
where
    H: SceneGraph + MeshMutate + ?Sized,
{
    if name.trim().is_empty() {
        return Err(PreconditionError::EmptyName.into());
    }
    let selected = host.selected_objects();
    if selected.is_empty() {
        return Err(PreconditionError::NoSelection.into());
    }
    for &object in &selected {
        host.rename_object(object, name)?;
        if let Some(mesh) = host.object_data(object)?.mesh() {
            host.rename_mesh(mesh, name)?;
        }
    }
    info!(name, count = selected.len(), "Renamed selection");
    Ok(selected.len())
}

/// Set the name of the selected objects and their data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameSelected {
    pub name: String,
}

impl RenameSelected {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl<H: Host + ?Sized> Operator<H> for RenameSelected {
    fn name(&self) -> &'static str {
        "rename_selected"
    }

    fn poll(&self, host: &H) -> Result<(), PreconditionError> {
        if self.name.trim().is_empty() {
            return Err(PreconditionError::EmptyName);
        }
        if host.selected_objects().is_empty() {
            return Err(PreconditionError::NoSelection);
        }
        Ok(())
    }

    fn execute(&mut self, host: &mut H) -> PrepResult<Report> {
        rename_selected(host, &self.name)?;
        Ok(Report::info(format!("Object renamed: '{}'", self.name)))
    }
}
