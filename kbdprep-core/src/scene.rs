/// In-memory scene implementing every host capability
use std::collections::BTreeMap;

use nalgebra::Point3;
use tracing::debug;

use crate::config::DEFAULT_RESOLUTION;
use crate::error::{PrepError, PrepResult};
use crate::geometry::Mesh;
use crate::host::{
    EditMode, MeshId, MeshMutate, MeshQuery, ObjectData, ObjectId, SceneGraph, UvProjection,
    ViewportControl,
};
use crate::projection::{Camera, CameraData};
use crate::settings::ToolSettings;
use crate::stl;
use crate::transform::Transform;
use crate::uv::{self, ProjectOptions};

#[derive(Debug, Clone)]
struct ObjectEntry {
    name: String,
    data: ObjectData,
    transform: Transform,
    parent: Option<ObjectId>,
    track_to: Option<ObjectId>,
    selected: bool,
}

#[derive(Debug, Clone)]
struct MeshEntry {
    name: String,
    mesh: Mesh,
    updates: u32,
}

/// State of the 3D viewport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportState {
    /// Looking through the active camera.
    pub camera_view: bool,
    /// Number of region refreshes requested.
    pub refreshes: u32,
}

/// A scene document: objects, mesh data, modes and tool settings
#[derive(Debug, Clone)]
pub struct Scene {
    objects: BTreeMap<ObjectId, ObjectEntry>,
    meshes: BTreeMap<MeshId, MeshEntry>,
    next_object: u32,
    next_mesh: u32,
    active: Option<ObjectId>,
    active_camera: Option<ObjectId>,
    mode: EditMode,
    viewport: ViewportState,
    resolution: (u32, u32),
    pub settings: ToolSettings,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            meshes: BTreeMap::new(),
            next_object: 0,
            next_mesh: 0,
            active: None,
            active_camera: None,
            mode: EditMode::Object,
            viewport: ViewportState::default(),
            resolution: DEFAULT_RESOLUTION,
            settings: ToolSettings::default(),
        }
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = (width, height);
        self
    }

    /// Create a mesh data block and an object using it
    pub fn add_mesh_object(&mut self, name: &str, mesh: Mesh) -> ObjectId {
        let mesh_id = self.new_mesh(name, mesh);
        self.create_object(name, ObjectData::Mesh(mesh_id))
    }

    /// Create an object sharing an existing mesh data block
    pub fn add_linked_object(&mut self, name: &str, mesh: MeshId) -> ObjectId {
        self.create_object(name, ObjectData::Mesh(mesh))
    }

    /// Import an STL file as a new, active and selected mesh object
    pub fn import_stl(&mut self, name: &str, data: &[u8]) -> PrepResult<ObjectId> {
        let mesh = stl::parse_stl(data)?;
        let (vertices, faces) = (mesh.vertex_count(), mesh.face_count());
        let object = self.add_mesh_object(name, mesh);
        self.select_only(object);
        debug!(?object, vertices, faces, "Imported STL");
        Ok(object)
    }

    /// Make `object` the active and only selected object
    pub fn select_only(&mut self, object: ObjectId) {
        for (id, entry) in &mut self.objects {
            entry.selected = *id == object;
        }
        self.active = self.objects.contains_key(&object).then_some(object);
    }

    pub fn set_active(&mut self, object: Option<ObjectId>) {
        self.active = object;
    }

    pub fn objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.keys().copied()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of objects whose name is exactly `name`
    pub fn count_named(&self, name: &str) -> usize {
        self.objects.values().filter(|o| o.name == name).count()
    }

    pub fn mesh(&self, mesh: MeshId) -> Option<&Mesh> {
        self.meshes.get(&mesh).map(|m| &m.mesh)
    }

    pub fn mesh_mut(&mut self, mesh: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(&mesh).map(|m| &mut m.mesh)
    }

    /// Mesh carried by an object, if any
    pub fn object_mesh(&self, object: ObjectId) -> Option<&Mesh> {
        let data = self.objects.get(&object)?.data;
        self.mesh(data.mesh()?)
    }

    pub fn mesh_name(&self, mesh: MeshId) -> Option<&str> {
        self.meshes.get(&mesh).map(|m| m.name.as_str())
    }

    /// How often a mesh has been committed
    pub fn mesh_updates(&self, mesh: MeshId) -> u32 {
        self.meshes.get(&mesh).map_or(0, |m| m.updates)
    }

    pub fn parent(&self, object: ObjectId) -> Option<ObjectId> {
        self.objects.get(&object)?.parent
    }

    pub fn track_target(&self, object: ObjectId) -> Option<ObjectId> {
        self.objects.get(&object)?.track_to
    }

    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    fn object(&self, object: ObjectId) -> PrepResult<&ObjectEntry> {
        self.objects
            .get(&object)
            .ok_or(PrepError::UnknownObject(object))
    }

    fn object_entry_mut(&mut self, object: ObjectId) -> PrepResult<&mut ObjectEntry> {
        self.objects
            .get_mut(&object)
            .ok_or(PrepError::UnknownObject(object))
    }

    fn mesh_entry(&self, mesh: MeshId) -> PrepResult<&MeshEntry> {
        self.meshes.get(&mesh).ok_or(PrepError::UnknownMesh(mesh))
    }

    fn mesh_entry_mut(&mut self, mesh: MeshId) -> PrepResult<&mut MeshEntry> {
        self.meshes.get_mut(&mesh).ok_or(PrepError::UnknownMesh(mesh))
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a name collision with a `.001`-style suffix
fn unique_name(base: &str, mut taken: impl FnMut(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    let stem = match base.rsplit_once('.') {
        Some((stem, suffix)) if suffix.len() == 3 && suffix.bytes().all(|b| b.is_ascii_digit()) => {
            stem
        }
        _ => base,
    };
    (1..)
        .map(|n| format!("{stem}.{n:03}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

impl MeshQuery for Scene {
    fn vertex_positions(&self, mesh: MeshId) -> PrepResult<Vec<Point3<f64>>> {
        Ok(self.mesh_entry(mesh)?.mesh.positions.clone())
    }

    fn selected_face_count(&self, mesh: MeshId) -> PrepResult<usize> {
        Ok(self.mesh_entry(mesh)?.mesh.selected_face_count())
    }

    fn selected_vertices(&self, mesh: MeshId) -> PrepResult<Vec<usize>> {
        Ok(self.mesh_entry(mesh)?.mesh.selected_vertices())
    }

    fn face_count(&self, mesh: MeshId) -> PrepResult<usize> {
        Ok(self.mesh_entry(mesh)?.mesh.face_count())
    }
}

impl MeshMutate for Scene {
    fn load_mesh(&self, mesh: MeshId) -> PrepResult<Mesh> {
        Ok(self.mesh_entry(mesh)?.mesh.clone())
    }

    fn write_mesh(&mut self, mesh: MeshId, data: Mesh) -> PrepResult<()> {
        self.mesh_entry_mut(mesh)?.mesh = data;
        Ok(())
    }

    fn update_mesh(&mut self, mesh: MeshId) -> PrepResult<()> {
        self.mesh_entry_mut(mesh)?.updates += 1;
        Ok(())
    }

    fn set_vertex_selected(
        &mut self,
        mesh: MeshId,
        vertex: usize,
        selected: bool,
    ) -> PrepResult<()> {
        let entry = self.mesh_entry_mut(mesh)?;
        if let Some(flag) = entry.mesh.vertex_selection.get_mut(vertex) {
            *flag = selected;
        }
        Ok(())
    }

    fn set_face_selected(&mut self, mesh: MeshId, face: usize, selected: bool) -> PrepResult<()> {
        let entry = self.mesh_entry_mut(mesh)?;
        if let Some(face) = entry.mesh.faces.get_mut(face) {
            face.selected = selected;
        }
        Ok(())
    }

    fn new_mesh(&mut self, name: &str, data: Mesh) -> MeshId {
        let name = unique_name(name, |n| self.meshes.values().any(|m| m.name == n));
        let id = MeshId(self.next_mesh);
        self.next_mesh += 1;
        self.meshes.insert(
            id,
            MeshEntry {
                name,
                mesh: data,
                updates: 0,
            },
        );
        id
    }

    fn rename_mesh(&mut self, mesh: MeshId, name: &str) -> PrepResult<()> {
        let current = self.mesh_entry(mesh)?.name.clone();
        let name = unique_name(name, |n| {
            n != current && self.meshes.values().any(|m| m.name == n)
        });
        self.mesh_entry_mut(mesh)?.name = name;
        Ok(())
    }
}

impl SceneGraph for Scene {
    fn find_object(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .find_map(|(id, o)| (o.name == name).then_some(*id))
    }

    fn create_object(&mut self, name: &str, data: ObjectData) -> ObjectId {
        let name = unique_name(name, |n| self.objects.values().any(|o| o.name == n));
        let id = ObjectId(self.next_object);
        self.next_object += 1;
        debug!(?id, name = %name, "Linked object into scene");
        self.objects.insert(
            id,
            ObjectEntry {
                name,
                data,
                transform: Transform::identity(),
                parent: None,
                track_to: None,
                selected: false,
            },
        );
        id
    }

    fn object_name(&self, object: ObjectId) -> PrepResult<String> {
        Ok(self.object(object)?.name.clone())
    }

    fn rename_object(&mut self, object: ObjectId, name: &str) -> PrepResult<()> {
        self.object(object)?;
        let name = unique_name(name, |n| {
            self.objects
                .iter()
                .any(|(id, o)| *id != object && o.name == n)
        });
        self.object_entry_mut(object)?.name = name;
        Ok(())
    }

    fn object_data(&self, object: ObjectId) -> PrepResult<ObjectData> {
        Ok(self.object(object)?.data)
    }

    fn set_camera_data(&mut self, object: ObjectId, data: CameraData) -> PrepResult<()> {
        self.object_entry_mut(object)?.data = ObjectData::Camera(data);
        Ok(())
    }

    fn transform(&self, object: ObjectId) -> PrepResult<Transform> {
        Ok(self.object(object)?.transform)
    }

    fn set_transform(&mut self, object: ObjectId, transform: Transform) -> PrepResult<()> {
        self.object_entry_mut(object)?.transform = transform;
        Ok(())
    }

    fn set_parent(&mut self, child: ObjectId, parent: Option<ObjectId>) -> PrepResult<()> {
        if let Some(parent) = parent {
            self.object(parent)?;
        }
        self.object_entry_mut(child)?.parent = parent;
        Ok(())
    }

    fn add_track_to(&mut self, object: ObjectId, target: ObjectId) -> PrepResult<()> {
        self.object(target)?;
        self.object_entry_mut(object)?.track_to = Some(target);
        Ok(())
    }

    fn active_object(&self) -> Option<ObjectId> {
        self.active
    }

    fn selected_objects(&self) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter_map(|(id, o)| o.selected.then_some(*id))
            .collect()
    }

    fn set_selected(&mut self, object: ObjectId, selected: bool) -> PrepResult<()> {
        self.object_entry_mut(object)?.selected = selected;
        Ok(())
    }

    fn active_camera(&self) -> Option<ObjectId> {
        self.active_camera
    }

    fn set_active_camera(&mut self, camera: ObjectId) -> PrepResult<()> {
        match self.object(camera)?.data {
            ObjectData::Camera(_) => {
                self.active_camera = Some(camera);
                Ok(())
            }
            _ => Err(PrepError::MissingInput("camera object")),
        }
    }

    fn mode(&self) -> EditMode {
        self.mode
    }

    fn set_mode(&mut self, mode: EditMode) {
        self.mode = mode;
    }

    fn resolution(&self) -> (u32, u32) {
        self.resolution
    }
}

impl ViewportControl for Scene {
    fn view_camera(&mut self) {
        self.viewport.camera_view = true;
    }

    fn refresh_view(&mut self) {
        self.viewport.refreshes += 1;
    }
}

impl UvProjection for Scene {
    fn project_from_view(
        &mut self,
        object: ObjectId,
        options: ProjectOptions,
    ) -> PrepResult<usize> {
        let camera_id = self
            .active_camera
            .ok_or(PrepError::MissingInput("active camera"))?;
        let camera_entry = self.object(camera_id)?;
        let ObjectData::Camera(data) = camera_entry.data else {
            return Err(PrepError::MissingInput("active camera"));
        };
        let camera = Camera::new(data, camera_entry.transform);

        let entry = self.object(object)?;
        let model = entry.transform.matrix();
        let mesh_id = entry
            .data
            .mesh()
            .ok_or(PrepError::UnknownObject(object))?;

        let resolution = self.resolution;
        let mesh = &mut self.mesh_entry_mut(mesh_id)?.mesh;
        Ok(uv::project_selected(mesh, &model, &camera, resolution, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution() {
        assert_eq!(Scene::new().resolution(), DEFAULT_RESOLUTION);
        assert_eq!(Scene::new().with_resolution(512, 512).resolution(), (512, 512));
    }

    #[test]
    fn test_unique_names() {
        let mut scene = Scene::new();
        let a = scene.add_mesh_object("Part", Mesh::cube(1.0));
        let b = scene.add_mesh_object("Part", Mesh::cube(1.0));
        let c = scene.add_mesh_object("Part.001", Mesh::cube(1.0));
        assert_eq!(scene.object_name(a).unwrap(), "Part");
        assert_eq!(scene.object_name(b).unwrap(), "Part.001");
        assert_eq!(scene.object_name(c).unwrap(), "Part.002");
    }

    #[test]
    fn test_rename_keeps_own_name() {
        let mut scene = Scene::new();
        let a = scene.add_mesh_object("Part", Mesh::cube(1.0));
        scene.rename_object(a, "Part").unwrap();
        assert_eq!(scene.object_name(a).unwrap(), "Part");
    }

    #[test]
    fn test_select_only() {
        let mut scene = Scene::new();
        let a = scene.add_mesh_object("A", Mesh::cube(1.0));
        let b = scene.add_mesh_object("B", Mesh::cube(1.0));
        scene.set_selected(a, true).unwrap();
        scene.select_only(b);
        assert_eq!(scene.selected_objects(), vec![b]);
        assert_eq!(scene.active_object(), Some(b));
    }

    #[test]
    fn test_unknown_handles() {
        let scene = Scene::new();
        assert_eq!(
            scene.transform(ObjectId(42)),
            Err(PrepError::UnknownObject(ObjectId(42)))
        );
        assert_eq!(
            scene.face_count(MeshId(7)),
            Err(PrepError::UnknownMesh(MeshId(7)))
        );
    }

    #[test]
    fn test_active_camera_must_be_camera() {
        let mut scene = Scene::new();
        let a = scene.add_mesh_object("A", Mesh::cube(1.0));
        assert!(scene.set_active_camera(a).is_err());
        let cam = scene.create_object("Cam", ObjectData::Camera(CameraData::new()));
        scene.set_active_camera(cam).unwrap();
        assert_eq!(scene.active_camera(), Some(cam));
    }

    #[test]
    fn test_projection_needs_camera() {
        let mut scene = Scene::new();
        let a = scene.add_mesh_object("A", Mesh::cube(1.0));
        assert_eq!(
            scene.project_from_view(a, ProjectOptions::raw_camera_bounds()),
            Err(PrepError::MissingInput("active camera"))
        );
    }
}
