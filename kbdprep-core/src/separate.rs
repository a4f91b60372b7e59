/// Loose-part separation into one object per connected piece
use tracing::{debug, info};

use crate::error::PrepResult;
use crate::geometry::{Face, Mesh};
use crate::host::{EditMode, MeshId, MeshMutate, ObjectData, ObjectId, SceneGraph};
use crate::query::object_mesh;
use crate::transform::Transform;
use crate::union_find::DisjointSet;

/// Vertex indices of each loose part, ordered by lowest vertex index
pub fn loose_parts(mesh: &Mesh) -> Vec<Vec<usize>> {
    let mut set = DisjointSet::new(mesh.vertex_count());
    for face in &mesh.faces {
        for (a, b) in face.edges() {
            set.union(a, b);
        }
    }
    for [a, b] in &mesh.loose_edges {
        set.union(*a, *b);
    }
    set.groups()
}

/// Split a mesh into one mesh per loose part
pub fn split_loose(mesh: &Mesh) -> Vec<Mesh> {
    let parts = loose_parts(mesh);
    if parts.len() <= 1 {
        return vec![mesh.clone()];
    }

    // vertex -> (part, local index)
    let mut owner = vec![(0usize, 0usize); mesh.vertex_count()];
    let mut out: Vec<Mesh> = parts
        .iter()
        .enumerate()
        .map(|(part, vertices)| {
            let mut sub = Mesh::with_capacity(vertices.len(), 0);
            for &v in vertices {
                owner[v] = (part, sub.add_vertex(mesh.positions[v]));
                sub.vertex_selection[owner[v].1] = mesh.vertex_selection[v];
            }
            sub
        })
        .collect();

    for face in &mesh.faces {
        let Some(&first) = face.vertices.first() else {
            continue;
        };
        let part = owner[first].0;
        out[part].faces.push(Face {
            vertices: face.vertices.iter().map(|&v| owner[v].1).collect(),
            ..face.clone()
        });
    }
    for [a, b] in &mesh.loose_edges {
        let part = owner[*a].0;
        out[part].add_loose_edge(owner[*a].1, owner[*b].1);
    }

    out
}

/// Split `object` into one object per loose part.
///
/// The original object keeps the first part; every other part becomes a new
/// selected object with the same transform and a `.NNN` name. Returns all
/// resulting objects, the original first.
pub fn separate_loose<H>(host: &mut H, object: ObjectId) -> PrepResult<Vec<ObjectId>>
where
    H: SceneGraph + MeshMutate + ?Sized,
{
    let mesh_id = object_mesh(host, object)?;
    let name = host.object_name(object)?;
    let transform = host.transform(object)?;
    let source = host.load_mesh(mesh_id)?;

    let previous_mode = host.mode();
    host.set_mode(EditMode::Edit);
    // Leave edit mode whether or not the split went through
    let result = write_parts(host, object, mesh_id, &name, transform, split_loose(&source));
    host.set_mode(previous_mode);

    let objects = result?;
    info!(object = %name, parts = objects.len(), "Separated loose parts");
    Ok(objects)
}

fn write_parts<H>(
    host: &mut H,
    object: ObjectId,
    mesh_id: MeshId,
    name: &str,
    transform: Transform,
    parts: Vec<Mesh>,
) -> PrepResult<Vec<ObjectId>>
where
    H: SceneGraph + MeshMutate + ?Sized,
{
    let mut parts = parts.into_iter();
    let mut objects = vec![object];
    if let Some(first) = parts.next() {
        host.write_mesh(mesh_id, first)?;
        host.update_mesh(mesh_id)?;
    }
    for part in parts {
        let part_mesh = host.new_mesh(name, part);
        let part_object = host.create_object(name, ObjectData::Mesh(part_mesh));
        host.set_transform(part_object, transform)?;
        host.set_selected(part_object, true)?;
        debug!(object = ?part_object, "Created loose part object");
        objects.push(part_object);
    }
    Ok(objects)
}
