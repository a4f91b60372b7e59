/// Limited dissolve: merge near-coplanar faces and straight-edge vertices
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use nalgebra::Vector3;
use tracing::{debug, info};

use crate::error::{PreconditionError, PrepResult};
use crate::geometry::{edge_key, Face, Mesh};
use crate::host::{EditMode, Host, MeshId, MeshMutate, SceneGraph};
use crate::operator::{require_mode, Operator, Report};
use crate::settings::ToolSettings;
use crate::union_find::DisjointSet;

/// Counts before and after a dissolve pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DissolveStats {
    pub faces_before: usize,
    pub faces_after: usize,
    pub vertices_before: usize,
    pub vertices_after: usize,
}

impl DissolveStats {
    pub fn is_noop(&self) -> bool {
        self.faces_before == self.faces_after && self.vertices_before == self.vertices_after
    }
}

/// Dissolve near-coplanar geometry of `mesh` in place.
///
/// `angle_limit` is in radians. Faces and straight-edge vertices whose angle
/// is strictly below the limit are merged. Passes repeat until one changes
/// nothing, so a second call with the same limit is a no-op:
///
/// 1. Every manifold edge whose two face normals differ by less than the limit
///    is a merge candidate. Candidates are visited flattest first.
/// 2. Faces are grouped into regions with a disjoint set. A region keeps the
///    normal of the face it grew from, and a merge is only accepted when every
///    face of both regions stays within the limit of that normal.
/// 3. Each region whose outline is a single simple loop becomes one polygon.
///    Regions with holes or inconsistent winding are left as they were.
/// 4. Vertices left with exactly two neighbours on a straight line (within the
///    limit) are removed from every face that uses them, as long as no face
///    drops below three corners.
/// 5. Vertices no longer referenced are dropped.
pub fn dissolve_limited(mesh: &mut Mesh, angle_limit: f64) -> DissolveStats {
    let mut stats = DissolveStats {
        faces_before: mesh.face_count(),
        vertices_before: mesh.vertex_count(),
        ..Default::default()
    };

    if angle_limit > 0.0 {
        // Merged polygons get a new normal and lose straight corners, which
        // can bring a rejected neighbour within the limit. Repeat until stable.
        let mut passes = 0;
        loop {
            let before = footprint(mesh);
            merge_faces(mesh, angle_limit);
            dissolve_straight_vertices(mesh, angle_limit);
            mesh.remove_unused_vertices();
            passes += 1;
            if footprint(mesh) == before {
                break;
            }
        }
        debug!(passes, "Limited dissolve reached a fixed point");
    }

    stats.faces_after = mesh.face_count();
    stats.vertices_after = mesh.vertex_count();
    stats
}

/// Face, vertex and corner counts; every dissolve step strictly lowers one
fn footprint(mesh: &Mesh) -> (usize, usize, usize) {
    let corners = mesh.faces.iter().map(|f| f.vertices.len()).sum();
    (mesh.face_count(), mesh.vertex_count(), corners)
}

fn merge_faces(mesh: &mut Mesh, angle_limit: f64) {
    if mesh.face_count() < 2 {
        return;
    }
    let normals: Vec<Vector3<f64>> = (0..mesh.face_count()).map(|f| mesh.face_normal(f)).collect();

    let mut edge_faces: HashMap<[usize; 2], Vec<usize>> = HashMap::new();
    for (f, face) in mesh.faces.iter().enumerate() {
        for (a, b) in face.edges() {
            edge_faces.entry(edge_key(a, b)).or_default().push(f);
        }
    }

    let mut candidates: Vec<(f64, usize, usize)> = edge_faces
        .values()
        .filter_map(|faces| match faces.as_slice() {
            &[f1, f2] if f1 != f2 => {
                let (n1, n2) = (normals[f1], normals[f2]);
                if n1 == Vector3::zeros() || n2 == Vector3::zeros() {
                    return None;
                }
                let angle = n1.angle(&n2);
                (angle < angle_limit).then_some((angle, f1.min(f2), f1.max(f2)))
            }
            _ => None,
        })
        .collect();
    candidates.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then(a.1.cmp(&b.1))
            .then(a.2.cmp(&b.2))
    });

    let mut regions = DisjointSet::new(mesh.face_count());
    let mut reference = normals.clone();
    let mut members: Vec<Vec<usize>> = (0..mesh.face_count()).map(|f| vec![f]).collect();

    for (_, f1, f2) in candidates {
        let (ra, rb) = (regions.find(f1), regions.find(f2));
        if ra == rb {
            continue;
        }
        let seed = reference[ra];
        let fits = members[rb]
            .iter()
            .all(|&f| normals[f].angle(&seed) < angle_limit);
        if !fits {
            continue;
        }
        regions.union(ra, rb);
        let root = regions.find(ra);
        let mut joined = std::mem::take(&mut members[ra]);
        joined.append(&mut members[rb]);
        members[root] = joined;
        reference[root] = seed;
    }

    let mut replaced: HashMap<usize, Face> = HashMap::new();
    let mut dropped: HashSet<usize> = HashSet::new();
    for group in regions.groups() {
        if group.len() < 2 {
            continue;
        }
        match region_outline(mesh, &group) {
            Some(outline) => {
                let merged = Face {
                    vertices: outline,
                    uvs: None,
                    selected: group.iter().any(|&f| mesh.faces[f].selected),
                };
                replaced.insert(group[0], merged);
                dropped.extend(group[1..].iter().copied());
            }
            None => debug!(faces = group.len(), "Region outline is not a single loop; kept"),
        }
    }

    if replaced.is_empty() {
        return;
    }
    let faces = std::mem::take(&mut mesh.faces);
    mesh.faces = faces
        .into_iter()
        .enumerate()
        .filter(|(f, _)| !dropped.contains(f))
        .map(|(f, face)| replaced.remove(&f).unwrap_or(face))
        .collect();
}

/// Outline of a face region as one vertex loop in winding order
fn region_outline(mesh: &Mesh, group: &[usize]) -> Option<Vec<usize>> {
    let mut half_edges: HashSet<(usize, usize)> = HashSet::new();
    for &f in group {
        for edge in mesh.faces[f].edges() {
            // Same direction twice means the region's winding disagrees
            if !half_edges.insert(edge) {
                return None;
            }
        }
    }

    let mut next: HashMap<usize, usize> = HashMap::new();
    for &(a, b) in &half_edges {
        if half_edges.contains(&(b, a)) {
            continue;
        }
        if next.insert(a, b).is_some() {
            return None;
        }
    }

    let start = *next.keys().min()?;
    let mut outline = vec![start];
    let mut current = next[&start];
    while current != start {
        if outline.len() > next.len() {
            return None;
        }
        outline.push(current);
        current = *next.get(&current)?;
    }

    (outline.len() == next.len() && outline.len() >= 3).then_some(outline)
}

fn dissolve_straight_vertices(mesh: &mut Mesh, angle_limit: f64) {
    let mut neighbours: Vec<HashSet<usize>> = vec![HashSet::new(); mesh.vertex_count()];
    for face in &mesh.faces {
        for (a, b) in face.edges() {
            neighbours[a].insert(b);
            neighbours[b].insert(a);
        }
    }
    let mut pinned = vec![false; mesh.vertex_count()];
    for [a, b] in &mesh.loose_edges {
        pinned[*a] = true;
        pinned[*b] = true;
    }

    let mut removable: Vec<bool> = neighbours
        .iter()
        .enumerate()
        .map(|(v, around)| {
            if pinned[v] || around.len() != 2 {
                return false;
            }
            let mut it = around.iter();
            let (Some(&p), Some(&n)) = (it.next(), it.next()) else {
                return false;
            };
            let incoming = mesh.positions[v] - mesh.positions[p];
            let outgoing = mesh.positions[n] - mesh.positions[v];
            if incoming.norm() == 0.0 || outgoing.norm() == 0.0 {
                return false;
            }
            incoming.angle(&outgoing) < angle_limit
        })
        .collect();

    // A face must keep at least three corners
    for face in &mesh.faces {
        let remaining = face.vertices.iter().filter(|&&v| !removable[v]).count();
        if remaining < 3 {
            face.vertices.iter().for_each(|&v| removable[v] = false);
        }
    }

    for face in &mut mesh.faces {
        if !face.vertices.iter().any(|&v| removable[v]) {
            continue;
        }
        if let Some(uvs) = face.uvs.take() {
            face.uvs = Some(
                face.vertices
                    .iter()
                    .zip(uvs)
                    .filter(|(v, _)| !removable[**v])
                    .map(|(_, uv)| uv)
                    .collect(),
            );
        }
        face.vertices.retain(|&v| !removable[v]);
    }
}

/// Dissolve every distinct mesh used by the selected objects.
///
/// Each mesh data block is loaded, dissolved and written back exactly once,
/// even when several selected objects share it.
pub fn dissolve_selected<H>(host: &mut H, angle_degrees: f64) -> PrepResult<Vec<(MeshId, DissolveStats)>>
where
    H: SceneGraph + MeshMutate + ?Sized,
{
    if angle_degrees <= 0.0 || angle_degrees.is_nan() {
        return Err(PreconditionError::InvalidAngle(angle_degrees).into());
    }
    let meshes = selected_meshes(host);
    if meshes.is_empty() {
        return Err(PreconditionError::NoSelection.into());
    }

    let angle_limit = angle_degrees.to_radians();
    let mut results = Vec::with_capacity(meshes.len());
    for mesh_id in meshes {
        let mut mesh = host.load_mesh(mesh_id)?;
        let stats = dissolve_limited(&mut mesh, angle_limit);
        host.write_mesh(mesh_id, mesh)?;
        host.update_mesh(mesh_id)?;
        debug!(
            mesh = ?mesh_id,
            faces_before = stats.faces_before,
            faces_after = stats.faces_after,
            "Dissolved mesh"
        );
        results.push((mesh_id, stats));
    }
    Ok(results)
}

/// Distinct meshes of the selected objects, in selection order
fn selected_meshes<H: SceneGraph + ?Sized>(host: &H) -> Vec<MeshId> {
    let mut seen = HashSet::new();
    host.selected_objects()
        .into_iter()
        .filter_map(|object| host.object_data(object).ok()?.mesh())
        .filter(|mesh| seen.insert(*mesh))
        .collect()
}

/// Limited dissolve of the selected meshes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitedDissolve {
    /// Angle limit in degrees.
    pub angle: f64,
}

impl LimitedDissolve {
    pub fn new(angle: f64) -> Self {
        Self { angle }
    }

    /// Use the scene's last dissolve angle
    pub fn from_settings(settings: &ToolSettings) -> Self {
        Self::new(f64::from(settings.dissolve_angle.degrees()))
    }
}

impl<H: Host + ?Sized> Operator<H> for LimitedDissolve {
    fn name(&self) -> &'static str {
        "limited_dissolve"
    }

    fn poll(&self, host: &H) -> Result<(), PreconditionError> {
        require_mode(host, EditMode::Object)?;
        if self.angle <= 0.0 || self.angle.is_nan() {
            return Err(PreconditionError::InvalidAngle(self.angle));
        }
        if selected_meshes(host).is_empty() {
            return Err(PreconditionError::NoSelection);
        }
        Ok(())
    }

    fn execute(&mut self, host: &mut H) -> PrepResult<Report> {
        let results = dissolve_selected(host, self.angle)?;
        let before: usize = results.iter().map(|(_, s)| s.faces_before).sum();
        let after: usize = results.iter().map(|(_, s)| s.faces_after).sum();
        info!(meshes = results.len(), before, after, angle = self.angle, "Limited dissolve");
        Ok(Report::info(format!(
            "Dissolved {} mesh(es): {before} -> {after} faces",
            results.len()
        )))
    }
}
