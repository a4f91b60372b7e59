/// Mesh data: positions, polygon faces, loose edges and selection state
use std::collections::BTreeSet;

use nalgebra::{Matrix4, Point2, Point3, Vector3};

/// A polygon face referencing mesh vertices by index
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// Vertex loop, counter-clockwise when viewed from outside.
    pub vertices: Vec<usize>,
    /// One UV per corner once the face has been projected.
    pub uvs: Option<Vec<Point2<f64>>>,
    pub selected: bool,
}

impl Face {
    pub fn new(vertices: Vec<usize>) -> Self {
        Self {
            vertices,
            uvs: None,
            selected: false,
        }
    }

    /// Directed edges of the loop in winding order
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Calculate the face normal with Newell's method.
    ///
    /// Works for non-planar and concave polygons. Degenerate faces yield a
    /// zero vector.
    pub fn calculate_normal(&self, positions: &[Point3<f64>]) -> Vector3<f64> {
        let mut normal = Vector3::zeros();
        for (a, b) in self.edges() {
            let curr = positions[a];
            let next = positions[b];
            normal.x += (curr.y - next.y) * (curr.z + next.z);
            normal.y += (curr.z - next.z) * (curr.x + next.x);
            normal.z += (curr.x - next.x) * (curr.y + next.y);
        }
        normal.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros)
    }
}

/// Unordered edge key with the smaller index first
pub fn edge_key(a: usize, b: usize) -> [usize; 2] {
    if a < b {
        [a, b]
    } else {
        [b, a]
    }
}

/// An indexed polygon mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Point3<f64>>,
    pub faces: Vec<Face>,
    /// Wire edges that belong to no face.
    pub loose_edges: Vec<[usize; 2]>,
    /// Per-vertex selection flag, parallel to `positions`.
    pub vertex_selection: Vec<bool>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            faces: Vec::with_capacity(faces),
            loose_edges: Vec::new(),
            vertex_selection: Vec::with_capacity(vertices),
        }
    }

    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        self.positions.push(position);
        self.vertex_selection.push(false);
        self.positions.len() - 1
    }

    pub fn add_face(&mut self, vertices: Vec<usize>) -> usize {
        self.faces.push(Face::new(vertices));
        self.faces.len() - 1
    }

    pub fn add_loose_edge(&mut self, a: usize, b: usize) {
        self.loose_edges.push(edge_key(a, b));
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Every distinct edge, from faces and loose edges, in sorted order
    pub fn edges(&self) -> Vec<[usize; 2]> {
        let mut set: BTreeSet<[usize; 2]> = self.loose_edges.iter().copied().collect();
        for face in &self.faces {
            for (a, b) in face.edges() {
                set.insert(edge_key(a, b));
            }
        }
        set.into_iter().collect()
    }

    pub fn face_normal(&self, face: usize) -> Vector3<f64> {
        self.faces[face].calculate_normal(&self.positions)
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = *self.positions.first()?;
        Some(self.positions.iter().fold((first, first), |(lo, hi), p| {
            (lo.inf(p), hi.sup(p))
        }))
    }

    /// Set the selection flag on every vertex and face
    pub fn select_all(&mut self, selected: bool) {
        self.vertex_selection.iter_mut().for_each(|s| *s = selected);
        self.faces.iter_mut().for_each(|f| f.selected = selected);
    }

    pub fn selected_face_count(&self) -> usize {
        self.faces.iter().filter(|f| f.selected).count()
    }

    pub fn selected_vertices(&self) -> Vec<usize> {
        self.vertex_selection
            .iter()
            .enumerate()
            .filter_map(|(i, &s)| s.then_some(i))
            .collect()
    }

    /// Apply a matrix to every vertex position in place
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for p in &mut self.positions {
            *p = matrix.transform_point(p);
        }
    }

    /// Append another mesh, offsetting its indices
    pub fn append(&mut self, other: &Mesh) {
        let offset = self.positions.len();
        self.positions.extend_from_slice(&other.positions);
        self.vertex_selection.extend_from_slice(&other.vertex_selection);
        self.faces.extend(other.faces.iter().map(|f| Face {
            vertices: f.vertices.iter().map(|v| v + offset).collect(),
            ..f.clone()
        }));
        self.loose_edges.extend(
            other
                .loose_edges
                .iter()
                .map(|[a, b]| [a + offset, b + offset]),
        );
    }

    /// Drop vertices no face or loose edge references and remap indices.
    ///
    /// Returns the number of vertices removed.
    pub fn remove_unused_vertices(&mut self) -> usize {
        let mut used = vec![false; self.positions.len()];
        for face in &self.faces {
            for &v in &face.vertices {
                used[v] = true;
            }
        }
        for [a, b] in &self.loose_edges {
            used[*a] = true;
            used[*b] = true;
        }

        let mut remap = vec![usize::MAX; self.positions.len()];
        let mut positions = Vec::with_capacity(self.positions.len());
        let mut selection = Vec::with_capacity(self.positions.len());
        for (i, keep) in used.iter().enumerate() {
            if *keep {
                remap[i] = positions.len();
                positions.push(self.positions[i]);
                selection.push(self.vertex_selection[i]);
            }
        }

        let removed = self.positions.len() - positions.len();
        self.positions = positions;
        self.vertex_selection = selection;
        for face in &mut self.faces {
            face.vertices.iter_mut().for_each(|v| *v = remap[*v]);
        }
        for edge in &mut self.loose_edges {
            *edge = edge_key(remap[edge[0]], remap[edge[1]]);
        }
        removed
    }

    /// Split every polygon into a triangle fan
    pub fn triangulated(&self) -> Mesh {
        let mut mesh = Mesh {
            positions: self.positions.clone(),
            faces: Vec::with_capacity(self.faces.len() * 2),
            loose_edges: self.loose_edges.clone(),
            vertex_selection: self.vertex_selection.clone(),
        };
        for face in &self.faces {
            for i in 1..face.vertices.len().saturating_sub(1) {
                let mut tri = Face::new(vec![face.vertices[0], face.vertices[i], face.vertices[i + 1]]);
                tri.selected = face.selected;
                mesh.faces.push(tri);
            }
        }
        mesh
    }

    /// Create a cube of quads, each side split into `divisions` x `divisions`.
    ///
    /// The cube is centred on the origin with shared (welded) vertices.
    pub fn grid_cube(size: f64, divisions: usize) -> Self {
        let n = divisions.max(1);
        let half = size / 2.0;
        let step = size / n as f64;
        let mut mesh = Self::new();
        let mut lattice = std::collections::HashMap::new();

        let mut vertex = |mesh: &mut Mesh, cell: [usize; 3]| -> usize {
            *lattice.entry(cell).or_insert_with(|| {
                mesh.add_vertex(Point3::new(
                    cell[0] as f64 * step - half,
                    cell[1] as f64 * step - half,
                    cell[2] as f64 * step - half,
                ))
            })
        };

        for axis in 0..3 {
            for positive in [false, true] {
                // u x v points along +axis; swap for the negative side
                let (u, v) = if positive {
                    ((axis + 1) % 3, (axis + 2) % 3)
                } else {
                    ((axis + 2) % 3, (axis + 1) % 3)
                };
                let fixed = if positive { n } else { 0 };
                for i in 0..n {
                    for j in 0..n {
                        let corners = [(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)];
                        let loop_: Vec<usize> = corners
                            .iter()
                            .map(|&(ci, cj)| {
                                let mut cell = [0; 3];
                                cell[axis] = fixed;
                                cell[u] = ci;
                                cell[v] = cj;
                                vertex(&mut mesh, cell)
                            })
                            .collect();
                        mesh.add_face(loop_);
                    }
                }
            }
        }

        mesh
    }

    /// Create a simple triangulated cube mesh for testing
    pub fn cube(size: f64) -> Self {
        Self::grid_cube(size, 1).triangulated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_counts() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.face_count(), 12);
        assert_eq!(cube.edges().len(), 18);
    }

    #[test]
    fn test_grid_cube_is_welded() {
        let cube = Mesh::grid_cube(2.0, 2);
        // 6 * 4 quads over 26 surface lattice points
        assert_eq!(cube.face_count(), 24);
        assert_eq!(cube.vertex_count(), 26);
    }

    #[test]
    fn test_normals_point_outward() {
        let cube = Mesh::grid_cube(2.0, 1);
        for (i, face) in cube.faces.iter().enumerate() {
            let centroid = face
                .vertices
                .iter()
                .fold(Vector3::zeros(), |acc, &v| acc + cube.positions[v].coords)
                / face.vertices.len() as f64;
            let normal = cube.face_normal(i);
            assert_relative_eq!(normal.dot(&centroid.normalize()), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_degenerate_normal_is_zero() {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(Point3::origin());
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(2.0, 0.0, 0.0));
        mesh.add_face(vec![a, b, c]);
        assert_eq!(mesh.face_normal(0), Vector3::zeros());
    }

    #[test]
    fn test_bounds() {
        let cube = Mesh::cube(2.0);
        let (lo, hi) = cube.bounds().unwrap();
        assert_eq!(lo, Point3::new(-1.0, -1.0, -1.0));
        assert_eq!(hi, Point3::new(1.0, 1.0, 1.0));
        assert!(Mesh::new().bounds().is_none());
    }

    #[test]
    fn test_remove_unused_vertices() {
        let mut mesh = Mesh::cube(1.0);
        mesh.add_vertex(Point3::new(5.0, 5.0, 5.0));
        mesh.faces.truncate(2);
        let removed = mesh.remove_unused_vertices();
        assert_eq!(removed, 5);
        assert_eq!(mesh.vertex_count(), 4);
        assert!(mesh
            .faces
            .iter()
            .all(|f| f.vertices.iter().all(|&v| v < mesh.vertex_count())));
    }

    #[test]
    fn test_append_offsets_indices() {
        let mut mesh = Mesh::cube(1.0);
        mesh.append(&Mesh::cube(1.0));
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.faces[12].vertices.iter().min(), Some(&8));
    }
}
