/// Orthographic UV projection from a camera
use nalgebra::{Matrix4, Point2};
use tracing::debug;

use crate::geometry::Mesh;
use crate::projection::Camera;

/// Flags controlling how projected coordinates are mapped into UV space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectOptions {
    /// Map the camera frame onto `0..1`; otherwise use raw camera-space units.
    pub camera_bounds: bool,
    /// Rescale so both axes are measured in units of the larger frame side.
    pub correct_aspect: bool,
    /// Stretch the projected selection to fill `0..1` on each axis.
    pub scale_to_bounds: bool,
}

impl ProjectOptions {
    /// Raw camera-bounds projection: no aspect correction, no rescaling.
    ///
    /// Projections from different directions stay mutually consistent in
    /// scale.
    pub const fn raw_camera_bounds() -> Self {
        Self {
            camera_bounds: true,
            correct_aspect: false,
            scale_to_bounds: false,
        }
    }
}

impl Default for ProjectOptions {
    fn default() -> Self {
        Self {
            camera_bounds: true,
            correct_aspect: true,
            scale_to_bounds: false,
        }
    }
}

/// Project UVs for every selected face of `mesh`.
///
/// `model_matrix` places the mesh in the world. Returns the number of faces
/// that were written; faces that cannot be projected keep their old UVs.
pub fn project_selected(
    mesh: &mut Mesh,
    model_matrix: &Matrix4<f64>,
    camera: &Camera,
    resolution: (u32, u32),
    options: ProjectOptions,
) -> usize {
    let (width, height) = resolution;
    let (frame_w, frame_h) = camera.data.frame_size(width, height);
    let frame_max = frame_w.max(frame_h);

    let mut projected: Vec<(usize, Vec<Point2<f64>>)> = Vec::new();
    'faces: for (index, face) in mesh.faces.iter().enumerate() {
        if !face.selected {
            continue;
        }
        let mut uvs = Vec::with_capacity(face.vertices.len());
        for &v in &face.vertices {
            let position = &mesh.positions[v];
            let uv = if options.camera_bounds {
                let Some(uv) = camera.project_to_frame(position, model_matrix, width, height)
                else {
                    continue 'faces;
                };
                if options.correct_aspect {
                    Point2::new(
                        0.5 + (uv.x - 0.5) * frame_w / frame_max,
                        0.5 + (uv.y - 0.5) * frame_h / frame_max,
                    )
                } else {
                    uv
                }
            } else {
                let p = camera.to_camera_space(position, model_matrix);
                Point2::new(p.x, p.y)
            };
            uvs.push(uv);
        }
        projected.push((index, uvs));
    }

    if options.scale_to_bounds {
        scale_to_unit_bounds(&mut projected);
    }

    let written = projected.len();
    for (index, uvs) in projected {
        mesh.faces[index].uvs = Some(uvs);
    }
    debug!(faces = written, "Projected UVs from camera");
    written
}

fn scale_to_unit_bounds(projected: &mut [(usize, Vec<Point2<f64>>)]) {
    let mut all = projected.iter().flat_map(|(_, uvs)| uvs.iter());
    let Some(first) = all.next() else {
        return;
    };
    let (lo, hi) = all.fold((*first, *first), |(lo, hi), p| (lo.inf(p), hi.sup(p)));
    let span = hi - lo;

    for (_, uvs) in projected.iter_mut() {
        for uv in uvs.iter_mut() {
            if span.x > f64::EPSILON {
                uv.x = (uv.x - lo.x) / span.x;
            }
            if span.y > f64::EPSILON {
                uv.y = (uv.y - lo.y) / span.y;
            }
        }
    }
}
