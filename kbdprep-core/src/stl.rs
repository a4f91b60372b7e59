/// STL import into welded meshes, binary and ASCII
use std::collections::HashMap;

use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::many0,
    number::complete::{double, le_f32, le_u16, le_u32},
    sequence::{preceded, tuple},
    IResult,
};
use nalgebra::Point3;
use tracing::debug;

use crate::config::WELD_EPSILON;
use crate::error::StlError;
use crate::geometry::Mesh;

const HEADER_LEN: usize = 80;
const TRIANGLE_LEN: usize = 50;

type Triangle = [Point3<f64>; 3];

/// Collects triangle soup into an indexed mesh, sharing coincident corners
struct Welder {
    mesh: Mesh,
    index: HashMap<[i64; 3], usize>,
}

impl Welder {
    fn with_capacity(triangles: usize) -> Self {
        Self {
            mesh: Mesh::with_capacity(triangles / 2 + 3, triangles),
            index: HashMap::new(),
        }
    }

    fn key(p: &Point3<f64>) -> [i64; 3] {
        [
            (p.x / WELD_EPSILON).round() as i64,
            (p.y / WELD_EPSILON).round() as i64,
            (p.z / WELD_EPSILON).round() as i64,
        ]
    }

    fn vertex(&mut self, p: Point3<f64>) -> usize {
        let mesh = &mut self.mesh;
        *self
            .index
            .entry(Self::key(&p))
            .or_insert_with(|| mesh.add_vertex(p))
    }

    fn push(&mut self, triangle: Triangle) {
        let [a, b, c] = triangle.map(|p| self.vertex(p));
        // Corners collapsed by welding leave no area behind
        if a != b && b != c && a != c {
            self.mesh.add_face(vec![a, b, c]);
        }
    }

    fn finish(self) -> Mesh {
        debug!(
            vertices = self.mesh.vertex_count(),
            faces = self.mesh.face_count(),
            "Welded STL triangles"
        );
        self.mesh
    }
}

fn le_point(input: &[u8]) -> IResult<&[u8], Point3<f64>> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, Point3::new(x as f64, y as f64, z as f64)))
}

fn binary_triangle(input: &[u8]) -> IResult<&[u8], Triangle> {
    // Stored normal is ignored; faces are wound consistently by the exporter
    let (input, _normal) = le_point(input)?;
    let (input, (a, b, c)) = tuple((le_point, le_point, le_point))(input)?;
    let (input, _attributes) = le_u16(input)?;
    Ok((input, [a, b, c]))
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Mesh, StlError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(StlError::TooSmall);
    }
    let body = &data[HEADER_LEN..];
    let (mut input, count) =
        le_u32::<_, nom::error::Error<&[u8]>>(body).map_err(|_| StlError::TooSmall)?;
    let count = count as usize;

    let mut welder = Welder::with_capacity(count.min(input.len() / TRIANGLE_LEN));
    for triangle in 0..count {
        let (rest, corners) =
            binary_triangle(input).map_err(|_| StlError::UnexpectedEof { triangle })?;
        welder.push(corners);
        input = rest;
    }
    Ok(welder.finish())
}

fn ascii_point(input: &str) -> IResult<&str, Point3<f64>> {
    let (input, (x, _, y, _, z)) = preceded(
        multispace0,
        tuple((double, multispace1, double, multispace1, double)),
    )(input)?;
    Ok((input, Point3::new(x, y, z)))
}

fn ascii_vertex(input: &str) -> IResult<&str, Point3<f64>> {
    preceded(tuple((multispace0, tag("vertex"))), ascii_point)(input)
}

fn facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = tuple((multispace0, tag("facet"), multispace1, tag("normal")))(input)?;
    let (input, _normal) = ascii_point(input)?;
    let (input, _) = tuple((multispace0, tag("outer"), multispace1, tag("loop")))(input)?;
    let (input, (a, b, c)) = tuple((ascii_vertex, ascii_vertex, ascii_vertex))(input)?;
    let (input, _) = tuple((multispace0, tag("endloop"), multispace0, tag("endfacet")))(input)?;
    Ok((input, [a, b, c]))
}

fn solid(input: &str) -> IResult<&str, Vec<Triangle>> {
    let (input, _) = tuple((multispace0, tag("solid"), not_line_ending))(input)?;
    let (input, triangles) = many0(facet)(input)?;
    let (input, _) = tuple((multispace0, tag("endsolid")))(input)?;
    Ok((input, triangles))
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Mesh, StlError> {
    let (_, triangles) = solid(input).map_err(|e| StlError::Ascii(e.to_string()))?;
    let mut welder = Welder::with_capacity(triangles.len());
    for triangle in triangles {
        welder.push(triangle);
    }
    Ok(welder.finish())
}

/// Detect and parse STL file (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<Mesh, StlError> {
    // Binary exporters sometimes start the header with "solid" too
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(mesh) = parse_ascii_stl(text) {
                return Ok(mesh);
            }
        }
    }
    parse_binary_stl(data)
}
