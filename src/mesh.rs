use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Indexed triangle mesh with interleaved vertex data.
///
/// Vertices are laid out as `position.xyz` followed by `normal.xyz`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Floats per vertex.
    pub const STRIDE: usize = 6;

    pub fn new() -> Self {
        Self::default()
    }

    /// Axis-aligned box centered on the origin.
    pub fn cuboid(size: Vec3) -> Self {
        let half = size * 0.5;
        let mut mesh = Self::new();
        mesh.push_box(
            Vec3::ZERO,
            [Vec3::X * half.x, Vec3::Y * half.y, Vec3::Z * half.z],
        );
        mesh
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / Self::STRIDE
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Position and normal of vertex `index`.
    pub fn vertex(&self, index: usize) -> (Vec3, Vec3) {
        let base = index * Self::STRIDE;
        let v = &self.vertices[base..base + Self::STRIDE];
        (Vec3::new(v[0], v[1], v[2]), Vec3::new(v[3], v[4], v[5]))
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
    }

    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&position.to_array());
        self.vertices.extend_from_slice(&normal.to_array());
        index
    }

    /// Appends a flat quad. Corners must wind counter-clockwise when seen
    /// from the side `normal` points to.
    pub fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3) {
        let first = self.push_vertex(corners[0], normal);
        for corner in &corners[1..] {
            self.push_vertex(*corner, normal);
        }
        self.indices.extend_from_slice(&[
            first,
            first + 1,
            first + 2,
            first,
            first + 2,
            first + 3,
        ]);
    }

    /// Appends a box spanned by three half-extent vectors. The axes must
    /// form a right-handed frame for the faces to wind outward.
    pub fn push_box(&mut self, center: Vec3, axes: [Vec3; 3]) {
        for i in 0..3 {
            let (a, b, c) = (axes[i], axes[(i + 1) % 3], axes[(i + 2) % 3]);
            let normal = a.normalize_or_zero();
            let front = center + a;
            self.push_quad(
                [front - b - c, front + b - c, front + b + c, front - b + c],
                normal,
            );
            let back = center - a;
            self.push_quad(
                [back - c - b, back + c - b, back + c + b, back - c + b],
                -normal,
            );
        }
    }

    /// Minimum and maximum corners of the vertex positions.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        (0..self.vertex_count())
            .map(|index| self.vertex(index).0)
            .fold(None, |acc, position| match acc {
                None => Some((position, position)),
                Some((min, max)) => Some((min.min(position), max.max(position))),
            })
    }
}
