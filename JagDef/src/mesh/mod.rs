//! Mesh model
//!
//! Integer vertex geometry in the engine's coordinate space: y grows
//! downward, one tile is 128 units and angles are 2048ths of a turn. All
//! transforms work in place; composition clones the imported base geometry
//! before transforming it.

pub mod light;
pub mod skeleton;
pub mod trig;

use glam::IVec3;

pub use light::LightParams;
pub use skeleton::{Frame, FrameTransform, TransformKind};

/// Triangle with a packed HSL colour and optional texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub indices: [u32; 3],
    pub colour: u16,
    pub texture: Option<u16>,
    /// Lit colour, set once lighting has been applied.
    pub shade: Option<u16>,
}

impl Face {
    #[must_use]
    pub fn new(indices: [u32; 3], colour: u16) -> Self {
        Self {
            indices,
            colour,
            texture: None,
            shade: None,
        }
    }

    #[must_use]
    pub fn with_texture(mut self, texture: u16) -> Self {
        self.texture = Some(texture);
        self
    }
}

/// Axis-aligned bounds plus the horizontal radius about the origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounds {
    pub min: IVec3,
    pub max: IVec3,
    pub radius: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mesh {
    pub vertices: Vec<IVec3>,
    pub faces: Vec<Face>,
    /// Skeleton group label per vertex.
    pub vertex_groups: Option<Vec<u32>>,
    pub bounds: Bounds,
    /// Height objects placed on top of this mesh sit at.
    pub item_height: Option<i32>,
    /// Lighting to apply later, for delay-shaded objects.
    pub deferred_light: Option<LightParams>,
}

impl Mesh {
    /// Build a mesh and compute its bounds.
    #[must_use]
    pub fn new(vertices: Vec<IVec3>, faces: Vec<Face>) -> Self {
        let mut mesh = Self {
            vertices,
            faces,
            ..Self::default()
        };
        mesh.compute_bounds();
        mesh
    }

    #[must_use]
    pub fn with_vertex_groups(mut self, groups: Vec<u32>) -> Self {
        self.vertex_groups = Some(groups);
        self
    }

    /// Concatenate meshes, keeping part order.
    ///
    /// Vertex groups survive if any part has them; parts without groups are
    /// labelled group 0.
    #[must_use]
    pub fn merge(parts: &[&Mesh]) -> Self {
        let mut merged = Self::default();
        let grouped = parts.iter().any(|p| p.vertex_groups.is_some());
        let mut groups = Vec::new();

        for part in parts {
            let base = merged.vertices.len() as u32;
            merged.vertices.extend_from_slice(&part.vertices);
            merged.faces.extend(part.faces.iter().map(|f| Face {
                indices: f.indices.map(|i| i + base),
                ..*f
            }));
            if grouped {
                match &part.vertex_groups {
                    Some(g) => groups.extend_from_slice(g),
                    None => groups.resize(merged.vertices.len(), 0),
                }
            }
        }

        if grouped {
            merged.vertex_groups = Some(groups);
        }
        merged.compute_bounds();
        merged
    }

    /// Mirror along z, flipping face winding to match.
    pub fn invert(&mut self) {
        for v in &mut self.vertices {
            v.z = -v.z;
        }
        for face in &mut self.faces {
            face.indices.swap(0, 2);
        }
        self.compute_bounds();
    }

    /// Quarter turn clockwise about y: `(x, z) -> (z, -x)`.
    pub fn rotate_clockwise(&mut self) {
        for v in &mut self.vertices {
            (v.x, v.z) = (v.z, -v.x);
        }
    }

    /// Rotate about y by `angle` 2048ths of a turn.
    pub fn rotate_y(&mut self, angle: i32) {
        for v in &mut self.vertices {
            (v.x, v.z) = trig::rotate(v.x, v.z, angle);
        }
    }

    pub fn translate(&mut self, offset: IVec3) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Scale per axis where 128 is unchanged.
    pub fn scale(&mut self, factors: IVec3) {
        for v in &mut self.vertices {
            *v = *v * factors / 128;
        }
    }

    /// Replace every face colour equal to `from`.
    pub fn recolour(&mut self, from: u16, to: u16) {
        for face in self.faces.iter_mut().filter(|f| f.colour == from) {
            face.colour = to;
        }
    }

    /// Replace every face texture equal to `from`.
    pub fn retexture(&mut self, from: u16, to: u16) {
        for face in self.faces.iter_mut().filter(|f| f.texture == Some(from)) {
            face.texture = Some(to);
        }
    }

    pub fn compute_bounds(&mut self) {
        let Some(&first) = self.vertices.first() else {
            self.bounds = Bounds::default();
            return;
        };
        let (min, max) = self
            .vertices
            .iter()
            .fold((first, first), |(min, max), &v| (min.min(v), max.max(v)));
        let radius_sq = self
            .vertices
            .iter()
            .map(|v| i64::from(v.x).pow(2) + i64::from(v.z).pow(2))
            .max()
            .unwrap_or(0);
        self.bounds = Bounds {
            min,
            max,
            radius: (radius_sq as f64).sqrt().ceil() as i32,
        };
    }

    /// Extent above the origin.
    #[must_use]
    pub fn height(&self) -> i32 {
        (-self.bounds.min.y).max(0)
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tri(colour: u16) -> Mesh {
        Mesh::new(
            vec![IVec3::new(0, -100, 0), IVec3::new(64, 0, 0), IVec3::new(0, 0, 32)],
            vec![Face::new([0, 1, 2], colour)],
        )
    }

    #[test]
    fn test_bounds_and_height() {
        let mesh = tri(1);
        assert_eq!(mesh.bounds.min, IVec3::new(0, -100, 0));
        assert_eq!(mesh.bounds.max, IVec3::new(64, 0, 32));
        assert_eq!(mesh.bounds.radius, 64);
        assert_eq!(mesh.height(), 100);
    }

    #[test]
    fn test_four_clockwise_turns_restore() {
        let original = tri(1);
        let mut mesh = original.clone();
        mesh.rotate_clockwise();
        assert_eq!(mesh.vertices[1], IVec3::new(0, 0, -64));
        for _ in 0..3 {
            mesh.rotate_clockwise();
        }
        assert_eq!(mesh.vertices, original.vertices);
    }

    #[test]
    fn test_invert_flips_z_and_winding() {
        let mut mesh = tri(1);
        mesh.invert();
        assert_eq!(mesh.vertices[2], IVec3::new(0, 0, -32));
        assert_eq!(mesh.faces[0].indices, [2, 1, 0]);
    }

    #[test]
    fn test_merge_offsets_indices() {
        let a = tri(1);
        let b = tri(2).with_vertex_groups(vec![7, 7, 7]);
        let merged = Mesh::merge(&[&a, &b]);
        assert_eq!(merged.vertex_count(), 6);
        assert_eq!(merged.faces[1].indices, [3, 4, 5]);
        assert_eq!(merged.faces[1].colour, 2);
        assert_eq!(merged.vertex_groups, Some(vec![0, 0, 0, 7, 7, 7]));
    }

    #[test]
    fn test_scale_and_recolour() {
        let mut mesh = tri(5);
        mesh.faces[0].texture = Some(3);
        mesh.scale(IVec3::new(256, 64, 128));
        assert_eq!(mesh.vertices[0], IVec3::new(0, -50, 0));
        assert_eq!(mesh.vertices[1], IVec3::new(128, 0, 0));
        mesh.recolour(5, 9);
        mesh.retexture(3, 4);
        mesh.recolour(1, 2);
        assert_eq!(mesh.faces[0].colour, 9);
        assert_eq!(mesh.faces[0].texture, Some(4));
    }
}
