//! Ground contouring

use std::sync::Arc;

use crate::definitions::ObjectDefinition;
use crate::mesh::Mesh;

/// Terrain heights at the four corners of the tile an object sits on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CornerHeights {
    pub south_west: i32,
    pub south_east: i32,
    pub north_east: i32,
    pub north_west: i32,
}

impl CornerHeights {
    #[must_use]
    pub fn new(south_west: i32, south_east: i32, north_east: i32, north_west: i32) -> Self {
        Self {
            south_west,
            south_east,
            north_east,
            north_west,
        }
    }

    /// All four corners at `height`.
    #[must_use]
    pub fn flat(height: i32) -> Self {
        Self::new(height, height, height, height)
    }

    /// Bilinear offset from the corner average at local `(x, z)`.
    #[must_use]
    pub fn offset_at(&self, x: i32, z: i32) -> i32 {
        let average = (self.south_west + self.south_east + self.north_east + self.north_west) / 4;
        let south = self.south_west + (self.south_east - self.south_west) * (x + 64) / 128;
        let north = self.north_west + (self.north_east - self.north_west) * (x + 64) / 128;
        let height = south + (north - south) * (z + 64) / 128;
        height - average
    }
}

/// Fit a composed mesh to sloped ground.
///
/// Definitions that neither contour nor delay shading share the input mesh.
/// Otherwise the mesh is copied, and for contoured definitions each vertex
/// is shifted by the bilinear corner offset before bounds are recomputed.
#[must_use]
pub fn contour(def: &ObjectDefinition, mesh: &Arc<Mesh>, corners: CornerHeights) -> Arc<Mesh> {
    if !def.contoured_ground && !def.delay_shading {
        return Arc::clone(mesh);
    }
    let mut copy = Mesh::clone(mesh);
    if def.contoured_ground {
        for v in &mut copy.vertices {
            v.y += corners.offset_at(v.x, v.z);
        }
        copy.compute_bounds();
    }
    Arc::new(copy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Face;
    use glam::IVec3;

    fn mesh() -> Arc<Mesh> {
        Arc::new(Mesh::new(
            vec![IVec3::new(-64, 0, -64), IVec3::new(64, 0, 64), IVec3::new(0, -10, 0)],
            vec![Face::new([0, 1, 2], 1)],
        ))
    }

    #[test]
    fn test_plain_definition_shares_mesh() {
        let mesh = mesh();
        let out = contour(&ObjectDefinition::new(1), &mesh, CornerHeights::new(0, 40, 80, 40));
        assert!(Arc::ptr_eq(&mesh, &out));
    }

    #[test]
    fn test_contour_follows_corners() {
        let mut def = ObjectDefinition::new(1);
        def.contoured_ground = true;
        let out = contour(&def, &mesh(), CornerHeights::new(0, 40, 80, 40));
        // Average 40: south-west corner drops, north-east rises, centre stays.
        assert_eq!(out.vertices[0].y, -40);
        assert_eq!(out.vertices[1].y, 40);
        assert_eq!(out.vertices[2].y, -10);
        assert_eq!(out.bounds.max.y, 40);
    }

    #[test]
    fn test_flat_ground_is_identity() {
        let corners = CornerHeights::flat(200);
        assert_eq!(corners.offset_at(30, -20), 0);
    }

    #[test]
    fn test_delay_shading_copies_without_moving() {
        let mut def = ObjectDefinition::new(1);
        def.delay_shading = true;
        let mesh = mesh();
        let out = contour(&def, &mesh, CornerHeights::new(0, 40, 80, 40));
        assert!(!Arc::ptr_eq(&mesh, &out));
        assert_eq!(out.vertices, mesh.vertices);
    }
}
