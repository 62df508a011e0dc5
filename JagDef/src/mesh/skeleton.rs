//! Skeletal animation frames
//!
//! A frame is an ordered list of transforms. Each transform targets a set of
//! vertex groups; `Origin` sets the pivot that later rotate and scale
//! transforms use.

use glam::IVec3;

use super::Mesh;
use super::trig;

/// What a frame transform does to its vertex groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    /// Pivot = centroid of the groups plus `delta`.
    Origin,
    /// Add `delta`.
    Translate,
    /// Rotate about the pivot by `delta` (x pitch, y yaw, z roll) in 2048ths.
    Rotate,
    /// Scale about the pivot by `delta / 128` per axis.
    Scale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTransform {
    pub kind: TransformKind,
    pub groups: Vec<u32>,
    pub delta: IVec3,
}

/// One skeletal pose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub transforms: Vec<FrameTransform>,
}

impl Frame {
    #[must_use]
    pub fn new(transforms: Vec<FrameTransform>) -> Self {
        Self { transforms }
    }
}

impl Mesh {
    /// Pose the mesh with `frame`. Meshes without vertex groups are unchanged.
    pub fn apply_frame(&mut self, frame: &Frame) {
        let Some(groups) = self.vertex_groups.as_deref() else {
            return;
        };
        let mut origin = IVec3::ZERO;

        for transform in &frame.transforms {
            let selected = |i: usize| groups.get(i).is_some_and(|g| transform.groups.contains(g));
            match transform.kind {
                TransformKind::Origin => {
                    let (sum, count) = self
                        .vertices
                        .iter()
                        .enumerate()
                        .filter(|&(i, _)| selected(i))
                        .fold((IVec3::ZERO, 0), |(sum, n), (_, v)| (sum + *v, n + 1));
                    origin = transform.delta;
                    if count > 0 {
                        origin += sum / count;
                    }
                }
                TransformKind::Translate => {
                    for (i, v) in self.vertices.iter_mut().enumerate() {
                        if selected(i) {
                            *v += transform.delta;
                        }
                    }
                }
                TransformKind::Rotate => {
                    let IVec3 { x: pitch, y: yaw, z: roll } = transform.delta;
                    for (i, v) in self.vertices.iter_mut().enumerate() {
                        if !selected(i) {
                            continue;
                        }
                        let mut p = *v - origin;
                        if roll != 0 {
                            (p.x, p.y) = trig::rotate(p.x, p.y, -roll);
                        }
                        if pitch != 0 {
                            (p.y, p.z) = trig::rotate(p.y, p.z, pitch);
                        }
                        if yaw != 0 {
                            (p.x, p.z) = trig::rotate(p.x, p.z, yaw);
                        }
                        *v = p + origin;
                    }
                }
                TransformKind::Scale => {
                    for (i, v) in self.vertices.iter_mut().enumerate() {
                        if selected(i) {
                            *v = (*v - origin) * transform.delta / 128 + origin;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Face;

    fn grouped() -> Mesh {
        let mut mesh = Mesh::new(
            vec![IVec3::new(0, 0, 0), IVec3::new(10, 0, 0), IVec3::new(0, 0, 10)],
            vec![Face::new([0, 1, 2], 100)],
        );
        mesh.vertex_groups = Some(vec![0, 1, 1]);
        mesh
    }

    #[test]
    fn test_translate_only_selected_groups() {
        let mut mesh = grouped();
        mesh.apply_frame(&Frame::new(vec![FrameTransform {
            kind: TransformKind::Translate,
            groups: vec![1],
            delta: IVec3::new(0, -5, 0),
        }]));
        assert_eq!(mesh.vertices[0], IVec3::ZERO);
        assert_eq!(mesh.vertices[1], IVec3::new(10, -5, 0));
    }

    #[test]
    fn test_scale_about_origin() {
        let mut mesh = grouped();
        mesh.apply_frame(&Frame::new(vec![
            FrameTransform {
                kind: TransformKind::Origin,
                groups: vec![0],
                delta: IVec3::ZERO,
            },
            FrameTransform {
                kind: TransformKind::Scale,
                groups: vec![1],
                delta: IVec3::splat(256),
            },
        ]));
        assert_eq!(mesh.vertices[1], IVec3::new(20, 0, 0));
        assert_eq!(mesh.vertices[2], IVec3::new(0, 0, 20));
    }

    #[test]
    fn test_ungrouped_mesh_ignores_frame() {
        let mut mesh = grouped();
        mesh.vertex_groups = None;
        let before = mesh.clone();
        mesh.apply_frame(&Frame::new(vec![FrameTransform {
            kind: TransformKind::Translate,
            groups: vec![0, 1],
            delta: IVec3::ONE,
        }]));
        assert_eq!(mesh, before);
    }
}
