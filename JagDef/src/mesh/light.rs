//! Flat face lighting

use glam::{IVec3, Vec3};

use super::Mesh;

/// Base ambient added to an object's ambient lighting.
pub const BASE_AMBIENT: i32 = 64;
/// Base contrast added to an object's scaled light diffusion.
pub const BASE_CONTRAST: i32 = 768;
/// Direction light arrives from for scenery.
pub const SCENE_LIGHT: IVec3 = IVec3::new(-50, -10, -50);

/// Lighting inputs for [`Mesh::light`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightParams {
    pub ambient: i32,
    pub contrast: i32,
    pub direction: IVec3,
}

impl LightParams {
    /// Scenery lighting from an object's ambient and diffusion coefficients.
    #[must_use]
    pub fn for_object(ambient_lighting: i8, light_diffusion: i8) -> Self {
        Self {
            ambient: BASE_AMBIENT + i32::from(ambient_lighting),
            contrast: BASE_CONTRAST + i32::from(light_diffusion) * 25,
            direction: SCENE_LIGHT,
        }
    }
}

/// Scale the lightness of a packed HSL colour by `lightness / 128`.
///
/// The result keeps hue and saturation and clamps lightness to `2..=126`.
#[must_use]
pub fn shade_hsl(hsl: u16, lightness: i32) -> u16 {
    let l = ((i32::from(hsl & 0x7F) * lightness) >> 7).clamp(2, 126);
    (hsl & 0xFF80) + l as u16
}

impl Mesh {
    /// Light the mesh.
    ///
    /// With `immediate` the faces are shaded now; otherwise the parameters
    /// are kept on the mesh for [`Mesh::apply_deferred_light`]. Bounds are
    /// recomputed either way.
    pub fn light(&mut self, params: LightParams, immediate: bool) {
        if immediate {
            self.shade_faces(params);
            self.deferred_light = None;
        } else {
            self.deferred_light = Some(params);
        }
        self.compute_bounds();
    }

    /// Apply lighting that [`Mesh::light`] deferred. No-op otherwise.
    pub fn apply_deferred_light(&mut self) {
        if let Some(params) = self.deferred_light.take() {
            self.shade_faces(params);
        }
    }

    fn shade_faces(&mut self, params: LightParams) {
        let magnitude = params.direction.as_vec3().length() as i32;
        let k = (params.contrast * magnitude) >> 8;
        let divisor = k + k / 2;

        for face in &mut self.faces {
            let [a, b, c] = face.indices.map(|i| {
                self.vertices
                    .get(i as usize)
                    .map_or(Vec3::ZERO, |v| v.as_vec3())
            });
            let normal = ((b - a).cross(c - a).normalize_or_zero() * 256.0).as_ivec3();
            let mut lightness = params.ambient;
            if divisor != 0 {
                lightness += params.direction.dot(normal) / divisor;
            }
            face.shade = Some(shade_hsl(face.colour, lightness));
        }
    }
}
