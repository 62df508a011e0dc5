//! Composed mesh resolution

use std::sync::Arc;

use glam::IVec3;

use super::cache::{CacheStats, LruCache};
use super::contour::{CornerHeights, contour};
use super::key::{base_geometry_key, composed_key};
use crate::config::EngineConfig;
use crate::definitions::ObjectDefinition;
use crate::definitions::object::WALL_DECORATION;
use crate::mesh::{LightParams, Mesh};
use crate::provider::{FrameSource, GeometryProvider};

/// Correction applied to wall decorations placed diagonally.
const DIAGONAL_TURN: i32 = 256;
const DIAGONAL_OFFSET: IVec3 = IVec3::new(45, 0, -45);
/// Orientations are 0..=7; anything else wraps into that range.
const ORIENTATION_MASK: i32 = 7;

/// What to compose: a role, a placement orientation and an optional pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshRequest {
    pub model_type: i32,
    /// 0..=3 cardinal, 4..=7 diagonal.
    pub orientation: i32,
    /// Packed animation frame id.
    pub frame: Option<u32>,
}

impl MeshRequest {
    #[must_use]
    pub fn new(model_type: i32, orientation: i32) -> Self {
        Self {
            model_type,
            orientation: orientation & ORIENTATION_MASK,
            frame: None,
        }
    }

    #[must_use]
    pub fn with_frame(mut self, frame: Option<u32>) -> Self {
        self.frame = frame;
        self
    }
}

/// Result of [`MeshResolver::resolve`].
#[derive(Debug, Clone)]
pub enum MeshOutcome {
    Ready(Arc<Mesh>),
    /// The definition has no geometry for the requested role.
    NotApplicable,
    /// Some geometry or frame has not streamed in yet.
    NotReady,
}

impl MeshOutcome {
    #[must_use]
    pub fn mesh(&self) -> Option<&Arc<Mesh>> {
        match self {
            Self::Ready(mesh) => Some(mesh),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_mesh(self) -> Option<Arc<Mesh>> {
        match self {
            Self::Ready(mesh) => Some(mesh),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Statistics for both cache tiers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolverStats {
    pub geometry: CacheStats,
    pub meshes: CacheStats,
}

/// Composes object meshes and memoizes them.
///
/// Two tiers: imported base geometry (per geometry id and inversion) and
/// final composed meshes (per composite key).
#[derive(Debug)]
pub struct MeshResolver {
    geometry: LruCache<i64, Arc<Mesh>>,
    meshes: LruCache<i64, Arc<Mesh>>,
}

impl MeshResolver {
    #[must_use]
    pub fn new(geometry_capacity: usize, mesh_capacity: usize) -> Self {
        Self {
            geometry: LruCache::new(geometry_capacity),
            meshes: LruCache::new(mesh_capacity),
        }
    }

    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.geometry_cache_capacity, config.mesh_cache_capacity)
    }

    /// Compose the mesh `def` draws for `request`.
    pub fn resolve<G, F>(
        &mut self,
        def: &ObjectDefinition,
        request: MeshRequest,
        geometry: &G,
        frames: &F,
    ) -> MeshOutcome
    where
        G: GeometryProvider + ?Sized,
        F: FrameSource + ?Sized,
    {
        let candidates = def.models.candidates(request.model_type);
        if candidates.is_empty() {
            return MeshOutcome::NotApplicable;
        }

        let orientation = request.orientation & ORIENTATION_MASK;
        let matched = def.models.is_typed().then_some(candidates.as_slice());
        let key = composed_key(
            def.id,
            request.model_type,
            request.frame,
            orientation,
            def.inverted,
            matched,
        );
        if let Some(mesh) = self.meshes.get(&key) {
            return MeshOutcome::Ready(Arc::clone(mesh));
        }

        let frame = match request.frame {
            Some(id) => match frames.frame(id) {
                Some(frame) => Some(frame),
                None => return MeshOutcome::NotReady,
            },
            None => None,
        };

        let inverted = def.inverted ^ (orientation > 3);
        let mut parts = Vec::with_capacity(candidates.len());
        for &id in &candidates {
            match self.import(id, inverted, geometry) {
                Some(part) => parts.push(part),
                None => return MeshOutcome::NotReady,
            }
        }

        let mut mesh = match parts.as_slice() {
            [single] => Mesh::clone(single),
            many => Mesh::merge(&many.iter().map(Arc::as_ref).collect::<Vec<_>>()),
        };

        if let Some(frame) = frame {
            mesh.apply_frame(frame);
        }
        if request.model_type == WALL_DECORATION && orientation > 3 {
            mesh.rotate_y(DIAGONAL_TURN);
            mesh.translate(DIAGONAL_OFFSET);
        }
        for _ in 0..(orientation & 3) {
            mesh.rotate_clockwise();
        }
        for &(from, to) in &def.recolours {
            mesh.recolour(from, to);
        }
        for &(from, to) in &def.retextures {
            mesh.retexture(from, to);
        }
        if def.is_scaled() {
            mesh.scale(IVec3::from_array(def.scale));
        }
        if def.is_translated() {
            mesh.translate(IVec3::from_array(def.translate));
        }
        mesh.light(
            LightParams::for_object(def.ambient_lighting, def.light_diffusion),
            !def.delay_shading,
        );
        if def.support_items == 1 {
            mesh.item_height = Some(mesh.height());
        }

        let mesh = Arc::new(mesh);
        self.meshes.insert(key, Arc::clone(&mesh));
        MeshOutcome::Ready(mesh)
    }

    /// [`resolve`](Self::resolve), then contour onto `corners` if given.
    pub fn resolve_at<G, F>(
        &mut self,
        def: &ObjectDefinition,
        request: MeshRequest,
        corners: Option<CornerHeights>,
        geometry: &G,
        frames: &F,
    ) -> MeshOutcome
    where
        G: GeometryProvider + ?Sized,
        F: FrameSource + ?Sized,
    {
        match (self.resolve(def, request, geometry, frames), corners) {
            (MeshOutcome::Ready(mesh), Some(corners)) => {
                MeshOutcome::Ready(contour(def, &mesh, corners))
            }
            (outcome, _) => outcome,
        }
    }

    fn import<G>(&mut self, id: u32, inverted: bool, geometry: &G) -> Option<Arc<Mesh>>
    where
        G: GeometryProvider + ?Sized,
    {
        let key = base_geometry_key(id, inverted);
        if let Some(mesh) = self.geometry.get(&key) {
            return Some(Arc::clone(mesh));
        }
        let mut mesh = geometry.geometry(id)?.clone();
        if inverted {
            mesh.invert();
        }
        let mesh = Arc::new(mesh);
        self.geometry.insert(key, Arc::clone(&mesh));
        Some(mesh)
    }

    /// Drop both cache tiers.
    pub fn clear(&mut self) {
        self.geometry.clear();
        self.meshes.clear();
    }

    #[must_use]
    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            geometry: self.geometry.stats(),
            meshes: self.meshes.stats(),
        }
    }

    /// Number of cached composed meshes.
    #[must_use]
    pub fn cached_meshes(&self) -> usize {
        self.meshes.len()
    }
}

impl Default for MeshResolver {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
