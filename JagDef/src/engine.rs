//! Content engine facade
//!
//! Owns the three definition registries and every cache, and ties their
//! lifecycles together: reloading objects drops composed meshes and
//! readiness counts that were derived from the old definitions.

use std::sync::Arc;

use crate::compose::{CornerHeights, MeshOutcome, MeshRequest, MeshResolver, ResolverStats};
use crate::config::EngineConfig;
use crate::definitions::{
    AnimationDecoder, AnimationDefinition, GraphicDecoder, GraphicDefinition, ObjectDecoder,
    ObjectDefinition,
};
use crate::error::{Error, Result};
use crate::morph::{VarbitDirectory, resolve_morph};
use crate::provider::{FrameSource, GeometryProvider};
use crate::readiness::ReadinessPoller;
use crate::registry::{AnimationRegistry, ContentSource, GraphicRegistry, LoadSummary, ObjectRegistry};
use crate::texture::{TexturePixelCache, TextureSource};

/// Definitions, composition caches and readiness state for one content set.
///
/// # Example
///
/// ```
/// use jagdef::prelude::*;
///
/// let mut engine = ContentEngine::new(EngineConfig::default())?;
/// let archive = MemoryArchive::new(SlotLayout::OBJECTS).with_record(5, vec![14, 2, 0]);
/// let summary = engine.load_objects(&archive);
/// assert_eq!(summary.decoded, 1);
/// assert_eq!(engine.object(5).width, 2);
/// // Ids without a record resolve to defaults.
/// assert_eq!(engine.object(6).width, 1);
/// # Ok::<(), jagdef::Error>(())
/// ```
#[derive(Debug)]
pub struct ContentEngine {
    config: EngineConfig,
    objects: ObjectRegistry,
    animations: AnimationRegistry,
    graphics: GraphicRegistry,
    resolver: MeshResolver,
    readiness: ReadinessPoller,
    textures: TexturePixelCache,
}

impl ContentEngine {
    /// Create an engine after validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let policy = config.unknown_opcodes;
        Ok(Self {
            objects: ObjectRegistry::new(ObjectDecoder::new(policy)),
            animations: AnimationRegistry::new(AnimationDecoder::new(policy)),
            graphics: GraphicRegistry::new(GraphicDecoder::new(policy)),
            resolver: MeshResolver::from_config(&config),
            readiness: ReadinessPoller::new(config.readiness_retry_limit),
            textures: TexturePixelCache::from_config(&config),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ==================== Definitions ====================

    /// Load object definitions, dropping state derived from the old ones.
    pub fn load_objects<S: ContentSource + ?Sized>(&mut self, source: &S) -> LoadSummary {
        let summary = self.objects.load(source);
        self.resolver.clear();
        self.readiness.clear();
        summary
    }

    pub fn load_animations<S: ContentSource + ?Sized>(&mut self, source: &S) -> LoadSummary {
        let summary = self.animations.load(source);
        // Cached meshes may have been posed with old frame ids.
        self.resolver.clear();
        summary
    }

    pub fn load_graphics<S: ContentSource + ?Sized>(&mut self, source: &S) -> LoadSummary {
        self.graphics.load(source)
    }

    #[must_use]
    pub fn object(&self, id: u32) -> Arc<ObjectDefinition> {
        self.objects.lookup(id)
    }

    #[must_use]
    pub fn animation(&self, id: u32) -> Arc<AnimationDefinition> {
        self.animations.lookup(id)
    }

    #[must_use]
    pub fn graphic(&self, id: u32) -> Arc<GraphicDefinition> {
        self.graphics.lookup(id)
    }

    #[must_use]
    pub fn objects(&self) -> &ObjectRegistry {
        &self.objects
    }

    #[must_use]
    pub fn animations(&self) -> &AnimationRegistry {
        &self.animations
    }

    #[must_use]
    pub fn graphics(&self) -> &GraphicRegistry {
        &self.graphics
    }

    // ==================== Composition ====================

    /// Compose `def` for `request`, contouring onto `corners` if given.
    pub fn resolve_mesh<G, F>(
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
        self.resolver.resolve_at(def, request, corners, geometry, frames)
    }

    /// Compose `def` posed at step `step` of its own animation.
    pub fn resolve_animated<G, F>(
        &mut self,
        def: &ObjectDefinition,
        model_type: i32,
        orientation: i32,
        step: usize,
        geometry: &G,
        frames: &F,
    ) -> MeshOutcome
    where
        G: GeometryProvider + ?Sized,
        F: FrameSource + ?Sized,
    {
        let frame = def
            .animation
            .and_then(|id| self.animations.lookup(id).primary_frame(step));
        let request = MeshRequest::new(model_type, orientation).with_frame(frame);
        self.resolver.resolve(def, request, geometry, frames)
    }

    #[must_use]
    pub fn resolver_stats(&self) -> ResolverStats {
        self.resolver.stats()
    }

    // ==================== Readiness ====================

    /// Whether all of `def`'s geometry is loaded, without retry bookkeeping.
    #[must_use]
    pub fn is_ready<G: GeometryProvider + ?Sized>(&self, def: &ObjectDefinition, geometry: &G) -> bool {
        self.readiness.is_ready(def, geometry)
    }

    /// Retry-aware readiness that reports ready once the limit is passed.
    pub fn ready<G: GeometryProvider + ?Sized>(
        &mut self,
        def: &ObjectDefinition,
        model_type: i32,
        geometry: &G,
    ) -> bool {
        self.readiness.ready(def, model_type, geometry)
    }

    /// Retry-aware readiness that fails once the limit is passed.
    pub fn ready_or_err<G: GeometryProvider + ?Sized>(
        &mut self,
        def: &ObjectDefinition,
        model_type: i32,
        geometry: &G,
    ) -> Result<bool> {
        self.readiness.ready_or_err(def, model_type, geometry)
    }

    pub fn request_geometry<G: GeometryProvider + ?Sized>(&self, def: &ObjectDefinition, geometry: &G) {
        self.readiness.request_geometry(def, geometry);
    }

    #[must_use]
    pub fn readiness(&self) -> &ReadinessPoller {
        &self.readiness
    }

    // ==================== Morphs ====================

    /// The object `def` currently morphs into, or `None` for no override.
    #[must_use]
    pub fn resolve_morph<V: VarbitDirectory + ?Sized>(
        &self,
        def: &ObjectDefinition,
        settings: &[i32],
        varbits: &V,
    ) -> Option<Arc<ObjectDefinition>> {
        resolve_morph(def, settings, varbits, |id| self.objects.lookup(id))
    }

    // ==================== Textures ====================

    pub fn texture_pixels<S: TextureSource + ?Sized>(
        &mut self,
        id: u32,
        source: &S,
    ) -> Option<Arc<[u32]>> {
        self.textures.pixels(id, source)
    }

    #[must_use]
    pub fn is_texture_transparent<S: TextureSource + ?Sized>(&self, id: u32, source: &S) -> bool {
        self.textures.is_transparent(id, source)
    }

    /// Change texture gamma. Must lie in `(0, 2]`.
    pub fn set_brightness(&mut self, brightness: f64) -> Result<()> {
        if !(brightness > 0.0 && brightness <= 2.0) {
            return Err(Error::InvalidConfig {
                message: format!("texture brightness {brightness} outside (0, 2]"),
            });
        }
        self.config.texture_brightness = brightness;
        self.textures.set_brightness(brightness);
        Ok(())
    }

    /// Drop every cache and readiness count. Definitions are kept.
    pub fn clear_caches(&mut self) {
        self.resolver.clear();
        self.readiness.clear();
        self.textures.clear();
    }
}
