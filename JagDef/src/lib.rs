//! # JagDef
//!
//! A pure-Rust library for decoding RS2-era content definitions and turning
//! them into renderable meshes.
//!
//! ## What It Covers
//!
//! - **Definition records** - Opcode-tagged object, animation and graphic records
//! - **Registries** - Id-keyed definition tables with atomic reloads and total lookups
//! - **Mesh composition** - Merge, pose, rotate, recolour, scale, translate and light
//!   object geometry, memoized by structural key
//! - **Morphs** - Pick an object's active variant from game settings
//! - **Readiness** - Track streamed geometry with bounded retries
//! - **Textures** - Gamma-adjusted texture pixels with an LRU cache
//!
//! Archive storage, asset streaming and rasterization live outside this crate
//! and plug in through [`ContentSource`], [`GeometryProvider`], [`FrameSource`]
//! and [`TextureSource`].
//!
//! ## Quick Start
//!
//! ### Decoding a Record
//!
//! ```
//! use jagdef::definitions::{DefinitionDecoder, ObjectDecoder};
//!
//! // Name "Crate", width 2, then the terminator.
//! let record = b"\x02Crate\x00\x0e\x02\x00";
//! let decoded = ObjectDecoder::default().decode(1, record);
//! assert!(decoded.is_clean());
//! assert_eq!(decoded.definition.name.as_deref(), Some("Crate"));
//! assert_eq!(decoded.definition.width, 2);
//! ```
//!
//! ### Composing a Mesh
//!
//! ```
//! use glam::IVec3;
//! use jagdef::prelude::*;
//!
//! let mut engine = ContentEngine::new(EngineConfig::default())?;
//!
//! let mut def = ObjectDefinition::new(7);
//! def.models = ModelSet::Simple(vec![100]);
//!
//! let geometry = MemoryGeometry::new().with_mesh(
//!     100,
//!     Mesh::new(
//!         vec![IVec3::new(0, -64, 0), IVec3::new(64, 0, 0), IVec3::new(0, 0, 64)],
//!         vec![Face::new([0, 1, 2], 0x1234)],
//!     ),
//! );
//! let frames = MemoryFrames::new();
//!
//! let request = MeshRequest::new(STRAIGHT_CENTREPIECE, 1);
//! let outcome = engine.resolve_mesh(&def, request, None, &geometry, &frames);
//! assert!(outcome.is_ready());
//! # Ok::<(), jagdef::Error>(())
//! ```
//!
//! ## Logging
//!
//! The crate logs through [`tracing`] and never installs a subscriber.

pub mod codec;
pub mod compose;
pub mod config;
pub mod definitions;
pub mod engine;
pub mod error;
pub mod mesh;
pub mod morph;
pub mod provider;
pub mod readiness;
pub mod registry;
pub mod texture;

// Re-exports for convenience
pub use config::{EngineConfig, UnknownOpcodePolicy};
pub use engine::ContentEngine;
pub use error::{Error, Result};
pub use provider::{FrameSource, GeometryProvider};
pub use registry::ContentSource;
pub use texture::TextureSource;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::{EngineConfig, UnknownOpcodePolicy};
    pub use crate::engine::ContentEngine;
    pub use crate::error::{Error, Result};

    // Records
    pub use crate::codec::{ByteCursor, RecordWriter};
    pub use crate::definitions::object::{
        ModelSet, MorphControl, MorphTable, ParamValue, STRAIGHT_CENTREPIECE, TypedModel,
        WALL_DECORATION,
    };
    pub use crate::definitions::{
        AnimationDecoder, AnimationDefinition, Decoded, DefinitionDecoder, DefinitionKind,
        GraphicDecoder, GraphicDefinition, ObjectDecoder, ObjectDefinition,
    };

    // Registries
    pub use crate::registry::{
        AnimationRegistry, ContentSource, DefinitionRegistry, GraphicRegistry, LoadSummary,
        MemoryArchive, ObjectRegistry, SlotLayout,
    };

    // Meshes and composition
    pub use crate::compose::{CornerHeights, MeshOutcome, MeshRequest, MeshResolver, contour};
    pub use crate::mesh::{Face, Frame, FrameTransform, LightParams, Mesh, TransformKind};
    pub use crate::provider::{
        FrameSource, GeometryProvider, MemoryFrames, MemoryGeometry,
    };

    // Morphs, readiness, textures
    pub use crate::morph::{VarbitDirectory, VarbitWindow, morph_index, morph_target};
    pub use crate::readiness::ReadinessPoller;
    pub use crate::texture::{Texture, TexturePixelCache, TextureSource};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
