//! World object definitions
//!
//! An object ("loc") describes a placeable piece of scenery: its geometry,
//! transform, lighting and collision flags, the interaction labels shown to
//! the player, and an optional morph table that swaps it for another object
//! depending on game state.

mod reader;
mod writer;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::Result;

pub use reader::ObjectDecoder;

/// Geometry role for free-standing scenery, the "straight" placement.
pub const STRAIGHT_CENTREPIECE: i32 = 10;

/// Geometry role for wall decorations, which get the diagonal correction.
pub const WALL_DECORATION: i32 = 4;

/// Number of interaction label slots.
pub const INTERACTION_SLOTS: usize = 10;

/// Neutral scale on every axis.
pub const NEUTRAL_SCALE: i32 = 128;

/// Geometry id paired with the role it is placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypedModel {
    pub id: u32,
    pub model_type: i32,
}

/// The geometry an object draws.
///
/// A record carries either no geometry, a flat list used only for the
/// straight role, or a list where every id names its own role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum ModelSet {
    #[default]
    None,
    Simple(Vec<u32>),
    Typed(Vec<TypedModel>),
}

impl ModelSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Simple(ids) => ids.is_empty(),
            Self::Typed(models) => models.is_empty(),
        }
    }

    /// Whether every id carries its own role.
    #[must_use]
    pub fn is_typed(&self) -> bool {
        matches!(self, Self::Typed(_))
    }

    /// Ids drawn for `model_type`, in record order.
    ///
    /// A flat list only applies to the straight role.
    #[must_use]
    pub fn candidates(&self, model_type: i32) -> Vec<u32> {
        match self {
            Self::None => Vec::new(),
            Self::Simple(ids) if model_type == STRAIGHT_CENTREPIECE => ids.clone(),
            Self::Simple(_) => Vec::new(),
            Self::Typed(models) => models
                .iter()
                .filter(|m| m.model_type == model_type)
                .map(|m| m.id)
                .collect(),
        }
    }

    /// Every referenced id regardless of role.
    #[must_use]
    pub fn ids(&self) -> Vec<u32> {
        match self {
            Self::None => Vec::new(),
            Self::Simple(ids) => ids.clone(),
            Self::Typed(models) => models.iter().map(|m| m.id).collect(),
        }
    }

    /// Whether any entry is placed in `model_type`.
    #[must_use]
    pub fn has_role(&self, model_type: i32) -> bool {
        match self {
            Self::None => false,
            Self::Simple(ids) => model_type == STRAIGHT_CENTREPIECE && !ids.is_empty(),
            Self::Typed(models) => models.iter().any(|m| m.model_type == model_type),
        }
    }
}

/// External state variable that drives a morph table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MorphControl {
    /// A bit window inside a settings slot, looked up by varbit id.
    Varbit(u16),
    /// A whole settings slot.
    Varp(u16),
    /// Neither is bound; resolution always lands on the fallback slot.
    Unbound,
}

/// Alternate objects selected by game state.
///
/// The final entry of `targets` is the fallback used for out-of-range
/// indices. `None` entries mean "no override".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MorphTable {
    pub control: MorphControl,
    pub targets: Vec<Option<u32>>,
}

impl MorphTable {
    /// Target at `index`, or the fallback slot when `index` is out of range.
    #[must_use]
    pub fn target(&self, index: i64) -> Option<u32> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.targets.get(i))
            .or_else(|| self.targets.last())
            .copied()
            .flatten()
    }
}

/// Value in an object's parameter map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i32),
    Text(String),
}

/// A decoded object definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectDefinition {
    pub id: u32,
    pub name: Option<String>,
    pub models: ModelSet,
    pub width: u8,
    pub length: u8,
    pub solid: bool,
    pub impenetrable: bool,
    pub interactive: bool,
    pub contoured_ground: bool,
    pub delay_shading: bool,
    pub occludes: bool,
    pub animation: Option<u32>,
    pub decor_displacement: i32,
    pub ambient_lighting: i8,
    pub light_diffusion: i8,
    pub interactions: [Option<String>; INTERACTION_SLOTS],
    /// `(find, replace)` HSL colour pairs.
    pub recolours: Vec<(u16, u16)>,
    /// `(find, replace)` texture id pairs.
    pub retextures: Vec<(u16, u16)>,
    pub minimap_function: Option<u16>,
    pub mapscene: Option<u16>,
    pub area_id: Option<u16>,
    pub inverted: bool,
    pub casts_shadow: bool,
    /// Scale along x, height and z; 128 is unscaled.
    pub scale: [i32; 3],
    pub translate: [i32; 3],
    pub surroundings: u8,
    pub obstructs_ground: bool,
    pub hollow: bool,
    pub support_items: u8,
    pub morph: Option<MorphTable>,
    pub params: IndexMap<u32, ParamValue>,
}

impl ObjectDefinition {
    /// The default ("reset") definition for `id`.
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self {
            id,
            name: None,
            models: ModelSet::None,
            width: 1,
            length: 1,
            solid: true,
            impenetrable: true,
            interactive: false,
            contoured_ground: false,
            delay_shading: false,
            occludes: false,
            animation: None,
            decor_displacement: 16,
            ambient_lighting: 0,
            light_diffusion: 0,
            interactions: Default::default(),
            recolours: Vec::new(),
            retextures: Vec::new(),
            minimap_function: None,
            mapscene: None,
            area_id: None,
            inverted: false,
            casts_shadow: true,
            scale: [NEUTRAL_SCALE; 3],
            translate: [0; 3],
            surroundings: 0,
            obstructs_ground: false,
            hollow: false,
            support_items: 1,
            morph: None,
            params: IndexMap::new(),
        }
    }

    /// Whether any axis differs from the neutral scale.
    #[must_use]
    pub fn is_scaled(&self) -> bool {
        self.scale.iter().any(|&s| s != NEUTRAL_SCALE)
    }

    #[must_use]
    pub fn is_translated(&self) -> bool {
        self.translate.iter().any(|&t| t != 0)
    }

    /// Name for display, falling back to `"null"`.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("null")
    }

    /// Whether any interaction label is present.
    #[must_use]
    pub fn has_interactions(&self) -> bool {
        self.interactions.iter().any(Option::is_some)
    }

    /// Encode the fields that differ from their defaults as a record.
    ///
    /// Decoding the output yields an equal definition for any definition the
    /// decoder itself produced.
    pub fn encode(&self) -> Result<Vec<u8>> {
        writer::encode(self)
    }
}

impl Default for ObjectDefinition {
    fn default() -> Self {
        Self::new(0)
    }
}
