//! Graphic ("spot animation") definitions

use serde::Serialize;

use super::{Decoded, DefinitionDecoder, DefinitionKind, RecordBuilder, decode_record};
use crate::codec::ByteCursor;
use crate::config::UnknownOpcodePolicy;
use crate::error::Result;

/// A decoded graphic definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphicDefinition {
    pub id: u32,
    pub model: Option<u32>,
    pub animation: Option<u32>,
    /// Horizontal scale; 128 is unscaled.
    pub breadth_scale: u16,
    /// Vertical scale; 128 is unscaled.
    pub depth_scale: u16,
    pub orientation: u16,
    pub ambience: u8,
    pub shadow: u8,
    pub recolours: Vec<(u16, u16)>,
    pub retextures: Vec<(u16, u16)>,
}

impl GraphicDefinition {
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self {
            id,
            model: None,
            animation: None,
            breadth_scale: 128,
            depth_scale: 128,
            orientation: 0,
            ambience: 0,
            shadow: 0,
            recolours: Vec::new(),
            retextures: Vec::new(),
        }
    }
}

/// Decoder for graphic records.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphicDecoder {
    policy: UnknownOpcodePolicy,
}

impl GraphicDecoder {
    #[must_use]
    pub fn new(policy: UnknownOpcodePolicy) -> Self {
        Self { policy }
    }
}

impl DefinitionDecoder<GraphicDefinition> for GraphicDecoder {
    fn kind(&self) -> DefinitionKind {
        DefinitionKind::Graphic
    }

    fn empty(&self, id: u32) -> GraphicDefinition {
        GraphicDefinition::new(id)
    }

    fn decode(&self, id: u32, data: &[u8]) -> Decoded<GraphicDefinition> {
        decode_record(
            DefinitionKind::Graphic,
            id,
            data,
            self.policy,
            GraphicBuilder(GraphicDefinition::new(id)),
        )
    }
}

struct GraphicBuilder(GraphicDefinition);

fn read_pairs(cursor: &mut ByteCursor<'_>) -> Result<Vec<(u16, u16)>> {
    let count = cursor.read_u8()?;
    (0..count)
        .map(|_| Ok((cursor.read_u16()?, cursor.read_u16()?)))
        .collect()
}

impl RecordBuilder for GraphicBuilder {
    type Output = GraphicDefinition;

    fn apply(&mut self, opcode: u8, cursor: &mut ByteCursor<'_>) -> Result<bool> {
        let def = &mut self.0;
        match opcode {
            1 => def.model = cursor.read_wide_id()?,
            2 => def.animation = cursor.read_wide_id()?,
            4 => def.breadth_scale = cursor.read_u16()?,
            5 => def.depth_scale = cursor.read_u16()?,
            6 => def.orientation = cursor.read_u16()?,
            7 => def.ambience = cursor.read_u8()?,
            8 => def.shadow = cursor.read_u8()?,
            9..=13 => {}
            14 => {
                cursor.read_u8()?;
            }
            15 | 44 | 45 => {
                cursor.read_u16()?;
            }
            16 => {
                cursor.read_i32()?;
            }
            40 => def.recolours = read_pairs(cursor)?,
            41 => def.retextures = read_pairs(cursor)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self) -> GraphicDefinition {
        self.0
    }
}
