//! Object record decoding

use super::{
    ModelSet, MorphControl, MorphTable, ObjectDefinition, ParamValue, STRAIGHT_CENTREPIECE,
    TypedModel,
};
use crate::codec::ByteCursor;
use crate::config::UnknownOpcodePolicy;
use crate::definitions::{Decoded, DefinitionDecoder, DefinitionKind, RecordBuilder, decode_record};
use crate::error::Result;

/// Decoder for object records.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectDecoder {
    policy: UnknownOpcodePolicy,
}

impl ObjectDecoder {
    #[must_use]
    pub fn new(policy: UnknownOpcodePolicy) -> Self {
        Self { policy }
    }
}

impl DefinitionDecoder<ObjectDefinition> for ObjectDecoder {
    fn kind(&self) -> DefinitionKind {
        DefinitionKind::Object
    }

    fn empty(&self, id: u32) -> ObjectDefinition {
        ObjectDefinition::new(id)
    }

    fn decode(&self, id: u32, data: &[u8]) -> Decoded<ObjectDefinition> {
        decode_record(
            DefinitionKind::Object,
            id,
            data,
            self.policy,
            ObjectBuilder::new(id),
        )
    }
}

/// Fields that only matter until normalization.
struct ObjectBuilder {
    def: ObjectDefinition,
    explicit_interactive: Option<bool>,
    explicit_support_items: Option<u8>,
}

impl ObjectBuilder {
    fn new(id: u32) -> Self {
        Self {
            def: ObjectDefinition::new(id),
            explicit_interactive: None,
            explicit_support_items: None,
        }
    }
}

fn read_pairs(cursor: &mut ByteCursor<'_>) -> Result<Vec<(u16, u16)>> {
    let count = cursor.read_u8()?;
    (0..count)
        .map(|_| Ok((cursor.read_u16()?, cursor.read_u16()?)))
        .collect()
}

fn read_typed_models(cursor: &mut ByteCursor<'_>) -> Result<ModelSet> {
    let groups = cursor.read_u8()?;
    let mut models = Vec::new();
    for _ in 0..groups {
        let model_type = i32::from(cursor.read_i8()?);
        let count = cursor.read_u8()?;
        for _ in 0..count {
            if let Some(id) = cursor.read_wide_id()? {
                models.push(TypedModel { id, model_type });
            }
        }
    }
    Ok(if models.is_empty() {
        ModelSet::None
    } else {
        ModelSet::Typed(models)
    })
}

fn read_simple_models(cursor: &mut ByteCursor<'_>) -> Result<ModelSet> {
    let count = cursor.read_u8()?;
    let mut ids = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        if let Some(id) = cursor.read_wide_id()? {
            ids.push(id);
        }
    }
    Ok(if ids.is_empty() {
        ModelSet::None
    } else {
        ModelSet::Simple(ids)
    })
}

fn read_morph(cursor: &mut ByteCursor<'_>, with_extra: bool) -> Result<MorphTable> {
    let varbit = cursor.read_optional_u16()?;
    let varp = cursor.read_optional_u16()?;
    let extra = if with_extra {
        cursor.read_wide_id()?
    } else {
        None
    };
    let count = usize::from(cursor.read_u8()?);
    let mut targets = Vec::with_capacity(count + 2);
    for _ in 0..=count {
        targets.push(cursor.read_wide_id()?);
    }
    targets.push(extra);

    let control = match (varbit, varp) {
        (Some(varbit), _) => MorphControl::Varbit(varbit),
        (None, Some(varp)) => MorphControl::Varp(varp),
        (None, None) => MorphControl::Unbound,
    };
    Ok(MorphTable { control, targets })
}

fn read_params(cursor: &mut ByteCursor<'_>, def: &mut ObjectDefinition) -> Result<()> {
    let count = cursor.read_u8()?;
    for _ in 0..count {
        let is_string = cursor.read_u8()? == 1;
        let key = cursor.read_u24()?;
        let value = if is_string {
            ParamValue::Text(cursor.read_string()?)
        } else {
            ParamValue::Int(cursor.read_i32()?)
        };
        def.params.insert(key, value);
    }
    Ok(())
}

impl RecordBuilder for ObjectBuilder {
    type Output = ObjectDefinition;

    fn apply(&mut self, opcode: u8, cursor: &mut ByteCursor<'_>) -> Result<bool> {
        let def = &mut self.def;
        match opcode {
            1 => def.models = read_typed_models(cursor)?,
            2 => def.name = Some(cursor.read_string()?),
            5 => def.models = read_simple_models(cursor)?,
            14 => def.width = cursor.read_u8()?,
            15 => def.length = cursor.read_u8()?,
            17 => def.solid = false,
            18 => def.impenetrable = false,
            19 => self.explicit_interactive = Some(cursor.read_u8()? == 1),
            21 | 94 => def.contoured_ground = true,
            22 => def.delay_shading = true,
            23 => def.occludes = true,
            24 => def.animation = cursor.read_wide_id()?,
            28 => def.decor_displacement = i32::from(cursor.read_u8()?) << 2,
            29 => def.ambient_lighting = cursor.read_i8()?,
            39 => def.light_diffusion = cursor.read_i8()?,
            30..=38 => {
                let label = cursor.read_string()?;
                def.interactions[usize::from(opcode - 30)] =
                    (!label.eq_ignore_ascii_case("hidden")).then_some(label);
            }
            40 => def.recolours = read_pairs(cursor)?,
            41 => def.retextures = read_pairs(cursor)?,
            42 => {
                let count = cursor.read_u8()?;
                cursor.skip(usize::from(count))?;
            }
            44 | 45 | 164..=167 | 190..=195 => {
                cursor.read_u16()?;
            }
            60 => def.minimap_function = cursor.read_optional_u16()?,
            62 => def.inverted = true,
            64 => def.casts_shadow = false,
            65 => def.scale[0] = i32::from(cursor.read_u16()?),
            66 => def.scale[1] = i32::from(cursor.read_u16()?),
            67 => def.scale[2] = i32::from(cursor.read_u16()?),
            68 | 102 => def.mapscene = cursor.read_optional_u16()?,
            69 => def.surroundings = cursor.read_u8()?,
            70 => def.translate[0] = i32::from(cursor.read_i16()?) << 2,
            71 => def.translate[1] = i32::from(cursor.read_i16()?) << 2,
            72 => def.translate[2] = i32::from(cursor.read_i16()?) << 2,
            73 => def.obstructs_ground = true,
            74 => def.hollow = true,
            75 => self.explicit_support_items = Some(cursor.read_u8()?),
            77 | 92 => def.morph = Some(read_morph(cursor, opcode == 92)?),
            78 => {
                cursor.read_u16()?;
                cursor.read_u8()?;
            }
            79 => {
                cursor.skip(5)?;
                let count = cursor.read_u8()?;
                cursor.skip(usize::from(count) * 2)?;
            }
            81 => {
                def.contoured_ground = true;
                cursor.read_u8()?;
            }
            93 | 95 => {
                def.contoured_ground = true;
                cursor.read_u16()?;
            }
            99 | 100 => cursor.skip(3)?,
            101 | 104 | 178 => {
                cursor.read_u8()?;
            }
            103 => def.occludes = false,
            106 => {
                let count = cursor.read_u8()?;
                let mut first = None;
                for _ in 0..count {
                    let id = cursor.read_wide_id()?;
                    cursor.read_u8()?;
                    first = first.or(id);
                }
                if first.is_some() {
                    def.animation = first;
                }
            }
            107 => def.area_id = cursor.read_optional_u16()?,
            150..=154 => {
                cursor.read_string()?;
            }
            160 => {
                let count = cursor.read_u8()?;
                cursor.skip(usize::from(count) * 2)?;
            }
            162 => {
                def.contoured_ground = true;
                cursor.read_i32()?;
            }
            163 => cursor.skip(4)?,
            170 | 171 => {
                cursor.read_unsigned_smart()?;
            }
            173 => cursor.skip(4)?,
            27 | 82 | 88 | 89 | 91 | 97 | 98 | 105 | 168 | 169 | 177 | 189 => {}
            249 => read_params(cursor, def)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self) -> ObjectDefinition {
        let mut def = self.def;

        def.interactive = self.explicit_interactive.unwrap_or_else(|| {
            def.models.has_role(STRAIGHT_CENTREPIECE) || def.has_interactions()
        });

        if def.hollow {
            def.solid = false;
            def.impenetrable = false;
        }

        def.support_items = self
            .explicit_support_items
            .unwrap_or_else(|| u8::from(def.solid));

        def
    }
}
