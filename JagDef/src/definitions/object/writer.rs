//! Object record encoding

use super::{
    ModelSet, MorphControl, MorphTable, NEUTRAL_SCALE, ObjectDefinition, ParamValue,
    STRAIGHT_CENTREPIECE,
};
use crate::codec::RecordWriter;
use crate::definitions::TERMINATOR;
use crate::error::Result;

/// Encode every field of `def` that differs from its default.
pub(super) fn encode(def: &ObjectDefinition) -> Result<Vec<u8>> {
    let mut w = RecordWriter::new();

    write_models(&mut w, &def.models)?;
    if let Some(name) = &def.name {
        w.write_u8(2)?;
        w.write_string(name)?;
    }
    if def.width != 1 {
        w.write_u8(14)?;
        w.write_u8(def.width)?;
    }
    if def.length != 1 {
        w.write_u8(15)?;
        w.write_u8(def.length)?;
    }
    // Hollow implies both, so only write them for solid-shaped records.
    if !def.hollow && !def.solid {
        w.write_u8(17)?;
    }
    if !def.hollow && !def.impenetrable {
        w.write_u8(18)?;
    }
    let derived_interactive = def.models.has_role(STRAIGHT_CENTREPIECE) || def.has_interactions();
    if def.interactive != derived_interactive {
        w.write_u8(19)?;
        w.write_u8(u8::from(def.interactive))?;
    }
    write_flag(&mut w, 21, def.contoured_ground)?;
    write_flag(&mut w, 22, def.delay_shading)?;
    write_flag(&mut w, 23, def.occludes)?;
    if def.animation.is_some() {
        w.write_u8(24)?;
        w.write_wide_id(def.animation)?;
    }
    if def.decor_displacement != 16 {
        w.write_u8(28)?;
        w.write_u8((def.decor_displacement >> 2) as u8)?;
    }
    if def.ambient_lighting != 0 {
        w.write_u8(29)?;
        w.write_i8(def.ambient_lighting)?;
    }
    if def.light_diffusion != 0 {
        w.write_u8(39)?;
        w.write_i8(def.light_diffusion)?;
    }
    for (slot, label) in def.interactions.iter().enumerate().take(9) {
        if let Some(label) = label {
            w.write_u8(30 + slot as u8)?;
            w.write_string(label)?;
        }
    }
    write_pairs(&mut w, 40, &def.recolours)?;
    write_pairs(&mut w, 41, &def.retextures)?;
    if def.minimap_function.is_some() {
        w.write_u8(60)?;
        w.write_optional_u16(def.minimap_function)?;
    }
    write_flag(&mut w, 62, def.inverted)?;
    write_flag(&mut w, 64, !def.casts_shadow)?;
    for (axis, &scale) in def.scale.iter().enumerate() {
        if scale != NEUTRAL_SCALE {
            w.write_u8(65 + axis as u8)?;
            w.write_u16(scale as u16)?;
        }
    }
    if def.mapscene.is_some() {
        w.write_u8(68)?;
        w.write_optional_u16(def.mapscene)?;
    }
    if def.surroundings != 0 {
        w.write_u8(69)?;
        w.write_u8(def.surroundings)?;
    }
    for (axis, &offset) in def.translate.iter().enumerate() {
        if offset != 0 {
            w.write_u8(70 + axis as u8)?;
            w.write_i16((offset >> 2) as i16)?;
        }
    }
    write_flag(&mut w, 73, def.obstructs_ground)?;
    write_flag(&mut w, 74, def.hollow)?;
    let solid = def.solid && !def.hollow;
    if def.support_items != u8::from(solid) {
        w.write_u8(75)?;
        w.write_u8(def.support_items)?;
    }
    if let Some(morph) = &def.morph {
        write_morph(&mut w, morph)?;
    }
    if def.area_id.is_some() {
        w.write_u8(107)?;
        w.write_optional_u16(def.area_id)?;
    }
    if !def.params.is_empty() {
        w.write_u8(249)?;
        w.write_u8(def.params.len().min(255) as u8)?;
        for (&key, value) in def.params.iter().take(255) {
            match value {
                ParamValue::Text(text) => {
                    w.write_u8(1)?;
                    w.write_u24(key)?;
                    w.write_string(text)?;
                }
                ParamValue::Int(value) => {
                    w.write_u8(0)?;
                    w.write_u24(key)?;
                    w.write_i32(*value)?;
                }
            }
        }
    }

    w.write_u8(TERMINATOR)?;
    Ok(w.finish())
}

fn write_flag(w: &mut RecordWriter, opcode: u8, set: bool) -> Result<()> {
    if set {
        w.write_u8(opcode)?;
    }
    Ok(())
}

fn write_pairs(w: &mut RecordWriter, opcode: u8, pairs: &[(u16, u16)]) -> Result<()> {
    if pairs.is_empty() {
        return Ok(());
    }
    let pairs = &pairs[..pairs.len().min(255)];
    w.write_u8(opcode)?;
    w.write_u8(pairs.len() as u8)?;
    for &(from, to) in pairs {
        w.write_u16(from)?;
        w.write_u16(to)?;
    }
    Ok(())
}

fn write_models(w: &mut RecordWriter, models: &ModelSet) -> Result<()> {
    match models {
        ModelSet::None => {}
        ModelSet::Simple(ids) => {
            let ids = &ids[..ids.len().min(255)];
            w.write_u8(5)?;
            w.write_u8(ids.len() as u8)?;
            for &id in ids {
                w.write_wide_id(Some(id))?;
            }
        }
        ModelSet::Typed(models) => {
            // Consecutive entries of one role share a group.
            let mut groups: Vec<(i32, Vec<u32>)> = Vec::new();
            for model in models {
                match groups.last_mut() {
                    Some((role, ids)) if *role == model.model_type && ids.len() < 255 => {
                        ids.push(model.id);
                    }
                    _ => groups.push((model.model_type, vec![model.id])),
                }
            }
            groups.truncate(255);
            w.write_u8(1)?;
            w.write_u8(groups.len() as u8)?;
            for (role, ids) in groups {
                w.write_i8(role as i8)?;
                w.write_u8(ids.len() as u8)?;
                for id in ids {
                    w.write_wide_id(Some(id))?;
                }
            }
        }
    }
    Ok(())
}

fn write_morph(w: &mut RecordWriter, morph: &MorphTable) -> Result<()> {
    let Some((&extra, listed)) = morph.targets.split_last() else {
        return Ok(());
    };
    if listed.is_empty() {
        return Ok(());
    }
    let listed = &listed[..listed.len().min(256)];
    let (varbit, varp) = match morph.control {
        MorphControl::Varbit(id) => (Some(id), None),
        MorphControl::Varp(id) => (None, Some(id)),
        MorphControl::Unbound => (None, None),
    };

    w.write_u8(if extra.is_some() { 92 } else { 77 })?;
    w.write_optional_u16(varbit)?;
    w.write_optional_u16(varp)?;
    if extra.is_some() {
        w.write_wide_id(extra)?;
    }
    w.write_u8((listed.len() - 1) as u8)?;
    for &target in listed {
        w.write_wide_id(target)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::DefinitionDecoder;
    use crate::definitions::object::{ObjectDecoder, TypedModel};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_encodes_to_terminator() {
        assert_eq!(encode(&ObjectDefinition::new(3)).unwrap(), vec![0]);
    }

    #[test]
    fn test_round_trip_explicit_fields() {
        let mut def = ObjectDefinition::new(77);
        def.name = Some("Bank booth".to_string());
        def.models = ModelSet::Typed(vec![
            TypedModel { id: 4000, model_type: 0 },
            TypedModel { id: 4001, model_type: 0 },
            TypedModel { id: 70_000, model_type: 2 },
        ]);
        def.width = 2;
        def.animation = Some(512);
        def.interactions[1] = Some("Bank".to_string());
        def.interactive = true;
        def.recolours = vec![(6798, 4550)];
        def.scale = [128, 160, 96];
        def.translate = [16, 0, -8];
        def.contoured_ground = true;
        def.mapscene = Some(12);
        def.morph = Some(MorphTable {
            control: MorphControl::Varbit(3300),
            targets: vec![Some(1), None, Some(3), None],
        });
        def.params.insert(10, ParamValue::Int(-1));

        let bytes = def.encode().unwrap();
        let decoded = ObjectDecoder::default().decode(77, &bytes);
        assert!(decoded.is_clean());
        assert_eq!(decoded.definition, def);
    }

    #[test]
    fn test_round_trip_hollow_and_support() {
        let mut def = ObjectDefinition::new(5);
        def.hollow = true;
        def.solid = false;
        def.impenetrable = false;
        def.support_items = 1;

        let decoded = ObjectDecoder::default().decode(5, &def.encode().unwrap());
        assert_eq!(decoded.definition, def);
    }
}
