//! Animation ("sequence") definitions

use serde::Serialize;

use super::{Decoded, DefinitionDecoder, DefinitionKind, RecordBuilder, decode_record};
use crate::codec::ByteCursor;
use crate::config::UnknownOpcodePolicy;
use crate::error::Result;

/// Sentinel appended to every interleave order.
pub const INTERLEAVE_END: i32 = 9_999_999;

/// One step of an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnimationFrame {
    /// Packed frame id: archive in the high 16 bits, file in the low.
    pub primary: Option<u32>,
    pub secondary: Option<u32>,
    /// Length in client ticks; `-1` for the placeholder frame.
    pub duration: i32,
}

impl AnimationFrame {
    const PLACEHOLDER: Self = Self {
        primary: None,
        secondary: None,
        duration: -1,
    };
}

/// A decoded animation definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimationDefinition {
    pub id: u32,
    pub frames: Vec<AnimationFrame>,
    pub loop_offset: i32,
    pub interleave_order: Option<Vec<i32>>,
    pub stretches: bool,
    pub priority: u8,
    pub offhand: Option<u16>,
    pub mainhand: Option<u16>,
    pub maximum_loops: u8,
    pub animating_precedence: u8,
    pub walking_precedence: u8,
    pub replay_mode: u8,
}

impl AnimationDefinition {
    /// The placeholder animation: one frame that poses nothing.
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self {
            id,
            frames: vec![AnimationFrame::PLACEHOLDER],
            loop_offset: -1,
            interleave_order: None,
            stretches: false,
            priority: 5,
            offhand: None,
            mainhand: None,
            maximum_loops: 99,
            animating_precedence: 0,
            walking_precedence: 0,
            replay_mode: 2,
        }
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Primary frame id at `index`, if the index is valid and the frame poses.
    #[must_use]
    pub fn primary_frame(&self, index: usize) -> Option<u32> {
        self.frames.get(index).and_then(|f| f.primary)
    }

    /// Duration of the frame at `index`, treating non-positive as one tick.
    #[must_use]
    pub fn duration(&self, index: usize) -> u32 {
        self.frames
            .get(index)
            .map_or(1, |f| u32::try_from(f.duration).unwrap_or(0).max(1))
    }
}

/// Decoder for animation records.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimationDecoder {
    policy: UnknownOpcodePolicy,
}

impl AnimationDecoder {
    #[must_use]
    pub fn new(policy: UnknownOpcodePolicy) -> Self {
        Self { policy }
    }
}

impl DefinitionDecoder<AnimationDefinition> for AnimationDecoder {
    fn kind(&self) -> DefinitionKind {
        DefinitionKind::Animation
    }

    fn empty(&self, id: u32) -> AnimationDefinition {
        AnimationDefinition::new(id)
    }

    fn decode(&self, id: u32, data: &[u8]) -> Decoded<AnimationDefinition> {
        decode_record(
            DefinitionKind::Animation,
            id,
            data,
            self.policy,
            AnimationBuilder::new(id),
        )
    }
}

struct AnimationBuilder {
    def: AnimationDefinition,
    animating_precedence: Option<u8>,
    walking_precedence: Option<u8>,
}

impl AnimationBuilder {
    fn new(id: u32) -> Self {
        let mut def = AnimationDefinition::new(id);
        def.frames.clear();
        Self {
            def,
            animating_precedence: None,
            walking_precedence: None,
        }
    }
}

fn read_frames(cursor: &mut ByteCursor<'_>) -> Result<Vec<AnimationFrame>> {
    let count = usize::from(cursor.read_u16()?);
    let mut frames = Vec::with_capacity(count);
    for _ in 0..count {
        frames.push(AnimationFrame {
            primary: None,
            secondary: None,
            duration: i32::from(cursor.read_u16()?),
        });
    }
    let mut low = Vec::with_capacity(count);
    for _ in 0..count {
        low.push(u32::from(cursor.read_u16()?));
    }
    for (frame, low) in frames.iter_mut().zip(low) {
        frame.primary = Some(low | u32::from(cursor.read_u16()?) << 16);
    }
    Ok(frames)
}

impl RecordBuilder for AnimationBuilder {
    type Output = AnimationDefinition;

    fn apply(&mut self, opcode: u8, cursor: &mut ByteCursor<'_>) -> Result<bool> {
        let def = &mut self.def;
        match opcode {
            1 => def.frames = read_frames(cursor)?,
            2 => def.loop_offset = i32::from(cursor.read_u16()?),
            3 => {
                let count = cursor.read_u8()?;
                let mut order = Vec::with_capacity(usize::from(count) + 1);
                for _ in 0..count {
                    order.push(i32::from(cursor.read_u8()?));
                }
                order.push(INTERLEAVE_END);
                def.interleave_order = Some(order);
            }
            5 => def.priority = cursor.read_u8()?,
            6 => def.offhand = Some(cursor.read_u16()?),
            7 => def.mainhand = Some(cursor.read_u16()?),
            8 => def.maximum_loops = cursor.read_u8()?,
            9 => self.animating_precedence = Some(cursor.read_u8()?),
            10 => self.walking_precedence = Some(cursor.read_u8()?),
            11 => def.replay_mode = cursor.read_u8()?,
            12 => {
                let count = usize::from(cursor.read_u8()?);
                cursor.skip(count * 4)?;
            }
            13 => {
                let count = cursor.read_u16()?;
                for _ in 0..count {
                    let nested = usize::from(cursor.read_u8()?);
                    if nested > 0 {
                        cursor.read_u24()?;
                        cursor.skip((nested - 1) * 2)?;
                    }
                }
            }
            14 => def.stretches = true,
            15 | 16 | 18 => {}
            19 => cursor.skip(2)?,
            20 => cursor.skip(5)?,
            22 => {
                cursor.read_u8()?;
            }
            249 => {
                let count = cursor.read_u8()?;
                for _ in 0..count {
                    let is_string = cursor.read_u8()? == 1;
                    cursor.read_u24()?;
                    if is_string {
                        cursor.read_string()?;
                    } else {
                        cursor.read_i32()?;
                    }
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self) -> AnimationDefinition {
        let mut def = if self.def.frames.is_empty() {
            AnimationDefinition::new(self.def.id)
        } else {
            self.def
        };

        let interleaved = if def.interleave_order.is_some() { 2 } else { 0 };
        def.animating_precedence = self.animating_precedence.unwrap_or(interleaved);
        def.walking_precedence = self.walking_precedence.unwrap_or(interleaved);
        def
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::RecordWriter;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_frames_pack_high_and_low() {
        let mut w = RecordWriter::new();
        w.write_u8(1).unwrap();
        w.write_u16(2).unwrap();
        for duration in [4, 6] {
            w.write_u16(duration).unwrap();
        }
        for low in [10, 11] {
            w.write_u16(low).unwrap();
        }
        for high in [3, 3] {
            w.write_u16(high).unwrap();
        }
        w.write_u8(0).unwrap();

        let def = AnimationDecoder::default().decode(9, &w.finish()).definition;
        assert_eq!(def.frame_count(), 2);
        assert_eq!(def.primary_frame(0), Some(3 << 16 | 10));
        assert_eq!(def.frames[1].duration, 6);
        assert_eq!(def.frames[1].secondary, None);
    }

    #[test]
    fn test_no_frames_gives_placeholder() {
        let def = AnimationDecoder::default().decode(4, &[5, 9, 0]).definition;
        assert_eq!(def, AnimationDefinition::new(4));
        assert_eq!(def.primary_frame(0), None);
    }

    #[test]
    fn test_precedence_derived_from_interleave() {
        let bytes = [1, 0, 1, 0, 1, 0, 0, 0, 0, 3, 2, 4, 5, 10, 1, 0];
        let def = AnimationDecoder::default().decode(1, &bytes).definition;
        assert_eq!(def.interleave_order, Some(vec![4, 5, INTERLEAVE_END]));
        assert_eq!(def.animating_precedence, 2);
        assert_eq!(def.walking_precedence, 1);
    }

    #[test]
    fn test_sound_entries_skipped() {
        // One nested entry of three: u24 then two u16.
        let bytes = [13, 0, 1, 3, 0, 0, 1, 0, 2, 0, 3, 8, 7, 0];
        let decoded = AnimationDecoder::default().decode(2, &bytes);
        assert!(decoded.is_clean());
        // Frame-less record: placeholder, so decoded maximum loops is dropped.
        assert_eq!(decoded.definition.maximum_loops, 99);
    }
}
