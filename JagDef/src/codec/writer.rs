//! Record writer, the inverse of [`super::ByteCursor`]

#![allow(clippy::cast_possible_truncation)]

use byteorder::{BigEndian, WriteBytesExt};

use super::{WIDE_ID_ABSENT, WIDE_ID_SHORT_MAX};
use crate::error::Result;

/// Growable big-endian record buffer.
#[derive(Debug, Default, Clone)]
pub struct RecordWriter {
    buf: Vec<u8>,
}

impl RecordWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.buf.write_u8(value)?;
        Ok(())
    }

    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.buf.write_i8(value)?;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.buf.write_u16::<BigEndian>(value)?;
        Ok(())
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.buf.write_i16::<BigEndian>(value)?;
        Ok(())
    }

    /// Write the low 24 bits of `value`.
    pub fn write_u24(&mut self, value: u32) -> Result<()> {
        self.buf.write_u24::<BigEndian>(value & 0x00FF_FFFF)?;
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.buf.write_i32::<BigEndian>(value)?;
        Ok(())
    }

    /// Write a `u16` where `None` is `0xFFFF`.
    pub fn write_optional_u16(&mut self, value: Option<u16>) -> Result<()> {
        self.write_u16(value.unwrap_or(u16::MAX))
    }

    /// Write a wide id, choosing the short form when it fits.
    pub fn write_wide_id(&mut self, id: Option<u32>) -> Result<()> {
        match id {
            None => self.write_u16(WIDE_ID_ABSENT),
            Some(id) if id <= WIDE_ID_SHORT_MAX => self.write_u16(id as u16),
            Some(id) => self.write_i32((id | 0x8000_0000) as i32),
        }
    }

    /// Write an unsigned smart. Values outside `0..0x8000` are clamped.
    pub fn write_unsigned_smart(&mut self, value: i32) -> Result<()> {
        let value = value.clamp(0, 0x7FFF);
        if value < 0x80 {
            self.write_u8(value as u8)
        } else {
            self.write_u16((value + 0x8000) as u16)
        }
    }

    /// Write a zero-terminated Latin-1 string. Characters outside Latin-1
    /// are written as `?`.
    pub fn write_string(&mut self, text: &str) -> Result<()> {
        self.buf.extend(
            text.chars()
                .map(|c| u8::try_from(u32::from(c)).ok().filter(|&b| b != 0).unwrap_or(b'?')),
        );
        self.write_u8(0)
    }

    /// Consume the writer, returning the bytes.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
