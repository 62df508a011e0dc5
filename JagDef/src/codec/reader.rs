//! Byte cursor over a single definition record

use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt};

use super::WIDE_ID_ABSENT;
use crate::error::{Error, Result};

/// Sequential reader over a record buffer.
///
/// Every strict read checks the remaining length first and fails with
/// [`Error::OutOfData`] instead of reading past the end. The `safe_*` reads
/// return `-1` instead, for payloads that are read only to be discarded.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    inner: Cursor<&'a [u8]>,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            inner: Cursor::new(data),
        }
    }

    /// Current read offset.
    #[must_use]
    pub fn position(&self) -> usize {
        self.inner.position() as usize
    }

    /// Bytes left to read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.inner.get_ref().len().saturating_sub(self.position())
    }

    /// Whether every byte has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(Error::OutOfData {
                offset: self.position(),
                needed,
                remaining,
            });
        }
        Ok(())
    }

    /// Look at the next byte without consuming it.
    pub fn peek_u8(&self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.inner.get_ref()[self.position()])
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.inner.read_u8()?)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.ensure(1)?;
        Ok(self.inner.read_i8()?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        Ok(self.inner.read_u16::<BigEndian>()?)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.ensure(2)?;
        Ok(self.inner.read_i16::<BigEndian>()?)
    }

    pub fn read_u24(&mut self) -> Result<u32> {
        self.ensure(3)?;
        Ok(self.inner.read_u24::<BigEndian>()?)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        Ok(self.inner.read_i32::<BigEndian>()?)
    }

    /// Read a `u16` where `0xFFFF` means "none".
    pub fn read_optional_u16(&mut self) -> Result<Option<u16>> {
        let value = self.read_u16()?;
        Ok((value != u16::MAX).then_some(value))
    }

    /// Unsigned smart: `0..=0x7F` in one byte, otherwise two bytes less `0x8000`.
    pub fn read_unsigned_smart(&mut self) -> Result<i32> {
        if self.peek_u8()? < 0x80 {
            Ok(i32::from(self.read_u8()?))
        } else {
            Ok(i32::from(self.read_u16()?) - 0x8000)
        }
    }

    /// Signed smart: one byte less 64, otherwise two bytes less `0xC000`.
    pub fn read_signed_smart(&mut self) -> Result<i32> {
        if self.peek_u8()? < 0x80 {
            Ok(i32::from(self.read_u8()?) - 0x40)
        } else {
            Ok(i32::from(self.read_u16()?) - 0xC000)
        }
    }

    /// Wide id used for geometry, animation and morph targets.
    ///
    /// Four bytes with the sign bit masked off when the first byte has its
    /// sign bit set, otherwise two bytes where `0x7FFF` is "absent".
    pub fn read_wide_id(&mut self) -> Result<Option<u32>> {
        if self.peek_u8()? & 0x80 != 0 {
            let raw = self.read_i32()?;
            Ok(Some((raw & i32::MAX) as u32))
        } else {
            let value = self.read_u16()?;
            Ok((value != WIDE_ID_ABSENT).then_some(u32::from(value)))
        }
    }

    /// Zero-terminated Latin-1 string.
    pub fn read_string(&mut self) -> Result<String> {
        let start = self.position();
        let data = &self.inner.get_ref()[start..];
        let Some(len) = data.iter().position(|&b| b == 0) else {
            return Err(Error::OutOfData {
                offset: start,
                needed: data.len() + 1,
                remaining: data.len(),
            });
        };
        let text = data[..len].iter().copied().map(char::from).collect();
        self.inner.set_position((start + len + 1) as u64);
        Ok(text)
    }

    /// Skip `count` bytes, failing if fewer remain.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.ensure(count)?;
        self.inner.set_position((self.position() + count) as u64);
        Ok(())
    }

    /// Skip up to `count` bytes, stopping at the end of the buffer.
    pub fn skip_lenient(&mut self, count: usize) {
        let count = count.min(self.remaining());
        self.inner.set_position((self.position() + count) as u64);
    }

    /// Read a byte, or `-1` if none remain.
    pub fn safe_u8(&mut self) -> i32 {
        self.read_u8().map_or(-1, i32::from)
    }

    /// Read a `u16`, or `-1` if fewer than two bytes remain.
    pub fn safe_u16(&mut self) -> i32 {
        self.read_u16().map_or(-1, i32::from)
    }

    /// Read an `i32`, or `-1` if fewer than four bytes remain.
    pub fn safe_i32(&mut self) -> i32 {
        self.read_i32().unwrap_or(-1)
    }
}
