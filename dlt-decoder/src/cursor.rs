//! Bounds-checked forward cursor over a borrowed byte slice
//!
//! Every read checks the remaining length first and reports a
//! [`DecodeError::Truncated`] with the absolute source offset, so a cursor over
//! a sub-slice (e.g. one record's payload) still reports file positions.

use crate::types::{DecodeError, Endianness, Result};
use byteorder::{BigEndian, ByteOrder, LittleEndian};

macro_rules! read_ordered {
    ($name:ident, $ty:ty, $size:expr, $read:ident) => {
        pub fn $name(&mut self, order: Endianness) -> Result<$ty> {
            let bytes = self.take($size)?;
            Ok(match order {
                Endianness::Little => LittleEndian::$read(bytes),
                Endianness::Big => BigEndian::$read(bytes),
            })
        }
    };
}

#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_base(data, 0)
    }

    /// Cursor whose reported offsets start at `base`
    pub fn with_base(data: &'a [u8], base: usize) -> Self {
        Self { data, pos: 0, base }
    }

    /// Absolute offset of the next unread byte
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(DecodeError::Truncated {
                offset: self.offset(),
                needed: len,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    read_ordered!(read_u16, u16, 2, read_u16);
    read_ordered!(read_i16, i16, 2, read_i16);
    read_ordered!(read_u32, u32, 4, read_u32);
    read_ordered!(read_i32, i32, 4, read_i32);
    read_ordered!(read_u64, u64, 8, read_u64);
    read_ordered!(read_i64, i64, 8, read_i64);
    read_ordered!(read_f32, f32, 4, read_f32);
    read_ordered!(read_f64, f64, 8, read_f64);
}
