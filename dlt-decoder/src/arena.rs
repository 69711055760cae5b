//! Append-only text store for synthesized payload text
//!
//! The arena owns every byte of text the decoder has to compute (numbers,
//! hex dumps, joined arguments). Text copied verbatim from the source is
//! never stored here.
//!
//! The backing buffer is allocated once with a fixed capacity and is never
//! reallocated, so a [`TextSpan`] handed out by [`TextArena::store`] keeps
//! pointing at the same bytes for the lifetime of the arena. Running out of
//! room is reported as [`ArenaError::Exhausted`]; the buffer is not grown.

use std::fmt::{self, Write};

/// Extra room on top of the scaled source size
const ARENA_SLACK: usize = 64;

/// Smallest expansion factor that bounds the worst-case text of a record
pub const MIN_EXPANSION_FACTOR: usize = 3;

/// Errors returned by arena operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    #[error("arena exhausted after {written} of {requested} bytes, {remaining} of {capacity} left")]
    Exhausted {
        written: usize,
        requested: usize,
        remaining: usize,
        capacity: usize,
    },
}

/// Location of text previously written to a [`TextArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextSpan {
    start: usize,
    len: usize,
}

impl TextSpan {
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Fixed-capacity, append-only byte store
pub struct TextArena {
    buffer: Box<[u8]>,
    len: usize,
}

impl fmt::Debug for TextArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextArena")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl TextArena {
    /// Create an arena of exactly `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// Create an arena large enough to hold all text synthesized from a
    /// source of `source_len` bytes
    ///
    /// Every decoded argument renders to at most three bytes of text per
    /// input byte it consumed (hex dumps are the worst case), and record
    /// headers only add to the input side.
    pub fn for_source(source_len: usize, expansion_factor: usize) -> Self {
        let factor = expansion_factor.max(MIN_EXPANSION_FACTOR);
        let capacity = source_len.saturating_mul(factor).saturating_add(ARENA_SLACK);
        log::debug!(
            "Sizing text arena for {} source bytes: {} bytes (factor {})",
            source_len,
            capacity,
            factor
        );
        Self::with_capacity(capacity)
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn remaining(&self) -> usize {
        self.capacity() - self.len
    }

    /// Address of the backing buffer; constant for the arena's lifetime
    pub fn as_ptr(&self) -> *const u8 {
        self.buffer.as_ptr()
    }

    /// Forget all stored text
    ///
    /// Takes `&mut self`, so no view into the arena can still be alive.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Format `value` into the unused tail and return its span
    pub fn store<V: ArenaText + ?Sized>(&mut self, value: &V) -> Result<TextSpan, ArenaError> {
        self.write_with(|writer| value.write_text(writer))
    }

    /// Format `values` space-separated into the unused tail and return the
    /// span of the whole joined text
    pub fn store_joined<V: ArenaText>(&mut self, values: &[V]) -> Result<TextSpan, ArenaError> {
        self.write_with(|writer| {
            for (index, value) in values.iter().enumerate() {
                if index > 0 {
                    writer.write_char(' ')?;
                }
                value.write_text(writer)?;
            }
            Ok(())
        })
    }

    /// Text of a span returned by this arena
    pub fn get(&self, span: TextSpan) -> &str {
        let bytes = self
            .buffer
            .get(span.start..span.start + span.len)
            .unwrap_or_default();
        // Spans only ever cover complete `write_str` calls.
        std::str::from_utf8(bytes).unwrap_or_default()
    }

    fn write_with<F>(&mut self, write: F) -> Result<TextSpan, ArenaError>
    where
        F: FnOnce(&mut ArenaWriter<'_>) -> fmt::Result,
    {
        let start = self.len;
        let mut writer = ArenaWriter {
            buffer: &mut self.buffer[start..],
            pos: 0,
            requested: 0,
        };

        match write(&mut writer) {
            Ok(()) => {
                let len = writer.pos;
                self.len += len;
                Ok(TextSpan { start, len })
            }
            Err(fmt::Error) => {
                let written = writer.pos;
                let requested = writer.requested;
                // Nothing of a failed store stays visible.
                Err(ArenaError::Exhausted {
                    written,
                    requested,
                    remaining: self.remaining(),
                    capacity: self.capacity(),
                })
            }
        }
    }
}

/// Sink handed to [`ArenaText`] implementations
///
/// Writes land directly in the arena's unused tail; a write that does not fit
/// fails with [`fmt::Error`] instead of growing anything.
pub struct ArenaWriter<'a> {
    buffer: &'a mut [u8],
    pos: usize,
    requested: usize,
}

impl Write for ArenaWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.requested = self.pos.saturating_add(s.len());
        let end = self.requested;
        let target = self.buffer.get_mut(self.pos..end).ok_or(fmt::Error)?;
        target.copy_from_slice(s.as_bytes());
        self.pos = end;
        Ok(())
    }
}

/// Values that know their textual form inside the arena
pub trait ArenaText {
    fn write_text(&self, out: &mut ArenaWriter<'_>) -> fmt::Result;
}

impl<T: ArenaText + ?Sized> ArenaText for &T {
    fn write_text(&self, out: &mut ArenaWriter<'_>) -> fmt::Result {
        (**self).write_text(out)
    }
}

macro_rules! display_text {
    ($($ty:ty),*) => {
        $(
            impl ArenaText for $ty {
                fn write_text(&self, out: &mut ArenaWriter<'_>) -> fmt::Result {
                    write!(out, "{}", self)
                }
            }
        )*
    };
}

display_text!(u8, u16, u32, u64, i8, i16, i32, i64, bool, str);

impl ArenaText for f32 {
    fn write_text(&self, out: &mut ArenaWriter<'_>) -> fmt::Result {
        write_float(out, f64::from(*self), *self)
    }
}

impl ArenaText for f64 {
    fn write_text(&self, out: &mut ArenaWriter<'_>) -> fmt::Result {
        write_float(out, *self, *self)
    }
}

/// Byte sequences render as a hex dump: `04 72 65`
impl ArenaText for [u8] {
    fn write_text(&self, out: &mut ArenaWriter<'_>) -> fmt::Result {
        write_hex(out, self)
    }
}

/// Lowercase two-digit hex per byte, single-space separated
pub fn write_hex<W: Write>(out: &mut W, bytes: &[u8]) -> fmt::Result {
    for (index, byte) in bytes.iter().enumerate() {
        if index > 0 {
            out.write_char(' ')?;
        }
        write!(out, "{:02x}", byte)?;
    }
    Ok(())
}

/// Shortest round-trip decimal form; very large or very small magnitudes
/// switch to exponent notation so the text stays bounded
fn write_float<W: Write, F: fmt::Display + fmt::LowerExp>(
    out: &mut W,
    magnitude: f64,
    value: F,
) -> fmt::Result {
    let abs = magnitude.abs();
    if !magnitude.is_finite() || abs == 0.0 || (1e-5..1e16).contains(&abs) {
        write!(out, "{}", value)
    } else {
        write!(out, "{:e}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_arena_is_empty() {
        let arena = TextArena::with_capacity(64);
        assert_eq!(arena.capacity(), 64);
        assert_eq!(arena.len(), 0);
        assert!(arena.is_empty());
    }

    #[test]
    fn test_store_integers_and_bools() {
        let mut arena = TextArena::with_capacity(64);
        let a = arena.store(&12345u32).unwrap();
        let b = arena.store(&-7i8).unwrap();
        let c = arena.store(&true).unwrap();
        assert_eq!(arena.get(a), "12345");
        assert_eq!(arena.get(b), "-7");
        assert_eq!(arena.get(c), "true");
        assert_eq!(arena.len(), 5 + 2 + 4);
    }

    #[test]
    fn test_store_hex_dump() {
        let mut arena = TextArena::with_capacity(64);
        let span = arena.store(&[0x04u8, 0x72, 0x65, 0x6d, 0x6f][..]).unwrap();
        assert_eq!(arena.get(span), "04 72 65 6d 6f");

        let empty = arena.store(&[][..] as &[u8]).unwrap();
        assert!(empty.is_empty());
        assert_eq!(arena.get(empty), "");
    }

    #[test]
    fn test_store_floats() {
        let mut arena = TextArena::with_capacity(128);
        let a = arena.store(&1.1f32).unwrap();
        let b = arena.store(&1.2f64).unwrap();
        let c = arena.store(&1e-45f32).unwrap();
        let d = arena.store(&f64::MAX).unwrap();
        let e = arena.store(&0.0f64).unwrap();
        assert_eq!(arena.get(a), "1.1");
        assert_eq!(arena.get(b), "1.2");
        assert_eq!(arena.get(c), "1e-45");
        assert_eq!(arena.get(d), "1.7976931348623157e308");
        assert_eq!(arena.get(e), "0");
    }

    #[test]
    fn test_store_joined() {
        let mut arena = TextArena::with_capacity(64);
        let span = arena.store_joined(&[1u16, 22, 333]).unwrap();
        assert_eq!(arena.get(span), "1 22 333");

        let none: [u8; 0] = [];
        let span = arena.store_joined(&none).unwrap();
        assert_eq!(arena.get(span), "");
    }

    #[test]
    fn test_previous_views_are_stable() {
        let mut arena = TextArena::with_capacity(32);
        let base = arena.as_ptr();

        let a = arena.store("first").unwrap();
        let captured = arena.get(a).to_string();
        let a_ptr = arena.get(a).as_ptr();

        let b = arena.store(&987654321u32).unwrap();
        assert_eq!(arena.get(b), "987654321");

        assert_eq!(arena.as_ptr(), base);
        assert_eq!(arena.capacity(), 32);
        assert_eq!(arena.get(a), captured);
        assert_eq!(arena.get(a).as_ptr(), a_ptr);
    }

    #[test]
    fn test_exhaustion_never_grows() {
        let mut arena = TextArena::with_capacity(8);
        let base = arena.as_ptr();
        let ok = arena.store("1234").unwrap();

        let err = arena.store("too long").unwrap_err();
        assert_eq!(
            err,
            ArenaError::Exhausted {
                written: 0,
                requested: 8,
                remaining: 4,
                capacity: 8,
            }
        );

        // The failed store left nothing behind and the buffer did not move.
        assert_eq!(arena.len(), 4);
        assert_eq!(arena.as_ptr(), base);
        assert_eq!(arena.get(ok), "1234");
        let next = arena.store("5678").unwrap();
        assert_eq!(arena.get(next), "5678");
    }

    #[test]
    fn test_for_source_sizing() {
        let arena = TextArena::for_source(100, 1);
        assert_eq!(arena.capacity(), 100 * MIN_EXPANSION_FACTOR + ARENA_SLACK);

        let arena = TextArena::for_source(100, 4);
        assert_eq!(arena.capacity(), 400 + ARENA_SLACK);
    }

    #[test]
    fn test_clear_resets_length() {
        let mut arena = TextArena::with_capacity(16);
        arena.store("abc").unwrap();
        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.remaining(), 16);
    }
}
