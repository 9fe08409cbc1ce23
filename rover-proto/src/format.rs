//! No-std text sinks used by frame serialization.
//!
//! Frames are written with `core::fmt` so floating-point values get the same
//! fixed-decimal formatting on every target, without heap allocation.

use core::fmt;

/// Counts the bytes a formatting pass would produce, writing nothing.
#[derive(Debug, Default)]
pub(crate) struct LenCounter {
    len: usize,
}

impl LenCounter {
    #[inline]
    pub(crate) const fn new() -> Self {
        Self { len: 0 }
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }
}

impl fmt::Write for LenCounter {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.len = self.len.checked_add(s.len()).ok_or(fmt::Error)?;
        Ok(())
    }
}

/// Bounded writer over a byte slice.
///
/// Writing past the end of the slice fails with [`fmt::Error`] instead of
/// truncating, so a frame is either written whole or reported as not fitting.
pub(crate) struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceWriter<'a> {
    #[inline]
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of bytes written so far.
    #[inline]
    pub(crate) const fn pos(&self) -> usize {
        self.pos
    }
}

impl fmt::Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.pos.checked_add(s.len()).ok_or(fmt::Error)?;
        if end > self.buf.len() {
            return Err(fmt::Error);
        }
        self.buf[self.pos..end].copy_from_slice(s.as_bytes());
        self.pos = end;
        Ok(())
    }
}
