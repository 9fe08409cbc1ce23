//! Byte source and frame sink traits.
//!
//! The session is transport-agnostic: a UART driver, a test fixture, or a
//! loopback between two sessions all plug in through these two traits.

/// Error type for frame output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// UART/communication I/O error.
    Io,
    /// Transmitter cannot take the frame right now.
    Busy,
}

impl core::fmt::Display for SinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io => write!(f, "I/O error"),
            Self::Busy => write!(f, "transmitter busy"),
        }
    }
}

/// Non-blocking source of received bytes.
pub trait ByteSource {
    /// Next received byte, or `None` if nothing is pending right now.
    fn read_byte(&mut self) -> Option<u8>;
}

/// Destination for complete outgoing frames.
///
/// Each call carries exactly one frame, markers included.
pub trait FrameSink {
    /// Transmit one frame.
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), SinkError>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    #[inline]
    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }
}

impl<W: FrameSink + ?Sized> FrameSink for &mut W {
    #[inline]
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), SinkError> {
        (**self).send_frame(frame)
    }
}

/// Frames are appended back to back.
#[cfg(feature = "std")]
impl FrameSink for std::vec::Vec<u8> {
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), SinkError> {
        self.extend_from_slice(frame);
        Ok(())
    }
}

/// [`ByteSource`] over an in-memory byte slice.
///
/// ```
/// use rover_core::{ByteSource, SliceSource};
///
/// let mut source = SliceSource::new(b"SE");
/// assert_eq!(source.read_byte(), Some(b'S'));
/// assert_eq!(source.remaining(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not yet read.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl ByteSource for SliceSource<'_> {
    fn read_byte(&mut self) -> Option<u8> {
        let byte = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(usize);

    impl FrameSink for Counter {
        fn send_frame(&mut self, _frame: &[u8]) -> Result<(), SinkError> {
            self.0 += 1;
            Ok(())
        }
    }

    #[test]
    fn test_slice_source_drains_in_order() {
        let mut source = SliceSource::new(b"abc");
        assert_eq!(source.read_byte(), Some(b'a'));
        assert_eq!(source.read_byte(), Some(b'b'));
        assert_eq!(source.read_byte(), Some(b'c'));
        assert_eq!(source.read_byte(), None);
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn test_sink_through_mut_ref() {
        fn send_twice<W: FrameSink>(mut sink: W) {
            sink.send_frame(b"SOKE").unwrap();
            sink.send_frame(b"SOKE").unwrap();
        }

        let mut counter = Counter(0);
        send_twice(&mut counter);
        assert_eq!(counter.0, 2);
    }
}
