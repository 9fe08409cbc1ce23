//! Frame serialization for commands, telemetry, and responses.
//!
//! # Frame Formats
//!
//! ```text
//! S<code>[:<p1>,<p2>,...]E                          command, params with 1 decimal
//! STEL:<battery>,<left>,<right>,<temp>,<timestamp>E  telemetry
//! S<token>E                                          response
//! ```
//!
//! # Example
//!
//! ```
//! use rover_proto::{decode_payload, Serialize};
//!
//! let cmd = decode_payload(b"MV:255,-255").unwrap();
//! let mut buf = [0u8; 64];
//! let len = cmd.serialize(&mut buf).unwrap();
//! assert_eq!(&buf[..len], b"SMV:255.0,-255.0E");
//! ```

use core::fmt::{self, Write};

use crate::format::{LenCounter, SliceWriter};
use crate::types::{DecodedCommand, ResponseKind, TelemetrySample};
use crate::{FRAME_END, FRAME_START, MIN_COMMAND_FRAME, MIN_TELEMETRY_FRAME};
#[cfg(feature = "embedded-io")]
use crate::MAX_FRAME_SIZE;

/// Maximum size of a serialized response frame.
///
/// Breakdown: S(1) + longest token `ERR:INVALID_COMMAND`(19) + E(1) = 21
pub const MAX_RESPONSE_SIZE: usize = 21;

/// Error type for serialization operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerializeError {
    /// The output buffer is too small to hold the serialized frame.
    BufferTooSmall,
    /// A write operation failed (for I/O adapters).
    WriteError,
}

impl core::fmt::Display for SerializeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::WriteError => write!(f, "write error"),
        }
    }
}

/// Text rendering shared by every frame type.
trait WriteFrame {
    /// Smallest destination buffer accepted by [`Serialize::serialize`].
    const MIN_BUFFER: usize;

    fn write_frame<W: Write>(&self, w: &mut W) -> fmt::Result;
}

#[inline]
fn marker<W: Write>(w: &mut W, byte: u8) -> fmt::Result {
    w.write_char(char::from(byte))
}

impl WriteFrame for DecodedCommand {
    const MIN_BUFFER: usize = MIN_COMMAND_FRAME;

    fn write_frame<W: Write>(&self, w: &mut W) -> fmt::Result {
        marker(w, FRAME_START)?;
        w.write_str(self.code.as_str())?;

        if let Some((first, rest)) = self.params().split_first() {
            write!(w, ":{first:.1}")?;
            for param in rest {
                write!(w, ",{param:.1}")?;
            }
        }

        marker(w, FRAME_END)
    }
}

impl WriteFrame for TelemetrySample {
    const MIN_BUFFER: usize = MIN_TELEMETRY_FRAME;

    fn write_frame<W: Write>(&self, w: &mut W) -> fmt::Result {
        marker(w, FRAME_START)?;
        write!(
            w,
            "TEL:{:.2},{:.1},{:.1},{:.1},{}",
            self.battery_voltage,
            self.left_wheel_speed,
            self.right_wheel_speed,
            self.temperature,
            self.timestamp
        )?;
        marker(w, FRAME_END)
    }
}

impl WriteFrame for ResponseKind {
    const MIN_BUFFER: usize = 0;

    fn write_frame<W: Write>(&self, w: &mut W) -> fmt::Result {
        marker(w, FRAME_START)?;
        w.write_str(self.token())?;
        marker(w, FRAME_END)
    }
}

/// Measure first, then write, so a failed call leaves `buf` untouched.
fn serialize_frame<T: WriteFrame>(value: &T, buf: &mut [u8]) -> Result<usize, SerializeError> {
    if buf.len() < T::MIN_BUFFER {
        return Err(SerializeError::BufferTooSmall);
    }

    let len = frame_len(value);
    if len > buf.len() {
        return Err(SerializeError::BufferTooSmall);
    }

    let mut writer = SliceWriter::new(buf);
    value
        .write_frame(&mut writer)
        .map_err(|_| SerializeError::BufferTooSmall)?;
    Ok(writer.pos())
}

#[inline]
fn frame_len<T: WriteFrame>(value: &T) -> usize {
    let mut counter = LenCounter::new();
    // Counting only fails on usize overflow, which a frame cannot reach
    match value.write_frame(&mut counter) {
        Ok(()) => counter.len(),
        Err(_) => usize::MAX,
    }
}

/// Extension trait for serializing wire frames.
///
/// Implemented for [`DecodedCommand`], [`TelemetrySample`], and
/// [`ResponseKind`].
///
/// # Example
///
/// ```
/// use rover_proto::{ResponseKind, Serialize};
///
/// let mut buf = [0u8; 32];
/// let len = ResponseKind::InvalidParams.serialize(&mut buf).unwrap();
/// assert_eq!(&buf[..len], b"SERR:INVALID_PARAMSE");
/// ```
pub trait Serialize {
    /// Serialize to the provided buffer.
    ///
    /// Returns the number of bytes written on success. Nothing is written on
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::BufferTooSmall`] if the buffer is below the
    /// frame type's minimum size or cannot hold the formatted frame.
    fn serialize(&self, buf: &mut [u8]) -> Result<usize, SerializeError>;

    /// Exact number of bytes [`Serialize::serialize`] would write.
    fn encoded_len(&self) -> usize;

    /// Serialize to a `heapless::Vec`.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::BufferTooSmall`] if `N` is not large enough.
    #[cfg(feature = "heapless")]
    fn serialize_to_vec<const N: usize>(&self) -> Result<heapless::Vec<u8, N>, SerializeError> {
        let mut vec = heapless::Vec::new();
        // Resize to full capacity to allow serialize() to write
        vec.resize(N, 0)
            .map_err(|_| SerializeError::BufferTooSmall)?;
        let len = self.serialize(&mut vec)?;
        vec.truncate(len);
        Ok(vec)
    }

    /// Serialize to a `core::fmt::Write` implementation.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::WriteError`] if the write fails.
    fn serialize_fmt<W: core::fmt::Write>(&self, writer: &mut W) -> Result<(), SerializeError>;

    /// Serialize to an `embedded_io::Write` implementation such as a UART.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::BufferTooSmall`] if the frame exceeds
    /// [`MAX_FRAME_SIZE`], or [`SerializeError::WriteError`] if the write fails.
    #[cfg(feature = "embedded-io")]
    fn serialize_io<W: embedded_io::Write>(&self, writer: &mut W) -> Result<(), SerializeError> {
        let mut buf = [0u8; MAX_FRAME_SIZE];
        let len = self.serialize(&mut buf)?;
        writer
            .write_all(&buf[..len])
            .map_err(|_| SerializeError::WriteError)
    }
}

macro_rules! impl_serialize {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Serialize for $ty {
                fn serialize(&self, buf: &mut [u8]) -> Result<usize, SerializeError> {
                    serialize_frame(self, buf)
                }

                fn encoded_len(&self) -> usize {
                    frame_len(self)
                }

                fn serialize_fmt<W: core::fmt::Write>(
                    &self,
                    writer: &mut W,
                ) -> Result<(), SerializeError> {
                    self.write_frame(writer)
                        .map_err(|_| SerializeError::WriteError)
                }
            }
        )+
    };
}

impl_serialize!(DecodedCommand, TelemetrySample, ResponseKind);
