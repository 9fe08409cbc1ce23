//! Error types for buffer and session operations.

use crate::io::SinkError;
use rover_proto::SerializeError;

/// Error type for command buffer access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// No command is queued.
    Empty,
}

impl core::fmt::Display for BufferError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Empty => write!(f, "command buffer empty"),
        }
    }
}

/// Error type for outgoing frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// The frame could not be encoded.
    Encode(SerializeError),
    /// The sink rejected the frame.
    Sink(SinkError),
}

impl From<SerializeError> for LinkError {
    fn from(err: SerializeError) -> Self {
        Self::Encode(err)
    }
}

impl From<SinkError> for LinkError {
    fn from(err: SinkError) -> Self {
        Self::Sink(err)
    }
}

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Encode(e) => write!(f, "encode failed: {e}"),
            Self::Sink(e) => write!(f, "send failed: {e}"),
        }
    }
}
