//! Builder API for constructing command frames.
//!
//! Host-side code usually knows which motion it wants, not which code and
//! parameter list encode it. The builder fills those in.
//!
//! # Example
//!
//! ```
//! use rover_proto::CommandBuilder;
//!
//! let mut buf = [0u8; 64];
//! let len = CommandBuilder::drive(120.0, -120.0).serialize(&mut buf).unwrap();
//! assert_eq!(&buf[..len], b"SMV:120.0,-120.0E");
//!
//! let len = CommandBuilder::forward().speed(80.0).serialize(&mut buf).unwrap();
//! assert_eq!(&buf[..len], b"SSF:80.0E");
//! ```

use crate::serialize::{Serialize, SerializeError};
use crate::types::{CommandCode, DecodedCommand};
use crate::DEFAULT_SPEED;

/// Fluent builder for a single command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandBuilder {
    code: CommandCode,
    wheels: [f64; 2],
    speed: Option<f64>,
}

impl CommandBuilder {
    const fn with_code(code: CommandCode) -> Self {
        Self {
            code,
            wheels: [0.0; 2],
            speed: None,
        }
    }

    /// `MV` with explicit left and right wheel speeds.
    #[must_use]
    pub const fn drive(left: f64, right: f64) -> Self {
        Self {
            code: CommandCode::Mv,
            wheels: [left, right],
            speed: None,
        }
    }

    /// `ST`
    #[must_use]
    pub const fn stop() -> Self {
        Self::with_code(CommandCode::St)
    }

    /// `GT`
    #[must_use]
    pub const fn telemetry() -> Self {
        Self::with_code(CommandCode::Gt)
    }

    /// `SF`, at [`DEFAULT_SPEED`] unless [`CommandBuilder::speed`] is set.
    #[must_use]
    pub const fn forward() -> Self {
        Self::with_code(CommandCode::Sf)
    }

    /// `SB`
    #[must_use]
    pub const fn backwards() -> Self {
        Self::with_code(CommandCode::Sb)
    }

    /// `SL`
    #[must_use]
    pub const fn left() -> Self {
        Self::with_code(CommandCode::Sl)
    }

    /// `SR`
    #[must_use]
    pub const fn right() -> Self {
        Self::with_code(CommandCode::Sr)
    }

    /// Set the speed of a directional command.
    ///
    /// Ignored for `MV`, `ST`, and `GT`.
    #[must_use]
    pub const fn speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Get the built command without serializing.
    ///
    /// The result matches what decoding the serialized frame would produce,
    /// including the default speed for a directional command with none set.
    #[must_use]
    pub fn build(self) -> DecodedCommand {
        let speed = [self.speed.unwrap_or(DEFAULT_SPEED)];
        let params: &[f64] = match self.code {
            CommandCode::Mv => &self.wheels,
            CommandCode::St | CommandCode::Gt => &[],
            CommandCode::Sf | CommandCode::Sb | CommandCode::Sl | CommandCode::Sr => &speed,
        };
        // At most two parameters, always within MAX_PARAMS
        DecodedCommand::new(self.code, params).unwrap_or(DecodedCommand::EMPTY)
    }

    /// Serialize the command to the provided buffer.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::BufferTooSmall`] if the buffer is too small.
    pub fn serialize(self, buf: &mut [u8]) -> Result<usize, SerializeError> {
        self.build().serialize(buf)
    }

    /// Serialize to a `heapless::Vec`.
    #[cfg(feature = "heapless")]
    pub fn serialize_to_vec<const N: usize>(self) -> Result<heapless::Vec<u8, N>, SerializeError> {
        self.build().serialize_to_vec()
    }

    /// Serialize to a `core::fmt::Write` implementation.
    pub fn serialize_fmt<W: core::fmt::Write>(self, writer: &mut W) -> Result<(), SerializeError> {
        self.build().serialize_fmt(writer)
    }

    /// Serialize to an `embedded_io::Write` implementation.
    #[cfg(feature = "embedded-io")]
    pub fn serialize_io<W: embedded_io::Write>(self, writer: &mut W) -> Result<(), SerializeError> {
        self.build().serialize_io(writer)
    }
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::stop()
    }
}
