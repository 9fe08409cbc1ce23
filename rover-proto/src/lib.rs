//! Wire protocol for the rover serial command link.
//!
//! This crate provides the framing-independent half of the protocol:
//!
//! - **Types**: Core data structures
//!   - [`CommandCode`] - Two-letter protocol code
//!   - [`RoverAction`] - Motion derived from a command
//!   - [`DecodedCommand`] - Code, action, parameters, and sequence id
//!   - [`TelemetrySample`] - Rover telemetry snapshot
//!   - [`ResponseKind`] - Acknowledgement and error tokens
//!
//! - **Parsing**: Decode incoming payloads
//!   - [`decode_payload()`] - Payload to command
//!   - [`parse_response()`] - Response frame to [`ResponseKind`]
//!   - [`params::parse_params()`] - Comma-separated number tokenizer
//!
//! - **Serialization**: Encode outgoing frames
//!   - [`Serialize`] trait - Extension trait for serialization
//!   - [`CommandBuilder`] - Fluent builder API
//!
//! # Protocol Format
//!
//! Every frame is ASCII text between a start marker `S` and an end marker `E`.
//! There is no checksum and no length prefix.
//!
//! ## Commands
//!
//! ```text
//! S<code>[:<param>[,<param>]*]E
//! ```
//!
//! | Code | Params | Action |
//! |------|--------|--------|
//! | `MV` | left, right | classified from the wheel pair |
//! | `ST` | - | stop |
//! | `GT` | - | request telemetry |
//! | `SF`/`SB`/`SL`/`SR` | optional speed (default 255) | forward/backwards/left/right |
//!
//! Codes are case-insensitive on input. Parameters are written with one
//! fractional digit.
//!
//! ## Responses
//!
//! ```text
//! SOKE  SNACKE  SERR:INVALID_COMMANDE  SERR:INVALID_PARAMSE  SERR:BUFFER_FULLE
//! ```
//!
//! ## Telemetry
//!
//! ```text
//! STEL:<battery>,<left>,<right>,<temp>,<timestamp>E
//! ```
//!
//! # Examples
//!
//! ```
//! use rover_proto::{decode_payload, RoverAction, Serialize, TelemetrySample};
//!
//! let cmd = decode_payload(b"SF").unwrap();
//! assert_eq!(cmd.action, RoverAction::MoveForward);
//! assert_eq!(cmd.params(), &[255.0]);
//!
//! let sample = TelemetrySample {
//!     battery_voltage: 12.5,
//!     temperature: 25.5,
//!     timestamp: 7,
//!     ..TelemetrySample::default()
//! };
//! let mut buf = [0u8; 64];
//! let len = sample.serialize(&mut buf).unwrap();
//! assert_eq!(&buf[..len], b"STEL:12.50,0.0,0.0,25.5,7E");
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//! - **`heapless`**: Enable `serialize_to_vec()` methods
//! - **`embedded-io`**: Enable `serialize_io()` methods for I/O peripherals
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod builder;
mod format;
pub mod params;
pub mod parser;
pub mod serialize;
pub mod types;

/// Frame start marker.
pub const FRAME_START: u8 = b'S';

/// Frame end marker.
pub const FRAME_END: u8 = b'E';

/// Separator between a command code and its parameters.
pub const CODE_SEPARATOR: u8 = b':';

/// Largest frame the link sends in one write.
pub const MAX_FRAME_SIZE: usize = 64;

/// Maximum number of parameters a command can carry.
pub const MAX_PARAMS: usize = 10;

/// Speed used by `SF`/`SB`/`SL`/`SR` when no parameter is given.
pub const DEFAULT_SPEED: f64 = 255.0;

/// Smallest buffer accepted when serializing a command.
pub const MIN_COMMAND_FRAME: usize = 8;

/// Smallest buffer accepted when serializing telemetry.
pub const MIN_TELEMETRY_FRAME: usize = 32;

// Re-export types at crate root for convenience
pub use builder::CommandBuilder;
pub use parser::{decode_payload, parse_response, DecodeError};
pub use serialize::{Serialize, SerializeError, MAX_RESPONSE_SIZE};
pub use types::{CommandCode, DecodedCommand, ResponseKind, RoverAction, TelemetrySample};
