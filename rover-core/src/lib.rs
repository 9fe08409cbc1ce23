//! Platform-agnostic rover serial link.
//!
//! This crate turns a raw byte stream into queued rover commands and answers
//! every frame, without any platform-specific dependencies. It can be used
//! both in embedded `no_std` environments and on host for testing.
//!
//! # Overview
//!
//! The crate is organized into several modules:
//!
//! - [`assembler`]: Byte-at-a-time framing ([`FrameAssembler`])
//! - [`buffer`]: Overwrite-oldest command ring ([`CommandBuffer`])
//! - [`session`]: Ties framing, decoding, queueing, and responses together ([`LinkSession`])
//! - [`io`]: Transport traits ([`ByteSource`], [`FrameSink`])
//! - [`mailbox`]: Cross-task command hand-off ([`CommandMailbox`])
//! - [`drive`]: Differential drive model ([`DriveState`])
//! - [`config`]: Link constants and [`LinkConfig`]
//!
//! # Example
//!
//! ```rust
//! use rover_core::{DriveState, FrameSink, LinkSession, RoverAction, SinkError, SliceSource};
//!
//! struct Uart;
//!
//! impl FrameSink for Uart {
//!     fn send_frame(&mut self, _frame: &[u8]) -> Result<(), SinkError> {
//!         Ok(())
//!     }
//! }
//!
//! let mut session = LinkSession::new(Uart);
//! session.process(&mut SliceSource::new(b"SSL:100ESGTE"));
//!
//! let mut drive = DriveState::new();
//! while let Some(cmd) = session.next_command() {
//!     if drive.apply(&cmd) == RoverAction::GetTelemetry {
//!         let sample = drive.telemetry(12.5, 25.5, u32::from(cmd.id));
//!         session.send_telemetry(&sample).unwrap();
//!     }
//! }
//! assert_eq!(drive.left_speed, -50.0);
//! assert_eq!(session.stats().frames_sent, 3);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded targets)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations,
//! making it suitable for embedded systems with limited resources.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

pub mod assembler;
pub mod buffer;
pub mod config;
pub mod drive;
pub mod error;
pub mod io;
pub mod mailbox;
pub mod session;

// Re-export main types at crate root
pub use assembler::{Assembled, AssemblerState, FrameAssembler, MAX_PAYLOAD_LEN};
pub use buffer::{CommandBuffer, Enqueued};
pub use config::{
    LinkConfig, COMMAND_BUFFER_LEN, FRAME_TIMEOUT_MS, LINK_BAUDRATE, RX_BUFFER_SIZE,
    TELEMETRY_PERIOD_MS,
};
pub use drive::{simulated_battery, DriveState, NOMINAL_BATTERY_V, NOMINAL_TEMPERATURE_C};
pub use error::{BufferError, LinkError};
pub use io::{ByteSource, FrameSink, SinkError, SliceSource};
pub use mailbox::CommandMailbox;
pub use session::{FrameOutcome, LinkSession, LinkStats};

pub use rover_proto::{
    decode_payload, parse_response, CommandBuilder, CommandCode, DecodeError, DecodedCommand,
    ResponseKind, RoverAction, Serialize, SerializeError, TelemetrySample,
};
