//! Rover serial command link for RP2040.
//!
//! This crate provides the embedded side of the rover link: it receives
//! framed commands over UART, acknowledges each one, and drives a simulated
//! differential-drive rover that reports telemetry on request.
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) and:
//! 1. Receives command frames over UART (115200 baud, 8N1)
//! 2. Decodes and queues them, answering `OK` or `ERR:*` per frame
//! 3. Applies queued commands to the wheel speeds
//! 4. Sends a telemetry frame for every `GT` command and every
//!    [`TELEMETRY_PERIOD_MS`]
//!
//! # Hardware Configuration
//!
//! | Function | GPIO | Description |
//! |----------|------|-------------|
//! | UART1 TX | 8    | Responses and telemetry |
//! | UART1 RX | 9    | Command input |
//! | LED      | 25   | On-board LED (toggles per applied command) |
//!
//! # Architecture
//!
//! The firmware uses the Embassy async runtime with three concurrent tasks:
//!
//! - **UART RX Task**: Owns the UART receiver and forwards every byte to a
//!   channel. Its read is never cancelled, so no byte is dropped mid-transfer
//! - **Link Task**: Owns the [`LinkSession`]; takes bytes from the channel, answers
//!   frames, posts commands to the mailbox, and sends telemetry
//! - **Rover Task**: Takes commands from the mailbox and updates the
//!   [`DriveState`], and produces telemetry on `GT` and on a timer
//!
//! Commands cross from link to rover through a [`CommandMailbox`]; telemetry
//! goes back through an Embassy [`Signal`](embassy_sync::signal::Signal).
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//! - **`frame-timeout`**: Drop partial frames after [`FRAME_TIMEOUT_MS`] of silence
//!
//! # Re-exports
//!
//! This crate re-exports the public items of [`rover_core`] used by the
//! firmware, so the binary only needs to depend on this crate.

#![no_std]

#[cfg(all(feature = "dev-panic", feature = "prod-panic"))]
compile_error!("Cannot enable both `dev-panic` and `prod-panic` features - they install conflicting panic handlers");

// Re-export core types for convenience
pub use rover_core::{
    simulated_battery, CommandMailbox, DecodedCommand, DriveState, FrameOutcome, LinkConfig,
    LinkSession, LinkStats, RoverAction, TelemetrySample, COMMAND_BUFFER_LEN, FRAME_TIMEOUT_MS,
    LINK_BAUDRATE, NOMINAL_BATTERY_V, NOMINAL_TEMPERATURE_C, RX_BUFFER_SIZE, TELEMETRY_PERIOD_MS,
};

pub mod uart;

pub use uart::{read_byte, UartFrameSink};

/// Link configuration selected by cargo features.
#[must_use]
pub const fn link_config() -> LinkConfig {
    if cfg!(feature = "frame-timeout") {
        LinkConfig::new().with_frame_timeout(FRAME_TIMEOUT_MS)
    } else {
        LinkConfig::new()
    }
}
