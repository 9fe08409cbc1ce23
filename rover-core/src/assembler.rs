//! Byte-at-a-time frame assembler.
//!
//! ```text
//!             'S'                  'E' -> Frame
//! WaitingStart ──► Receiving ─────────────────► WaitingStart
//!      ▲             │  other byte, no room -> Overflow
//!      └─────────────┘
//! ```
//!
//! A start marker in the middle of a frame abandons what was collected and
//! begins again. A start marker directly after the opening one is kept as
//! payload, so `SSTE` carries the payload `ST`.

use heapless::Vec;
use rover_proto::{FRAME_END, FRAME_START};

use crate::config::RX_BUFFER_SIZE;

/// Longest payload accepted between the markers.
pub const MAX_PAYLOAD_LEN: usize = RX_BUFFER_SIZE - 1;

/// Assembler state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AssemblerState {
    /// Discarding bytes until a start marker.
    #[default]
    WaitingStart,
    /// Collecting payload bytes until an end marker.
    Receiving,
}

/// Something the assembler finished with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assembled<'a> {
    /// Complete payload, markers stripped.
    Frame(&'a [u8]),
    /// Payload outgrew the receive buffer and was dropped.
    Overflow,
}

/// Turns a byte stream into frame payloads.
#[derive(Debug, Clone, Default)]
pub struct FrameAssembler {
    state: AssemblerState,
    payload: Vec<u8, MAX_PAYLOAD_LEN>,
    /// Time of the last byte of the frame in progress, if it was timestamped
    last_byte_ms: Option<u64>,
}

impl FrameAssembler {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AssemblerState::WaitingStart,
            payload: Vec::new(),
            last_byte_ms: None,
        }
    }

    /// Feed one byte.
    ///
    /// Returns a completed frame or an overflow notice, otherwise `None`.
    pub fn push(&mut self, byte: u8) -> Option<Assembled<'_>> {
        self.last_byte_ms = None;
        self.step(byte)
    }

    /// Feed one byte received at `now_ms`.
    ///
    /// Same as [`FrameAssembler::push`], but records the time so
    /// [`FrameAssembler::expire`] can reclaim a stalled frame.
    pub fn push_at(&mut self, byte: u8, now_ms: u64) -> Option<Assembled<'_>> {
        self.last_byte_ms = Some(now_ms);
        self.step(byte)
    }

    fn step(&mut self, byte: u8) -> Option<Assembled<'_>> {
        match self.state {
            AssemblerState::WaitingStart => {
                if byte == FRAME_START {
                    self.payload.clear();
                    self.state = AssemblerState::Receiving;
                }
                None
            }
            AssemblerState::Receiving => match byte {
                FRAME_END => {
                    self.state = AssemblerState::WaitingStart;
                    self.last_byte_ms = None;
                    Some(Assembled::Frame(&self.payload))
                }
                FRAME_START if !self.payload.is_empty() => {
                    self.payload.clear();
                    None
                }
                _ => {
                    if self.payload.push(byte).is_err() {
                        self.reset();
                        return Some(Assembled::Overflow);
                    }
                    None
                }
            },
        }
    }

    /// Drop a partial frame whose last byte is more than `timeout_ms` older
    /// than `now_ms`.
    ///
    /// Returns `true` if a frame was dropped. Frames fed through
    /// [`FrameAssembler::push`] carry no timestamp and never expire.
    pub fn expire(&mut self, now_ms: u64, timeout_ms: u64) -> bool {
        match (self.state, self.last_byte_ms) {
            (AssemblerState::Receiving, Some(last)) if now_ms.saturating_sub(last) > timeout_ms => {
                self.reset();
                true
            }
            _ => false,
        }
    }

    /// Return to [`AssemblerState::WaitingStart`], dropping any partial frame.
    pub fn reset(&mut self) {
        self.state = AssemblerState::WaitingStart;
        self.payload.clear();
        self.last_byte_ms = None;
    }

    #[inline]
    #[must_use]
    pub const fn state(&self) -> AssemblerState {
        self.state
    }

    /// Bytes collected for the frame in progress.
    #[inline]
    #[must_use]
    pub fn pending_len(&self) -> usize {
        match self.state {
            AssemblerState::WaitingStart => 0,
            AssemblerState::Receiving => self.payload.len(),
        }
    }
}
