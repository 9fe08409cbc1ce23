//! Link constants and runtime configuration.

/// Receive buffer size including the terminator slot.
///
/// The longest payload the assembler accepts is one byte less.
pub const RX_BUFFER_SIZE: usize = 128;

/// Number of decoded commands held before the oldest is overwritten.
pub const COMMAND_BUFFER_LEN: usize = 10;

/// Reference inactivity timeout for a partial frame, in milliseconds.
pub const FRAME_TIMEOUT_MS: u64 = 100;

/// Interval between unprompted telemetry samples, in milliseconds.
pub const TELEMETRY_PERIOD_MS: u64 = 1000;

/// Serial line rate the link is specified for (8N1).
pub const LINK_BAUDRATE: u32 = 115_200;

/// Runtime options for a [`LinkSession`](crate::LinkSession).
///
/// # Example
///
/// ```
/// use rover_core::{LinkConfig, FRAME_TIMEOUT_MS};
///
/// let config = LinkConfig::default().with_frame_timeout(FRAME_TIMEOUT_MS);
/// assert_eq!(config.frame_timeout_ms, Some(100));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Drop a partial frame after this many milliseconds without a byte.
    ///
    /// `None` (the default) waits for the end marker indefinitely. Only the
    /// time-aware entry points (`push_byte_at`, `process_at`, `poll_timeout`)
    /// look at it.
    pub frame_timeout_ms: Option<u64>,
}

impl LinkConfig {
    /// Configuration with every option off.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            frame_timeout_ms: None,
        }
    }

    /// Enable the partial-frame timeout.
    #[must_use]
    pub const fn with_frame_timeout(mut self, timeout_ms: u64) -> Self {
        self.frame_timeout_ms = Some(timeout_ms);
        self
    }
}
