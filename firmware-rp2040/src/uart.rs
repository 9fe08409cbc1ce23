//! UART transport for the link session.
//!
//! # Pins
//!
//! Uses UART1:
//! - GPIO 8: TX
//! - GPIO 9: RX

use embassy_rp::uart::{Async, Error as UartError, UartRx, UartTx};
use rover_core::{FrameSink, SinkError};

/// Convert UART errors to [`SinkError`].
///
/// This is a helper function instead of a `From` impl to avoid orphan rule issues
/// (both `UartError` and `SinkError` are defined in external crates).
#[inline]
fn uart_error_to_sink_error(e: UartError) -> SinkError {
    match e {
        UartError::Overrun => SinkError::Busy,
        _ => SinkError::Io,
    }
}

/// Sends each frame with a blocking write on the UART transmitter.
///
/// Frames are at most 64 bytes, about 5.6 ms at 115200 baud.
pub struct UartFrameSink<'d> {
    tx: UartTx<'d, Async>,
}

impl<'d> UartFrameSink<'d> {
    #[must_use]
    pub fn new(tx: UartTx<'d, Async>) -> Self {
        Self { tx }
    }
}

impl FrameSink for UartFrameSink<'_> {
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), SinkError> {
        self.tx
            .blocking_write(frame)
            .map_err(uart_error_to_sink_error)
    }
}

/// Wait for the next byte from the UART receiver.
///
/// Not cancel-safe: dropping the future after the DMA transfer started can
/// lose the byte.
pub async fn read_byte(rx: &mut UartRx<'_, Async>) -> Result<u8, UartError> {
    let mut byte = [0u8; 1];
    rx.read(&mut byte).await?;
    Ok(byte[0])
}
