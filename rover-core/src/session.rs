//! LinkSession: one end of the serial command link.
//!
//! The session owns the frame assembler, the command ring, the statistics and
//! the outgoing sink. Every completed frame gets exactly one response:
//!
//! | Outcome | Response |
//! |---------|----------|
//! | decoded, queued | `OK` |
//! | decoded, queued by evicting the oldest command | `ERR:BUFFER_FULL` |
//! | unknown code | `ERR:INVALID_COMMAND` |
//! | bad parameters | `ERR:INVALID_PARAMS` |
//!
//! Overflowed and timed-out partial frames are dropped silently.

use rover_proto::{
    decode_payload, DecodeError, DecodedCommand, ResponseKind, Serialize, TelemetrySample,
    MAX_FRAME_SIZE,
};

use crate::assembler::{Assembled, AssemblerState, FrameAssembler};
use crate::buffer::{CommandBuffer, Enqueued};
use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::io::{ByteSource, FrameSink};

/// Link counters. All of them wrap on overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Frames that reached their end marker, valid or not.
    pub frames_received: u32,
    /// Frames handed to the sink successfully.
    pub frames_sent: u32,
    /// Completed frames that failed to decode.
    pub parse_errors: u32,
    /// Partial frames dropped for outgrowing the receive buffer.
    pub buffer_overflows: u32,
    /// Partial frames dropped by the inactivity timeout.
    pub frame_timeouts: u32,
}

/// What happened to a byte that ended a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameOutcome {
    /// Command decoded and queued under `id`.
    Queued { id: u16 },
    /// Command queued under `id` after evicting the oldest one.
    QueuedWithEviction { id: u16, evicted: DecodedCommand },
    /// Frame completed but did not decode.
    Rejected(DecodeError),
    /// Partial frame dropped for outgrowing the receive buffer.
    Overflow,
}

impl FrameOutcome {
    /// Whether a command was added to the queue.
    #[inline]
    #[must_use]
    pub const fn is_queued(&self) -> bool {
        matches!(self, Self::Queued { .. } | Self::QueuedWithEviction { .. })
    }

    /// Response owed to the peer, if any.
    #[must_use]
    pub fn response(&self) -> Option<ResponseKind> {
        match self {
            Self::Queued { .. } => Some(ResponseKind::Ok),
            Self::QueuedWithEviction { .. } => Some(ResponseKind::BufferFull),
            Self::Rejected(err) => Some(ResponseKind::from(*err)),
            Self::Overflow => None,
        }
    }
}

/// Assembler result with the payload already decoded, so the assembler
/// borrow ends before the session updates its own state.
enum Completed {
    Frame(Result<DecodedCommand, DecodeError>),
    Overflow,
}

impl From<Assembled<'_>> for Completed {
    fn from(assembled: Assembled<'_>) -> Self {
        match assembled {
            Assembled::Frame(payload) => Self::Frame(decode_payload(payload)),
            Assembled::Overflow => Self::Overflow,
        }
    }
}

/// One end of the link, sending through `W`.
///
/// The same type serves both sides: the rover feeds received bytes in and
/// answers with responses and telemetry, the host sends commands and feeds
/// the replies back in.
///
/// # Example
///
/// ```
/// use rover_core::{FrameSink, LinkSession, RoverAction, SinkError, SliceSource};
///
/// struct Replies(Vec<u8>);
///
/// impl FrameSink for Replies {
///     fn send_frame(&mut self, frame: &[u8]) -> Result<(), SinkError> {
///         self.0.extend_from_slice(frame);
///         Ok(())
///     }
/// }
///
/// let mut session = LinkSession::new(Replies(Vec::new()));
///
/// let queued = session.process(&mut SliceSource::new(b"SMV:200,200E"));
/// assert_eq!(queued, 1);
///
/// let cmd = session.next_command().unwrap();
/// assert_eq!(cmd.action, RoverAction::MoveForward);
/// assert_eq!(session.sink().0, b"SOKE");
/// ```
pub struct LinkSession<W> {
    sink: W,
    config: LinkConfig,
    assembler: FrameAssembler,
    commands: CommandBuffer,
    stats: LinkStats,
}

impl<W: FrameSink> LinkSession<W> {
    /// Create a session with the default configuration.
    pub fn new(sink: W) -> Self {
        Self::with_config(sink, LinkConfig::default())
    }

    pub fn with_config(sink: W, config: LinkConfig) -> Self {
        Self {
            sink,
            config,
            assembler: FrameAssembler::new(),
            commands: CommandBuffer::new(),
            stats: LinkStats::default(),
        }
    }

    /// Feed one received byte.
    ///
    /// Returns an outcome when the byte completed or overflowed a frame. A
    /// completed frame is answered through the sink before this returns.
    pub fn push_byte(&mut self, byte: u8) -> Option<FrameOutcome> {
        let completed = Completed::from(self.assembler.push(byte)?);
        Some(self.complete(completed))
    }

    /// Feed one byte received at `now_ms`.
    ///
    /// With a frame timeout configured, a partial frame that went quiet for
    /// too long is dropped before the byte is handled.
    pub fn push_byte_at(&mut self, byte: u8, now_ms: u64) -> Option<FrameOutcome> {
        self.poll_timeout(now_ms);

        let completed = Completed::from(self.assembler.push_at(byte, now_ms)?);
        Some(self.complete(completed))
    }

    /// Drop a stalled partial frame if the frame timeout has elapsed.
    ///
    /// Returns `true` if a frame was dropped. Always `false` without a
    /// configured timeout.
    pub fn poll_timeout(&mut self, now_ms: u64) -> bool {
        let Some(timeout) = self.config.frame_timeout_ms else {
            return false;
        };

        if self.assembler.expire(now_ms, timeout) {
            self.stats.frame_timeouts = self.stats.frame_timeouts.wrapping_add(1);
            warn!("partial frame timed out after {} ms", timeout);
            true
        } else {
            false
        }
    }

    /// Drain every byte `source` has ready.
    ///
    /// Returns how many commands were queued.
    pub fn process<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> usize {
        let mut queued = 0;
        while let Some(byte) = source.read_byte() {
            if self.push_byte(byte).is_some_and(|o| o.is_queued()) {
                queued += 1;
            }
        }
        queued
    }

    /// [`LinkSession::process`] with every byte stamped `now_ms`.
    pub fn process_at<S: ByteSource + ?Sized>(&mut self, source: &mut S, now_ms: u64) -> usize {
        let mut queued = 0;
        while let Some(byte) = source.read_byte() {
            if self.push_byte_at(byte, now_ms).is_some_and(|o| o.is_queued()) {
                queued += 1;
            }
        }
        queued
    }

    fn complete(&mut self, completed: Completed) -> FrameOutcome {
        let outcome = match completed {
            Completed::Overflow => {
                self.stats.buffer_overflows = self.stats.buffer_overflows.wrapping_add(1);
                warn!("receive buffer overflow, partial frame dropped");
                return FrameOutcome::Overflow;
            }
            Completed::Frame(decoded) => {
                self.stats.frames_received = self.stats.frames_received.wrapping_add(1);
                match decoded {
                    Ok(cmd) => match self.commands.enqueue(cmd) {
                        Enqueued { id, evicted: None } => {
                            trace!("queued {} as #{}", cmd.code, id);
                            FrameOutcome::Queued { id }
                        }
                        Enqueued {
                            id,
                            evicted: Some(evicted),
                        } => {
                            warn!("command buffer full, dropped #{}", evicted.id);
                            FrameOutcome::QueuedWithEviction { id, evicted }
                        }
                    },
                    Err(err) => {
                        self.stats.parse_errors = self.stats.parse_errors.wrapping_add(1);
                        debug!("rejected frame: {}", err);
                        FrameOutcome::Rejected(err)
                    }
                }
            }
        };

        if let Some(kind) = outcome.response() {
            // The command stays queued even if the peer never hears back
            if let Err(_e) = self.send_response(kind) {
                warn!("failed to send response: {}", _e);
            }
        }
        outcome
    }

    /// Whether a decoded command is waiting.
    #[inline]
    #[must_use]
    pub fn has_pending_command(&self) -> bool {
        !self.commands.is_empty()
    }

    /// Take the oldest queued command.
    pub fn next_command(&mut self) -> Option<DecodedCommand> {
        self.commands.dequeue().ok()
    }

    /// Number of queued commands.
    #[inline]
    #[must_use]
    pub fn pending_commands(&self) -> usize {
        self.commands.count()
    }

    /// Read access to the command ring.
    #[inline]
    pub fn commands(&self) -> &CommandBuffer {
        &self.commands
    }

    /// Mutable access to the command ring, e.g. to drain it.
    #[inline]
    pub fn commands_mut(&mut self) -> &mut CommandBuffer {
        &mut self.commands
    }

    /// Send `S<token>E`.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Sink`] if the sink rejects the frame.
    pub fn send_response(&mut self, kind: ResponseKind) -> Result<(), LinkError> {
        self.send(&kind)
    }

    /// Send a telemetry frame.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Encode`] if the formatted frame exceeds
    /// [`MAX_FRAME_SIZE`], or [`LinkError::Sink`] if the sink rejects it.
    pub fn send_telemetry(&mut self, sample: &TelemetrySample) -> Result<(), LinkError> {
        self.send(sample)
    }

    /// Send a command frame to the peer.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Encode`] if the formatted frame exceeds
    /// [`MAX_FRAME_SIZE`], or [`LinkError::Sink`] if the sink rejects it.
    pub fn send_command(&mut self, cmd: &DecodedCommand) -> Result<(), LinkError> {
        self.send(cmd)
    }

    fn send<T: Serialize>(&mut self, value: &T) -> Result<(), LinkError> {
        let mut frame = [0u8; MAX_FRAME_SIZE];
        let len = value.serialize(&mut frame)?;
        self.sink.send_frame(&frame[..len])?;
        self.stats.frames_sent = self.stats.frames_sent.wrapping_add(1);
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Zero every counter.
    pub fn reset_stats(&mut self) {
        self.stats = LinkStats::default();
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Current assembler state.
    #[inline]
    #[must_use]
    pub fn assembler_state(&self) -> AssemblerState {
        self.assembler.state()
    }

    /// Get a reference to the sink.
    pub fn sink(&self) -> &W {
        &self.sink
    }

    /// Get a mutable reference to the sink.
    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Decompose the session into its sink and final statistics.
    pub fn into_parts(self) -> (W, LinkStats) {
        (self.sink, self.stats)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::io::{SinkError, SliceSource};
    use rover_proto::{parse_response, CommandCode, RoverAction};
    use std::format;
    use std::vec::Vec;

    /// Sink that records each frame separately.
    #[derive(Default)]
    struct FrameLog {
        frames: Vec<Vec<u8>>,
        fail: bool,
    }

    impl FrameSink for FrameLog {
        fn send_frame(&mut self, frame: &[u8]) -> Result<(), SinkError> {
            if self.fail {
                return Err(SinkError::Io);
            }
            self.frames.push(frame.to_vec());
            Ok(())
        }
    }

    fn responses(session: &LinkSession<FrameLog>) -> Vec<ResponseKind> {
        session
            .sink()
            .frames
            .iter()
            .map(|f| parse_response(f))
            .collect()
    }

    fn feed(session: &mut LinkSession<FrameLog>, bytes: &[u8]) -> usize {
        session.process(&mut SliceSource::new(bytes))
    }

    #[test]
    fn test_valid_frame_queued_and_acked() {
        let mut session = LinkSession::new(FrameLog::default());
        assert_eq!(feed(&mut session, b"SMV:200,100E"), 1);

        assert_eq!(session.sink().frames, [b"SOKE".to_vec()]);
        let cmd = session.next_command().unwrap();
        assert_eq!(cmd.id, 1);
        assert_eq!(cmd.action, RoverAction::CustomMove);
        assert!(!session.has_pending_command());

        let stats = session.stats();
        assert_eq!(stats.frames_received, 1);
        assert_eq!(stats.frames_sent, 1);
        assert_eq!(stats.parse_errors, 0);
    }

    #[test]
    fn test_unknown_command_rejected() {
        let mut session = LinkSession::new(FrameLog::default());
        assert_eq!(feed(&mut session, b"SXY:1,2E"), 0);

        assert_eq!(responses(&session), [ResponseKind::InvalidCommand]);
        assert_eq!(session.stats().parse_errors, 1);
        assert_eq!(session.stats().frames_received, 1);
        assert_eq!(session.pending_commands(), 0);
    }

    #[test]
    fn test_repeated_start_markers() {
        let mut session = LinkSession::new(FrameLog::default());
        assert_eq!(feed(&mut session, b"SMV:1SSTE"), 1);
        assert_eq!(feed(&mut session, b"S SSFE"), 1);
        // Third 'S' restarts the frame, leaving only "T"
        assert_eq!(feed(&mut session, b"SSSTE"), 0);

        assert_eq!(
            responses(&session),
            [ResponseKind::Ok, ResponseKind::Ok, ResponseKind::InvalidCommand]
        );
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut session = LinkSession::new(FrameLog::default());
        let outcomes: Vec<FrameOutcome> =
            b"SMV:10E".iter().filter_map(|&b| session.push_byte(b)).collect();
        assert_eq!(outcomes, [FrameOutcome::Rejected(DecodeError::InvalidParams)]);
        assert_eq!(responses(&session), [ResponseKind::InvalidParams]);
    }

    #[test]
    fn test_eleventh_command_reports_buffer_full() {
        let mut session = LinkSession::new(FrameLog::default());
        let mut input = Vec::new();
        for i in 0..11 {
            input.extend_from_slice(format!("SSF:{i}E").as_bytes());
        }

        // Every frame queues, the last one by evicting the first
        assert_eq!(feed(&mut session, &input), 11);
        assert_eq!(session.pending_commands(), 10);

        let replies = responses(&session);
        assert_eq!(replies.len(), 11);
        assert!(replies[..10].iter().all(|&r| r == ResponseKind::Ok));
        assert_eq!(replies[10], ResponseKind::BufferFull);

        let first = session.next_command().unwrap();
        assert_eq!(first.id, 2);
        assert_eq!(first.params(), &[1.0]);
    }

    #[test]
    fn test_overflow_is_silent() {
        let mut session = LinkSession::new(FrameLog::default());
        let mut input = Vec::from(*b"S");
        input.extend(core::iter::repeat(b'7').take(200));

        assert_eq!(feed(&mut session, &input), 0);
        assert!(session.sink().frames.is_empty());

        let stats = session.stats();
        assert_eq!(stats.buffer_overflows, 1);
        assert_eq!(stats.frames_received, 0);
        assert_eq!(session.assembler_state(), AssemblerState::WaitingStart);
    }

    #[test]
    fn test_one_response_per_completed_frame() {
        let mut session = LinkSession::new(FrameLog::default());
        let input = b"noiseSSTE\r\nSXYESGTESMV:1E garbage SSF:5E";
        feed(&mut session, input);

        assert_eq!(
            responses(&session),
            [
                ResponseKind::Ok,
                ResponseKind::InvalidCommand,
                ResponseKind::Ok,
                ResponseKind::InvalidParams,
                ResponseKind::Ok,
            ]
        );
        assert_eq!(session.stats().frames_received, 5);
        assert_eq!(session.stats().frames_sent, 5);

        let codes: Vec<CommandCode> = session.commands_mut().drain().map(|c| c.code).collect();
        assert_eq!(codes, [CommandCode::St, CommandCode::Gt, CommandCode::Sf]);
    }

    #[test]
    fn test_send_failure_keeps_command_and_counts_nothing_sent() {
        let mut session = LinkSession::new(FrameLog {
            fail: true,
            ..FrameLog::default()
        });
        assert_eq!(feed(&mut session, b"SSTE"), 1);
        assert_eq!(session.pending_commands(), 1);
        assert_eq!(session.stats().frames_sent, 0);
        assert_eq!(session.stats().frames_received, 1);
    }

    #[test]
    fn test_send_telemetry_and_command() {
        let mut session = LinkSession::new(FrameLog::default());
        let sample = TelemetrySample {
            battery_voltage: 12.5,
            left_wheel_speed: 100.0,
            right_wheel_speed: 100.0,
            temperature: 25.5,
            timestamp: 3,
        };
        session.send_telemetry(&sample).unwrap();
        session
            .send_command(&rover_proto::CommandBuilder::left().speed(40.0).build())
            .unwrap();

        assert_eq!(
            session.sink().frames,
            [
                b"STEL:12.50,100.0,100.0,25.5,3E".to_vec(),
                b"SSL:40.0E".to_vec(),
            ]
        );
        assert_eq!(session.stats().frames_sent, 2);
    }

    #[test]
    fn test_oversized_telemetry_is_encode_error() {
        let mut session = LinkSession::new(FrameLog::default());
        let sample = TelemetrySample {
            battery_voltage: 1.0e60,
            ..TelemetrySample::default()
        };
        assert!(matches!(
            session.send_telemetry(&sample),
            Err(LinkError::Encode(_))
        ));
        assert!(session.sink().frames.is_empty());
        assert_eq!(session.stats().frames_sent, 0);
    }

    #[test]
    fn test_reset_stats() {
        let mut session = LinkSession::new(FrameLog::default());
        feed(&mut session, b"SSTESXYE");
        assert_ne!(session.stats(), LinkStats::default());

        session.reset_stats();
        assert_eq!(session.stats(), LinkStats::default());
        // Queued commands are not part of the statistics
        assert_eq!(session.pending_commands(), 1);
    }

    #[test]
    fn test_timeout_disabled_by_default() {
        let mut session = LinkSession::new(FrameLog::default());
        session.push_byte_at(b'S', 0);
        session.push_byte_at(b'S', 1);
        assert!(!session.poll_timeout(1_000_000));
        assert_eq!(session.push_byte_at(b'T', 1_000_000), None);
        assert!(matches!(
            session.push_byte_at(b'E', 1_000_001),
            Some(FrameOutcome::Queued { .. })
        ));
        assert_eq!(session.stats().frame_timeouts, 0);
    }

    #[test]
    fn test_timeout_drops_stalled_frame() {
        let config = LinkConfig::new().with_frame_timeout(100);
        let mut session = LinkSession::with_config(FrameLog::default(), config);

        let mut source = SliceSource::new(b"SMV:1");
        assert_eq!(session.process_at(&mut source, 0), 0);
        assert!(!session.poll_timeout(100));
        assert!(session.poll_timeout(101));
        assert_eq!(session.stats().frame_timeouts, 1);

        // The rest of the stale frame is noise until the next start marker
        let mut source = SliceSource::new(b",2ESGTE");
        assert_eq!(session.process_at(&mut source, 150), 1);
        assert_eq!(responses(&session), [ResponseKind::Ok]);
        assert_eq!(session.next_command().unwrap().code, CommandCode::Gt);
    }

    #[test]
    fn test_timeout_checked_on_next_byte() {
        let config = LinkConfig::new().with_frame_timeout(100);
        let mut session = LinkSession::with_config(FrameLog::default(), config);

        session.push_byte_at(b'S', 0);
        session.push_byte_at(b'X', 10);
        // Arrives too late: the partial frame is gone, so this 'E' is noise
        assert_eq!(session.push_byte_at(b'E', 500), None);
        assert_eq!(session.stats().frame_timeouts, 1);
        assert_eq!(session.stats().frames_received, 0);
    }

    #[test]
    fn test_into_parts() {
        let mut session = LinkSession::new(FrameLog::default());
        feed(&mut session, b"SGTE");
        let (sink, stats) = session.into_parts();
        assert_eq!(sink.frames.len(), 1);
        assert_eq!(stats.frames_received, 1);
    }
}
