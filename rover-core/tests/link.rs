//! Host and rover sessions talking over an in-memory wire.

use rover_core::{
    parse_response, ByteSource, CommandBuilder, CommandCode, DriveState, FrameSink, LinkConfig,
    LinkSession, ResponseKind, RoverAction, SinkError, SliceSource, MAX_PAYLOAD_LEN,
};

/// One direction of the wire: frames in the order they were sent.
#[derive(Default)]
struct Wire {
    frames: Vec<Vec<u8>>,
}

impl FrameSink for Wire {
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), SinkError> {
        self.frames.push(frame.to_vec());
        Ok(())
    }
}

impl Wire {
    /// Everything sent so far, as one byte stream.
    fn take_bytes(&mut self) -> Vec<u8> {
        self.frames.drain(..).flatten().collect()
    }
}

/// Byte source that yields at most `chunk` bytes per poll, like a UART FIFO.
struct Chunked<'a> {
    data: &'a [u8],
    chunk: usize,
    budget: usize,
}

impl Chunked<'_> {
    fn refill(&mut self) {
        self.budget = self.chunk;
    }
}

impl ByteSource for Chunked<'_> {
    fn read_byte(&mut self) -> Option<u8> {
        if self.budget == 0 {
            return None;
        }
        let (&first, rest) = self.data.split_first()?;
        self.data = rest;
        self.budget -= 1;
        Some(first)
    }
}

#[test]
fn host_commands_are_acknowledged() {
    let mut host = LinkSession::new(Wire::default());
    let mut rover = LinkSession::new(Wire::default());

    host.send_command(&CommandBuilder::drive(200.0, 200.0).build())
        .unwrap();
    host.send_command(&CommandBuilder::left().speed(60.0).build())
        .unwrap();
    host.send_command(&CommandBuilder::telemetry().build())
        .unwrap();

    let uplink = host.sink_mut().take_bytes();
    assert_eq!(rover.process(&mut SliceSource::new(&uplink)), 3);

    let replies: Vec<ResponseKind> = rover
        .sink()
        .frames
        .iter()
        .map(|f| parse_response(f))
        .collect();
    assert_eq!(replies, [ResponseKind::Ok; 3]);

    let actions: Vec<RoverAction> = rover.commands_mut().drain().map(|c| c.action).collect();
    assert_eq!(
        actions,
        [
            RoverAction::MoveForward,
            RoverAction::MoveLeft,
            RoverAction::GetTelemetry
        ]
    );

    assert_eq!(host.stats().frames_sent, 3);
    assert_eq!(rover.stats().frames_received, 3);
    assert_eq!(rover.stats().frames_sent, 3);
}

#[test]
fn telemetry_round_trip() {
    let mut host = LinkSession::new(Wire::default());
    let mut rover = LinkSession::new(Wire::default());
    let mut drive = DriveState::new();

    host.send_command(&CommandBuilder::forward().speed(120.0).build())
        .unwrap();
    host.send_command(&CommandBuilder::telemetry().build())
        .unwrap();
    let uplink = host.sink_mut().take_bytes();
    rover.process(&mut SliceSource::new(&uplink));

    let mut timestamp = 0u32;
    while let Some(cmd) = rover.next_command() {
        if drive.apply(&cmd) == RoverAction::GetTelemetry {
            timestamp += 1;
            rover
                .send_telemetry(&drive.telemetry(12.5, 25.5, timestamp))
                .unwrap();
        }
    }

    let frames = &rover.sink().frames;
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[2], b"STEL:12.50,120.0,120.0,25.5,1E");
    assert_eq!(parse_response(&frames[2]), ResponseKind::Telemetry);
}

#[test]
fn frames_split_across_polls() {
    let mut rover = LinkSession::new(Wire::default());
    let stream = b"SMV:100,-100ESSTESSR:30E";
    let mut source = Chunked {
        data: stream,
        chunk: 3,
        budget: 0,
    };

    let mut queued = 0;
    for _ in 0..stream.len() {
        source.refill();
        queued += rover.process(&mut source);
    }

    assert_eq!(queued, 3);
    let codes: Vec<CommandCode> = rover.commands_mut().drain().map(|c| c.code).collect();
    assert_eq!(codes, [CommandCode::Mv, CommandCode::St, CommandCode::Sr]);
}

#[test]
fn noisy_line_gets_one_reply_per_frame() {
    let mut rover = LinkSession::new(Wire::default());
    let mut stream = Vec::new();
    stream.extend_from_slice(b"\x00\xff junk SGTE");
    // Unterminated and too long: dropped without a reply
    stream.push(b'S');
    stream.extend(std::iter::repeat(b'1').take(MAX_PAYLOAD_LEN + 1));
    stream.extend_from_slice(b"SFOOESMV:abcESSB:20E");

    rover.process(&mut SliceSource::new(&stream));

    let replies: Vec<ResponseKind> = rover
        .sink()
        .frames
        .iter()
        .map(|f| parse_response(f))
        .collect();
    assert_eq!(
        replies,
        [
            ResponseKind::Ok,
            ResponseKind::InvalidCommand,
            ResponseKind::InvalidParams,
            ResponseKind::Ok,
        ]
    );

    let stats = rover.stats();
    assert_eq!(stats.frames_received, 4);
    assert_eq!(stats.parse_errors, 2);
    assert_eq!(stats.buffer_overflows, 1);
    assert_eq!(rover.pending_commands(), 2);
}

#[test]
fn buffer_full_still_queues_newest() {
    let mut host = LinkSession::new(Wire::default());
    let mut rover = LinkSession::new(Wire::default());

    for i in 0..12u8 {
        host.send_command(&CommandBuilder::forward().speed(f64::from(i)).build())
            .unwrap();
    }
    let uplink = host.sink_mut().take_bytes();
    assert_eq!(rover.process(&mut SliceSource::new(&uplink)), 12);

    let full = rover
        .sink()
        .frames
        .iter()
        .filter(|f| parse_response(f) == ResponseKind::BufferFull)
        .count();
    assert_eq!(full, 2);

    let speeds: Vec<f64> = rover
        .commands_mut()
        .drain()
        .map(|c| c.params()[0])
        .collect();
    assert_eq!(speeds, (2..12u8).map(f64::from).collect::<Vec<_>>());
}

#[test]
fn stalled_frame_times_out() {
    let config = LinkConfig::default().with_frame_timeout(rover_core::FRAME_TIMEOUT_MS);
    let mut rover = LinkSession::with_config(Wire::default(), config);

    rover.process_at(&mut SliceSource::new(b"SMV:10"), 1_000);
    assert!(rover.poll_timeout(1_200));

    rover.process_at(&mut SliceSource::new(b"SSTE"), 1_210);
    assert_eq!(rover.stats().frame_timeouts, 1);
    assert_eq!(rover.stats().frames_received, 1);
    assert_eq!(rover.next_command().map(|c| c.code), Some(CommandCode::St));
}
