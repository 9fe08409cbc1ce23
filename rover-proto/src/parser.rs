//! Frame payload decoding and response parsing.
//!
//! A payload is the text between the `S` and `E` markers:
//!
//! ```text
//! <code>[':'<param>[,<param>]*]
//! ```
//!
//! - `MV:<left>,<right>` - both wheel speeds required
//! - `SF`, `SB`, `SL`, `SR` - optional speed, defaults to [`DEFAULT_SPEED`]
//! - `ST`, `GT` - no parameters (trailing text is ignored)

use crate::params::{parse_params, skip_space};
use crate::types::{CommandCode, DecodedCommand, ResponseKind};
use crate::{CODE_SEPARATOR, DEFAULT_SPEED, FRAME_START, MAX_PARAMS};

/// Why a payload could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Payload does not start with a known two-letter code.
    UnknownCommand,
    /// Code is known but its parameters are missing or malformed.
    InvalidParams,
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownCommand => write!(f, "unrecognized command"),
            Self::InvalidParams => write!(f, "invalid parameters"),
        }
    }
}

/// Cut the payload at the first NUL, as a C string would end there.
#[inline]
fn until_nul(payload: &[u8]) -> &[u8] {
    match payload.iter().position(|&b| b == 0) {
        Some(end) => &payload[..end],
        None => payload,
    }
}

/// Decode a frame payload into a command.
///
/// The returned command has no sequence id yet; it is assigned when the
/// command is queued.
///
/// # Errors
///
/// - [`DecodeError::UnknownCommand`] if fewer than two characters remain after
///   leading whitespace or the code is not in the table.
/// - [`DecodeError::InvalidParams`] if `MV` carries fewer than two numbers.
///
/// # Example
///
/// ```
/// use rover_proto::{decode_payload, CommandCode, RoverAction};
///
/// let cmd = decode_payload(b"MV:255,-255").unwrap();
/// assert_eq!(cmd.code, CommandCode::Mv);
/// assert_eq!(cmd.params(), &[255.0, -255.0]);
/// assert_eq!(cmd.action, RoverAction::MoveRight);
/// ```
pub fn decode_payload(payload: &[u8]) -> Result<DecodedCommand, DecodeError> {
    let payload = skip_space(until_nul(payload));

    let code = CommandCode::from_bytes(payload).ok_or(DecodeError::UnknownCommand)?;

    // Parameters follow the code, optionally after a ':'
    let mut rest = &payload[2..];
    if rest.first() == Some(&CODE_SEPARATOR) {
        rest = &rest[1..];
    }

    let mut params = [0.0; MAX_PARAMS];
    let count = match code {
        CommandCode::Mv => {
            let count = parse_params(rest, &mut params[..2]);
            if count < 2 {
                return Err(DecodeError::InvalidParams);
            }
            count
        }
        code if code.is_directional() => {
            if parse_params(rest, &mut params[..1]) == 0 {
                params[0] = DEFAULT_SPEED;
            }
            1
        }
        // ST and GT take no parameters; trailing text is ignored
        _ => 0,
    };

    DecodedCommand::new(code, &params[..count])
}

/// Parse a response frame received from the peer.
///
/// Leading whitespace and start markers are skipped, then the text is
/// prefix-matched against the known tokens in priority order. Anything that
/// matches none of them is treated as [`ResponseKind::Nack`], never as success.
///
/// ```
/// use rover_proto::{parse_response, ResponseKind};
///
/// assert_eq!(parse_response(b"SOKE"), ResponseKind::Ok);
/// assert_eq!(parse_response(b"SERR:BUFFER_FULLE"), ResponseKind::BufferFull);
/// assert_eq!(parse_response(b"garbage"), ResponseKind::Nack);
/// ```
#[must_use]
pub fn parse_response(frame: &[u8]) -> ResponseKind {
    let start = frame
        .iter()
        .position(|&b| !(crate::params::is_space(b) || b == FRAME_START))
        .unwrap_or(frame.len());
    let text = &frame[start..];

    const TABLE: [(&[u8], ResponseKind); 6] = [
        (b"OK", ResponseKind::Ok),
        (b"NACK", ResponseKind::Nack),
        (b"ERR:INVALID_COMMAND", ResponseKind::InvalidCommand),
        (b"ERR:INVALID_PARAMS", ResponseKind::InvalidParams),
        (b"ERR:BUFFER_FULL", ResponseKind::BufferFull),
        (b"TEL:", ResponseKind::Telemetry),
    ];

    TABLE
        .iter()
        .find(|(token, _)| text.starts_with(token))
        .map_or(ResponseKind::Nack, |&(_, kind)| kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RoverAction;

    #[test]
    fn test_decode_mv_actions() {
        let cases: [(&[u8], RoverAction); 5] = [
            (b"MV:0,0", RoverAction::Stop),
            (b"MV:200,200", RoverAction::MoveForward),
            (b"MV:200,100", RoverAction::CustomMove),
            (b"MV:-50,50", RoverAction::MoveLeft),
            (b"MV:50,-50", RoverAction::MoveRight),
        ];
        for (payload, action) in cases {
            let cmd = decode_payload(payload).unwrap();
            assert_eq!(cmd.action, action);
            assert_eq!(cmd.param_count(), 2);
        }
    }

    #[test]
    fn test_decode_mv_backwards() {
        let cmd = decode_payload(b"MV:-100,-100").unwrap();
        assert_eq!(cmd.action, RoverAction::MoveBackwards);
    }

    #[test]
    fn test_decode_mv_needs_two_params() {
        assert_eq!(decode_payload(b"MV"), Err(DecodeError::InvalidParams));
        assert_eq!(decode_payload(b"MV:"), Err(DecodeError::InvalidParams));
        assert_eq!(decode_payload(b"MV:10"), Err(DecodeError::InvalidParams));
        assert_eq!(decode_payload(b"MV:10;20"), Err(DecodeError::InvalidParams));
        assert_eq!(decode_payload(b"MV:a,b"), Err(DecodeError::InvalidParams));
    }

    #[test]
    fn test_decode_mv_ignores_extra_params() {
        let cmd = decode_payload(b"MV:1,2,3").unwrap();
        assert_eq!(cmd.params(), &[1.0, 2.0]);
    }

    #[test]
    fn test_decode_mv_without_separator() {
        let cmd = decode_payload(b"MV10,20").unwrap();
        assert_eq!(cmd.params(), &[10.0, 20.0]);
    }

    #[test]
    fn test_decode_directional_default_speed() {
        let cmd = decode_payload(b"SF").unwrap();
        assert_eq!(cmd.code, CommandCode::Sf);
        assert_eq!(cmd.action, RoverAction::MoveForward);
        assert_eq!(cmd.params(), &[255.0]);
    }

    #[test]
    fn test_decode_directional_explicit_speed() {
        let cmd = decode_payload(b"SF:10").unwrap();
        assert_eq!(cmd.params(), &[10.0]);

        let cmd = decode_payload(b"sl:42.5").unwrap();
        assert_eq!(cmd.code, CommandCode::Sl);
        assert_eq!(cmd.action, RoverAction::MoveLeft);
        assert_eq!(cmd.params(), &[42.5]);
    }

    #[test]
    fn test_decode_directional_malformed_speed_defaults() {
        // No numeric prefix behaves like a missing parameter
        let cmd = decode_payload(b"SB:fast").unwrap();
        assert_eq!(cmd.params(), &[DEFAULT_SPEED]);
    }

    #[test]
    fn test_decode_rejects_non_decimal_numbers() {
        // "0x10" stops after the leading zero, so the list ends early
        assert_eq!(decode_payload(b"MV:0x10,5"), Err(DecodeError::InvalidParams));
        assert_eq!(decode_payload(b"MV:inf,inf"), Err(DecodeError::InvalidParams));
        assert_eq!(decode_payload(b"MV:nan,1"), Err(DecodeError::InvalidParams));

        let cmd = decode_payload(b"SF:nan").unwrap();
        assert_eq!(cmd.params(), &[DEFAULT_SPEED]);
        let cmd = decode_payload(b"SR:0x20").unwrap();
        assert_eq!(cmd.params(), &[0.0]);
    }

    #[test]
    fn test_decode_no_param_codes() {
        let cmd = decode_payload(b"ST").unwrap();
        assert_eq!(cmd.action, RoverAction::Stop);
        assert_eq!(cmd.param_count(), 0);

        let cmd = decode_payload(b"GT:1,2,3").unwrap();
        assert_eq!(cmd.action, RoverAction::GetTelemetry);
        assert_eq!(cmd.param_count(), 0);
    }

    #[test]
    fn test_decode_unknown_code() {
        assert_eq!(decode_payload(b"XY:1,2"), Err(DecodeError::UnknownCommand));
        assert_eq!(decode_payload(b"T"), Err(DecodeError::UnknownCommand));
        assert_eq!(decode_payload(b""), Err(DecodeError::UnknownCommand));
        assert_eq!(decode_payload(b"   "), Err(DecodeError::UnknownCommand));
    }

    #[test]
    fn test_decode_leading_whitespace() {
        let cmd = decode_payload(b"  \tmv: 1 , 2 ").unwrap();
        assert_eq!(cmd.params(), &[1.0, 2.0]);
    }

    #[test]
    fn test_decode_stops_at_nul() {
        assert_eq!(decode_payload(b"S\0T"), Err(DecodeError::UnknownCommand));
        let cmd = decode_payload(b"MV:1,2\0junk").unwrap();
        assert_eq!(cmd.params(), &[1.0, 2.0]);
    }

    #[test]
    fn test_decode_has_no_id() {
        let cmd = decode_payload(b"ST").unwrap();
        assert_eq!(cmd.id, 0);
    }

    #[test]
    fn test_parse_response_tokens() {
        assert_eq!(parse_response(b"OK"), ResponseKind::Ok);
        assert_eq!(parse_response(b"SNACKE"), ResponseKind::Nack);
        assert_eq!(
            parse_response(b"SERR:INVALID_COMMANDE"),
            ResponseKind::InvalidCommand
        );
        assert_eq!(
            parse_response(b"ERR:INVALID_PARAMS"),
            ResponseKind::InvalidParams
        );
        assert_eq!(parse_response(b"SERR:BUFFER_FULLE"), ResponseKind::BufferFull);
        assert_eq!(
            parse_response(b"STEL:12.50,0.0,0.0,25.5,1E"),
            ResponseKind::Telemetry
        );
    }

    #[test]
    fn test_parse_response_skips_whitespace_and_markers() {
        assert_eq!(parse_response(b"  SS OK"), ResponseKind::Ok);
    }

    #[test]
    fn test_parse_response_unknown_is_nack() {
        assert_eq!(parse_response(b""), ResponseKind::Nack);
        assert_eq!(parse_response(b"ERR:SOMETHING"), ResponseKind::Nack);
        assert_eq!(parse_response(b"ok"), ResponseKind::Nack);
        assert_eq!(parse_response(b"TEL"), ResponseKind::Nack);
    }
}
