//! Core wire types: CommandCode, RoverAction, DecodedCommand, TelemetrySample, ResponseKind.

use crate::parser::DecodeError;
use crate::MAX_PARAMS;

/// Two-letter command code at the start of a frame payload.
///
/// Matching is case-insensitive on the wire; [`CommandCode::as_str`] always
/// yields the uppercase form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandCode {
    /// `MV` - drive both wheels, params: left, right
    Mv,
    /// `ST` - stop, no params
    St,
    /// `GT` - request telemetry, no params
    Gt,
    /// `SF` - forward, optional speed
    Sf,
    /// `SB` - backwards, optional speed
    Sb,
    /// `SL` - turn left, optional speed
    Sl,
    /// `SR` - turn right, optional speed
    Sr,
}

impl CommandCode {
    /// Every known code, in table order.
    pub const ALL: [Self; 7] = [
        Self::Mv,
        Self::St,
        Self::Gt,
        Self::Sf,
        Self::Sb,
        Self::Sl,
        Self::Sr,
    ];

    /// Match the first two bytes of `code` against the code table.
    ///
    /// Returns `None` if fewer than two bytes are given or the pair is unknown.
    ///
    /// ```
    /// use rover_proto::CommandCode;
    ///
    /// assert_eq!(CommandCode::from_bytes(b"mv:1,2"), Some(CommandCode::Mv));
    /// assert_eq!(CommandCode::from_bytes(b"XY"), None);
    /// ```
    #[must_use]
    pub fn from_bytes(code: &[u8]) -> Option<Self> {
        let (a, b) = match code {
            [a, b, ..] => (a.to_ascii_uppercase(), b.to_ascii_uppercase()),
            _ => return None,
        };

        match (a, b) {
            (b'M', b'V') => Some(Self::Mv),
            (b'S', b'T') => Some(Self::St),
            (b'G', b'T') => Some(Self::Gt),
            (b'S', b'F') => Some(Self::Sf),
            (b'S', b'B') => Some(Self::Sb),
            (b'S', b'L') => Some(Self::Sl),
            (b'S', b'R') => Some(Self::Sr),
            _ => None,
        }
    }

    /// Uppercase wire representation.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mv => "MV",
            Self::St => "ST",
            Self::Gt => "GT",
            Self::Sf => "SF",
            Self::Sb => "SB",
            Self::Sl => "SL",
            Self::Sr => "SR",
        }
    }

    /// Whether this is one of the single-speed direction codes (SF/SB/SL/SR).
    #[inline]
    #[must_use]
    pub const fn is_directional(self) -> bool {
        matches!(self, Self::Sf | Self::Sb | Self::Sl | Self::Sr)
    }
}

impl core::fmt::Display for CommandCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Motion or telemetry action derived from a command code and its parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RoverAction {
    #[default]
    Stop,
    MoveForward,
    MoveBackwards,
    MoveLeft,
    MoveRight,
    /// Independent wheel speeds (MV with unequal same-sign speeds)
    CustomMove,
    GetTelemetry,
}

impl RoverAction {
    /// Differential-drive classifier for a left/right wheel pair.
    ///
    /// Same-sign pairs are straight moves when equal and custom moves
    /// otherwise; mixed signs (or a single zero) turn toward the slower wheel.
    ///
    /// ```
    /// use rover_proto::RoverAction;
    ///
    /// assert_eq!(RoverAction::classify(0.0, 0.0), RoverAction::Stop);
    /// assert_eq!(RoverAction::classify(200.0, 200.0), RoverAction::MoveForward);
    /// assert_eq!(RoverAction::classify(-50.0, 50.0), RoverAction::MoveLeft);
    /// ```
    #[must_use]
    pub fn classify(left: f64, right: f64) -> Self {
        if left == 0.0 && right == 0.0 {
            Self::Stop
        } else if left > 0.0 && right > 0.0 {
            if left == right {
                Self::MoveForward
            } else {
                Self::CustomMove
            }
        } else if left < 0.0 && right < 0.0 {
            if left == right {
                Self::MoveBackwards
            } else {
                Self::CustomMove
            }
        } else if left > right {
            Self::MoveRight
        } else {
            Self::MoveLeft
        }
    }

    /// Derive the action for `code` given its parsed parameters.
    ///
    /// An `MV` with fewer than two parameters has no wheel pair to classify
    /// and maps to [`RoverAction::CustomMove`].
    #[must_use]
    pub fn for_command(code: CommandCode, params: &[f64]) -> Self {
        match code {
            CommandCode::St => Self::Stop,
            CommandCode::Sf => Self::MoveForward,
            CommandCode::Sb => Self::MoveBackwards,
            CommandCode::Sl => Self::MoveLeft,
            CommandCode::Sr => Self::MoveRight,
            CommandCode::Gt => Self::GetTelemetry,
            CommandCode::Mv => match params {
                [left, right, ..] => Self::classify(*left, *right),
                _ => Self::CustomMove,
            },
        }
    }
}

/// A command recovered from a frame payload.
///
/// The sequence `id` is 0 until the command is stamped by a command buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodedCommand {
    /// Sequence id assigned at enqueue time (0 = unset)
    pub id: u16,
    /// Protocol code the command arrived with
    pub code: CommandCode,
    /// Action derived from code and parameters
    pub action: RoverAction,
    params: [f64; MAX_PARAMS],
    param_count: u8,
}

impl DecodedCommand {
    /// Placeholder value used to fill fixed-size storage.
    pub const EMPTY: Self = Self {
        id: 0,
        code: CommandCode::St,
        action: RoverAction::Stop,
        params: [0.0; MAX_PARAMS],
        param_count: 0,
    };

    /// Build a command from a code and its parameters, deriving the action.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidParams`] if more than [`MAX_PARAMS`]
    /// values are given.
    pub fn new(code: CommandCode, params: &[f64]) -> Result<Self, DecodeError> {
        if params.len() > MAX_PARAMS {
            return Err(DecodeError::InvalidParams);
        }

        let mut storage = [0.0; MAX_PARAMS];
        storage[..params.len()].copy_from_slice(params);

        Ok(Self {
            id: 0,
            code,
            action: RoverAction::for_command(code, params),
            params: storage,
            param_count: params.len() as u8,
        })
    }

    /// The parsed parameters, in wire order.
    #[inline]
    #[must_use]
    pub fn params(&self) -> &[f64] {
        &self.params[..self.param_count as usize]
    }

    /// Number of parameters carried.
    #[inline]
    #[must_use]
    pub const fn param_count(&self) -> usize {
        self.param_count as usize
    }

    /// Parameter at `index`, if present.
    #[inline]
    #[must_use]
    pub fn param(&self, index: usize) -> Option<f64> {
        self.params().get(index).copied()
    }

    /// Whether a command buffer has assigned this command an id.
    #[inline]
    #[must_use]
    pub const fn has_id(&self) -> bool {
        self.id != 0
    }

    /// Return a copy stamped with `id`.
    #[inline]
    #[must_use]
    pub const fn with_id(mut self, id: u16) -> Self {
        self.id = id;
        self
    }
}

impl Default for DecodedCommand {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Telemetry snapshot reported back to the host controller.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetrySample {
    /// Battery voltage in volts
    pub battery_voltage: f64,
    pub left_wheel_speed: f64,
    pub right_wheel_speed: f64,
    /// System temperature in degrees Celsius
    pub temperature: f64,
    pub timestamp: u32,
}

/// Acknowledgement, error, or telemetry response token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseKind {
    /// `OK` - frame accepted
    Ok,
    /// `NACK` - generic rejection, also the fallback for unrecognized responses
    Nack,
    /// `ERR:INVALID_COMMAND`
    InvalidCommand,
    /// `ERR:INVALID_PARAMS`
    InvalidParams,
    /// `ERR:BUFFER_FULL` - command queued by evicting the oldest one
    BufferFull,
    /// `TEL` - telemetry frame
    Telemetry,
}

impl ResponseKind {
    /// Wire token written between the frame markers.
    #[inline]
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Nack => "NACK",
            Self::InvalidCommand => "ERR:INVALID_COMMAND",
            Self::InvalidParams => "ERR:INVALID_PARAMS",
            Self::BufferFull => "ERR:BUFFER_FULL",
            Self::Telemetry => "TEL",
        }
    }

    /// Whether the peer should treat this as a positive acknowledgement.
    #[inline]
    #[must_use]
    pub const fn is_ack(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Whether this is one of the `ERR:*` responses.
    #[inline]
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(
            self,
            Self::InvalidCommand | Self::InvalidParams | Self::BufferFull
        )
    }
}

impl From<DecodeError> for ResponseKind {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::UnknownCommand => Self::InvalidCommand,
            DecodeError::InvalidParams => Self::InvalidParams,
        }
    }
}

impl core::fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.token())
    }
}
