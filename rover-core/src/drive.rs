//! Differential drive model.
//!
//! Maps dequeued commands onto left/right wheel speeds. `MV` drives the
//! wheels exactly as given; the single-speed codes use their speed `v`:
//!
//! | Action | Left | Right |
//! |--------|------|-------|
//! | Stop | 0 | 0 |
//! | Forward | v | v |
//! | Backwards | -v | -v |
//! | Left | -v/2 | v |
//! | Right | v | -v/2 |

use rover_proto::{CommandCode, DecodedCommand, RoverAction, TelemetrySample, DEFAULT_SPEED};

/// Battery voltage reported by the first simulated sample of each cycle.
pub const NOMINAL_BATTERY_V: f64 = 12.5;

/// Fixed simulated board temperature in degrees Celsius.
pub const NOMINAL_TEMPERATURE_C: f64 = 25.5;

/// Simulated battery reading; climbs 0.1 V per sample and wraps every 10.
#[must_use]
pub fn simulated_battery(sequence: u32) -> f64 {
    NOMINAL_BATTERY_V + f64::from(sequence % 10) * 0.1
}

/// Current wheel speeds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriveState {
    pub left_speed: f64,
    pub right_speed: f64,
}

impl DriveState {
    /// Both wheels stopped.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            left_speed: 0.0,
            right_speed: 0.0,
        }
    }

    /// Update the wheel speeds for `cmd`.
    ///
    /// Returns the command's action so the caller can react to
    /// [`RoverAction::GetTelemetry`], which leaves the speeds unchanged.
    pub fn apply(&mut self, cmd: &DecodedCommand) -> RoverAction {
        if cmd.code == CommandCode::Mv {
            if let [left, right, ..] = cmd.params() {
                self.set(*left, *right);
            }
            return cmd.action;
        }

        let v = cmd.param(0).unwrap_or(DEFAULT_SPEED);
        match cmd.action {
            RoverAction::Stop => self.set(0.0, 0.0),
            RoverAction::MoveForward => self.set(v, v),
            RoverAction::MoveBackwards => self.set(-v, -v),
            RoverAction::MoveLeft => self.set(-v * 0.5, v),
            RoverAction::MoveRight => self.set(v, -v * 0.5),
            RoverAction::CustomMove | RoverAction::GetTelemetry => {}
        }
        cmd.action
    }

    /// Stop both wheels.
    pub fn stop(&mut self) {
        self.set(0.0, 0.0);
    }

    #[inline]
    fn set(&mut self, left: f64, right: f64) {
        self.left_speed = left;
        self.right_speed = right;
    }

    /// Whether either wheel is turning.
    #[inline]
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.left_speed != 0.0 || self.right_speed != 0.0
    }

    /// Telemetry sample reporting the current wheel speeds.
    #[must_use]
    pub fn telemetry(&self, battery_voltage: f64, temperature: f64, timestamp: u32) -> TelemetrySample {
        TelemetrySample {
            battery_voltage,
            left_wheel_speed: self.left_speed,
            right_wheel_speed: self.right_speed,
            temperature,
            timestamp,
        }
    }

    /// Simulated sample number `sequence`, also used as its timestamp.
    #[must_use]
    pub fn simulated_telemetry(&self, sequence: u32) -> TelemetrySample {
        self.telemetry(simulated_battery(sequence), NOMINAL_TEMPERATURE_C, sequence)
    }
}
