//! Motion commands: targets, gearbox scaling and the start-motion trigger.
//!
//! Positions and velocities are signed 32-bit values carried in 4-byte
//! registers as two's complement.

use crate::session::DriveSession;
use servo_common::consts::{
    ACTUAL_POSITION, CONTROL_WORD, CW_START_MOTION, TARGET_POSITION, TARGET_VELOCITY,
};
use servo_common::drive_config::GearRatioConfig;
use servo_common::transport::{DriveError, Transport};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Positive gear ratio `numerator / denominator` (motor turns per output turn).
///
/// Scaling multiplies first and divides last in 64-bit arithmetic, so integer
/// ratios are exact and fractional ratios truncate toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GearRatio {
    numerator: u32,
    denominator: u32,
}

impl GearRatio {
    /// Build a ratio; both terms must be non-zero.
    pub fn new(numerator: u32, denominator: u32) -> Result<Self, DriveError> {
        if numerator == 0 || denominator == 0 {
            return Err(DriveError::InvalidGearRatio(format!(
                "{}/{} is not a positive ratio",
                numerator, denominator
            )));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Whole-number ratio `n:1`.
    pub fn integer(n: u32) -> Result<Self, DriveError> {
        Self::new(n, 1)
    }

    /// Motor-side term.
    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    /// Output-side term.
    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    /// Scale an output-side value to the motor side.
    ///
    /// # Errors
    /// `PositionOverflow` when the result does not fit in `i32`.
    pub fn apply(&self, output: i32) -> Result<i32, DriveError> {
        let scaled = i64::from(output) * i64::from(self.numerator) / i64::from(self.denominator);
        i32::try_from(scaled).map_err(|_| DriveError::PositionOverflow { value: scaled })
    }
}

impl fmt::Display for GearRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl TryFrom<GearRatioConfig> for GearRatio {
    type Error = DriveError;

    fn try_from(config: GearRatioConfig) -> Result<Self, Self::Error> {
        Self::new(config.numerator, config.denominator)
    }
}

impl FromStr for GearRatio {
    type Err = DriveError;

    /// Accepts `"30"`, `"5/2"` or a decimal such as `"2.5"` (up to nine
    /// fractional digits, stored as the reduced fraction).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid =
            |reason: String| DriveError::InvalidGearRatio(format!("'{}': {}", s, reason));
        let parse = |term: &str| {
            term.trim()
                .parse::<u32>()
                .map_err(|e| invalid(e.to_string()))
        };
        if let Some((num, den)) = s.split_once('/') {
            return Self::new(parse(num)?, parse(den)?);
        }
        let Some((whole, frac)) = s.trim().split_once('.') else {
            return Self::integer(parse(s)?);
        };

        if frac.is_empty() || frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("expected up to 9 fractional digits".to_string()));
        }
        let whole = if whole.is_empty() {
            0
        } else {
            whole.parse::<u64>().map_err(|e| invalid(e.to_string()))?
        };
        let scale = 10u64.pow(frac.len() as u32);
        let numerator = whole
            .checked_mul(scale)
            .and_then(|w| w.checked_add(frac.parse::<u64>().ok()?))
            .ok_or_else(|| invalid("value too large".to_string()))?;
        let divisor = gcd(numerator, scale);
        let numerator = u32::try_from(numerator / divisor)
            .map_err(|_| invalid("value too large".to_string()))?;
        // scale / divisor <= 10^9
        Self::new(numerator, (scale / divisor) as u32)
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl<T: Transport> DriveSession<T> {
    /// Write the Target Position register.
    pub fn set_target_position(&mut self, position: i32) -> Result<(), DriveError> {
        debug!("Target position {}", position);
        self.write_register(&TARGET_POSITION, position as u32)
    }

    /// Scale an output-side position through the gearbox and write it as the
    /// target. Returns the motor-side value written.
    pub fn set_target_position_after_gearbox(
        &mut self,
        output_position: i32,
        ratio: GearRatio,
    ) -> Result<i32, DriveError> {
        let motor = ratio.apply(output_position)?;
        debug!(
            "Gearbox {} maps output {} to motor {}",
            ratio, output_position, motor
        );
        self.set_target_position(motor)?;
        Ok(motor)
    }

    /// Write the Target Velocity register.
    pub fn set_target_velocity(&mut self, velocity: i32) -> Result<(), DriveError> {
        debug!("Target velocity {}", velocity);
        self.write_register(&TARGET_VELOCITY, velocity as u32)
    }

    /// Velocity counterpart of [`Self::set_target_position_after_gearbox`].
    pub fn set_target_velocity_after_gearbox(
        &mut self,
        output_velocity: i32,
        ratio: GearRatio,
    ) -> Result<i32, DriveError> {
        let motor = ratio.apply(output_velocity)?;
        self.set_target_velocity(motor)?;
        Ok(motor)
    }

    /// Trigger motion toward the current target (Control Word `0x3F`).
    pub fn start_motion(&mut self) -> Result<(), DriveError> {
        self.write_register(&CONTROL_WORD, u32::from(CW_START_MOTION))?;
        info!("Motion started");
        self.settle(self.timing().motion);
        Ok(())
    }

    /// Current Actual Position.
    pub fn read_actual_position(&mut self) -> Result<i32, DriveError> {
        Ok(self.read_register(&ACTUAL_POSITION)? as i32)
    }

    /// Target Position as last written.
    pub fn read_target_position(&mut self) -> Result<i32, DriveError> {
        Ok(self.read_register(&TARGET_POSITION)? as i32)
    }
}
