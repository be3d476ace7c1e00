//! Drive session configuration.
//!
//! Configuration types loaded from `servo_drive.toml`:
//! - `DriveConfig` - Top-level configuration
//! - `TransportConfig` - Explicit backend selection (simulation or hardware)
//! - `TimingConfig` / `Timing` - Settle delays and status polling bounds
//! - `MotionConfig` - Operating mode, target and gear ratio for the demo run
//!
//! # TOML Example
//!
//! ```toml
//! [shared]
//! service_name = "servo-bench"
//!
//! [transport]
//! kind = "simulation"
//! description = "resources/servo_drive.xml"
//!
//! [timing]
//! transition_ms = 10
//!
//! [motion]
//! target_position = 10000
//! gear_ratio = { numerator = 30 }
//! ```

use crate::config::{ConfigError, SharedConfig};
use crate::consts::{
    DEFAULT_IO_SETTLE, DEFAULT_MODE_SETTLE, DEFAULT_MOTION_SETTLE, DEFAULT_STATUS_POLL,
    DEFAULT_STATUS_TIMEOUT, DEFAULT_TRANSITION_SETTLE, MIN_STATUS_POLL, MODE_PROFILE_POSITION,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

fn default_mode() -> u8 {
    MODE_PROFILE_POSITION
}

fn default_denominator() -> u32 {
    1
}

fn ms(d: Duration) -> u64 {
    d.as_millis() as u64
}

/// Main configuration loaded from `servo_drive.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriveConfig {
    /// Shared logging and naming settings.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Backend selection.
    pub transport: TransportConfig,

    /// Settle delays.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Motion parameters for the demo sequence.
    #[serde(default)]
    pub motion: MotionConfig,
}

impl DriveConfig {
    /// Validate the configuration.
    ///
    /// # Validation Rules
    /// 1. `shared.service_name` not empty
    /// 2. Simulation `description` path not empty
    /// 3. Hardware `ifname` not empty
    /// 4. Gear ratio numerator and denominator > 0
    /// 5. `timing.status_timeout_ms` > 0
    /// 6. `timing.status_poll_ms` > 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        match &self.transport {
            TransportConfig::Simulation { description } => {
                if description.as_os_str().is_empty() {
                    return Err(ConfigError::ValidationError(
                        "simulation description path cannot be empty".to_string(),
                    ));
                }
            }
            TransportConfig::Hardware { ifname, .. } => {
                if ifname.is_empty() {
                    return Err(ConfigError::ValidationError(
                        "hardware ifname cannot be empty".to_string(),
                    ));
                }
            }
        }

        if let Some(ratio) = &self.motion.gear_ratio {
            if ratio.numerator == 0 || ratio.denominator == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "gear ratio must be positive, got {}/{}",
                    ratio.numerator, ratio.denominator
                )));
            }
        }

        if self.timing.status_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "status_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.timing.status_poll_ms == 0 {
            return Err(ConfigError::ValidationError(
                "status_poll_ms must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Backend the drive session is built on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransportConfig {
    /// In-memory object dictionary seeded from a device description.
    Simulation {
        /// Path to the device-description (ESI) XML file.
        description: PathBuf,
    },
    /// Physical drive behind a fieldbus master.
    Hardware {
        /// Network interface the master opens.
        ifname: String,
        /// Device position on the network.
        #[serde(default)]
        position: u16,
    },
}

/// Settle delays in milliseconds, as written in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay after each enable-sequence write.
    pub transition_ms: u64,
    /// Delay after a mode write.
    pub mode_ms: u64,
    /// Delay after the start-motion write.
    pub motion_ms: u64,
    /// Delay after a digital-output write.
    pub io_ms: u64,
    /// Status-word polling interval for verified enabling.
    pub status_poll_ms: u64,
    /// Upper bound for verified enabling.
    pub status_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::from(Timing::default())
    }
}

impl From<Timing> for TimingConfig {
    fn from(t: Timing) -> Self {
        Self {
            transition_ms: ms(t.transition),
            mode_ms: ms(t.mode),
            motion_ms: ms(t.motion),
            io_ms: ms(t.io),
            status_poll_ms: ms(t.status_poll),
            status_timeout_ms: ms(t.status_timeout),
        }
    }
}

impl From<TimingConfig> for Timing {
    fn from(c: TimingConfig) -> Self {
        Self {
            transition: Duration::from_millis(c.transition_ms),
            mode: Duration::from_millis(c.mode_ms),
            motion: Duration::from_millis(c.motion_ms),
            io: Duration::from_millis(c.io_ms),
            status_poll: Duration::from_millis(c.status_poll_ms),
            status_timeout: Duration::from_millis(c.status_timeout_ms),
        }
    }
}

/// Settle delays used by a drive session.
///
/// Delays are blocking sleeps. Their values are tunable and carry no
/// correctness weight; ordering of the writes does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// After each enable-sequence control-word write.
    pub transition: Duration,
    /// After a mode-of-operation write.
    pub mode: Duration,
    /// After the start-motion write.
    pub motion: Duration,
    /// After a digital-output write.
    pub io: Duration,
    /// Status-word polling interval.
    pub status_poll: Duration,
    /// Verified-enabling upper bound.
    pub status_timeout: Duration,
}

impl Timing {
    /// No settle delays. Status polling keeps the minimum interval and the
    /// default timeout. Meant for tests.
    pub const fn none() -> Self {
        Self {
            transition: Duration::ZERO,
            mode: Duration::ZERO,
            motion: Duration::ZERO,
            io: Duration::ZERO,
            status_poll: MIN_STATUS_POLL,
            status_timeout: DEFAULT_STATUS_TIMEOUT,
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            transition: DEFAULT_TRANSITION_SETTLE,
            mode: DEFAULT_MODE_SETTLE,
            motion: DEFAULT_MOTION_SETTLE,
            io: DEFAULT_IO_SETTLE,
            status_poll: DEFAULT_STATUS_POLL,
            status_timeout: DEFAULT_STATUS_TIMEOUT,
        }
    }
}

/// Motion parameters for the demo sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Mode of operation code (1 = profile position).
    #[serde(default = "default_mode")]
    pub mode: u8,
    /// Output-side target position.
    #[serde(default)]
    pub target_position: i32,
    /// Optional target velocity.
    #[serde(default)]
    pub target_velocity: Option<i32>,
    /// Optional gearbox between motor and output.
    #[serde(default)]
    pub gear_ratio: Option<GearRatioConfig>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            target_position: 0,
            target_velocity: None,
            gear_ratio: None,
        }
    }
}

/// Gear ratio as a fraction (motor revolutions per output revolution).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GearRatioConfig {
    /// Numerator.
    pub numerator: u32,
    /// Denominator, defaults to 1.
    #[serde(default = "default_denominator")]
    pub denominator: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;

    #[test]
    fn parse_simulation_config() {
        let config = DriveConfig::from_toml(
            r#"
[transport]
kind = "simulation"
description = "servo.xml"

[motion]
target_position = 10000
gear_ratio = { numerator = 30 }
"#,
        )
        .unwrap();

        assert_eq!(
            config.transport,
            TransportConfig::Simulation {
                description: PathBuf::from("servo.xml")
            }
        );
        assert_eq!(config.motion.mode, MODE_PROFILE_POSITION);
        assert_eq!(
            config.motion.gear_ratio,
            Some(GearRatioConfig {
                numerator: 30,
                denominator: 1
            })
        );
        assert_eq!(config.timing, TimingConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_hardware_config() {
        let config = DriveConfig::from_toml(
            r#"
[shared]
service_name = "bench"
log_level = "debug"

[transport]
kind = "hardware"
ifname = "eth0"

[timing]
transition_ms = 20
"#,
        )
        .unwrap();

        assert_eq!(
            config.transport,
            TransportConfig::Hardware {
                ifname: "eth0".to_string(),
                position: 0
            }
        );
        let timing = Timing::from(config.timing);
        assert_eq!(timing.transition, Duration::from_millis(20));
        assert_eq!(timing.mode, DEFAULT_MODE_SETTLE);
    }

    #[test]
    fn reject_unknown_transport_kind() {
        let result = DriveConfig::from_toml(
            r#"
[transport]
kind = "carrier-pigeon"
"#,
        );
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn validate_rejects_zero_gear_ratio() {
        let mut config = DriveConfig::from_toml(
            r#"
[transport]
kind = "hardware"
ifname = "eth0"
"#,
        )
        .unwrap();
        config.motion.gear_ratio = Some(GearRatioConfig {
            numerator: 0,
            denominator: 1,
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn validate_rejects_empty_ifname() {
        let config = DriveConfig {
            shared: SharedConfig::default(),
            transport: TransportConfig::Hardware {
                ifname: String::new(),
                position: 0,
            },
            timing: TimingConfig::default(),
            motion: MotionConfig::default(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_status_poll() {
        let mut config = DriveConfig::from_toml(
            r#"
[transport]
kind = "simulation"
description = "servo.xml"

[timing]
status_poll_ms = 0
status_timeout_ms = 200
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(msg)) if msg.contains("status_poll_ms")
        ));

        config.timing.status_poll_ms = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn timing_none_keeps_timeout() {
        let t = Timing::none();
        assert_eq!(t.transition, Duration::ZERO);
        assert_eq!(t.status_poll, MIN_STATUS_POLL);
        assert!(!t.status_poll.is_zero());
        assert_eq!(t.status_timeout, DEFAULT_STATUS_TIMEOUT);
    }
}
