//! Register map and CiA-402 constants.
//!
//! The fixed set of object-dictionary entries the drive session uses, the
//! control-word values issued by the state machine, and the digital-output
//! masks used by the I/O helpers.

use crate::register::{Register, Width};
use std::time::Duration;

/// Canonical service name (used for logging).
pub const SERVO_SERVICE_NAME: &str = "servo_drive";

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "/etc/servo/servo_drive.toml";

// ─── Register Map ───────────────────────────────────────────────────

/// Control Word (0x6040:0).
pub const CONTROL_WORD: Register = Register::new(0x6040, 0, Width::U16, "controlword");
/// Status Word (0x6041:0).
pub const STATUS_WORD: Register = Register::new(0x6041, 0, Width::U16, "statusword");
/// Mode of Operation (0x6060:0).
pub const MODE_OF_OPERATION: Register = Register::new(0x6060, 0, Width::U8, "op_mode");
/// Mode of Operation Display (0x6061:0).
pub const MODE_OF_OPERATION_DISPLAY: Register =
    Register::new(0x6061, 0, Width::U8, "op_mode_display");
/// Target Position (0x607A:0).
pub const TARGET_POSITION: Register = Register::new(0x607A, 0, Width::U32, "target_position");
/// Target Velocity (0x60FF:0).
pub const TARGET_VELOCITY: Register = Register::new(0x60FF, 0, Width::U32, "target_velocity");
/// Actual Position (0x6064:0).
pub const ACTUAL_POSITION: Register = Register::new(0x6064, 0, Width::U32, "actual_position");
/// Digital Outputs, physical outputs (0x60FE:1).
pub const DIGITAL_OUTPUTS: Register = Register::new(0x60FE, 1, Width::U8, "physical_outputs");

/// Every register of the fixed map, in object-dictionary order of use.
pub const REGISTER_MAP: [Register; 8] = [
    CONTROL_WORD,
    STATUS_WORD,
    MODE_OF_OPERATION,
    MODE_OF_OPERATION_DISPLAY,
    TARGET_POSITION,
    TARGET_VELOCITY,
    ACTUAL_POSITION,
    DIGITAL_OUTPUTS,
];

/// Returns true if `index` belongs to the fixed register map.
pub fn is_mapped_index(index: u16) -> bool {
    REGISTER_MAP.iter().any(|r| r.index == index)
}

// ─── Control Word Values ────────────────────────────────────────────

/// Shutdown: enable voltage + quick stop.
pub const CW_SHUTDOWN: u16 = 0x06;
/// Switch on: shutdown bits + switch on.
pub const CW_SWITCH_ON: u16 = 0x07;
/// Enable operation: switch-on bits + enable operation.
pub const CW_ENABLE_OPERATION: u16 = 0x0F;
/// Start motion: enable-operation bits + new set-point + change set immediately.
pub const CW_START_MOTION: u16 = 0x3F;

/// Enable sequence written to the Control Word, in order.
pub const ENABLE_SEQUENCE: [u16; 3] = [CW_SHUTDOWN, CW_SWITCH_ON, CW_ENABLE_OPERATION];

// ─── Digital Output Masks ───────────────────────────────────────────

/// Brake release bit.
pub const DO_BRAKE_RELEASE: u8 = 0x01;
/// Controller enable bits ("Fw" bit 1 + "Fb" bit 2).
pub const DO_CONTROLLER_ENABLE: u8 = 0x06;

// ─── Operation Modes ────────────────────────────────────────────────

/// Profile position mode code.
pub const MODE_PROFILE_POSITION: u8 = 1;

// ─── Default Settle Times ───────────────────────────────────────────

/// Delay after each enable-sequence control-word write.
pub const DEFAULT_TRANSITION_SETTLE: Duration = Duration::from_millis(100);
/// Delay after a mode-of-operation write.
pub const DEFAULT_MODE_SETTLE: Duration = Duration::from_millis(50);
/// Delay after the start-motion write.
pub const DEFAULT_MOTION_SETTLE: Duration = Duration::from_millis(50);
/// Delay after a digital-output write.
pub const DEFAULT_IO_SETTLE: Duration = Duration::from_millis(50);
/// Interval between status-word polls during verified enabling.
pub const DEFAULT_STATUS_POLL: Duration = Duration::from_millis(10);
/// Shortest status-word polling interval; every poll is a register read.
pub const MIN_STATUS_POLL: Duration = Duration::from_millis(1);
/// Upper bound for verified enabling.
pub const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_millis(1000);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_map_widths() {
        assert_eq!(CONTROL_WORD.width, Width::U16);
        assert_eq!(STATUS_WORD.width, Width::U16);
        assert_eq!(MODE_OF_OPERATION.width, Width::U8);
        assert_eq!(TARGET_POSITION.width, Width::U32);
        assert_eq!(TARGET_VELOCITY.width, Width::U32);
        assert_eq!(ACTUAL_POSITION.width, Width::U32);
        assert_eq!(DIGITAL_OUTPUTS.address(), (0x60FE, 1));
    }

    #[test]
    fn start_motion_keeps_enable_bits() {
        assert_eq!(CW_START_MOTION & CW_ENABLE_OPERATION, CW_ENABLE_OPERATION);
    }

    #[test]
    fn mapped_indices() {
        assert!(is_mapped_index(0x6064));
        assert!(is_mapped_index(0x60FE));
        assert!(!is_mapped_index(0x1000));
    }
}
