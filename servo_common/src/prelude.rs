//! Prelude module for common re-exports.
//!
//! ```rust
//! use servo_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::drive_config::{
    DriveConfig, GearRatioConfig, MotionConfig, Timing, TimingConfig, TransportConfig,
};

// ─── Register Model ─────────────────────────────────────────────────
pub use crate::consts::{
    ACTUAL_POSITION, CONTROL_WORD, DIGITAL_OUTPUTS, MODE_OF_OPERATION, MODE_OF_OPERATION_DISPLAY,
    REGISTER_MAP, STATUS_WORD, TARGET_POSITION, TARGET_VELOCITY,
};
pub use crate::register::{Register, Width};

// ─── CiA-402 ────────────────────────────────────────────────────────
pub use crate::cia402::{ControlWord, DriveState, OperationMode, StatusWord};

// ─── Transport ──────────────────────────────────────────────────────
pub use crate::transport::{DriveError, RegisterRead, Transport};
