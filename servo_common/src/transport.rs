//! Transport trait and error types.
//!
//! This module defines:
//! - `Transport` trait - Register-oriented request/response access to a drive
//! - `DriveError` enum - Error types for drive session operations
//! - `RegisterRead` - Outcome of a best-effort read with a documented default

use crate::cia402::DriveState;
use crate::config::ConfigError;
use crate::register::Width;
use thiserror::Error;

/// Error types for drive session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriveError {
    /// Device network could not be opened, too few devices answered, or the
    /// operational state was not confirmed.
    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),

    /// A single register read or write did not complete.
    #[error("Register access 0x{index:04X}:{subindex} failed: {reason}")]
    RegisterAccess {
        /// Object index
        index: u16,
        /// Object subindex
        subindex: u8,
        /// Failure reported by the transport
        reason: String,
    },

    /// Register access attempted on a closed session.
    #[error("Drive session is not open")]
    NotOpen,

    /// Device-description resource could not be read or parsed.
    #[error("Device description parse error: {0}")]
    DescriptionParse(String),

    /// Status Word did not confirm the requested state in time.
    #[error("Drive did not reach {expected} (status word 0x{status:04X})")]
    TransitionTimeout {
        /// State the sequence was driving towards
        expected: DriveState,
        /// Last Status Word observed
        status: u16,
    },

    /// Gear-scaled target does not fit the 32-bit position register.
    #[error("Position {value} does not fit a 32-bit register")]
    PositionOverflow {
        /// Unrepresentable motor-side value
        value: i64,
    },

    /// Gear ratio is not a positive value.
    #[error("Invalid gear ratio: {0}")]
    InvalidGearRatio(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DriveError {
    /// Build a `RegisterAccess` error.
    pub fn access(index: u16, subindex: u8, reason: impl Into<String>) -> Self {
        Self::RegisterAccess {
            index,
            subindex,
            reason: reason.into(),
        }
    }
}

impl From<ConfigError> for DriveError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

/// Outcome of a read performed under the default-on-read-failure policy.
///
/// Digital-output helpers must not abort on a failed pre-write read; they
/// continue from a fixed default and keep the failure for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterRead {
    /// Read completed.
    Value(u32),
    /// Read failed; `default` stands in for the register value.
    Defaulted {
        /// Substituted value
        default: u32,
        /// Failure that triggered the substitution
        error: DriveError,
    },
}

impl RegisterRead {
    /// Default substituted for a failed read.
    pub const DEFAULT: u32 = 0;

    /// Apply the default-on-read-failure policy to a read result.
    pub fn or_default(result: Result<u32, DriveError>) -> Self {
        match result {
            Ok(value) => Self::Value(value),
            Err(error) => Self::Defaulted {
                default: Self::DEFAULT,
                error,
            },
        }
    }

    /// Value to continue with.
    pub fn value(&self) -> u32 {
        match self {
            Self::Value(v) => *v,
            Self::Defaulted { default, .. } => *default,
        }
    }

    /// True if the default was substituted.
    pub fn is_defaulted(&self) -> bool {
        matches!(self, Self::Defaulted { .. })
    }
}

/// Trait defining register access to a drive.
///
/// A drive session owns exactly one transport. Two implementations exist:
/// the hardware transport (delegating to a fieldbus master) and the
/// simulated transport (an in-memory register store seeded from a
/// device description).
///
/// # Lifecycle
///
/// 1. `open()` - Establish the channel (or seed the simulated store)
/// 2. `read()` / `write()` - Synchronous register access
/// 3. `close()` - Release the channel; no-op if not open
///
/// # Contract
///
/// - `write(i, s, v, w)` transmits `v` truncated to `w` bytes, little-endian
/// - `read(i, s, w)` returns the value zero-extended from `w` bytes
/// - Every call blocks until the exchange completes
/// - A failed `open()` leaves the transport closed
pub trait Transport {
    /// Returns the transport's identifier (e.g., "simulation", "hardware").
    fn name(&self) -> &'static str;

    /// Open the transport.
    ///
    /// # Errors
    /// `TransportUnavailable` when the device network cannot be established,
    /// `DescriptionParse` when simulator defaults cannot be loaded.
    fn open(&mut self) -> Result<(), DriveError>;

    /// Release the transport. Calling this on a closed transport is a no-op.
    fn close(&mut self);

    /// Whether `open()` succeeded and `close()` has not been called since.
    fn is_open(&self) -> bool;

    /// Write `value` truncated to `width` bytes.
    fn write(&mut self, index: u16, subindex: u8, value: u32, width: Width)
    -> Result<(), DriveError>;

    /// Read a value of `width` bytes, zero-extended.
    fn read(&mut self, index: u16, subindex: u8, width: Width) -> Result<u32, DriveError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn open(&mut self) -> Result<(), DriveError> {
        (**self).open()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn write(
        &mut self,
        index: u16,
        subindex: u8,
        value: u32,
        width: Width,
    ) -> Result<(), DriveError> {
        (**self).write(index, subindex, value, width)
    }

    fn read(&mut self, index: u16, subindex: u8, width: Width) -> Result<u32, DriveError> {
        (**self).read(index, subindex, width)
    }
}
