//! CiA-402 device-profile words.
//!
//! Bit layouts of the Control Word (0x6040) and Status Word (0x6041), the
//! power states decoded from the Status Word, and operation-mode codes.
//!
//! | Bit | Status Word           | Control Word           |
//! |-----|-----------------------|------------------------|
//! | 0   | Ready to switch on    | Switch on              |
//! | 1   | Switched on           | Enable voltage         |
//! | 2   | Operation enabled     | Quick stop             |
//! | 3   | Fault                 | Enable operation       |
//! | 4   | Voltage enabled       | New set-point          |
//! | 5   | Quick stop            | Change set immediately |
//! | 6   | Switch on disabled    | Absolute/relative      |
//! | 7   | Warning               | Fault reset            |
//! | 8   | Manufacturer specific | Halt                   |
//! | 9   | Remote                | Change on set-point    |
//! | 10  | Target reached        | reserved               |
//! | 11  | Internal limit active | Manufacturer specific  |
//! | 12  | Set-point acknowledge | Manufacturer specific  |

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Status Word bits (0x6041).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatusWord: u16 {
        /// Ready to switch on.
        const READY_TO_SWITCH_ON    = 0x0001;
        /// Switched on.
        const SWITCHED_ON           = 0x0002;
        /// Operation enabled.
        const OPERATION_ENABLED     = 0x0004;
        /// Fault.
        const FAULT                 = 0x0008;
        /// Voltage enabled.
        const VOLTAGE_ENABLED       = 0x0010;
        /// Quick stop (active low).
        const QUICK_STOP            = 0x0020;
        /// Switch on disabled.
        const SWITCH_ON_DISABLED    = 0x0040;
        /// Warning.
        const WARNING               = 0x0080;
        /// Remote.
        const REMOTE                = 0x0200;
        /// Target reached.
        const TARGET_REACHED        = 0x0400;
        /// Internal limit active.
        const INTERNAL_LIMIT        = 0x0800;
        /// Set-point acknowledge (profile position mode).
        const SET_POINT_ACK         = 0x1000;
    }
}

bitflags! {
    /// Control Word bits (0x6040).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ControlWord: u16 {
        /// Switch on.
        const SWITCH_ON             = 0x0001;
        /// Enable voltage.
        const ENABLE_VOLTAGE        = 0x0002;
        /// Quick stop (active low).
        const QUICK_STOP            = 0x0004;
        /// Enable operation.
        const ENABLE_OPERATION      = 0x0008;
        /// New set-point (profile position mode).
        const NEW_SET_POINT         = 0x0010;
        /// Change set immediately (profile position mode).
        const CHANGE_IMMEDIATELY    = 0x0020;
        /// Relative target (profile position mode).
        const RELATIVE              = 0x0040;
        /// Fault reset.
        const FAULT_RESET           = 0x0080;
        /// Halt.
        const HALT                  = 0x0100;
    }
}

/// Power state of a CiA-402 drive, observed through the Status Word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriveState {
    /// Not ready to switch on.
    NotReadyToSwitchOn,
    /// Switch on disabled.
    SwitchOnDisabled,
    /// Ready to switch on.
    ReadyToSwitchOn,
    /// Switched on.
    SwitchedOn,
    /// Operation enabled.
    OperationEnabled,
    /// Quick stop active.
    QuickStopActive,
    /// Fault reaction active.
    FaultReactionActive,
    /// Fault.
    Fault,
    /// Bit pattern matches no CiA-402 state.
    Unknown,
}

impl DriveState {
    /// Decode the power state from a raw Status Word.
    pub const fn from_status(raw: u16) -> Self {
        match (raw & 0x4F, raw & 0x6F) {
            (0x00, _) => Self::NotReadyToSwitchOn,
            (0x40, _) => Self::SwitchOnDisabled,
            (_, 0x21) => Self::ReadyToSwitchOn,
            (_, 0x23) => Self::SwitchedOn,
            (_, 0x27) => Self::OperationEnabled,
            (_, 0x07) => Self::QuickStopActive,
            (0x0F, _) => Self::FaultReactionActive,
            (0x08, _) => Self::Fault,
            _ => Self::Unknown,
        }
    }

    /// State the drive ends up in after accepting `control`, assuming the
    /// transition is legal from the current state.
    ///
    /// Returns `None` for control words that do not request a power state.
    pub const fn requested_by(control: u16) -> Option<Self> {
        if control & 0x0080 != 0 {
            return Some(Self::SwitchOnDisabled);
        }
        match control & 0x0F {
            0x06 | 0x0E => Some(Self::ReadyToSwitchOn),
            0x07 => Some(Self::SwitchedOn),
            0x0F => Some(Self::OperationEnabled),
            0x02 | 0x03 | 0x0A | 0x0B => Some(Self::QuickStopActive),
            0x00 | 0x01 | 0x04 | 0x05 | 0x08 | 0x09 | 0x0C | 0x0D => {
                Some(Self::SwitchOnDisabled)
            }
            _ => None,
        }
    }

    /// Canonical Status Word bits for this state (voltage enabled and remote
    /// flags set where the state implies them).
    pub const fn status_bits(self) -> u16 {
        match self {
            Self::NotReadyToSwitchOn => 0x0000,
            Self::SwitchOnDisabled => 0x0240,
            Self::ReadyToSwitchOn => 0x0221,
            Self::SwitchedOn => 0x0233,
            Self::OperationEnabled => 0x0237,
            Self::QuickStopActive => 0x0217,
            Self::FaultReactionActive => 0x021F,
            Self::Fault => 0x0208,
            Self::Unknown => 0x0000,
        }
    }
}

impl fmt::Display for DriveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotReadyToSwitchOn => "not ready to switch on",
            Self::SwitchOnDisabled => "switch on disabled",
            Self::ReadyToSwitchOn => "ready to switch on",
            Self::SwitchedOn => "switched on",
            Self::OperationEnabled => "operation enabled",
            Self::QuickStopActive => "quick stop active",
            Self::FaultReactionActive => "fault reaction active",
            Self::Fault => "fault",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

impl StatusWord {
    /// Decoded power state.
    #[inline]
    pub const fn state(self) -> DriveState {
        DriveState::from_status(self.bits())
    }

    /// Fault bit (0x08) set.
    #[inline]
    pub const fn is_faulted(self) -> bool {
        self.contains(Self::FAULT)
    }
}

/// Mode of Operation (0x6060) code.
///
/// Codes this layer does not know are carried through as `Other` so the
/// device decides whether they are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationMode {
    /// No mode.
    Off,
    /// Profile position (1).
    ProfilePosition,
    /// Velocity (2).
    Velocity,
    /// Profile velocity (3).
    ProfileVelocity,
    /// Profile torque (4).
    ProfileTorque,
    /// Homing (6).
    Homing,
    /// Interpolated position (7).
    InterpolatedPosition,
    /// Cyclic synchronous position (8).
    SynchronousPosition,
    /// Cyclic synchronous velocity (9).
    SynchronousVelocity,
    /// Cyclic synchronous torque (10).
    SynchronousTorque,
    /// Any other code, passed through unchecked.
    Other(u8),
}

impl From<u8> for OperationMode {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Off,
            1 => Self::ProfilePosition,
            2 => Self::Velocity,
            3 => Self::ProfileVelocity,
            4 => Self::ProfileTorque,
            6 => Self::Homing,
            7 => Self::InterpolatedPosition,
            8 => Self::SynchronousPosition,
            9 => Self::SynchronousVelocity,
            10 => Self::SynchronousTorque,
            other => Self::Other(other),
        }
    }
}

impl From<OperationMode> for u8 {
    fn from(mode: OperationMode) -> Self {
        match mode {
            OperationMode::Off => 0,
            OperationMode::ProfilePosition => 1,
            OperationMode::Velocity => 2,
            OperationMode::ProfileVelocity => 3,
            OperationMode::ProfileTorque => 4,
            OperationMode::Homing => 6,
            OperationMode::InterpolatedPosition => 7,
            OperationMode::SynchronousPosition => 8,
            OperationMode::SynchronousVelocity => 9,
            OperationMode::SynchronousTorque => 10,
            OperationMode::Other(code) => code,
        }
    }
}
