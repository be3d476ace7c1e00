//! Fieldbus master boundary.

use std::fmt;
use thiserror::Error;

/// Errors reported by a fieldbus master.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MasterError {
    /// Network interface could not be opened or the link dropped.
    #[error("Link error: {0}")]
    Link(String),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// Device aborted an SDO transfer.
    #[error("SDO abort 0x{code:08X}: {}", describe_abort(.code))]
    SdoAbort {
        /// CiA-301 abort code
        code: u32,
    },

    /// Any other master-side failure.
    #[error("{0}")]
    Other(String),
}

/// Network (communication) state of the device network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkState {
    /// Init.
    Init,
    /// Pre-operational: mailbox communication only.
    PreOperational,
    /// Safe-operational: inputs exchanged, outputs held safe.
    SafeOperational,
    /// Operational.
    Operational,
}

impl fmt::Display for NetworkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "INIT",
            Self::PreOperational => "PRE-OP",
            Self::SafeOperational => "SAFE-OP",
            Self::Operational => "OP",
        };
        f.write_str(name)
    }
}

/// Primitives the hardware transport needs from a fieldbus master.
///
/// All calls are synchronous and block until the exchange completes.
/// `position` is the device's position on the network (0-based).
pub trait FieldbusMaster {
    /// Open the device network on `ifname`.
    fn open(&mut self, ifname: &str) -> Result<(), MasterError>;

    /// Enumerate devices, returning how many answered.
    fn config_init(&mut self) -> Result<usize, MasterError>;

    /// Complete device mapping.
    fn config_map(&mut self) -> Result<(), MasterError>;

    /// Request `state` for the whole network and return the state the
    /// network confirms.
    fn request_state(&mut self, state: NetworkState) -> Result<NetworkState, MasterError>;

    /// Write a register on the device at `position`.
    fn sdo_write(
        &mut self,
        position: u16,
        index: u16,
        subindex: u8,
        data: &[u8],
    ) -> Result<(), MasterError>;

    /// Read a register from the device at `position`.
    fn sdo_read(&mut self, position: u16, index: u16, subindex: u8)
    -> Result<Vec<u8>, MasterError>;

    /// Release the network.
    fn close(&mut self);
}

impl<M: FieldbusMaster + ?Sized> FieldbusMaster for Box<M> {
    fn open(&mut self, ifname: &str) -> Result<(), MasterError> {
        (**self).open(ifname)
    }

    fn config_init(&mut self) -> Result<usize, MasterError> {
        (**self).config_init()
    }

    fn config_map(&mut self) -> Result<(), MasterError> {
        (**self).config_map()
    }

    fn request_state(&mut self, state: NetworkState) -> Result<NetworkState, MasterError> {
        (**self).request_state(state)
    }

    fn sdo_write(
        &mut self,
        position: u16,
        index: u16,
        subindex: u8,
        data: &[u8],
    ) -> Result<(), MasterError> {
        (**self).sdo_write(position, index, subindex, data)
    }

    fn sdo_read(
        &mut self,
        position: u16,
        index: u16,
        subindex: u8,
    ) -> Result<Vec<u8>, MasterError> {
        (**self).sdo_read(position, index, subindex)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

fn describe_abort(code: &u32) -> &'static str {
    abort_code_description(*code)
}

/// Human-readable description of a CiA-301 SDO abort code.
pub fn abort_code_description(code: u32) -> &'static str {
    match code {
        0x0503_0000 => "Toggle bit not alternated",
        0x0504_0000 => "SDO protocol timed out",
        0x0504_0001 => "Client/server command specifier not valid or unknown",
        0x0504_0005 => "Out of memory",
        0x0601_0000 => "Unsupported access to an object",
        0x0601_0001 => "Attempt to read a write only object",
        0x0601_0002 => "Attempt to write a read only object",
        0x0602_0000 => "Object does not exist in the object dictionary",
        0x0607_0010 => "Data type does not match, length of service parameter does not match",
        0x0609_0011 => "Sub-index does not exist",
        0x0609_0030 => "Value range of parameter exceeded",
        0x0800_0000 => "General error",
        0x0800_0020 => "Data cannot be transferred or stored to the application",
        0x0800_0022 => {
            "Data cannot be transferred or stored to the application because of the present device state"
        }
        _ => "Unknown abort code",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_error_display() {
        let err = MasterError::SdoAbort { code: 0x0602_0000 };
        assert_eq!(
            err.to_string(),
            "SDO abort 0x06020000: Object does not exist in the object dictionary"
        );
        assert_eq!(abort_code_description(0x1234), "Unknown abort code");
    }

    #[test]
    fn network_state_display() {
        assert_eq!(NetworkState::Operational.to_string(), "OP");
        assert_eq!(NetworkState::SafeOperational.to_string(), "SAFE-OP");
    }
}
