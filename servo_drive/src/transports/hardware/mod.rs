//! Hardware transport module.
//!
//! Register access to a physical drive through an external fieldbus master.
//! The master itself (frame exchange, mailbox handling, network state
//! machine) lives outside this crate and is reached through the
//! [`FieldbusMaster`] trait.

mod master;
mod transport;

pub use master::{FieldbusMaster, MasterError, NetworkState, abort_code_description};
pub use transport::HardwareTransport;
