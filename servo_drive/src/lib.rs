//! # Servo Drive Library
//!
//! CiA-402 drive session over an object-dictionary transport.
//!
//! The same control-word sequences run against a physical drive (through a
//! fieldbus master) or against an in-memory dictionary seeded from a
//! device-description file.
//!
//! # Module Structure
//!
//! - [`register_store`] - `(index, subindex)` → value storage
//! - [`transports`] - Hardware and simulated `Transport` implementations
//! - [`session`] - `DriveSession` lifecycle and typed register access
//! - [`state_machine`] - CiA-402 enable sequence and mode selection
//! - [`motion`] - Targets, gear scaling, motion trigger
//! - [`digital_io`] - Brake release and controller enable outputs
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        DriveSession<T>                       │
//! │   state_machine ─┐   motion ─┐   digital_io ─┐               │
//! │                  ▼           ▼               ▼               │
//! │              typed read/write (Register, Width)              │
//! │                           │                                  │
//! │                           ▼                                  │
//! │                  ┌────────────────┐                          │
//! │                  │ Transport trait│                          │
//! │                  └───────┬────────┘                          │
//! │            ┌─────────────┴──────────────┐                    │
//! │   HardwareTransport<M>          SimulatedTransport           │
//! │   (FieldbusMaster)              (RegisterStore + ESI)        │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod digital_io;
pub mod motion;
pub mod register_store;
pub mod session;
pub mod state_machine;
pub mod transports;

// Re-export key types for convenience
pub use crate::motion::GearRatio;
pub use crate::register_store::RegisterStore;
pub use crate::session::{DriveSession, RegisterSnapshot};
pub use crate::transports::hardware::{
    FieldbusMaster, HardwareTransport, MasterError, NetworkState,
};
pub use crate::transports::simulation::{DescriptionCache, DeviceDefaults, SimulatedTransport};
