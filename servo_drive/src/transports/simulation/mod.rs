//! Simulated transport module.
//!
//! An in-memory CiA-402 object dictionary for development and testing
//! without a physical drive. Initial register values come from the
//! device-description (ESI) file.

mod description;
mod transport;

pub use description::{DescriptionCache, DeviceDefaults};
pub use transport::SimulatedTransport;
