//! Transport implementations.
//!
//! - [`hardware`] - Physical drive behind an external fieldbus master
//! - [`simulation`] - In-memory object dictionary seeded from a device description
//!
//! Both implement `servo_common::transport::Transport`; the backend is chosen
//! by the caller and injected into `DriveSession`, see [`from_config`].

pub mod hardware;
pub mod simulation;

use servo_common::drive_config::TransportConfig;
use servo_common::transport::{DriveError, Transport};
use std::sync::Arc;
use tracing::info;

use self::hardware::{FieldbusMaster, HardwareTransport};
use self::simulation::{DescriptionCache, SimulatedTransport};

/// Build the transport selected by `config`.
///
/// `master` supplies the fieldbus master for the hardware backend; it is only
/// invoked when the configuration selects hardware.
///
/// # Errors
/// Returns `DriveError::TransportUnavailable` if hardware is selected and no
/// master can be provided.
pub fn from_config<F>(
    config: &TransportConfig,
    cache: &Arc<DescriptionCache>,
    master: F,
) -> Result<Box<dyn Transport>, DriveError>
where
    F: FnOnce() -> Result<Box<dyn FieldbusMaster>, DriveError>,
{
    match config {
        TransportConfig::Simulation { description } => {
            info!("Using simulated transport ({})", description.display());
            Ok(Box::new(SimulatedTransport::from_file(
                description,
                Arc::clone(cache),
            )))
        }
        TransportConfig::Hardware { ifname, position } => {
            info!("Using hardware transport on {} (position {})", ifname, position);
            Ok(Box::new(HardwareTransport::new(
                master()?,
                ifname.clone(),
                *position,
            )))
        }
    }
}
