//! Hardware transport implementation.

use super::master::{FieldbusMaster, NetworkState};
use servo_common::register::Width;
use servo_common::transport::{DriveError, Transport};
use tracing::{debug, info, warn};

/// Transport to a physical drive at `position` on the network behind `ifname`.
pub struct HardwareTransport<M: FieldbusMaster> {
    master: M,
    ifname: String,
    position: u16,
    opened: bool,
}

impl<M: FieldbusMaster> HardwareTransport<M> {
    /// Create a closed hardware transport.
    pub fn new(master: M, ifname: impl Into<String>, position: u16) -> Self {
        Self {
            master,
            ifname: ifname.into(),
            position,
            opened: false,
        }
    }

    /// Underlying master.
    pub fn master(&self) -> &M {
        &self.master
    }

    /// Device position on the network.
    pub fn position(&self) -> u16 {
        self.position
    }

    /// Enumerate, map and bring the network to OP.
    fn bring_up(&mut self) -> Result<(), DriveError> {
        let found = self
            .master
            .config_init()
            .map_err(|e| DriveError::TransportUnavailable(e.to_string()))?;
        if found <= usize::from(self.position) {
            return Err(DriveError::TransportUnavailable(format!(
                "Not enough devices found: {} (need position {})",
                found, self.position
            )));
        }
        debug!("{} device(s) found on {}", found, self.ifname);

        self.master
            .config_map()
            .map_err(|e| DriveError::TransportUnavailable(e.to_string()))?;

        let state = self
            .master
            .request_state(NetworkState::Operational)
            .map_err(|e| DriveError::TransportUnavailable(e.to_string()))?;
        if state != NetworkState::Operational {
            return Err(DriveError::TransportUnavailable(format!(
                "Unable to enter OP state (network reports {state})"
            )));
        }
        Ok(())
    }
}

impl<M: FieldbusMaster> Transport for HardwareTransport<M> {
    fn name(&self) -> &'static str {
        "hardware"
    }

    fn open(&mut self) -> Result<(), DriveError> {
        if self.opened {
            return Ok(());
        }
        info!("Opening device network on {}", self.ifname);
        self.master
            .open(&self.ifname)
            .map_err(|e| DriveError::TransportUnavailable(e.to_string()))?;

        if let Err(e) = self.bring_up() {
            warn!("Device network bring-up failed: {}", e);
            self.master.close();
            return Err(e);
        }

        self.opened = true;
        info!(
            "Device network operational, drive at position {}",
            self.position
        );
        Ok(())
    }

    fn close(&mut self) {
        if self.opened {
            self.master.close();
            self.opened = false;
            info!("Device network on {} closed", self.ifname);
        }
    }

    fn is_open(&self) -> bool {
        self.opened
    }

    fn write(
        &mut self,
        index: u16,
        subindex: u8,
        value: u32,
        width: Width,
    ) -> Result<(), DriveError> {
        if !self.opened {
            return Err(DriveError::NotOpen);
        }
        self.master
            .sdo_write(self.position, index, subindex, &width.encode(value))
            .map_err(|e| DriveError::access(index, subindex, e.to_string()))
    }

    fn read(&mut self, index: u16, subindex: u8, width: Width) -> Result<u32, DriveError> {
        if !self.opened {
            return Err(DriveError::NotOpen);
        }
        let buf = self
            .master
            .sdo_read(self.position, index, subindex)
            .map_err(|e| DriveError::access(index, subindex, e.to_string()))?;
        Ok(width.decode(&buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transports::hardware::MasterError;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeMaster {
        devices: usize,
        confirmed: Option<NetworkState>,
        open_calls: usize,
        close_calls: usize,
        writes: Vec<(u16, u16, u8, Vec<u8>)>,
        registers: HashMap<(u16, u8), Vec<u8>>,
    }

    impl FieldbusMaster for FakeMaster {
        fn open(&mut self, _ifname: &str) -> Result<(), MasterError> {
            self.open_calls += 1;
            Ok(())
        }

        fn config_init(&mut self) -> Result<usize, MasterError> {
            Ok(self.devices)
        }

        fn config_map(&mut self) -> Result<(), MasterError> {
            Ok(())
        }

        fn request_state(&mut self, state: NetworkState) -> Result<NetworkState, MasterError> {
            Ok(self.confirmed.unwrap_or(state))
        }

        fn sdo_write(
            &mut self,
            position: u16,
            index: u16,
            subindex: u8,
            data: &[u8],
        ) -> Result<(), MasterError> {
            self.writes.push((position, index, subindex, data.to_vec()));
            Ok(())
        }

        fn sdo_read(
            &mut self,
            _position: u16,
            index: u16,
            subindex: u8,
        ) -> Result<Vec<u8>, MasterError> {
            self.registers
                .get(&(index, subindex))
                .cloned()
                .ok_or(MasterError::SdoAbort { code: 0x0602_0000 })
        }

        fn close(&mut self) {
            self.close_calls += 1;
        }
    }

    fn master(devices: usize) -> FakeMaster {
        FakeMaster {
            devices,
            ..FakeMaster::default()
        }
    }

    #[test]
    fn write_encodes_little_endian_with_width() {
        let mut hw = HardwareTransport::new(master(1), "eth0", 0);
        hw.open().unwrap();
        hw.write(0x1234, 0x56, 0x789A, Width::U16).unwrap();
        assert_eq!(hw.master().writes, vec![(0, 0x1234, 0x56, vec![0x9A, 0x78])]);
    }

    #[test]
    fn read_decodes_little_endian() {
        let mut m = master(1);
        m.registers.insert((0x1234, 0), vec![0x34, 0x12]);
        let mut hw = HardwareTransport::new(m, "eth0", 0);
        hw.open().unwrap();
        assert_eq!(hw.read(0x1234, 0, Width::U16).unwrap(), 0x1234);
    }

    #[test]
    fn read_failure_is_register_access_error() {
        let mut hw = HardwareTransport::new(master(1), "eth0", 0);
        hw.open().unwrap();
        let err = hw.read(0x60FE, 1, Width::U8).unwrap_err();
        assert!(matches!(
            err,
            DriveError::RegisterAccess {
                index: 0x60FE,
                subindex: 1,
                ..
            }
        ));
    }

    #[test]
    fn too_few_devices_leaves_transport_closed() {
        let mut hw = HardwareTransport::new(master(1), "eth0", 1);
        let err = hw.open().unwrap_err();
        assert!(matches!(err, DriveError::TransportUnavailable(_)));
        assert!(!hw.is_open());
        assert_eq!(hw.master().close_calls, 1);
        assert_eq!(
            hw.write(0x6040, 0, 0x06, Width::U16),
            Err(DriveError::NotOpen)
        );
    }

    #[test]
    fn unconfirmed_op_state_fails_open() {
        let mut m = master(1);
        m.confirmed = Some(NetworkState::SafeOperational);
        let mut hw = HardwareTransport::new(m, "eth0", 0);
        let err = hw.open().unwrap_err();
        assert!(err.to_string().contains("SAFE-OP"));
        assert!(!hw.is_open());
    }

    #[test]
    fn close_is_idempotent() {
        let mut hw = HardwareTransport::new(master(2), "eth0", 1);
        hw.close();
        assert_eq!(hw.master().close_calls, 0);

        hw.open().unwrap();
        hw.open().unwrap();
        assert_eq!(hw.master().open_calls, 1);

        hw.close();
        hw.close();
        assert_eq!(hw.master().close_calls, 1);
        assert!(!hw.is_open());
    }
}
