//! Digital output control (brake release, controller enable).
//!
//! Outputs are changed read-modify-write: the current byte is read, the mask
//! is ORed in and the result written back, so setting a bit never clears
//! another. A failed read counts as `0x00` and is logged.

use crate::session::DriveSession;
use servo_common::consts::{DIGITAL_OUTPUTS, DO_BRAKE_RELEASE, DO_CONTROLLER_ENABLE};
use servo_common::transport::{DriveError, RegisterRead, Transport};
use tracing::{debug, warn};

impl<T: Transport> DriveSession<T> {
    /// OR `mask` into the physical outputs. Returns the byte written.
    pub fn set_output_bits(&mut self, mask: u8) -> Result<u8, DriveError> {
        let current = RegisterRead::or_default(self.read_register(&DIGITAL_OUTPUTS));
        if let RegisterRead::Defaulted { default, error } = &current {
            warn!(
                "Reading {} failed ({}), assuming 0x{:02X}",
                DIGITAL_OUTPUTS, error, default
            );
        }
        let outputs = current.value() as u8 | mask;
        self.write_register(&DIGITAL_OUTPUTS, u32::from(outputs))?;
        debug!("Digital outputs 0x{:02X}", outputs);
        self.settle(self.timing().io);
        Ok(outputs)
    }

    /// Set the brake-release output.
    pub fn release_brake(&mut self) -> Result<u8, DriveError> {
        self.set_output_bits(DO_BRAKE_RELEASE)
    }

    /// Set the controller-enable outputs.
    pub fn enable_controller(&mut self) -> Result<u8, DriveError> {
        self.set_output_bits(DO_CONTROLLER_ENABLE)
    }

    /// Current physical output byte.
    pub fn read_digital_outputs(&mut self) -> Result<u8, DriveError> {
        Ok(self.read_register(&DIGITAL_OUTPUTS)? as u8)
    }
}

#[cfg(test)]
mod tests {
    use crate::session::tests::open_session;
    use servo_common::register::Width;

    #[test]
    fn brake_release_is_idempotent() {
        let mut session = open_session();
        assert_eq!(session.release_brake().unwrap(), 0x01);
        assert_eq!(session.release_brake().unwrap(), 0x01);
        assert_eq!(session.read_digital_outputs().unwrap(), 0x01);
    }

    #[test]
    fn outputs_accumulate_in_either_order() {
        let mut session = open_session();
        session.release_brake().unwrap();
        assert_eq!(session.enable_controller().unwrap(), 0x07);

        let mut session = open_session();
        session.enable_controller().unwrap();
        assert_eq!(session.release_brake().unwrap(), 0x07);
    }

    #[test]
    fn preserves_unrelated_bits() {
        let mut session = open_session();
        session.transport_mut().store.write(0x60FE, 1, 0x80, Width::U8);
        assert_eq!(session.release_brake().unwrap(), 0x81);
    }

    #[test]
    fn failed_read_assumes_zero() {
        let mut session = open_session();
        session.transport_mut().store.write(0x60FE, 1, 0x80, Width::U8);
        session.transport_mut().fail_reads.push((0x60FE, 1));
        assert_eq!(session.enable_controller().unwrap(), 0x06);
        assert_eq!(session.transport().writes_to(0x60FE, 1), vec![0x06]);
    }
}
