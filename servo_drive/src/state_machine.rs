//! CiA-402 power-state sequencing.
//!
//! `enable_operation()` writes the Control Word `0x06 → 0x07 → 0x0F` with a
//! settle delay after each write. It does not confirm the transitions; the
//! Status Word is only consulted by the diagnostic readers below and by the
//! opt-in `enable_operation_verified()`.

use crate::session::DriveSession;
use servo_common::cia402::{DriveState, OperationMode, StatusWord};
use servo_common::consts::{
    CONTROL_WORD, ENABLE_SEQUENCE, MIN_STATUS_POLL, MODE_OF_OPERATION, MODE_OF_OPERATION_DISPLAY,
    STATUS_WORD,
};
use servo_common::transport::{DriveError, Transport};
use std::time::Instant;
use tracing::{debug, info};

impl<T: Transport> DriveSession<T> {
    /// Bring the drive to "operation enabled" (shutdown, switch on, enable
    /// operation), assuming each transition succeeds.
    pub fn enable_operation(&mut self) -> Result<(), DriveError> {
        for control in ENABLE_SEQUENCE {
            self.write_register(&CONTROL_WORD, u32::from(control))?;
            self.settle(self.timing().transition);
        }
        info!("Enable-operation sequence issued");
        Ok(())
    }

    /// Issue the enable sequence, then poll the Status Word until it reports
    /// "operation enabled".
    ///
    /// # Errors
    /// `TransitionTimeout` if the state is not reached within
    /// `timing.status_timeout`; register failures as usual.
    pub fn enable_operation_verified(&mut self) -> Result<StatusWord, DriveError> {
        self.enable_operation()?;
        self.wait_for_state(DriveState::OperationEnabled)
    }

    /// Poll the Status Word until it decodes as `expected`.
    ///
    /// Polls are at least `MIN_STATUS_POLL` apart, whatever the configured
    /// interval.
    pub fn wait_for_state(&mut self, expected: DriveState) -> Result<StatusWord, DriveError> {
        let deadline = Instant::now() + self.timing().status_timeout;
        let interval = self.timing().status_poll.max(MIN_STATUS_POLL);
        loop {
            let status = self.read_status_word()?;
            if status.state() == expected {
                debug!("Drive reached {}", expected);
                return Ok(status);
            }
            if Instant::now() >= deadline {
                return Err(DriveError::TransitionTimeout {
                    expected,
                    status: status.bits(),
                });
            }
            self.settle(interval);
        }
    }

    /// Write the Mode of Operation. The code is not validated.
    pub fn set_mode(&mut self, mode: impl Into<u8>) -> Result<(), DriveError> {
        let code = mode.into();
        debug!("Set mode of operation {:?}", OperationMode::from(code));
        self.write_register(&MODE_OF_OPERATION, u32::from(code))?;
        self.settle(self.timing().mode);
        Ok(())
    }

    /// Mode the drive reports as active.
    pub fn read_mode_display(&mut self) -> Result<OperationMode, DriveError> {
        let code = self.read_register(&MODE_OF_OPERATION_DISPLAY)?;
        Ok(OperationMode::from(code as u8))
    }

    /// Current Status Word.
    pub fn read_status_word(&mut self) -> Result<StatusWord, DriveError> {
        let raw = self.read_register(&STATUS_WORD)?;
        Ok(StatusWord::from_bits_retain(raw as u16))
    }

    /// Power state decoded from the Status Word.
    pub fn drive_state(&mut self) -> Result<DriveState, DriveError> {
        Ok(self.read_status_word()?.state())
    }

    /// Fault bit of the Status Word.
    pub fn is_faulted(&mut self) -> Result<bool, DriveError> {
        Ok(self.read_status_word()?.is_faulted())
    }
}

#[cfg(test)]
mod tests {
    use crate::session::DriveSession;
    use crate::session::tests::{Access, RecordingTransport, open_session};
    use servo_common::cia402::{DriveState, OperationMode};
    use servo_common::consts::{CW_ENABLE_OPERATION, CW_SHUTDOWN, CW_SWITCH_ON};
    use servo_common::drive_config::Timing;
    use servo_common::register::Width;
    use servo_common::transport::DriveError;
    use std::time::Duration;

    #[test]
    fn enable_operation_writes_ordered_sequence() {
        let mut session = open_session();
        session.enable_operation().unwrap();

        let log = session.transport().log.borrow().clone();
        assert_eq!(
            log,
            vec![
                Access::Write(0x6040, 0, 0x06, Width::U16),
                Access::Write(0x6040, 0, 0x07, Width::U16),
                Access::Write(0x6040, 0, 0x0F, Width::U16),
            ]
        );
        assert_eq!(
            session.transport().writes_to(0x6040, 0),
            vec![
                u32::from(CW_SHUTDOWN),
                u32::from(CW_SWITCH_ON),
                u32::from(CW_ENABLE_OPERATION)
            ]
        );
    }

    #[test]
    fn set_mode_writes_single_byte_unchecked() {
        let mut session = open_session();
        session.set_mode(1u8).unwrap();
        session.set_mode(OperationMode::Other(0xEE)).unwrap();
        assert_eq!(
            session.transport().log.borrow().as_slice(),
            &[
                Access::Write(0x6060, 0, 1, Width::U8),
                Access::Write(0x6060, 0, 0xEE, Width::U8),
            ]
        );
    }

    #[test]
    fn status_word_diagnostics() {
        let mut session = open_session();
        session.write_raw(0x6041, 0, 0x0218, Width::U16).unwrap();
        assert!(session.is_faulted().unwrap());
        assert_eq!(session.drive_state().unwrap(), DriveState::Fault);

        session.write_raw(0x6061, 0, 1, Width::U8).unwrap();
        assert_eq!(
            session.read_mode_display().unwrap(),
            OperationMode::ProfilePosition
        );
    }

    #[test]
    fn verified_enable_times_out_without_status_confirmation() {
        let timing = Timing {
            status_poll: Duration::from_millis(1),
            status_timeout: Duration::from_millis(20),
            ..Timing::none()
        };
        let mut session = DriveSession::with_timing(RecordingTransport::default(), timing);
        session.open().unwrap();

        let err = session.enable_operation_verified().unwrap_err();
        assert_eq!(
            err,
            DriveError::TransitionTimeout {
                expected: DriveState::OperationEnabled,
                status: 0,
            }
        );
        assert_eq!(
            session.transport().writes_to(0x6040, 0),
            vec![0x06, 0x07, 0x0F]
        );
    }

    #[test]
    fn zero_poll_interval_still_paces_status_reads() {
        let timing = Timing {
            status_poll: Duration::ZERO,
            status_timeout: Duration::from_millis(20),
            ..Timing::none()
        };
        let mut session = DriveSession::with_timing(RecordingTransport::default(), timing);
        session.open().unwrap();
        session.write_raw(0x6041, 0, 0x0250, Width::U16).unwrap();

        let err = session.wait_for_state(DriveState::OperationEnabled).unwrap_err();
        assert_eq!(
            err,
            DriveError::TransitionTimeout {
                expected: DriveState::OperationEnabled,
                status: 0x0250,
            }
        );
        let reads = session
            .transport()
            .log
            .borrow()
            .iter()
            .filter(|a| matches!(a, Access::Read(0x6041, 0, _)))
            .count();
        assert!(reads <= 22, "{reads} status reads within 20 ms");
    }

    #[test]
    fn verified_enable_accepts_confirmed_state() {
        let mut session = open_session();
        session.write_raw(0x6041, 0, 0x0237, Width::U16).unwrap();
        let status = session.enable_operation_verified().unwrap();
        assert_eq!(status.state(), DriveState::OperationEnabled);
    }
}
