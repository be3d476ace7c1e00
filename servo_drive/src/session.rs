//! Drive session lifecycle and typed register access.
//!
//! A `DriveSession` exclusively owns one transport. It is created closed;
//! `open()` establishes the transport and `close()` releases it. Release is
//! guaranteed on every exit path: [`DriveSession::run`] closes after the
//! closure returns (with or without error) and `Drop` closes whatever is
//! still open, including during unwinding.
//!
//! Sessions are single-threaded and provide no internal locking.

use servo_common::consts::REGISTER_MAP;
use servo_common::drive_config::Timing;
use servo_common::register::{Register, Width};
use servo_common::transport::{DriveError, Transport};
use std::time::Duration;
use tracing::{debug, info};

/// Session with a single drive.
pub struct DriveSession<T: Transport> {
    transport: T,
    timing: Timing,
}

/// Value of one register captured by [`DriveSession::dump_registers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSnapshot {
    /// Register read.
    pub register: Register,
    /// Value, or the failure reported for this register alone.
    pub value: Result<u32, DriveError>,
}

impl<T: Transport> DriveSession<T> {
    /// Create a closed session with default settle times.
    pub fn new(transport: T) -> Self {
        Self::with_timing(transport, Timing::default())
    }

    /// Create a closed session with explicit settle times.
    pub fn with_timing(transport: T, timing: Timing) -> Self {
        Self { transport, timing }
    }

    /// Settle times in use.
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Owned transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Owned transport, mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Whether the transport is open.
    pub fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    /// Open the transport. Opening an open session is a no-op.
    ///
    /// # Errors
    /// Transport failures (`TransportUnavailable`, `DescriptionParse`); the
    /// session stays closed.
    pub fn open(&mut self) -> Result<(), DriveError> {
        if self.transport.is_open() {
            debug!("Session already open ({})", self.transport.name());
            return Ok(());
        }
        self.transport.open()?;
        info!("Drive session opened ({})", self.transport.name());
        Ok(())
    }

    /// Release the transport. Closing a closed session is a no-op.
    pub fn close(&mut self) {
        if self.transport.is_open() {
            self.transport.close();
            info!("Drive session closed ({})", self.transport.name());
        }
    }

    /// Open, run `f`, and close regardless of `f`'s outcome.
    pub fn run<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, DriveError>,
    ) -> Result<R, DriveError> {
        self.open()?;
        let result = f(self);
        self.close();
        result
    }

    /// Write a well-known register.
    pub fn write_register(&mut self, register: &Register, value: u32) -> Result<(), DriveError> {
        self.write_raw(register.index, register.subindex, value, register.width)
    }

    /// Read a well-known register.
    pub fn read_register(&mut self, register: &Register) -> Result<u32, DriveError> {
        self.read_raw(register.index, register.subindex, register.width)
    }

    /// Write any register.
    pub fn write_raw(
        &mut self,
        index: u16,
        subindex: u8,
        value: u32,
        width: Width,
    ) -> Result<(), DriveError> {
        debug!(
            "write 0x{:04X}:{} = 0x{:X} ({} bytes)",
            index,
            subindex,
            width.truncate(value),
            width.bytes()
        );
        self.transport.write(index, subindex, value, width)
    }

    /// Read any register.
    pub fn read_raw(&mut self, index: u16, subindex: u8, width: Width) -> Result<u32, DriveError> {
        let value = self.transport.read(index, subindex, width)?;
        debug!("read 0x{:04X}:{} = 0x{:X}", index, subindex, value);
        Ok(value)
    }

    /// Read every register of the fixed map. A failing register does not
    /// stop the dump.
    pub fn dump_registers(&mut self) -> Vec<RegisterSnapshot> {
        REGISTER_MAP
            .iter()
            .map(|register| RegisterSnapshot {
                register: *register,
                value: self.read_register(register),
            })
            .collect()
    }

    /// Blocking settle delay.
    pub(crate) fn settle(&self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

impl<T: Transport> Drop for DriveSession<T> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::register_store::RegisterStore;
    use servo_common::consts::{ACTUAL_POSITION, DIGITAL_OUTPUTS, TARGET_POSITION};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Register access observed by [`RecordingTransport`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Access {
        Write(u16, u8, u32, Width),
        Read(u16, u8, Width),
    }

    /// In-memory transport recording every access, with optional read failures.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingTransport {
        pub store: RegisterStore,
        pub opened: bool,
        pub fail_reads: Vec<(u16, u8)>,
        pub log: Rc<RefCell<Vec<Access>>>,
        pub closes: Rc<RefCell<usize>>,
    }

    impl RecordingTransport {
        pub fn writes_to(&self, index: u16, subindex: u8) -> Vec<u32> {
            self.log
                .borrow()
                .iter()
                .filter_map(|a| match a {
                    Access::Write(i, s, v, _) if *i == index && *s == subindex => Some(*v),
                    _ => None,
                })
                .collect()
        }
    }

    impl Transport for RecordingTransport {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn open(&mut self) -> Result<(), DriveError> {
            self.opened = true;
            Ok(())
        }

        fn close(&mut self) {
            self.opened = false;
            *self.closes.borrow_mut() += 1;
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
            self.log
                .borrow_mut()
                .push(Access::Write(index, subindex, value, width));
            self.store.write(index, subindex, value, width);
            Ok(())
        }

        fn read(&mut self, index: u16, subindex: u8, width: Width) -> Result<u32, DriveError> {
            self.log
                .borrow_mut()
                .push(Access::Read(index, subindex, width));
            if self.fail_reads.contains(&(index, subindex)) {
                return Err(DriveError::access(index, subindex, "injected failure"));
            }
            Ok(self.store.read(index, subindex, width))
        }
    }

    pub(crate) fn open_session() -> DriveSession<RecordingTransport> {
        let mut session = DriveSession::with_timing(RecordingTransport::default(), Timing::none());
        session.open().unwrap();
        session
    }

    #[test]
    fn session_starts_closed() {
        let session = DriveSession::new(RecordingTransport::default());
        assert!(!session.is_open());
        assert_eq!(session.timing(), &Timing::default());
    }

    #[test]
    fn close_without_open_is_noop() {
        let closes = Rc::new(RefCell::new(0));
        let transport = RecordingTransport {
            closes: Rc::clone(&closes),
            ..RecordingTransport::default()
        };
        let mut session = DriveSession::new(transport);
        session.close();
        session.close();
        drop(session);
        assert_eq!(*closes.borrow(), 0);
    }

    #[test]
    fn run_closes_on_error() {
        let closes = Rc::new(RefCell::new(0));
        let transport = RecordingTransport {
            closes: Rc::clone(&closes),
            ..RecordingTransport::default()
        };
        let mut session = DriveSession::with_timing(transport, Timing::none());
        let result: Result<(), DriveError> = session.run(|s| {
            s.write_register(&TARGET_POSITION, 5)?;
            Err(DriveError::access(0x6064, 0, "boom"))
        });
        assert!(result.is_err());
        assert!(!session.is_open());
        assert_eq!(*closes.borrow(), 1);
    }

    #[test]
    fn drop_closes_open_session() {
        let closes = Rc::new(RefCell::new(0));
        let transport = RecordingTransport {
            closes: Rc::clone(&closes),
            ..RecordingTransport::default()
        };
        {
            let mut session = DriveSession::new(transport);
            session.open().unwrap();
        }
        assert_eq!(*closes.borrow(), 1);
    }

    #[test]
    fn typed_access_uses_register_width() {
        let mut session = open_session();
        session.write_register(&DIGITAL_OUTPUTS, 0x1FF).unwrap();
        assert_eq!(session.read_register(&DIGITAL_OUTPUTS).unwrap(), 0xFF);
        assert_eq!(
            session.transport().log.borrow()[0],
            Access::Write(0x60FE, 1, 0x1FF, Width::U8)
        );
    }

    #[test]
    fn dump_reports_per_register_failures() {
        let mut session = open_session();
        session.transport_mut().fail_reads.push(ACTUAL_POSITION.address());
        session.write_register(&TARGET_POSITION, 77).unwrap();

        let dump = session.dump_registers();
        assert_eq!(dump.len(), REGISTER_MAP.len());
        let target = dump.iter().find(|s| s.register == TARGET_POSITION).unwrap();
        assert_eq!(target.value, Ok(77));
        let actual = dump.iter().find(|s| s.register == ACTUAL_POSITION).unwrap();
        assert!(actual.value.is_err());
    }
}
