//! Simulated transport implementation.
//!
//! The `SimulatedTransport` implements the `Transport` trait on top of a
//! `RegisterStore`. Besides plain storage it models the drive reactions the
//! session relies on:
//!
//! - Control Word writes move the Status Word to the requested CiA-402 state
//! - A Control Word write with the new-set-point bit copies Target Position
//!   into Actual Position (instantaneous motion, no ramp)
//! - Mode of Operation writes are mirrored into Mode of Operation Display

use super::description::{DescriptionCache, DeviceDefaults};
use crate::register_store::RegisterStore;
use servo_common::cia402::{ControlWord, DriveState};
use servo_common::consts::{
    ACTUAL_POSITION, CONTROL_WORD, MODE_OF_OPERATION, MODE_OF_OPERATION_DISPLAY, STATUS_WORD,
    TARGET_POSITION,
};
use servo_common::register::{Register, Width};
use servo_common::transport::{DriveError, Transport};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Where the simulator's initial register values come from.
#[derive(Debug, Clone)]
enum DefaultsSource {
    /// ESI file resolved through a shared cache at `open()`.
    File {
        path: PathBuf,
        cache: Arc<DescriptionCache>,
    },
    /// Already parsed defaults.
    Loaded(Arc<DeviceDefaults>),
}

/// In-memory CiA-402 drive.
#[derive(Debug)]
pub struct SimulatedTransport {
    source: DefaultsSource,
    store: RegisterStore,
    opened: bool,
}

impl SimulatedTransport {
    /// Simulator seeded from an ESI file, parsed through `cache`.
    pub fn from_file(path: impl AsRef<Path>, cache: Arc<DescriptionCache>) -> Self {
        Self::with_source(DefaultsSource::File {
            path: path.as_ref().to_path_buf(),
            cache,
        })
    }

    /// Simulator seeded from already parsed defaults.
    pub fn with_defaults(defaults: Arc<DeviceDefaults>) -> Self {
        Self::with_source(DefaultsSource::Loaded(defaults))
    }

    fn with_source(source: DefaultsSource) -> Self {
        Self {
            source,
            store: RegisterStore::new(),
            opened: false,
        }
    }

    /// Current register contents.
    pub fn store(&self) -> &RegisterStore {
        &self.store
    }

    fn resolve_defaults(&self) -> Result<Arc<DeviceDefaults>, DriveError> {
        match &self.source {
            DefaultsSource::File { path, cache } => cache.load(path),
            DefaultsSource::Loaded(defaults) => Ok(Arc::clone(defaults)),
        }
    }

    fn set(&mut self, reg: &Register, value: u32) {
        self.store.write(reg.index, reg.subindex, value, reg.width);
    }

    fn get(&self, reg: &Register) -> u32 {
        self.store.read(reg.index, reg.subindex, reg.width)
    }

    /// Drive-side reaction to a completed write.
    fn react(&mut self, index: u16, subindex: u8, value: u32) {
        match (index, subindex) {
            addr if addr == CONTROL_WORD.address() => {
                let control = CONTROL_WORD.width.truncate(value) as u16;
                if let Some(state) = DriveState::requested_by(control) {
                    trace!("Simulated drive now {}", state);
                    self.set(&STATUS_WORD, u32::from(state.status_bits()));
                }
                if ControlWord::from_bits_retain(control).contains(ControlWord::NEW_SET_POINT) {
                    let target = self.get(&TARGET_POSITION);
                    debug!("Simulated motion to {}", target as i32);
                    self.set(&ACTUAL_POSITION, target);
                }
            }
            addr if addr == MODE_OF_OPERATION.address() => {
                self.set(&MODE_OF_OPERATION_DISPLAY, value);
            }
            _ => {}
        }
    }
}

impl Transport for SimulatedTransport {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn open(&mut self) -> Result<(), DriveError> {
        let defaults = self.resolve_defaults()?;
        self.store.seed(defaults.iter());
        self.opened = true;
        info!(
            "Simulated drive opened with {} default registers",
            defaults.len()
        );
        Ok(())
    }

    fn close(&mut self) {
        if self.opened {
            self.opened = false;
            info!("Simulated drive closed");
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
        self.store.write(index, subindex, value, width);
        self.react(index, subindex, value);
        Ok(())
    }

    fn read(&mut self, index: u16, subindex: u8, width: Width) -> Result<u32, DriveError> {
        if !self.opened {
            return Err(DriveError::NotOpen);
        }
        Ok(self.store.read(index, subindex, width))
    }
}
