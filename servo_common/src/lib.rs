//! Servo Common Library
//!
//! Shared register model, CiA-402 word types, the transport trait and
//! configuration loading for the servo drive workspace.
//!
//! # Module Structure
//!
//! - [`register`] - Register descriptors and byte-width handling
//! - [`consts`] - Fixed register map, control-word values, output masks
//! - [`cia402`] - Status/control word decoding and operation modes
//! - [`transport`] - `Transport` trait and `DriveError`
//! - [`config`] - Configuration loading traits and types
//! - [`drive_config`] - Drive session configuration (`servo_drive.toml`)
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use servo_common::prelude::*;
//!
//! assert_eq!(CONTROL_WORD.index, 0x6040);
//! assert_eq!(Width::U16.mask(), 0xFFFF);
//! ```

pub mod cia402;
pub mod config;
pub mod consts;
pub mod drive_config;
pub mod prelude;
pub mod register;
pub mod transport;
