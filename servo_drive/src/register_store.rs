//! Backend-agnostic register storage.

use servo_common::register::Width;
use std::collections::HashMap;

/// Mapping from `(index, subindex)` to a stored unsigned value.
///
/// Values are truncated to the width they are written with; reads
/// zero-extend from the requested width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterStore {
    values: HashMap<(u16, u8), u32>,
}

impl RegisterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` truncated to `width`.
    pub fn write(&mut self, index: u16, subindex: u8, value: u32, width: Width) {
        self.values.insert((index, subindex), width.truncate(value));
    }

    /// Value masked to `width`, or `None` if never written.
    pub fn get(&self, index: u16, subindex: u8, width: Width) -> Option<u32> {
        self.values
            .get(&(index, subindex))
            .map(|v| width.truncate(*v))
    }

    /// Value masked to `width`, 0 if never written.
    pub fn read(&self, index: u16, subindex: u8, width: Width) -> u32 {
        self.get(index, subindex, width).unwrap_or(0)
    }

    /// Overwrite entries with `defaults`, leaving other entries untouched.
    pub fn seed<'a>(&mut self, defaults: impl IntoIterator<Item = (&'a (u16, u8), &'a u32)>) {
        for (key, value) in defaults {
            self.values.insert(*key, *value);
        }
    }

    /// Number of stored registers.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
