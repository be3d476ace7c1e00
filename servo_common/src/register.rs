//! Object-dictionary register model.
//!
//! A register is addressed by `(index, subindex)` and carries an unsigned
//! value of 1, 2 or 4 bytes, transmitted little-endian.

use std::fmt;

/// Byte width of a register value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Width {
    /// 1 byte (UNSIGNED8 / INTEGER8).
    U8 = 1,
    /// 2 bytes (UNSIGNED16 / INTEGER16).
    U16 = 2,
    /// 4 bytes (UNSIGNED32 / INTEGER32).
    U32 = 4,
}

impl Width {
    /// Number of bytes on the wire.
    #[inline]
    pub const fn bytes(self) -> usize {
        self as usize
    }

    /// Value mask for this width.
    #[inline]
    pub const fn mask(self) -> u32 {
        match self {
            Self::U8 => 0xFF,
            Self::U16 => 0xFFFF,
            Self::U32 => 0xFFFF_FFFF,
        }
    }

    /// Truncate `value` to this width.
    #[inline]
    pub const fn truncate(self, value: u32) -> u32 {
        value & self.mask()
    }

    /// Little-endian encoding of `value`, truncated to this width.
    pub fn encode(self, value: u32) -> Vec<u8> {
        value.to_le_bytes()[..self.bytes()].to_vec()
    }

    /// Zero-extend a little-endian buffer into a value.
    ///
    /// Bytes beyond the width are ignored; a short buffer yields the value
    /// of the bytes it does contain.
    pub fn decode(self, buf: &[u8]) -> u32 {
        let mut raw = [0u8; 4];
        let n = buf.len().min(self.bytes());
        raw[..n].copy_from_slice(&buf[..n]);
        u32::from_le_bytes(raw)
    }
}

/// Descriptor of a well-known register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register {
    /// Object index.
    pub index: u16,
    /// Object subindex.
    pub subindex: u8,
    /// Value width.
    pub width: Width,
    /// Human-readable name.
    pub name: &'static str,
}

impl Register {
    /// Create a register descriptor.
    pub const fn new(index: u16, subindex: u8, width: Width, name: &'static str) -> Self {
        Self {
            index,
            subindex,
            width,
            name,
        }
    }

    /// `(index, subindex)` key.
    #[inline]
    pub const fn address(&self) -> (u16, u8) {
        (self.index, self.subindex)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:04X}:{})", self.name, self.index, self.subindex)
    }
}
