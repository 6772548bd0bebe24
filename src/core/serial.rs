// Server-assigned object identifiers

use std::fmt;

/// 32-bit identifier assigned by the server.
///
/// Mobiles live in `0x0000_0001..0x4000_0000`, items in
/// `0x4000_0000..0x8000_0000`. Serials with the high bit set are virtual
/// (client-side only) objects.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Serial(pub u32);

impl Serial {
    pub const INVALID: Serial = Serial(0);

    const ITEM_START: u32 = 0x4000_0000;
    const VIRTUAL_BIT: u32 = 0x8000_0000;

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 > 0 && self.0 < Self::VIRTUAL_BIT
    }

    pub const fn is_mobile(self) -> bool {
        self.0 > 0 && self.0 < Self::ITEM_START
    }

    pub const fn is_item(self) -> bool {
        self.0 >= Self::ITEM_START && self.0 < Self::VIRTUAL_BIT
    }

    pub const fn is_virtual(self) -> bool {
        self.0 & Self::VIRTUAL_BIT != 0
    }
}

impl fmt::Debug for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Serial(0x{:08X})", self.0)
    }
}

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl From<u32> for Serial {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges() {
        assert!(Serial(1).is_mobile());
        assert!(!Serial(1).is_item());
        assert!(Serial(0x4000_0001).is_item());
        assert!(!Serial::INVALID.is_valid());
        assert!(Serial(0x8000_0001).is_virtual());
        assert!(!Serial(0x8000_0001).is_valid());
    }

    #[test]
    fn test_display() {
        assert_eq!(Serial(0x4000_00AB).to_string(), "0x400000AB");
    }
}
