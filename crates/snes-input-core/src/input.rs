//! SNES controller input decoding.
//!
//! The input word is read as two bytes and numbered most-significant bit
//! first, so bit 0 is the top bit of the first byte:
//!
//! ```text
//!  byte 0      byte 1
//!  0 1 2 3 4-7  8 9 10 11 12 13 14 15
//!  A X L R ---- B Y Sl St Up Dn Lt Rt
//! ```

use serde::Serialize;
use std::fmt;

use crate::{Error, Result};

/// Memory region read by a GetAddress request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion {
    /// Address in the bridge's address space (WRAM starts at 0xF50000).
    pub address: u32,
    /// Number of bytes to read.
    pub length: usize,
}

impl MemoryRegion {
    pub const fn new(address: u32, length: usize) -> Self {
        Self { address, length }
    }

    /// GetAddress operands: address and length as bare uppercase hex.
    pub fn operands(&self) -> Vec<String> {
        vec![format!("{:X}", self.address), format!("{:X}", self.length)]
    }
}

/// Controller 1 input word in Super Metroid (WRAM $7E:008B).
///
/// Other titles keep their input state elsewhere and need a different address.
pub const CONTROLLER_1_INPUT: MemoryRegion = MemoryRegion::new(0xF5_008B, 2);

/// Named controller button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    A,
    X,
    L,
    R,
    B,
    Y,
    Select,
    Start,
    Up,
    Down,
    Left,
    Right,
}

impl Button {
    /// Returns the label shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            Button::A => "A",
            Button::X => "X",
            Button::L => "L",
            Button::R => "R",
            Button::B => "B",
            Button::Y => "Y",
            Button::Select => "Select",
            Button::Start => "Start",
            Button::Up => "Up",
            Button::Down => "Down",
            Button::Left => "Left",
            Button::Right => "Right",
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bit index to button. Bits 4-7 are unused.
pub const BUTTON_BITS: [(usize, Button); 12] = [
    (0, Button::A),
    (1, Button::X),
    (2, Button::L),
    (3, Button::R),
    (8, Button::B),
    (9, Button::Y),
    (10, Button::Select),
    (11, Button::Start),
    (12, Button::Up),
    (13, Button::Down),
    (14, Button::Left),
    (15, Button::Right),
];

/// Number of bytes in the input word.
pub const INPUT_SIZE: usize = 2;

/// One decoded read of the controller input word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputSnapshot {
    raw: u16,
}

impl InputSnapshot {
    /// Creates a snapshot from the two bytes returned by GetAddress.
    pub fn from_bytes(bytes: [u8; INPUT_SIZE]) -> Self {
        Self {
            raw: u16::from_be_bytes(bytes),
        }
    }

    /// Returns the raw word with bit 0 as the most significant bit.
    pub fn raw(&self) -> u16 {
        self.raw
    }

    /// Returns whether bit `index` (0-15, MSB first) is set.
    pub fn bit(&self, index: usize) -> bool {
        index < 16 && self.raw & (0x8000 >> index) != 0
    }

    /// Returns all 16 flags in bit order.
    pub fn flags(&self) -> [bool; 16] {
        let mut flags = [false; 16];
        for (index, flag) in flags.iter_mut().enumerate() {
            *flag = self.bit(index);
        }
        flags
    }

    /// Returns whether a button is held.
    pub fn is_pressed(&self, button: Button) -> bool {
        BUTTON_BITS
            .iter()
            .find(|(_, b)| *b == button)
            .is_some_and(|(index, _)| self.bit(*index))
    }

    /// Iterates held buttons in bit order.
    pub fn pressed(&self) -> impl Iterator<Item = Button> + '_ {
        BUTTON_BITS
            .iter()
            .filter(|(index, _)| self.bit(*index))
            .map(|(_, button)| *button)
    }
}

impl TryFrom<&[u8]> for InputSnapshot {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; INPUT_SIZE] = bytes.try_into().map_err(|_| Error::ReadLength {
            expected: INPUT_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self::from_bytes(bytes))
    }
}

/// Decodes a 2-byte input word into 16 flags, bit 0 first.
pub fn decode_inputs(bytes: [u8; INPUT_SIZE]) -> [bool; 16] {
    InputSnapshot::from_bytes(bytes).flags()
}
