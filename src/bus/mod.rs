use crate::{
    bus::memory::Ram,
    error::{Error, Result},
};

pub mod memory;

/// Byte-addressable store with bounds-checked accesses
pub trait Addressable {
    fn capacity(&self) -> usize;

    /// Fails with `Error::OutOfBounds` past `capacity`
    fn read_byte(&self, address: usize) -> Result<u8>;

    /// Fails with `Error::OutOfBounds` past `capacity`
    fn write_byte(&mut self, address: usize, data: u8) -> Result<()>;

    /// Sets every cell to zero
    fn clear(&mut self);
}

/// Built-in 4x5 hexadecimal digit glyphs, 0 through F
pub const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Main memory as seen by the CPU
pub struct Bus {
    mem: Ram,
}

impl Bus {
    /// Font glyphs live below the program region
    pub const FONT_START: u16 = 0x050;
    pub const GLYPH_SIZE: u16 = 5;

    /// Wraps `mem` and writes the font table into it
    pub fn new(mut mem: Ram) -> Self {
        let start = Self::FONT_START as usize;

        mem[start..start + FONT.len()].copy_from_slice(&FONT);

        Self { mem }
    }

    pub fn read_byte(&self, addr: usize) -> Result<u8> {
        self.mem.read_byte(addr)
    }

    /// Reads a big-endian word; both bytes must be in range
    pub fn read_word(&self, addr: u16) -> Result<u16> {
        let hi = self.mem.read_byte(addr as usize)?;
        let lo = self.mem.read_byte(addr as usize + 1)?;

        Ok(u16::from_be_bytes([hi, lo]))
    }

    pub fn write_byte(&mut self, addr: usize, data: u8) -> Result<()> {
        self.mem.write_byte(addr, data)
    }

    /// Copies `bytes` into memory starting at `start`
    pub fn load(&mut self, start: u16, bytes: &[u8]) -> Result<()> {
        let start = start as usize;
        let end = start + bytes.len();
        let capacity = self.mem.capacity();

        if end > capacity {
            return Err(Error::OutOfBounds { address: usize::max(start, capacity), capacity });
        }

        self.mem[start..end].copy_from_slice(bytes);

        Ok(())
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(Ram::default())
    }
}
