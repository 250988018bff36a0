use crate::{
    bus::{memory::Memory, Addressable},
    error::Result,
};

const WIDTH: usize = 64;
const HEIGHT: usize = 32;

/// Monochrome frame buffer, one byte per pixel (0 = off, 1 = on)
pub struct Display(Memory<{ WIDTH * HEIGHT }>);

impl Display {
    pub const WIDTH: usize = WIDTH;
    pub const HEIGHT: usize = HEIGHT;

    pub const COLOR_WHITE: u32 = 0xFFFFFFFF;

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// Pixel at (x, y); coordinates wrap around the buffer
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.0[Self::offset(x, y)] != 0
    }

    /// XORs a lit pixel onto (x, y), wrapping coordinates.
    /// Returns true if the pixel was on and got erased.
    pub fn toggle(&mut self, x: usize, y: usize) -> Result<bool> {
        let offset = Self::offset(x, y);
        let old = self.0.read_byte(offset)?;

        self.0.write_byte(offset, old ^ 1)?;

        Ok(old != 0)
    }

    /// ARGB pixels for window-backed renderers
    pub fn to_argb(&self) -> Vec<u32> {
        self.as_slice().iter().map(|&p| if p != 0 { Self::COLOR_WHITE } else { 0 }).collect()
    }

    fn offset(x: usize, y: usize) -> usize {
        Self::WIDTH * (y % Self::HEIGHT) + (x % Self::WIDTH)
    }
}

impl Default for Display {
    fn default() -> Self {
        Self(Memory::default())
    }
}

impl Addressable for Display {
    fn capacity(&self) -> usize {
        self.0.capacity()
    }

    fn read_byte(&self, address: usize) -> Result<u8> {
        self.0.read_byte(address)
    }

    fn write_byte(&mut self, address: usize, data: u8) -> Result<()> {
        self.0.write_byte(address, data)
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}
