use std::ops::{Index, IndexMut, Range};

use crate::{bus::Addressable, error::{Error, Result}};

/// Fixed-capacity byte store
pub struct Memory<const N: usize>([u8; N]);

/// Chip-8 RAM
pub type Ram = Memory<0x1000>;

impl<const N: usize> Memory<N> {
    pub const SIZE: usize = N;

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    fn check(address: usize) -> Result<usize> {
        if address < N {
            Ok(address)
        } else {
            Err(Error::OutOfBounds { address, capacity: N })
        }
    }
}

impl<const N: usize> Default for Memory<N> {
    fn default() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> Addressable for Memory<N> {
    fn capacity(&self) -> usize {
        N
    }

    fn read_byte(&self, address: usize) -> Result<u8> {
        Ok(self.0[Self::check(address)?])
    }

    fn write_byte(&mut self, address: usize, data: u8) -> Result<()> {
        self.0[Self::check(address)?] = data;
        Ok(())
    }

    fn clear(&mut self) {
        self.0.fill(0);
    }
}

impl<const N: usize> Index<Range<usize>> for Memory<N> {
    type Output = [u8];

    fn index(&self, index: Range<usize>) -> &Self::Output {
        &self.0[index.start..index.end]
    }
}

impl<const N: usize> IndexMut<Range<usize>> for Memory<N> {
    fn index_mut(&mut self, index: Range<usize>) -> &mut Self::Output {
        &mut self.0[index.start..index.end]
    }
}

impl<const N: usize> Index<usize> for Memory<N> {
    type Output = u8;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}
