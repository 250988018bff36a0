use std::{mem::size_of, ops::{Index, IndexMut}};

use crate::error::{Error, Result};

pub const NUM_GPRS: usize = 16;

/// Flag register, written by carry/borrow/shift/collision results
pub const VF: usize = 15;

pub const STACK_DEPTH: usize = 16;

/// First address of the program region
pub const PROGRAM_START: u16 = 0x200;

/// Chip-8 general-purpose registers V0-VF
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gprs([u8; NUM_GPRS]);

impl Gprs {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl Default for Gprs {
    fn default() -> Self {
        Self([0; NUM_GPRS])
    }
}

impl Index<usize> for Gprs {
    type Output = u8;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for Gprs {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

/// 8-bit downcounter
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timer(u8);

impl Timer {
    pub fn counter(&mut self) -> &mut u8 {
        &mut self.0
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Decrements counter only if current counter is not 0
    pub fn decrement(&mut self) {
        self.0 = self.0.saturating_sub(1);
    }
}

/// Chip-8 register file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegFile {
    /// 12-bit program counter
    pub pc: u16,

    /// 16 8-bit general purpose registers, V0-VF
    pub gprs: Gprs,

    /// 16-bit index register
    pub index: u16,

    /// Delay and sound timers
    pub delay_timer: Timer,
    pub sound_timer: Timer,

    /// Number of return addresses on `stack`
    pub sp: u8,
    pub stack: [u16; STACK_DEPTH],

    /// Last fetched instruction word
    pub opcode: u16,
}

impl RegFile {
    pub fn advance_pc(&mut self) {
        self.pc = self.pc.wrapping_add(size_of::<u16>() as u16);
    }

    pub fn rewind_pc(&mut self) {
        self.pc = self.pc.wrapping_sub(size_of::<u16>() as u16);
    }

    /// Skips the next instruction if `cond` holds
    pub fn skip_if(&mut self, cond: bool) {
        if cond {
            self.advance_pc();
        }
    }

    /// Pushes the current pc as a return address
    pub fn push(&mut self) -> Result<()> {
        let sp = self.sp as usize;

        if sp >= STACK_DEPTH {
            return Err(Error::StackOverflow { pc: self.pc });
        }

        self.stack[sp] = self.pc;
        self.sp += 1;

        Ok(())
    }

    /// Pops a return address into the pc
    pub fn pop(&mut self) -> Result<()> {
        if self.sp == 0 {
            return Err(Error::StackUnderflow { pc: self.pc });
        }

        self.sp -= 1;
        self.pc = self.stack[self.sp as usize];

        Ok(())
    }
}

impl Default for RegFile {
    fn default() -> Self {
        Self {
            pc: PROGRAM_START,
            gprs: Gprs::default(),
            index: 0,
            delay_timer: Timer::default(),
            sound_timer: Timer::default(),
            sp: 0,
            stack: [0; STACK_DEPTH],
            opcode: 0,
        }
    }
}
