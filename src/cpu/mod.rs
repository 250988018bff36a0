use crate::{
    bus::{Addressable, Bus},
    cpu::{opcode::Opcode, regfile::{RegFile, VF}},
    display::Display,
    error::{Error, Result},
    keypad::KeyInput,
    Config,
};

use rand::{rngs::StdRng, Rng, SeedableRng};

use std::{rc::Rc, cell::RefCell};

pub mod opcode;
pub mod regfile;

type OpcodeHandler = fn(&mut Cpu, Opcode) -> Result<Option<CpuEvent>>;

/// Conditions a driver may want to react to after a step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CpuEvent {
    /// A sprite was drawn
    Draw,
    /// Fx0A found no key pressed; the same instruction runs again next step
    WaitForKey,
    /// Nothing was executed for `opcode` at `pc`
    UnknownInstruction { opcode: u16, pc: u16 },
}

pub struct Cpu {
    bus: Bus,
    display: Rc<RefCell<Display>>,
    keypad: Rc<RefCell<dyn KeyInput>>,
    regfile: RegFile,
    rng: StdRng,
    strict: bool,
    fault: Option<Error>,
}

impl Cpu {
    /// Handlers indexed by the top nibble of the opcode
    const GROUPS: [OpcodeHandler; 16] = [
        Cpu::group_0,
        Cpu::jp,
        Cpu::call,
        Cpu::se_imm,
        Cpu::sne_imm,
        Cpu::se_reg,
        Cpu::ldv,
        Cpu::add_imm,
        Cpu::group_8,
        Cpu::sne_reg,
        Cpu::ldi,
        Cpu::jp_v0,
        Cpu::rnd,
        Cpu::drw,
        Cpu::group_e,
        Cpu::group_f,
    ];

    pub fn new(bus: Bus, display: Rc<RefCell<Display>>, keypad: Rc<RefCell<dyn KeyInput>>, config: &Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            bus,
            display,
            keypad,
            regfile: RegFile::default(),
            rng,
            strict: config.strict,
            fault: None,
        }
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn regfile(&self) -> &RegFile {
        &self.regfile
    }

    /// Fault that halted the CPU, if any
    pub fn fault(&self) -> Option<Error> {
        self.fault
    }

    /// Clears processor state and any latched fault. Memory is left alone.
    pub fn reset(&mut self) {
        self.regfile = RegFile::default();
        self.fault = None;

        log::debug!("CPU reset, pc={:04X}", self.regfile.pc);
    }

    /// Executes a single Chip-8 instruction
    ///
    /// Fatal errors halt the CPU: every later call returns the same error until `reset`.
    pub fn step(&mut self) -> Result<Option<CpuEvent>> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }

        let result = self.fetch().and_then(|opcode| self.execute(opcode));

        if let Err(err) = result {
            log::error!("CPU halted: {}", err);
            self.fault = Some(err);
        }

        result
    }

    /// Decrements delay and sound timers, meant to be called at 60 Hz
    pub fn tick_timers(&mut self) {
        self.regfile.delay_timer.decrement();
        self.regfile.sound_timer.decrement();
    }

    fn fetch(&mut self) -> Result<Opcode> {
        let word = self.bus.read_word(self.regfile.pc)?;

        self.regfile.opcode = word;
        self.regfile.advance_pc();

        Ok(Opcode::new(word))
    }

    fn execute(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        log::trace!(
            "{:04X} {:04X} v{:02X?} i{:04X} sp{}",
            self.regfile.pc.wrapping_sub(2), opcode.raw(), self.regfile.gprs.as_slice(), self.regfile.index, self.regfile.sp,
        );

        Self::GROUPS[opcode.group()](self, opcode)
    }

    // --- Secondary dispatch

    fn group_0(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        match opcode.n() {
            0x0 => self.cls(opcode),
            0xE => self.ret(opcode),
            _ => self.unknown(opcode),
        }
    }

    fn group_8(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        match opcode.n() {
            0x0 => self.ld_reg(opcode),
            0x1 => self.or(opcode),
            0x2 => self.and(opcode),
            0x3 => self.xor(opcode),
            0x4 => self.add_reg(opcode),
            0x5 => self.sub(opcode),
            0x6 => self.shr(opcode),
            0x7 => self.subn(opcode),
            0xE => self.shl(opcode),
            _ => self.unknown(opcode),
        }
    }

    fn group_e(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        match opcode.kk() {
            0x9E => self.skp(opcode),
            0xA1 => self.sknp(opcode),
            _ => self.unknown(opcode),
        }
    }

    fn group_f(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        match opcode.kk() {
            0x07 => self.ld_vx_dt(opcode),
            0x0A => self.ld_vx_key(opcode),
            0x15 => self.ld_dt_vx(opcode),
            0x18 => self.ld_st_vx(opcode),
            0x1E => self.add_i(opcode),
            0x29 => self.ld_font(opcode),
            0x33 => self.bcd(opcode),
            0x55 => self.store(opcode),
            0x65 => self.load(opcode),
            _ => self.unknown(opcode),
        }
    }

    /// Reports an opcode with no handler and leaves all state untouched
    fn unknown(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        let pc = self.regfile.pc.wrapping_sub(2);

        if self.strict {
            return Err(Error::UnknownInstruction { opcode: opcode.raw(), pc });
        }

        log::warn!("Unknown instruction {:04X} at {:04X}", opcode.raw(), pc);

        Ok(Some(CpuEvent::UnknownInstruction { opcode: opcode.raw(), pc }))
    }

    // --- Control flow

    /// Clears screen
    fn cls(&mut self, _opcode: Opcode) -> Result<Option<CpuEvent>> {
        self.display.borrow_mut().clear();

        Ok(None)
    }

    /// Returns from subroutine
    fn ret(&mut self, _opcode: Opcode) -> Result<Option<CpuEvent>> {
        self.regfile.pop()?;

        Ok(None)
    }

    /// Jumps to other location in program
    fn jp(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        self.regfile.pc = opcode.nnn();

        Ok(None)
    }

    /// Calls subroutine
    fn call(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        self.regfile.push()?;
        self.regfile.pc = opcode.nnn();

        Ok(None)
    }

    fn se_imm(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        self.regfile.skip_if(self.regfile.gprs[opcode.x()] == opcode.kk());

        Ok(None)
    }

    fn sne_imm(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        self.regfile.skip_if(self.regfile.gprs[opcode.x()] != opcode.kk());

        Ok(None)
    }

    fn se_reg(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        self.regfile.skip_if(self.regfile.gprs[opcode.x()] == self.regfile.gprs[opcode.y()]);

        Ok(None)
    }

    fn sne_reg(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        self.regfile.skip_if(self.regfile.gprs[opcode.x()] != self.regfile.gprs[opcode.y()]);

        Ok(None)
    }

    /// Jumps to nnn + V0
    fn jp_v0(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        self.regfile.pc = opcode.nnn() + self.regfile.gprs[0] as u16;

        Ok(None)
    }

    // --- Data and arithmetic

    /// Loads GPR with immediate
    fn ldv(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        self.regfile.gprs[opcode.x()] = opcode.kk();

        Ok(None)
    }

    /// Adds immediate, VF untouched
    fn add_imm(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        let x = opcode.x();

        self.regfile.gprs[x] = self.regfile.gprs[x].wrapping_add(opcode.kk());

        Ok(None)
    }

    fn ld_reg(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        self.regfile.gprs[opcode.x()] = self.regfile.gprs[opcode.y()];

        Ok(None)
    }

    fn or(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        self.regfile.gprs[opcode.x()] |= self.regfile.gprs[opcode.y()];

        Ok(None)
    }

    fn and(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        self.regfile.gprs[opcode.x()] &= self.regfile.gprs[opcode.y()];

        Ok(None)
    }

    fn xor(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        self.regfile.gprs[opcode.x()] ^= self.regfile.gprs[opcode.y()];

        Ok(None)
    }

    // Flag-setting ops write VF first and Vx last, so with x = F the result wins.

    /// Vx += Vy, VF = carry
    fn add_reg(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        let (vx, vy) = (self.regfile.gprs[opcode.x()], self.regfile.gprs[opcode.y()]);
        let (sum, carry) = vx.overflowing_add(vy);

        self.regfile.gprs[VF] = carry as u8;
        self.regfile.gprs[opcode.x()] = sum;

        Ok(None)
    }

    /// Vx -= Vy, VF = not borrow
    fn sub(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        let (vx, vy) = (self.regfile.gprs[opcode.x()], self.regfile.gprs[opcode.y()]);

        self.regfile.gprs[VF] = (vx >= vy) as u8;
        self.regfile.gprs[opcode.x()] = vx.wrapping_sub(vy);

        Ok(None)
    }

    /// Vx = Vy - Vx, VF = not borrow
    fn subn(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        let (vx, vy) = (self.regfile.gprs[opcode.x()], self.regfile.gprs[opcode.y()]);

        self.regfile.gprs[VF] = (vy >= vx) as u8;
        self.regfile.gprs[opcode.x()] = vy.wrapping_sub(vx);

        Ok(None)
    }

    /// Vx >>= 1, VF = bit shifted out
    fn shr(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        let vx = self.regfile.gprs[opcode.x()];

        self.regfile.gprs[VF] = vx & 0x01;
        self.regfile.gprs[opcode.x()] = vx >> 1;

        Ok(None)
    }

    /// Vx <<= 1, VF = bit shifted out
    fn shl(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        let vx = self.regfile.gprs[opcode.x()];

        self.regfile.gprs[VF] = vx >> 7;
        self.regfile.gprs[opcode.x()] = vx << 1;

        Ok(None)
    }

    /// Loads index register
    fn ldi(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        self.regfile.index = opcode.nnn();

        Ok(None)
    }

    /// Vx = random byte & kk
    fn rnd(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        self.regfile.gprs[opcode.x()] = self.rng.random::<u8>() & opcode.kk();

        Ok(None)
    }

    // --- Display, keys, timers and memory blocks

    /// Draws sprite
    fn drw(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        let mut display = self.display.borrow_mut();

        let (x, y) = (self.regfile.gprs[opcode.x()] as usize, self.regfile.gprs[opcode.y()] as usize);
        let mut collision = false;

        for n in 0..opcode.n() {
            // Get next row of pixels, MSB is leftmost
            let pixels = self.bus.read_byte(self.regfile.index as usize + n)?;

            for i in 0..8 {
                if pixels & (0x80 >> i) != 0 {
                    collision |= display.toggle(x + i, y + n)?;
                }
            }
        }

        self.regfile.gprs[VF] = collision as u8;

        Ok(Some(CpuEvent::Draw))
    }

    /// Skips if key Vx is pressed
    fn skp(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        let pressed = self.keypad.borrow().is_key_pressed(self.regfile.gprs[opcode.x()] & 0xF);

        self.regfile.skip_if(pressed);

        Ok(None)
    }

    /// Skips if key Vx is not pressed
    fn sknp(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        let pressed = self.keypad.borrow().is_key_pressed(self.regfile.gprs[opcode.x()] & 0xF);

        self.regfile.skip_if(!pressed);

        Ok(None)
    }

    fn ld_vx_dt(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        self.regfile.gprs[opcode.x()] = self.regfile.delay_timer.get();

        Ok(None)
    }

    /// Waits for a key press and stores it in Vx
    fn ld_vx_key(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        let key = self.keypad.borrow().any_key();

        match key {
            Some(key) => {
                self.regfile.gprs[opcode.x()] = key;
                Ok(None)
            }
            None => {
                // Re-run this instruction until a key shows up
                self.regfile.rewind_pc();
                Ok(Some(CpuEvent::WaitForKey))
            }
        }
    }

    fn ld_dt_vx(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        *self.regfile.delay_timer.counter() = self.regfile.gprs[opcode.x()];

        Ok(None)
    }

    fn ld_st_vx(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        *self.regfile.sound_timer.counter() = self.regfile.gprs[opcode.x()];

        Ok(None)
    }

    /// I += Vx, VF untouched
    fn add_i(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        self.regfile.index = self.regfile.index.wrapping_add(self.regfile.gprs[opcode.x()] as u16);

        Ok(None)
    }

    /// Points I at the font glyph for the low nibble of Vx
    fn ld_font(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        let digit = (self.regfile.gprs[opcode.x()] & 0xF) as u16;

        self.regfile.index = Bus::FONT_START + digit * Bus::GLYPH_SIZE;

        Ok(None)
    }

    /// Stores hundreds, tens and ones of Vx at I, I+1, I+2
    fn bcd(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        let vx = self.regfile.gprs[opcode.x()];
        let index = self.regfile.index as usize;

        for (offset, digit) in [vx / 100, vx / 10 % 10, vx % 10].iter().enumerate() {
            self.bus.write_byte(index + offset, *digit)?;
        }

        Ok(None)
    }

    /// Stores V0..=Vx at I; I is unchanged
    fn store(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        let index = self.regfile.index as usize;

        for r in 0..=opcode.x() {
            self.bus.write_byte(index + r, self.regfile.gprs[r])?;
        }

        Ok(None)
    }

    /// Loads V0..=Vx from I; I is unchanged
    fn load(&mut self, opcode: Opcode) -> Result<Option<CpuEvent>> {
        let index = self.regfile.index as usize;

        for r in 0..=opcode.x() {
            self.regfile.gprs[r] = self.bus.read_byte(index + r)?;
        }

        Ok(None)
    }
}
