use crate::{
    bus::{memory::Ram, Bus},
    cpu::{regfile::{RegFile, PROGRAM_START}, Cpu},
};

use std::{rc::Rc, cell::{Ref, RefCell, RefMut}};

pub use clap::Parser;

pub use crate::{
    bus::Addressable,
    cpu::CpuEvent,
    display::Display,
    error::{Error, Result},
    keypad::{KeyInput, Keypad},
};

pub mod bus;
pub mod cpu;
mod display;
mod error;
mod keypad;

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Config {
    /// Instructions executed per 60 Hz frame
    #[arg(long, default_value_t = Config::STEPS)]
    pub steps_per_frame: usize,

    /// Seed for the random number generator used by Cxkk
    #[arg(long)]
    pub seed: Option<u64>,

    /// Halt on unknown instructions instead of skipping them
    #[arg(long)]
    pub strict: bool,
}

impl Config {
    pub const STEPS: usize = 256;
}

impl Default for Config {
    fn default() -> Self {
        Self { steps_per_frame: Self::STEPS, seed: None, strict: false }
    }
}

/// How a frame of `Core::run_frame` ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    /// Ran the full step budget
    Completed,
    /// Stopped early after a sprite draw
    Drawn,
    /// Stopped early waiting on Fx0A
    WaitingForKey,
}

pub struct Core {
    cpu: Cpu,
    config: Config,
    display: Rc<RefCell<Display>>,
    keypad: Rc<RefCell<Keypad>>,
}

impl Core {
    const MAX_PROGRAM_SIZE: usize = Ram::SIZE - PROGRAM_START as usize;

    pub fn new(config: Config) -> Self {
        let display = Rc::new(RefCell::new(Display::default()));
        let keypad = Rc::new(RefCell::new(Keypad::default()));

        Self {
            cpu: Cpu::new(Bus::new(Ram::default()), display.clone(), keypad.clone(), &config),
            config,
            display,
            keypad,
        }
    }

    /// Writes a program image at the start of the program region
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        if program.len() > Self::MAX_PROGRAM_SIZE {
            return Err(Error::ProgramTooLarge { size: program.len(), max: Self::MAX_PROGRAM_SIZE });
        }

        self.cpu.bus_mut().load(PROGRAM_START, program)?;

        log::debug!("Loaded {} byte program at {:04X}", program.len(), PROGRAM_START);

        Ok(())
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
    }

    /// Executes one fetch-decode-execute cycle
    pub fn step(&mut self) -> Result<Option<CpuEvent>> {
        self.cpu.step()
    }

    pub fn tick_timers(&mut self) {
        self.cpu.tick_timers();
    }

    /// Ticks timers once, then runs up to `steps_per_frame` instructions
    pub fn run_frame(&mut self) -> Result<FrameStatus> {
        self.cpu.tick_timers();

        for _ in 0..self.config.steps_per_frame {
            match self.cpu.step()? {
                Some(CpuEvent::Draw) => return Ok(FrameStatus::Drawn),
                Some(CpuEvent::WaitForKey) => return Ok(FrameStatus::WaitingForKey),
                Some(CpuEvent::UnknownInstruction { .. }) | None => {}
            }
        }

        Ok(FrameStatus::Completed)
    }

    pub fn display(&self) -> Ref<'_, Display> {
        self.display.borrow()
    }

    pub fn keypad_mut(&self) -> RefMut<'_, Keypad> {
        self.keypad.borrow_mut()
    }

    pub fn registers(&self) -> &RegFile {
        self.cpu.regfile()
    }

    /// True while the sound timer is running
    pub fn sound_active(&self) -> bool {
        self.cpu.regfile().sound_timer.get() > 0
    }

    pub fn fault(&self) -> Option<Error> {
        self.cpu.fault()
    }
}
