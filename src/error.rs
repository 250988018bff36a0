/// Interpreter errors
///
/// Everything except `UnknownInstruction` halts the CPU until the next reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Memory access out of bounds at {address:#06X} (capacity {capacity:#06X})")]
    OutOfBounds { address: usize, capacity: usize },

    #[error("Stack overflow: call at {pc:#06X} with a full call stack")]
    StackOverflow { pc: u16 },

    #[error("Stack underflow: return at {pc:#06X} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("Program is too large ({size} bytes), max size is {max} bytes")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("Unknown instruction {opcode:#06X} at {pc:#06X}")]
    UnknownInstruction { opcode: u16, pc: u16 },
}

pub type Result<T> = std::result::Result<T, Error>;
