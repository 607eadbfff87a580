use std::io;
use thiserror::Error;

/// Everything that can stop a running machine. None of these are
/// recoverable; a crashed machine is restarted from a fresh load.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("unimplemented opcode {opcode:#06x} at {pc:#05x}")]
    UnimplementedOpcode { opcode: u16, pc: u16 },

    #[error("stack overflow: CALL at {pc:#05x} with all 16 slots in use")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: RET at {pc:#05x} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("memory access out of bounds at address {addr:#x}")]
    OutOfRangeAddress { addr: usize },

    #[error("program is {size} bytes, max size is {max} bytes")]
    ProgramTooLarge { size: usize, max: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Chip8Error>;
