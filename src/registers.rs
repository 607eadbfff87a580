use crate::error::{Chip8Error, Result};
use crate::memory::CHIP8_PROGRAM_ADDR;
use crate::word::{Byte, Short};
use std::fmt;

pub const REGISTER_COUNT: usize = 16;
pub const STACK_DEPTH: usize = 16;

/// VF doubles as the carry/borrow/collision flag
pub const FLAG_REGISTER: usize = 0xf;

/// Programmer-visible machine state.
///
/// `sp` counts entries: `stack[sp - 1]` is the most recent return address and
/// `stack[sp]` is the next free slot.
#[derive(Clone, Debug)]
pub struct RegisterFile {
    pub v: [Byte; REGISTER_COUNT],
    pub i: Short,
    pub pc: Short,
    pub stack: [Short; STACK_DEPTH],
    pub sp: Byte,
    pub dt: Byte,
    pub st: Byte,
}

impl RegisterFile {
    pub fn new() -> Self {
        RegisterFile {
            v: [Byte::ZERO; REGISTER_COUNT],
            i: Short::ZERO,
            pc: Short::from(CHIP8_PROGRAM_ADDR),
            stack: [Short::ZERO; STACK_DEPTH],
            sp: Byte::ZERO,
            dt: Byte::ZERO,
            st: Byte::ZERO,
        }
    }

    pub fn v(&self, x: usize) -> Byte {
        self.v[x]
    }

    pub fn set_v(&mut self, x: usize, value: Byte) {
        self.v[x] = value;
    }

    pub fn flag(&self) -> Byte {
        self.v[FLAG_REGISTER]
    }

    pub fn set_flag(&mut self, set: bool) {
        self.v[FLAG_REGISTER] = Byte::from(set as u8);
    }

    pub fn advance(&mut self, by: u16) {
        self.pc = self.pc.add(by);
    }

    /// push a return address
    pub fn push(&mut self, addr: Short) -> Result<()> {
        let sp = usize::from(self.sp);
        if sp >= STACK_DEPTH {
            return Err(Chip8Error::StackOverflow {
                pc: self.pc.value(),
            });
        }
        self.stack[sp] = addr;
        self.sp = self.sp.add(1u8);
        Ok(())
    }

    /// pop the most recent return address
    pub fn pop(&mut self) -> Result<Short> {
        if self.sp == 0 {
            return Err(Chip8Error::StackUnderflow {
                pc: self.pc.value(),
            });
        }
        self.sp = self.sp.sub(1u8);
        Ok(self.stack[usize::from(self.sp)])
    }

    /// decay both timers by `ticks` 60 Hz periods, stopping at zero
    pub fn tick_timers(&mut self, ticks: u32) {
        let decay = |t: Byte| Byte::from(u32::from(t.value()).saturating_sub(ticks) as u8);
        self.dt = decay(self.dt);
        self.st = decay(self.st);
    }

    /// should the tone be audible?
    pub fn sound_active(&self) -> bool {
        self.st > Byte::ZERO
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

/// one-line summary, used by the trace log
impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V=[")?;
        for (n, v) in self.v.iter().enumerate() {
            if n > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02x}", v)?;
        }
        write!(
            f,
            "] I={:03x} SP={} DT={:02x} ST={:02x}",
            self.i,
            self.sp.value(),
            self.dt,
            self.st
        )
    }
}
