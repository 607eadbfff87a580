//! Step tracing.
//!
//! The interpreter keeps no debugger state of its own. Instead the scheduler
//! hands a [`TraceEvent`] to an optional [`Observer`] after every executed
//! instruction.

use crate::instruction::{Instruction, Opcode};
use crate::registers::RegisterFile;
use crate::word::Short;
use log::info;

/// what just ran, and where
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceEvent {
    pub pc: Short,
    pub opcode: Opcode,
    pub instruction: Instruction,
}

pub trait Observer {
    /// called once per executed instruction, with the registers as they are
    /// after it ran
    fn notify(&mut self, event: TraceEvent, registers: &RegisterFile);
}

/// writes one log line per instruction
#[derive(Default)]
pub struct LogTracer {
    count: u64,
}

impl LogTracer {
    pub fn new() -> Self {
        LogTracer::default()
    }
}

impl Observer for LogTracer {
    fn notify(&mut self, event: TraceEvent, registers: &RegisterFile) {
        self.count += 1;
        info!(
            target: "chip8_vm::trace",
            "#{} {:03x}: {:04x}  {:<16} {}",
            self.count,
            event.pc,
            event.opcode,
            event.instruction.to_string(),
            registers
        );
    }
}
