//! # interpreter
//!
//! The CPU core. It exclusively owns memory, the register file, the
//! framebuffer and the keypad snapshot, and moves them forward one
//! instruction at a time:
//!
//!  1. fetch   -- two bytes at PC, big-endian
//!  2. decode  -- into an [`Instruction`]; unknown encodings are fatal
//!  3. execute -- mutate state; PC moves on by 2 unless the instruction
//!     jumps, skips or blocks
//!
//! Fx0A is the only instruction that doesn't finish immediately. It parks
//! the core in an "awaiting key" state with PC still pointing at it; every
//! later [`Chip8Interpreter::step`] checks the keypad and completes the
//! instruction once a fresh key press shows up. Timers, rendering and host
//! events all belong to the scheduler and keep running meanwhile.
use crate::display::FrameBuffer;
use crate::error::{Chip8Error, Result};
use crate::input::Keypad;
use crate::instruction::{Instruction, Opcode, Reg};
use crate::memory::{self, Chip8MemoryMap, MemoryMap, CHIP8_RAM_SIZE_BYTES};
use crate::registers::RegisterFile;
use crate::trace::TraceEvent;
use crate::word::{Byte, Short};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;

/// what a call to [`Chip8Interpreter::step`] achieved
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// one instruction ran to completion
    Executed(TraceEvent),
    /// blocked in Fx0A; nothing changed
    AwaitingKey,
}

pub struct Chip8Interpreter {
    memory: Chip8MemoryMap,
    registers: RegisterFile,
    frame: FrameBuffer,
    keypad: Keypad,
    rng: StdRng,
    awaiting_key: Option<Reg>,
}

impl Chip8Interpreter {
    /// fresh machine with the font loaded and PC at 0x200; `seed` fixes the
    /// sequence Cxkk draws from
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Chip8Interpreter {
            memory: Chip8MemoryMap::new(),
            registers: RegisterFile::new(),
            frame: FrameBuffer::new(),
            keypad: Keypad::new(),
            rng,
            awaiting_key: None,
        }
    }

    /// load a chip8 program
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize> {
        self.memory.load_program(reader)
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    pub fn memory(&self) -> &Chip8MemoryMap {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Chip8MemoryMap {
        &mut self.memory
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut FrameBuffer {
        &mut self.frame
    }

    pub fn keypad_mut(&mut self) -> &mut Keypad {
        &mut self.keypad
    }

    pub fn is_awaiting_key(&self) -> bool {
        self.awaiting_key.is_some()
    }

    /// the instruction word at PC
    pub fn fetch(&self) -> Result<Opcode> {
        Ok(Opcode::from(self.memory.get_word(self.registers.pc.value())?))
    }

    pub fn decode(&self, opcode: Opcode) -> Result<Instruction> {
        Instruction::decode(opcode).ok_or(Chip8Error::UnimplementedOpcode {
            opcode: opcode.0,
            pc: self.registers.pc.value(),
        })
    }

    /// run one instruction, or check on a pending Fx0A
    pub fn step(&mut self) -> Result<Step> {
        if let Some(x) = self.awaiting_key {
            let Some(key) = self.keypad.newly_pressed() else {
                return Ok(Step::AwaitingKey);
            };
            let pc = self.registers.pc;
            self.resume_with_key(key);
            return Ok(Step::Executed(TraceEvent {
                pc,
                opcode: Opcode(0xf00a | (x as u16) << 8),
                instruction: Instruction::LdKey(x),
            }));
        }

        let pc = self.registers.pc;
        let opcode = self.fetch()?;
        let instruction = self.decode(opcode)?;
        self.execute(instruction)?;
        if self.awaiting_key.is_some() {
            return Ok(Step::AwaitingKey);
        }
        Ok(Step::Executed(TraceEvent {
            pc,
            opcode,
            instruction,
        }))
    }

    /// finish a pending Fx0A with `key`; returns false if nothing was waiting
    pub fn resume_with_key(&mut self, key: u8) -> bool {
        match self.awaiting_key.take() {
            Some(x) => {
                debug!("key {:x} pressed, resuming into V{:X}", key, x);
                self.registers.set_v(x, Byte::from(key));
                self.registers.advance(2);
                true
            }
            None => false,
        }
    }

    /// apply one decoded instruction's side effects, including moving PC
    pub fn execute(&mut self, instruction: Instruction) -> Result<()> {
        use Instruction::*;

        match instruction {
            Cls => {
                self.frame.clear();
                self.registers.advance(2);
            }
            Ret => {
                let ret = self.registers.pop()?;
                self.registers.pc = ret.add(2u16);
            }
            Sys(_) => self.registers.advance(2),
            Jp(addr) => self.registers.pc = Short::from(addr),
            Call(addr) => {
                let here = self.registers.pc;
                self.registers.push(here)?;
                self.registers.pc = Short::from(addr);
            }
            SeByte(x, kk) => self.skip_if(self.registers.v(x) == kk),
            SneByte(x, kk) => self.skip_if(self.registers.v(x) != kk),
            SeReg(x, y) => self.skip_if(self.registers.v(x) == self.registers.v(y)),
            LdByte(x, kk) => self.set_and_advance(x, Byte::from(kk)),
            AddByte(x, kk) => {
                let sum = self.registers.v(x).add(kk);
                self.set_and_advance(x, sum);
            }
            LdReg(x, y) => self.set_and_advance(x, self.registers.v(y)),
            Or(x, y) => self.set_and_advance(x, self.registers.v(x).or(self.registers.v(y))),
            And(x, y) => self.set_and_advance(x, self.registers.v(x).and(self.registers.v(y))),
            Xor(x, y) => self.set_and_advance(x, self.registers.v(x).xor(self.registers.v(y))),
            AddReg(x, y) => {
                let sum = self.registers.v(x).add(self.registers.v(y));
                self.registers.set_v(x, sum);
                self.registers.set_flag(sum.wrapped());
                self.registers.advance(2);
            }
            Sub(x, y) => {
                let diff = self.registers.v(x).sub(self.registers.v(y));
                self.registers.set_v(x, diff);
                self.registers.set_flag(!diff.wrapped());
                self.registers.advance(2);
            }
            Subn(x, y) => {
                let diff = self.registers.v(y).sub(self.registers.v(x));
                self.registers.set_v(x, diff);
                self.registers.set_flag(!diff.wrapped());
                self.registers.advance(2);
            }
            // the flag is the bit about to fall off, taken before Vx changes
            Shr(x, _) => {
                let before = self.registers.v(x);
                self.registers.set_flag(before.and(1u8) == 1);
                self.set_and_advance(x, before.shift_right(1));
            }
            Shl(x, _) => {
                let before = self.registers.v(x);
                self.registers.set_flag(before.and(0x80u8) != 0);
                self.set_and_advance(x, before.shift_left(1));
            }
            SneReg(x, y) => self.skip_if(self.registers.v(x) != self.registers.v(y)),
            LdI(addr) => {
                self.registers.i = Short::from(addr);
                self.registers.advance(2);
            }
            JpV0(addr) => {
                self.registers.pc = Short::from(addr).add(Short::from(self.registers.v(0)));
            }
            Rnd(x, kk) => {
                let r = Byte::from(self.rng.gen::<u8>());
                self.set_and_advance(x, r.and(kk));
            }
            Drw(x, y, n) => {
                let (vx, vy) = (self.registers.v(x).value(), self.registers.v(y).value());
                let sprite = self
                    .memory
                    .get_ro_slice(self.registers.i.value(), n as usize)?;
                self.registers.set_flag(false);
                if self.frame.draw_sprite(sprite, vx, vy) {
                    self.registers.set_flag(true);
                }
                self.registers.advance(2);
            }
            Skp(x) => self.skip_if(self.keypad.is_down(self.registers.v(x).value())),
            Sknp(x) => self.skip_if(!self.keypad.is_down(self.registers.v(x).value())),
            LdRegDt(x) => self.set_and_advance(x, self.registers.dt),
            LdKey(x) => match self.keypad.newly_pressed() {
                Some(key) => self.set_and_advance(x, Byte::from(key)),
                None => {
                    debug!("waiting for a key press into V{:X}", x);
                    self.awaiting_key = Some(x);
                }
            },
            LdDtReg(x) => {
                self.registers.dt = self.registers.v(x);
                self.registers.advance(2);
            }
            LdSt(x) => {
                self.registers.st = self.registers.v(x);
                self.registers.advance(2);
            }
            AddI(x) => {
                self.registers.i = self.registers.i.add(Short::from(self.registers.v(x)));
                self.registers.advance(2);
            }
            LdF(x) => {
                self.registers.i = memory::glyph_addr(self.registers.v(x));
                self.registers.advance(2);
            }
            LdB(x) => {
                let v = self.registers.v(x).value();
                for (offset, digit) in [v / 100, (v / 10) % 10, v % 10].into_iter().enumerate() {
                    let addr = self.i_offset(offset)?;
                    self.memory.write_byte(addr, Byte::from(digit))?;
                }
                self.registers.advance(2);
            }
            LdDerefIReg(x) => {
                for r in 0..=x {
                    let addr = self.i_offset(r)?;
                    self.memory.write_byte(addr, self.registers.v(r))?;
                }
                self.registers.advance(2);
            }
            LdRegDerefI(x) => {
                for r in 0..=x {
                    let addr = self.i_offset(r)?;
                    let value = self.memory.read_byte(addr)?;
                    self.registers.set_v(r, value);
                }
                self.registers.advance(2);
            }
        }
        Ok(())
    }

    fn skip_if(&mut self, condition: bool) {
        self.registers.advance(if condition { 4 } else { 2 });
    }

    fn set_and_advance(&mut self, x: Reg, value: Byte) {
        self.registers.set_v(x, value);
        self.registers.advance(2);
    }

    /// I + offset, without wrapping; must land inside memory
    fn i_offset(&self, offset: usize) -> Result<u16> {
        let addr = usize::from(self.registers.i) + offset;
        if addr >= CHIP8_RAM_SIZE_BYTES {
            return Err(Chip8Error::OutOfRangeAddress { addr });
        }
        Ok(addr as u16)
    }
}
