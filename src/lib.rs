//! A CHIP-8 virtual machine.
//!
//! ## Design
//!
//! * the interpreter core knows nothing about terminals, speakers or clocks;
//!   it owns memory, registers, the framebuffer and a keypad snapshot, and
//!   advances one instruction per `step()`
//! * every register and memory cell is a fixed-width word (`Byte`, `Short`)
//!   whose arithmetic wraps and reports that it wrapped; VF is derived from
//!   that report rather than recomputed by hand
//! * instructions are decoded into a closed enum first, so "unimplemented
//!   opcode" is just the arm that decoding can't fill
//! * display, input and sound are traits, so the terminal implementations
//!   can be swapped for headless ones in tests
//! * the scheduler reconciles two cadences: instructions run at a
//!   configurable rate (700/s by default) while DT and ST decay at 60 Hz of
//!   wall-clock time, however many instructions that is
//!
//! Model
//!
//! main
//!  |-- config (from the command line)
//!  |-- interpreter(memory + font, registers, framebuffer, keypad, rng)
//!  |-- display, input, sound
//!  `-- scheduler(interpreter, display, input, sound, config)
//!       |-- poll input; quit if asked
//!       |-- decay timers by elapsed 60 Hz ticks; drive the tone from ST
//!       |-- interpreter.step() -- or keep waiting on Fx0A
//!       |-- repaint if the framebuffer changed (at most 60/s)
//!       `-- sleep until the next instruction is due
pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod registers;
pub mod scheduler;
pub mod sound;
pub mod timer;
pub mod trace;
pub mod word;

pub use error::{Chip8Error, Result};
pub use word::{Byte, Short};
