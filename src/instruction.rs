//! Instruction decoding.
//!
//! A fetched 16-bit word is split into nibble fields by [`Opcode`] and then
//! turned into a closed [`Instruction`] variant. Anything that doesn't match a
//! known encoding decodes to `None`, which the interpreter reports as an
//! unimplemented opcode.

use crate::word::Short;
use std::fmt;

/// Register index, always 0x0..=0xF once decoded
pub type Reg = usize;

/// 12-bit address operand
pub type Addr = u16;

/// A raw 16-bit instruction word
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Opcode(pub u16);

impl Opcode {
    /// top nibble
    pub fn op(self) -> u8 {
        (self.0 >> 12) as u8
    }

    pub fn x(self) -> Reg {
        ((self.0 >> 8) & 0xf) as Reg
    }

    pub fn y(self) -> Reg {
        ((self.0 >> 4) & 0xf) as Reg
    }

    pub fn n(self) -> u8 {
        (self.0 & 0xf) as u8
    }

    pub fn nn(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    pub fn nnn(self) -> Addr {
        self.0 & 0xfff
    }
}

impl From<Short> for Opcode {
    fn from(word: Short) -> Self {
        Opcode(word.value())
    }
}

impl fmt::LowerHex for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 0nnn, machine code routine; ignored
    Sys(Addr),
    /// 1nnn
    Jp(Addr),
    /// 2nnn
    Call(Addr),
    /// 3xkk
    SeByte(Reg, u8),
    /// 4xkk
    SneByte(Reg, u8),
    /// 5xy0
    SeReg(Reg, Reg),
    /// 6xkk
    LdByte(Reg, u8),
    /// 7xkk
    AddByte(Reg, u8),
    /// 8xy0
    LdReg(Reg, Reg),
    /// 8xy1
    Or(Reg, Reg),
    /// 8xy2
    And(Reg, Reg),
    /// 8xy3
    Xor(Reg, Reg),
    /// 8xy4
    AddReg(Reg, Reg),
    /// 8xy5
    Sub(Reg, Reg),
    /// 8xy6; Vy is decoded but unused
    Shr(Reg, Reg),
    /// 8xy7
    Subn(Reg, Reg),
    /// 8xyE; Vy is decoded but unused
    Shl(Reg, Reg),
    /// 9xy0
    SneReg(Reg, Reg),
    /// Annn
    LdI(Addr),
    /// Bnnn
    JpV0(Addr),
    /// Cxkk
    Rnd(Reg, u8),
    /// Dxyn
    Drw(Reg, Reg, u8),
    /// Ex9E
    Skp(Reg),
    /// ExA1
    Sknp(Reg),
    /// Fx07
    LdRegDt(Reg),
    /// Fx0A
    LdKey(Reg),
    /// Fx15
    LdDtReg(Reg),
    /// Fx18
    LdSt(Reg),
    /// Fx1E
    AddI(Reg),
    /// Fx29
    LdF(Reg),
    /// Fx33
    LdB(Reg),
    /// Fx55
    LdDerefIReg(Reg),
    /// Fx65
    LdRegDerefI(Reg),
}

impl Instruction {
    pub fn decode(opcode: Opcode) -> Option<Instruction> {
        use Instruction::*;

        let (x, y, n, nn, nnn) = (opcode.x(), opcode.y(), opcode.n(), opcode.nn(), opcode.nnn());
        let instr = match opcode.op() {
            0x0 => match opcode.0 {
                0x00e0 => Cls,
                0x00ee => Ret,
                _ => Sys(nnn),
            },
            0x1 => Jp(nnn),
            0x2 => Call(nnn),
            0x3 => SeByte(x, nn),
            0x4 => SneByte(x, nn),
            0x5 if n == 0 => SeReg(x, y),
            0x6 => LdByte(x, nn),
            0x7 => AddByte(x, nn),
            0x8 => match n {
                0x0 => LdReg(x, y),
                0x1 => Or(x, y),
                0x2 => And(x, y),
                0x3 => Xor(x, y),
                0x4 => AddReg(x, y),
                0x5 => Sub(x, y),
                0x6 => Shr(x, y),
                0x7 => Subn(x, y),
                0xe => Shl(x, y),
                _ => return None,
            },
            0x9 if n == 0 => SneReg(x, y),
            0xa => LdI(nnn),
            0xb => JpV0(nnn),
            0xc => Rnd(x, nn),
            0xd => Drw(x, y, n),
            0xe => match nn {
                0x9e => Skp(x),
                0xa1 => Sknp(x),
                _ => return None,
            },
            0xf => match nn {
                0x07 => LdRegDt(x),
                0x0a => LdKey(x),
                0x15 => LdDtReg(x),
                0x18 => LdSt(x),
                0x1e => AddI(x),
                0x29 => LdF(x),
                0x33 => LdB(x),
                0x55 => LdDerefIReg(x),
                0x65 => LdRegDerefI(x),
                _ => return None,
            },
            _ => return None,
        };
        Some(instr)
    }
}

/// conventional (Cowgod-style) mnemonics
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            Cls => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Sys(a) => write!(f, "SYS {:#05x}", a),
            Jp(a) => write!(f, "JP {:#05x}", a),
            Call(a) => write!(f, "CALL {:#05x}", a),
            SeByte(x, kk) => write!(f, "SE V{:X}, {:#04x}", x, kk),
            SneByte(x, kk) => write!(f, "SNE V{:X}, {:#04x}", x, kk),
            SeReg(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            LdByte(x, kk) => write!(f, "LD V{:X}, {:#04x}", x, kk),
            AddByte(x, kk) => write!(f, "ADD V{:X}, {:#04x}", x, kk),
            LdReg(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            Shr(x, _) => write!(f, "SHR V{:X}", x),
            Subn(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Shl(x, _) => write!(f, "SHL V{:X}", x),
            SneReg(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            LdI(a) => write!(f, "LD I, {:#05x}", a),
            JpV0(a) => write!(f, "JP V0, {:#05x}", a),
            Rnd(x, kk) => write!(f, "RND V{:X}, {:#04x}", x, kk),
            Drw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Skp(x) => write!(f, "SKP V{:X}", x),
            Sknp(x) => write!(f, "SKNP V{:X}", x),
            LdRegDt(x) => write!(f, "LD V{:X}, DT", x),
            LdKey(x) => write!(f, "LD V{:X}, K", x),
            LdDtReg(x) => write!(f, "LD DT, V{:X}", x),
            LdSt(x) => write!(f, "LD ST, V{:X}", x),
            AddI(x) => write!(f, "ADD I, V{:X}", x),
            LdF(x) => write!(f, "LD F, V{:X}", x),
            LdB(x) => write!(f, "LD B, V{:X}", x),
            LdDerefIReg(x) => write!(f, "LD [I], V{:X}", x),
            LdRegDerefI(x) => write!(f, "LD V{:X}, [I]", x),
        }
    }
}
