use crate::error::{Chip8Error, Result};
use crate::word::{Byte, Short};
use log::debug;
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the flat address space. Every access is bounds-checked; there
/// is no implicit growth or wraparound.
pub trait MemoryMap {
    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16) -> Result<()> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }

    fn read_byte(&self, addr: u16) -> Result<Byte> {
        Ok(Byte::from(self.get_ro_slice(addr, 1)?[0]))
    }

    fn write_byte(&mut self, addr: u16, value: Byte) -> Result<()> {
        self.get_rw_slice(addr, 1)?[0] = value.value();
        Ok(())
    }

    /// get a big-endian two-byte word (instruction fetch)
    fn get_word(&self, addr: u16) -> Result<Short> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(Short::from_bytes(Byte::from(word[0]), Byte::from(word[1])))
    }

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8]>;

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8]>;
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// largest program that fits between the load address and the top of RAM
pub const CHIP8_PROGRAM_MAX_BYTES: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;

/// where the hex-digit glyphs live
pub const CHIP8_FONT_ADDR: u16 = 0x000;

/// bytes per glyph
pub const CHIP8_GLYPH_BYTES: u16 = 5;

/// The standard CHIP-8 4K memory map:
///   0x0000-0x004f  font, sixteen 5-byte glyphs
///   0x0050-0x01ff  unused (the interpreter lived here on the COSMAC VIP)
///   0x0200-0x0fff  program
///
/// the stack, registers and display are kept outside of addressable memory
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8]> {
        let range = Self::checked_range(addr, len)?;
        Ok(&mut self.bytes[range])
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8]> {
        let range = Self::checked_range(addr, len)?;
        Ok(&self.bytes[range])
    }
}

impl Chip8MemoryMap {
    /// zeroed memory with the font baked in at 0x000
    pub fn new() -> Self {
        let mut mm = Chip8MemoryMap {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice(),
        };
        mm.load_font(&CHIP8_FONT);
        mm
    }

    /// write a glyph table at the font address
    pub fn load_font(&mut self, glyphs: &[u8; 80]) {
        let start = CHIP8_FONT_ADDR as usize;
        self.bytes[start..start + glyphs.len()].copy_from_slice(glyphs);
    }

    /// load a CHIP-8 program at 0x200
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        if buf.len() > CHIP8_PROGRAM_MAX_BYTES {
            return Err(Chip8Error::ProgramTooLarge {
                size: buf.len(),
                max: CHIP8_PROGRAM_MAX_BYTES,
            });
        }
        self.write(&buf, CHIP8_PROGRAM_ADDR)?;
        debug!(
            "loaded {} byte program at {:#05x}",
            buf.len(),
            CHIP8_PROGRAM_ADDR
        );
        Ok(buf.len())
    }

    fn checked_range(addr: u16, len: usize) -> Result<std::ops::Range<usize>> {
        let start = addr as usize;
        let end = start + len;
        if end > CHIP8_RAM_SIZE_BYTES {
            // report the first byte that falls off the end
            return Err(Chip8Error::OutOfRangeAddress {
                addr: start.max(CHIP8_RAM_SIZE_BYTES),
            });
        }
        Ok(start..end)
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

/// address of the glyph for hex digit `digit`; values above 0xF are not
/// masked, so they point past the font
pub fn glyph_addr(digit: Byte) -> Short {
    Short::from(CHIP8_FONT_ADDR).add(Short::from(digit).mul(CHIP8_GLYPH_BYTES))
}

pub const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8MemoryMap::new();
        // NB. memory is zeroed from 0x50 because before that we bake in the font
        assert!(m.bytes[0x50..].iter().all(|&b| b == 0));
        assert_eq!(m.bytes.len(), 4096);
    }

    #[test]
    fn test_font_at_base() -> Result<()> {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.get_ro_slice(0, 80)?, &CHIP8_FONT[..]);
        // glyph for 'A' starts at 50
        assert_eq!(m.get_ro_slice(50, 5)?, &[0xF0, 0x90, 0xF0, 0x90, 0x90]);
        Ok(())
    }

    #[test]
    fn test_glyph_addr() {
        assert_eq!(glyph_addr(Byte::from(0x0)), 0);
        assert_eq!(glyph_addr(Byte::from(0xa)), 50);
        assert_eq!(glyph_addr(Byte::from(0xf)), 75);
        assert_eq!(glyph_addr(Byte::from(0x10)), 80);
    }

    #[test]
    fn test_write_data_ok() -> Result<()> {
        let mut dst = Chip8MemoryMap::new();
        dst.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x308)?;
        assert_eq!(
            dst.get_ro_slice(0x300, 16)?,
            &[0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
        Ok(())
    }

    #[test]
    fn test_byte_access() -> Result<()> {
        let mut m = Chip8MemoryMap::new();
        m.write_byte(0xfff, Byte::from(0x42))?;
        assert_eq!(m.read_byte(0xfff)?, 0x42);
        Ok(())
    }

    #[test]
    fn test_read_word() -> Result<()> {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x400)?;
        assert_eq!(m.get_word(0x404)?, 0x0405);
        Ok(())
    }

    #[test]
    fn test_out_of_range() {
        let mut m = Chip8MemoryMap::new();
        assert!(matches!(
            m.read_byte(0x1000),
            Err(Chip8Error::OutOfRangeAddress { addr: 0x1000 })
        ));
        assert!(matches!(
            m.get_word(0xfff),
            Err(Chip8Error::OutOfRangeAddress { addr: 0x1000 })
        ));
        assert!(matches!(
            m.write(&[0; 8], 4089),
            Err(Chip8Error::OutOfRangeAddress { .. })
        ));
    }

    #[test]
    fn test_program_load_ok() -> Result<()> {
        let mut dst = Chip8MemoryMap::new();
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        assert_eq!(dst.load_program(&mut prog)?, 2);
        assert_eq!(dst.get_ro_slice(0x200, 2)?, &[0x00, 0xe0]);
        Ok(())
    }

    #[test]
    fn test_odd_length_program_leaves_zero() -> Result<()> {
        let mut dst = Chip8MemoryMap::new();
        let mut prog: &[u8] = &[0x60, 0x05, 0x12];
        dst.load_program(&mut prog)?;
        assert_eq!(dst.get_word(0x202)?, 0x1200);
        Ok(())
    }

    #[test]
    fn test_program_too_large() {
        let mut dst = Chip8MemoryMap::new();
        let big = vec![0u8; CHIP8_PROGRAM_MAX_BYTES + 1];
        let mut prog: &[u8] = &big;
        assert!(matches!(
            dst.load_program(&mut prog),
            Err(Chip8Error::ProgramTooLarge { size: 0xe01, max: 0xe00 })
        ));

        let exact = vec![0xaau8; CHIP8_PROGRAM_MAX_BYTES];
        let mut prog: &[u8] = &exact;
        assert!(dst.load_program(&mut prog).is_ok());
    }
}
