use std::{fs, path::Path};

use crate::error::EmuError;

pub type TypeAddr = u16; // in reality u12

pub const MEMORY_SIZE: usize = 4096;
pub const PROGRAM_START: TypeAddr = 0x200;
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

// glyph d lives at FONT_START + 5 * d
pub const FONT_START: usize = 0x000;
pub const GLYPH_SIZE: usize = 5;

type FontBytes = [u8; GLYPH_SIZE * 16];

pub const DEFAULT_FONT: FontBytes = [
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

/// The 4K address space. Every access is bounds checked; addresses past
/// 0xFFF are a fault rather than wrapping.
pub struct Memory {
    bytes: [u8; MEMORY_SIZE],
}

impl Memory {
    pub fn new() -> Self {
        Self {
            bytes: [0; MEMORY_SIZE],
        }
    }

    /// Zeroes everything and installs the hex glyph table in low memory.
    pub fn reset(&mut self) {
        self.bytes = [0; MEMORY_SIZE];
        self.bytes[FONT_START..FONT_START + DEFAULT_FONT.len()].copy_from_slice(&DEFAULT_FONT);
    }

    fn check(addr: usize) -> Result<usize, EmuError> {
        if addr < MEMORY_SIZE {
            Ok(addr)
        } else {
            Err(EmuError::MemoryOutOfBounds { address: addr })
        }
    }

    pub fn read8(&self, addr: TypeAddr) -> Result<u8, EmuError> {
        Ok(self.bytes[Self::check(addr as usize)?])
    }

    /// Big-endian fetch of the word at `addr`, `addr + 1`.
    pub fn read16(&self, addr: TypeAddr) -> Result<u16, EmuError> {
        let hi = self.bytes[Self::check(addr as usize)?];
        let lo = self.bytes[Self::check(addr as usize + 1)?];
        Ok(((hi as u16) << 8) | lo as u16)
    }

    pub fn write8(&mut self, addr: TypeAddr, val: u8) -> Result<(), EmuError> {
        self.bytes[Self::check(addr as usize)?] = val;
        Ok(())
    }

    /// `len` bytes starting at `addr`; faults at the first address past the end.
    pub fn slice(&self, addr: TypeAddr, len: usize) -> Result<&[u8], EmuError> {
        let start = addr as usize;
        if len > 0 {
            Self::check(start + len - 1)?;
        }
        Self::check(start)?;
        Ok(&self.bytes[start..start + len])
    }

    /// Copies `bytes` verbatim starting at `offset`.
    pub fn load(&mut self, bytes: &[u8], offset: TypeAddr) -> Result<(), EmuError> {
        let start = Self::check(offset as usize)?;
        let max = MEMORY_SIZE.saturating_sub(start);
        if bytes.len() > max {
            return Err(EmuError::RomTooLarge {
                size: bytes.len(),
                max,
            });
        }
        self.bytes[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<(), EmuError> {
        self.load(bytes, PROGRAM_START)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads a raw program image from disk.
pub fn read_rom_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, EmuError> {
    let program = fs::read(path)?;
    if program.len() > MAX_PROGRAM_SIZE {
        return Err(EmuError::RomTooLarge {
            size: program.len(),
            max: MAX_PROGRAM_SIZE,
        });
    }
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_installs_font() {
        let mut mem = Memory::new();
        mem.write8(0x300, 0xAA).unwrap();
        mem.reset();
        assert_eq!(mem.slice(0, 5).unwrap(), &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        // glyph F
        assert_eq!(mem.slice(15 * 5, 5).unwrap(), &[0xF0, 0x80, 0xF0, 0x80, 0x80]);
        assert_eq!(mem.read8(0x300).unwrap(), 0);
        assert!(mem.as_bytes()[0x50..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_read16_is_big_endian() {
        let mut mem = Memory::new();
        mem.load(&[0xAA, 0xBB], 0x200).unwrap();
        assert_eq!(mem.read16(0x200).unwrap(), 0xAABB);
    }

    #[test]
    fn test_out_of_range_faults() {
        let mut mem = Memory::new();
        assert!(matches!(
            mem.read8(0x1000),
            Err(EmuError::MemoryOutOfBounds { address: 0x1000 })
        ));
        assert!(matches!(
            mem.read16(0xFFF),
            Err(EmuError::MemoryOutOfBounds { address: 0x1000 })
        ));
        assert!(mem.write8(0x1000, 1).is_err());
        assert!(mem.write8(0xFFF, 1).is_ok());
        assert!(mem.slice(0xFFE, 3).is_err());
        assert_eq!(mem.slice(0xFFE, 2).unwrap(), &[0, 1]);
    }

    #[test]
    fn test_load_rom_at_program_start() {
        let mut mem = Memory::new();
        mem.load_rom(&[0x00, 0xE0]).unwrap();
        assert_eq!(mem.slice(0x200, 2).unwrap(), &[0x00, 0xE0]);
    }

    #[test]
    fn test_load_rejects_oversized_program() {
        let mut mem = Memory::new();
        assert!(mem.load_rom(&[0; MAX_PROGRAM_SIZE]).is_ok());
        match mem.load_rom(&[0; MAX_PROGRAM_SIZE + 1]) {
            Err(EmuError::RomTooLarge { size, max }) => {
                assert_eq!(size, MAX_PROGRAM_SIZE + 1);
                assert_eq!(max, MAX_PROGRAM_SIZE);
            }
            _ => panic!("expected RomTooLarge"),
        }
    }

    #[test]
    fn test_load_offset_out_of_range() {
        let mut mem = Memory::new();
        assert!(matches!(
            mem.load(&[], 0x1001),
            Err(EmuError::MemoryOutOfBounds { address: 0x1001 })
        ));
        assert!(matches!(
            mem.load(&[0xAA], 0x1000),
            Err(EmuError::MemoryOutOfBounds { address: 0x1000 })
        ));
        assert!(mem.load(&[0xAA], 0xFFF).is_ok());
        assert_eq!(mem.read8(0xFFF).unwrap(), 0xAA);
    }

    #[test]
    fn test_read_missing_rom_file() {
        assert!(matches!(
            read_rom_file("/nonexistent/definitely/not/here.ch8"),
            Err(EmuError::Io(_))
        ));
    }
}
