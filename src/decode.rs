use crate::error::EmuError;
use crate::memory::TypeAddr;

/// A fetched 16-bit instruction word, split into nibble fields on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInstruction {
    code: u16,
}

impl RawInstruction {
    pub fn new(code: u16) -> Self {
        RawInstruction { code }
    }

    // n is the starting nibble (1 = most significant), m is the length in nibbles
    pub fn nth_m_digits(&self, n: u8, m: u8) -> u16 {
        // 0xABCD, n = 2, m = 2 -> shift 4, mask 0xFF -> 0xBC
        let shift_places = (4 - m - (n - 1)) * 4;
        let mask = (1u32 << (4 * m as u32)) - 1;
        (self.code >> shift_places) & mask as u16
    }

    /// Top nibble, selects the instruction family.
    pub fn family(&self) -> u8 {
        self.nth_m_digits(1, 1) as u8
    }

    pub fn x(&self) -> u8 {
        self.nth_m_digits(2, 1) as u8
    }

    pub fn y(&self) -> u8 {
        self.nth_m_digits(3, 1) as u8
    }

    pub fn n(&self) -> u8 {
        self.nth_m_digits(4, 1) as u8
    }

    pub fn nn(&self) -> u8 {
        self.nth_m_digits(3, 2) as u8
    }

    pub fn nnn(&self) -> TypeAddr {
        self.nth_m_digits(2, 3)
    }
}

/// The original CHIP-8 instruction set. `x`/`y` fields are register
/// indices, `nn` an 8-bit immediate, `TypeAddr` a 12-bit address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Machine code routine on the original hardware, ignored.
    Sys(TypeAddr),
    ClearScreen,
    PopSubroutine,
    Jump(TypeAddr),
    PushSubroutine(TypeAddr),

    SkipEqualConstant(u8, u8),
    SkipNotEqualConstant(u8, u8),
    SkipEqualRegister(u8, u8),
    SkipNotEqualRegister(u8, u8),

    SetRegister(u8, u8),
    /// Wrapping add, VF untouched.
    AddToRegister(u8, u8),

    CopyRegister(u8, u8),
    Or(u8, u8),
    And(u8, u8),
    XOr(u8, u8),
    Add(u8, u8),
    SubtractForward(u8, u8),
    RightShift(u8, u8),
    SubtractBackward(u8, u8),
    LeftShift(u8, u8),

    SetIndexRegister(TypeAddr),
    JumpWithOffset(TypeAddr),
    Random(u8, u8),
    /// XOR an N byte sprite from I onto the screen at (VX, VY), VF = collision.
    Display(u8, u8, u8),

    SkipIfPressed(u8),
    SkipIfNotPressed(u8),

    CopyDelayToRegister(u8),
    GetKey(u8),
    CopyRegisterToDelay(u8),
    CopyRegisterToSound(u8),
    AddToIndex(u8),
    PointChar(u8),
    ToDecimal(u8),
    StoreRegisterToMemory(u8),
    LoadRegisterFromMemory(u8),
}

impl Instruction {
    pub fn decode(code: u16) -> Result<Self, EmuError> {
        let raw = RawInstruction::new(code);
        let (x, y, n, nn, nnn) = (raw.x(), raw.y(), raw.n(), raw.nn(), raw.nnn());
        let unknown = Err(EmuError::UnknownOpcode { opcode: code });

        let ins = match raw.family() {
            0x0 => match code {
                0x00E0 => Self::ClearScreen,
                0x00EE => Self::PopSubroutine,
                _ => Self::Sys(nnn),
            },
            0x1 => Self::Jump(nnn),
            0x2 => Self::PushSubroutine(nnn),
            0x3 => Self::SkipEqualConstant(x, nn),
            0x4 => Self::SkipNotEqualConstant(x, nn),
            0x5 if n == 0 => Self::SkipEqualRegister(x, y),
            0x6 => Self::SetRegister(x, nn),
            0x7 => Self::AddToRegister(x, nn),
            0x8 => match n {
                0x0 => Self::CopyRegister(x, y),
                0x1 => Self::Or(x, y),
                0x2 => Self::And(x, y),
                0x3 => Self::XOr(x, y),
                0x4 => Self::Add(x, y),
                0x5 => Self::SubtractForward(x, y),
                0x6 => Self::RightShift(x, y),
                0x7 => Self::SubtractBackward(x, y),
                0xE => Self::LeftShift(x, y),
                _ => return unknown,
            },
            0x9 if n == 0 => Self::SkipNotEqualRegister(x, y),
            0xA => Self::SetIndexRegister(nnn),
            0xB => Self::JumpWithOffset(nnn),
            0xC => Self::Random(x, nn),
            0xD => Self::Display(x, y, n),
            0xE => match nn {
                0x9E => Self::SkipIfPressed(x),
                0xA1 => Self::SkipIfNotPressed(x),
                _ => return unknown,
            },
            0xF => match nn {
                0x07 => Self::CopyDelayToRegister(x),
                0x0A => Self::GetKey(x),
                0x15 => Self::CopyRegisterToDelay(x),
                0x18 => Self::CopyRegisterToSound(x),
                0x1E => Self::AddToIndex(x),
                0x29 => Self::PointChar(x),
                0x33 => Self::ToDecimal(x),
                0x55 => Self::StoreRegisterToMemory(x),
                0x65 => Self::LoadRegisterFromMemory(x),
                _ => return unknown,
            },
            _ => return unknown,
        };
        Ok(ins)
    }
}
