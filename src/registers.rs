use crate::error::EmuError;
use crate::memory::{TypeAddr, PROGRAM_START};

pub const REGISTER_COUNT: usize = 16;
pub const FLAG: u8 = 0xF;
pub const STACK_DEPTH: usize = 16;

/// V0..VF. VF doubles as the carry/borrow/collision flag.
#[derive(Debug, Default)]
pub struct Registers {
    registers: [u8; REGISTER_COUNT],
}

impl Registers {
    pub fn new() -> Self {
        Self {
            registers: [0; REGISTER_COUNT],
        }
    }

    pub fn reset(&mut self) {
        self.registers = [0; REGISTER_COUNT];
    }

    pub fn set_register(&mut self, reg_num: u8, value: u8) {
        self.registers[reg_num as usize] = value;
    }

    pub fn add_to_register(&mut self, reg_num: u8, value: u8) {
        let reg = &mut self.registers[reg_num as usize];
        *reg = reg.wrapping_add(value);
    }

    pub fn set_flag(&mut self, flag: bool) {
        self.set_register(FLAG, flag as u8);
    }

    pub fn get(&self, reg_num: u8) -> u8 {
        self.registers[reg_num as usize]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.registers
    }
}

// Special registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramCounter(pub TypeAddr);

impl ProgramCounter {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(2);
    }

    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = addr;
    }
}

impl Default for ProgramCounter {
    fn default() -> Self {
        ProgramCounter(PROGRAM_START)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IndexRegister(pub TypeAddr);

impl IndexRegister {
    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = addr;
    }
}

/// Fixed-depth return address stack. Pushing a 17th entry or popping an
/// empty stack is a fault, never a wrap.
#[derive(Debug, Default)]
pub struct Stack {
    addresses: [TypeAddr; STACK_DEPTH],
    sp: u8,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.addresses = [0; STACK_DEPTH];
        self.sp = 0;
    }

    pub fn push(&mut self, addr: TypeAddr) -> Result<(), EmuError> {
        if self.sp as usize == STACK_DEPTH {
            return Err(EmuError::StackOverflow { address: addr });
        }
        self.addresses[self.sp as usize] = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<TypeAddr, EmuError> {
        if self.sp == 0 {
            return Err(EmuError::StackUnderflow);
        }
        self.sp -= 1;
        Ok(self.addresses[self.sp as usize])
    }

    pub fn sp(&self) -> u8 {
        self.sp
    }

    /// Return addresses currently in use, oldest first.
    pub fn frames(&self) -> &[TypeAddr] {
        &self.addresses[..self.sp as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_to_register_wraps() {
        let mut regs = Registers::new();
        regs.set_register(3, 0xFF);
        regs.add_to_register(3, 2);
        assert_eq!(regs.get(3), 1);
        assert_eq!(regs.get(FLAG), 0);
    }

    #[test]
    fn test_set_flag() {
        let mut regs = Registers::new();
        regs.set_flag(true);
        assert_eq!(regs.get(0xF), 1);
        regs.set_flag(false);
        assert_eq!(regs.get(0xF), 0);
    }

    #[test]
    fn test_pc_starts_at_program() {
        assert_eq!(ProgramCounter::default().0, 0x200);
    }

    #[test]
    fn test_stack_push_pop() {
        let mut stack = Stack::new();
        stack.push(0x202).unwrap();
        stack.push(0x304).unwrap();
        assert_eq!(stack.sp(), 2);
        assert_eq!(stack.frames(), &[0x202, 0x304]);
        assert_eq!(stack.pop().unwrap(), 0x304);
        assert_eq!(stack.pop().unwrap(), 0x202);
        assert_eq!(stack.sp(), 0);
    }

    #[test]
    fn test_stack_overflow() {
        let mut stack = Stack::new();
        for i in 0..STACK_DEPTH {
            stack.push(i as TypeAddr).unwrap();
        }
        assert!(matches!(
            stack.push(0xABC),
            Err(EmuError::StackOverflow { address: 0xABC })
        ));
        // nothing overwritten
        assert_eq!(stack.frames()[0], 0);
        assert_eq!(stack.sp(), 16);
    }

    #[test]
    fn test_stack_underflow() {
        let mut stack = Stack::new();
        assert!(matches!(stack.pop(), Err(EmuError::StackUnderflow)));
        assert_eq!(stack.sp(), 0);
    }
}
