use log::{debug, info, trace, warn};
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

use crate::{
    decode::Instruction,
    display::FrameBuffer,
    error::EmuError,
    keyboard::Keypad,
    memory::{Memory, TypeAddr, FONT_START, GLYPH_SIZE, MEMORY_SIZE, PROGRAM_START},
    registers::{IndexRegister, ProgramCounter, Registers, Stack},
    timer::Timer,
};

/// Lifecycle of an interpreter instance.
///
/// `Uninitialized -> Ready` on [`Emulator::reset`], `Ready -> Running` on the
/// first [`Emulator::step`], `Running <-> WaitingForKey` around FX0A, and any
/// fault moves to `Halted`. `reset` returns to `Ready` from every state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineState {
    Uninitialized,
    Ready,
    Running,
    WaitingForKey { register: u8 },
    /// `pc` is the address of the faulting instruction, `opcode` the last
    /// word fetched before the fault.
    Halted {
        fault: String,
        pc: TypeAddr,
        opcode: u16,
    },
}

/// Outcome of one successful [`Emulator::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    Continue,
    /// The framebuffer changed this cycle.
    Redraw,
    /// FX0A is blocked until a key is held; nothing was fetched.
    WaitingForKey,
}

impl CycleStatus {
    pub fn render_requested(&self) -> bool {
        matches!(self, CycleStatus::Redraw)
    }
}

/// The CHIP-8 interpreter core: register bank, stack, timers, memory and
/// framebuffer, advanced one instruction per [`step`](Emulator::step).
///
/// The random source for CXNN is injected so runs can be reproduced.
pub struct Emulator<R: RngCore = StdRng> {
    fb: FrameBuffer,
    regs: Registers,
    mem: Memory,
    pc: ProgramCounter,
    index: IndexRegister,
    stack: Stack,
    delay_timer: Timer,
    sound_timer: Timer,
    opcode: u16,
    state: MachineState,
    rng: R,
}

impl Emulator<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for Emulator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> Emulator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            fb: FrameBuffer::new(),
            regs: Registers::new(),
            mem: Memory::new(),
            pc: ProgramCounter::default(),
            index: IndexRegister::default(),
            stack: Stack::new(),
            delay_timer: Timer::default(),
            sound_timer: Timer::default(),
            opcode: 0,
            state: MachineState::Uninitialized,
            rng,
        }
    }

    /// Zeroes registers, stack, timers and memory, reinstalls the glyph
    /// table and points PC at 0x200. The framebuffer is left alone.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.stack.reset();
        self.mem.reset();
        self.pc = ProgramCounter::default();
        self.index = IndexRegister::default();
        self.delay_timer = Timer::default();
        self.sound_timer = Timer::default();
        self.opcode = 0;
        self.state = MachineState::Ready;
        info!("machine reset, pc = {:#05X}", PROGRAM_START);
    }

    pub fn load_program(&mut self, program: &[u8]) -> Result<(), EmuError> {
        if self.state == MachineState::Uninitialized {
            return Err(EmuError::NotReady);
        }
        self.mem.load_rom(program)?;
        info!("loaded {} byte program at {:#05X}", program.len(), PROGRAM_START);
        Ok(())
    }

    /// Runs one fetch-decode-execute cycle.
    ///
    /// A fault halts the machine; later calls return [`EmuError::Halted`]
    /// until the next [`reset`](Emulator::reset).
    pub fn step<K: Keypad + ?Sized>(&mut self, keypad: &K) -> Result<CycleStatus, EmuError> {
        match &self.state {
            MachineState::Uninitialized => return Err(EmuError::NotReady),
            MachineState::Halted { fault, .. } => {
                return Err(EmuError::Halted {
                    fault: fault.clone(),
                })
            }
            MachineState::WaitingForKey { register } => {
                let register = *register;
                return Ok(self.resume_on_key(register, keypad));
            }
            MachineState::Ready | MachineState::Running => {}
        }

        self.state = MachineState::Running;
        let at = self.pc.0;
        self.cycle(keypad).map_err(|fault| {
            warn!(
                "halting at pc {:#05X} (opcode {:04X}): {}",
                at, self.opcode, fault
            );
            self.state = MachineState::Halted {
                fault: fault.to_string(),
                pc: at,
                opcode: self.opcode,
            };
            fault
        })
    }

    /// One externally paced 60 Hz tick of the delay and sound timers.
    pub fn tick_timers(&mut self) {
        self.delay_timer.tick();
        self.sound_timer.tick();
    }

    fn resume_on_key<K: Keypad + ?Sized>(&mut self, register: u8, keypad: &K) -> CycleStatus {
        match keypad.pressed_key() {
            Some(key) => {
                debug!("key {:X} released wait on V{:X}", key, register);
                self.regs.set_register(register, key);
                self.state = MachineState::Running;
                CycleStatus::Continue
            }
            None => CycleStatus::WaitingForKey,
        }
    }

    fn cycle<K: Keypad + ?Sized>(&mut self, keypad: &K) -> Result<CycleStatus, EmuError> {
        let at = self.pc.0;
        self.opcode = self.mem.read16(at)?;
        self.pc.increment();
        let ins = Instruction::decode(self.opcode)?;
        trace!("{:03X}: {:04X} {:?}", at, self.opcode, ins);
        self.execute_ins(ins, keypad)
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.pc.increment();
        }
    }

    fn execute_ins<K: Keypad + ?Sized>(
        &mut self,
        ins: Instruction,
        keypad: &K,
    ) -> Result<CycleStatus, EmuError> {
        match ins {
            Instruction::Sys(addr) => {
                debug!("ignoring machine code call to {:#05X}", addr);
            }
            Instruction::ClearScreen => {
                self.fb.clear();
                return Ok(CycleStatus::Redraw);
            }
            Instruction::PopSubroutine => {
                let addr = self.stack.pop()?;
                self.pc.set_addr(addr);
            }
            Instruction::Jump(addr) => {
                self.pc.set_addr(addr);
            }
            Instruction::PushSubroutine(addr) => {
                // pc already points past the call
                self.stack.push(self.pc.0)?;
                self.pc.set_addr(addr);
            }

            Instruction::SkipEqualConstant(vx, nn) => self.skip_if(self.regs.get(vx) == nn),
            Instruction::SkipNotEqualConstant(vx, nn) => self.skip_if(self.regs.get(vx) != nn),
            Instruction::SkipEqualRegister(vx, vy) => {
                self.skip_if(self.regs.get(vx) == self.regs.get(vy))
            }
            Instruction::SkipNotEqualRegister(vx, vy) => {
                self.skip_if(self.regs.get(vx) != self.regs.get(vy))
            }

            Instruction::SetRegister(vx, nn) => self.regs.set_register(vx, nn),
            Instruction::AddToRegister(vx, nn) => self.regs.add_to_register(vx, nn),

            Instruction::CopyRegister(vx, vy) => self.regs.set_register(vx, self.regs.get(vy)),
            Instruction::Or(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) | self.regs.get(vy));
            }
            Instruction::And(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) & self.regs.get(vy));
            }
            Instruction::XOr(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) ^ self.regs.get(vy));
            }

            // flag is written after the result so it survives when x = F
            Instruction::Add(vx, vy) => {
                let sum = self.regs.get(vx) as u16 + self.regs.get(vy) as u16;
                self.regs.set_register(vx, (sum & 0xFF) as u8);
                self.regs.set_flag(sum > 0xFF);
            }
            Instruction::SubtractForward(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                self.regs.set_register(vx, x.wrapping_sub(y));
                self.regs.set_flag(x > y);
            }
            Instruction::SubtractBackward(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                self.regs.set_register(vx, y.wrapping_sub(x));
                self.regs.set_flag(y > x);
            }
            Instruction::RightShift(vx, _) => {
                let x = self.regs.get(vx);
                self.regs.set_register(vx, x >> 1);
                self.regs.set_flag(x & 1 == 1);
            }
            Instruction::LeftShift(vx, _) => {
                let x = self.regs.get(vx);
                self.regs.set_register(vx, x << 1);
                self.regs.set_flag((x >> 7) & 1 == 1);
            }

            Instruction::SetIndexRegister(addr) => self.index.set_addr(addr),
            Instruction::JumpWithOffset(addr) => {
                self.pc.set_addr(addr + self.regs.get(0) as TypeAddr);
            }
            Instruction::Random(vx, nn) => {
                let ransuu: u8 = self.rng.gen();
                self.regs.set_register(vx, ransuu & nn);
            }
            Instruction::Display(vx, vy, height) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                let sprite = self.mem.slice(self.index.0, height as usize)?;
                let collision = self.fb.paint(x, y, sprite);
                self.regs.set_flag(collision);
                return Ok(CycleStatus::Redraw);
            }

            Instruction::SkipIfPressed(vx) => self.skip_if(keypad.is_pressed(self.regs.get(vx))),
            Instruction::SkipIfNotPressed(vx) => {
                self.skip_if(!keypad.is_pressed(self.regs.get(vx)))
            }

            Instruction::CopyDelayToRegister(vx) => {
                self.regs.set_register(vx, self.delay_timer.count)
            }
            Instruction::GetKey(vx) => match keypad.pressed_key() {
                Some(key) => self.regs.set_register(vx, key),
                None => {
                    debug!("waiting for a key into V{:X}", vx);
                    self.state = MachineState::WaitingForKey { register: vx };
                    return Ok(CycleStatus::WaitingForKey);
                }
            },
            Instruction::CopyRegisterToDelay(vx) => self.delay_timer.set(self.regs.get(vx)),
            Instruction::CopyRegisterToSound(vx) => self.sound_timer.set(self.regs.get(vx)),

            Instruction::AddToIndex(vx) => {
                // I is not wrapped: leaving the address space is a fault
                let addr = self.index.0 as usize + self.regs.get(vx) as usize;
                if addr >= MEMORY_SIZE {
                    return Err(EmuError::MemoryOutOfBounds { address: addr });
                }
                self.index.set_addr(addr as TypeAddr);
            }
            Instruction::PointChar(vx) => {
                let addr = FONT_START + GLYPH_SIZE * self.regs.get(vx) as usize;
                self.index.set_addr(addr as TypeAddr);
            }
            Instruction::ToDecimal(vx) => {
                let value = self.regs.get(vx);
                let digits = [value / 100, (value / 10) % 10, value % 10];
                let start = self.index.0;
                self.mem.slice(start, digits.len())?;
                for (i, digit) in digits.iter().enumerate() {
                    self.mem.write8(start + i as TypeAddr, *digit)?;
                }
            }
            Instruction::StoreRegisterToMemory(vx) => {
                let start = self.index.0;
                self.mem.slice(start, vx as usize + 1)?;
                for reg in 0..=vx {
                    self.mem.write8(start + reg as TypeAddr, self.regs.get(reg))?;
                }
            }
            Instruction::LoadRegisterFromMemory(vx) => {
                let values = self.mem.slice(self.index.0, vx as usize + 1)?;
                for (reg, value) in values.iter().enumerate() {
                    self.regs.set_register(reg as u8, *value);
                }
            }
        }
        Ok(CycleStatus::Continue)
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn is_halted(&self) -> bool {
        matches!(self.state, MachineState::Halted { .. })
    }

    pub fn pc(&self) -> TypeAddr {
        self.pc.0
    }

    pub fn index(&self) -> TypeAddr {
        self.index.0
    }

    pub fn sp(&self) -> u8 {
        self.stack.sp()
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn register(&self, reg_num: u8) -> u8 {
        self.regs.get(reg_num)
    }

    pub fn registers(&self) -> &[u8] {
        self.regs.as_slice()
    }

    /// The most recently fetched instruction word.
    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer.count
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer.count
    }

    /// Whether a tone should be sounding. Only the countdown is modelled.
    pub fn sound_active(&self) -> bool {
        self.sound_timer.is_active()
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.fb
    }
}
