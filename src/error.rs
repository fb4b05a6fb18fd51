use crate::memory::TypeAddr;

/// Faults the interpreter can raise. Every variant is fatal to the current run:
/// the machine halts and the driver decides what to do next.
#[derive(Debug, thiserror::Error)]
pub enum EmuError {
    #[error("unknown opcode {opcode:#06X}")]
    UnknownOpcode { opcode: u16 },

    #[error("stack overflow: cannot save return address {address:#05X}, all 16 slots in use")]
    StackOverflow { address: TypeAddr },

    #[error("stack underflow: return with an empty call stack")]
    StackUnderflow,

    #[error("memory access out of bounds at {address:#06X}")]
    MemoryOutOfBounds { address: usize },

    #[error("program is {size} bytes, at most {max} fit above 0x200")]
    RomTooLarge { size: usize, max: usize },

    #[error("machine has not been reset")]
    NotReady,

    #[error("machine is halted: {fault}")]
    Halted { fault: String },

    #[error("usage: {0}")]
    Usage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Window(#[from] minifb::Error),
}
