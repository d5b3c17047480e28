//! Trap taxonomy and memory-access classification.
//!
//! Cause codes match the standard RISC-V `mcause` exception encoding so
//! that a host vectoring into a real trap handler sees the same numbers
//! an RTL implementation would produce.

/// Classification of a memory access, used to pick the right trap variant
/// when a [`MemFault`] occurs partway through an access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessType {
    /// Instruction fetch.
    Fetch,
    /// Data load.
    Read,
    /// Data store (including the store half of an AMO).
    Write,
}

/// Access width in bytes for a load, store, or atomic memory operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Width {
    Byte,
    Half,
    Word,
}

impl Width {
    pub fn bytes(self) -> u32 {
        match self {
            Width::Byte => 1,
            Width::Half => 2,
            Width::Word => 4,
        }
    }
}

/// Standard RISC-V synchronous exception codes (`mcause` values with the
/// interrupt bit clear). Only the codes this model can actually raise are
/// enumerated; interrupts are out of scope entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum CauseCode {
    InstructionAddressMisaligned = 0,
    InstructionAccessFault = 1,
    IllegalInstruction = 2,
    Breakpoint = 3,
    LoadAddressMisaligned = 4,
    LoadAccessFault = 5,
    StoreAddressMisaligned = 6,
    StoreAccessFault = 7,
    EnvironmentCallFromMMode = 11,
}

/// An architectural trap: a cause code plus its `mtval` payload.
///
/// Raising a `Trap` from the executor never mutates architectural state by
/// itself; the step loop is responsible for leaving `pc` and all register
/// writes untouched and then, per the model's trap-entry policy, writing
/// `mepc`/`mcause`/`mtval` and transferring control to `mtvec`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trap {
    /// A fetch or branch/jump target was not aligned to an instruction
    /// boundary (2-byte aligned when C is enabled, 4-byte otherwise).
    InstructionAddressMisaligned(u32),
    /// The fetch callback reported an access fault at this address.
    InstructionAccessFault(u32),
    /// The 16-bit or 32-bit instruction word did not decode to any
    /// instruction this model implements.
    IllegalInstruction(u32),
    /// `ebreak`.
    Breakpoint,
    /// A load address was not naturally aligned to its width.
    LoadAddressMisaligned(u32),
    /// The load callback reported an access fault at this address.
    LoadAccessFault(u32),
    /// A store (or AMO) address was not naturally aligned to its width.
    StoreAddressMisaligned(u32),
    /// The store callback reported an access fault at this address.
    StoreAccessFault(u32),
    /// `ecall`, taken from the only privilege mode this model supports.
    EnvironmentCallFromMMode,
}

impl Trap {
    /// The `mcause` value this trap would be reported with.
    pub fn cause(&self) -> CauseCode {
        match self {
            Trap::InstructionAddressMisaligned(_) => CauseCode::InstructionAddressMisaligned,
            Trap::InstructionAccessFault(_) => CauseCode::InstructionAccessFault,
            Trap::IllegalInstruction(_) => CauseCode::IllegalInstruction,
            Trap::Breakpoint => CauseCode::Breakpoint,
            Trap::LoadAddressMisaligned(_) => CauseCode::LoadAddressMisaligned,
            Trap::LoadAccessFault(_) => CauseCode::LoadAccessFault,
            Trap::StoreAddressMisaligned(_) => CauseCode::StoreAddressMisaligned,
            Trap::StoreAccessFault(_) => CauseCode::StoreAccessFault,
            Trap::EnvironmentCallFromMMode => CauseCode::EnvironmentCallFromMMode,
        }
    }

    /// The `mtval` value this trap would be reported with.
    pub fn tval(&self) -> u32 {
        match self {
            Trap::InstructionAddressMisaligned(v)
            | Trap::InstructionAccessFault(v)
            | Trap::IllegalInstruction(v)
            | Trap::LoadAddressMisaligned(v)
            | Trap::LoadAccessFault(v)
            | Trap::StoreAddressMisaligned(v)
            | Trap::StoreAccessFault(v) => *v,
            Trap::Breakpoint | Trap::EnvironmentCallFromMMode => 0,
        }
    }
}

impl std::fmt::Display for Trap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trap::InstructionAddressMisaligned(a) => {
                write!(f, "misaligned instruction fetch at {:#x}", a)
            }
            Trap::InstructionAccessFault(a) => write!(f, "instruction access fault at {:#x}", a),
            Trap::IllegalInstruction(i) => write!(f, "illegal instruction {:#010x}", i),
            Trap::Breakpoint => write!(f, "breakpoint"),
            Trap::LoadAddressMisaligned(a) => write!(f, "misaligned load at {:#x}", a),
            Trap::LoadAccessFault(a) => write!(f, "load access fault at {:#x}", a),
            Trap::StoreAddressMisaligned(a) => write!(f, "misaligned store at {:#x}", a),
            Trap::StoreAccessFault(a) => write!(f, "store access fault at {:#x}", a),
            Trap::EnvironmentCallFromMMode => write!(f, "ecall from M-mode"),
        }
    }
}

impl std::error::Error for Trap {}

/// The result a [`crate::core::mem_bus::MemoryBus`] callback returns when
/// an access cannot be completed. Carries only the fault address; the
/// caller already knows the access type and width and maps this to the
/// right [`Trap`] variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemFault(pub u32);
