//! The integer register file.
//!
//! Thirty-two 32-bit registers, x0 hardwired to zero.

pub struct Gpr {
    regs: [u32; 32],
}

impl Gpr {
    pub fn new() -> Self {
        Self { regs: [0; 32] }
    }

    /// Reads register `idx`. `idx` 0 always reads as zero regardless of
    /// what was last stored there.
    pub fn read(&self, idx: usize) -> u32 {
        if idx == 0 {
            0
        } else {
            self.regs[idx]
        }
    }

    /// Writes `val` to register `idx`. Writing `idx` 0 is a no-op; the
    /// caller is responsible for not recording a trace bit in that case
    /// (see [`crate::core::trace::TraceRecord::mark_xreg`]).
    pub fn write(&mut self, idx: usize, val: u32) {
        if idx != 0 {
            self.regs[idx] = val;
        }
    }

    pub fn dump(&self) {
        for i in (0..32).step_by(2) {
            println!(
                "x{:<2}={:#010x} x{:<2}={:#010x}",
                i,
                self.regs[i],
                i + 1,
                self.regs[i + 1]
            );
        }
    }
}

impl Default for Gpr {
    fn default() -> Self {
        Self::new()
    }
}
