//! The floating-point register file.
//!
//! Thirty-two 32-bit registers holding raw bit patterns of single-precision
//! values. Unlike [`super::gpr::Gpr`], there is no hardwired-zero register;
//! every write applies, including to `f0`.

pub struct Fpr {
    regs: [u32; 32],
}

impl Fpr {
    pub fn new() -> Self {
        Self { regs: [0; 32] }
    }

    pub fn read(&self, idx: usize) -> u32 {
        self.regs[idx]
    }

    pub fn write(&mut self, idx: usize, bits: u32) {
        self.regs[idx] = bits;
    }

    pub fn dump(&self) {
        for i in (0..32).step_by(2) {
            println!(
                "f{:<2}={:#010x} f{:<2}={:#010x}",
                i,
                self.regs[i],
                i + 1,
                self.regs[i + 1]
            );
        }
    }
}

impl Default for Fpr {
    fn default() -> Self {
        Self::new()
    }
}
