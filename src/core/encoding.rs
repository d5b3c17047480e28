//! Pure instruction decoding: bit-field extraction for the 32-bit and
//! 16-bit (compressed) encodings. Nothing in this module has any notion
//! of execution; it only turns raw instruction bits into typed fields.

/// A full 32-bit instruction word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Inst(pub u32);

impl Inst {
    pub fn opcode(self) -> u32 {
        self.0 & 0x7f
    }

    pub fn rd(self) -> usize {
        ((self.0 >> 7) & 0x1f) as usize
    }

    pub fn funct3(self) -> u32 {
        (self.0 >> 12) & 0x7
    }

    pub fn rs1(self) -> usize {
        ((self.0 >> 15) & 0x1f) as usize
    }

    pub fn rs2(self) -> usize {
        ((self.0 >> 20) & 0x1f) as usize
    }

    pub fn funct7(self) -> u32 {
        (self.0 >> 25) & 0x7f
    }

    /// `rs3` for the fused multiply-add formats.
    pub fn rs3(self) -> usize {
        ((self.0 >> 27) & 0x1f) as usize
    }

    /// `funct5` for the AMO opcode group (same bit position as `rs3`).
    pub fn funct5(self) -> u32 {
        (self.0 >> 27) & 0x1f
    }

    pub fn aq(self) -> bool {
        (self.0 >> 26) & 1 != 0
    }

    pub fn rl(self) -> bool {
        (self.0 >> 25) & 1 != 0
    }

    /// The FP rounding-mode field, which shares `funct3`'s bit position.
    pub fn rm(self) -> u32 {
        self.funct3()
    }

    /// `funct2` for the FP fused multiply-add formats (selects the FP
    /// format; always 0 for single precision, which is the only one
    /// this model implements).
    pub fn fmt(self) -> u32 {
        (self.0 >> 25) & 0x3
    }

    pub fn csr(self) -> u32 {
        (self.0 >> 20) & 0xfff
    }

    pub fn shamt(self) -> u32 {
        (self.0 >> 20) & 0x1f
    }

    /// The zero-extended `rs1` field read as a 5-bit immediate, used by
    /// the `csrr*i` immediate-source forms.
    pub fn zimm(self) -> u32 {
        (self.0 >> 15) & 0x1f
    }

    pub fn imm_i(self) -> i32 {
        (self.0 as i32) >> 20
    }

    pub fn imm_s(self) -> i32 {
        let hi = (self.0 >> 25) & 0x7f;
        let lo = (self.0 >> 7) & 0x1f;
        let raw = (hi << 5) | lo;
        ((raw << 20) as i32) >> 20
    }

    pub fn imm_b(self) -> i32 {
        let b12 = (self.0 >> 31) & 1;
        let b11 = (self.0 >> 7) & 1;
        let b10_5 = (self.0 >> 25) & 0x3f;
        let b4_1 = (self.0 >> 8) & 0xf;
        let raw = (b12 << 12) | (b11 << 11) | (b10_5 << 5) | (b4_1 << 1);
        ((raw << 19) as i32) >> 19
    }

    pub fn imm_u(self) -> i32 {
        (self.0 & 0xffff_f000) as i32
    }

    pub fn imm_j(self) -> i32 {
        let b20 = (self.0 >> 31) & 1;
        let b19_12 = (self.0 >> 12) & 0xff;
        let b11 = (self.0 >> 20) & 1;
        let b10_1 = (self.0 >> 21) & 0x3ff;
        let raw = (b20 << 20) | (b19_12 << 12) | (b11 << 11) | (b10_1 << 1);
        ((raw << 11) as i32) >> 11
    }
}

/// A 16-bit compressed instruction word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CInst(pub u16);

impl CInst {
    pub fn op(self) -> u16 {
        self.0 & 0x3
    }

    pub fn funct3(self) -> u16 {
        (self.0 >> 13) & 0x7
    }

    /// Full 5-bit register field at bits [11:7] (`rd`/`rs1` in CR/CI).
    pub fn rd(self) -> usize {
        ((self.0 >> 7) & 0x1f) as usize
    }

    /// Full 5-bit register field at bits [6:2] (`rs2` in CR/CSS).
    pub fn rs2(self) -> usize {
        (self.0 & 0x1f) as usize
    }

    /// 3-bit register field at bits [9:7], biased to x8-x15.
    pub fn rd_c(self) -> usize {
        (((self.0 >> 7) & 0x7) + 8) as usize
    }

    pub fn rs1_c(self) -> usize {
        self.rd_c()
    }

    /// 3-bit register field at bits [4:2], biased to x8-x15.
    pub fn rs2_c(self) -> usize {
        (((self.0 >> 2) & 0x7) + 8) as usize
    }

    pub fn ci_shamt(self) -> u32 {
        let b5 = ((self.0 >> 12) & 1) as u32;
        let b4_0 = ((self.0 >> 2) & 0x1f) as u32;
        (b5 << 5) | b4_0
    }

    /// `c.addi4spn`'s zero-extended, scaled-by-4 stack-pointer offset.
    pub fn ciw_uimm(self) -> u32 {
        let b9_6 = ((self.0 >> 7) & 0xf) as u32;
        let b5_4 = ((self.0 >> 11) & 0x3) as u32;
        let b3 = ((self.0 >> 5) & 1) as u32;
        let b2 = ((self.0 >> 6) & 1) as u32;
        (b9_6 << 6) | (b5_4 << 4) | (b3 << 3) | (b2 << 2)
    }

    /// `c.lw`/`c.sw`'s zero-extended, scaled-by-4 offset.
    pub fn cl_uimm(self) -> u32 {
        let b6 = ((self.0 >> 5) & 1) as u32;
        let b5_3 = ((self.0 >> 10) & 0x7) as u32;
        let b2 = ((self.0 >> 6) & 1) as u32;
        (b6 << 6) | (b5_3 << 3) | (b2 << 2)
    }

    /// `c.addi`/`c.li`/`c.andi`'s sign-extended 6-bit immediate.
    pub fn ci_imm(self) -> i32 {
        let raw = self.ci_raw6();
        ((raw << 26) as i32) >> 26
    }

    fn ci_raw6(self) -> u32 {
        let b5 = ((self.0 >> 12) & 1) as u32;
        let b4_0 = ((self.0 >> 2) & 0x1f) as u32;
        (b5 << 5) | b4_0
    }

    /// `c.lui`'s sign-extended immediate, already shifted into bits[31:12].
    pub fn ci_lui_imm(self) -> i32 {
        let raw = self.ci_raw6();
        ((raw << 26) as i32) >> 14
    }

    /// `c.addi16sp`'s sign-extended, scaled-by-16 immediate.
    pub fn ci_addi16sp_imm(self) -> i32 {
        let b9 = ((self.0 >> 12) & 1) as u32;
        let b8_7 = ((self.0 >> 3) & 0x3) as u32;
        let b6 = ((self.0 >> 5) & 1) as u32;
        let b5 = ((self.0 >> 2) & 1) as u32;
        let b4 = ((self.0 >> 6) & 1) as u32;
        let raw = (b9 << 9) | (b8_7 << 7) | (b6 << 6) | (b5 << 5) | (b4 << 4);
        ((raw << 22) as i32) >> 22
    }

    /// `c.lwsp`'s zero-extended, scaled-by-4 offset.
    pub fn ci_lwsp_uimm(self) -> u32 {
        let b7_6 = ((self.0 >> 2) & 0x3) as u32;
        let b5 = ((self.0 >> 12) & 1) as u32;
        let b4_2 = ((self.0 >> 4) & 0x7) as u32;
        (b7_6 << 6) | (b5 << 5) | (b4_2 << 2)
    }

    /// `c.swsp`'s zero-extended, scaled-by-4 offset.
    pub fn css_swsp_uimm(self) -> u32 {
        let b7_6 = ((self.0 >> 7) & 0x3) as u32;
        let b5_2 = ((self.0 >> 9) & 0xf) as u32;
        (b7_6 << 6) | (b5_2 << 2)
    }

    /// `c.j`/`c.jal`'s sign-extended, scaled-by-2 offset.
    pub fn cj_imm(self) -> i32 {
        let b11 = ((self.0 >> 12) & 1) as u32;
        let b4 = ((self.0 >> 11) & 1) as u32;
        let b9_8 = ((self.0 >> 9) & 0x3) as u32;
        let b10 = ((self.0 >> 8) & 1) as u32;
        let b6 = ((self.0 >> 7) & 1) as u32;
        let b7 = ((self.0 >> 6) & 1) as u32;
        let b3_1 = ((self.0 >> 3) & 0x7) as u32;
        let b5 = ((self.0 >> 2) & 1) as u32;
        let raw = (b11 << 11)
            | (b10 << 10)
            | (b9_8 << 8)
            | (b7 << 7)
            | (b6 << 6)
            | (b5 << 5)
            | (b4 << 4)
            | (b3_1 << 1);
        ((raw << 20) as i32) >> 20
    }

    /// `c.beqz`/`c.bnez`'s sign-extended, scaled-by-2 offset.
    pub fn cb_imm(self) -> i32 {
        let b8 = ((self.0 >> 12) & 1) as u32;
        let b4_3 = ((self.0 >> 10) & 0x3) as u32;
        let b7_6 = ((self.0 >> 5) & 0x3) as u32;
        let b2_1 = ((self.0 >> 3) & 0x3) as u32;
        let b5 = ((self.0 >> 2) & 1) as u32;
        let raw = (b8 << 8) | (b7_6 << 6) | (b5 << 5) | (b4_3 << 3) | (b2_1 << 1);
        ((raw << 23) as i32) >> 23
    }
}

/// An instruction is compressed iff its low two bits are not `0b11`.
pub fn is_compressed(low_halfword: u16) -> bool {
    low_halfword & 0x3 != 0x3
}
