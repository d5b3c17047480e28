//! Instruction execution: one function per opcode group, all operating
//! on an already-decoded [`Inst`]/[`CInst`] against a [`Model`] and a
//! [`MemoryBus`].
//!
//! Every function here follows the same discipline: any fallible memory
//! or CSR operation happens *before* any register is written, so that a
//! `Trap` returned partway through never leaves a partially-applied
//! instruction behind. [`NextPc`] is the one piece of mutable state an
//! executor function is allowed to touch freely before knowing whether
//! the instruction as a whole succeeds, because the step loop discards
//! it entirely on `Err`.

use crate::common::error::{AccessType, Trap, Width};
use crate::core::arch::csr;
use crate::core::encoding::{CInst, Inst};
use crate::core::mem_bus::MemoryBus;
use crate::core::state::{CsrError, Model};
use crate::core::units::alu::{Alu, AluOp};
use crate::core::units::float_shim::{self, RoundingMode};
use crate::core::units::lsu::AtomicOp;

/// Everything that can keep an instruction from committing. A `Trap`
/// is architectural — the step loop vectors into trap entry and
/// execution continues. `Unimplemented` is not: it names a CSR this
/// configuration has no storage for at all, which this library treats
/// as a hard implementation limit rather than a value it could sensibly
/// make up. A library aborting the host process on a data-dependent
/// condition is not an acceptable API, so this is surfaced as an error
/// instead; it is up to the embedding CLI whether that error is fatal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecError {
    Trap(Trap),
    UnimplementedCsr(u16),
}

impl From<Trap> for ExecError {
    fn from(t: Trap) -> Self {
        ExecError::Trap(t)
    }
}

impl std::fmt::Display for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecError::Trap(t) => write!(f, "{t}"),
            ExecError::UnimplementedCsr(addr) => write!(f, "unimplemented csr {addr:#06x}"),
        }
    }
}

impl std::error::Error for ExecError {}

pub type ExecResult = Result<(), ExecError>;
type TrapResult = Result<(), Trap>;

/// The PC the step loop will commit to if this instruction succeeds.
/// Starts at the address of the following instruction; branches, jumps,
/// and `mret` overwrite it with [`NextPc::jump`].
pub struct NextPc(u32);

impl NextPc {
    pub fn sequential(pc: u32, len: u32) -> Self {
        NextPc(pc.wrapping_add(len))
    }

    pub fn jump(&mut self, target: u32) {
        self.0 = target;
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

const OP_LUI: u32 = 0x37;
const OP_AUIPC: u32 = 0x17;
const OP_JAL: u32 = 0x6f;
const OP_JALR: u32 = 0x67;
const OP_BRANCH: u32 = 0x63;
const OP_LOAD: u32 = 0x03;
const OP_STORE: u32 = 0x23;
const OP_IMM: u32 = 0x13;
const OP_REG: u32 = 0x33;
const OP_MISC_MEM: u32 = 0x0f;
const OP_SYSTEM: u32 = 0x73;
const OP_AMO: u32 = 0x2f;
const OP_LOAD_FP: u32 = 0x07;
const OP_STORE_FP: u32 = 0x27;
const OP_FP: u32 = 0x53;
const OP_FMADD: u32 = 0x43;
const OP_FMSUB: u32 = 0x47;
const OP_FNMSUB: u32 = 0x4b;
const OP_FNMADD: u32 = 0x4f;

/// Executes one 32-bit instruction.
pub fn execute(model: &mut Model, inst: Inst, mem: &mut impl MemoryBus, npc: &mut NextPc) -> ExecResult {
    match inst.opcode() {
        OP_LUI => {
            model.write_xreg(inst.rd(), inst.imm_u() as u32);
            Ok(())
        }
        OP_AUIPC => {
            model.write_xreg(inst.rd(), model.pc.wrapping_add(inst.imm_u() as u32));
            Ok(())
        }
        OP_JAL => {
            let target = model.pc.wrapping_add(inst.imm_j() as u32);
            if !model.is_pc_aligned(target) {
                return Err(Trap::InstructionAddressMisaligned(target).into());
            }
            model.write_xreg(inst.rd(), npc.get());
            npc.jump(target);
            Ok(())
        }
        OP_JALR => {
            let base = model.gpr.read(inst.rs1());
            let target = base.wrapping_add(inst.imm_i() as u32) & !1;
            if !model.is_pc_aligned(target) {
                return Err(Trap::InstructionAddressMisaligned(target).into());
            }
            let link = npc.get();
            model.write_xreg(inst.rd(), link);
            npc.jump(target);
            Ok(())
        }
        OP_BRANCH => Ok(exec_branch(model, inst, npc)?),
        OP_LOAD => Ok(exec_load(model, inst, mem)?),
        OP_STORE => Ok(exec_store(model, inst, mem)?),
        OP_IMM => Ok(exec_op_imm(model, inst)?),
        OP_REG => Ok(exec_op(model, inst)?),
        OP_MISC_MEM => Ok(()), // fence / fence.i: no cache or reordering to fence here.
        OP_SYSTEM => exec_system(model, inst, npc),
        OP_AMO => Ok(exec_amo(model, inst, mem)?),
        OP_LOAD_FP => {
            require_float(model, inst)?;
            Ok(exec_load_fp(model, inst, mem)?)
        }
        OP_STORE_FP => {
            require_float(model, inst)?;
            Ok(exec_store_fp(model, inst, mem)?)
        }
        OP_FP => {
            require_float(model, inst)?;
            Ok(exec_op_fp(model, inst)?)
        }
        OP_FMADD | OP_FMSUB | OP_FNMSUB | OP_FNMADD => {
            require_float(model, inst)?;
            Ok(exec_fma(model, inst)?)
        }
        _ => Err(Trap::IllegalInstruction(inst.0).into()),
    }
}

fn exec_branch(model: &mut Model, inst: Inst, npc: &mut NextPc) -> TrapResult {
    let a = model.gpr.read(inst.rs1());
    let b = model.gpr.read(inst.rs2());
    let taken = match inst.funct3() {
        0 => a == b,                       // beq
        1 => a != b,                       // bne
        4 => (a as i32) < (b as i32),      // blt
        5 => (a as i32) >= (b as i32),     // bge
        6 => a < b,                        // bltu
        7 => a >= b,                       // bgeu
        _ => return Err(Trap::IllegalInstruction(inst.0)),
    };
    if taken {
        let target = model.pc.wrapping_add(inst.imm_b() as u32);
        if !model.is_pc_aligned(target) {
            return Err(Trap::InstructionAddressMisaligned(target));
        }
        npc.jump(target);
    }
    Ok(())
}

fn load_width_sign(funct3: u32) -> Option<(Width, bool)> {
    match funct3 {
        0 => Some((Width::Byte, true)),
        1 => Some((Width::Half, true)),
        2 => Some((Width::Word, true)),
        4 => Some((Width::Byte, false)),
        5 => Some((Width::Half, false)),
        _ => None,
    }
}

fn exec_load(model: &mut Model, inst: Inst, mem: &mut impl MemoryBus) -> TrapResult {
    let (width, signed) = load_width_sign(inst.funct3()).ok_or(Trap::IllegalInstruction(inst.0))?;
    let addr = model.gpr.read(inst.rs1()).wrapping_add(inst.imm_i() as u32);
    let value = do_load(mem, addr, width)?;
    let sext = sign_extend_load(value, width, signed);
    model.write_xreg(inst.rd(), sext);
    Ok(())
}

fn do_load(mem: &mut impl MemoryBus, addr: u32, width: Width) -> Result<u32, Trap> {
    check_alignment(addr, width, AccessType::Read)?;
    match width {
        Width::Byte => mem.read_u8(addr).map(|v| v as u32),
        Width::Half => mem.read_u16(addr).map(|v| v as u32),
        Width::Word => mem.read_u32(addr),
    }
    .map_err(|f| Trap::LoadAccessFault(f.0))
}

fn sign_extend_load(value: u32, width: Width, signed: bool) -> u32 {
    if !signed {
        return value;
    }
    match width {
        Width::Byte => (value as i8) as i32 as u32,
        Width::Half => (value as i16) as i32 as u32,
        Width::Word => value,
    }
}

/// The F extension is config-gated the same way C is: with it off, every
/// FP opcode decodes as if this model didn't implement it at all.
fn require_float(model: &Model, inst: Inst) -> Result<(), Trap> {
    if model.config.extensions.float {
        Ok(())
    } else {
        Err(Trap::IllegalInstruction(inst.0))
    }
}

fn check_alignment(addr: u32, width: Width, access: AccessType) -> Result<(), Trap> {
    if addr % width.bytes() != 0 {
        return Err(match access {
            AccessType::Read => Trap::LoadAddressMisaligned(addr),
            AccessType::Write => Trap::StoreAddressMisaligned(addr),
            AccessType::Fetch => Trap::InstructionAddressMisaligned(addr),
        });
    }
    Ok(())
}

fn exec_store(model: &mut Model, inst: Inst, mem: &mut impl MemoryBus) -> TrapResult {
    let width = match inst.funct3() {
        0 => Width::Byte,
        1 => Width::Half,
        2 => Width::Word,
        _ => return Err(Trap::IllegalInstruction(inst.0)),
    };
    let addr = model.gpr.read(inst.rs1()).wrapping_add(inst.imm_s() as u32);
    let value = model.gpr.read(inst.rs2());
    do_store(mem, addr, value, width)
}

fn do_store(mem: &mut impl MemoryBus, addr: u32, value: u32, width: Width) -> TrapResult {
    check_alignment(addr, width, AccessType::Write)?;
    let result = match width {
        Width::Byte => mem.write_u8(addr, value as u8),
        Width::Half => mem.write_u16(addr, value as u16),
        Width::Word => mem.write_u32(addr, value),
    };
    result.map_err(|f| Trap::StoreAccessFault(f.0))
}

fn exec_op_imm(model: &mut Model, inst: Inst) -> TrapResult {
    let a = model.gpr.read(inst.rs1());
    let imm = inst.imm_i() as u32;
    let result = match inst.funct3() {
        0 => Alu::execute(AluOp::Add, a, imm),
        2 => Alu::execute(AluOp::Slt, a, imm),
        3 => Alu::execute(AluOp::Sltu, a, imm),
        4 => Alu::execute(AluOp::Xor, a, imm),
        6 => Alu::execute(AluOp::Or, a, imm),
        7 => Alu::execute(AluOp::And, a, imm),
        1 if inst.funct7() == 0 => Alu::execute(AluOp::Sll, a, inst.shamt()),
        5 if inst.funct7() == 0 => Alu::execute(AluOp::Srl, a, inst.shamt()),
        5 if inst.funct7() == 0x20 => Alu::execute(AluOp::Sra, a, inst.shamt()),
        _ => return Err(Trap::IllegalInstruction(inst.0)),
    };
    model.write_xreg(inst.rd(), result);
    Ok(())
}

fn exec_op(model: &mut Model, inst: Inst) -> TrapResult {
    let a = model.gpr.read(inst.rs1());
    let b = model.gpr.read(inst.rs2());
    let op = match (inst.funct3(), inst.funct7()) {
        (0, 0x00) => AluOp::Add,
        (0, 0x20) => AluOp::Sub,
        (1, 0x00) => AluOp::Sll,
        (2, 0x00) => AluOp::Slt,
        (3, 0x00) => AluOp::Sltu,
        (4, 0x00) => AluOp::Xor,
        (5, 0x00) => AluOp::Srl,
        (5, 0x20) => AluOp::Sra,
        (6, 0x00) => AluOp::Or,
        (7, 0x00) => AluOp::And,
        _ => return Err(Trap::IllegalInstruction(inst.0)),
    };
    model.write_xreg(inst.rd(), Alu::execute(op, a, b));
    Ok(())
}

fn amo_op(funct5: u32) -> Option<AtomicOp> {
    match funct5 {
        0b00001 => Some(AtomicOp::Swap),
        0b00000 => Some(AtomicOp::Add),
        0b00100 => Some(AtomicOp::Xor),
        0b01100 => Some(AtomicOp::And),
        0b01000 => Some(AtomicOp::Or),
        0b10000 => Some(AtomicOp::Min),
        0b10100 => Some(AtomicOp::Max),
        0b11000 => Some(AtomicOp::Minu),
        0b11100 => Some(AtomicOp::Maxu),
        _ => None,
    }
}

fn exec_amo(model: &mut Model, inst: Inst, mem: &mut impl MemoryBus) -> TrapResult {
    if inst.funct3() != 2 {
        return Err(Trap::IllegalInstruction(inst.0));
    }
    let addr = model.gpr.read(inst.rs1());
    check_alignment(addr, Width::Word, AccessType::Write)?;

    match inst.funct5() {
        0b00010 => {
            // lr.w
            let value = mem.lr_u32(addr).map_err(|f| Trap::LoadAccessFault(f.0))?;
            model.write_xreg(inst.rd(), value);
            Ok(())
        }
        0b00011 => {
            // sc.w
            let src = model.gpr.read(inst.rs2());
            let succeeded = mem.sc_u32(addr, src).map_err(|f| Trap::StoreAccessFault(f.0))?;
            model.write_xreg(inst.rd(), if succeeded { 0 } else { 1 });
            Ok(())
        }
        funct5 => {
            let op = amo_op(funct5).ok_or(Trap::IllegalInstruction(inst.0))?;
            let src = model.gpr.read(inst.rs2());
            let old = mem
                .amo_u32(addr, op, src)
                .map_err(|f| Trap::LoadAccessFault(f.0))?;
            model.write_xreg(inst.rd(), old);
            Ok(())
        }
    }
}

enum CsrOp {
    Rw,
    Rs,
    Rc,
}

fn exec_system(model: &mut Model, inst: Inst, npc: &mut NextPc) -> ExecResult {
    if inst.funct3() == 0 {
        return match inst.0 >> 20 {
            0x000 => Err(Trap::EnvironmentCallFromMMode.into()),
            0x001 => Err(Trap::Breakpoint.into()),
            0x302 => Ok(exec_mret(model, npc)?),
            0x105 => Ok(()), // wfi: nothing to wait for, proceeds as a no-op.
            _ => Err(Trap::IllegalInstruction(inst.0).into()),
        };
    }

    if !model.priv_mode.is_machine() {
        return Err(Trap::IllegalInstruction(inst.0).into());
    }

    let (op, use_imm) = match inst.funct3() {
        1 => (CsrOp::Rw, false),
        2 => (CsrOp::Rs, false),
        3 => (CsrOp::Rc, false),
        5 => (CsrOp::Rw, true),
        6 => (CsrOp::Rs, true),
        7 => (CsrOp::Rc, true),
        _ => return Err(Trap::IllegalInstruction(inst.0).into()),
    };

    let addr = inst.csr();
    let src = if use_imm { inst.zimm() } else { model.gpr.read(inst.rs1()) };
    // A csrrs/csrrc with a zero source (x0 or a zero immediate) performs
    // no write at all, so it never traps on a read-only CSR and never
    // records a trace write either.
    let is_write = !matches!(op, CsrOp::Rs | CsrOp::Rc) || src != 0;

    let old = match model.csr_read(addr) {
        Ok(v) => v,
        Err(CsrError::Unimplemented(a)) => return Err(ExecError::UnimplementedCsr(a)),
        Err(CsrError::ReadOnly(_)) => unreachable!("read never fails with ReadOnly"),
    };

    if is_write {
        let new = match op {
            CsrOp::Rw => src,
            CsrOp::Rs => old | src,
            CsrOp::Rc => old & !src,
        };
        match model.csr_write(addr, new) {
            Ok(()) => {}
            Err(CsrError::ReadOnly(_)) => return Err(Trap::IllegalInstruction(inst.0).into()),
            Err(CsrError::Unimplemented(a)) => return Err(ExecError::UnimplementedCsr(a)),
        }
    }

    model.write_xreg(inst.rd(), old);
    Ok(())
}

fn exec_mret(model: &mut Model, npc: &mut NextPc) -> TrapResult {
    if !model.priv_mode.is_machine() {
        return Err(Trap::IllegalInstruction(0x3020_0073));
    }
    let target = model.csrs.mepc;
    model.priv_mode = model.csrs.mpp;
    model.csrs.mie = model.csrs.mpie;
    model.csrs.mpie = true;
    // mpp is set to the least-privileged mode this model supports, which
    // is Machine: there is no U-mode to drop to.
    model.csrs.mpp = crate::core::arch::mode::PrivMode::Machine;
    model.trace.mark_csr(csr::CSR_MSTATUS as u16);
    npc.jump(target);
    Ok(())
}

fn exec_load_fp(model: &mut Model, inst: Inst, mem: &mut impl MemoryBus) -> TrapResult {
    if inst.funct3() != 2 {
        return Err(Trap::IllegalInstruction(inst.0));
    }
    let addr = model.gpr.read(inst.rs1()).wrapping_add(inst.imm_i() as u32);
    let bits = do_load(mem, addr, Width::Word)?;
    model.write_freg(inst.rd(), bits);
    Ok(())
}

fn exec_store_fp(model: &mut Model, inst: Inst, mem: &mut impl MemoryBus) -> TrapResult {
    if inst.funct3() != 2 {
        return Err(Trap::IllegalInstruction(inst.0));
    }
    let addr = model.gpr.read(inst.rs1()).wrapping_add(inst.imm_s() as u32);
    let bits = model.fpr.read(inst.rs2());
    do_store(mem, addr, bits, Width::Word)
}

fn resolve_rm(model: &Model, rm_field: u32, inst: u32) -> Result<RoundingMode, Trap> {
    float_shim::resolve_rounding_mode(rm_field as u8, model.frm).ok_or(Trap::IllegalInstruction(inst))
}

const FP_SGNJ: u32 = 0b0010000;
const FP_MINMAX: u32 = 0b0010100;
const FP_CMP: u32 = 0b1010000;
const FP_CVT_W: u32 = 0b1100000;
const FP_CVT_S: u32 = 0b1101000;
const FP_MV_CLASS: u32 = 0b1110000;
const FP_MV_W_X: u32 = 0b1111000;
const FP_SQRT: u32 = 0b0101100;
const FP_REC7: u32 = 0b0100000;

fn exec_op_fp(model: &mut Model, inst: Inst) -> TrapResult {
    let funct7 = inst.funct7();
    let a = model.fpr.read(inst.rs1());
    let b = model.fpr.read(inst.rs2());

    let (bits, flags) = match funct7 {
        0b0000000 => {
            let rm = resolve_rm(model, inst.rm(), inst.0)?;
            let r = float_shim::add(rm, a, b);
            (r.bits, r.flags)
        }
        0b0000100 => {
            let rm = resolve_rm(model, inst.rm(), inst.0)?;
            let r = float_shim::sub(rm, a, b);
            (r.bits, r.flags)
        }
        0b0001000 => {
            let rm = resolve_rm(model, inst.rm(), inst.0)?;
            let r = float_shim::mul(rm, a, b);
            (r.bits, r.flags)
        }
        0b0001100 => {
            let rm = resolve_rm(model, inst.rm(), inst.0)?;
            let r = float_shim::div(rm, a, b);
            (r.bits, r.flags)
        }
        FP_SQRT => {
            if inst.rs2() == 0b00100 {
                let r = float_shim::rsqrt7(a);
                (r.bits, r.flags)
            } else {
                let rm = resolve_rm(model, inst.rm(), inst.0)?;
                let r = float_shim::sqrt(rm, a);
                (r.bits, r.flags)
            }
        }
        FP_REC7 => {
            let rm = resolve_rm(model, inst.rm(), inst.0)?;
            let r = float_shim::rec7(rm, a);
            (r.bits, r.flags)
        }
        FP_SGNJ => {
            let bits = match inst.funct3() {
                0 => float_shim::sgnj(a, b),
                1 => float_shim::sgnjn(a, b),
                2 => float_shim::sgnjx(a, b),
                _ => return Err(Trap::IllegalInstruction(inst.0)),
            };
            (bits, 0)
        }
        FP_MINMAX => {
            let r = match inst.funct3() {
                0 => float_shim::min(a, b),
                1 => float_shim::max(a, b),
                _ => return Err(Trap::IllegalInstruction(inst.0)),
            };
            (r.bits, r.flags)
        }
        FP_CMP => {
            let (v, flags) = match inst.funct3() {
                2 => float_shim::eq(a, b),
                1 => float_shim::lt(a, b),
                0 => float_shim::le(a, b),
                _ => return Err(Trap::IllegalInstruction(inst.0)),
            };
            model.accrue_fflags(flags);
            model.write_xreg(inst.rd(), v as u32);
            return Ok(());
        }
        FP_CVT_W => {
            let rm = resolve_rm(model, inst.rm(), inst.0)?;
            let r = match inst.rs2() {
                0 => float_shim::cvt_w_s(rm, a),
                1 => float_shim::cvt_wu_s(rm, a),
                _ => return Err(Trap::IllegalInstruction(inst.0)),
            };
            model.accrue_fflags(r.flags);
            model.write_xreg(inst.rd(), r.bits);
            return Ok(());
        }
        FP_CVT_S => {
            let rm = resolve_rm(model, inst.rm(), inst.0)?;
            let x = model.gpr.read(inst.rs1());
            let r = match inst.rs2() {
                0 => float_shim::cvt_s_w(rm, x as i32),
                1 => float_shim::cvt_s_wu(rm, x),
                _ => return Err(Trap::IllegalInstruction(inst.0)),
            };
            (r.bits, r.flags)
        }
        FP_MV_CLASS => {
            if inst.rs2() != 0 {
                return Err(Trap::IllegalInstruction(inst.0));
            }
            let v = match inst.funct3() {
                0 => a,                         // fmv.x.w: raw bit reinterpretation, no flags.
                1 => float_shim::classify(a),
                _ => return Err(Trap::IllegalInstruction(inst.0)),
            };
            model.write_xreg(inst.rd(), v);
            return Ok(());
        }
        FP_MV_W_X => {
            if inst.rs2() != 0 || inst.funct3() != 0 {
                return Err(Trap::IllegalInstruction(inst.0));
            }
            (model.gpr.read(inst.rs1()), 0)
        }
        _ => return Err(Trap::IllegalInstruction(inst.0)),
    };
    model.accrue_fflags(flags);
    model.write_freg(inst.rd(), bits);
    Ok(())
}

fn exec_fma(model: &mut Model, inst: Inst) -> TrapResult {
    if inst.fmt() != 0 {
        return Err(Trap::IllegalInstruction(inst.0));
    }
    let rm = resolve_rm(model, inst.rm(), inst.0)?;
    let a = model.fpr.read(inst.rs1());
    let b = model.fpr.read(inst.rs2());
    let c = model.fpr.read(inst.rs3());
    // fmsub negates the addend; fnmadd/fnmsub negate the product by
    // flipping one multiplicand's sign (fnmadd also negates the addend,
    // fnmsub does not) -- this is the standard reduction of all four
    // fused forms to one signed multiply-add.
    let (b, c) = match inst.opcode() {
        OP_FMADD => (b, c),
        OP_FMSUB => (b, c ^ 0x8000_0000),
        OP_FNMSUB => (b ^ 0x8000_0000, c),
        OP_FNMADD => (b ^ 0x8000_0000, c ^ 0x8000_0000),
        _ => unreachable!(),
    };
    let r = float_shim::mul_add(rm, a, b, c);
    model.accrue_fflags(r.flags);
    model.write_freg(inst.rd(), r.bits);
    Ok(())
}

/// Executes one 16-bit compressed instruction.
pub fn execute_c(model: &mut Model, inst: CInst, mem: &mut impl MemoryBus, npc: &mut NextPc) -> ExecResult {
    match inst.op() {
        0b00 => Ok(execute_c_quadrant0(model, inst, mem)?),
        0b01 => Ok(execute_c_quadrant1(model, inst, npc)?),
        0b10 => Ok(execute_c_quadrant2(model, inst, mem, npc)?),
        _ => Err(Trap::IllegalInstruction(inst.0 as u32).into()),
    }
}

fn execute_c_quadrant0(model: &mut Model, inst: CInst, mem: &mut impl MemoryBus) -> TrapResult {
    match inst.funct3() {
        0b000 => {
            let uimm = inst.ciw_uimm();
            if uimm == 0 {
                return Err(Trap::IllegalInstruction(inst.0 as u32));
            }
            let sp = model.gpr.read(2);
            model.write_xreg(inst.rd_c(), sp.wrapping_add(uimm));
            Ok(())
        }
        0b010 => {
            // CL-format: rs1' at [9:7] (rs1_c), rd' at [4:2] -- the same
            // bit position `rs2_c` decodes for CS/CA, just a different
            // architectural role here.
            let addr = model.gpr.read(inst.rs1_c()).wrapping_add(inst.cl_uimm());
            let value = do_load(mem, addr, Width::Word)?;
            model.write_xreg(inst.rs2_c(), value);
            Ok(())
        }
        0b011 => {
            require_float(model, Inst(inst.0 as u32))?;
            let addr = model.gpr.read(inst.rs1_c()).wrapping_add(inst.cl_uimm());
            let bits = do_load(mem, addr, Width::Word)?;
            model.write_freg(inst.rs2_c(), bits);
            Ok(())
        }
        0b110 => {
            let addr = model.gpr.read(inst.rs1_c()).wrapping_add(inst.cl_uimm());
            let value = model.gpr.read(inst.rs2_c());
            do_store(mem, addr, value, Width::Word)
        }
        0b111 => {
            require_float(model, Inst(inst.0 as u32))?;
            let addr = model.gpr.read(inst.rs1_c()).wrapping_add(inst.cl_uimm());
            let bits = model.fpr.read(inst.rs2_c());
            do_store(mem, addr, bits, Width::Word)
        }
        _ => Err(Trap::IllegalInstruction(inst.0 as u32)),
    }
}

fn execute_c_quadrant1(model: &mut Model, inst: CInst, npc: &mut NextPc) -> TrapResult {
    match inst.funct3() {
        0b000 => {
            // c.nop (rd=0) / c.addi
            let a = model.gpr.read(inst.rd());
            model.write_xreg(inst.rd(), a.wrapping_add(inst.ci_imm() as u32));
            Ok(())
        }
        0b001 => {
            // c.jal: always targets x1.
            let target = model.pc.wrapping_add(inst.cj_imm() as u32);
            if !model.is_pc_aligned(target) {
                return Err(Trap::InstructionAddressMisaligned(target));
            }
            model.write_xreg(1, npc.get());
            npc.jump(target);
            Ok(())
        }
        0b010 => {
            model.write_xreg(inst.rd(), inst.ci_imm() as u32);
            Ok(())
        }
        0b011 => {
            if inst.rd() == 2 {
                let imm = inst.ci_addi16sp_imm();
                if imm == 0 {
                    return Err(Trap::IllegalInstruction(inst.0 as u32));
                }
                let sp = model.gpr.read(2);
                model.write_xreg(2, sp.wrapping_add(imm as u32));
            } else {
                let imm = inst.ci_lui_imm();
                if imm == 0 {
                    return Err(Trap::IllegalInstruction(inst.0 as u32));
                }
                model.write_xreg(inst.rd(), imm as u32);
            }
            Ok(())
        }
        0b100 => execute_c_alu(model, inst),
        0b101 => {
            let target = model.pc.wrapping_add(inst.cj_imm() as u32);
            if !model.is_pc_aligned(target) {
                return Err(Trap::InstructionAddressMisaligned(target));
            }
            npc.jump(target);
            Ok(())
        }
        0b110 | 0b111 => {
            let a = model.gpr.read(inst.rs1_c());
            let taken = if inst.funct3() == 0b110 { a == 0 } else { a != 0 };
            if taken {
                let target = model.pc.wrapping_add(inst.cb_imm() as u32);
                if !model.is_pc_aligned(target) {
                    return Err(Trap::InstructionAddressMisaligned(target));
                }
                npc.jump(target);
            }
            Ok(())
        }
        _ => Err(Trap::IllegalInstruction(inst.0 as u32)),
    }
}

fn execute_c_alu(model: &mut Model, inst: CInst) -> TrapResult {
    let funct2_hi = (inst.0 >> 10) & 0x3;
    match funct2_hi {
        0b00 | 0b01 => {
            // c.srli / c.srai
            let shamt = inst.ci_shamt();
            if shamt >= 32 {
                return Err(Trap::IllegalInstruction(inst.0 as u32));
            }
            let a = model.gpr.read(inst.rd_c());
            let op = if funct2_hi == 0b00 { AluOp::Srl } else { AluOp::Sra };
            model.write_xreg(inst.rd_c(), Alu::execute(op, a, shamt));
            Ok(())
        }
        0b10 => {
            let a = model.gpr.read(inst.rd_c());
            model.write_xreg(inst.rd_c(), Alu::execute(AluOp::And, a, inst.ci_imm() as u32));
            Ok(())
        }
        _ => {
            // c.sub/c.xor/c.or/c.and (funct6 low bit 0) — the only CA-form
            // subset this RV32C configuration implements (c.subw/c.addw
            // are RV64-only and never reachable here).
            let funct2_lo = (inst.0 >> 5) & 0x3;
            let a = model.gpr.read(inst.rd_c());
            let b = model.gpr.read(inst.rs2_c());
            let op = match funct2_lo {
                0b00 => AluOp::Sub,
                0b01 => AluOp::Xor,
                0b10 => AluOp::Or,
                0b11 => AluOp::And,
                _ => unreachable!(),
            };
            model.write_xreg(inst.rd_c(), Alu::execute(op, a, b));
            Ok(())
        }
    }
}

fn execute_c_quadrant2(
    model: &mut Model,
    inst: CInst,
    mem: &mut impl MemoryBus,
    npc: &mut NextPc,
) -> TrapResult {
    match inst.funct3() {
        0b000 => {
            let shamt = inst.ci_shamt();
            if shamt >= 32 || inst.rd() == 0 {
                return Err(Trap::IllegalInstruction(inst.0 as u32));
            }
            let a = model.gpr.read(inst.rd());
            model.write_xreg(inst.rd(), Alu::execute(AluOp::Sll, a, shamt));
            Ok(())
        }
        0b010 => {
            if inst.rd() == 0 {
                return Err(Trap::IllegalInstruction(inst.0 as u32));
            }
            let sp = model.gpr.read(2);
            let value = do_load(mem, sp.wrapping_add(inst.ci_lwsp_uimm()), Width::Word)?;
            model.write_xreg(inst.rd(), value);
            Ok(())
        }
        0b011 => {
            require_float(model, Inst(inst.0 as u32))?;
            let sp = model.gpr.read(2);
            let bits = do_load(mem, sp.wrapping_add(inst.ci_lwsp_uimm()), Width::Word)?;
            model.write_freg(inst.rd(), bits);
            Ok(())
        }
        0b100 => {
            let is_jump_form = (inst.0 >> 12) & 1 == 0;
            if is_jump_form {
                if inst.rs2() == 0 {
                    // c.jr (rd != 0) / c.ebreak (rd == 0)
                    if inst.rd() == 0 {
                        return Err(Trap::Breakpoint);
                    }
                    let target = model.gpr.read(inst.rd()) & !1;
                    if !model.is_pc_aligned(target) {
                        return Err(Trap::InstructionAddressMisaligned(target));
                    }
                    npc.jump(target);
                    Ok(())
                } else {
                    // c.mv
                    model.write_xreg(inst.rd(), model.gpr.read(inst.rs2()));
                    Ok(())
                }
            } else if inst.rs2() == 0 {
                // c.jalr (rd != 0 required by the encoding; rd==0 is c.ebreak
                // in the other arm, this arm always has the link bit set)
                let target = model.gpr.read(inst.rd()) & !1;
                if !model.is_pc_aligned(target) {
                    return Err(Trap::InstructionAddressMisaligned(target));
                }
                let link = npc.get();
                model.write_xreg(1, link);
                npc.jump(target);
                Ok(())
            } else {
                // c.add
                let a = model.gpr.read(inst.rd());
                let b = model.gpr.read(inst.rs2());
                model.write_xreg(inst.rd(), Alu::execute(AluOp::Add, a, b));
                Ok(())
            }
        }
        0b110 => {
            let sp = model.gpr.read(2);
            let value = model.gpr.read(inst.rs2());
            do_store(mem, sp.wrapping_add(inst.css_swsp_uimm()), value, Width::Word)
        }
        0b111 => {
            require_float(model, Inst(inst.0 as u32))?;
            let sp = model.gpr.read(2);
            let bits = model.fpr.read(inst.rs2());
            do_store(mem, sp.wrapping_add(inst.css_swsp_uimm()), bits, Width::Word)
        }
        _ => Err(Trap::IllegalInstruction(inst.0 as u32)),
    }
}
