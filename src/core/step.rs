//! The step loop: fetch, classify compressed-vs-not, decode, execute,
//! and either commit `pc` or vector into trap entry.
//!
//! Trap entry itself lives here rather than in the executor. The
//! executor's job is to decide *whether* an instruction traps; once it
//! has, writing `mepc`/`mcause`/`mtval` and redirecting `pc` to `mtvec`
//! is the same fixed sequence for every trap, architectural state the
//! step loop already owns the lifetime of.

use crate::common::error::Trap;
use crate::core::arch::mode::PrivMode;
use crate::core::encoding::{is_compressed, CInst, Inst};
use crate::core::executor::{self, ExecError, NextPc};
use crate::core::mem_bus::MemoryBus;
use crate::core::state::Model;
use crate::core::trace::StepStatus;

/// Runs one instruction. `Ok` always means the step completed somehow
/// (committed, or trapped and vectored into the trap handler); the
/// [`StepStatus`] in the trace record says which. The only `Err` is an
/// implementation-limit CSR access, which this model refuses to paper
/// over with a made-up value.
pub fn step(model: &mut Model, mem: &mut impl MemoryBus) -> Result<StepStatus, ExecError> {
    let pc = model.pc;
    model.trace.begin(pc);

    let low = match mem.fetch2(pc) {
        Ok(h) => h,
        Err(fault) => {
            enter_trap(model, Trap::InstructionAccessFault(fault.0));
            model.trace.end(StepStatus::FetchException, 0);
            return Ok(StepStatus::FetchException);
        }
    };

    if is_compressed(low) && model.config.extensions.compressed {
        let inst = CInst(low);
        let mut npc = NextPc::sequential(pc, 2);
        let result = executor::execute_c(model, inst, mem, &mut npc);
        return finish(model, result, &npc, low as u32, StepStatus::CommitCompressed);
    }

    let high = match mem.fetch2(pc.wrapping_add(2)) {
        Ok(h) => h,
        Err(fault) => {
            enter_trap(model, Trap::InstructionAccessFault(fault.0));
            model.trace.end(StepStatus::FetchException, low as u32);
            return Ok(StepStatus::FetchException);
        }
    };
    let word = (low as u32) | ((high as u32) << 16);
    let inst = Inst(word);
    let mut npc = NextPc::sequential(pc, 4);
    let result = executor::execute(model, inst, mem, &mut npc);
    finish(model, result, &npc, word, StepStatus::Commit)
}

fn finish(
    model: &mut Model,
    result: Result<(), ExecError>,
    npc: &NextPc,
    inst_bits: u32,
    commit_status: StepStatus,
) -> Result<StepStatus, ExecError> {
    match result {
        Ok(()) => {
            model.pc = npc.get();
            model.trace.end(commit_status, inst_bits);
            Ok(commit_status)
        }
        Err(ExecError::Trap(t)) => {
            enter_trap(model, t);
            model.trace.end(StepStatus::ExecutionTrap, inst_bits);
            Ok(StepStatus::ExecutionTrap)
        }
        Err(e @ ExecError::UnimplementedCsr(_)) => Err(e),
    }
}

/// Writes the trap-entry CSRs and transfers control, per this model's
/// resolution of what would otherwise be an unspecified detail: every
/// trap (not just `mret`) is handled by the engine itself rather than
/// left for an embedding host to emulate.
fn enter_trap(model: &mut Model, trap: Trap) {
    model.csrs.mepc = model.pc;
    model.csrs.mcause = trap.cause() as u32;
    model.csrs.mtval = trap.tval();
    model.csrs.mpie = model.csrs.mie;
    model.csrs.mie = false;
    model.csrs.mpp = model.priv_mode;
    model.priv_mode = PrivMode::Machine;
    model.trace.mark_csr(crate::core::arch::csr::CSR_MEPC as u16);
    model.trace.mark_csr(crate::core::arch::csr::CSR_MCAUSE as u16);
    model.trace.mark_csr(crate::core::arch::csr::CSR_MTVAL as u16);
    model.trace.mark_csr(crate::core::arch::csr::CSR_MSTATUS as u16);
    model.pc = model.csrs.mtvec;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sim::flat_memory::FlatMemory;

    fn store_word(mem: &mut FlatMemory, addr: u32, word: u32) {
        mem.write_u32(addr, word).unwrap();
    }

    #[test]
    fn ecall_vectors_to_mtvec_and_records_cause() {
        let mut m = Model::new(Config::default());
        let mut mem = FlatMemory::new(0, 4096);
        m.pc = 0;
        m.csrs.mtvec = 0x1000;
        store_word(&mut mem, 0, 0x0000_0073); // ecall
        let status = step(&mut m, &mut mem).unwrap();
        assert_eq!(status, StepStatus::ExecutionTrap);
        assert_eq!(m.pc, 0x1000);
        assert_eq!(m.csrs.mepc, 0);
        assert_eq!(m.csrs.mcause, 11);
    }

    #[test]
    fn addi_commits_and_advances_pc_by_four() {
        let mut m = Model::new(Config::default());
        m.config.extensions.compressed = false;
        let mut mem = FlatMemory::new(0, 4096);
        m.pc = 0;
        store_word(&mut mem, 0, 0x0010_0093); // addi x1, x0, 1
        let status = step(&mut m, &mut mem).unwrap();
        assert_eq!(status, StepStatus::Commit);
        assert_eq!(m.pc, 4);
        assert_eq!(m.gpr.read(1), 1);
    }
}
