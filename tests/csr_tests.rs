//! CSR read/modify/write semantics exercised through `csrrw`/`csrrs`
//! sequences, matching how a compiled trap handler or `rdcycle`-style
//! reader would actually touch these registers.

use rv32step::config::Config;
use rv32step::core::mem_bus::MemoryBus;
use rv32step::core::state::Model;
use rv32step::core::step;
use rv32step::core::trace::StepStatus;
use rv32step::sim::flat_memory::FlatMemory;

fn harness() -> (Model, FlatMemory) {
    let mut m = Model::new(Config::default());
    m.config.extensions.compressed = false;
    (m, FlatMemory::new(0, 4096))
}

fn load_program(mem: &mut FlatMemory, words: &[u32]) {
    for (i, w) in words.iter().enumerate() {
        mem.write_u32((i as u32) * 4, *w).unwrap();
    }
}

fn run(m: &mut Model, mem: &mut FlatMemory, steps: usize) {
    for _ in 0..steps {
        step::step(m, mem).unwrap();
    }
}

#[test]
fn csrrw_returns_the_old_value_and_installs_the_new_one() {
    let (mut m, mut mem) = harness();
    load_program(
        &mut mem,
        &[
            0x07b00093, // addi x1, x0, 123
            0x34009173, // csrrw x2, mscratch, x1
        ],
    );
    m.reset(0);
    run(&mut m, &mut mem, 2);
    assert_eq!(m.gpr.read(2), 0); // mscratch was 0 before the write
    assert_eq!(m.csrs.mscratch, 123);
    assert_eq!(m.trace.csr_writes(), &[0x340]);
}

#[test]
fn csrrs_with_a_zero_source_reads_without_writing_or_tracing() {
    let (mut m, mut mem) = harness();
    load_program(&mut mem, &[0x340021f3]); // csrrs x3, mscratch, x0
    m.reset(0);
    m.csrs.mscratch = 0xabcd;
    run(&mut m, &mut mem, 1);
    assert_eq!(m.gpr.read(3), 0xabcd);
    assert_eq!(m.csrs.mscratch, 0xabcd);
    assert!(m.trace.csr_writes().is_empty());
}

#[test]
fn fflags_accumulates_through_csrrs_and_is_cleared_only_by_an_explicit_write() {
    let (mut m, mut mem) = harness();
    load_program(
        &mut mem,
        &[
            0x00300213, // addi x4, x0, 3     (inexact | underflow)
            0x00122073, // csrrs x0, fflags, x4
            0x00800293, // addi x5, x0, 8     (divide-by-zero)
            0x0012a073, // csrrs x0, fflags, x5
            0x00101373, // csrrw x6, fflags, x0  -- read back, then clear
        ],
    );
    m.reset(0);
    run(&mut m, &mut mem, 4);
    assert_eq!(m.fflags, 0b0_1011);
    run(&mut m, &mut mem, 1);
    assert_eq!(m.gpr.read(6), 0b0_1011); // old value read before the clear
    assert_eq!(m.fflags, 0);
}

#[test]
fn mstatus_read_reflects_machine_mode_reset_state() {
    let (mut m, mut mem) = harness();
    load_program(&mut mem, &[0x300013f3]); // csrrw x7, mstatus, x0
    m.reset(0);
    run(&mut m, &mut mem, 1);
    // fresh reset: MIE and MPIE both clear, no pending mstatus bits set.
    assert_eq!(m.gpr.read(7) & 0b1000, 0);
    assert_eq!(m.gpr.read(7) & 0b1000_0000, 0);
}

#[test]
fn misa_write_traps_as_an_illegal_instruction_rather_than_silently_applying() {
    let (mut m, mut mem) = harness();
    // csrrw x1, misa(0x301), x0 -- a write of 0, but misa is read-only
    // regardless of the value, so this must still trap.
    let word = (0x301u32 << 20) | (1 << 15) | (1 << 12) | (1 << 7) | 0x73;
    mem.write_u32(0, word).unwrap();
    m.reset(0);
    m.csrs.mtvec = 0x100;
    let status = step::step(&mut m, &mut mem).unwrap();
    assert_eq!(status, StepStatus::ExecutionTrap);
    assert_eq!(m.pc, 0x100);
}
