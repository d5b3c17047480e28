//! Compressed (RVC) decode/execute, exercised through `step()` with
//! 16-bit instructions written directly into the byte stream alongside
//! ordinary 32-bit setup instructions, the way a real compiled image
//! mixes the two.

use rv32step::config::Config;
use rv32step::core::mem_bus::MemoryBus;
use rv32step::core::state::Model;
use rv32step::core::step;
use rv32step::core::trace::StepStatus;
use rv32step::sim::flat_memory::FlatMemory;

fn harness() -> (Model, FlatMemory) {
    (Model::new(Config::default()), FlatMemory::new(0, 4096))
}

fn load_u16(mem: &mut FlatMemory, addr: u32, word: u16) {
    mem.write_u16(addr, word).unwrap();
}

fn run(m: &mut Model, mem: &mut FlatMemory, steps: usize) -> StepStatus {
    let mut last = StepStatus::Commit;
    for _ in 0..steps {
        last = step::step(m, mem).unwrap();
    }
    last
}

#[test]
fn c_li_loads_a_sign_extended_immediate_into_a_full_width_register() {
    let (mut m, mut mem) = harness();
    load_u16(&mut mem, 0, 0x4415); // c.li x8, 5
    m.reset(0);
    let status = run(&mut m, &mut mem, 1);
    assert_eq!(status, StepStatus::CommitCompressed);
    assert_eq!(m.gpr.read(8), 5);
    assert_eq!(m.pc, 2);
}

#[test]
fn c_addi4spn_computes_an_offset_from_the_stack_pointer() {
    let (mut m, mut mem) = harness();
    load_u16(&mut mem, 0, 0x0040); // c.addi4spn x8, sp, 4
    m.reset(0);
    run(&mut m, &mut mem, 1);
    assert_eq!(m.gpr.read(8), 4); // sp (x2) is 0 at reset
}

#[test]
fn c_j_redirects_pc_and_skips_the_instruction_it_jumps_over() {
    let (mut m, mut mem) = harness();
    load_u16(&mut mem, 0, 0xa011); // c.j +4
    load_u16(&mut mem, 2, 0x44f9); // c.li x9, 30   (skipped)
    load_u16(&mut mem, 4, 0x4505); // c.li x10, 1
    m.reset(0);
    run(&mut m, &mut mem, 2);
    assert_eq!(m.pc, 6);
    assert_eq!(m.gpr.read(9), 0);
    assert_eq!(m.gpr.read(10), 1);
}

#[test]
fn c_beqz_branches_when_the_register_is_zero() {
    let (mut m, mut mem) = harness();
    load_u16(&mut mem, 0, 0xc011); // c.beqz x8, +4   (x8 == 0 at reset)
    load_u16(&mut mem, 2, 0x44f9); // c.li x9, 30     (skipped)
    load_u16(&mut mem, 4, 0x4505); // c.li x10, 1
    m.reset(0);
    run(&mut m, &mut mem, 2);
    assert_eq!(m.pc, 6);
    assert_eq!(m.gpr.read(9), 0);
    assert_eq!(m.gpr.read(10), 1);
}

#[test]
fn c_beqz_falls_through_when_the_register_is_nonzero() {
    let (mut m, mut mem) = harness();
    load_u16(&mut mem, 0, 0xc091); // c.beqz x9, +4   (x9 != 0, see below)
    load_u16(&mut mem, 2, 0x44f9); // c.li x9, 30     (not skipped)
    load_u16(&mut mem, 4, 0x4505); // c.li x10, 1
    m.reset(0);
    m.gpr.write(9, 1);
    run(&mut m, &mut mem, 3);
    assert_eq!(m.gpr.read(9), 30);
    assert_eq!(m.gpr.read(10), 1);
}

#[test]
fn c_lw_loads_from_the_base_register_into_the_rd_prime_field_not_rs1() {
    // c.lw's destination register lives at bits[4:2], the same position
    // `c.sw`'s source register does -- it is not the same field as the
    // base-address register at bits[9:7]. A destination/base mixup here
    // would silently clobber the base register instead of the target.
    let (mut m, mut mem) = harness();
    mem.write_u32(0, 0x04000493).unwrap(); // addi x9, x0, 64
    mem.write_u32(4, 0x04d00093).unwrap(); // addi x1, x0, 77
    mem.write_u32(8, 0x0014a223).unwrap(); // sw x1, 4(x9)
    load_u16(&mut mem, 12, 0x40c0); // c.lw x8, 4(x9)
    m.reset(0);
    run(&mut m, &mut mem, 4);
    assert_eq!(m.gpr.read(8), 77);
    assert_eq!(m.gpr.read(9), 64); // base register is untouched
}
