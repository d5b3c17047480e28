//! Single-precision floating-point semantics, exercised through full
//! instruction sequences rather than by calling `float_shim` directly,
//! so the tests also cover decode and the `OP_FP`/`OP_LOAD_FP` dispatch.

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
fn fmv_w_x_then_fmv_x_w_round_trips_the_raw_bits() {
    let (mut m, mut mem) = harness();
    load_program(
        &mut mem,
        &[
            0x3f8000b7, // lui x1, 0x3f800          (bits of 1.0f in the upper half)
            0xf00080d3, // fmv.w.x f1, x1
            0xe0008253, // fmv.x.w x4, f1
        ],
    );
    m.reset(0);
    run(&mut m, &mut mem, 3);
    assert_eq!(m.gpr.read(4), 0x3f80_0000);
}

#[test]
fn fsgnjx_of_a_register_with_itself_clears_the_sign_for_a_negative_operand() {
    let (mut m, mut mem) = harness();
    load_program(
        &mut mem,
        &[
            0xbf8000b7, // lui x1, 0xbf800   (bits of -1.0f)
            0xf00080d3, // fmv.w.x f1, x1
            0x2010a1d3, // fsgnjx f3, f1, f1
            0xe0008253, // fmv.x.w x4, f3
        ],
    );
    m.reset(0);
    run(&mut m, &mut mem, 4);
    assert_eq!(m.gpr.read(4), 0x3f80_0000); // +1.0f: sign bit cleared
}

#[test]
fn fclass_of_positive_infinity_is_exactly_one_hot() {
    let (mut m, mut mem) = harness();
    load_program(
        &mut mem,
        &[
            0x7f8000b7, // lui x1, 0x7f800   (bits of +inf)
            0xf00080d3, // fmv.w.x f1, x1
            0xe0009153, // fclass x2, f1
        ],
    );
    m.reset(0);
    run(&mut m, &mut mem, 3);
    let class = m.gpr.read(2);
    assert_eq!(class.count_ones(), 1, "fclass result must be one-hot");
    assert_eq!(class, 1 << 7); // bit 7: +infinity
}

#[test]
fn fdiv_by_zero_raises_only_the_divide_by_zero_flag() {
    let (mut m, mut mem) = harness();
    load_program(
        &mut mem,
        &[
            0x3f8000b7, // lui x1, 0x3f800   (1.0f)
            0xf00080d3, // fmv.w.x f1, x1
            0x182081d3, // fdiv.s f3, f1, f2   (f2 == +0.0 at reset)
        ],
    );
    m.reset(0);
    run(&mut m, &mut mem, 3);
    assert_eq!(m.fflags, 0b0_1000); // DZ only
}

#[test]
fn fmv_w_x_traps_as_illegal_when_the_float_extension_is_disabled() {
    let (mut m, mut mem) = harness();
    m.config.extensions.float = false;
    load_program(
        &mut mem,
        &[
            0x3f8000b7, // lui x1, 0x3f800
            0xf00080d3, // fmv.w.x f1, x1
        ],
    );
    m.reset(0);
    m.csrs.mtvec = 0x100;
    assert_eq!(step::step(&mut m, &mut mem).unwrap(), StepStatus::Commit);
    let status = step::step(&mut m, &mut mem).unwrap();
    assert_eq!(status, StepStatus::ExecutionTrap);
    assert_eq!(m.pc, 0x100);
    assert_eq!(m.fpr.read(1), 0); // f1 was never written
}

#[test]
fn lui_xd_zero_is_idempotent_and_untraced() {
    let (mut m, mut mem) = harness();
    load_program(&mut mem, &[0x0000_0037]); // lui x0, 0
    m.reset(0);
    run(&mut m, &mut mem, 1);
    assert_eq!(m.gpr.read(0), 0);
    assert_eq!(m.trace.xreg_mask, 0);
}
