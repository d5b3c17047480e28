//! Atomic memory operations, driven through `step()` against a
//! [`FlatMemory`] so the reservation-set semantics in the memory bus and
//! the funct5 dispatch in the executor are both exercised together.

use rv32step::config::Config;
use rv32step::core::mem_bus::MemoryBus;
use rv32step::core::state::Model;
use rv32step::core::step;
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
fn lr_then_sc_to_the_same_address_succeeds_and_writes_the_new_value() {
    let (mut m, mut mem) = harness();
    mem.write_u32(64, 0xdead_beef).unwrap();
    load_program(
        &mut mem,
        &[
            0x04000093, // addi x1, x0, 64
            0x00500193, // addi x3, x0, 5
            0x1000a12f, // lr.w x2, (x1)
            0x1830a22f, // sc.w x4, x3, (x1)
        ],
    );
    m.reset(0);
    run(&mut m, &mut mem, 4);
    assert_eq!(m.gpr.read(2), 0xdead_beef); // value lr.w observed
    assert_eq!(m.gpr.read(4), 0); // sc.w success code
    assert_eq!(mem.read_u32(64).unwrap(), 5);
}

#[test]
fn sc_without_a_preceding_lr_fails_and_leaves_memory_untouched() {
    let (mut m, mut mem) = harness();
    mem.write_u32(64, 0x1111_1111).unwrap();
    load_program(
        &mut mem,
        &[
            0x04000093, // addi x1, x0, 64
            0x00500193, // addi x3, x0, 5
            0x1830a22f, // sc.w x4, x3, (x1)  -- no lr.w first
        ],
    );
    m.reset(0);
    run(&mut m, &mut mem, 3);
    assert_eq!(m.gpr.read(4), 1); // sc.w failure code
    assert_eq!(mem.read_u32(64).unwrap(), 0x1111_1111);
}

#[test]
fn an_intervening_store_to_a_different_address_breaks_the_reservation() {
    let (mut m, mut mem) = harness();
    mem.write_u32(64, 0).unwrap();
    load_program(
        &mut mem,
        &[
            0x04000093, // addi x1, x0, 64
            0x00500193, // addi x3, x0, 5
            0x1000a12f, // lr.w x2, (x1)
            0x08000493, // addi x9, x0, 128
            0x0004a023, // sw x0, 0(x9)      -- unrelated store, breaks the reservation
            0x1830a22f, // sc.w x4, x3, (x1)
        ],
    );
    m.reset(0);
    run(&mut m, &mut mem, 6);
    assert_eq!(m.gpr.read(4), 1); // sc.w failure code
    assert_eq!(mem.read_u32(64).unwrap(), 0); // the sc.w never applied
}

#[test]
fn amoadd_combines_the_operand_with_the_old_memory_value_and_returns_the_old_value() {
    let (mut m, mut mem) = harness();
    mem.write_u32(64, 10).unwrap();
    load_program(
        &mut mem,
        &[
            0x04000093, // addi x1, x0, 64
            0x00500193, // addi x3, x0, 5
            0x0030a2af, // amoadd.w x5, x3, (x1)
        ],
    );
    m.reset(0);
    run(&mut m, &mut mem, 3);
    assert_eq!(m.gpr.read(5), 10); // old value
    assert_eq!(mem.read_u32(64).unwrap(), 15); // 10 + 5
}

#[test]
fn amoswap_exchanges_the_register_and_memory_values() {
    let (mut m, mut mem) = harness();
    mem.write_u32(64, 77).unwrap();
    load_program(
        &mut mem,
        &[
            0x04000093, // addi x1, x0, 64
            0x06300313, // addi x6, x0, 99
            0x0860a3af, // amoswap.w x7, x6, (x1)
        ],
    );
    m.reset(0);
    run(&mut m, &mut mem, 3);
    assert_eq!(m.gpr.read(7), 77); // old memory value
    assert_eq!(mem.read_u32(64).unwrap(), 99); // new memory value
}
