//! A flat-memory harness: the simplest possible [`MemoryBus`]
//! implementation, used by the demo binary and the integration tests.
//! A real embedding host (an RTL testbench, say) would implement the
//! trait against its own address space instead.

pub mod flat_memory;
