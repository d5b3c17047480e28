//! The memory-side half of the step boundary: a trait an embedding host
//! implements to answer fetch/load/store/atomic requests. This is the
//! safe-Rust counterpart of a C vtable of function pointers — the host
//! owns the actual backing memory (RAM, MMIO, or a test double) and this
//! model only ever borrows it for the duration of one call.

use crate::common::error::MemFault;
use crate::core::units::lsu::AtomicOp;

/// Callbacks the step loop and executor use to access memory. Every
/// method returns `Ok` with the result or an `Err` fault address; the
/// caller turns that address into the right [`crate::common::error::Trap`]
/// variant (it already knows the access type and width).
pub trait MemoryBus {
    /// Fetches one 16-bit-aligned halfword of instruction memory.
    fn fetch2(&mut self, addr: u32) -> Result<u16, MemFault>;

    fn read_u8(&mut self, addr: u32) -> Result<u8, MemFault>;
    fn read_u16(&mut self, addr: u32) -> Result<u16, MemFault>;
    fn read_u32(&mut self, addr: u32) -> Result<u32, MemFault>;

    fn write_u8(&mut self, addr: u32, val: u8) -> Result<(), MemFault>;
    fn write_u16(&mut self, addr: u32, val: u16) -> Result<(), MemFault>;
    fn write_u32(&mut self, addr: u32, val: u32) -> Result<(), MemFault>;

    /// Performs a 32-bit atomic read-modify-write: reads the current
    /// value, combines it with `src` via `op`, writes the result back,
    /// and returns the value that was read (the value the destination
    /// register receives).
    fn amo_u32(&mut self, addr: u32, op: AtomicOp, src: u32) -> Result<u32, MemFault>;

    /// `lr.w`: loads and establishes a reservation on `addr`.
    fn lr_u32(&mut self, addr: u32) -> Result<u32, MemFault>;

    /// `sc.w`: conditionally stores `val` to `addr` if the reservation
    /// from the most recent `lr.w` is still held. Returns whether the
    /// store succeeded (the destination register receives 0 on success,
    /// 1 on failure, per the architecture).
    fn sc_u32(&mut self, addr: u32, val: u32) -> Result<bool, MemFault>;
}
