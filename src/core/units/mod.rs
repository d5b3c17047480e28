//! Pure computational units used by the executor: integer ALU, atomic
//! read-modify-write, and the floating-point shim.

pub mod alu;
pub mod float_shim;
pub mod lsu;
