//! A cycle-faithful functional model of a 32-bit RISC-V core.
//!
//! This crate implements RV32I plus the compressed (C), single-precision
//! float (F), and atomic (A) extensions, with a minimal machine-mode-only
//! privilege subset (Zicsr). It is deliberately not a timing model: there
//! is no pipeline, no cache hierarchy, and no branch predictor. What it
//! models precisely is architectural state transition, one instruction at
//! a time, together with a per-step commit trace suitable for differential
//! testing against an RTL implementation of the same core.
//!
//! # Modules
//!
//! * `common`: shared error and width types.
//! * `config`: TOML-backed model configuration.
//! * `core`: architectural state, decoding, execution, and the step loop.
//! * `export`: the stable `extern "C"` ABI surface for embedding hosts.
//! * `sim`: a flat-memory harness used by the demo binary and tests.
//! * `stats`: instruction-mix bookkeeping for the demo binary.

/// Shared error and width types used throughout the model.
pub mod common;

/// Model configuration: enabled extensions, reset vector, trace toggle.
pub mod config;

/// Architectural state, decoding, execution, and the step loop.
pub mod core;

/// The stable ABI surface exposed to embedding hosts.
pub mod export;

/// Flat-memory harness used by the demo binary and integration tests.
pub mod sim;

/// Instruction-mix and trap counters for the demo binary.
pub mod stats;
