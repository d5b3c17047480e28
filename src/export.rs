//! The stable `extern "C"` ABI surface: everything an embedding host
//! (a differential-testing harness driving this model alongside an RTL
//! simulation, say) needs to create a model, step it, and read back its
//! architectural state, without linking against this crate's Rust types
//! directly.
//!
//! Memory is the one thing the host, not this crate, owns: [`MemCallbacks`]
//! is a C vtable of function pointers the host fills in, and
//! [`CallbackMemBus`] is the one place in this crate that wraps those raw
//! pointers in the safe [`MemoryBus`] trait the rest of the model is
//! generic over. Every other module in this crate never crosses an
//! `unsafe` boundary; this one exists so that something has to.

use std::ffi::c_void;
use std::os::raw::c_char;

use crate::common::error::MemFault;
use crate::config::Config;
use crate::core::mem_bus::MemoryBus;
use crate::core::state::Model;
use crate::core::step;
use crate::core::trace::TraceRecord;
use crate::core::units::lsu::AtomicOp;

pub const ABI_VERSION: u32 = 1;

#[inline]
fn sext64(x: u32) -> u64 {
    x as i32 as i64 as u64
}

#[inline]
fn nanbox64(x: u32) -> u64 {
    (u64::from(u32::MAX) << 32) | u64::from(x)
}

#[repr(C)]
pub struct ModelDescription {
    pub model_isa: *const c_char,
    pub model_priv: *const c_char,
    pub xlen: u32,
    pub flen: u32,
}

const MODEL_ISA: &[u8] = b"rv32imafc_zicsr\0";
const MODEL_PRIV: &[u8] = b"M\0";

static DESCRIPTION: ModelDescription = ModelDescription {
    model_isa: MODEL_ISA.as_ptr() as *const c_char,
    model_priv: MODEL_PRIV.as_ptr() as *const c_char,
    xlen: 32,
    flen: 32,
};

// SAFETY: both pointers are derived from `&'static [u8]` constants, so the
// pointee data lives for the program's duration and is never mutated.
unsafe impl Sync for ModelDescription {}

/// A vtable of host-supplied memory callbacks, filled in by the embedding
/// host before calling [`rv32step_create`]. Every function takes the
/// opaque `ctx` pointer passed to `create` as its first argument.
#[repr(C)]
pub struct MemCallbacks {
    pub ctx: *mut c_void,
    pub fetch2: extern "C" fn(*mut c_void, u32, *mut u16) -> bool,
    pub read_u8: extern "C" fn(*mut c_void, u32, *mut u8) -> bool,
    pub read_u16: extern "C" fn(*mut c_void, u32, *mut u16) -> bool,
    pub read_u32: extern "C" fn(*mut c_void, u32, *mut u32) -> bool,
    pub write_u8: extern "C" fn(*mut c_void, u32, u8) -> bool,
    pub write_u16: extern "C" fn(*mut c_void, u32, u16) -> bool,
    pub write_u32: extern "C" fn(*mut c_void, u32, u32) -> bool,
    pub amo_u32: extern "C" fn(*mut c_void, u32, u32, u32, *mut u32) -> bool,
    pub lr_u32: extern "C" fn(*mut c_void, u32, *mut u32) -> bool,
    pub sc_u32: extern "C" fn(*mut c_void, u32, u32, *mut bool) -> bool,
}

/// Adapts a host's [`MemCallbacks`] vtable to [`MemoryBus`]. This is the
/// only `unsafe`-calling code in the crate: every callback is a raw
/// function pointer supplied across the FFI boundary, so there is no way
/// to verify it behaves, only to call it as documented.
struct CallbackMemBus<'a>(&'a MemCallbacks);

impl MemoryBus for CallbackMemBus<'_> {
    fn fetch2(&mut self, addr: u32) -> Result<u16, MemFault> {
        let mut out = 0u16;
        if (self.0.fetch2)(self.0.ctx, addr, &mut out) {
            Ok(out)
        } else {
            Err(MemFault(addr))
        }
    }

    fn read_u8(&mut self, addr: u32) -> Result<u8, MemFault> {
        let mut out = 0u8;
        if (self.0.read_u8)(self.0.ctx, addr, &mut out) {
            Ok(out)
        } else {
            Err(MemFault(addr))
        }
    }

    fn read_u16(&mut self, addr: u32) -> Result<u16, MemFault> {
        let mut out = 0u16;
        if (self.0.read_u16)(self.0.ctx, addr, &mut out) {
            Ok(out)
        } else {
            Err(MemFault(addr))
        }
    }

    fn read_u32(&mut self, addr: u32) -> Result<u32, MemFault> {
        let mut out = 0u32;
        if (self.0.read_u32)(self.0.ctx, addr, &mut out) {
            Ok(out)
        } else {
            Err(MemFault(addr))
        }
    }

    fn write_u8(&mut self, addr: u32, val: u8) -> Result<(), MemFault> {
        if (self.0.write_u8)(self.0.ctx, addr, val) {
            Ok(())
        } else {
            Err(MemFault(addr))
        }
    }

    fn write_u16(&mut self, addr: u32, val: u16) -> Result<(), MemFault> {
        if (self.0.write_u16)(self.0.ctx, addr, val) {
            Ok(())
        } else {
            Err(MemFault(addr))
        }
    }

    fn write_u32(&mut self, addr: u32, val: u32) -> Result<(), MemFault> {
        if (self.0.write_u32)(self.0.ctx, addr, val) {
            Ok(())
        } else {
            Err(MemFault(addr))
        }
    }

    fn amo_u32(&mut self, addr: u32, op: AtomicOp, src: u32) -> Result<u32, MemFault> {
        let mut out = 0u32;
        if (self.0.amo_u32)(self.0.ctx, addr, atomic_op_code(op), src, &mut out) {
            Ok(out)
        } else {
            Err(MemFault(addr))
        }
    }

    fn lr_u32(&mut self, addr: u32) -> Result<u32, MemFault> {
        let mut out = 0u32;
        if (self.0.lr_u32)(self.0.ctx, addr, &mut out) {
            Ok(out)
        } else {
            Err(MemFault(addr))
        }
    }

    fn sc_u32(&mut self, addr: u32, val: u32) -> Result<bool, MemFault> {
        let mut ok = false;
        if (self.0.sc_u32)(self.0.ctx, addr, val, &mut ok) {
            Ok(ok)
        } else {
            Err(MemFault(addr))
        }
    }
}

fn atomic_op_code(op: AtomicOp) -> u32 {
    match op {
        AtomicOp::Swap => 0,
        AtomicOp::Add => 1,
        AtomicOp::Xor => 2,
        AtomicOp::And => 3,
        AtomicOp::Or => 4,
        AtomicOp::Min => 5,
        AtomicOp::Max => 6,
        AtomicOp::Minu => 7,
        AtomicOp::Maxu => 8,
    }
}

/// # Safety
/// The returned pointer is owned by the caller and must be passed to
/// [`rv32step_destroy`] exactly once.
#[no_mangle]
pub extern "C" fn rv32step_create() -> *mut Model {
    Box::into_raw(Box::new(Model::new(Config::default())))
}

/// # Safety
/// `model` must have come from [`rv32step_create`] and not already have
/// been destroyed.
#[no_mangle]
pub unsafe extern "C" fn rv32step_destroy(model: *mut Model) {
    if !model.is_null() {
        drop(Box::from_raw(model));
    }
}

#[no_mangle]
pub extern "C" fn rv32step_get_description() -> *const ModelDescription {
    &DESCRIPTION
}

/// # Safety
/// `model` must be a valid, non-null pointer from [`rv32step_create`].
#[no_mangle]
pub unsafe extern "C" fn rv32step_reset(model: *mut Model, initial_pc: u32) {
    (*model).reset(initial_pc);
}

/// Reported when the model hit an implementation limit (an unimplemented
/// CSR access) rather than an architectural outcome. Not a valid
/// [`StepStatus`] discriminant (those are all `<= 3`), so a host can
/// tell the two kinds of result apart on the raw byte.
const STEP_UNIMPLEMENTED: u8 = 0xff;

/// # Safety
/// `model` and `callbacks` must be valid, non-null pointers for the
/// duration of the call; `callbacks`' function pointers must be safe to
/// call with the arguments documented on [`MemCallbacks`].
#[no_mangle]
pub unsafe extern "C" fn rv32step_step(model: *mut Model, callbacks: *const MemCallbacks) -> u8 {
    let model = &mut *model;
    let mut bus = CallbackMemBus(&*callbacks);
    match step::step(model, &mut bus) {
        Ok(status) => status as u8,
        Err(_) => STEP_UNIMPLEMENTED,
    }
}

/// Identical to [`rv32step_step`] in every observable respect: both fetch,
/// execute, and populate the trace buffer. The two names exist because a
/// host tends to call a plain `step` when it only wants the return code
/// and `step_trace` when it's about to immediately read the trace buffer
/// back -- a distinction worth keeping at the ABI even though this model
/// always populates the trace either way.
///
/// # Safety
/// Same requirements as [`rv32step_step`].
#[no_mangle]
pub unsafe extern "C" fn rv32step_step_trace(
    model: *mut Model,
    callbacks: *const MemCallbacks,
) -> u8 {
    rv32step_step(model, callbacks)
}

/// # Safety
/// `model` must be a valid, non-null pointer from [`rv32step_create`].
#[no_mangle]
pub unsafe extern "C" fn rv32step_get_trace_buffer(model: *const Model) -> *const TraceRecord {
    &(*model).trace
}

/// # Safety
/// `model` must be a valid, non-null pointer from [`rv32step_create`].
#[no_mangle]
pub unsafe extern "C" fn rv32step_get_pc(model: *const Model) -> u64 {
    sext64((*model).pc)
}

/// # Safety
/// `model` must be a valid, non-null pointer; `xs` must be in `0..32`.
#[no_mangle]
pub unsafe extern "C" fn rv32step_get_xreg(model: *const Model, xs: u8) -> u64 {
    sext64((*model).gpr.read(xs as usize))
}

/// # Safety
/// `model` must be a valid, non-null pointer; `fs` must be in `0..32`.
#[no_mangle]
pub unsafe extern "C" fn rv32step_get_freg(model: *const Model, fs: u8) -> u64 {
    nanbox64((*model).fpr.read(fs as usize))
}

/// # Safety
/// `model` must be a valid, non-null pointer. Returns 0 for a CSR
/// address this model doesn't implement, which is indistinguishable
/// from a real zero value at this boundary -- a host that needs to tell
/// the two apart should stick to the Rust API, where [`Model::csr_read`]
/// returns a proper `Result`.
#[no_mangle]
pub unsafe extern "C" fn rv32step_get_csr(model: *const Model, csr_idx: u16) -> u64 {
    (*model).csr_read(csr_idx as u32).unwrap_or(0) as u64
}
