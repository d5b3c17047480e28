//! A single contiguous byte-addressed region backing [`MemoryBus`]. No
//! MMIO, no caches, no latency model -- just bounds checking and a
//! one-entry reservation set for `lr.w`/`sc.w`.

use crate::common::error::MemFault;
use crate::core::mem_bus::MemoryBus;
use crate::core::units::lsu::{AtomicOp, Lsu};

pub struct FlatMemory {
    base: u32,
    bytes: Vec<u8>,
    reservation: Option<u32>,
}

impl FlatMemory {
    pub fn new(base: u32, size: u32) -> Self {
        FlatMemory {
            base,
            bytes: vec![0; size as usize],
            reservation: None,
        }
    }

    pub fn load_image(base: u32, image: &[u8]) -> Self {
        let mut mem = FlatMemory {
            base,
            bytes: image.to_vec(),
            reservation: None,
        };
        mem.bytes.resize(image.len().max(1), 0);
        mem
    }

    fn offset(&self, addr: u32, width: u32) -> Result<usize, MemFault> {
        let rel = addr.checked_sub(self.base).ok_or(MemFault(addr))?;
        let end = rel.checked_add(width).ok_or(MemFault(addr))?;
        if end as usize > self.bytes.len() {
            return Err(MemFault(addr));
        }
        Ok(rel as usize)
    }
}

impl MemoryBus for FlatMemory {
    fn fetch2(&mut self, addr: u32) -> Result<u16, MemFault> {
        self.read_u16(addr)
    }

    fn read_u8(&mut self, addr: u32) -> Result<u8, MemFault> {
        let off = self.offset(addr, 1)?;
        Ok(self.bytes[off])
    }

    fn read_u16(&mut self, addr: u32) -> Result<u16, MemFault> {
        let off = self.offset(addr, 2)?;
        Ok(u16::from_le_bytes(self.bytes[off..off + 2].try_into().unwrap()))
    }

    fn read_u32(&mut self, addr: u32) -> Result<u32, MemFault> {
        let off = self.offset(addr, 4)?;
        Ok(u32::from_le_bytes(self.bytes[off..off + 4].try_into().unwrap()))
    }

    fn write_u8(&mut self, addr: u32, val: u8) -> Result<(), MemFault> {
        let off = self.offset(addr, 1)?;
        self.bytes[off] = val;
        self.reservation = None;
        Ok(())
    }

    fn write_u16(&mut self, addr: u32, val: u16) -> Result<(), MemFault> {
        let off = self.offset(addr, 2)?;
        self.bytes[off..off + 2].copy_from_slice(&val.to_le_bytes());
        self.reservation = None;
        Ok(())
    }

    fn write_u32(&mut self, addr: u32, val: u32) -> Result<(), MemFault> {
        let off = self.offset(addr, 4)?;
        self.bytes[off..off + 4].copy_from_slice(&val.to_le_bytes());
        self.reservation = None;
        Ok(())
    }

    fn amo_u32(&mut self, addr: u32, op: AtomicOp, src: u32) -> Result<u32, MemFault> {
        let old = self.read_u32(addr)?;
        let new = Lsu::atomic_alu(op, old, src);
        self.write_u32(addr, new)?;
        Ok(old)
    }

    fn lr_u32(&mut self, addr: u32) -> Result<u32, MemFault> {
        let val = self.read_u32(addr)?;
        self.reservation = Some(addr);
        Ok(val)
    }

    fn sc_u32(&mut self, addr: u32, val: u32) -> Result<bool, MemFault> {
        if self.reservation == Some(addr) {
            self.write_u32(addr, val)?;
            Ok(true)
        } else {
            self.reservation = None;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_access_faults_with_the_requested_address() {
        let mut mem = FlatMemory::new(0x1000, 16);
        assert_eq!(mem.read_u32(0x2000), Err(MemFault(0x2000)));
    }

    #[test]
    fn sc_without_a_matching_reservation_fails_and_leaves_memory_untouched() {
        let mut mem = FlatMemory::new(0, 16);
        mem.write_u32(0, 0xaaaa_aaaa).unwrap();
        let ok = mem.sc_u32(0, 0x1111_1111).unwrap();
        assert!(!ok);
        assert_eq!(mem.read_u32(0).unwrap(), 0xaaaa_aaaa);
    }

    #[test]
    fn any_store_clears_a_pending_reservation() {
        let mut mem = FlatMemory::new(0, 16);
        mem.lr_u32(0).unwrap();
        mem.write_u8(8, 1).unwrap();
        assert!(!mem.sc_u32(0, 0x1234_5678).unwrap());
    }
}
