use crate::gb::constants::*;
use std::sync::Arc;

/// Small games of not more than 32 KiB ROM do not require a MBC chip for ROM banking.
/// The ROM is directly mapped to memory at 0x0000 - 0x7FFF, there is no external RAM
/// and writes have no effect.
pub struct NoMBC {
    rom: Arc<[u8]>,
}

impl NoMBC {
    #[inline]
    pub fn new(rom: Arc<[u8]>) -> Self {
        Self { rom }
    }

    pub fn read(&self, address: u16) -> u8 {
        match address {
            ROM_LOW_BANK_BEGIN..=ROM_HIGH_BANK_END => self
                .rom
                .get(address as usize)
                .copied()
                .unwrap_or(UNDEFINED_READ),
            _ => UNDEFINED_READ,
        }
    }
}
