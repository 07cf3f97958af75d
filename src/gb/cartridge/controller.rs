use crate::gb::cartridge::mbc1::MBC1;
use crate::gb::cartridge::mbc3::MBC3;
use crate::gb::cartridge::nombc::NoMBC;
use crate::gb::cartridge::{CartridgeConfig, ControllerType, RAM_BANK_SIZE, ROM_BANK_SIZE};
use crate::gb::constants::*;
use std::sync::Arc;

/// Translates accesses to the cartridge windows depending on the controller state.
/// Each variant holds only the state its chip needs.
pub enum BankController {
    NoMBC(NoMBC),
    MBC1(MBC1),
    MBC3(MBC3),
}

impl BankController {
    /// Creates a new `BankController` with the given ROM and `CartridgeConfig`.
    pub fn new(config: CartridgeConfig, rom: Arc<[u8]>) -> Self {
        match config.controller {
            ControllerType::NoMBC => BankController::NoMBC(NoMBC::new(rom)),
            ControllerType::MBC1 => BankController::MBC1(MBC1::new(config, rom)),
            ControllerType::MBC3 => BankController::MBC3(MBC3::new(config, rom)),
        }
    }

    #[inline]
    pub fn read(&self, address: u16) -> u8 {
        match self {
            BankController::NoMBC(ctrl) => ctrl.read(address),
            BankController::MBC1(ctrl) => ctrl.read(address),
            BankController::MBC3(ctrl) => ctrl.read(address),
        }
    }

    #[inline]
    pub fn write(&mut self, address: u16, value: u8) {
        match self {
            BankController::NoMBC(_) => {}
            BankController::MBC1(ctrl) => ctrl.write(address, value),
            BankController::MBC3(ctrl) => ctrl.write(address, value),
        }
    }
}

/// Reads from the switchable ROM window, the bank wraps around the banks present.
/// Addresses beyond the end of the image read as 0xFF.
#[inline]
pub(super) fn read_rom_bank(rom: &[u8], banks: usize, bank: u8, address: u16) -> u8 {
    let bank = bank as usize % banks.max(1);
    let offset = bank * ROM_BANK_SIZE + (address - ROM_HIGH_BANK_BEGIN) as usize;
    rom.get(offset).copied().unwrap_or(UNDEFINED_READ)
}

/// Returns the index into external RAM for the given bank, wrapping around the banks present.
/// Returns `None` if the cartridge has no RAM.
#[inline]
pub(super) fn ram_index(ram: &[u8], bank: u8, address: u16) -> Option<usize> {
    let banks = ram.len() / RAM_BANK_SIZE;
    if banks == 0 {
        return None;
    }
    Some((bank as usize % banks) * RAM_BANK_SIZE + (address - CRAM_BANK_BEGIN) as usize)
}
