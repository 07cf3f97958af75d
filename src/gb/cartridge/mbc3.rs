use crate::gb::cartridge::CartridgeConfig;
use crate::gb::cartridge::controller::{ram_index, read_rom_bank};
use crate::gb::constants::*;
use std::sync::Arc;

/// Mostly the same as for MBC1, a value of $0A will enable reading and writing to external RAM.
/// A value of $00 will disable it.
const RAM_ENABLE_BEGIN: u16 = 0x0000;
const RAM_ENABLE_END: u16 = 0x1FFF;

/// Same as for MBC1, except that the whole 7 bits of the ROM Bank Number are written directly to
/// this address. As for the MBC1, writing a value of 0x00 will select Bank 0x01 instead.
/// All other values 0x01-0x7F select the corresponding ROM Banks.
const ROM_BANK_NUMBER_BEGIN: u16 = 0x2000;
const ROM_BANK_NUMBER_END: u16 = 0x3FFF;

/// Selects the RAM bank mapped to 0xA000 - 0xBFFF from the lower 2 bits.
/// The RTC register selection is not emulated.
const RAM_BANK_NUMBER_BEGIN: u16 = 0x4000;
const RAM_BANK_NUMBER_END: u16 = 0x5FFF;

/// RTC latch, writes are accepted and ignored.
const LATCH_CLOCK_DATA_BEGIN: u16 = 0x6000;
const LATCH_CLOCK_DATA_END: u16 = 0x7FFF;

/// Beside for the ability to access up to 2MB ROM (128 banks), and 32KB RAM (4 banks),
/// the MBC3 also includes a built-in Real Time Clock (RTC) which is not emulated.
pub struct MBC3 {
    config: CartridgeConfig,
    rom: Arc<[u8]>,
    ram: Vec<u8>,
    ram_enabled: bool,
    rom_bank: u8, // Mapped ROM bank for 0x4000 - 0x7FFF, never 0
    ram_bank: u8, // Mapped RAM bank for 0xA000 - 0xBFFF
}

impl MBC3 {
    pub fn new(config: CartridgeConfig, rom: Arc<[u8]>) -> Self {
        Self {
            ram: vec![0; config.ram_size],
            ram_enabled: false,
            rom_bank: 1,
            ram_bank: 0,
            rom,
            config,
        }
    }

    pub fn read(&self, address: u16) -> u8 {
        match address {
            ROM_LOW_BANK_BEGIN..=ROM_LOW_BANK_END => self
                .rom
                .get(address as usize)
                .copied()
                .unwrap_or(UNDEFINED_READ),
            ROM_HIGH_BANK_BEGIN..=ROM_HIGH_BANK_END => {
                read_rom_bank(&self.rom, self.config.rom_banks, self.rom_bank, address)
            }
            CRAM_BANK_BEGIN..=CRAM_BANK_END if self.ram_enabled => {
                match ram_index(&self.ram, self.ram_bank, address) {
                    Some(index) => self.ram[index],
                    None => UNDEFINED_READ,
                }
            }
            _ => UNDEFINED_READ,
        }
    }

    pub fn write(&mut self, address: u16, value: u8) {
        match address {
            RAM_ENABLE_BEGIN..=RAM_ENABLE_END => {
                self.ram_enabled = value & 0b1111 == 0b1010;
            }
            ROM_BANK_NUMBER_BEGIN..=ROM_BANK_NUMBER_END => {
                self.rom_bank = match value & 0b0111_1111 {
                    0 => 1,
                    n => n,
                };
            }
            RAM_BANK_NUMBER_BEGIN..=RAM_BANK_NUMBER_END => {
                self.ram_bank = value & 0b11;
            }
            LATCH_CLOCK_DATA_BEGIN..=LATCH_CLOCK_DATA_END => {}
            CRAM_BANK_BEGIN..=CRAM_BANK_END if self.ram_enabled => {
                if let Some(index) = ram_index(&self.ram, self.ram_bank, address) {
                    self.ram[index] = value;
                }
            }
            _ => {}
        }
    }
}
