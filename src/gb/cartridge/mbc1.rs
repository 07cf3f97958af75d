use crate::gb::cartridge::CartridgeConfig;
use crate::gb::cartridge::controller::{ram_index, read_rom_bank};
use crate::gb::constants::*;
use std::sync::Arc;

/// Before external RAM can be read or written,
/// it must be enabled by writing 0x0A to anywhere in this address space.
/// Any value with 0x0A in the lower 4 bits enables the RAM attached to the MBC,
/// and any other value disables the RAM.
const RAM_ENABLE_BEGIN: u16 = 0x0000;
const RAM_ENABLE_END: u16 = 0x1FFF;

/// This 5-bit register (range $01-$1F) selects the ROM bank number for the 4000–7FFF region.
/// Higher bits are discarded, writing $E1 (binary 11100001) to this register would select bank $01.
/// If this register is set to $00, it behaves as if it is set to $01.
const ROM_BANK_NUMBER_BEGIN: u16 = 0x2000;
const ROM_BANK_NUMBER_END: u16 = 0x3FFF;

/// This 2-bit register selects the RAM bank mapped to 0xA000 - 0xBFFF.
const RAM_BANK_NUMBER_BEGIN: u16 = 0x4000;
const RAM_BANK_NUMBER_END: u16 = 0x5FFF;

/// Banking mode select. Only the simple banking mode is supported, writes are ignored.
const BANKING_MODE_SELECT_BEGIN: u16 = 0x6000;
const BANKING_MODE_SELECT_END: u16 = 0x7FFF;

/// MBC1 supports up to 2 MiB ROM and up to 32 KiB of banked RAM.
pub struct MBC1 {
    config: CartridgeConfig,
    rom: Arc<[u8]>,
    ram: Vec<u8>,
    ram_enabled: bool,
    rom_bank: u8, // Mapped ROM bank for 0x4000 - 0x7FFF, never 0
    ram_bank: u8, // Mapped RAM bank for 0xA000 - 0xBFFF
}

impl MBC1 {
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
                self.rom_bank = match value & 0b0001_1111 {
                    0 => 1,
                    n => n,
                };
            }
            RAM_BANK_NUMBER_BEGIN..=RAM_BANK_NUMBER_END => {
                self.ram_bank = value & 0b11;
            }
            BANKING_MODE_SELECT_BEGIN..=BANKING_MODE_SELECT_END => {}
            CRAM_BANK_BEGIN..=CRAM_BANK_END if self.ram_enabled => {
                if let Some(index) = ram_index(&self.ram, self.ram_bank, address) {
                    self.ram[index] = value;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gb::cartridge::{ControllerType, RAM_BANK_SIZE, ROM_BANK_SIZE};

    /// Creates a ROM image where every byte of a bank holds the bank number.
    fn banked_rom(banks: u8) -> Arc<[u8]> {
        (0..banks).flat_map(|i| vec![i; ROM_BANK_SIZE]).collect()
    }

    #[test]
    fn test_ram_state() {
        let config = CartridgeConfig::new(ControllerType::MBC1, 0x03, 0x02).unwrap();
        let mut ctrl = MBC1::new(config, banked_rom(16));

        let addr = CRAM_BANK_BEGIN + 0x10;
        ctrl.write(addr, 0x42);
        assert_eq!(ctrl.read(addr), 0xFF, "RAM should be disabled");

        ctrl.write(RAM_ENABLE_BEGIN, 0x0A);
        assert_eq!(ctrl.read(addr), 0x00, "First write should have been ignored");

        ctrl.write(addr, 0x42);
        assert_eq!(ctrl.read(addr), 0x42, "RAM should be enabled");

        ctrl.write(RAM_ENABLE_BEGIN, 0x1A);
        assert_eq!(ctrl.read(addr), 0x42, "Only the low nibble is compared");

        ctrl.write(RAM_ENABLE_BEGIN, 0xFF);
        assert_eq!(ctrl.read(addr), 0xFF, "RAM should be disabled");

        ctrl.write(RAM_ENABLE_BEGIN, 0x0A);
        assert_eq!(ctrl.read(addr), 0x42, "RAM content should be retained");
    }

    #[test]
    fn test_rom_bank_select() {
        let config = CartridgeConfig::new(ControllerType::MBC1, 0x04, 0x00).unwrap();
        let mut ctrl = MBC1::new(config, banked_rom(32));

        assert_eq!(ctrl.read(ROM_LOW_BANK_BEGIN), 0);
        assert_eq!(ctrl.read(ROM_HIGH_BANK_BEGIN), 1, "Bank 1 is mapped initially");

        for i in 1..32 {
            ctrl.write(ROM_BANK_NUMBER_BEGIN, i);
            assert_eq!(ctrl.read(ROM_HIGH_BANK_BEGIN), i, "ROM bank {i} should be selected");
            assert_eq!(ctrl.read(ROM_LOW_BANK_END), 0, "Bank 0 stays fixed");
        }

        ctrl.write(ROM_BANK_NUMBER_END, 0xE2);
        assert_eq!(ctrl.rom_bank, 0x02, "Only the lower 5 bits should be used");
    }

    #[test]
    fn test_rom_bank_zero_coercion() {
        let config = CartridgeConfig::new(ControllerType::MBC1, 0x04, 0x00).unwrap();
        let mut ctrl = MBC1::new(config, banked_rom(32));

        for prior in [1, 5, 0x1F] {
            ctrl.write(ROM_BANK_NUMBER_BEGIN, prior);
            ctrl.write(ROM_BANK_NUMBER_BEGIN, 0x00);
            assert_eq!(ctrl.rom_bank, 1, "0x00 should be treated as 0x01");
            assert_eq!(ctrl.read(ROM_HIGH_BANK_BEGIN + 0x100), 1);
        }

        ctrl.write(ROM_BANK_NUMBER_BEGIN, 0x20);
        assert_eq!(ctrl.rom_bank, 1, "0x20 masks to 0x00 and is coerced as well");
    }

    #[test]
    fn test_rom_bank_wraps() {
        let config = CartridgeConfig::new(ControllerType::MBC1, 0x01, 0x00).unwrap();
        let mut ctrl = MBC1::new(config, banked_rom(4));

        ctrl.write(ROM_BANK_NUMBER_BEGIN, 6);
        assert_eq!(ctrl.read(ROM_HIGH_BANK_BEGIN), 2, "Bank 6 wraps to bank 2");
    }

    #[test]
    fn test_ram_banking() {
        let config = CartridgeConfig::new(ControllerType::MBC1, 0x00, 0x03).unwrap();
        let mut ctrl = MBC1::new(config, banked_rom(2));
        ctrl.write(RAM_ENABLE_BEGIN, 0x0A);

        for i in 0u8..4 {
            ctrl.write(RAM_BANK_NUMBER_BEGIN, i);
            assert_eq!(ctrl.read(CRAM_BANK_BEGIN), 0, "RAM should be initialized to 0");
            ctrl.write(CRAM_BANK_BEGIN, i + 1);
        }

        for i in 0u8..4 {
            ctrl.write(RAM_BANK_NUMBER_BEGIN, i);
            assert_eq!(ctrl.read(CRAM_BANK_BEGIN), i + 1, "RAM should return {}", i + 1);
        }

        ctrl.write(RAM_BANK_NUMBER_BEGIN, 0xFE);
        assert_eq!(ctrl.ram_bank, 0b10, "Only the lower 2 bits should be used");
        assert_eq!(ctrl.ram.len(), RAM_BANK_SIZE * 4);
    }

    #[test]
    fn test_mode_select_ignored() {
        let config = CartridgeConfig::new(ControllerType::MBC1, 0x04, 0x03).unwrap();
        let mut ctrl = MBC1::new(config, banked_rom(32));
        ctrl.write(ROM_BANK_NUMBER_BEGIN, 3);
        ctrl.write(BANKING_MODE_SELECT_BEGIN, 0x01);
        assert_eq!(ctrl.read(ROM_LOW_BANK_BEGIN), 0);
        assert_eq!(ctrl.read(ROM_HIGH_BANK_BEGIN), 3);
    }
}
