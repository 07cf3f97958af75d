mod bus;

use crate::gb::bus::MemoryBus;
use crate::gb::cartridge::Cartridge;
use crate::gb::{AddressSpace, EmulatorConfig};

/// Flat 64 KiB address space without any side effects.
pub struct MockBus {
    data: Vec<u8>,
}

impl MockBus {
    /// Creates a new bus with `data` placed at address 0x0000.
    pub fn new(data: &[u8]) -> Self {
        let mut memory = vec![0u8; 0x10000];
        memory[..data.len()].copy_from_slice(data);
        Self { data: memory }
    }
}

impl AddressSpace for MockBus {
    fn write(&mut self, address: u16, value: u8) {
        self.data[address as usize] = value;
    }

    fn read(&mut self, address: u16) -> u8 {
        self.data[address as usize]
    }
}

/// Builds a ROM image with a valid header for the given cartridge type and size codes.
pub fn rom_image(cartridge_type: u8, rom_size: u8, ram_size: u8) -> Vec<u8> {
    let mut rom = vec![0u8; (32 * 1024) << rom_size];
    rom[0x0134..0x0134 + 7].copy_from_slice(b"TESTROM");
    rom[0x0147] = cartridge_type;
    rom[0x0148] = rom_size;
    rom[0x0149] = ram_size;
    update_checksums(&mut rom);
    rom
}

/// Builds a ROM-only image with the given program at the entry point 0x0100.
pub fn rom_with_program(program: &[u8]) -> Vec<u8> {
    let mut rom = rom_image(0x00, 0x00, 0x00);
    rom[0x0100..0x0100 + program.len()].copy_from_slice(program);
    update_checksums(&mut rom);
    rom
}

fn update_checksums(rom: &mut [u8]) {
    rom[0x014D] = rom[0x0134..0x014D]
        .iter()
        .fold(0u8, |sum, &b| sum.wrapping_sub(b).wrapping_sub(1));
    let global = rom
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != 0x014E && *i != 0x014F)
        .fold(0u16, |sum, (_, &b)| sum.wrapping_add(b as u16));
    rom[0x014E] = (global >> 8) as u8;
    rom[0x014F] = global as u8;
}

/// Creates a headless `MemoryBus` in the post-boot state with an empty ROM-only cartridge.
pub fn test_bus() -> MemoryBus {
    let cartridge = Cartridge::try_from(rom_image(0x00, 0x00, 0x00)).unwrap();
    let config = EmulatorConfig {
        headless: true,
        ..EmulatorConfig::default()
    };
    MemoryBus::new(cartridge, &config)
}
