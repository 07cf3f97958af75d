use crate::gb::bus::{InterruptRegister, MemoryBus};
use crate::gb::cartridge::Cartridge;
use crate::gb::constants::*;
use crate::gb::tests::{rom_image, test_bus};
use crate::gb::{AddressSpace, EmulatorConfig};

#[test]
fn test_post_boot_io() {
    let bus = test_bus();
    assert_eq!(bus.register(JOYPAD), 0xCF);
    assert_eq!(bus.register(PPU_LCDC), 0x91);
    assert_eq!(bus.register(PPU_STAT) & 0b11, 0b10, "PPU starts in OAM search");
    assert_eq!(bus.register(PPU_BGP), 0xFC);
    assert_eq!(bus.register(PPU_LY), 0x00);
    assert_eq!(bus.register(INTERRUPT_FLAG), 0x00);
}

#[test]
fn test_memory_regions() {
    let mut bus = test_bus();
    for address in [VRAM_BEGIN, VRAM_END, WRAM_BEGIN, WRAM_END, OAM_BEGIN, OAM_END] {
        bus.write(address, 0x42);
        assert_eq!(bus.read(address), 0x42, "{address:#06x} should be writable");
    }
    for address in [HRAM_BEGIN, HRAM_END, INTERRUPT_ENABLE] {
        bus.write(address, 0x24);
        assert_eq!(bus.read(address), 0x24, "{address:#06x} should be writable");
    }
}

#[test]
fn test_unused_regions() {
    let mut bus = test_bus();
    for address in [0xE000, 0xF123, 0xFDFF, 0xFEA0, 0xFEFF] {
        bus.write(address, 0x42);
        assert_eq!(bus.read(address), 0xFF, "{address:#06x} should be unused");
    }
}

#[test]
fn test_rom_is_read_only() {
    let mut bus = test_bus();
    let value = bus.read(0x0147);
    bus.write(0x0147, value.wrapping_add(1));
    assert_eq!(bus.read(0x0147), value);
    assert_eq!(bus.read(CRAM_BANK_BEGIN), 0xFF, "No external RAM");
}

#[test]
fn test_word_access() {
    let mut bus = test_bus();
    bus.write_word(WRAM_BEGIN, 0xBEEF);
    assert_eq!(bus.read(WRAM_BEGIN), 0xEF, "Low byte is stored first");
    assert_eq!(bus.read(WRAM_BEGIN + 1), 0xBE);
    assert_eq!(bus.read_word(WRAM_BEGIN), 0xBEEF);
}

#[test]
fn test_dma_transfer() {
    let mut bus = test_bus();
    for i in 0..0xA0u16 {
        bus.write(0xC000 + i, i as u8 ^ 0x5A);
    }
    bus.write(0xC0A0, 0x77);

    bus.write(PPU_DMA, 0xC0);
    for i in 0..0xA0u16 {
        assert_eq!(bus.read(OAM_BEGIN + i), i as u8 ^ 0x5A, "OAM offset {i:#04x}");
    }
    assert_eq!(bus.read(PPU_DMA), 0xC0, "Written value should be kept");
    assert_eq!(bus.read(0xFEA0), 0xFF, "Only 0xA0 bytes are copied");
}

#[test]
fn test_divider_write_resets() {
    let mut bus = test_bus();
    bus.set_register(TIMER_DIVIDER, 0xAB);
    bus.write(TIMER_DIVIDER, 0x12);
    assert_eq!(bus.read(TIMER_DIVIDER), 0x00);
}

#[test]
fn test_read_only_ppu_bits() {
    let mut bus = test_bus();
    bus.set_register(PPU_LY, 0x42);
    bus.write(PPU_LY, 0x00);
    assert_eq!(bus.read(PPU_LY), 0x42, "LY is read-only");

    bus.set_register(PPU_STAT, 0b0000_0110);
    bus.write(PPU_STAT, 0b0111_1001);
    assert_eq!(bus.read(PPU_STAT), 0b0111_1110, "STAT bits 0-2 are read-only");
}

#[test]
fn test_joypad_selection_bits() {
    let mut bus = test_bus();
    bus.write(JOYPAD, 0x00);
    assert_eq!(bus.read(JOYPAD), 0xCF, "Lower nibble is read-only");
    bus.write(JOYPAD, 0xFF);
    assert_eq!(bus.read(JOYPAD), 0xFF);
}

#[test]
fn test_serial_transfer() {
    let mut bus = test_bus();
    for &byte in b"ok\n" {
        bus.write(SERIAL_TRANSFER_DATA, byte);
        bus.write(SERIAL_TRANSFER_CTRL, 0x81);
        assert_eq!(bus.read(SERIAL_TRANSFER_CTRL), 0x00, "Control should be cleared");
    }
    assert_eq!(bus.serial.output(), b"ok\n");

    bus.write(SERIAL_TRANSFER_DATA, b'x');
    bus.write(SERIAL_TRANSFER_CTRL, 0x80);
    assert_eq!(bus.serial.output(), b"ok\n", "External clock doesn't transfer");
    assert_eq!(bus.read(SERIAL_TRANSFER_CTRL), 0x80);
}

#[test]
fn test_serial_output_not_kept_with_window() {
    let cartridge = Cartridge::try_from(rom_image(0x00, 0x00, 0x00)).unwrap();
    let mut bus = MemoryBus::new(cartridge, &EmulatorConfig::default());
    for _ in 0..1024 {
        bus.write(SERIAL_TRANSFER_DATA, b'x');
        bus.write(SERIAL_TRANSFER_CTRL, 0x81);
    }
    assert!(bus.serial.output().is_empty());
    assert_eq!(bus.read(SERIAL_TRANSFER_CTRL), 0x00);
}

#[test]
fn test_request_interrupt() {
    let mut bus = test_bus();
    bus.request_interrupt(InterruptRegister::TIMER);
    bus.request_interrupt(InterruptRegister::VBLANK);
    assert_eq!(bus.read(INTERRUPT_FLAG), 0b0000_0101);
}

#[test]
fn test_interrupt_priority_order() {
    let all = InterruptRegister::all();
    assert_eq!(all.highest_prio(), Some(InterruptRegister::VBLANK));
    let rest = all - InterruptRegister::VBLANK;
    assert_eq!(rest.highest_prio(), Some(InterruptRegister::STAT));
    assert_eq!(InterruptRegister::JOYPAD.highest_prio(), Some(InterruptRegister::JOYPAD));
    assert_eq!(InterruptRegister::empty().highest_prio(), None);
}
