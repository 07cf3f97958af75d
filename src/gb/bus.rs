use crate::gb::cartridge::Cartridge;
use crate::gb::constants::*;
use crate::gb::ppu::registers::LCDMode;
use crate::gb::serial::SerialTransfer;
use crate::gb::{AddressSpace, EmulatorConfig};
use bitflags::bitflags;

bitflags! {
    /// Represents interrupt registers IE at 0xFFFF and IF at 0xFF0F
    #[derive(Copy, Clone, PartialEq, Debug, Default)]
    pub struct InterruptRegister: u8 {
        const VBLANK = 0b00000001; // V-Blank Interrupt
        const STAT   = 0b00000010; // LCD STAT Interrupt
        const TIMER  = 0b00000100; // Timer Overflow Interrupt
        const SERIAL = 0b00001000; // Serial Transfer Completion Interrupt
        const JOYPAD = 0b00010000; // Joypad Input Interrupt
    }
}

impl InterruptRegister {
    /// Returns the interrupt with the highest priority.
    #[inline]
    pub fn highest_prio(&self) -> Option<InterruptRegister> {
        self.iter_names().map(|(_, irq)| irq).next()
    }
}

/// I/O register values after the boot ROM handed over control.
const IO_DEFAULTS: [(u16, u8); 4] = [
    (JOYPAD, 0xCF),
    (PPU_LCDC, 0x91),
    (PPU_STAT, LCDMode::OAMSearch as u8),
    (PPU_BGP, 0xFC),
];

/// Defines the global memory bus, all processing units access memory through it.
/// The I/O block is the only place where hardware register state lives.
pub struct MemoryBus {
    pub cartridge: Cartridge,
    pub serial: SerialTransfer,
    vram: [u8; VRAM_SIZE],
    wram: [u8; WRAM_SIZE],
    oam: [u8; OAM_SIZE],
    io: [u8; IO_SIZE],
    hram: [u8; HRAM_SIZE],
    interrupt_enable: u8,
}

impl MemoryBus {
    pub fn new(cartridge: Cartridge, config: &EmulatorConfig) -> Self {
        let mut io = [0u8; IO_SIZE];
        for (address, value) in IO_DEFAULTS {
            io[(address - IO_BEGIN) as usize] = value;
        }
        Self {
            cartridge,
            serial: SerialTransfer::new(config.print_serial, config.headless),
            vram: [0u8; VRAM_SIZE],
            wram: [0u8; WRAM_SIZE],
            oam: [0u8; OAM_SIZE],
            io,
            hram: [0u8; HRAM_SIZE],
            interrupt_enable: 0,
        }
    }

    /// Reads a hardware register without any side effects.
    #[inline]
    pub fn register(&self, address: u16) -> u8 {
        self.io[(address - IO_BEGIN) as usize]
    }

    /// Writes a hardware register without any side effects,
    /// used by the peripherals to update their own state.
    #[inline]
    pub fn set_register(&mut self, address: u16, value: u8) {
        self.io[(address - IO_BEGIN) as usize] = value;
    }

    /// Sets the given bits in IF.
    #[inline]
    pub fn request_interrupt(&mut self, irq: InterruptRegister) {
        let flags = self.register(INTERRUPT_FLAG);
        self.set_register(INTERRUPT_FLAG, flags | irq.bits());
    }

    /// Copies 0xA0 bytes starting at `value << 8` into OAM.
    /// The transfer completes instantly.
    fn dma_transfer(&mut self, value: u8) {
        let source = u16::from(value) << 8;
        for offset in 0..DMA_TRANSFER_SIZE {
            let byte = self.read(source.wrapping_add(offset));
            self.oam[offset as usize] = byte;
        }
    }

    /// Handles all writes to the I/O registers (0xFF00-0xFF7F)
    fn write_io(&mut self, address: u16, value: u8) {
        match address {
            // Only the selection bits are writable
            JOYPAD => {
                let joyp = self.register(JOYPAD);
                self.set_register(JOYPAD, (joyp & 0b1100_1111) | (value & 0b0011_0000));
            }
            SERIAL_TRANSFER_CTRL => {
                self.set_register(address, value);
                if value == SerialTransfer::START_INTERNAL_CLOCK {
                    let data = self.register(SERIAL_TRANSFER_DATA);
                    self.serial.transfer(data);
                    self.set_register(address, 0);
                }
            }
            // Whenever a ROM writes to this register it will reset to 0
            TIMER_DIVIDER => self.set_register(address, 0),
            // Bits 0-2 are controlled by the PPU
            PPU_STAT => {
                let stat = self.register(PPU_STAT);
                self.set_register(PPU_STAT, (value & 0b0111_1000) | (stat & 0b0000_0111));
            }
            // LY is read-only
            PPU_LY => {}
            PPU_DMA => {
                self.set_register(address, value);
                self.dma_transfer(value);
            }
            _ => self.set_register(address, value),
        }
    }
}

impl AddressSpace for MemoryBus {
    fn write(&mut self, address: u16, value: u8) {
        match address {
            ROM_LOW_BANK_BEGIN..=ROM_HIGH_BANK_END => self.cartridge.write(address, value),
            VRAM_BEGIN..=VRAM_END => self.vram[(address - VRAM_BEGIN) as usize] = value,
            CRAM_BANK_BEGIN..=CRAM_BANK_END => self.cartridge.write(address, value),
            WRAM_BEGIN..=WRAM_END => self.wram[(address - WRAM_BEGIN) as usize] = value,
            OAM_BEGIN..=OAM_END => self.oam[(address - OAM_BEGIN) as usize] = value,
            IO_BEGIN..=IO_END => self.write_io(address, value),
            HRAM_BEGIN..=HRAM_END => self.hram[(address - HRAM_BEGIN) as usize] = value,
            INTERRUPT_ENABLE => self.interrupt_enable = value,
            // 0xE000-0xFDFF and 0xFEA0-0xFEFF are unused
            _ => {}
        }
    }

    fn read(&mut self, address: u16) -> u8 {
        match address {
            ROM_LOW_BANK_BEGIN..=ROM_HIGH_BANK_END => self.cartridge.read(address),
            VRAM_BEGIN..=VRAM_END => self.vram[(address - VRAM_BEGIN) as usize],
            CRAM_BANK_BEGIN..=CRAM_BANK_END => self.cartridge.read(address),
            WRAM_BEGIN..=WRAM_END => self.wram[(address - WRAM_BEGIN) as usize],
            OAM_BEGIN..=OAM_END => self.oam[(address - OAM_BEGIN) as usize],
            IO_BEGIN..=IO_END => self.register(address),
            HRAM_BEGIN..=HRAM_END => self.hram[(address - HRAM_BEGIN) as usize],
            INTERRUPT_ENABLE => self.interrupt_enable,
            _ => UNDEFINED_READ,
        }
    }
}
