use crate::gb::bus::MemoryBus;
use crate::gb::cartridge::Cartridge;
use crate::gb::cpu::CPU;
use crate::gb::display::{Display, SpeedLimiter};
use crate::gb::joypad::{Joypad, JoypadInput};
use crate::gb::ppu::PPU;
use crate::gb::ppu::buffer::FrameBuffer;
use crate::gb::timer::Timer;
use std::path::PathBuf;
use thiserror::Error;

pub mod bus;
pub mod cartridge;
pub mod constants;
pub mod cpu;
pub mod display;
pub mod joypad;
pub mod ppu;
mod serial;
#[cfg(test)]
mod tests;
pub mod timer;
mod utils;

pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;

/// The CPU runs at 4.194304 MHz, this is the duration of one cycle in nanoseconds.
pub const NANOS_PER_CYCLE: f64 = 238.418579;

/// Cycles charged for dispatching an interrupt.
pub const INTERRUPT_DISPATCH_CYCLES: u32 = 20;

pub type GBResult<T> = Result<T, GBError>;

/// All errors the emulator core can report.
#[derive(Debug, Error)]
pub enum GBError {
    #[error("unable to read ROM: {0}")]
    Io(#[from] std::io::Error),
    #[error("ROM image is too small to contain a header ({size} bytes)")]
    RomTooSmall { size: usize },
    #[error("cartridge type {0:#04x} is not supported")]
    UnsupportedCartridge(u8),
    #[error("unsupported RAM size {0:#04x}")]
    UnsupportedRamSize(u8),
    #[error("unsupported ROM size {0:#04x}")]
    UnsupportedRomSize(u8),
    #[error("illegal opcode {opcode:#04x} at {address:#06x}")]
    IllegalOpcode { opcode: u8, address: u16 },
}

/// This trait defines a common interface to read and write the 16-bit address space.
pub trait AddressSpace {
    /// Writes a byte to the given address.
    fn write(&mut self, address: u16, value: u8);

    /// Reads a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Reads a little-endian word starting at the given address.
    #[inline]
    fn read_word(&mut self, address: u16) -> u16 {
        let low = u16::from(self.read(address));
        let high = u16::from(self.read(address.wrapping_add(1)));
        (high << 8) | low
    }

    /// Writes a little-endian word starting at the given address.
    #[inline]
    fn write_word(&mut self, address: u16, value: u16) {
        self.write(address, value as u8);
        self.write(address.wrapping_add(1), (value >> 8) as u8);
    }
}

/// This enum defines the possible messages that can be sent from the emulator to the frontend.
pub enum EmulatorMessage {
    Frame(FrameBuffer),
}

/// This enum defines the possible messages that can be sent from the frontend to the emulator.
pub enum FrontendMessage {
    Stop,
    Input(JoypadInput),
}

/// Holds the configuration for the emulator.
#[derive(Clone, Debug)]
pub struct EmulatorConfig {
    pub rom: PathBuf,          // Path to the ROM file
    pub upscale: usize,        // Scale factor for the display
    pub print_serial: bool,    // Print serial data to stdout
    pub headless: bool,        // Run in headless mode (no display)
    pub frames: Option<u64>,   // Stop after the given amount of frames (headless only)
    pub fps_limit: bool,       // Pace emulation to real hardware speed
    pub interrupt_cycles: u32, // Cycles charged per interrupt dispatch
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            rom: PathBuf::new(),
            upscale: 3,
            print_serial: false,
            headless: false,
            frames: None,
            fps_limit: true,
            interrupt_cycles: INTERRUPT_DISPATCH_CYCLES,
        }
    }
}

/// Holds and manages the state of the whole emulator backend.
pub struct Emulator<D: Display> {
    cpu: CPU,
    bus: MemoryBus,
    ppu: PPU,
    timer: Timer,
    joypad: Joypad,
    display: D,
    fps_limit: bool,
    total_cycles: u64,
}

impl<D: Display> Emulator<D> {
    /// Creates a new `Emulator` in the post-boot state with the given cartridge inserted.
    pub fn new(cartridge: Cartridge, display: D, config: &EmulatorConfig) -> Self {
        let mut cpu = CPU::default();
        cpu.interrupt_cycles = config.interrupt_cycles;
        Self {
            cpu,
            bus: MemoryBus::new(cartridge, config),
            ppu: PPU::default(),
            timer: Timer::default(),
            joypad: Joypad::default(),
            display,
            fps_limit: config.fps_limit,
            total_cycles: 0,
        }
    }

    /// Runs the emulator loop until the display requests termination
    /// or the CPU hits an illegal opcode.
    pub fn run(&mut self) -> GBResult<()> {
        log::info!("Starting emulator...");
        log::info!("Loaded ROM: {}", self.bus.cartridge.header);
        let mut limiter = self.fps_limit.then(SpeedLimiter::default);

        loop {
            let event = self.display.poll();
            if event.quit {
                break;
            }
            self.joypad.update(&mut self.bus, event.input);

            if let Err(err) = self.step() {
                log::error!("Emulation halted: {err}");
                return Err(err);
            }

            if let Some(limiter) = &mut limiter {
                limiter.wait(self.total_cycles);
            }
        }

        log::info!("Emulator stopped after {} cycles", self.total_cycles);
        Ok(())
    }

    /// Services pending interrupts, executes one instruction and advances
    /// the PPU and timer by the consumed cycles.
    pub fn step(&mut self) -> GBResult<u32> {
        let mut cycles = cpu::interrupt::handle(&mut self.cpu, &mut self.bus);
        cycles += self.cpu.step(&mut self.bus)?;
        self.ppu.step(&mut self.bus, &mut self.display, cycles);
        self.timer.step(&mut self.bus, cycles);
        self.total_cycles += u64::from(cycles);
        Ok(cycles)
    }

    /// Returns the amount of cycles emulated so far.
    #[inline]
    pub const fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Returns all bytes sent over the serial port so far, only collected in headless mode.
    #[inline]
    pub fn serial_output(&self) -> &[u8] {
        self.bus.serial.output()
    }
}
