use crate::gb::cartridge::controller::BankController;
use crate::gb::{GBError, GBResult};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

mod controller;
mod mbc1;
mod mbc3;
mod nombc;
#[cfg(test)]
mod tests;

/// This area of memory contains the cartridge title
const CARTRIDGE_TITLE_BEGIN: u16 = 0x0134;
const CARTRIDGE_TITLE_END: u16 = 0x0143;

/// This address contains the cartridge type and what kind of hardware is present
/// 0x00        => ROM Only
/// 0x01 - 0x03 => MBC1 (+ RAM + Battery)
/// 0x0F - 0x13 => MBC3 (+ Timer + RAM + Battery)
/// See https://gbdev.io/pandocs/The_Cartridge_Header.html#0147--cartridge-type
const CARTRIDGE_TYPE: u16 = 0x0147;

/// This byte indicates how much ROM is present on the cartridge.
/// In most cases, the ROM size is given by 32KiB * (1 << value).
const CARTRIDGE_ROM_SIZE: u16 = 0x0148;

/// This byte indicates how much RAM is present on the cartridge.
const CARTRIDGE_RAM_SIZE: u16 = 0x0149;

/// This byte contains an 8-bit checksum computed from the cartridge header bytes 0x0134 – 0x014C.
const CARTRIDGE_HEADER_CHECKSUM: u16 = 0x014D;

/// These bytes contain a 16-bit (big-endian) checksum simply computed as the sum of all
/// the bytes of the cartridge ROM (except these two checksum bytes).
const CARTRIDGE_GLOBAL_CHECKSUM1: u16 = 0x014E;
const CARTRIDGE_GLOBAL_CHECKSUM2: u16 = 0x014F;

/// Smallest image that still contains a complete header.
const CARTRIDGE_MIN_SIZE: usize = 0x0150;

const ROM_BANK_SIZE: usize = 16384;
const RAM_BANK_SIZE: usize = 8192;

/// The controller type of the cartridge.
/// See https://gbdev.io/pandocs/The_Cartridge_Header.html#0147--cartridge-type
#[derive(PartialEq, Copy, Clone, Debug)]
pub enum ControllerType {
    NoMBC,
    MBC1,
    MBC3,
}

impl TryFrom<u8> for ControllerType {
    type Error = GBError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(ControllerType::NoMBC),
            0x01..=0x03 => Ok(ControllerType::MBC1),
            0x0F..=0x13 => Ok(ControllerType::MBC3),
            _ => Err(GBError::UnsupportedCartridge(value)),
        }
    }
}

impl fmt::Display for ControllerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControllerType::NoMBC => "ROM Only",
            ControllerType::MBC1 => "MBC1",
            ControllerType::MBC3 => "MBC3",
        };
        write!(f, "{name}")
    }
}

/// Contains the configuration of the cartridge. This includes the controller type,
/// ROM size, RAM size, and the number of banks.
#[derive(Copy, Clone, Debug)]
pub struct CartridgeConfig {
    pub controller: ControllerType,
    pub rom_size: usize,
    pub rom_banks: usize,
    pub ram_size: usize,
    pub ram_banks: usize,
}

impl CartridgeConfig {
    pub fn new(controller: ControllerType, rom_size: u8, ram_size: u8) -> GBResult<Self> {
        let ram_banks = match ram_size {
            0x00 | 0x01 => 0,
            0x02 => 1,
            0x03 => 4,
            0x04 => 16,
            0x05 => 8,
            value => return Err(GBError::UnsupportedRamSize(value)),
        };

        if rom_size > 0x08 {
            return Err(GBError::UnsupportedRomSize(rom_size));
        }
        let rom_size = (32 * 1024) << rom_size;

        Ok(Self {
            controller,
            rom_size,
            rom_banks: rom_size / ROM_BANK_SIZE,
            ram_size: RAM_BANK_SIZE * ram_banks,
            ram_banks,
        })
    }
}

/// Contains the cartridge header information.
/// See https://gbdev.io/pandocs/The_Cartridge_Header.html
#[derive(Clone, Debug)]
pub struct CartridgeHeader {
    pub title: String,
    pub config: CartridgeConfig,
}

impl TryFrom<&[u8]> for CartridgeHeader {
    type Error = GBError;

    fn try_from(buf: &[u8]) -> Result<Self, Self::Error> {
        if buf.len() < CARTRIDGE_MIN_SIZE {
            return Err(GBError::RomTooSmall { size: buf.len() });
        }
        let controller = ControllerType::try_from(buf[CARTRIDGE_TYPE as usize])?;
        let config = CartridgeConfig::new(
            controller,
            buf[CARTRIDGE_ROM_SIZE as usize],
            buf[CARTRIDGE_RAM_SIZE as usize],
        )?;
        let title = CartridgeHeader::parse_title(buf);
        Ok(Self { title, config })
    }
}

impl CartridgeHeader {
    /// Returns the cartridge title, which is padded with NULs up to the end of the field.
    fn parse_title(buf: &[u8]) -> String {
        let title = buf[CARTRIDGE_TITLE_BEGIN as usize..=CARTRIDGE_TITLE_END as usize]
            .iter()
            .take_while(|&&b| b != 0)
            .filter(|b| b.is_ascii_graphic() || **b == b' ')
            .map(|&b| char::from(b))
            .collect::<String>();
        match title.trim() {
            "" => "Unnamed".to_string(),
            title => title.to_string(),
        }
    }
}

impl fmt::Display for CartridgeHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, ROM: {} KiB, RAM: {} KiB)",
            self.title,
            self.config.controller,
            self.config.rom_size / 1024,
            self.config.ram_size / 1024
        )
    }
}

/// Holds the parsed header and the bank controller translating the cartridge windows.
pub struct Cartridge {
    pub header: CartridgeHeader,
    controller: BankController,
}

impl Cartridge {
    /// Reads a byte from the ROM (0x0000 - 0x7FFF) or external RAM (0xA000 - 0xBFFF) window.
    #[inline]
    pub fn read(&self, address: u16) -> u8 {
        self.controller.read(address)
    }

    /// Writes a byte to one of the cartridge windows, ROM writes are controller commands.
    #[inline]
    pub fn write(&mut self, address: u16, value: u8) {
        self.controller.write(address, value);
    }
}

impl TryFrom<Vec<u8>> for Cartridge {
    type Error = GBError;

    fn try_from(rom: Vec<u8>) -> Result<Self, Self::Error> {
        let header = CartridgeHeader::try_from(rom.as_slice())?;
        if let Err(msg) = verify_header_checksum(&rom) {
            log::warn!("{msg}");
        }
        if let Err(msg) = verify_global_checksum(&rom) {
            log::warn!("{msg}");
        }
        log::info!("Cartridge: {header}");

        let controller = BankController::new(header.config, Arc::from(rom));
        Ok(Self { header, controller })
    }
}

impl TryFrom<&Path> for Cartridge {
    type Error = GBError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        log::debug!("Loading ROM from {}", path.display());
        Cartridge::try_from(std::fs::read(path)?)
    }
}

impl fmt::Display for Cartridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header)
    }
}

/// Validates the header checksum, which covers the bytes 0x0134 - 0x014C.
fn verify_header_checksum(buf: &[u8]) -> Result<(), String> {
    let expected = buf[CARTRIDGE_HEADER_CHECKSUM as usize];
    let calculated = calculate_header_checksum(buf);
    match expected == calculated {
        true => Ok(()),
        false => Err(format!(
            "Header checksum mismatch! Expected: {expected:#04X} Got: {calculated:#04X}"
        )),
    }
}

fn calculate_header_checksum(buf: &[u8]) -> u8 {
    buf[CARTRIDGE_TITLE_BEGIN as usize..CARTRIDGE_HEADER_CHECKSUM as usize]
        .iter()
        .fold(0u8, |sum, &byte| sum.wrapping_sub(byte).wrapping_sub(1))
}

/// Validates the global checksum of the given buffer containing the whole cartridge.
fn verify_global_checksum(buf: &[u8]) -> Result<(), String> {
    let byte1 = buf[CARTRIDGE_GLOBAL_CHECKSUM1 as usize];
    let byte2 = buf[CARTRIDGE_GLOBAL_CHECKSUM2 as usize];

    let expected = (byte1 as u16) << 8 | (byte2 as u16);
    let calculated = calculate_global_checksum(buf);
    match expected == calculated {
        true => Ok(()),
        false => Err(format!(
            "Global checksum mismatch! Expected: {expected:#06X} Got: {calculated:#06X}"
        )),
    }
}

/// Calculates the global checksum by adding all bytes from the given cartridge buffer except
/// the two checksum bytes.
fn calculate_global_checksum(buf: &[u8]) -> u16 {
    buf.iter()
        .enumerate()
        .fold(0, |sum, (address, &byte)| match address {
            a if a == CARTRIDGE_GLOBAL_CHECKSUM1 as usize => sum,
            a if a == CARTRIDGE_GLOBAL_CHECKSUM2 as usize => sum,
            _ => sum.wrapping_add(byte as u16),
        })
}
