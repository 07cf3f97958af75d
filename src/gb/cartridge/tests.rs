use crate::gb::GBError;
use crate::gb::cartridge::{
    CARTRIDGE_GLOBAL_CHECKSUM1, CARTRIDGE_GLOBAL_CHECKSUM2, CARTRIDGE_HEADER_CHECKSUM,
    CARTRIDGE_TITLE_BEGIN, Cartridge, CartridgeConfig, CartridgeHeader, ControllerType,
    calculate_global_checksum, calculate_header_checksum, verify_global_checksum,
    verify_header_checksum,
};
use crate::gb::tests::rom_image;

#[test]
fn test_calculate_global_checksum() {
    let buf = (0..CARTRIDGE_GLOBAL_CHECKSUM2)
        .map(|i| i as u8)
        .collect::<Vec<u8>>();
    let checksum = calculate_global_checksum(&buf);
    assert_eq!(checksum, 0x8B3B);
}

#[test]
fn test_verify_global_checksum() {
    let mut buf = (0..=CARTRIDGE_GLOBAL_CHECKSUM2)
        .map(|i| i as u8)
        .collect::<Vec<u8>>();
    buf[CARTRIDGE_GLOBAL_CHECKSUM1 as usize] = 0x8B;
    buf[CARTRIDGE_GLOBAL_CHECKSUM2 as usize] = 0x3B;
    assert!(verify_global_checksum(&buf).is_ok());

    buf[0x00] = 0xFF;
    assert!(verify_global_checksum(&buf).is_err());
}

#[test]
fn test_header_checksum() {
    let mut buf = vec![0u8; 0x150];
    assert_eq!(calculate_header_checksum(&buf), 0xE7, "25 bytes of 0 yield -25");

    buf[CARTRIDGE_TITLE_BEGIN as usize] = 0x01;
    assert_eq!(calculate_header_checksum(&buf), 0xE6);

    buf[CARTRIDGE_HEADER_CHECKSUM as usize] = 0xE6;
    assert!(verify_header_checksum(&buf).is_ok());
}

#[test]
fn test_cartridge_config() {
    let config = CartridgeConfig::new(ControllerType::MBC1, 0x02, 0x03).unwrap();
    assert_eq!(config.controller, ControllerType::MBC1);
    assert_eq!(config.rom_size, 131072);
    assert_eq!(config.rom_banks, 8);
    assert_eq!(config.ram_size, 32768);
    assert_eq!(config.ram_banks, 4);

    let config = CartridgeConfig::new(ControllerType::MBC3, 0x00, 0x01).unwrap();
    assert_eq!(config.rom_banks, 2);
    assert_eq!(config.ram_size, 0);

    let expected = [(0x00, 0), (0x02, 8192), (0x03, 32768), (0x04, 131072), (0x05, 65536)];
    for (code, size) in expected {
        let config = CartridgeConfig::new(ControllerType::MBC1, 0x00, code).unwrap();
        assert_eq!(config.ram_size, size, "RAM size code {code:#04x}");
    }
}

#[test]
fn test_cartridge_config_unsupported() {
    assert!(matches!(
        CartridgeConfig::new(ControllerType::MBC1, 0x00, 0x06),
        Err(GBError::UnsupportedRamSize(0x06))
    ));
    assert!(matches!(
        CartridgeConfig::new(ControllerType::MBC1, 0x09, 0x00),
        Err(GBError::UnsupportedRomSize(0x09))
    ));
}

#[test]
fn test_controller_type() {
    assert_eq!(ControllerType::try_from(0x00).unwrap(), ControllerType::NoMBC);
    for code in 0x01..=0x03 {
        assert_eq!(ControllerType::try_from(code).unwrap(), ControllerType::MBC1);
    }
    for code in 0x0F..=0x13 {
        assert_eq!(ControllerType::try_from(code).unwrap(), ControllerType::MBC3);
    }
    for code in [0x05, 0x08, 0x19, 0xFF] {
        assert!(matches!(
            ControllerType::try_from(code),
            Err(GBError::UnsupportedCartridge(c)) if c == code
        ));
    }
}

#[test]
fn test_parse_header() {
    let rom = rom_image(0x13, 0x01, 0x03);
    let header = CartridgeHeader::try_from(rom.as_slice()).unwrap();
    assert_eq!(header.title, "TESTROM");
    assert_eq!(header.config.controller, ControllerType::MBC3);
    assert_eq!(header.config.rom_banks, 4);
    assert_eq!(header.config.ram_banks, 4);
    assert_eq!(header.to_string(), "TESTROM (MBC3, ROM: 64 KiB, RAM: 32 KiB)");
}

#[test]
fn test_parse_untitled_header() {
    let mut rom = rom_image(0x00, 0x00, 0x00);
    rom[CARTRIDGE_TITLE_BEGIN as usize..CARTRIDGE_TITLE_BEGIN as usize + 16].fill(0);
    let header = CartridgeHeader::try_from(rom.as_slice()).unwrap();
    assert_eq!(header.title, "Unnamed");
}

#[test]
fn test_load_rejects_malformed_rom() {
    assert!(matches!(
        Cartridge::try_from(vec![0u8; 0x14F]),
        Err(GBError::RomTooSmall { size: 0x14F })
    ));
    assert!(matches!(
        Cartridge::try_from(rom_image(0x05, 0x00, 0x00)),
        Err(GBError::UnsupportedCartridge(0x05))
    ));
}

#[test]
fn test_load_checksum_mismatch_is_accepted() {
    let mut rom = rom_image(0x00, 0x00, 0x00);
    rom[CARTRIDGE_HEADER_CHECKSUM as usize] ^= 0xFF;
    rom[CARTRIDGE_GLOBAL_CHECKSUM1 as usize] ^= 0xFF;
    assert!(Cartridge::try_from(rom).is_ok());
}

#[test]
fn test_cartridge_dispatch() {
    let mut rom = rom_image(0x01, 0x01, 0x02);
    rom[0x4000] = 0x11;
    rom[0x8000] = 0x22;
    let mut cartridge = Cartridge::try_from(rom).unwrap();

    assert_eq!(cartridge.read(0x4000), 0x11);
    cartridge.write(0x2000, 0x02);
    assert_eq!(cartridge.read(0x4000), 0x22);

    assert_eq!(cartridge.read(0xA000), 0xFF, "RAM is disabled after load");
    cartridge.write(0x0000, 0x0A);
    cartridge.write(0xA000, 0x33);
    assert_eq!(cartridge.read(0xA000), 0x33);
}

#[test]
fn test_no_mbc_ignores_writes() {
    let mut rom = rom_image(0x00, 0x00, 0x00);
    rom[0x4000] = 0x11;
    let mut cartridge = Cartridge::try_from(rom).unwrap();

    cartridge.write(0x2000, 0x02);
    cartridge.write(0x4000, 0xAB);
    assert_eq!(cartridge.read(0x4000), 0x11);
    cartridge.write(0xA000, 0x42);
    assert_eq!(cartridge.read(0xA000), 0xFF);
}
