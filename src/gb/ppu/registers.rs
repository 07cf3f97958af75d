use bitflags::bitflags;

bitflags! {
    /// Represents PPU_LCDC at 0xFF40
    #[derive(Copy, Clone, PartialEq, Debug)]
    pub struct LCDControl: u8 {
        const BG_EN    = 0b00000001; // BG & Window Enable
        const OBJ_EN   = 0b00000010; // OBJ Enable
        const OBJ_SIZE = 0b00000100; // OBJ Size
        const BG_MAP   = 0b00001000; // BG Tile Map Address
        const TILE_SEL = 0b00010000; // BG & Window Tile Data
        const WIN_EN   = 0b00100000; // Window Enable
        const WIN_MAP  = 0b01000000; // Window Tile Map Address
        const LCD_EN   = 0b10000000; // LCD Display Enable
    }

    /// Represents PPU_STAT at 0xFF41
    #[derive(Copy, Clone, PartialEq, Debug)]
    pub struct LCDState: u8 {
        const LCD_MODE1   = 0b00000001; // LCD Mode
        const LCD_MODE2   = 0b00000010; // LCD Mode
        const LYC_STAT    = 0b00000100; // LY Flag
        const H_BLANK_INT = 0b00001000; // Mode 0 H-Blank Interrupt
        const V_BLANK_INT = 0b00010000; // Mode 1 V-Blank Interrupt
        const OAM_INT     = 0b00100000; // Mode 2 OAM Interrupt
        const LY_INT      = 0b01000000; // LY Interrupt
    }
}

impl LCDControl {
    /// Returns the base address of the background tile map.
    #[inline]
    pub const fn bg_tile_map(&self) -> u16 {
        match self.contains(LCDControl::BG_MAP) {
            true => 0x9C00,
            false => 0x9800,
        }
    }

    /// Returns the base address of the window tile map.
    #[inline]
    pub const fn window_tile_map(&self) -> u16 {
        match self.contains(LCDControl::WIN_MAP) {
            true => 0x9C00,
            false => 0x9800,
        }
    }

    /// Returns the address of the given background/window tile.
    /// With TILE_SEL cleared tiles are addressed signed relative to 0x9000.
    #[inline]
    pub const fn tile_address(&self, index: u8) -> u16 {
        match self.contains(LCDControl::TILE_SEL) {
            true => 0x8000 + 16 * index as u16,
            false => 0x9000u16.wrapping_add_signed(16 * index as i8 as i16),
        }
    }

    /// Returns the sprite height in pixels.
    #[inline]
    pub const fn sprite_height(&self) -> i16 {
        match self.contains(LCDControl::OBJ_SIZE) {
            true => 16,
            false => 8,
        }
    }
}

impl LCDState {
    /// Returns the `LCDMode` based on the first two bits of PPU_STAT.
    #[inline]
    pub fn mode(&self) -> LCDMode {
        LCDMode::from(self.bits())
    }

    /// Sets the first two bits of PPU_STAT to the given `LCDMode`.
    #[inline]
    pub fn set_mode(&mut self, mode: LCDMode) {
        *self = LCDState::from_bits_retain((self.bits() & 0b11111100) | mode as u8);
    }
}

/// Represents the first two bits in LCDState for convenience.
#[derive(Copy, Clone, PartialEq, Debug)]
#[repr(u8)]
pub enum LCDMode {
    HBlank = 0b00,
    VBlank = 0b01,
    OAMSearch = 0b10,
    PixelTransfer = 0b11,
}

impl From<u8> for LCDMode {
    #[inline]
    fn from(value: u8) -> Self {
        match value & 0b11 {
            0b00 => LCDMode::HBlank,
            0b01 => LCDMode::VBlank,
            0b10 => LCDMode::OAMSearch,
            _ => LCDMode::PixelTransfer,
        }
    }
}
