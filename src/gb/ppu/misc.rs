use bitflags::bitflags;

/// Defines a Palette to colorize a Pixel
/// used by bgp, obp0 and obp1 registers.
#[derive(Default, Copy, Clone)]
pub struct Palette {
    map: [ColoredPixel; 4],
}

impl Palette {
    #[inline]
    pub fn colorize(&self, pixel: Pixel) -> ColoredPixel {
        self.map[pixel as usize]
    }
}

impl From<u8> for Palette {
    /// Every two bits in the palette data byte represent a colour.
    /// Bits 7-6 maps to colour id 11, bits 5-4 map to colour id 10,
    /// bits 3-2 map to colour id 01 and bits 1-0 map to colour id 00
    #[inline]
    fn from(value: u8) -> Self {
        Self {
            map: [
                ColoredPixel::from(value),
                ColoredPixel::from(value >> 2),
                ColoredPixel::from(value >> 4),
                ColoredPixel::from(value >> 6),
            ],
        }
    }
}

/// Represents an non-colorized Pixel.
#[derive(Default, Copy, Clone, PartialEq, Debug)]
#[repr(u8)]
pub enum Pixel {
    #[default]
    Zero,
    One,
    Two,
    Three,
}

impl Pixel {
    /// Decodes the pixel at the given bit from the two bit-planes of a tile row.
    #[inline]
    pub fn from_planes(low: u8, high: u8, bit: u8) -> Self {
        Pixel::from((((high >> bit) & 1) << 1) | ((low >> bit) & 1))
    }
}

impl From<u8> for Pixel {
    #[inline]
    fn from(value: u8) -> Self {
        match value & 0b11 {
            0b00 => Pixel::Zero,
            0b01 => Pixel::One,
            0b10 => Pixel::Two,
            _ => Pixel::Three,
        }
    }
}

/// Defines a colorized Pixel created from a non-colorized Pixel with a Palette.
#[derive(Default, Copy, Clone, PartialEq, Debug)]
pub enum ColoredPixel {
    #[default]
    White,
    LightGrey,
    DarkGrey,
    Black,
}

impl ColoredPixel {
    /// Returns the RGBA value used to present this shade.
    #[inline]
    pub const fn rgba(self) -> [u8; 4] {
        match self {
            ColoredPixel::White => [224, 248, 208, 255],
            ColoredPixel::LightGrey => [136, 192, 112, 255],
            ColoredPixel::DarkGrey => [52, 104, 86, 255],
            ColoredPixel::Black => [8, 24, 32, 255],
        }
    }
}

impl From<u8> for ColoredPixel {
    #[inline]
    fn from(value: u8) -> Self {
        match value & 0b11 {
            0b00 => ColoredPixel::White,
            0b01 => ColoredPixel::LightGrey,
            0b10 => ColoredPixel::DarkGrey,
            _ => ColoredPixel::Black,
        }
    }
}

bitflags! {
    /// Represents the attribute byte of an OAM entry.
    #[derive(Copy, Clone, PartialEq, Debug)]
    pub struct SpriteAttributes: u8 {
        const DMG_PALETTE = 0b00010000; // OBP1 if set, OBP0 otherwise
        const X_FLIP      = 0b00100000;
        const Y_FLIP      = 0b01000000;
        const PRIORITY    = 0b10000000; // BG and Window colors 1-3 are drawn over the sprite
    }
}

/// A decoded OAM entry, coordinates are already converted to screen space.
#[derive(Copy, Clone, Debug)]
pub struct Sprite {
    pub y: i16,
    pub x: i16,
    pub tile_index: u8,
    pub attributes: SpriteAttributes,
}

impl From<[u8; 4]> for Sprite {
    #[inline]
    fn from([y, x, tile_index, attributes]: [u8; 4]) -> Self {
        Self {
            y: y as i16 - 16,
            x: x as i16 - 8,
            tile_index,
            attributes: SpriteAttributes::from_bits_truncate(attributes),
        }
    }
}
