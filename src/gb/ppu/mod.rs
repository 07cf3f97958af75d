pub mod buffer;
pub mod misc;
pub mod registers;

use crate::gb::bus::{InterruptRegister, MemoryBus};
use crate::gb::constants::*;
use crate::gb::display::Display;
use crate::gb::ppu::buffer::FrameBuffer;
use crate::gb::ppu::misc::{ColoredPixel, Palette, Pixel, Sprite, SpriteAttributes};
use crate::gb::ppu::registers::{LCDControl, LCDMode, LCDState};
use crate::gb::{AddressSpace, SCREEN_HEIGHT, SCREEN_WIDTH};

const OAM_SEARCH_CYCLES: u32 = 80;
const PIXEL_TRANSFER_CYCLES: u32 = 166;
const H_BLANK_CYCLES: u32 = 210;
const SCAN_LINE_CYCLES: u32 = 456;

/// First and last scan line of the vertical blank period.
const V_BLANK_SCAN_LINE_MIN: u8 = SCREEN_HEIGHT as u8;
const V_BLANK_SCAN_LINE_MAX: u8 = 153;

/// Number of tiles fetched per scan line, one more than visible to cover the fine scroll.
const TILES_PER_LINE: usize = 21;
const SPRITE_COUNT: u16 = 40;

/// Pixel Processing Unit
pub struct PPU {
    mode: LCDMode,
    internal_cycles: u32,
    bg_window_priority: [bool; SCREEN_WIDTH], // Non-zero BG/Window color index per X
    buffer: FrameBuffer,
}

impl Default for PPU {
    fn default() -> Self {
        Self {
            mode: LCDMode::OAMSearch,
            internal_cycles: 0,
            bg_window_priority: [false; SCREEN_WIDTH],
            buffer: FrameBuffer::default(),
        }
    }
}

impl PPU {
    /// Steps the PPU for a given number of cycles.
    /// At most one mode transition happens per call, surplus cycles carry over.
    pub fn step<D: Display>(&mut self, bus: &mut MemoryBus, display: &mut D, cycles: u32) {
        self.internal_cycles += cycles;

        match self.mode {
            LCDMode::OAMSearch if self.internal_cycles >= OAM_SEARCH_CYCLES => {
                self.internal_cycles -= OAM_SEARCH_CYCLES;
                self.change_mode(bus, LCDMode::PixelTransfer);
            }
            LCDMode::PixelTransfer if self.internal_cycles >= PIXEL_TRANSFER_CYCLES => {
                self.internal_cycles -= PIXEL_TRANSFER_CYCLES;
                self.handle_pixel_transfer(bus);
            }
            LCDMode::HBlank if self.internal_cycles >= H_BLANK_CYCLES => {
                self.internal_cycles -= H_BLANK_CYCLES;
                self.handle_hblank(bus);
            }
            LCDMode::VBlank if self.internal_cycles >= SCAN_LINE_CYCLES => {
                self.internal_cycles -= SCAN_LINE_CYCLES;
                self.handle_vblank(bus, display);
            }
            _ => {}
        }
    }

    /// Rewrites the mode bits of STAT and requests a STAT interrupt
    /// if the mode changed and the corresponding source is enabled.
    fn change_mode(&mut self, bus: &mut MemoryBus, mode: LCDMode) {
        let mut stat = LCDState::from_bits_retain(bus.register(PPU_STAT));
        let changed = stat.mode() != mode;
        stat.set_mode(mode);
        bus.set_register(PPU_STAT, stat.bits());
        self.mode = mode;

        let source = match mode {
            LCDMode::HBlank => LCDState::H_BLANK_INT,
            LCDMode::VBlank => LCDState::V_BLANK_INT,
            LCDMode::OAMSearch => LCDState::OAM_INT,
            LCDMode::PixelTransfer => return,
        };
        if changed && stat.contains(source) {
            bus.request_interrupt(InterruptRegister::STAT);
        }
    }

    /// Updates the coincidence flag and requests STAT interrupts before entering HBlank.
    fn handle_pixel_transfer(&mut self, bus: &mut MemoryBus) {
        let mut stat = LCDState::from_bits_retain(bus.register(PPU_STAT));
        let coincidence = bus.register(PPU_LYC) == bus.register(PPU_LY);

        if stat.contains(LCDState::H_BLANK_INT)
            || (coincidence && stat.contains(LCDState::LY_INT))
        {
            bus.request_interrupt(InterruptRegister::STAT);
        }

        stat.set(LCDState::LYC_STAT, coincidence);
        bus.set_register(PPU_STAT, stat.bits());
        self.change_mode(bus, LCDMode::HBlank);
    }

    /// Draws the completed scan line and either starts the next one or enters VBlank.
    fn handle_hblank(&mut self, bus: &mut MemoryBus) {
        let ly = bus.register(PPU_LY);
        self.draw_line(bus, ly);

        let ly = ly.wrapping_add(1);
        bus.set_register(PPU_LY, ly);
        if ly == V_BLANK_SCAN_LINE_MIN {
            self.change_mode(bus, LCDMode::VBlank);
            bus.request_interrupt(InterruptRegister::VBLANK);
        } else {
            self.change_mode(bus, LCDMode::OAMSearch);
        }
    }

    /// Counts the VBlank lines, the finished frame is presented when LY wraps around.
    fn handle_vblank<D: Display>(&mut self, bus: &mut MemoryBus, display: &mut D) {
        let ly = bus.register(PPU_LY).wrapping_add(1);
        if ly > V_BLANK_SCAN_LINE_MAX {
            display.present(&self.buffer);
            bus.set_register(PPU_LY, 0);
            self.change_mode(bus, LCDMode::OAMSearch);
        } else {
            bus.set_register(PPU_LY, ly);
        }
    }

    /// Draws the given scan line into the frame buffer.
    fn draw_line(&mut self, bus: &mut MemoryBus, ly: u8) {
        let lcdc = LCDControl::from_bits_retain(bus.register(PPU_LCDC));
        self.bg_window_priority = [false; SCREEN_WIDTH];

        if lcdc.contains(LCDControl::BG_EN) {
            self.draw_background(bus, lcdc, ly);
            if lcdc.contains(LCDControl::WIN_EN) && bus.register(PPU_WY) <= ly {
                self.draw_window(bus, lcdc, ly);
            }
        } else {
            for x in 0..SCREEN_WIDTH {
                self.buffer
                    .write_pixel(x, ly as usize, ColoredPixel::White.rgba());
            }
        }

        if lcdc.contains(LCDControl::OBJ_EN) {
            self.draw_sprites(bus, lcdc, ly);
        }
    }

    /// Draws the background on the current scan line.
    fn draw_background(&mut self, bus: &mut MemoryBus, lcdc: LCDControl, ly: u8) {
        let scx = bus.register(PPU_SCX);
        let y = ly.wrapping_add(bus.register(PPU_SCY));
        let row_address = lcdc.bg_tile_map() + 32 * (y / 8) as u16;
        let first_tile = (scx / 8) as usize;
        let fine_x = (scx % 8) as i32;

        for tile in 0..TILES_PER_LINE {
            let column = ((first_tile + tile) % 32) as u16;
            let index = bus.read(row_address + column);
            let x = 8 * tile as i32 - fine_x;
            self.draw_tile_row(bus, lcdc, index, y % 8, x, ly);
        }
    }

    /// Draws the window on the current scan line, overwriting the background.
    fn draw_window(&mut self, bus: &mut MemoryBus, lcdc: LCDControl, ly: u8) {
        let y = ly - bus.register(PPU_WY);
        let row_address = lcdc.window_tile_map() + 32 * (y / 8) as u16;
        let window_x = bus.register(PPU_WX) as i32 - 7;

        for tile in 0..TILES_PER_LINE {
            let index = bus.read(row_address + tile as u16);
            let x = 8 * tile as i32 + window_x;
            self.draw_tile_row(bus, lcdc, index, y % 8, x, ly);
        }
    }

    /// Draws one 8 pixel row of a background or window tile starting at screen position `x`.
    fn draw_tile_row(
        &mut self,
        bus: &mut MemoryBus,
        lcdc: LCDControl,
        index: u8,
        line: u8,
        x: i32,
        ly: u8,
    ) {
        let palette = Palette::from(bus.register(PPU_BGP));
        let address = lcdc.tile_address(index) + 2 * line as u16;
        let low = bus.read(address);
        let high = bus.read(address + 1);

        for pixel_x in 0..8 {
            let target_x = x + pixel_x;
            if !(0..SCREEN_WIDTH as i32).contains(&target_x) {
                continue;
            }
            let pixel = Pixel::from_planes(low, high, 7 - pixel_x as u8);
            let target_x = target_x as usize;
            self.bg_window_priority[target_x] = pixel != Pixel::Zero;
            self.buffer
                .write_pixel(target_x, ly as usize, palette.colorize(pixel).rgba());
        }
    }

    /// Draws the sprites on the current scan line.
    /// Sprites with a lower OAM index are drawn on top.
    fn draw_sprites(&mut self, bus: &mut MemoryBus, lcdc: LCDControl, ly: u8) {
        let height = lcdc.sprite_height();
        let obp0 = Palette::from(bus.register(PPU_OBP0));
        let obp1 = Palette::from(bus.register(PPU_OBP1));

        for i in (0..SPRITE_COUNT).rev() {
            let base = OAM_BEGIN + 4 * i;
            let sprite = Sprite::from([
                bus.read(base),
                bus.read(base + 1),
                bus.read(base + 2),
                bus.read(base + 3),
            ]);

            let mut row = ly as i16 - sprite.y;
            if !(0..height).contains(&row) {
                continue;
            }
            if sprite.attributes.contains(SpriteAttributes::Y_FLIP) {
                row = height - 1 - row;
            }

            // Bit 0 of the tile index is ignored for 8x16 sprites
            let tile_index = match height {
                16 => sprite.tile_index & 0xFE,
                _ => sprite.tile_index,
            };
            let address = VRAM_BEGIN + 16 * tile_index as u16 + 2 * row as u16;
            let low = bus.read(address);
            let high = bus.read(address + 1);

            let palette = match sprite.attributes.contains(SpriteAttributes::DMG_PALETTE) {
                true => &obp1,
                false => &obp0,
            };

            for pixel_x in 0..8u8 {
                let bit = match sprite.attributes.contains(SpriteAttributes::X_FLIP) {
                    true => pixel_x,
                    false => 7 - pixel_x,
                };
                let pixel = Pixel::from_planes(low, high, bit);
                let target_x = sprite.x + pixel_x as i16;
                if pixel == Pixel::Zero || !(0..SCREEN_WIDTH as i16).contains(&target_x) {
                    continue;
                }

                let target_x = target_x as usize;
                if sprite.attributes.contains(SpriteAttributes::PRIORITY)
                    && self.bg_window_priority[target_x]
                {
                    continue;
                }
                self.buffer
                    .write_pixel(target_x, ly as usize, palette.colorize(pixel).rgba());
            }
        }
    }
}
