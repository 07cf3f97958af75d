use crate::gb::bus::{InterruptRegister, MemoryBus};
use crate::gb::constants::JOYPAD;
use crate::gb::utils::{bit_at, set_bit};

/// Snapshot of all pressed keys.
#[derive(Copy, Clone, Default, Debug, PartialEq)]
pub struct JoypadInput {
    pub a: bool,
    pub b: bool,
    pub select: bool,
    pub start: bool,
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl JoypadInput {
    /// No key pressed.
    pub const NONE: JoypadInput = JoypadInput {
        a: false,
        b: false,
        select: false,
        start: false,
        up: false,
        down: false,
        left: false,
        right: false,
    };
}

/// Represents Joypad at register 0xFF00
/// The eight Game Boy action/direction buttons are arranged as a 2x4 matrix.
/// Select either action or direction buttons by writing to this register,
/// then read out the bits 0-3. The lower nibble is Read-only.
/// Note that, rather unconventionally for the Game Boy,
/// a button being pressed is seen as the corresponding bit being 0, not 1.
#[derive(Copy, Clone)]
pub struct Joypad {
    previous: u8, // Lower nibble written during the last update
}

impl Default for Joypad {
    fn default() -> Self {
        Self { previous: 0b1111 }
    }
}

impl Joypad {
    /// Recomputes the lower nibble of JOYP from the given key snapshot and the selection bits.
    /// Requests a Joypad interrupt if any of the bits went from high to low.
    pub fn update(&mut self, bus: &mut MemoryBus, input: JoypadInput) {
        let joyp = bus.register(JOYPAD);
        let mut pressed = [false; 4];

        // Bit 5 selects the action keys
        if !bit_at(joyp, 5) {
            pressed[0] |= input.a;
            pressed[1] |= input.b;
            pressed[2] |= input.select;
            pressed[3] |= input.start;
        }
        // Bit 4 selects the direction keys
        if !bit_at(joyp, 4) {
            pressed[0] |= input.right;
            pressed[1] |= input.left;
            pressed[2] |= input.up;
            pressed[3] |= input.down;
        }

        let lower = pressed
            .iter()
            .enumerate()
            .fold(0b1111, |value, (bit, &down)| set_bit(value, bit as u8, !down));

        if self.previous & !lower != 0 {
            bus.request_interrupt(InterruptRegister::JOYPAD);
        }
        self.previous = lower;
        bus.set_register(JOYPAD, (joyp & 0b1111_0000) | lower);
    }
}
