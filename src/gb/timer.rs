use crate::gb::bus::{InterruptRegister, MemoryBus};
use crate::gb::constants::{TIMER_COUNTER, TIMER_CTRL, TIMER_DIVIDER, TIMER_MODULO};
use bitflags::bitflags;

/// DIV is incremented at 16384 Hz.
const DIVIDER_PERIOD: u32 = 256;

bitflags! {
    /// Represents TAC at 0xFF07
    #[derive(Copy, Clone, PartialEq, Debug)]
    pub struct TimerControl: u8 {
        const SPEED1  = 0b00000001;
        const SPEED2  = 0b00000010;
        const RUNNING = 0b00000100;
    }
}

impl TimerControl {
    /// Returns the amount of cycles per TIMA increment.
    #[inline]
    pub const fn period(&self) -> u32 {
        match self.bits() & 0b11 {
            0b00 => 1024, // 4096 Hz
            0b01 => 16,   // 262144 Hz
            0b10 => 64,   // 65536 Hz
            _ => 256,     // 16384 Hz
        }
    }
}

/// System Timer, counts up at configurable frequency.
/// The counter values live in the I/O registers, only the cycle accumulators are kept here.
#[derive(Default)]
pub struct Timer {
    div_cycles: u32,
    tima_cycles: u32,
}

impl Timer {
    pub fn step(&mut self, bus: &mut MemoryBus, cycles: u32) {
        self.div_cycles += cycles;
        while self.div_cycles >= DIVIDER_PERIOD {
            self.div_cycles -= DIVIDER_PERIOD;
            let divider = bus.register(TIMER_DIVIDER);
            bus.set_register(TIMER_DIVIDER, divider.wrapping_add(1));
        }

        let ctrl = TimerControl::from_bits_truncate(bus.register(TIMER_CTRL));
        if !ctrl.contains(TimerControl::RUNNING) {
            return;
        }

        self.tima_cycles += cycles;
        let period = ctrl.period();
        while self.tima_cycles >= period {
            self.tima_cycles -= period;

            let (counter, overflow) = bus.register(TIMER_COUNTER).overflowing_add(1);
            if overflow {
                // Reset counter to modulo and request interrupt if overflow did happen
                bus.set_register(TIMER_COUNTER, bus.register(TIMER_MODULO));
                bus.request_interrupt(InterruptRegister::TIMER);
            } else {
                bus.set_register(TIMER_COUNTER, counter);
            }
        }
    }
}
