use crate::gb::AddressSpace;
use crate::gb::bus::InterruptRegister;
use crate::gb::constants::{INTERRUPT_ENABLE, INTERRUPT_FLAG};
use crate::gb::cpu::{CPU, ImeState};

const VBLANK_IRQ_ADDRESS: u16 = 0x40;
const LCD_IRQ_ADDRESS: u16 = 0x48;
const TIMER_IRQ_ADDRESS: u16 = 0x50;
const SERIAL_IRQ_ADDRESS: u16 = 0x58;
const JOYPAD_IRQ_ADDRESS: u16 = 0x60;

/// Handles pending interrupt requests before the next fetch.
/// At most one interrupt is serviced per call, returns the cycles spent dispatching it.
pub fn handle<T: AddressSpace>(cpu: &mut CPU, bus: &mut T) -> u32 {
    let enabled = InterruptRegister::from_bits_truncate(bus.read(INTERRUPT_ENABLE));
    let mut flags = InterruptRegister::from_bits_truncate(bus.read(INTERRUPT_FLAG));
    let pending = enabled & flags;

    // CPU is woken up from HALT by any pending interrupt, even with IME cleared
    if !pending.is_empty() {
        cpu.is_halted = false;
    }

    match cpu.ime {
        ImeState::Disabled => return 0,
        ImeState::Pending => {
            cpu.ime = ImeState::Enabled;
            return 0;
        }
        ImeState::Enabled => {}
    }

    let Some(irq) = pending.highest_prio() else {
        return 0;
    };

    flags.remove(irq);
    bus.write(INTERRUPT_FLAG, flags.bits());
    cpu.ime = ImeState::Disabled;
    cpu.push(cpu.r.pc, bus);
    cpu.r.pc = vector(irq);
    cpu.interrupt_cycles
}

/// Returns the fixed service routine address of the given interrupt.
#[inline]
fn vector(irq: InterruptRegister) -> u16 {
    match irq {
        InterruptRegister::VBLANK => VBLANK_IRQ_ADDRESS,
        InterruptRegister::STAT => LCD_IRQ_ADDRESS,
        InterruptRegister::TIMER => TIMER_IRQ_ADDRESS,
        InterruptRegister::SERIAL => SERIAL_IRQ_ADDRESS,
        _ => JOYPAD_IRQ_ADDRESS,
    }
}
