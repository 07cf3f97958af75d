mod opcodes;

use crate::gb::cpu::CPU;
use crate::gb::cpu::registers::FlagsRegister;

/// Returns a CPU with cleared accumulator and flags, starting at address 0x0000.
pub fn setup_cpu() -> CPU {
    let mut cpu = CPU::default();
    cpu.r.a = 0x00;
    cpu.r.f = FlagsRegister::empty();
    cpu.r.pc = 0x0000;
    cpu
}

/// Asserts the state of all four flags, in the order Z, N, H, C.
pub fn assert_flags(r: FlagsRegister, zero: bool, negative: bool, half_carry: bool, carry: bool) {
    let expected = [
        (FlagsRegister::ZERO, zero, "zero"),
        (FlagsRegister::SUBTRACTION, negative, "negative"),
        (FlagsRegister::HALF_CARRY, half_carry, "half carry"),
        (FlagsRegister::CARRY, carry, "carry"),
    ];
    for (flag, state, name) in expected {
        assert_eq!(r.contains(flag), state, "Unexpected {name} flag in {r:?}");
    }
}

#[test]
fn test_post_boot_registers() {
    let cpu = CPU::default();
    assert_eq!(cpu.r.get_af(), 0x01B0);
    assert_eq!(cpu.r.get_bc(), 0x0013);
    assert_eq!(cpu.r.get_de(), 0x00D8);
    assert_eq!(cpu.r.get_hl(), 0x014D);
    assert_eq!(cpu.r.sp, 0xFFFE);
    assert_eq!(cpu.r.pc, 0x0100);
    assert!(!cpu.is_halted);
}

#[test]
fn test_af_register() {
    let mut cpu = CPU::default();
    cpu.r.set_af(0b1101_1111_1111_1111);
    assert_eq!(cpu.r.a, 0b1101_1111);
    assert_eq!(cpu.r.f.bits(), 0b1111_0000, "Lower nibble of F is always zero");
    assert_eq!(cpu.r.get_af(), 0b1101_1111_1111_0000);
}

#[test]
fn test_bc_register() {
    let mut cpu = CPU::default();
    cpu.r.set_bc(0b0110_1111_1111_1011);
    assert_eq!(cpu.r.b, 0b0110_1111);
    assert_eq!(cpu.r.c, 0b1111_1011);
    assert_eq!(cpu.r.get_bc(), 0b0110_1111_1111_1011);
}

#[test]
fn test_de_register() {
    let mut cpu = CPU::default();
    cpu.r.set_de(0b0110_1101_1101_1011);
    assert_eq!(cpu.r.d, 0b0110_1101);
    assert_eq!(cpu.r.e, 0b1101_1011);
    assert_eq!(cpu.r.get_de(), 0b0110_1101_1101_1011);
}

#[test]
fn test_hl_register() {
    let mut cpu = CPU::default();
    cpu.r.set_hl(0b0110_1110_1111_1010);
    assert_eq!(cpu.r.h, 0b0110_1110);
    assert_eq!(cpu.r.l, 0b1111_1010);
    assert_eq!(cpu.r.get_hl(), 0b0110_1110_1111_1010);
}

#[test]
fn test_set_flag_preserves_others() {
    let mut cpu = setup_cpu();
    cpu.r.f = FlagsRegister::ZERO | FlagsRegister::CARRY;
    cpu.r.set_flag(FlagsRegister::HALF_CARRY, true);
    cpu.r.set_flag(FlagsRegister::CARRY, false);
    assert_flags(cpu.r.f, true, false, true, false);
}
