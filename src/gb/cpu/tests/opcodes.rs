use crate::gb::cpu::instruction::{CB_OPCODES, Instruction, OPCODE_PREFIX, OPCODES, Operand};

/// Base cycles per opcode, conditional instructions list the not-taken cost.
#[rustfmt::skip]
const CYCLES: [u32; 256] = [
     4, 12,  8,  8,  4,  4,  8,  4, 20,  8,  8,  8,  4,  4,  8,  4, // 0x00
     4, 12,  8,  8,  4,  4,  8,  4, 12,  8,  8,  8,  4,  4,  8,  4, // 0x10
     8, 12,  8,  8,  4,  4,  8,  4,  8,  8,  8,  8,  4,  4,  8,  4, // 0x20
     8, 12,  8,  8, 12, 12, 12,  4,  8,  8,  8,  8,  4,  4,  8,  4, // 0x30
     4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,  4,  8,  4, // 0x40
     4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,  4,  8,  4, // 0x50
     4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,  4,  8,  4, // 0x60
     8,  8,  8,  8,  8,  8,  4,  8,  4,  4,  4,  4,  4,  4,  8,  4, // 0x70
     4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,  4,  8,  4, // 0x80
     4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,  4,  8,  4, // 0x90
     4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,  4,  8,  4, // 0xA0
     4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,  4,  8,  4, // 0xB0
     8, 12, 12, 16, 12, 16,  8, 16,  8, 16, 12,  0, 12, 24,  8, 16, // 0xC0
     8, 12, 12,  0, 12, 16,  8, 16,  8, 16, 12,  0, 12,  0,  8, 16, // 0xD0
    12, 12,  8,  0,  0, 16,  8, 16, 16,  4, 16,  0,  0,  0,  8, 16, // 0xE0
    12, 12,  8,  4,  0, 16,  8, 16, 12,  8, 16,  4,  0,  0,  8, 16, // 0xF0
];

const ILLEGAL: [u8; 11] = [
    0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD,
];

#[test]
fn test_opcode_cycles() {
    for (code, opcode) in OPCODES.iter().enumerate() {
        assert_eq!(
            opcode.cycles, CYCLES[code],
            "{code:#04x} ({opcode}) should take {} cycles",
            CYCLES[code]
        );
    }
}

#[test]
fn test_prefixed_opcode_cycles() {
    for (code, opcode) in CB_OPCODES.iter().enumerate() {
        let expected = match (code & 0b111, code >> 6) {
            (6, 1) => 12,
            (6, _) => 16,
            _ => 8,
        };
        assert_eq!(opcode.cycles, expected, "CB {code:#04x} ({opcode})");
        assert_eq!(opcode.operand, Operand::None);
    }
}

#[test]
fn test_prefix_opcode() {
    let opcode = OPCODES[OPCODE_PREFIX as usize];
    assert_eq!(opcode.instruction, Instruction::PREFIX);
    assert_eq!(opcode.operand, Operand::None);
    assert_eq!(opcode.cycles, 0, "Prefix is charged through the second table");
    assert!(CB_OPCODES.iter().all(|op| op.instruction != Instruction::PREFIX));
}

#[test]
fn test_illegal_opcodes() {
    for (code, opcode) in OPCODES.iter().enumerate() {
        let illegal = ILLEGAL.contains(&(code as u8));
        assert_eq!(
            opcode.instruction == Instruction::Illegal,
            illegal,
            "{code:#04x} ({opcode})"
        );
    }
    assert!(CB_OPCODES.iter().all(|op| op.instruction != Instruction::Illegal));
}

#[test]
fn test_operand_sizes() {
    let data = [
        (0x00, Operand::None),
        (0x01, Operand::Word),
        (0x06, Operand::Byte),
        (0x08, Operand::Word),
        (0x10, Operand::Byte),
        (0x18, Operand::Byte),
        (0xC3, Operand::Word),
        (0xCD, Operand::Word),
        (0xE0, Operand::Byte),
        (0xE2, Operand::None),
        (0xE8, Operand::Byte),
        (0xEA, Operand::Word),
        (0xF8, Operand::Byte),
        (0xFA, Operand::Word),
    ];
    for (code, operand) in data {
        assert_eq!(OPCODES[code].operand, operand, "{code:#04x}");
    }
}

#[test]
fn test_mnemonics() {
    let data = [
        (0x00, "NOP"),
        (0x01, "LD BC, d16"),
        (0x08, "LD (a16), SP"),
        (0x20, "JR NZ, r8"),
        (0x22, "LD (HL+), A"),
        (0x3E, "LD A, d8"),
        (0x46, "LD B, (HL)"),
        (0x86, "ADD A, (HL)"),
        (0xC0, "RET NZ"),
        (0xC3, "JP a16"),
        (0xCB, "PREFIX CB"),
        (0xCD, "CALL a16"),
        (0xE0, "LD (a8), A"),
        (0xE9, "JP HL"),
        (0xF8, "LD HL, SP+r8"),
        (0xFF, "RST 38H"),
        (0xD3, "ILLEGAL"),
    ];
    for (code, mnemonic) in data {
        assert_eq!(OPCODES[code].to_string(), mnemonic, "{code:#04x}");
    }

    let data = [
        (0x00, "RLC B"),
        (0x37, "SWAP A"),
        (0x46, "BIT 0, (HL)"),
        (0x7C, "BIT 7, H"),
        (0xBE, "RES 7, (HL)"),
        (0xC7, "SET 0, A"),
    ];
    for (code, mnemonic) in data {
        assert_eq!(CB_OPCODES[code].to_string(), mnemonic, "CB {code:#04x}");
    }
}
