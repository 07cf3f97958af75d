use crate::gb::cpu::instruction::Instruction::*;
use crate::gb::cpu::ops::JumpCondition::{Always, Carry, NotCarry, NotZero, Zero};
use crate::gb::cpu::ops::Register::{A, B, C, D, E, H, L};
use crate::gb::cpu::ops::*;
use std::fmt;
use std::fmt::Formatter;

/// Selects the second opcode table for the following byte.
pub const OPCODE_PREFIX: u8 = 0xCB;

/// Base opcode table, indexed by the first instruction byte.
pub static OPCODES: [Opcode; 256] = build_table(false);

/// Table of opcodes following the 0xCB prefix.
pub static CB_OPCODES: [Opcode; 256] = build_table(true);

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Instruction {
    ADD(ByteSource),          // Add n to A
    ADDHL(WordRegister),      // Add nn to HL
    ADDSP,                    // Add signed immediate 8 bit value to Stack Pointer
    ADC(ByteSource),          // Add n + Carry flag to A
    AND(ByteSource),          // Logically AND n with A, result in A
    BIT(u8, ByteTarget),      // Test bit b in register r
    CALL(JumpCondition),      // Push address of next instruction onto stack and then jump to nn
    CCF,                      // Complement carry flag
    CP(ByteSource),           // Compare A with source
    CPL,                      // Flips all bits in A register, sets N and H flags
    DAA,                      // Decimal adjust A after a BCD addition or subtraction
    DI,                       // Disables interrupt handling
    DEC(ByteTarget),          // Decrement single byte register n
    DEC2(WordRegister),       // Decrement word register n
    EI,                       // Enables interrupt handling after the next instruction
    HALT,                     // Halts and waits for interrupt
    INC(ByteTarget),          // Increment single byte register n
    INC2(WordRegister),       // Increment word register n
    JR(JumpCondition),        // Relative jump by signed immediate
    JP(JumpCondition, JumpTarget), // Jump to address nn
    LD(Load),                 // Put value into n
    NOP,                      // No operation
    OR(ByteSource),           // Logical OR n with register A, result in A
    PREFIX,                   // Dispatches the next byte through the CB table
    PUSH(WordRegister),       // Push to the stack memory, data from the 16-bit register
    POP(WordRegister),        // Pops to the 16-bit register
    RES(u8, ByteTarget),      // Reset bit b in register r
    RET(JumpCondition),       // Pop two bytes from stack & jump to that address
    RETI,                     // Unconditional return which also enables interrupts
    RL(ByteTarget),           // Rotate n left through Carry flag
    RLA,                      // Rotate A left through carry
    RLC(ByteTarget),          // Rotate target left
    RLCA,                     // Rotate A left. Old bit 7 to Carry flag
    RR(ByteTarget),           // Rotate n right through Carry flag
    RRA,                      // Rotate A right through Carry flag
    RRC(ByteTarget),          // Rotate n right. Old bit 0 to Carry flag
    RRCA,                     // Rotate A right. Old bit 0 to Carry flag
    RST(ResetCode),           // Push present address onto stack, jump to address 0x0000 + n
    SBC(ByteSource),          // Subtract n + Carry flag from A
    SCF,                      // Set carry flag
    SET(u8, ByteTarget),      // Set bit b in register r
    SLA(ByteTarget),          // Shift n left into Carry. LSB of n set to 0
    SRA(ByteTarget),          // Shift n right into Carry. MSB doesn't change
    SRL(ByteTarget),          // Shift right into Carry, MSB set to 0
    STOP,                     // Halt CPU & LCD display until button pressed
    SUB(ByteSource),          // Subtract n from A
    SWAP(ByteTarget),         // Swap upper & lower nibbles of n
    XOR(ByteSource),          // Logical exclusive OR n with register A, result in A
    Illegal,                  // Opcode without a defined behaviour
}

/// Amount of immediate bytes following an opcode.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Operand {
    None,
    Byte,
    Word,
}

impl Operand {
    #[inline]
    pub const fn size(self) -> u16 {
        match self {
            Operand::None => 0,
            Operand::Byte => 1,
            Operand::Word => 2,
        }
    }
}

/// A single entry of the opcode tables.
/// `cycles` is the base cost, conditional instructions add the taken cost on execution.
#[derive(Copy, Clone, Debug)]
pub struct Opcode {
    pub instruction: Instruction,
    pub operand: Operand,
    pub cycles: u32,
}

impl Opcode {
    const ILLEGAL: Opcode = Opcode::new(Illegal, Operand::None, 0);

    #[inline]
    const fn new(instruction: Instruction, operand: Operand, cycles: u32) -> Self {
        Self {
            instruction,
            operand,
            cycles,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.instruction)
    }
}

const fn build_table(prefixed: bool) -> [Opcode; 256] {
    let mut table = [Opcode::ILLEGAL; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = match prefixed {
            true => decode_prefixed(i as u8),
            false => decode(i as u8),
        };
        i += 1;
    }
    table
}

/// Maps the 3-bit register index used by the opcode encoding to a target.
const fn byte_target(index: u8) -> ByteTarget {
    match index & 0b111 {
        0 => ByteTarget::R(B),
        1 => ByteTarget::R(C),
        2 => ByteTarget::R(D),
        3 => ByteTarget::R(E),
        4 => ByteTarget::R(H),
        5 => ByteTarget::R(L),
        6 => ByteTarget::I(ByteRef::R(WordRegister::HL)),
        _ => ByteTarget::R(A),
    }
}

/// Maps the 3-bit register index used by the opcode encoding to a source.
const fn byte_source(index: u8) -> ByteSource {
    match byte_target(index) {
        ByteTarget::R(reg) => ByteSource::R(reg),
        ByteTarget::I(indirect) => ByteSource::I(indirect),
    }
}

/// (HL) operands cost an extra memory access.
const fn register_cycles(index: u8, register: u32, indirect: u32) -> u32 {
    match index & 0b111 {
        6 => indirect,
        _ => register,
    }
}

const fn decode(opcode: u8) -> Opcode {
    use Operand::{Byte, None, Word};
    use WordRegister::{AF, BC, DE, HL, SP};
    let hl = ByteRef::R(HL);

    match opcode {
        0x00 => Opcode::new(NOP, None, 4),
        0x01 => Opcode::new(LD(Load::Word(BC, WordSource::D16)), Word, 12),
        0x02 => Opcode::new(LD(Load::Byte(ByteTarget::I(ByteRef::R(BC)), ByteSource::R(A))), None, 8),
        0x03 => Opcode::new(INC2(BC), None, 8),
        0x04 => Opcode::new(INC(ByteTarget::R(B)), None, 4),
        0x05 => Opcode::new(DEC(ByteTarget::R(B)), None, 4),
        0x06 => Opcode::new(LD(Load::Byte(ByteTarget::R(B), ByteSource::D8)), Byte, 8),
        0x07 => Opcode::new(RLCA, None, 4),
        0x08 => Opcode::new(LD(Load::IndirectFromSP), Word, 20),
        0x09 => Opcode::new(ADDHL(BC), None, 8),
        0x0A => Opcode::new(LD(Load::Byte(ByteTarget::R(A), ByteSource::I(ByteRef::R(BC)))), None, 8),
        0x0B => Opcode::new(DEC2(BC), None, 8),
        0x0C => Opcode::new(INC(ByteTarget::R(C)), None, 4),
        0x0D => Opcode::new(DEC(ByteTarget::R(C)), None, 4),
        0x0E => Opcode::new(LD(Load::Byte(ByteTarget::R(C), ByteSource::D8)), Byte, 8),
        0x0F => Opcode::new(RRCA, None, 4),

        0x10 => Opcode::new(STOP, Byte, 4),
        0x11 => Opcode::new(LD(Load::Word(DE, WordSource::D16)), Word, 12),
        0x12 => Opcode::new(LD(Load::Byte(ByteTarget::I(ByteRef::R(DE)), ByteSource::R(A))), None, 8),
        0x13 => Opcode::new(INC2(DE), None, 8),
        0x14 => Opcode::new(INC(ByteTarget::R(D)), None, 4),
        0x15 => Opcode::new(DEC(ByteTarget::R(D)), None, 4),
        0x16 => Opcode::new(LD(Load::Byte(ByteTarget::R(D), ByteSource::D8)), Byte, 8),
        0x17 => Opcode::new(RLA, None, 4),
        0x18 => Opcode::new(JR(Always), Byte, 12),
        0x19 => Opcode::new(ADDHL(DE), None, 8),
        0x1A => Opcode::new(LD(Load::Byte(ByteTarget::R(A), ByteSource::I(ByteRef::R(DE)))), None, 8),
        0x1B => Opcode::new(DEC2(DE), None, 8),
        0x1C => Opcode::new(INC(ByteTarget::R(E)), None, 4),
        0x1D => Opcode::new(DEC(ByteTarget::R(E)), None, 4),
        0x1E => Opcode::new(LD(Load::Byte(ByteTarget::R(E), ByteSource::D8)), Byte, 8),
        0x1F => Opcode::new(RRA, None, 4),

        0x20 => Opcode::new(JR(NotZero), Byte, 8),
        0x21 => Opcode::new(LD(Load::Word(HL, WordSource::D16)), Word, 12),
        0x22 => Opcode::new(LD(Load::Byte(ByteTarget::I(ByteRef::HLI), ByteSource::R(A))), None, 8),
        0x23 => Opcode::new(INC2(HL), None, 8),
        0x24 => Opcode::new(INC(ByteTarget::R(H)), None, 4),
        0x25 => Opcode::new(DEC(ByteTarget::R(H)), None, 4),
        0x26 => Opcode::new(LD(Load::Byte(ByteTarget::R(H), ByteSource::D8)), Byte, 8),
        0x27 => Opcode::new(DAA, None, 4),
        0x28 => Opcode::new(JR(Zero), Byte, 8),
        0x29 => Opcode::new(ADDHL(HL), None, 8),
        0x2A => Opcode::new(LD(Load::Byte(ByteTarget::R(A), ByteSource::I(ByteRef::HLI))), None, 8),
        0x2B => Opcode::new(DEC2(HL), None, 8),
        0x2C => Opcode::new(INC(ByteTarget::R(L)), None, 4),
        0x2D => Opcode::new(DEC(ByteTarget::R(L)), None, 4),
        0x2E => Opcode::new(LD(Load::Byte(ByteTarget::R(L), ByteSource::D8)), Byte, 8),
        0x2F => Opcode::new(CPL, None, 4),

        0x30 => Opcode::new(JR(NotCarry), Byte, 8),
        0x31 => Opcode::new(LD(Load::Word(SP, WordSource::D16)), Word, 12),
        0x32 => Opcode::new(LD(Load::Byte(ByteTarget::I(ByteRef::HLD), ByteSource::R(A))), None, 8),
        0x33 => Opcode::new(INC2(SP), None, 8),
        0x34 => Opcode::new(INC(ByteTarget::I(hl)), None, 12),
        0x35 => Opcode::new(DEC(ByteTarget::I(hl)), None, 12),
        0x36 => Opcode::new(LD(Load::Byte(ByteTarget::I(hl), ByteSource::D8)), Byte, 12),
        0x37 => Opcode::new(SCF, None, 4),
        0x38 => Opcode::new(JR(Carry), Byte, 8),
        0x39 => Opcode::new(ADDHL(SP), None, 8),
        0x3A => Opcode::new(LD(Load::Byte(ByteTarget::R(A), ByteSource::I(ByteRef::HLD))), None, 8),
        0x3B => Opcode::new(DEC2(SP), None, 8),
        0x3C => Opcode::new(INC(ByteTarget::R(A)), None, 4),
        0x3D => Opcode::new(DEC(ByteTarget::R(A)), None, 4),
        0x3E => Opcode::new(LD(Load::Byte(ByteTarget::R(A), ByteSource::D8)), Byte, 8),
        0x3F => Opcode::new(CCF, None, 4),

        0x76 => Opcode::new(HALT, None, 4),
        0x40..=0x7F => {
            let target = byte_target(opcode >> 3);
            let source = byte_source(opcode);
            let cycles = register_cycles(opcode, register_cycles(opcode >> 3, 4, 8), 8);
            Opcode::new(LD(Load::Byte(target, source)), None, cycles)
        }
        0x80..=0xBF => {
            let source = byte_source(opcode);
            let instruction = match (opcode >> 3) & 0b111 {
                0 => ADD(source),
                1 => ADC(source),
                2 => SUB(source),
                3 => SBC(source),
                4 => AND(source),
                5 => XOR(source),
                6 => OR(source),
                _ => CP(source),
            };
            Opcode::new(instruction, None, register_cycles(opcode, 4, 8))
        }

        0xC0 => Opcode::new(RET(NotZero), None, 8),
        0xC1 => Opcode::new(POP(BC), None, 12),
        0xC2 => Opcode::new(JP(NotZero, JumpTarget::D16), Word, 12),
        0xC3 => Opcode::new(JP(Always, JumpTarget::D16), Word, 16),
        0xC4 => Opcode::new(CALL(NotZero), Word, 12),
        0xC5 => Opcode::new(PUSH(BC), None, 16),
        0xC6 => Opcode::new(ADD(ByteSource::D8), Byte, 8),
        0xC7 => Opcode::new(RST(ResetCode::RST00), None, 16),
        0xC8 => Opcode::new(RET(Zero), None, 8),
        0xC9 => Opcode::new(RET(Always), None, 16),
        0xCA => Opcode::new(JP(Zero, JumpTarget::D16), Word, 12),
        OPCODE_PREFIX => Opcode::new(PREFIX, None, 0),
        0xCC => Opcode::new(CALL(Zero), Word, 12),
        0xCD => Opcode::new(CALL(Always), Word, 24),
        0xCE => Opcode::new(ADC(ByteSource::D8), Byte, 8),
        0xCF => Opcode::new(RST(ResetCode::RST08), None, 16),

        0xD0 => Opcode::new(RET(NotCarry), None, 8),
        0xD1 => Opcode::new(POP(DE), None, 12),
        0xD2 => Opcode::new(JP(NotCarry, JumpTarget::D16), Word, 12),
        0xD4 => Opcode::new(CALL(NotCarry), Word, 12),
        0xD5 => Opcode::new(PUSH(DE), None, 16),
        0xD6 => Opcode::new(SUB(ByteSource::D8), Byte, 8),
        0xD7 => Opcode::new(RST(ResetCode::RST10), None, 16),
        0xD8 => Opcode::new(RET(Carry), None, 8),
        0xD9 => Opcode::new(RETI, None, 16),
        0xDA => Opcode::new(JP(Carry, JumpTarget::D16), Word, 12),
        0xDC => Opcode::new(CALL(Carry), Word, 12),
        0xDE => Opcode::new(SBC(ByteSource::D8), Byte, 8),
        0xDF => Opcode::new(RST(ResetCode::RST18), None, 16),

        0xE0 => Opcode::new(LD(Load::Byte(ByteTarget::I(ByteRef::D8), ByteSource::R(A))), Byte, 12),
        0xE1 => Opcode::new(POP(HL), None, 12),
        0xE2 => Opcode::new(LD(Load::Byte(ByteTarget::I(ByteRef::C), ByteSource::R(A))), None, 8),
        0xE5 => Opcode::new(PUSH(HL), None, 16),
        0xE6 => Opcode::new(AND(ByteSource::D8), Byte, 8),
        0xE7 => Opcode::new(RST(ResetCode::RST20), None, 16),
        0xE8 => Opcode::new(ADDSP, Byte, 16),
        0xE9 => Opcode::new(JP(Always, JumpTarget::HL), None, 4),
        0xEA => Opcode::new(LD(Load::Byte(ByteTarget::I(ByteRef::D16), ByteSource::R(A))), Word, 16),
        0xEE => Opcode::new(XOR(ByteSource::D8), Byte, 8),
        0xEF => Opcode::new(RST(ResetCode::RST28), None, 16),

        0xF0 => Opcode::new(LD(Load::Byte(ByteTarget::R(A), ByteSource::I(ByteRef::D8))), Byte, 12),
        0xF1 => Opcode::new(POP(AF), None, 12),
        0xF2 => Opcode::new(LD(Load::Byte(ByteTarget::R(A), ByteSource::I(ByteRef::C))), None, 8),
        0xF3 => Opcode::new(DI, None, 4),
        0xF5 => Opcode::new(PUSH(AF), None, 16),
        0xF6 => Opcode::new(OR(ByteSource::D8), Byte, 8),
        0xF7 => Opcode::new(RST(ResetCode::RST30), None, 16),
        0xF8 => Opcode::new(LD(Load::HLFromSPi8), Byte, 12),
        0xF9 => Opcode::new(LD(Load::Word(SP, WordSource::R(HL))), None, 8),
        0xFA => Opcode::new(LD(Load::Byte(ByteTarget::R(A), ByteSource::I(ByteRef::D16))), Word, 16),
        0xFB => Opcode::new(EI, None, 4),
        0xFE => Opcode::new(CP(ByteSource::D8), Byte, 8),
        0xFF => Opcode::new(RST(ResetCode::RST38), None, 16),

        // 0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD
        _ => Opcode::ILLEGAL,
    }
}

const fn decode_prefixed(opcode: u8) -> Opcode {
    let target = byte_target(opcode);
    let bit = (opcode >> 3) & 0b111;
    match opcode >> 6 {
        0 => {
            let instruction = match bit {
                0 => RLC(target),
                1 => RRC(target),
                2 => RL(target),
                3 => RR(target),
                4 => SLA(target),
                5 => SRA(target),
                6 => SWAP(target),
                _ => SRL(target),
            };
            Opcode::new(instruction, Operand::None, register_cycles(opcode, 8, 16))
        }
        1 => Opcode::new(BIT(bit, target), Operand::None, register_cycles(opcode, 8, 12)),
        2 => Opcode::new(RES(bit, target), Operand::None, register_cycles(opcode, 8, 16)),
        _ => Opcode::new(SET(bit, target), Operand::None, register_cycles(opcode, 8, 16)),
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ADD(source) => write!(f, "ADD A, {source}"),
            ADDHL(source) => write!(f, "ADD HL, {source}"),
            ADDSP => f.write_str("ADD SP, r8"),
            ADC(source) => write!(f, "ADC A, {source}"),
            AND(source) => write!(f, "AND {source}"),
            BIT(bit, target) => write!(f, "BIT {bit}, {target}"),
            CALL(Always) => f.write_str("CALL a16"),
            CALL(test) => write!(f, "CALL {test}, a16"),
            CCF => f.write_str("CCF"),
            CP(source) => write!(f, "CP {source}"),
            CPL => f.write_str("CPL"),
            DAA => f.write_str("DAA"),
            DI => f.write_str("DI"),
            DEC(target) => write!(f, "DEC {target}"),
            DEC2(target) => write!(f, "DEC {target}"),
            EI => f.write_str("EI"),
            HALT => f.write_str("HALT"),
            INC(target) => write!(f, "INC {target}"),
            INC2(target) => write!(f, "INC {target}"),
            JR(Always) => f.write_str("JR r8"),
            JR(test) => write!(f, "JR {test}, r8"),
            JP(Always, target) => write!(f, "JP {target}"),
            JP(test, target) => write!(f, "JP {test}, {target}"),
            LD(load) => write!(f, "LD {load}"),
            NOP => f.write_str("NOP"),
            OR(source) => write!(f, "OR {source}"),
            PREFIX => f.write_str("PREFIX CB"),
            PUSH(source) => write!(f, "PUSH {source}"),
            POP(target) => write!(f, "POP {target}"),
            RES(bit, target) => write!(f, "RES {bit}, {target}"),
            RET(Always) => f.write_str("RET"),
            RET(test) => write!(f, "RET {test}"),
            RETI => f.write_str("RETI"),
            RL(target) => write!(f, "RL {target}"),
            RLA => f.write_str("RLA"),
            RLC(target) => write!(f, "RLC {target}"),
            RLCA => f.write_str("RLCA"),
            RR(target) => write!(f, "RR {target}"),
            RRA => f.write_str("RRA"),
            RRC(target) => write!(f, "RRC {target}"),
            RRCA => f.write_str("RRCA"),
            RST(code) => write!(f, "RST {code}"),
            SBC(source) => write!(f, "SBC A, {source}"),
            SCF => f.write_str("SCF"),
            SET(bit, target) => write!(f, "SET {bit}, {target}"),
            SLA(target) => write!(f, "SLA {target}"),
            SRA(target) => write!(f, "SRA {target}"),
            SRL(target) => write!(f, "SRL {target}"),
            STOP => f.write_str("STOP"),
            SUB(source) => write!(f, "SUB {source}"),
            SWAP(target) => write!(f, "SWAP {target}"),
            XOR(source) => write!(f, "XOR {source}"),
            Illegal => f.write_str("ILLEGAL"),
        }
    }
}
