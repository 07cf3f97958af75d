use crate::gb::cpu::instruction::Instruction::*;
use crate::gb::cpu::instruction::{CB_OPCODES, Instruction, OPCODES, Operand};
use crate::gb::cpu::ops::*;
use crate::gb::cpu::registers::FlagsRegister;
use crate::gb::{AddressSpace, GBError, GBResult, INTERRUPT_DISPATCH_CYCLES, utils};
use registers::Registers;

pub mod instruction;
pub mod interrupt;
pub mod ops;
pub mod registers;
#[cfg(test)]
mod tests;

/// Cycles consumed per step while the CPU is halted.
const HALT_CYCLES: u32 = 4;

/// IME (Interrupt Master Enable) state. The EI instruction enables interrupts
/// after the following instruction which puts it on state `ImeState::Pending`.
#[derive(Debug, PartialEq, Copy, Clone, Default)]
pub enum ImeState {
    #[default]
    Disabled,
    Pending,
    Enabled,
}

/// Implements the CPU for the GB (DMG-01),
/// the CPU is LR35902 which is a subset of i8080 & Z80.
#[derive(Clone)]
pub struct CPU {
    pub r: Registers,          // CPU registers
    pub ime: ImeState,         // Interrupt Master Enable
    pub is_halted: bool,       // Waiting for an interrupt
    pub interrupt_cycles: u32, // Cycles charged per interrupt dispatch
}

impl Default for CPU {
    fn default() -> Self {
        Self {
            r: Registers::default(),
            ime: ImeState::default(),
            is_halted: false,
            interrupt_cycles: INTERRUPT_DISPATCH_CYCLES,
        }
    }
}

impl CPU {
    /// Makes one CPU step, this consumes one or more bytes depending on the
    /// next instruction and returns the amount of cycles it took.
    pub fn step<T: AddressSpace>(&mut self, bus: &mut T) -> GBResult<u32> {
        if self.is_halted {
            return Ok(HALT_CYCLES);
        }

        let address = self.r.pc;
        let code = self.fetch(bus);
        let mut opcode = OPCODES[usize::from(code)];
        let mut cycles = opcode.cycles;

        if opcode.instruction == PREFIX {
            opcode = CB_OPCODES[usize::from(self.fetch(bus))];
            cycles += opcode.cycles;
        }

        if opcode.instruction == Illegal {
            return Err(GBError::IllegalOpcode {
                opcode: code,
                address,
            });
        }

        let imm = match opcode.operand {
            Operand::None => 0,
            Operand::Byte => u16::from(self.fetch(bus)),
            Operand::Word => {
                let word = bus.read_word(self.r.pc);
                self.r.pc = self.r.pc.wrapping_add(Operand::Word.size());
                word
            }
        };

        Ok(cycles + self.execute(opcode.instruction, imm, bus))
    }

    /// Reads the byte at PC and advances it.
    #[inline]
    fn fetch<T: AddressSpace>(&mut self, bus: &mut T) -> u8 {
        let value = bus.read(self.r.pc);
        self.r.pc = self.r.pc.wrapping_add(1);
        value
    }

    /// Executes the given instruction with its decoded immediate
    /// and returns the additional cycles of a taken branch.
    fn execute<T: AddressSpace>(&mut self, instruction: Instruction, imm: u16, bus: &mut T) -> u32 {
        match instruction {
            CALL(test) => return self.handle_call(test, imm, bus),
            JP(test, target) => return self.handle_jp(test, target, imm),
            JR(test) => return self.handle_jr(test, imm),
            RET(test) => return self.handle_ret(test, bus),
            ADD(source) => self.handle_add(source, imm, bus),
            ADDHL(source) => self.handle_add_hl(source),
            ADDSP => self.handle_add_sp(imm),
            ADC(source) => self.handle_adc(source, imm, bus),
            AND(source) => self.handle_and(source, imm, bus),
            BIT(bit, target) => self.handle_bit(bit, target, bus),
            CCF => self.handle_ccf(),
            CP(source) => self.handle_cp(source, imm, bus),
            CPL => self.handle_cpl(),
            DAA => self.handle_daa(),
            DI => self.ime = ImeState::Disabled,
            DEC(target) => self.handle_dec_byte(target, bus),
            DEC2(target) => {
                let value = target.read(self).wrapping_sub(1);
                target.write(self, value);
            }
            EI => self.handle_ei(),
            HALT => self.is_halted = true,
            INC(target) => self.handle_inc_byte(target, bus),
            INC2(target) => {
                let value = target.read(self).wrapping_add(1);
                target.write(self, value);
            }
            LD(load) => self.handle_ld(load, imm, bus),
            NOP => {}
            OR(source) => self.handle_or(source, imm, bus),
            POP(target) => {
                let word = self.pop(bus);
                target.write(self, word);
            }
            PUSH(source) => {
                let word = source.read(self);
                self.push(word, bus);
            }
            RES(bit, target) => self.handle_res(bit, target, bus),
            RETI => {
                self.ime = ImeState::Enabled;
                self.r.pc = self.pop(bus);
            }
            RL(target) => self.handle_rl(target, bus),
            RLA => self.handle_rla(),
            RLC(target) => self.handle_rlc(target, bus),
            RLCA => self.handle_rlca(),
            RR(target) => self.handle_rr(target, bus),
            RRA => self.handle_rra(),
            RRC(target) => self.handle_rrc(target, bus),
            RRCA => self.handle_rrca(),
            RST(code) => {
                self.push(self.r.pc, bus);
                self.r.pc = code as u16;
            }
            SBC(source) => self.handle_sbc(source, imm, bus),
            SCF => self.handle_scf(),
            SET(bit, target) => self.handle_set(bit, target, bus),
            SLA(target) => self.handle_sla(target, bus),
            SRA(target) => self.handle_sra(target, bus),
            SRL(target) => self.handle_srl(target, bus),
            STOP => log::debug!("STOP at {:#06x} treated as NOP", self.r.pc.wrapping_sub(2)),
            SUB(source) => self.handle_sub(source, imm, bus),
            SWAP(target) => self.handle_swap(target, bus),
            XOR(source) => self.handle_xor(source, imm, bus),
            PREFIX | Illegal => unreachable!("{instruction} is resolved during fetch"),
        }
        0
    }

    /// Push an u16 value onto the stack.
    /// SP is decremented by two, the low byte is stored at SP and the high byte at SP + 1.
    pub fn push<T: AddressSpace>(&mut self, value: u16, bus: &mut T) {
        self.r.sp = self.r.sp.wrapping_sub(2);
        bus.write_word(self.r.sp, value);
    }

    /// Pop an u16 value from the stack.
    pub fn pop<T: AddressSpace>(&mut self, bus: &mut T) -> u16 {
        let value = bus.read_word(self.r.sp);
        self.r.sp = self.r.sp.wrapping_add(2);
        value
    }

    /// Adds the value and an optional carry to A and updates all flags.
    fn alu_add(&mut self, value: u8, carry: bool) -> u8 {
        let a = self.r.a;
        let result = u16::from(a) + u16::from(value) + carry as u16;
        self.r.f.update(
            result as u8 == 0,
            false,
            utils::half_carry_u8(a, value, carry),
            result > 0xFF,
        );
        result as u8
    }

    /// Subtracts the value and an optional borrow from A, updates all flags
    /// and returns the result without storing it.
    fn alu_sub(&mut self, value: u8, borrow: bool) -> u8 {
        let a = self.r.a;
        let result = a.wrapping_sub(value).wrapping_sub(borrow as u8);
        self.r.f.update(
            result == 0,
            true,
            utils::half_borrow_u8(a, value, borrow),
            u16::from(a) < u16::from(value) + borrow as u16,
        );
        result
    }

    /// Adds a signed immediate to SP and returns the result.
    /// Half Carry and Carry are computed from the unsigned addition of the low byte.
    fn alu_add_sp(&mut self, imm: u16) -> u16 {
        let sp = self.r.sp;
        let offset = imm as u8;
        let half_carry = (sp & 0x0F) + u16::from(offset & 0x0F) > 0x0F;
        let carry = (sp & 0xFF) + u16::from(offset) > 0xFF;
        self.r.f.update(false, false, half_carry, carry);
        sp.wrapping_add(offset as i8 as u16)
    }

    /// Handles ADD A, n instructions
    fn handle_add<T: AddressSpace>(&mut self, source: ByteSource, imm: u16, bus: &mut T) {
        let value = source.read(self, bus, imm);
        self.r.a = self.alu_add(value, false);
    }

    /// Handles ADD HL, nn instructions
    /// Zero and Subtract are left untouched.
    fn handle_add_hl(&mut self, source: WordRegister) {
        let value = source.read(self);
        let hl = self.r.get_hl();
        let (result, overflow) = hl.overflowing_add(value);
        self.r.set_flag(FlagsRegister::HALF_CARRY, utils::half_carry_u16(hl, value));
        self.r.set_flag(FlagsRegister::CARRY, overflow);
        self.r.set_hl(result);
    }

    /// Handles ADD SP, i8 instruction
    fn handle_add_sp(&mut self, imm: u16) {
        self.r.sp = self.alu_add_sp(imm);
    }

    /// Handles ADC instructions
    fn handle_adc<T: AddressSpace>(&mut self, source: ByteSource, imm: u16, bus: &mut T) {
        let value = source.read(self, bus, imm);
        let carry = self.r.flag_is_set(FlagsRegister::CARRY);
        self.r.a = self.alu_add(value, carry);
    }

    /// Handles AND instructions
    #[inline]
    fn handle_and<T: AddressSpace>(&mut self, source: ByteSource, imm: u16, bus: &mut T) {
        let value = source.read(self, bus, imm);
        self.r.a &= value;
        self.r.f.update(self.r.a == 0, false, true, false);
    }

    /// Handles BIT instructions
    fn handle_bit<T: AddressSpace>(&mut self, bit: u8, target: ByteTarget, bus: &mut T) {
        let value = target.read(self, bus, 0);
        self.r.set_flag(FlagsRegister::ZERO, !utils::bit_at(value, bit));
        self.r.set_flag(FlagsRegister::SUBTRACTION, false);
        self.r.set_flag(FlagsRegister::HALF_CARRY, true);
    }

    /// Handles CALL instructions
    fn handle_call<T: AddressSpace>(&mut self, test: JumpCondition, imm: u16, bus: &mut T) -> u32 {
        if !test.resolve(self) {
            return 0;
        }
        self.push(self.r.pc, bus);
        self.r.pc = imm;
        match test {
            JumpCondition::Always => 0,
            _ => 12,
        }
    }

    /// Handles CCF instruction
    #[inline]
    fn handle_ccf(&mut self) {
        self.r.f.remove(FlagsRegister::SUBTRACTION | FlagsRegister::HALF_CARRY);
        self.r.f.toggle(FlagsRegister::CARRY);
    }

    /// Handles CP instructions
    fn handle_cp<T: AddressSpace>(&mut self, source: ByteSource, imm: u16, bus: &mut T) {
        let value = source.read(self, bus, imm);
        self.alu_sub(value, false);
    }

    /// Handles CPL instruction
    #[inline]
    fn handle_cpl(&mut self) {
        self.r.a = !self.r.a;
        self.r.f.insert(FlagsRegister::SUBTRACTION | FlagsRegister::HALF_CARRY);
    }

    /// Handles DAA instruction
    fn handle_daa(&mut self) {
        if self.r.flag_is_set(FlagsRegister::SUBTRACTION) {
            if self.r.flag_is_set(FlagsRegister::CARRY) {
                self.r.a = self.r.a.wrapping_sub(0x60);
            }
            if self.r.flag_is_set(FlagsRegister::HALF_CARRY) {
                self.r.a = self.r.a.wrapping_sub(0x06);
            }
        } else {
            if self.r.flag_is_set(FlagsRegister::CARRY) || self.r.a > 0x99 {
                self.r.a = self.r.a.wrapping_add(0x60);
                self.r.f.insert(FlagsRegister::CARRY);
            }
            if self.r.flag_is_set(FlagsRegister::HALF_CARRY) || (self.r.a & 0x0F) > 0x09 {
                self.r.a = self.r.a.wrapping_add(0x06);
            }
        }
        self.r.set_flag(FlagsRegister::ZERO, self.r.a == 0);
        self.r.set_flag(FlagsRegister::HALF_CARRY, false);
    }

    /// Handles DEC instructions for bytes
    fn handle_dec_byte<T: AddressSpace>(&mut self, target: ByteTarget, bus: &mut T) {
        let value = target.read(self, bus, 0);
        let result = value.wrapping_sub(1);
        target.write(self, bus, 0, result);
        self.r.set_flag(FlagsRegister::ZERO, result == 0);
        self.r.set_flag(FlagsRegister::SUBTRACTION, true);
        self.r.set_flag(FlagsRegister::HALF_CARRY, value & 0x0F == 0);
    }

    /// Handles EI instruction
    #[inline]
    fn handle_ei(&mut self) {
        if self.ime == ImeState::Disabled {
            self.ime = ImeState::Pending;
        }
    }

    /// Handles INC instructions for bytes
    fn handle_inc_byte<T: AddressSpace>(&mut self, target: ByteTarget, bus: &mut T) {
        let value = target.read(self, bus, 0);
        let result = value.wrapping_add(1);
        target.write(self, bus, 0, result);
        self.r.set_flag(FlagsRegister::ZERO, result == 0);
        self.r.set_flag(FlagsRegister::SUBTRACTION, false);
        self.r.set_flag(FlagsRegister::HALF_CARRY, value & 0x0F == 0x0F);
    }

    /// Handles JR instructions
    fn handle_jr(&mut self, test: JumpCondition, imm: u16) -> u32 {
        if !test.resolve(self) {
            return 0;
        }
        let offset = imm as u8 as i8;
        self.r.pc = self.r.pc.wrapping_add(offset as u16);
        match test {
            JumpCondition::Always => 0,
            _ => 4,
        }
    }

    /// Handles JP instructions
    fn handle_jp(&mut self, test: JumpCondition, target: JumpTarget, imm: u16) -> u32 {
        if !test.resolve(self) {
            return 0;
        }
        self.r.pc = target.read(self, imm);
        match test {
            JumpCondition::Always => 0,
            _ => 4,
        }
    }

    /// Handles LD instructions
    fn handle_ld<T: AddressSpace>(&mut self, load: Load, imm: u16, bus: &mut T) {
        match load {
            Load::Byte(target, source) => {
                let value = source.read(self, bus, imm);
                target.write(self, bus, imm, value);
            }
            Load::Word(target, source) => {
                let value = source.read(self, imm);
                target.write(self, value);
            }
            Load::IndirectFromSP => bus.write_word(imm, self.r.sp),
            Load::HLFromSPi8 => {
                let value = self.alu_add_sp(imm);
                self.r.set_hl(value);
            }
        }
    }

    /// Handles OR instructions
    #[inline]
    fn handle_or<T: AddressSpace>(&mut self, source: ByteSource, imm: u16, bus: &mut T) {
        let value = source.read(self, bus, imm);
        self.r.a |= value;
        self.r.f.update(self.r.a == 0, false, false, false);
    }

    /// Handles RES instructions
    #[inline]
    fn handle_res<T: AddressSpace>(&mut self, bit: u8, target: ByteTarget, bus: &mut T) {
        let value = target.read(self, bus, 0);
        target.write(self, bus, 0, utils::set_bit(value, bit, false));
    }

    /// Handles RET instructions
    fn handle_ret<T: AddressSpace>(&mut self, test: JumpCondition, bus: &mut T) -> u32 {
        if !test.resolve(self) {
            return 0;
        }
        self.r.pc = self.pop(bus);
        match test {
            JumpCondition::Always => 0,
            _ => 12,
        }
    }

    /// Handles RL instructions
    /// Rotate n left through Carry flag.
    #[inline]
    fn handle_rl<T: AddressSpace>(&mut self, target: ByteTarget, bus: &mut T) {
        let value = target.read(self, bus, 0);
        let carry = value & 0b1000_0000 != 0;
        let result = (value << 1) | self.r.flag_is_set(FlagsRegister::CARRY) as u8;
        self.r.f.update(result == 0, false, false, carry);
        target.write(self, bus, 0, result);
    }

    /// Handles RLA instruction
    /// Rotates the A register one bit to the left. Previous carry flag becomes the
    /// least-significant bit, and previous Most Significant Bit becomes Carry.
    #[inline]
    fn handle_rla(&mut self) {
        let carry = self.r.a & 0b1000_0000 != 0;
        self.r.a = (self.r.a << 1) | self.r.flag_is_set(FlagsRegister::CARRY) as u8;
        self.r.f.update(false, false, false, carry);
    }

    /// Handles RLC instructions
    fn handle_rlc<T: AddressSpace>(&mut self, target: ByteTarget, bus: &mut T) {
        let value = target.read(self, bus, 0);
        let result = value.rotate_left(1);
        self.r.f.update(result == 0, false, false, value & 0b1000_0000 != 0);
        target.write(self, bus, 0, result);
    }

    /// Handles RLCA instruction
    #[inline]
    fn handle_rlca(&mut self) {
        let carry = self.r.a & 0b1000_0000 != 0;
        self.r.a = self.r.a.rotate_left(1);
        self.r.f.update(false, false, false, carry);
    }

    /// Handles RR instructions
    fn handle_rr<T: AddressSpace>(&mut self, target: ByteTarget, bus: &mut T) {
        let value = target.read(self, bus, 0);
        let carry = value & 0x01 != 0;
        let result = (value >> 1) | ((self.r.flag_is_set(FlagsRegister::CARRY) as u8) << 7);
        target.write(self, bus, 0, result);
        self.r.f.update(result == 0, false, false, carry);
    }

    /// Handles RRA instruction
    #[inline]
    fn handle_rra(&mut self) {
        let carry = self.r.a & 0x01 != 0;
        self.r.a = (self.r.a >> 1) | ((self.r.flag_is_set(FlagsRegister::CARRY) as u8) << 7);
        self.r.f.update(false, false, false, carry);
    }

    /// Handles RRC instructions
    fn handle_rrc<T: AddressSpace>(&mut self, target: ByteTarget, bus: &mut T) {
        let value = target.read(self, bus, 0);
        let result = value.rotate_right(1);
        self.r.f.update(result == 0, false, false, value & 0x01 != 0);
        target.write(self, bus, 0, result);
    }

    /// Handles RRCA instruction
    #[inline]
    fn handle_rrca(&mut self) {
        let carry = self.r.a & 0x01 != 0;
        self.r.a = self.r.a.rotate_right(1);
        self.r.f.update(false, false, false, carry);
    }

    /// Handles SBC instructions
    fn handle_sbc<T: AddressSpace>(&mut self, source: ByteSource, imm: u16, bus: &mut T) {
        let value = source.read(self, bus, imm);
        let borrow = self.r.flag_is_set(FlagsRegister::CARRY);
        self.r.a = self.alu_sub(value, borrow);
    }

    /// Handles SCF instruction
    #[inline]
    fn handle_scf(&mut self) {
        self.r.f.remove(FlagsRegister::SUBTRACTION | FlagsRegister::HALF_CARRY);
        self.r.f.insert(FlagsRegister::CARRY);
    }

    /// Handles SET instructions
    fn handle_set<T: AddressSpace>(&mut self, bit: u8, target: ByteTarget, bus: &mut T) {
        let value = target.read(self, bus, 0);
        target.write(self, bus, 0, utils::set_bit(value, bit, true));
    }

    /// Handles SLA instructions
    fn handle_sla<T: AddressSpace>(&mut self, target: ByteTarget, bus: &mut T) {
        let value = target.read(self, bus, 0);
        let result = value << 1;
        self.r.f.update(result == 0, false, false, value & 0b1000_0000 != 0);
        target.write(self, bus, 0, result);
    }

    /// Handles SRA instructions
    fn handle_sra<T: AddressSpace>(&mut self, target: ByteTarget, bus: &mut T) {
        let value = target.read(self, bus, 0);
        let result = (value >> 1) | (value & 0b1000_0000);
        self.r.f.update(result == 0, false, false, value & 0x01 != 0);
        target.write(self, bus, 0, result);
    }

    /// Handles SRL instructions
    fn handle_srl<T: AddressSpace>(&mut self, target: ByteTarget, bus: &mut T) {
        let value = target.read(self, bus, 0);
        let result = value >> 1;
        target.write(self, bus, 0, result);
        self.r.f.update(result == 0, false, false, value & 0x01 != 0);
    }

    /// Handles SUB instructions
    fn handle_sub<T: AddressSpace>(&mut self, source: ByteSource, imm: u16, bus: &mut T) {
        let value = source.read(self, bus, imm);
        self.r.a = self.alu_sub(value, false);
    }

    /// Handles SWAP instructions
    #[inline]
    fn handle_swap<T: AddressSpace>(&mut self, target: ByteTarget, bus: &mut T) {
        let value = target.read(self, bus, 0);
        self.r.f.update(value == 0, false, false, false);
        target.write(self, bus, 0, value.rotate_right(4));
    }

    /// Handles XOR instructions
    #[inline]
    fn handle_xor<T: AddressSpace>(&mut self, source: ByteSource, imm: u16, bus: &mut T) {
        let value = source.read(self, bus, imm);
        self.r.a ^= value;
        self.r.f.update(self.r.a == 0, false, false, false);
    }
}
