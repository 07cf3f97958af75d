/// Gets the bit at position `n`.
/// Bits are numbered from 0 (least significant) to 7 (most significant).
#[inline]
pub fn bit_at(input: u8, n: u8) -> bool {
    match n < 8 {
        true => input & (1 << n) != 0,
        false => false,
    }
}

/// Sets the bit at position `n` to the given state.
/// Bits are numbered from 0 (least significant) to 7 (most significant).
#[inline]
pub fn set_bit(input: u8, n: u8, state: bool) -> u8 {
    match state {
        true => input | (1 << n),
        false => input & !(1 << n),
    }
}

/// Checks if half carry from bit 3 to bit 4 occurred, including an optional carry-in.
#[inline]
pub fn half_carry_u8(x: u8, y: u8, carry: bool) -> bool {
    (x & 0x0F) + (y & 0x0F) + carry as u8 > 0x0F
}

/// Checks if a borrow from bit 4 occurred, including an optional borrow-in.
#[inline]
pub fn half_borrow_u8(x: u8, y: u8, borrow: bool) -> bool {
    (x & 0x0F) < (y & 0x0F) + borrow as u8
}

/// Checks if half carry from bit 11 to bit 12 occurred.
#[inline]
pub fn half_carry_u16(x: u16, y: u16) -> bool {
    (x & 0x0FFF) + (y & 0x0FFF) > 0x0FFF
}
