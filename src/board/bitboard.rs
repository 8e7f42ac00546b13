//! Bit-level primitives and sliding-attack computation.
//!
//! A bitboard is a `u64` with one bit per square, little-endian rank-file:
//! bit 0 is a1, bit 7 is h1, bit 63 is h8. Sliding attacks are computed on
//! demand with the hyperbola quintessence identity against per-square line
//! masks, so no table larger than the masks themselves is needed.

use crate::board::chess_types::Square;

pub const FILE_A: u64 = 0x0101_0101_0101_0101;
pub const FILE_H: u64 = FILE_A << 7;
pub const RANK_1: u64 = 0x0000_0000_0000_00FF;
pub const RANK_8: u64 = RANK_1 << 56;

/// Per-square line masks, each excluding the square itself.
pub const FILE_MASKS: [u64; 64] = generate_line_masks(0, 1);
pub const RANK_MASKS: [u64; 64] = generate_line_masks(1, 0);
pub const DIAGONAL_MASKS: [u64; 64] = generate_line_masks(1, 1);
pub const ANTI_DIAGONAL_MASKS: [u64; 64] = generate_line_masks(-1, 1);

#[inline]
pub const fn square_bb(square: Square) -> u64 {
    1u64 << square
}

#[inline]
pub const fn is_set(bitboard: u64, square: Square) -> bool {
    bitboard & square_bb(square) != 0
}

#[inline]
pub const fn pop_count(bitboard: u64) -> u32 {
    bitboard.count_ones()
}

/// Index of the least significant set bit. Caller guarantees `bitboard != 0`.
#[inline]
pub const fn lsb(bitboard: u64) -> Square {
    bitboard.trailing_zeros() as Square
}

/// Index of the most significant set bit. Caller guarantees `bitboard != 0`.
#[inline]
pub const fn msb(bitboard: u64) -> Square {
    (63 - bitboard.leading_zeros()) as Square
}

#[inline]
pub const fn clear_lsb(bitboard: u64) -> u64 {
    bitboard & bitboard.wrapping_sub(1)
}

/// Squares a bishop on `square` reaches, up to and including the first
/// blocker in each diagonal direction.
#[inline]
pub fn bishop_attacks(square: Square, occupancy: u64) -> u64 {
    hyperbola_quintessence(square, DIAGONAL_MASKS[square as usize], occupancy)
        | hyperbola_quintessence(square, ANTI_DIAGONAL_MASKS[square as usize], occupancy)
}

/// Squares a rook on `square` reaches, up to and including the first blocker
/// along its rank and file.
#[inline]
pub fn rook_attacks(square: Square, occupancy: u64) -> u64 {
    hyperbola_quintessence(square, RANK_MASKS[square as usize], occupancy)
        | hyperbola_quintessence(square, FILE_MASKS[square as usize], occupancy)
}

#[inline]
pub fn queen_attacks(square: Square, occupancy: u64) -> u64 {
    bishop_attacks(square, occupancy) | rook_attacks(square, occupancy)
}

/// Sliding attacks along one line: `(occ − 2·sq) XOR rev(rev(occ) − 2·rev(sq))`,
/// masked back to the line. The line mask must exclude `square` itself.
#[inline]
pub fn hyperbola_quintessence(square: Square, line_mask: u64, occupancy: u64) -> u64 {
    let slider = square_bb(square);
    let occ = occupancy & line_mask;
    let forward = occ.wrapping_sub(slider.wrapping_mul(2));
    let reverse = occ
        .reverse_bits()
        .wrapping_sub(slider.reverse_bits().wrapping_mul(2))
        .reverse_bits();
    (forward ^ reverse) & line_mask
}

const fn generate_line_masks(file_step: i32, rank_step: i32) -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let mut mask = 0u64;
        mask |= trace_line(sq as i32, file_step, rank_step);
        mask |= trace_line(sq as i32, -file_step, -rank_step);
        table[sq] = mask;
        sq += 1;
    }

    table
}

const fn trace_line(square: i32, file_step: i32, rank_step: i32) -> u64 {
    let mut file = (square % 8) + file_step;
    let mut rank = (square / 8) + rank_step;
    let mut line = 0u64;

    while file >= 0 && file < 8 && rank >= 0 && rank < 8 {
        line |= 1u64 << (rank * 8 + file);
        file += file_step;
        rank += rank_step;
    }

    line
}
