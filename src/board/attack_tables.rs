//! Precomputed jump-attack tables for the non-sliding pieces.

use crate::board::chess_types::{Color, Square};

pub const KNIGHT_ATTACKS: [u64; 64] = generate_jump_table(&[
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
]);

pub const KING_ATTACKS: [u64; 64] = generate_jump_table(&[
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
]);

/// Squares a pawn of the given color attacks from each square. Indexed
/// `[color][square]`; push targets are computed by shifting, not stored here.
pub const PAWN_ATTACKS: [[u64; 64]; 2] = [
    generate_jump_table(&[(-1, 1), (1, 1)]),
    generate_jump_table(&[(-1, -1), (1, -1)]),
];

#[inline]
pub fn knight_attacks(square: Square) -> u64 {
    KNIGHT_ATTACKS[square as usize]
}

#[inline]
pub fn king_attacks(square: Square) -> u64 {
    KING_ATTACKS[square as usize]
}

#[inline]
pub fn pawn_attacks(color: Color, square: Square) -> u64 {
    PAWN_ATTACKS[color.index()][square as usize]
}

const fn generate_jump_table(offsets: &[(i32, i32)]) -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0i32;

    while sq < 64 {
        let file = sq % 8;
        let rank = sq / 8;
        let mut mask = 0u64;
        let mut i = 0usize;

        while i < offsets.len() {
            let (df, dr) = offsets[i];
            let f = file + df;
            let r = rank + dr;
            if f >= 0 && f < 8 && r >= 0 && r < 8 {
                mask |= 1u64 << (r * 8 + f);
            }
            i += 1;
        }

        table[sq as usize] = mask;
        sq += 1;
    }

    table
}

#[cfg(test)]
mod tests {
    use super::{king_attacks, knight_attacks, pawn_attacks};
    use crate::board::bitboard::{pop_count, square_bb};
    use crate::board::chess_types::Color;

    #[test]
    fn knight_attack_counts_match_board_geometry() {
        assert_eq!(pop_count(knight_attacks(0)), 2, "a1 corner");
        assert_eq!(pop_count(knight_attacks(27)), 8, "d4 center");
        assert_eq!(pop_count(knight_attacks(7)), 2, "h1 corner");
    }

    #[test]
    fn king_attack_counts_match_board_geometry() {
        assert_eq!(pop_count(king_attacks(0)), 3);
        assert_eq!(pop_count(king_attacks(27)), 8);
        assert_eq!(pop_count(king_attacks(4)), 5, "e1 edge");
    }

    #[test]
    fn pawn_attacks_point_forward_per_color() {
        // White pawn on e4 attacks d5 and f5.
        let white = pawn_attacks(Color::White, 28);
        assert_eq!(white, square_bb(35) | square_bb(37));

        // Black pawn on e4 attacks d3 and f3.
        let black = pawn_attacks(Color::Black, 28);
        assert_eq!(black, square_bb(19) | square_bb(21));
    }

    #[test]
    fn pawn_attacks_respect_board_edges() {
        let white_a2 = pawn_attacks(Color::White, 8);
        assert_eq!(white_a2, square_bb(17), "a-file pawn only attacks b-file");

        let black_h7 = pawn_attacks(Color::Black, 55);
        assert_eq!(black_h7, square_bb(46), "h-file pawn only attacks g-file");
    }
}
