//! Packed move representation.
//!
//! A move is a single `u32`: from-square in bits 0..=5, to-square in bits
//! 6..=11, a flag byte in bits 12..=19, and the promotion piece kind in bits
//! 20..=23. Moves are built only through the category factories below, so a
//! flag combination that never arises in chess cannot be represented by
//! accident. Equality and hashing reduce to integer equality.

use crate::board::chess_types::{PieceKind, Square};

const TO_SHIFT: u32 = 6;
const FLAG_SHIFT: u32 = 12;
const PROMOTION_PIECE_SHIFT: u32 = 20;

const SQUARE_MASK: u32 = 0x3F;
const FLAG_MASK: u32 = 0xFF;
const PROMOTION_PIECE_MASK: u32 = 0x0F;

const FLAG_CAPTURE: u32 = 1 << 0;
const FLAG_DOUBLE_PAWN_PUSH: u32 = 1 << 1;
const FLAG_KINGSIDE_CASTLE: u32 = 1 << 2;
const FLAG_QUEENSIDE_CASTLE: u32 = 1 << 3;
const FLAG_EN_PASSANT: u32 = 1 << 4;
const FLAG_PROMOTION: u32 = 1 << 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move(u32);

impl Move {
    #[inline]
    const fn pack(from: Square, to: Square, flags: u32) -> Self {
        Move((from as u32) | ((to as u32) << TO_SHIFT) | (flags << FLAG_SHIFT))
    }

    #[inline]
    pub const fn quiet(from: Square, to: Square) -> Self {
        Self::pack(from, to, 0)
    }

    #[inline]
    pub const fn capture(from: Square, to: Square) -> Self {
        Self::pack(from, to, FLAG_CAPTURE)
    }

    #[inline]
    pub const fn double_pawn_push(from: Square, to: Square) -> Self {
        Self::pack(from, to, FLAG_DOUBLE_PAWN_PUSH)
    }

    #[inline]
    pub const fn castle_kingside(from: Square, to: Square) -> Self {
        Self::pack(from, to, FLAG_KINGSIDE_CASTLE)
    }

    #[inline]
    pub const fn castle_queenside(from: Square, to: Square) -> Self {
        Self::pack(from, to, FLAG_QUEENSIDE_CASTLE)
    }

    /// En passant is always a capture; the victim pawn sits behind `to`.
    #[inline]
    pub const fn en_passant_capture(from: Square, to: Square) -> Self {
        Self::pack(from, to, FLAG_EN_PASSANT | FLAG_CAPTURE)
    }

    #[inline]
    pub const fn promotion(from: Square, to: Square, piece: PieceKind) -> Self {
        let base = Self::pack(from, to, FLAG_PROMOTION);
        Move(base.0 | ((piece.index() as u32) << PROMOTION_PIECE_SHIFT))
    }

    #[inline]
    pub const fn promotion_capture(from: Square, to: Square, piece: PieceKind) -> Self {
        let base = Self::pack(from, to, FLAG_PROMOTION | FLAG_CAPTURE);
        Move(base.0 | ((piece.index() as u32) << PROMOTION_PIECE_SHIFT))
    }

    #[inline]
    pub const fn from(self) -> Square {
        (self.0 & SQUARE_MASK) as Square
    }

    #[inline]
    pub const fn to(self) -> Square {
        ((self.0 >> TO_SHIFT) & SQUARE_MASK) as Square
    }

    #[inline]
    const fn flags(self) -> u32 {
        (self.0 >> FLAG_SHIFT) & FLAG_MASK
    }

    #[inline]
    pub const fn is_capture(self) -> bool {
        self.flags() & FLAG_CAPTURE != 0
    }

    #[inline]
    pub const fn is_double_pawn_push(self) -> bool {
        self.flags() & FLAG_DOUBLE_PAWN_PUSH != 0
    }

    #[inline]
    pub const fn is_kingside_castle(self) -> bool {
        self.flags() & FLAG_KINGSIDE_CASTLE != 0
    }

    #[inline]
    pub const fn is_queenside_castle(self) -> bool {
        self.flags() & FLAG_QUEENSIDE_CASTLE != 0
    }

    #[inline]
    pub const fn is_castle(self) -> bool {
        self.flags() & (FLAG_KINGSIDE_CASTLE | FLAG_QUEENSIDE_CASTLE) != 0
    }

    #[inline]
    pub const fn is_en_passant(self) -> bool {
        self.flags() & FLAG_EN_PASSANT != 0
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        self.flags() & FLAG_PROMOTION != 0
    }

    /// The piece promoted to; meaningful only when `is_promotion()`.
    #[inline]
    pub fn promotion_piece(self) -> Option<PieceKind> {
        if !self.is_promotion() {
            return None;
        }
        PieceKind::from_index(((self.0 >> PROMOTION_PIECE_SHIFT) & PROMOTION_PIECE_MASK) as usize)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::Move;
    use crate::board::chess_types::PieceKind;

    #[test]
    fn factories_set_consistent_flags() {
        let quiet = Move::quiet(12, 28);
        assert_eq!(quiet.from(), 12);
        assert_eq!(quiet.to(), 28);
        assert!(!quiet.is_capture());
        assert!(!quiet.is_promotion());

        let capture = Move::capture(28, 35);
        assert!(capture.is_capture());
        assert!(!capture.is_en_passant());

        let ep = Move::en_passant_capture(28, 21);
        assert!(ep.is_en_passant());
        assert!(ep.is_capture(), "en passant always captures");

        let push = Move::double_pawn_push(12, 28);
        assert!(push.is_double_pawn_push());
        assert!(!push.is_capture());
    }

    #[test]
    fn castling_factories_distinguish_wings() {
        let short = Move::castle_kingside(4, 6);
        let long = Move::castle_queenside(4, 2);
        assert!(short.is_kingside_castle() && !short.is_queenside_castle());
        assert!(long.is_queenside_castle() && !long.is_kingside_castle());
        assert!(short.is_castle() && long.is_castle());
    }

    #[test]
    fn promotion_piece_is_recoverable() {
        let promo = Move::promotion(52, 60, PieceKind::Queen);
        assert!(promo.is_promotion());
        assert!(!promo.is_capture());
        assert_eq!(promo.promotion_piece(), Some(PieceKind::Queen));

        let under = Move::promotion_capture(52, 61, PieceKind::Knight);
        assert!(under.is_promotion() && under.is_capture());
        assert_eq!(under.promotion_piece(), Some(PieceKind::Knight));

        assert_eq!(Move::quiet(0, 1).promotion_piece(), None);
    }

    #[test]
    fn equality_reduces_to_packed_integer() {
        assert_eq!(Move::quiet(12, 28), Move::quiet(12, 28));
        assert_ne!(Move::quiet(12, 28), Move::double_pawn_push(12, 28));
    }
}
