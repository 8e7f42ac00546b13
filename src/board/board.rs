//! Core incremental board representation.
//!
//! `Board` is the central model: piece bitboards, occupancy caches, turn and
//! state flags, clocks, the incrementally maintained Zobrist key, and the
//! undo stack that makes move application reversible. All mutation goes
//! through `make_move`/`unmake_move` (plus the null-move pair used by the
//! search), so the derived fields can never drift from the bitboards.

use std::collections::HashMap;
use std::fmt;

use crate::board::attack_tables::{king_attacks, knight_attacks, pawn_attacks};
use crate::board::bitboard::{bishop_attacks, lsb, pop_count, rook_attacks, square_bb};
use crate::board::chess_types::{
    CastlingRights, Color, PieceKind, Square, STARTING_POSITION_FEN,
};
use crate::board::undo_state::UndoState;
use crate::board::zobrist;
use crate::moves::move_encoding::Move;
use crate::utils::fen_generator::generate_fen;
use crate::utils::fen_parser::parse_fen;
use crate::utils::render_board::render_board;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    /// `unmake_move` was called with no move left to undo.
    EmptyHistory,
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::EmptyHistory => write!(f, "no move to unmake: history is empty"),
        }
    }
}

impl std::error::Error for BoardError {}

/// Removes the rights that die when a piece moves from, or is captured on,
/// each square. King and rook origin squares are the only non-trivial entries.
const CASTLING_RIGHTS_MASK: [CastlingRights; 64] = generate_castling_rights_masks();

const fn generate_castling_rights_masks() -> [CastlingRights; 64] {
    use crate::board::chess_types::{
        CASTLE_BLACK, CASTLE_BLACK_KINGSIDE, CASTLE_BLACK_QUEENSIDE, CASTLE_WHITE,
        CASTLE_WHITE_KINGSIDE, CASTLE_WHITE_QUEENSIDE,
    };

    let mut table = [0x0Fu8; 64];
    table[0] &= !CASTLE_WHITE_QUEENSIDE;
    table[4] &= !CASTLE_WHITE;
    table[7] &= !CASTLE_WHITE_KINGSIDE;
    table[56] &= !CASTLE_BLACK_QUEENSIDE;
    table[60] &= !CASTLE_BLACK;
    table[63] &= !CASTLE_BLACK_KINGSIDE;
    table
}

#[derive(Debug, Clone)]
pub struct Board {
    // [color][piece_kind]
    pub pieces: [[u64; 6]; 2],

    // Occupancy caches, kept in lockstep with `pieces`.
    pub occupancy_by_color: [u64; 2],
    pub occupancy_all: u64,

    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    pub en_passant_square: Option<Square>,

    pub halfmove_clock: u16,
    pub fullmove_number: u16,

    hash: u64,
    piece_on: [Option<PieceKind>; 64],
    history: Vec<UndoState>,
    repetition_counts: HashMap<u64, u32>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            pieces: [[0; 6]; 2],
            occupancy_by_color: [0; 2],
            occupancy_all: 0,

            side_to_move: Color::White,
            castling_rights: 0,
            en_passant_square: None,

            halfmove_clock: 0,
            fullmove_number: 1,

            hash: 0,
            piece_on: [None; 64],
            history: Vec::new(),
            repetition_counts: HashMap::new(),
        }
    }
}

impl Board {
    #[inline]
    pub fn new_game() -> Self {
        parse_fen(STARTING_POSITION_FEN).expect("starting FEN should always parse")
    }

    #[inline]
    pub fn from_fen(fen: &str) -> Result<Self, String> {
        parse_fen(fen)
    }

    #[inline]
    pub fn to_fen(&self) -> String {
        generate_fen(self)
    }

    /// ASCII board diagram with the FEN descriptor appended.
    #[inline]
    pub fn render(&self) -> String {
        render_board(self)
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<PieceKind> {
        self.piece_on[square as usize]
    }

    #[inline]
    pub fn color_at(&self, square: Square) -> Option<Color> {
        let bb = square_bb(square);
        if self.occupancy_by_color[Color::White.index()] & bb != 0 {
            Some(Color::White)
        } else if self.occupancy_by_color[Color::Black.index()] & bb != 0 {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// Recompute every derived field from the piece bitboards. Called once
    /// after construction from a parsed descriptor; the root position counts
    /// as the first occurrence of its hash.
    pub fn refresh_derived_state(&mut self) {
        let mut piece_on = [None; 64];
        let mut by_color = [0u64; 2];

        for color in [Color::White, Color::Black] {
            for piece in PieceKind::ALL {
                let mut bb = self.pieces[color.index()][piece.index()];
                by_color[color.index()] |= bb;
                while bb != 0 {
                    piece_on[lsb(bb) as usize] = Some(piece);
                    bb &= bb - 1;
                }
            }
        }

        self.piece_on = piece_on;
        self.occupancy_by_color = by_color;
        self.occupancy_all = by_color[0] | by_color[1];
        self.hash = zobrist::compute_hash(self);
        self.history.clear();
        self.repetition_counts.clear();
        self.repetition_counts.insert(self.hash, 1);
    }

    /// Apply a move assumed legal for the side to move. Passing an illegal
    /// or malformed move violates the caller contract and corrupts no state
    /// only by luck; the generator is the sole intended producer of moves.
    pub fn make_move(&mut self, mv: Move) {
        let us = self.side_to_move;
        let them = us.opposite();
        let from = mv.from();
        let to = mv.to();

        let Some(moved_piece) = self.piece_on[from as usize] else {
            debug_assert!(false, "make_move from an empty square");
            return;
        };

        let victim_square = if mv.is_en_passant() {
            match us {
                Color::White => to - 8,
                Color::Black => to + 8,
            }
        } else {
            to
        };

        let captured_piece = if mv.is_capture() {
            self.piece_on[victim_square as usize]
        } else {
            None
        };

        self.history.push(UndoState {
            mv,
            moved_piece,
            captured_piece,
            castling_rights: self.castling_rights,
            en_passant_square: self.en_passant_square,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            hash: self.hash,
        });

        // State-flag keys come out before mutation and go back in after.
        self.hash ^= zobrist::castling_key(self.castling_rights);
        if let Some(ep) = self.en_passant_square {
            self.hash ^= zobrist::en_passant_file_key(ep % 8);
        }

        self.remove_piece(us, moved_piece, from);
        self.hash ^= zobrist::piece_square_key(us, moved_piece, from);

        if let Some(captured) = captured_piece {
            self.remove_piece(them, captured, victim_square);
            self.hash ^= zobrist::piece_square_key(them, captured, victim_square);
        }

        let placed_piece = mv.promotion_piece().unwrap_or(moved_piece);
        self.put_piece(us, placed_piece, to);
        self.hash ^= zobrist::piece_square_key(us, placed_piece, to);

        if mv.is_kingside_castle() {
            self.relocate_rook(us, to + 1, to - 1);
        } else if mv.is_queenside_castle() {
            self.relocate_rook(us, to - 2, to + 1);
        }

        self.castling_rights &=
            CASTLING_RIGHTS_MASK[from as usize] & CASTLING_RIGHTS_MASK[to as usize];
        self.hash ^= zobrist::castling_key(self.castling_rights);

        self.en_passant_square = if mv.is_double_pawn_push() {
            Some((from + to) / 2)
        } else {
            None
        };
        if let Some(ep) = self.en_passant_square {
            self.hash ^= zobrist::en_passant_file_key(ep % 8);
        }

        if moved_piece == PieceKind::Pawn || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Color::Black {
            self.fullmove_number += 1;
        }

        self.side_to_move = them;
        self.hash ^= zobrist::side_to_move_key();

        *self.repetition_counts.entry(self.hash).or_insert(0) += 1;
    }

    /// Undo the most recent `make_move`, restoring every field exactly.
    pub fn unmake_move(&mut self) -> Result<(), BoardError> {
        let undo = self.history.pop().ok_or(BoardError::EmptyHistory)?;

        if let Some(count) = self.repetition_counts.get_mut(&self.hash) {
            *count -= 1;
            if *count == 0 {
                self.repetition_counts.remove(&self.hash);
            }
        }

        let us = self.side_to_move.opposite();
        let them = self.side_to_move;
        let mv = undo.mv;
        let from = mv.from();
        let to = mv.to();

        let placed_piece = mv.promotion_piece().unwrap_or(undo.moved_piece);
        self.remove_piece(us, placed_piece, to);
        self.put_piece(us, undo.moved_piece, from);

        if let Some(captured) = undo.captured_piece {
            let victim_square = if mv.is_en_passant() {
                match us {
                    Color::White => to - 8,
                    Color::Black => to + 8,
                }
            } else {
                to
            };
            self.put_piece(them, captured, victim_square);
        }

        if mv.is_kingside_castle() {
            self.relocate_rook(us, to - 1, to + 1);
        } else if mv.is_queenside_castle() {
            self.relocate_rook(us, to + 1, to - 2);
        }

        self.side_to_move = us;
        self.castling_rights = undo.castling_rights;
        self.en_passant_square = undo.en_passant_square;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;
        self.hash = undo.hash;

        Ok(())
    }

    /// Pass the turn without moving, for null-move pruning. Returns the prior
    /// en-passant square, which the caller hands back to `unmake_null_move`.
    pub fn make_null_move(&mut self) -> Option<Square> {
        let prior_ep = self.en_passant_square;
        if let Some(ep) = prior_ep {
            self.hash ^= zobrist::en_passant_file_key(ep % 8);
        }
        self.en_passant_square = None;
        self.side_to_move = self.side_to_move.opposite();
        self.hash ^= zobrist::side_to_move_key();
        prior_ep
    }

    pub fn unmake_null_move(&mut self, prior_ep: Option<Square>) {
        self.hash ^= zobrist::side_to_move_key();
        self.side_to_move = self.side_to_move.opposite();
        self.en_passant_square = prior_ep;
        if let Some(ep) = prior_ep {
            self.hash ^= zobrist::en_passant_file_key(ep % 8);
        }
    }

    /// Is `square` attacked by any piece of color `by`, on the current
    /// occupancy? Works by generating attacks outward from the square.
    pub fn is_square_attacked(&self, square: Square, by: Color) -> bool {
        let attacker = &self.pieces[by.index()];

        if pawn_attacks(by.opposite(), square) & attacker[PieceKind::Pawn.index()] != 0 {
            return true;
        }
        if knight_attacks(square) & attacker[PieceKind::Knight.index()] != 0 {
            return true;
        }
        if king_attacks(square) & attacker[PieceKind::King.index()] != 0 {
            return true;
        }

        let diagonal_sliders =
            attacker[PieceKind::Bishop.index()] | attacker[PieceKind::Queen.index()];
        if bishop_attacks(square, self.occupancy_all) & diagonal_sliders != 0 {
            return true;
        }

        let straight_sliders =
            attacker[PieceKind::Rook.index()] | attacker[PieceKind::Queen.index()];
        rook_attacks(square, self.occupancy_all) & straight_sliders != 0
    }

    #[inline]
    pub fn is_in_check(&self, color: Color) -> bool {
        let king_bb = self.pieces[color.index()][PieceKind::King.index()];
        if king_bb == 0 {
            return false;
        }
        self.is_square_attacked(lsb(king_bb), color.opposite())
    }

    /// True once the current position's hash has occurred three times,
    /// counting the root position set up from the descriptor.
    #[inline]
    pub fn is_repetition(&self) -> bool {
        self.repetition_counts.get(&self.hash).copied().unwrap_or(0) >= 3
    }

    #[inline]
    pub fn fifty_move_rule(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Cheap dead-position test: bare kings, or king versus king plus one
    /// minor piece. Positions with more material are never reported drawn
    /// here even when no mate is possible.
    pub fn insufficient_material(&self) -> bool {
        match pop_count(self.occupancy_all) {
            2 => true,
            3 => {
                let minors = self.pieces[0][PieceKind::Knight.index()]
                    | self.pieces[1][PieceKind::Knight.index()]
                    | self.pieces[0][PieceKind::Bishop.index()]
                    | self.pieces[1][PieceKind::Bishop.index()];
                minors != 0
            }
            _ => false,
        }
    }

    #[inline]
    pub fn is_draw(&self) -> bool {
        self.is_repetition() || self.fifty_move_rule() || self.insufficient_material()
    }

    #[inline]
    fn put_piece(&mut self, color: Color, piece: PieceKind, square: Square) {
        let bb = square_bb(square);
        self.pieces[color.index()][piece.index()] |= bb;
        self.occupancy_by_color[color.index()] |= bb;
        self.occupancy_all |= bb;
        self.piece_on[square as usize] = Some(piece);
    }

    #[inline]
    fn remove_piece(&mut self, color: Color, piece: PieceKind, square: Square) {
        let bb = square_bb(square);
        self.pieces[color.index()][piece.index()] &= !bb;
        self.occupancy_by_color[color.index()] &= !bb;
        self.occupancy_all &= !bb;
        self.piece_on[square as usize] = None;
    }

    #[inline]
    fn relocate_rook(&mut self, color: Color, from: Square, to: Square) {
        self.remove_piece(color, PieceKind::Rook, from);
        self.put_piece(color, PieceKind::Rook, to);
        self.hash ^= zobrist::piece_square_key(color, PieceKind::Rook, from);
        self.hash ^= zobrist::piece_square_key(color, PieceKind::Rook, to);
    }
}
