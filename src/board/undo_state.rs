//! Per-ply snapshot for reversible move application.

use crate::board::chess_types::{CastlingRights, PieceKind, Square};
use crate::moves::move_encoding::Move;

/// Everything `unmake_move` needs to restore the previous position exactly.
/// Pushed before any mutation so a snapshot always describes a clean state.
#[derive(Debug, Clone, Copy)]
pub struct UndoState {
    pub mv: Move,
    pub moved_piece: PieceKind,
    pub captured_piece: Option<PieceKind>,
    pub castling_rights: CastlingRights,
    pub en_passant_square: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
    pub hash: u64,
}
