//! Move ordering heuristics for the alpha-beta search.
//!
//! Moves are scored into descending buckets: principal-variation move, hash
//! move, killer moves at the current ply, promotions, captures by MVV-LVA,
//! then quiet moves by accumulated history. Ordering only permutes the list;
//! it never changes the move set or the minimax value.

use std::cmp::Reverse;

use crate::board::board::Board;
use crate::board::chess_types::PieceKind;
use crate::moves::move_encoding::Move;
use crate::search::evaluator::MaterialEvaluator;

pub const MAX_PLY: usize = 64;

const PV_SCORE: i32 = 1_000_000;
const TT_SCORE: i32 = 900_000;
const KILLER_SCORE: i32 = 800_000;
const PROMOTION_SCORE: i32 = 700_000;
const CAPTURE_SCORE: i32 = 600_000;

/// Killer and history state owned by one searcher, reset between searches.
#[derive(Debug, Clone)]
pub struct MoveOrdering {
    killers: [[Option<Move>; 2]; MAX_PLY],
    history: [[i32; 64]; 6],
}

impl Default for MoveOrdering {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveOrdering {
    pub fn new() -> Self {
        Self {
            killers: [[None; 2]; MAX_PLY],
            history: [[0; 64]; 6],
        }
    }

    pub fn clear(&mut self) {
        self.killers = [[None; 2]; MAX_PLY];
        self.history = [[0; 64]; 6];
    }

    /// Remember a quiet move that produced a beta cutoff at `ply`.
    pub fn record_killer(&mut self, ply: usize, mv: Move) {
        if ply >= MAX_PLY {
            return;
        }
        let slot = &mut self.killers[ply];
        if slot[0] != Some(mv) {
            slot[1] = slot[0];
            slot[0] = Some(mv);
        }
    }

    /// Reward the (piece, destination) pair of a quiet cutoff move.
    pub fn record_history(&mut self, piece: PieceKind, mv: Move, depth: u8) {
        let bonus = (depth as i32) * (depth as i32);
        self.history[piece.index()][mv.to() as usize] += bonus;
    }

    pub fn is_killer(&self, ply: usize, mv: Move) -> bool {
        ply < MAX_PLY && self.killers[ply].contains(&Some(mv))
    }

    /// Sort `moves` best-first for the full search.
    pub fn order_moves(
        &self,
        board: &Board,
        moves: &mut [Move],
        ply: usize,
        pv_move: Option<Move>,
        tt_move: Option<Move>,
    ) {
        moves.sort_unstable_by_key(|&mv| {
            Reverse(self.score_move(board, mv, ply, pv_move, tt_move))
        });
    }

    /// Sort a capture list by MVV-LVA for quiescence.
    pub fn order_captures(&self, board: &Board, moves: &mut [Move]) {
        moves.sort_unstable_by_key(|&mv| Reverse(mvv_lva(board, mv)));
    }

    fn score_move(
        &self,
        board: &Board,
        mv: Move,
        ply: usize,
        pv_move: Option<Move>,
        tt_move: Option<Move>,
    ) -> i32 {
        if pv_move == Some(mv) {
            return PV_SCORE;
        }
        if tt_move == Some(mv) {
            return TT_SCORE;
        }
        if ply < MAX_PLY {
            if self.killers[ply][0] == Some(mv) {
                return KILLER_SCORE;
            }
            if self.killers[ply][1] == Some(mv) {
                return KILLER_SCORE - 1;
            }
        }
        if mv.is_promotion() {
            let piece_value = mv
                .promotion_piece()
                .map(MaterialEvaluator::piece_value)
                .unwrap_or(0);
            return PROMOTION_SCORE + piece_value;
        }
        if mv.is_capture() {
            return CAPTURE_SCORE + mvv_lva(board, mv);
        }

        match board.piece_at(mv.from()) {
            Some(piece) => self.history[piece.index()][mv.to() as usize],
            None => 0,
        }
    }
}

/// Most-valuable-victim, least-valuable-attacker score. The en-passant
/// victim square is empty, so it falls back to a pawn victim.
fn mvv_lva(board: &Board, mv: Move) -> i32 {
    let victim = board
        .piece_at(mv.to())
        .map(MaterialEvaluator::piece_value)
        .unwrap_or(MaterialEvaluator::piece_value(PieceKind::Pawn));
    let attacker = board
        .piece_at(mv.from())
        .map(MaterialEvaluator::piece_value)
        .unwrap_or(0);
    victim * 10 - attacker
}

#[cfg(test)]
mod tests {
    use super::MoveOrdering;
    use crate::board::board::Board;
    use crate::board::chess_types::PieceKind;
    use crate::moves::move_encoding::Move;
    use crate::moves::move_generator::generate_legal_moves;

    #[test]
    fn pv_and_tt_moves_sort_first() {
        let mut board = Board::new_game();
        let mut moves = generate_legal_moves(&mut board).expect("generation should succeed");
        let pv = Move::double_pawn_push(12, 28);
        let tt = Move::quiet(6, 21);

        MoveOrdering::new().order_moves(&board, &mut moves, 0, Some(pv), Some(tt));
        assert_eq!(moves[0], pv);
        assert_eq!(moves[1], tt);
    }

    #[test]
    fn captures_order_by_most_valuable_victim() {
        // White pawn can take the queen or the rook; knight can take the rook.
        let mut board =
            Board::from_fen("4k3/8/8/2q1r3/3P2N1/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let mut moves = generate_legal_moves(&mut board).expect("generation should succeed");

        MoveOrdering::new().order_moves(&board, &mut moves, 0, None, None);
        let queen_capture = Move::capture(27, 34);
        assert_eq!(moves[0], queen_capture, "pawn takes queen first");
        assert!(moves[1].is_capture(), "rook captures follow");
    }

    #[test]
    fn killers_outrank_ordinary_quiet_moves() {
        let mut board = Board::new_game();
        let mut moves = generate_legal_moves(&mut board).expect("generation should succeed");
        let killer = Move::quiet(1, 18);

        let mut ordering = MoveOrdering::new();
        ordering.record_killer(3, killer);
        assert!(ordering.is_killer(3, killer));

        ordering.order_moves(&board, &mut moves, 3, None, None);
        assert_eq!(moves[0], killer);
    }

    #[test]
    fn history_breaks_ties_between_quiet_moves() {
        let mut board = Board::new_game();
        let mut moves = generate_legal_moves(&mut board).expect("generation should succeed");
        let rewarded = Move::quiet(12, 20);

        let mut ordering = MoveOrdering::new();
        ordering.record_history(PieceKind::Pawn, rewarded, 6);

        ordering.order_moves(&board, &mut moves, 0, None, None);
        assert_eq!(moves[0], rewarded);
    }

    #[test]
    fn clear_resets_heuristics() {
        let mut ordering = MoveOrdering::new();
        ordering.record_killer(0, Move::quiet(0, 1));
        ordering.clear();
        assert!(!ordering.is_killer(0, Move::quiet(0, 1)));
    }
}
