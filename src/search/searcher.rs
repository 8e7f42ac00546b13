//! Iterative deepening negamax search.
//!
//! Depth-progressive search that refines its best move one ply at a time and
//! only ever commits the result of a fully completed iteration. Heuristics,
//! in the order they fire inside a node: draw scoring, transposition-table
//! probe (cutoffs at non-PV nodes only), quiescence delegation, null-move
//! pruning, principal-variation search with late-move reductions, futility
//! pruning at the frontier, check extension, and killer/history updates on
//! quiet beta cutoffs. The deadline and stop flag are polled every 2048
//! nodes; an expired search unwinds without committing partial results.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::board::board::Board;
use crate::board::chess_types::PieceKind;
use crate::moves::move_encoding::Move;
use crate::moves::move_generator::{
    generate_legal_captures, generate_legal_moves, MoveGenResult, MoveGenerationError,
};
use crate::search::evaluator::{Evaluator, MATE_SCORE};
use crate::search::move_ordering::{MoveOrdering, MAX_PLY};
use crate::search::transposition_table::{Bound, TranspositionTable, TtEntry, TtStats};

const MATE_TT_THRESHOLD: i32 = MATE_SCORE - 1000;
const ASPIRATION_HALF_WIDTH: i32 = 50;
const FUTILITY_MARGIN: i32 = 150;
const NULL_MOVE_MIN_DEPTH: u8 = 3;
const LMR_MIN_DEPTH: u8 = 3;
const LMR_MOVE_THRESHOLD: usize = 4;
const ABORT_POLL_MASK: u64 = 2047;

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub max_depth: u8,
    pub movetime_ms: Option<u64>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            movetime_ms: None,
            stop_flag: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub best_score: i32,
    pub reached_depth: u8,
    pub nodes: u64,
    pub elapsed_ms: u64,
    pub nps: u64,
    pub principal_variation: Vec<Move>,
    pub tt_stats: TtStats,
}

/// One searcher owns one transposition table and one set of ordering
/// heuristics. A `Searcher` must not be shared between concurrent searches;
/// clone the board instead and give each its own searcher.
#[derive(Debug)]
pub struct Searcher {
    tt: TranspositionTable,
    ordering: MoveOrdering,
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Searcher {
    pub fn new() -> Self {
        Self::with_tt_mb(16)
    }

    pub fn with_tt_mb(size_mb: usize) -> Self {
        Self {
            tt: TranspositionTable::new_with_mb(size_mb),
            ordering: MoveOrdering::new(),
        }
    }

    /// Forget everything learned from previous searches.
    pub fn clear(&mut self) {
        self.tt.clear();
        self.ordering.clear();
    }

    pub fn search<E: Evaluator>(
        &mut self,
        board: &mut Board,
        evaluator: &E,
        config: &SearchConfig,
    ) -> MoveGenResult<SearchResult> {
        let started_at = Instant::now();
        let deadline = config
            .movetime_ms
            .map(|ms| started_at + Duration::from_millis(ms.max(1)));

        if config.max_depth == 0 {
            return Ok(SearchResult {
                best_score: evaluator.evaluate(board),
                nodes: 1,
                elapsed_ms: started_at.elapsed().as_millis() as u64,
                tt_stats: self.tt.stats(),
                ..SearchResult::default()
            });
        }

        self.ordering.clear();

        let mut active = ActiveSearch {
            evaluator,
            tt: &mut self.tt,
            ordering: &mut self.ordering,
            deadline,
            stop_flag: config.stop_flag.clone(),
            nodes: 0,
            aborted: false,
            pv_table: vec![Vec::new(); MAX_PLY + 1],
            prev_pv: Vec::new(),
        };

        let mut result = SearchResult::default();
        let mut prev_score = 0i32;

        for depth in 1..=config.max_depth {
            if active.should_stop() {
                break;
            }

            let Some((best_move, best_score)) =
                active.search_root_with_aspiration(board, depth, prev_score)?
            else {
                break;
            };

            result.best_move = best_move;
            result.best_score = best_score;
            result.reached_depth = depth;
            result.principal_variation = active.pv_table[0].clone();
            active.prev_pv = active.pv_table[0].clone();
            prev_score = best_score;

            // A forced mate either way cannot improve with more depth.
            if best_score.abs() >= MATE_TT_THRESHOLD {
                break;
            }
        }

        result.nodes = active.nodes;
        result.elapsed_ms = started_at.elapsed().as_millis() as u64;
        result.nps = if result.elapsed_ms == 0 {
            0
        } else {
            result.nodes.saturating_mul(1000) / result.elapsed_ms
        };
        result.tt_stats = self.tt.stats();

        Ok(result)
    }
}

struct ActiveSearch<'a, E: Evaluator> {
    evaluator: &'a E,
    tt: &'a mut TranspositionTable,
    ordering: &'a mut MoveOrdering,
    deadline: Option<Instant>,
    stop_flag: Option<Arc<AtomicBool>>,
    nodes: u64,
    aborted: bool,
    pv_table: Vec<Vec<Move>>,
    prev_pv: Vec<Move>,
}

impl<E: Evaluator> ActiveSearch<'_, E> {
    fn should_stop(&self) -> bool {
        if self.aborted {
            return true;
        }
        if let Some(limit) = self.deadline {
            if Instant::now() >= limit {
                return true;
            }
        }
        if let Some(flag) = &self.stop_flag {
            if flag.load(Ordering::Relaxed) {
                return true;
            }
        }
        false
    }

    #[inline]
    fn count_node(&mut self) {
        self.nodes += 1;
        if self.nodes & ABORT_POLL_MASK == 0 && self.should_stop() {
            self.aborted = true;
        }
    }

    fn search_root_with_aspiration(
        &mut self,
        board: &mut Board,
        depth: u8,
        prev_score: i32,
    ) -> MoveGenResult<Option<(Option<Move>, i32)>> {
        if depth == 1 {
            return self.search_root(board, depth, -MATE_SCORE, MATE_SCORE);
        }

        let mut alpha = (prev_score - ASPIRATION_HALF_WIDTH).max(-MATE_SCORE);
        let mut beta = (prev_score + ASPIRATION_HALF_WIDTH).min(MATE_SCORE);

        loop {
            let Some((best_move, score)) = self.search_root(board, depth, alpha, beta)? else {
                return Ok(None);
            };

            // Re-search with the failing bound fully opened; once both sides
            // are open the result is final.
            if score <= alpha && alpha > -MATE_SCORE {
                alpha = -MATE_SCORE;
                continue;
            }
            if score >= beta && beta < MATE_SCORE {
                beta = MATE_SCORE;
                continue;
            }

            return Ok(Some((best_move, score)));
        }
    }

    fn search_root(
        &mut self,
        board: &mut Board,
        depth: u8,
        mut alpha: i32,
        beta: i32,
    ) -> MoveGenResult<Option<(Option<Move>, i32)>> {
        let mut moves = generate_legal_moves(board)?;
        if moves.is_empty() {
            let score = if board.is_in_check(board.side_to_move) {
                -MATE_SCORE
            } else {
                0
            };
            return Ok(Some((None, score)));
        }

        let pv_move = self.prev_pv.first().copied();
        let tt_move = self.tt.probe(board.hash()).and_then(|e| e.best_move);
        self.ordering.order_moves(board, &mut moves, 0, pv_move, tt_move);
        self.pv_table[0].clear();

        let mut best_move = None;
        let mut best_score = -MATE_SCORE;

        for mv in moves {
            if self.should_stop() {
                return Ok(None);
            }

            board.make_move(mv);
            let child = self.negamax(board, depth - 1, -beta, -alpha, 1, true, true);
            unmake_or_invalid_state(board)?;

            let Some(score) = child? else {
                return Ok(None);
            };
            let score = -score;

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            if score > alpha {
                alpha = score;
                self.splice_pv(0, mv);
            }
            if alpha >= beta {
                break;
            }
        }

        Ok(Some((best_move, best_score)))
    }

    /// Fail-soft negamax. `Ok(None)` means the search was aborted and the
    /// value must not be trusted or stored.
    #[allow(clippy::too_many_arguments)]
    fn negamax(
        &mut self,
        board: &mut Board,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        ply: usize,
        is_pv: bool,
        allow_null: bool,
    ) -> MoveGenResult<Option<i32>> {
        self.count_node();
        if self.aborted {
            return Ok(None);
        }
        if ply < self.pv_table.len() {
            self.pv_table[ply].clear();
        }
        if ply >= MAX_PLY {
            return Ok(Some(self.evaluator.evaluate(board)));
        }

        if board.is_draw() {
            return Ok(Some(0));
        }

        let in_check = board.is_in_check(board.side_to_move);
        // Never drop into quiescence while in check.
        let depth = if in_check { depth + 1 } else { depth };

        let alpha_original = alpha;
        let mut tt_move = None;

        if let Some(entry) = self.tt.probe(board.hash()) {
            tt_move = entry.best_move;
            if !is_pv && entry.depth >= depth {
                let score = tt_score_from_storage(entry.score, ply);
                match entry.bound {
                    Bound::Exact => return Ok(Some(score)),
                    Bound::Lower => alpha = alpha.max(score),
                    Bound::Upper => beta = beta.min(score),
                }
                if alpha >= beta {
                    return Ok(Some(score));
                }
            }
        }

        if depth == 0 {
            return self.quiescence(board, alpha, beta, ply);
        }

        if allow_null
            && !is_pv
            && !in_check
            && depth >= NULL_MOVE_MIN_DEPTH
            && has_queen_on_board(board)
        {
            let reduction = if depth > 6 { 3 } else { 2 };
            let prior_ep = board.make_null_move();
            let child = self.negamax(
                board,
                depth - 1 - reduction,
                -beta,
                -beta + 1,
                ply + 1,
                false,
                false,
            );
            board.unmake_null_move(prior_ep);

            if let Some(score) = child? {
                let score = -score;
                if score >= beta {
                    return Ok(Some(score));
                }
            } else {
                return Ok(None);
            }
        }

        let mut moves = generate_legal_moves(board)?;
        if moves.is_empty() {
            return Ok(Some(if in_check { -MATE_SCORE + ply as i32 } else { 0 }));
        }

        let pv_move = if is_pv {
            self.prev_pv.get(ply).copied()
        } else {
            None
        };
        self.ordering.order_moves(board, &mut moves, ply, pv_move, tt_move);

        let futility_applies = depth == 1
            && !in_check
            && self.evaluator.evaluate(board) + FUTILITY_MARGIN <= alpha;

        let mut best_score = -MATE_SCORE;
        let mut best_move = None;

        for (index, mv) in moves.iter().copied().enumerate() {
            let moved_piece = board.piece_at(mv.from());
            let is_quiet = !mv.is_capture() && !mv.is_promotion();

            board.make_move(mv);
            let gives_check = board.is_in_check(board.side_to_move);

            if futility_applies && index > 0 && is_quiet && !gives_check {
                unmake_or_invalid_state(board)?;
                continue;
            }

            let child = if index == 0 {
                self.negamax(board, depth - 1, -beta, -alpha, ply + 1, is_pv, true)
            } else {
                let late_quiet = depth >= LMR_MIN_DEPTH
                    && index >= LMR_MOVE_THRESHOLD
                    && is_quiet
                    && !in_check
                    && !gives_check
                    && Some(mv) != tt_move;
                let reduction = u8::from(late_quiet);

                let mut probe = self.negamax(
                    board,
                    depth - 1 - reduction,
                    -alpha - 1,
                    -alpha,
                    ply + 1,
                    false,
                    true,
                );

                // A reduced probe that raises alpha must be re-searched at
                // full depth before it can be trusted.
                if reduction > 0 {
                    if let Ok(Some(score)) = &probe {
                        if -score > alpha {
                            probe = self.negamax(
                                board,
                                depth - 1,
                                -alpha - 1,
                                -alpha,
                                ply + 1,
                                false,
                                true,
                            );
                        }
                    }
                }
                if is_pv {
                    if let Ok(Some(score)) = &probe {
                        let score = -score;
                        if score > alpha && score < beta {
                            probe = self.negamax(
                                board,
                                depth - 1,
                                -beta,
                                -alpha,
                                ply + 1,
                                true,
                                true,
                            );
                        }
                    }
                }
                probe
            };

            unmake_or_invalid_state(board)?;
            let Some(score) = child? else {
                return Ok(None);
            };
            let score = -score;

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            if score > alpha {
                alpha = score;
                self.splice_pv(ply, mv);
            }
            if alpha >= beta {
                if is_quiet {
                    self.ordering.record_killer(ply, mv);
                    if let Some(piece) = moved_piece {
                        self.ordering.record_history(piece, mv, depth);
                    }
                }
                break;
            }
        }

        let bound = if best_score <= alpha_original {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.tt.store(TtEntry {
            key: board.hash(),
            depth,
            score: tt_score_for_storage(best_score, ply),
            bound,
            best_move,
        });

        Ok(Some(best_score))
    }

    /// Capture-only search that settles tactics before the static evaluation
    /// is trusted.
    fn quiescence(
        &mut self,
        board: &mut Board,
        mut alpha: i32,
        beta: i32,
        ply: usize,
    ) -> MoveGenResult<Option<i32>> {
        self.count_node();
        if self.aborted {
            return Ok(None);
        }
        if ply < self.pv_table.len() {
            self.pv_table[ply].clear();
        }

        let stand_pat = self.evaluator.evaluate(board);
        if stand_pat >= beta || ply >= MAX_PLY {
            return Ok(Some(stand_pat));
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let mut captures = generate_legal_captures(board)?;
        self.ordering.order_captures(board, &mut captures);

        let mut best_score = stand_pat;
        for mv in captures {
            board.make_move(mv);
            let child = self.quiescence(board, -beta, -alpha, ply + 1);
            unmake_or_invalid_state(board)?;

            let Some(score) = child? else {
                return Ok(None);
            };
            let score = -score;

            if score > best_score {
                best_score = score;
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                break;
            }
        }

        Ok(Some(best_score))
    }

    fn splice_pv(&mut self, ply: usize, mv: Move) {
        if ply + 1 >= self.pv_table.len() {
            return;
        }
        let tail = self.pv_table[ply + 1].clone();
        let line = &mut self.pv_table[ply];
        line.clear();
        line.push(mv);
        line.extend(tail);
    }
}

#[inline]
fn has_queen_on_board(board: &Board) -> bool {
    (board.pieces[0][PieceKind::Queen.index()] | board.pieces[1][PieceKind::Queen.index()]) != 0
}

#[inline]
fn unmake_or_invalid_state(board: &mut Board) -> MoveGenResult<()> {
    board
        .unmake_move()
        .map_err(|e| MoveGenerationError::InvalidState(format!("unmake_move failed: {e}")))
}

/// Mate scores are stored relative to the storing node and rebased to the
/// probing node, so a mate found through a transposition still reports the
/// correct distance.
#[inline]
fn tt_score_for_storage(score: i32, ply: usize) -> i32 {
    if score >= MATE_TT_THRESHOLD {
        score.saturating_add(ply as i32)
    } else if score <= -MATE_TT_THRESHOLD {
        score.saturating_sub(ply as i32)
    } else {
        score
    }
}

#[inline]
fn tt_score_from_storage(score: i32, ply: usize) -> i32 {
    if score >= MATE_TT_THRESHOLD {
        score.saturating_sub(ply as i32)
    } else if score <= -MATE_TT_THRESHOLD {
        score.saturating_add(ply as i32)
    } else {
        score
    }
}

#[cfg(test)]
mod tests {
    use super::{SearchConfig, Searcher};
    use crate::board::board::Board;
    use crate::moves::move_encoding::Move;
    use crate::search::evaluator::{TaperedEvaluator, MATE_SCORE};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn search_fen(fen: &str, depth: u8) -> super::SearchResult {
        let mut board = Board::from_fen(fen).expect("FEN should parse");
        let mut searcher = Searcher::with_tt_mb(4);
        let config = SearchConfig {
            max_depth: depth,
            ..SearchConfig::default()
        };
        searcher
            .search(&mut board, &TaperedEvaluator, &config)
            .expect("search should succeed")
    }

    #[test]
    fn depth_zero_returns_static_evaluation_only() {
        let mut board = Board::new_game();
        let mut searcher = Searcher::with_tt_mb(1);
        let config = SearchConfig {
            max_depth: 0,
            ..SearchConfig::default()
        };
        let result = searcher
            .search(&mut board, &TaperedEvaluator, &config)
            .expect("search should succeed");
        assert_eq!(result.best_move, None);
        assert_eq!(result.best_score, 0);
        assert_eq!(result.nodes, 1);
    }

    #[test]
    fn finds_mate_in_one() {
        // Back-rank mate: Ra1-a8, with the h7 rook sealing the seventh rank.
        let result = search_fen("4k3/7R/8/8/8/8/8/R3K3 w - - 0 1", 3);
        assert_eq!(result.best_move, Some(Move::quiet(0, 56)));
        assert!(result.best_score >= MATE_SCORE - 2, "score reports a near mate");
    }

    #[test]
    fn prefers_winning_the_queen() {
        // White rook can take an undefended queen.
        let result = search_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1", 3);
        assert_eq!(result.best_move, Some(Move::capture(3, 35)));
    }

    #[test]
    fn search_result_is_a_legal_move() {
        let result = search_fen(
            "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
            4,
        );
        let mut board = Board::from_fen(
            "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
        )
        .expect("FEN should parse");
        let legal = crate::moves::move_generator::generate_legal_moves(&mut board)
            .expect("generation should succeed");
        let best = result.best_move.expect("a move should be found");
        assert!(legal.contains(&best));
        assert!(result.principal_variation.first() == Some(&best));
    }

    #[test]
    fn repeated_search_with_cleared_tables_is_deterministic() {
        let fen = "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";
        let first = search_fen(fen, 4);
        let second = search_fen(fen, 4);
        assert_eq!(first.best_move, second.best_move);
        assert_eq!(first.best_score, second.best_score);
        assert_eq!(first.nodes, second.nodes);
    }

    #[test]
    fn pre_raised_stop_flag_prevents_any_commitment() {
        let stop = Arc::new(AtomicBool::new(true));
        let mut board = Board::new_game();
        let mut searcher = Searcher::with_tt_mb(1);
        let config = SearchConfig {
            max_depth: 8,
            stop_flag: Some(Arc::clone(&stop)),
            ..SearchConfig::default()
        };
        let result = searcher
            .search(&mut board, &TaperedEvaluator, &config)
            .expect("search should succeed");
        assert_eq!(result.reached_depth, 0);
        assert_eq!(result.best_move, None);
        assert!(stop.load(Ordering::Relaxed));
    }

    #[test]
    fn stalemate_scores_zero() {
        // Black to move, stalemated in the corner.
        let result = search_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", 3);
        assert_eq!(result.best_move, None);
        assert_eq!(result.best_score, 0);
    }

    #[test]
    fn board_is_restored_after_search() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";
        let mut board = Board::from_fen(fen).expect("FEN should parse");
        let mut searcher = Searcher::with_tt_mb(4);
        searcher
            .search(&mut board, &TaperedEvaluator, &SearchConfig::default())
            .expect("search should succeed");
        assert_eq!(board.to_fen(), fen);
    }
}
