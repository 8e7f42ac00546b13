//! External facade tying board, generator, and search together.
//!
//! Collaborators (a command loop, a GUI bridge) drive the engine through
//! this narrow surface: set a position, run a bounded search, read the
//! committed best move, and dump the position for diagnostics.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::board::board::Board;
use crate::moves::move_generator::{generate_legal_moves, MoveGenResult, MoveGenerationError};
use crate::search::evaluator::TaperedEvaluator;
use crate::search::searcher::{SearchConfig, SearchResult, Searcher};
use crate::utils::algebraic::move_to_coordinate;

pub struct Engine {
    board: Board,
    searcher: Searcher,
    evaluator: TaperedEvaluator,
    stop_flag: Arc<AtomicBool>,
    last_result: Option<SearchResult>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            board: Board::new_game(),
            searcher: Searcher::new(),
            evaluator: TaperedEvaluator,
            stop_flag: Arc::new(AtomicBool::new(false)),
            last_result: None,
        }
    }

    /// Reset to the starting position and forget all cached search state.
    pub fn new_game(&mut self) {
        self.board = Board::new_game();
        self.searcher.clear();
        self.last_result = None;
        self.stop_flag.store(false, Ordering::Relaxed);
    }

    /// Set up from a FEN descriptor, then replay `moves` given in coordinate
    /// notation (`<from><to>[promotion]`, e.g. "e2e4", "e7e8q"). Each token
    /// is matched against the legal moves of the running position, so an
    /// illegal or malformed token fails with the position unchanged.
    pub fn set_position(&mut self, fen: &str, moves: &[&str]) -> Result<(), String> {
        let mut board = Board::from_fen(fen)?;

        for token in moves {
            let legal = generate_legal_moves(&mut board).map_err(|e| e.to_string())?;
            let Some(mv) = legal
                .into_iter()
                .find(|&mv| move_to_coordinate(mv).as_deref() == Ok(*token))
            else {
                return Err(format!("Illegal or malformed move token: {token}"));
            };
            board.make_move(mv);
        }

        self.board = board;
        self.last_result = None;
        Ok(())
    }

    /// Run a synchronous search bounded by depth and/or time. The committed
    /// result is retained for `get_move`. A cooperative stop requested
    /// through `stop_handle` ends the search at the next poll.
    pub fn start_search(
        &mut self,
        depth_limit: Option<u8>,
        movetime_ms: Option<u64>,
    ) -> MoveGenResult<SearchResult> {
        self.stop_flag.store(false, Ordering::Relaxed);

        let config = SearchConfig {
            max_depth: depth_limit.unwrap_or(SearchConfig::default().max_depth),
            movetime_ms,
            stop_flag: Some(Arc::clone(&self.stop_flag)),
        };

        let result = self
            .searcher
            .search(&mut self.board, &self.evaluator, &config)?;
        self.last_result = Some(result.clone());
        Ok(result)
    }

    /// Raise the cooperative stop flag. The running search unwinds at its
    /// next poll, keeping the last fully completed iteration.
    pub fn stop_search(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Share the stop flag with another thread so it can interrupt a search
    /// running on this one.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_flag)
    }

    /// Coordinate notation of the best move committed by the last search.
    pub fn get_move(&self) -> MoveGenResult<Option<String>> {
        let Some(result) = &self.last_result else {
            return Ok(None);
        };
        let Some(best) = result.best_move else {
            return Ok(None);
        };
        move_to_coordinate(best)
            .map(Some)
            .map_err(MoveGenerationError::InvalidState)
    }

    pub fn last_result(&self) -> Option<&SearchResult> {
        self.last_result.as_ref()
    }

    /// ASCII diagram of the current position.
    pub fn board_string(&self) -> String {
        self.board.render()
    }

    /// FEN descriptor that reconstructs the current position byte-for-byte.
    pub fn position_fen(&self) -> String {
        self.board.to_fen()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }
}
