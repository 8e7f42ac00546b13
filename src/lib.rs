//! Crate root module declarations for the Garnet Chess engine.
//!
//! Exposes the board model, move generation, search, and the external
//! engine facade so tests and collaborating frontends can import stable
//! module paths.

pub mod board {
    pub mod attack_tables;
    pub mod bitboard;
    #[allow(clippy::module_inception)]
    pub mod board;
    pub mod chess_types;
    pub mod undo_state;
    pub mod zobrist;
}

pub mod moves {
    pub mod move_encoding;
    pub mod move_generator;
}

pub mod search {
    pub mod evaluator;
    pub mod move_ordering;
    pub mod searcher;
    pub mod transposition_table;
}

pub mod engine;

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod render_board;
}
