//! Published perft node counts as a full-pipeline correctness check.
//!
//! A matching count exercises pawn pushes, captures, castling, en passant,
//! promotions, pins, and the legality filter all at once.

use garnet_chess::board::board::Board;
use garnet_chess::moves::move_generator::perft;

const KIWIPETE_FEN: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

#[test]
fn perft_startpos_matches_published_counts() {
    let mut board = Board::new_game();
    assert_eq!(perft(&mut board, 1).expect("perft should run"), 20);
    assert_eq!(perft(&mut board, 2).expect("perft should run"), 400);
    assert_eq!(perft(&mut board, 3).expect("perft should run"), 8_902);
    assert_eq!(perft(&mut board, 4).expect("perft should run"), 197_281);
}

#[test]
fn perft_kiwipete_matches_published_counts() {
    let mut board = Board::from_fen(KIWIPETE_FEN).expect("FEN should parse");
    assert_eq!(perft(&mut board, 1).expect("perft should run"), 48);
    assert_eq!(perft(&mut board, 2).expect("perft should run"), 2_039);
}

#[test]
fn perft_endgame_position_with_en_passant_traps() {
    let mut board =
        Board::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").expect("FEN should parse");
    assert_eq!(perft(&mut board, 1).expect("perft should run"), 14);
    assert_eq!(perft(&mut board, 2).expect("perft should run"), 191);
    assert_eq!(perft(&mut board, 3).expect("perft should run"), 2_812);
}

#[test]
fn perft_promotion_heavy_position() {
    let mut board =
        Board::from_fen("n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1").expect("FEN should parse");
    assert_eq!(perft(&mut board, 1).expect("perft should run"), 24);
    assert_eq!(perft(&mut board, 2).expect("perft should run"), 496);
    assert_eq!(perft(&mut board, 3).expect("perft should run"), 9_483);
}

#[test]
fn perft_leaves_the_board_unchanged() {
    let mut board = Board::from_fen(KIWIPETE_FEN).expect("FEN should parse");
    let before = board.to_fen();
    perft(&mut board, 3).expect("perft should run");
    assert_eq!(board.to_fen(), before);
}
