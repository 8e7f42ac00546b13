//! Make/unmake reversibility and hash integrity over randomized playouts.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use garnet_chess::board::board::Board;
use garnet_chess::board::zobrist;
use garnet_chess::moves::move_generator::generate_legal_moves;

fn assert_boards_equal(actual: &Board, expected: &Board) {
    assert_eq!(actual.pieces, expected.pieces);
    assert_eq!(actual.occupancy_by_color, expected.occupancy_by_color);
    assert_eq!(actual.occupancy_all, expected.occupancy_all);
    assert_eq!(actual.side_to_move, expected.side_to_move);
    assert_eq!(actual.castling_rights, expected.castling_rights);
    assert_eq!(actual.en_passant_square, expected.en_passant_square);
    assert_eq!(actual.halfmove_clock, expected.halfmove_clock);
    assert_eq!(actual.fullmove_number, expected.fullmove_number);
    assert_eq!(actual.hash(), expected.hash());
}

#[test]
fn random_playout_keeps_incremental_hash_honest() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut board = Board::new_game();

    for _ in 0..200 {
        let moves = generate_legal_moves(&mut board).expect("generation should succeed");
        if moves.is_empty() || board.is_draw() {
            break;
        }
        let mv = moves[rng.next_u64() as usize % moves.len()];
        board.make_move(mv);
        assert_eq!(
            board.hash(),
            zobrist::compute_hash(&board),
            "incremental hash must equal recomputation after {mv:?}"
        );
    }
}

#[test]
fn unwinding_a_random_game_restores_the_root() {
    let mut rng = StdRng::seed_from_u64(7);
    let root = Board::new_game();
    let mut board = root.clone();
    let mut made = 0usize;

    for _ in 0..120 {
        let moves = generate_legal_moves(&mut board).expect("generation should succeed");
        if moves.is_empty() {
            break;
        }
        board.make_move(moves[rng.next_u64() as usize % moves.len()]);
        made += 1;
    }

    for _ in 0..made {
        board.unmake_move().expect("history should not be empty");
    }

    assert_boards_equal(&board, &root);
    assert!(board.unmake_move().is_err(), "history is exhausted");
}

#[test]
fn every_legal_move_round_trips_from_a_tactical_position() {
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    let mut board = Board::from_fen(fen).expect("FEN should parse");
    let reference = board.clone();

    let moves = generate_legal_moves(&mut board).expect("generation should succeed");
    for mv in moves {
        board.make_move(mv);
        assert_eq!(board.hash(), zobrist::compute_hash(&board));
        board.unmake_move().expect("move should be undoable");
        assert_boards_equal(&board, &reference);
    }
}

#[test]
fn fen_round_trip_is_byte_for_byte() {
    for fen in [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "rnbqkbnr/pppp1ppp/8/4p3/8/8/PPPPPPPP/RNBQKBNR w KQkq e6 0 2",
        "4k3/8/8/8/8/8/8/4K3 b - - 42 99",
    ] {
        let board = Board::from_fen(fen).expect("FEN should parse");
        assert_eq!(board.to_fen(), fen);
    }
}
