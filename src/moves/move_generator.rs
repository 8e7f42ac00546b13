//! Move generation: pseudo-legal, legal, and capture-only, plus perft.
//!
//! Pseudo-legal generation is pure shift-and-mask work against the board's
//! bitboards. Legality is established by trial make/unmake with a check
//! query in between; a fast path rejects king steps onto attacked squares
//! before mutating anything. Castling is emitted fully validated (rights,
//! empty transit, no attacked square on the king's path), so the trial
//! filter never has to special-case it.

use std::error::Error;
use std::fmt;

use crate::board::attack_tables::{king_attacks, knight_attacks, pawn_attacks};
use crate::board::bitboard::{
    bishop_attacks, clear_lsb, lsb, queen_attacks, rook_attacks, square_bb, FILE_A, FILE_H,
    RANK_1, RANK_8,
};
use crate::board::board::Board;
use crate::board::chess_types::{
    Color, PieceKind, Square, CASTLE_BLACK_KINGSIDE, CASTLE_BLACK_QUEENSIDE,
    CASTLE_WHITE_KINGSIDE, CASTLE_WHITE_QUEENSIDE,
};
use crate::moves::move_encoding::Move;

const RANK_3: u64 = RANK_1 << 16;
const RANK_6: u64 = RANK_8 >> 16;

pub type MoveGenResult<T> = Result<T, MoveGenerationError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveGenerationError {
    InvalidState(String),
}

impl fmt::Display for MoveGenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveGenerationError::InvalidState(msg) => write!(f, "invalid board state: {msg}"),
        }
    }
}

impl Error for MoveGenerationError {}

/// Every move the side to move could make ignoring king safety.
pub fn generate_pseudo_legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);

    generate_pawn_moves(board, &mut moves);
    generate_knight_moves(board, &mut moves);
    generate_slider_moves(board, &mut moves);
    generate_king_moves(board, &mut moves);
    generate_castling_moves(board, &mut moves);

    moves
}

/// Pseudo-legal moves filtered down to those that leave the mover's king
/// safe. Mutates the board transiently; it is restored before returning.
pub fn generate_legal_moves(board: &mut Board) -> MoveGenResult<Vec<Move>> {
    let pseudo = generate_pseudo_legal_moves(board);
    filter_legal(board, pseudo)
}

/// The capture-and-promotion subset of legal moves, for quiescence.
pub fn generate_legal_captures(board: &mut Board) -> MoveGenResult<Vec<Move>> {
    let mut pseudo = generate_pseudo_legal_moves(board);
    pseudo.retain(|mv| mv.is_capture() || mv.is_promotion());
    filter_legal(board, pseudo)
}

/// Count leaf nodes of the legal move tree to `depth`.
pub fn perft(board: &mut Board, depth: u8) -> MoveGenResult<u64> {
    if depth == 0 {
        return Ok(1);
    }

    let moves = generate_legal_moves(board)?;
    if depth == 1 {
        return Ok(moves.len() as u64);
    }

    let mut nodes = 0u64;
    for mv in moves {
        board.make_move(mv);
        nodes += perft(board, depth - 1)?;
        unmake_or_invalid_state(board)?;
    }

    Ok(nodes)
}

fn filter_legal(board: &mut Board, pseudo: Vec<Move>) -> MoveGenResult<Vec<Move>> {
    let us = board.side_to_move;
    let them = us.opposite();
    let mut legal = Vec::with_capacity(pseudo.len());

    for mv in pseudo {
        // A non-castling king step onto an attacked square can never survive
        // the trial below, so skip the make/unmake for it.
        if !mv.is_castle()
            && board.piece_at(mv.from()) == Some(PieceKind::King)
            && board.is_square_attacked(mv.to(), them)
        {
            continue;
        }

        board.make_move(mv);
        let leaves_king_in_check = board.is_in_check(us);
        unmake_or_invalid_state(board)?;

        if !leaves_king_in_check {
            legal.push(mv);
        }
    }

    Ok(legal)
}

#[inline]
fn unmake_or_invalid_state(board: &mut Board) -> MoveGenResult<()> {
    board
        .unmake_move()
        .map_err(|e| MoveGenerationError::InvalidState(format!("unmake_move failed: {e}")))
}

fn generate_pawn_moves(board: &Board, moves: &mut Vec<Move>) {
    let us = board.side_to_move;
    let them = us.opposite();
    let pawns = board.pieces[us.index()][PieceKind::Pawn.index()];
    let empty = !board.occupancy_all;
    let enemy = board.occupancy_by_color[them.index()];

    let (promotion_rank, single_push, double_push, west_capture, east_capture);
    match us {
        Color::White => {
            promotion_rank = RANK_8;
            single_push = (pawns << 8) & empty;
            double_push = ((single_push & RANK_3) << 8) & empty;
            west_capture = (((pawns & !FILE_A) << 7) & enemy, 7i8);
            east_capture = (((pawns & !FILE_H) << 9) & enemy, 9i8);
        }
        Color::Black => {
            promotion_rank = RANK_1;
            single_push = (pawns >> 8) & empty;
            double_push = ((single_push & RANK_6) >> 8) & empty;
            west_capture = (((pawns & !FILE_A) >> 9) & enemy, -9i8);
            east_capture = (((pawns & !FILE_H) >> 7) & enemy, -7i8);
        }
    }

    let push_delta: i8 = match us {
        Color::White => 8,
        Color::Black => -8,
    };

    let mut targets = single_push;
    while targets != 0 {
        let to = lsb(targets);
        targets = clear_lsb(targets);
        let from = (to as i8 - push_delta) as Square;
        if square_bb(to) & promotion_rank != 0 {
            push_promotions(moves, from, to, false);
        } else {
            moves.push(Move::quiet(from, to));
        }
    }

    let mut targets = double_push;
    while targets != 0 {
        let to = lsb(targets);
        targets = clear_lsb(targets);
        let from = (to as i8 - 2 * push_delta) as Square;
        moves.push(Move::double_pawn_push(from, to));
    }

    for (captures, delta) in [west_capture, east_capture] {
        let mut targets = captures;
        while targets != 0 {
            let to = lsb(targets);
            targets = clear_lsb(targets);
            let from = (to as i8 - delta) as Square;
            if square_bb(to) & promotion_rank != 0 {
                push_promotions(moves, from, to, true);
            } else {
                moves.push(Move::capture(from, to));
            }
        }
    }

    if let Some(ep_square) = board.en_passant_square {
        // A pawn of ours attacks the en-passant target exactly when the
        // target square's reverse pawn attack reaches it.
        let mut attackers = pawn_attacks(them, ep_square) & pawns;
        while attackers != 0 {
            let from = lsb(attackers);
            attackers = clear_lsb(attackers);
            moves.push(Move::en_passant_capture(from, ep_square));
        }
    }
}

fn push_promotions(moves: &mut Vec<Move>, from: Square, to: Square, is_capture: bool) {
    for piece in [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ] {
        moves.push(if is_capture {
            Move::promotion_capture(from, to, piece)
        } else {
            Move::promotion(from, to, piece)
        });
    }
}

fn generate_knight_moves(board: &Board, moves: &mut Vec<Move>) {
    let us = board.side_to_move;
    let mut knights = board.pieces[us.index()][PieceKind::Knight.index()];

    while knights != 0 {
        let from = lsb(knights);
        knights = clear_lsb(knights);
        push_targets(board, from, knight_attacks(from), moves);
    }
}

fn generate_slider_moves(board: &Board, moves: &mut Vec<Move>) {
    let us = board.side_to_move;
    let occ = board.occupancy_all;

    for (piece, attacks) in [
        (PieceKind::Bishop, bishop_attacks as fn(Square, u64) -> u64),
        (PieceKind::Rook, rook_attacks),
        (PieceKind::Queen, queen_attacks),
    ] {
        let mut sliders = board.pieces[us.index()][piece.index()];
        while sliders != 0 {
            let from = lsb(sliders);
            sliders = clear_lsb(sliders);
            push_targets(board, from, attacks(from, occ), moves);
        }
    }
}

fn generate_king_moves(board: &Board, moves: &mut Vec<Move>) {
    let us = board.side_to_move;
    let kings = board.pieces[us.index()][PieceKind::King.index()];
    if kings == 0 {
        return;
    }
    let from = lsb(kings);
    push_targets(board, from, king_attacks(from), moves);
}

fn push_targets(board: &Board, from: Square, attacks: u64, moves: &mut Vec<Move>) {
    let us = board.side_to_move;
    let enemy = board.occupancy_by_color[us.opposite().index()];
    let mut targets = attacks & !board.occupancy_by_color[us.index()];

    while targets != 0 {
        let to = lsb(targets);
        targets = clear_lsb(targets);
        moves.push(if square_bb(to) & enemy != 0 {
            Move::capture(from, to)
        } else {
            Move::quiet(from, to)
        });
    }
}

fn generate_castling_moves(board: &Board, moves: &mut Vec<Move>) {
    let us = board.side_to_move;
    let them = us.opposite();
    let occ = board.occupancy_all;
    let rights = board.castling_rights;

    let (kingside_right, queenside_right, king_square) = match us {
        Color::White => (CASTLE_WHITE_KINGSIDE, CASTLE_WHITE_QUEENSIDE, 4u8),
        Color::Black => (CASTLE_BLACK_KINGSIDE, CASTLE_BLACK_QUEENSIDE, 60u8),
    };

    let kingside_transit = (square_bb(king_square + 1)) | square_bb(king_square + 2);
    let queenside_transit =
        square_bb(king_square - 1) | square_bb(king_square - 2) | square_bb(king_square - 3);

    if rights & kingside_right != 0
        && occ & kingside_transit == 0
        && !board.is_square_attacked(king_square, them)
        && !board.is_square_attacked(king_square + 1, them)
        && !board.is_square_attacked(king_square + 2, them)
    {
        moves.push(Move::castle_kingside(king_square, king_square + 2));
    }

    // The b-file square only has to be empty; the king never crosses it.
    if rights & queenside_right != 0
        && occ & queenside_transit == 0
        && !board.is_square_attacked(king_square, them)
        && !board.is_square_attacked(king_square - 1, them)
        && !board.is_square_attacked(king_square - 2, them)
    {
        moves.push(Move::castle_queenside(king_square, king_square - 2));
    }
}
