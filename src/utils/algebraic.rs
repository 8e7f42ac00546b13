//! Conversions between internal squares/moves and coordinate notation.

use crate::board::chess_types::{PieceKind, Square};
use crate::moves::move_encoding::Move;

/// Convert coordinate notation (for example: "e4") to a square index.
#[inline]
pub fn algebraic_to_square(square: &str) -> Result<Square, String> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return Err(format!("Invalid algebraic square: {square}"));
    }

    let file = bytes[0];
    let rank = bytes[1];

    if !(b'a'..=b'h').contains(&file) {
        return Err(format!("Invalid algebraic file: {}", file as char));
    }
    if !(b'1'..=b'8').contains(&rank) {
        return Err(format!("Invalid algebraic rank: {}", rank as char));
    }

    Ok((rank - b'1') * 8 + (file - b'a'))
}

/// Convert a square index (`0..=63`) to coordinate notation (for example: "e4").
#[inline]
pub fn square_to_algebraic(square: Square) -> Result<String, String> {
    if square > 63 {
        return Err(format!("Square index out of bounds: {square}"));
    }

    let file_char = char::from(b'a' + square % 8);
    let rank_char = char::from(b'1' + square / 8);
    Ok(format!("{file_char}{rank_char}"))
}

/// Render a move as `<from><to>[promotion]`, e.g. "e2e4" or "e7e8q".
pub fn move_to_coordinate(mv: Move) -> Result<String, String> {
    let mut out = square_to_algebraic(mv.from())?;
    out.push_str(&square_to_algebraic(mv.to())?);
    if let Some(piece) = mv.promotion_piece() {
        out.push(promotion_char(piece));
    }
    Ok(out)
}

fn promotion_char(piece: PieceKind) -> char {
    match piece {
        PieceKind::Knight => 'n',
        PieceKind::Bishop => 'b',
        PieceKind::Rook => 'r',
        _ => 'q',
    }
}
