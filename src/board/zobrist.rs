//! Zobrist hashing for position identity and repetition tracking.
//!
//! Keys come from a seeded generator so hashes are deterministic across runs,
//! which keeps transposition-table and repetition tests reproducible.

use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::board::board::Board;
use crate::board::chess_types::{CastlingRights, Color, PieceKind, Square};

const KEY_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug)]
struct ZobristTables {
    piece_square: [[[u64; 64]; 6]; 2],
    side_to_move: u64,
    castling: [u64; 16],
    en_passant_file: [u64; 8],
}

static TABLES: OnceLock<ZobristTables> = OnceLock::new();

#[inline]
fn tables() -> &'static ZobristTables {
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> ZobristTables {
    let mut rng = StdRng::seed_from_u64(KEY_SEED);

    let mut piece_square = [[[0u64; 64]; 6]; 2];
    for color in &mut piece_square {
        for piece in color {
            for sq in piece {
                *sq = rng.next_u64();
            }
        }
    }

    let side_to_move = rng.next_u64();

    let mut castling = [0u64; 16];
    for key in &mut castling {
        *key = rng.next_u64();
    }

    let mut en_passant_file = [0u64; 8];
    for key in &mut en_passant_file {
        *key = rng.next_u64();
    }

    ZobristTables {
        piece_square,
        side_to_move,
        castling,
        en_passant_file,
    }
}

/// Key for a `(color, piece, square)` occupancy term.
#[inline]
pub fn piece_square_key(color: Color, piece: PieceKind, square: Square) -> u64 {
    tables().piece_square[color.index()][piece.index()][square as usize]
}

/// Key contribution for a castling-rights mask (`0..=15`).
#[inline]
pub fn castling_key(castling_rights: CastlingRights) -> u64 {
    tables().castling[(castling_rights & 0x0F) as usize]
}

/// Key contribution for a valid en-passant file.
#[inline]
pub fn en_passant_file_key(file: u8) -> u64 {
    tables().en_passant_file[file as usize]
}

/// Side-to-move toggle key (xor in when black is to move).
#[inline]
pub fn side_to_move_key() -> u64 {
    tables().side_to_move
}

/// Compute the full position key from scratch. The board's incrementally
/// maintained hash must always equal this value.
pub fn compute_hash(board: &Board) -> u64 {
    let mut key = 0u64;

    for color in [Color::White, Color::Black] {
        for piece in PieceKind::ALL {
            let mut bb = board.pieces[color.index()][piece.index()];
            while bb != 0 {
                let sq = bb.trailing_zeros() as Square;
                key ^= piece_square_key(color, piece, sq);
                bb &= bb - 1;
            }
        }
    }

    if board.side_to_move == Color::Black {
        key ^= side_to_move_key();
    }

    key ^= castling_key(board.castling_rights);

    if let Some(ep_square) = board.en_passant_square {
        key ^= en_passant_file_key(ep_square % 8);
    }

    key
}
