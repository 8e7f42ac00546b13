use crate::board::board::Board;
use crate::board::chess_types::{
    CastlingRights, Color, PieceKind, Square, CASTLE_BLACK_KINGSIDE, CASTLE_BLACK_QUEENSIDE,
    CASTLE_WHITE_KINGSIDE, CASTLE_WHITE_QUEENSIDE,
};
use crate::utils::algebraic::square_to_algebraic;

pub fn generate_fen(board: &Board) -> String {
    let layout = generate_board_field(board);
    let side_to_move = match board.side_to_move {
        Color::White => "w",
        Color::Black => "b",
    };
    let castling = generate_castling_field(board.castling_rights);
    let en_passant = generate_en_passant_field(board.en_passant_square);

    format!(
        "{} {} {} {} {} {}",
        layout, side_to_move, castling, en_passant, board.halfmove_clock, board.fullmove_number
    )
}

fn generate_board_field(board: &Board) -> String {
    let mut out = String::new();

    for rank in (0..8).rev() {
        let mut empty_count = 0u8;

        for file in 0..8 {
            let sq = (rank * 8 + file) as Square;
            if let Some(ch) = fen_char_on_square(board, sq) {
                if empty_count > 0 {
                    out.push(char::from(b'0' + empty_count));
                    empty_count = 0;
                }
                out.push(ch);
            } else {
                empty_count += 1;
            }
        }

        if empty_count > 0 {
            out.push(char::from(b'0' + empty_count));
        }

        if rank > 0 {
            out.push('/');
        }
    }

    out
}

pub(crate) fn fen_char_on_square(board: &Board, square: Square) -> Option<char> {
    let piece = board.piece_at(square)?;
    let color = board.color_at(square)?;

    let base = match piece {
        PieceKind::Pawn => 'p',
        PieceKind::Knight => 'n',
        PieceKind::Bishop => 'b',
        PieceKind::Rook => 'r',
        PieceKind::Queen => 'q',
        PieceKind::King => 'k',
    };

    Some(match color {
        Color::White => base.to_ascii_uppercase(),
        Color::Black => base,
    })
}

fn generate_castling_field(rights: CastlingRights) -> String {
    let mut out = String::new();

    if (rights & CASTLE_WHITE_KINGSIDE) != 0 {
        out.push('K');
    }
    if (rights & CASTLE_WHITE_QUEENSIDE) != 0 {
        out.push('Q');
    }
    if (rights & CASTLE_BLACK_KINGSIDE) != 0 {
        out.push('k');
    }
    if (rights & CASTLE_BLACK_QUEENSIDE) != 0 {
        out.push('q');
    }

    if out.is_empty() {
        out.push('-');
    }

    out
}

fn generate_en_passant_field(square: Option<Square>) -> String {
    let Some(square) = square else {
        return "-".to_owned();
    };

    square_to_algebraic(square).unwrap_or_else(|_| "-".to_owned())
}

#[cfg(test)]
mod tests {
    use super::generate_fen;
    use crate::board::chess_types::{
        Color, CASTLE_BLACK_KINGSIDE, CASTLE_BLACK_QUEENSIDE, CASTLE_WHITE,
        STARTING_POSITION_FEN,
    };
    use crate::utils::fen_parser::parse_fen;

    #[test]
    fn round_trip_starting_position_fen() {
        let parsed = parse_fen(STARTING_POSITION_FEN).expect("starting FEN should parse");
        let generated = generate_fen(&parsed);

        assert_eq!(generated, STARTING_POSITION_FEN);

        let reparsed = parse_fen(&generated).expect("generated FEN should parse");
        assert_eq!(reparsed.pieces, parsed.pieces);
        assert_eq!(reparsed.side_to_move, parsed.side_to_move);
        assert_eq!(reparsed.castling_rights, parsed.castling_rights);
        assert_eq!(reparsed.en_passant_square, parsed.en_passant_square);
        assert_eq!(reparsed.halfmove_clock, parsed.halfmove_clock);
        assert_eq!(reparsed.fullmove_number, parsed.fullmove_number);
    }

    #[test]
    fn round_trip_custom_position_fen() {
        let fen = "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQ1RK1 b kq - 4 6";
        let parsed = parse_fen(fen).expect("custom FEN should parse");
        let generated = generate_fen(&parsed);

        assert_eq!(generated, fen);

        let reparsed = parse_fen(&generated).expect("generated FEN should parse");
        assert_eq!(reparsed.side_to_move, Color::Black);
        assert_eq!(
            reparsed.castling_rights,
            CASTLE_BLACK_KINGSIDE | CASTLE_BLACK_QUEENSIDE
        );
        assert_eq!(reparsed.castling_rights & CASTLE_WHITE, 0);
        assert_eq!(reparsed.en_passant_square, None);
        assert_eq!(reparsed.halfmove_clock, 4);
        assert_eq!(reparsed.fullmove_number, 6);
    }

    #[test]
    fn en_passant_field_round_trips() {
        let fen = "rnbqkbnr/pppp1ppp/8/4p3/8/8/PPPPPPPP/RNBQKBNR w KQkq e6 0 2";
        let parsed = parse_fen(fen).expect("FEN should parse");
        assert_eq!(parsed.en_passant_square, Some(44));
        assert_eq!(generate_fen(&parsed), fen);
    }
}
