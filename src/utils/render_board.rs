//! ASCII rendering of a board position for logs and debugging.

use crate::board::board::Board;
use crate::board::chess_types::Square;
use crate::utils::fen_generator::{fen_char_on_square, generate_fen};

/// Render the position as a bordered grid, rank 8 at the top, with the FEN
/// descriptor appended on the last line.
pub fn render_board(board: &Board) -> String {
    let mut out = String::new();
    let border = "  +---+---+---+---+---+---+---+---+\n";

    for rank in (0..8).rev() {
        out.push_str(border);
        out.push(char::from(b'1' + rank));
        out.push(' ');

        for file in 0..8 {
            let sq = (rank * 8 + file) as Square;
            let piece = fen_char_on_square(board, sq).unwrap_or(' ');
            out.push_str("| ");
            out.push(piece);
            out.push(' ');
        }

        out.push_str("|\n");
    }

    out.push_str(border);
    out.push_str("    a   b   c   d   e   f   g   h\n");
    out.push_str(&generate_fen(board));
    out.push('\n');

    out
}

#[cfg(test)]
mod tests {
    use super::render_board;
    use crate::board::board::Board;
    use crate::board::chess_types::STARTING_POSITION_FEN;

    #[test]
    fn rendered_start_position_shows_pieces_and_fen() {
        let rendered = render_board(&Board::new_game());

        assert!(rendered.contains("| r | n | b | q | k | b | n | r |"));
        assert!(rendered.contains("| R | N | B | Q | K | B | N | R |"));
        assert!(rendered.contains("    a   b   c   d   e   f   g   h"));
        assert!(rendered.ends_with(&format!("{STARTING_POSITION_FEN}\n")));
    }

    #[test]
    fn rendered_grid_has_rank_labels() {
        let rendered = render_board(&Board::new_game());
        for label in ['1', '8'] {
            assert!(rendered.lines().any(|line| line.starts_with(label)));
        }
    }
}
