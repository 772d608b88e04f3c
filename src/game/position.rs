use std::str::FromStr;

use chess::{Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Rank, Square};

use crate::error::ClientError;

/// The live board plus side-to-move and legality bookkeeping, wrapping the
/// rules engine. Mutated only by wholesale replacement from a server FEN;
/// local moves are validated on disposable copies via [`Position::try_apply`]
/// and never advance the held value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
}

impl Position {
    /// Standard initial position.
    pub fn start() -> Position {
        Position {
            board: Board::default(),
        }
    }

    /// Full replacement from a canonical position string.
    pub fn from_fen(fen: &str) -> Result<Position, ClientError> {
        let board = Board::from_str(fen).map_err(|e| ClientError::InvalidFen(e.to_string()))?;
        Ok(Position { board })
    }

    /// Render back to canonical string form.
    pub fn fen(&self) -> String {
        self.board.to_string()
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board.piece_on(square)
    }

    pub fn color_at(&self, square: Square) -> Option<Color> {
        self.board.color_on(square)
    }

    /// All legal destination squares for the piece on `from`.
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        MoveGen::new_legal(&self.board)
            .filter(|m| m.get_source() == from)
            .map(|m| m.get_dest())
            .collect()
    }

    pub fn in_check(&self) -> bool {
        self.board.checkers().popcnt() > 0
    }

    pub fn status(&self) -> BoardStatus {
        self.board.status()
    }

    /// Whether moving `from` -> `to` would carry a pawn of the side to move
    /// onto its last rank, requiring a promotion choice before sending.
    pub fn is_promotion(&self, from: Square, to: Square) -> bool {
        if self.board.piece_on(from) != Some(Piece::Pawn) {
            return false;
        }
        match self.board.color_on(from) {
            Some(Color::White) => to.get_rank() == Rank::Eighth,
            Some(Color::Black) => to.get_rank() == Rank::First,
            None => false,
        }
    }

    /// One-shot application to a disposable copy. `None` means the move is
    /// not legal in this position, which after a membership check signals a
    /// stale legal-move cache or a desync. The copy is returned, never
    /// retained here.
    pub fn try_apply(&self, chess_move: ChessMove) -> Option<Position> {
        if self.board.legal(chess_move) {
            Some(Position {
                board: self.board.make_move_new(chess_move),
            })
        } else {
            None
        }
    }

    /// Square of the side-to-move's king, for check highlighting.
    pub fn king_square(&self) -> Square {
        self.board.king_square(self.board.side_to_move())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::Square;

    #[test]
    fn enumerates_legal_destinations_from_start() {
        let position = Position::start();
        let knight_moves = position.legal_destinations(Square::G1);
        assert_eq!(knight_moves.len(), 2);
        let pawn_moves = position.legal_destinations(Square::E2);
        assert_eq!(pawn_moves.len(), 2);
    }

    #[test]
    fn rejects_garbage_fen() {
        assert!(Position::from_fen("not a position").is_err());
    }

    #[test]
    fn try_apply_leaves_original_untouched() {
        let position = Position::start();
        let m = ChessMove::new(Square::E2, Square::E4, None);
        let next = position.try_apply(m).unwrap();
        assert_eq!(position, Position::start());
        assert_eq!(next.side_to_move(), Color::Black);
    }

    #[test]
    fn try_apply_rejects_illegal_move() {
        let position = Position::start();
        let m = ChessMove::new(Square::E2, Square::E5, None);
        assert!(position.try_apply(m).is_none());
    }

    #[test]
    fn detects_promotion_squares_for_both_colors() {
        let white = Position::from_fen("4k3/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(white.is_promotion(Square::E7, Square::E8));
        assert!(!white.is_promotion(Square::E1, Square::E2));

        let black = Position::from_fen("4k3/8/8/8/8/8/4p3/3K4 b - - 0 1").unwrap();
        assert!(black.is_promotion(Square::E2, Square::E1));
    }

    #[test]
    fn reports_check_and_king_square() {
        // Scholar's mate one move early: white queen gives check on f7.
        let position =
            Position::from_fen("rnbqkbnr/ppppp1pp/8/5p1Q/4P3/8/PPPP1PPP/RNB1KBNR b KQkq - 0 1")
                .unwrap();
        assert!(position.in_check());
        assert_eq!(position.king_square(), Square::E8);

        assert!(!Position::start().in_check());
    }
}
