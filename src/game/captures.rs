use chess::{Board, ChessMove, Color, Piece};
use log::warn;

/// Pieces captured by each side, derived by replaying the SAN move log from
/// the start position. Display data only: a move that fails to replay is
/// skipped, so the result is best-effort and never feeds rules decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureSummary {
    /// Black pieces taken by white, in capture order.
    pub by_white: Vec<Piece>,
    /// White pieces taken by black, in capture order.
    pub by_black: Vec<Piece>,
}

impl CaptureSummary {
    /// Signed material differential, positive in white's favor.
    pub fn material_balance(&self) -> i32 {
        let total = |pieces: &[Piece]| pieces.iter().map(|p| piece_points(*p)).sum::<i32>();
        total(&self.by_white) - total(&self.by_black)
    }
}

/// Standard piece-point weights; the king carries none.
pub fn piece_points(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 1,
        Piece::Knight => 3,
        Piece::Bishop => 3,
        Piece::Rook => 5,
        Piece::Queen => 9,
        Piece::King => 0,
    }
}

/// Replay `moves` in order from the start position and attribute every
/// captured piece to the capturing side.
pub fn derive_captures(moves: &[String]) -> CaptureSummary {
    let mut board = Board::default();
    let mut summary = CaptureSummary::default();

    for san in moves {
        let text = san.trim_end_matches(|c| c == '+' || c == '#');
        let chess_move = match ChessMove::from_san(&board, text) {
            Ok(m) => m,
            Err(e) => {
                warn!("Skipping unreplayable move {}: {}", san, e);
                continue;
            }
        };

        if let Some(victim) = captured_piece(&board, chess_move) {
            match board.side_to_move() {
                Color::White => summary.by_white.push(victim),
                Color::Black => summary.by_black.push(victim),
            }
        }

        board = board.make_move_new(chess_move);
    }

    summary
}

/// What the mover takes, if anything. En passant lands on an empty square,
/// so a pawn changing file counts as taking a pawn.
fn captured_piece(board: &Board, chess_move: ChessMove) -> Option<Piece> {
    if let Some(piece) = board.piece_on(chess_move.get_dest()) {
        return Some(piece);
    }
    if board.piece_on(chess_move.get_source()) == Some(Piece::Pawn)
        && chess_move.get_source().get_file() != chess_move.get_dest().get_file()
    {
        return Some(Piece::Pawn);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(moves: &[&str]) -> Vec<String> {
        moves.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn quiet_opening_captures_nothing() {
        let summary = derive_captures(&log(&["e4", "e5", "Nf3"]));
        assert!(summary.by_white.is_empty());
        assert!(summary.by_black.is_empty());
        assert_eq!(summary.material_balance(), 0);
    }

    #[test]
    fn pawn_capture_is_attributed_to_white() {
        let summary = derive_captures(&log(&["e4", "d5", "exd5"]));
        assert_eq!(summary.by_white, vec![Piece::Pawn]);
        assert!(summary.by_black.is_empty());
        assert_eq!(summary.material_balance(), 1);
    }

    #[test]
    fn exchanges_balance_out() {
        let summary = derive_captures(&log(&["e4", "d5", "exd5", "Qxd5"]));
        assert_eq!(summary.by_white, vec![Piece::Pawn]);
        assert_eq!(summary.by_black, vec![Piece::Pawn]);
        assert_eq!(summary.material_balance(), 0);
    }

    #[test]
    fn en_passant_counts_as_a_pawn_capture() {
        let summary = derive_captures(&log(&["e4", "a6", "e5", "d5", "exd6"]));
        assert_eq!(summary.by_white, vec![Piece::Pawn]);
        assert_eq!(summary.material_balance(), 1);
    }

    #[test]
    fn derivation_is_idempotent() {
        let moves = log(&["e4", "d5", "exd5", "Qxd5", "Nc3"]);
        let first = derive_captures(&moves);
        let second = derive_captures(&moves);
        assert_eq!(first, second);
    }

    #[test]
    fn unreplayable_move_is_skipped_not_fatal() {
        let summary = derive_captures(&log(&["e4", "Qh7", "d5", "exd5"]));
        // The impossible queen move is dropped; the rest still replays.
        assert_eq!(summary.by_white, vec![Piece::Pawn]);
    }

    #[test]
    fn check_and_mate_suffixes_do_not_break_replay() {
        let summary = derive_captures(&log(&["e4", "e5", "Qh5", "Nc6", "Bc4", "Nf6", "Qxf7#"]));
        assert_eq!(summary.by_white, vec![Piece::Pawn]);
    }
}
