use chess::Square;

use crate::game::captures::CaptureSummary;
use crate::game::position::Position;
use crate::models::messages::{GameOutcome, PlayerColor};

/// Everything the rendering surface needs, recomputed on demand from the
/// confirmed position and the move log so it can never go stale.
#[derive(Debug, Clone)]
pub struct BoardView {
    pub fen: String,
    /// Board orientation: the locally assigned color sits at the bottom.
    pub orientation: PlayerColor,
    pub your_turn: bool,
    pub in_check: bool,
    /// Square of the side-to-move's king while in check.
    pub checked_king: Option<Square>,
    /// From/to of the last server-confirmed move, for highlighting. Cleared
    /// on a full resync, which carries no move.
    pub last_move: Option<(Square, Square)>,
    pub selected: Option<Square>,
    /// Legal destinations that land on an enemy piece.
    pub capture_targets: Vec<Square>,
    /// Legal destinations onto empty squares.
    pub quiet_targets: Vec<Square>,
    pub move_pairs: Vec<MovePair>,
    pub captures: CaptureSummary,
    pub outcome: Option<GameOutcome>,
    pub notice: Option<String>,
}

/// One full-move row of the history table: `3. Nf3 Nc6`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePair {
    pub number: usize,
    pub white: String,
    pub black: Option<String>,
}

/// Group the ply-ordered SAN log into numbered white/black pairs.
pub fn pair_moves(log: &[String]) -> Vec<MovePair> {
    log.chunks(2)
        .enumerate()
        .map(|(i, pair)| MovePair {
            number: i + 1,
            white: pair[0].clone(),
            black: pair.get(1).cloned(),
        })
        .collect()
}

/// Split legal destinations into capture and quiet targets so the surface
/// can style them differently. An en-passant destination is empty and shows
/// as a quiet target, matching the occupancy the player sees.
pub fn split_targets(position: &Position, targets: &[Square]) -> (Vec<Square>, Vec<Square>) {
    let mut captures = Vec::new();
    let mut quiet = Vec::new();
    for &square in targets {
        if position.piece_at(square).is_some() {
            captures.push(square);
        } else {
            quiet.push(square);
        }
    }
    (captures, quiet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::Square;

    fn log(moves: &[&str]) -> Vec<String> {
        moves.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn pairs_odd_length_log() {
        let pairs = pair_moves(&log(&["e4", "e5", "Nf3"]));
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].number, 1);
        assert_eq!(pairs[0].white, "e4");
        assert_eq!(pairs[0].black.as_deref(), Some("e5"));
        assert_eq!(pairs[1].number, 2);
        assert_eq!(pairs[1].white, "Nf3");
        assert_eq!(pairs[1].black, None);
    }

    #[test]
    fn pairs_empty_log() {
        assert!(pair_moves(&[]).is_empty());
    }

    #[test]
    fn splits_captures_from_quiet_destinations() {
        // White pawn on e4, black pawn on d5: e4 may push to e5 or take d5.
        let position =
            Position::from_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 1")
                .unwrap();
        let targets = position.legal_destinations(Square::E4);
        let (captures, quiet) = split_targets(&position, &targets);
        assert_eq!(captures, vec![Square::D5]);
        assert_eq!(quiet, vec![Square::E5]);
    }
}
