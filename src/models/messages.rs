use chess::{Color, Piece};
use serde::{Deserialize, Serialize};

/// Player color as it appears on the wire ("white"/"black").
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    White,
    Black,
}

impl From<PlayerColor> for Color {
    fn from(color: PlayerColor) -> Color {
        match color {
            PlayerColor::White => Color::White,
            PlayerColor::Black => Color::Black,
        }
    }
}

impl From<Color> for PlayerColor {
    fn from(color: Color) -> PlayerColor {
        match color {
            Color::White => PlayerColor::White,
            Color::Black => PlayerColor::Black,
        }
    }
}

/// Final result of a game as adjudicated by the server.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    Draw,
    WhiteWins,
    BlackWins,
}

/// The kind of opponent the server paired us with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpponentKind {
    Human,
    Bot,
}

/// The pieces a pawn may promote to. The set is closed: the server accepts
/// nothing else, and the session never defaults a choice silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionPiece {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl PromotionPiece {
    /// Suffix letter used in long-algebraic move encoding ("e7e8q").
    pub fn letter(self) -> char {
        match self {
            PromotionPiece::Queen => 'q',
            PromotionPiece::Rook => 'r',
            PromotionPiece::Bishop => 'b',
            PromotionPiece::Knight => 'n',
        }
    }

    pub fn from_letter(letter: char) -> Option<PromotionPiece> {
        match letter.to_ascii_lowercase() {
            'q' => Some(PromotionPiece::Queen),
            'r' => Some(PromotionPiece::Rook),
            'b' => Some(PromotionPiece::Bishop),
            'n' => Some(PromotionPiece::Knight),
            _ => None,
        }
    }
}

impl From<PromotionPiece> for Piece {
    fn from(piece: PromotionPiece) -> Piece {
        match piece {
            PromotionPiece::Queen => Piece::Queen,
            PromotionPiece::Rook => Piece::Rook,
            PromotionPiece::Bishop => Piece::Bishop,
            PromotionPiece::Knight => Piece::Knight,
        }
    }
}

/// Event pushed by the server over the game websocket. The union is closed:
/// a frame with an unknown tag fails to parse and is reported on the
/// channel's error path rather than being dropped silently.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full resync: complete authoritative state for the game. The initial
    /// push on connect carries the assignment fields; the reply to
    /// `get_state` sends only position and turn, so everything but those is
    /// optional here.
    GameState {
        fen: String,
        #[serde(default)]
        your_color: Option<PlayerColor>,
        turn: PlayerColor,
        #[serde(default)]
        is_bot_game: bool,
        /// Replayed SAN history; servers that do not resend it omit the
        /// field and the move log rebuilds as empty.
        #[serde(default)]
        history: Vec<String>,
    },
    /// Incremental update after a confirmed move (ours or the opponent's).
    Move {
        fen: String,
        move_san: String,
        /// Same move in long-algebraic coordinates, for last-move
        /// highlighting.
        #[serde(default)]
        move_uci: Option<String>,
        turn: PlayerColor,
        #[serde(default)]
        is_game_over: bool,
        #[serde(default)]
        result: Option<GameOutcome>,
        #[serde(default)]
        is_bot_move: bool,
    },
    /// Termination independent of a move (resignation, timeout, adjudication).
    GameOver { result: GameOutcome },
    /// Informational; the server decides whether the game ends.
    OpponentDisconnected {
        #[serde(default)]
        message: Option<String>,
    },
    /// Informational, non-fatal to the connection.
    Error { message: String },
}

/// Command sent to the server over the game websocket.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Move in long-algebraic coordinates, e.g. "e2e4" or "e7e8q".
    Move {
        #[serde(rename = "move")]
        uci: String,
    },
    Resign,
    /// Request a fresh `game_state` push (full resync).
    GetState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_game_state_event() {
        let json = r#"{
            "type": "game_state",
            "game_id": 42,
            "fen": "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "turn": "white",
            "your_color": "black",
            "is_bot_game": true
        }"#;
        let event: ServerEvent = serde_json::from_str(json).unwrap();
        match event {
            ServerEvent::GameState {
                your_color,
                turn,
                is_bot_game,
                history,
                ..
            } => {
                assert_eq!(your_color, Some(PlayerColor::Black));
                assert_eq!(turn, PlayerColor::White);
                assert!(is_bot_game);
                assert!(history.is_empty());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn parses_state_reply_without_assignment_fields() {
        // Shape of the reply to a `get_state` request: position and turn
        // only, plus a legal-move list this client derives locally instead.
        let json = r#"{
            "type": "game_state",
            "fen": "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "turn": "black",
            "legal_moves": ["e7e5", "e7e6", "g8f6"]
        }"#;
        let event: ServerEvent = serde_json::from_str(json).unwrap();
        match event {
            ServerEvent::GameState {
                your_color,
                turn,
                is_bot_game,
                history,
                ..
            } => {
                assert_eq!(your_color, None);
                assert_eq!(turn, PlayerColor::Black);
                assert!(!is_bot_game);
                assert!(history.is_empty());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn parses_move_event_with_result() {
        let json = r#"{
            "type": "move",
            "move_san": "Qxf7#",
            "move_uci": "h5f7",
            "fen": "r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4",
            "turn": "black",
            "is_game_over": true,
            "result": "white_wins"
        }"#;
        let event: ServerEvent = serde_json::from_str(json).unwrap();
        match event {
            ServerEvent::Move {
                move_san,
                move_uci,
                is_game_over,
                result,
                is_bot_move,
                ..
            } => {
                assert_eq!(move_san, "Qxf7#");
                assert_eq!(move_uci.as_deref(), Some("h5f7"));
                assert!(is_game_over);
                assert_eq!(result, Some(GameOutcome::WhiteWins));
                assert!(!is_bot_move);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn unknown_event_tag_is_an_error() {
        let json = r#"{"type": "chitchat", "message": "hi"}"#;
        assert!(serde_json::from_str::<ServerEvent>(json).is_err());
    }

    #[test]
    fn serializes_move_command_with_wire_field_name() {
        let cmd = ClientCommand::Move {
            uci: "e7e8q".to_string(),
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "move");
        assert_eq!(json["move"], "e7e8q");
    }

    #[test]
    fn serializes_resign_command() {
        let json = serde_json::to_value(&ClientCommand::Resign).unwrap();
        assert_eq!(json["type"], "resign");
    }

    #[test]
    fn promotion_letters_round_trip() {
        for piece in [
            PromotionPiece::Queen,
            PromotionPiece::Rook,
            PromotionPiece::Bishop,
            PromotionPiece::Knight,
        ] {
            assert_eq!(PromotionPiece::from_letter(piece.letter()), Some(piece));
        }
        assert_eq!(PromotionPiece::from_letter('k'), None);
    }
}
