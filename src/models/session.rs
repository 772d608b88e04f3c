use std::str::FromStr;

use chess::{ChessMove, Square};
use log::{info, warn};

use crate::game::captures::derive_captures;
use crate::game::position::Position;
use crate::game::view::{pair_moves, split_targets, BoardView};
use crate::models::messages::{
    ClientCommand, GameOutcome, OpponentKind, PlayerColor, PromotionPiece, ServerEvent,
};

/// Lifecycle of a session. `AwaitingSync` means no position is known yet;
/// `Ended` is terminal for local moves, though informational events are
/// still accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    AwaitingSync,
    Active,
    /// A pawn move to the last rank is stashed here until the player picks
    /// a piece; no command has been sent yet.
    AwaitingPromotion { from: Square, to: Square },
    Ended(GameOutcome),
}

#[derive(Debug, Clone)]
struct Selection {
    from: Square,
    targets: Vec<Square>,
}

/// The per-game state machine. Consumes channel events and local user
/// intent, emits outbound commands, and exposes derived view state.
///
/// The held position is only ever the last server-confirmed one: local
/// intents are validated on disposable copies and the board advances solely
/// on the server's own `move` events.
pub struct GameSession {
    game_id: String,
    phase: SessionPhase,
    position: Position,
    color: Option<PlayerColor>,
    opponent: Option<OpponentKind>,
    turn: Option<PlayerColor>,
    move_log: Vec<String>,
    last_move: Option<(Square, Square)>,
    selection: Option<Selection>,
    connected: bool,
    notice: Option<String>,
}

impl GameSession {
    pub fn new(game_id: impl Into<String>) -> GameSession {
        GameSession {
            game_id: game_id.into(),
            phase: SessionPhase::AwaitingSync,
            position: Position::start(),
            color: None,
            opponent: None,
            turn: None,
            move_log: Vec::new(),
            last_move: None,
            selection: None,
            connected: false,
            notice: None,
        }
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn color(&self) -> Option<PlayerColor> {
        self.color
    }

    pub fn opponent(&self) -> Option<OpponentKind> {
        self.opponent
    }

    pub fn turn(&self) -> Option<PlayerColor> {
        self.turn
    }

    pub fn move_log(&self) -> &[String] {
        &self.move_log
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, SessionPhase::Ended(_))
    }

    pub fn is_my_turn(&self) -> bool {
        self.color.is_some()
            && self.turn == self.color
            && matches!(
                self.phase,
                SessionPhase::Active | SessionPhase::AwaitingPromotion { .. }
            )
    }

    /// Apply one inbound server event. Events arrive in receipt order and
    /// each runs to completion before the next is considered.
    pub fn handle_event(&mut self, event: ServerEvent) {
        self.connected = true;
        match event {
            ServerEvent::GameState {
                fen,
                your_color,
                turn,
                is_bot_game,
                history,
            } => self.handle_game_state(fen, your_color, turn, is_bot_game, history),
            ServerEvent::Move {
                fen,
                move_san,
                move_uci,
                turn,
                is_game_over,
                result,
                is_bot_move,
            } => self.handle_move(fen, move_san, move_uci, turn, is_game_over, result, is_bot_move),
            ServerEvent::GameOver { result } => {
                // The final position, if any, already arrived via a `move`
                // event; resignations and timeouts end without one.
                self.selection = None;
                self.phase = SessionPhase::Ended(result);
                info!("Game {} over: {:?}", self.game_id, result);
            }
            ServerEvent::OpponentDisconnected { message } => {
                let text = message.unwrap_or_else(|| "Opponent disconnected".to_string());
                info!("Game {}: {}", self.game_id, text);
                // Informational only: the server decides whether this ends
                // the game and will follow with `game_over` if it does.
                self.notice = Some(text);
            }
            ServerEvent::Error { message } => {
                warn!("Game {} server error: {}", self.game_id, message);
                self.notice = Some(message);
            }
        }
    }

    fn handle_game_state(
        &mut self,
        fen: String,
        your_color: Option<PlayerColor>,
        turn: PlayerColor,
        is_bot_game: bool,
        history: Vec<String>,
    ) {
        let position = match Position::from_fen(&fen) {
            Ok(p) => p,
            Err(e) => {
                warn!("Ignoring game_state with bad position: {}", e);
                return;
            }
        };
        self.position = position;
        // State replies to `get_state` omit the assignment fields; only a
        // push that carries them can assign, and only once.
        match (self.color, your_color) {
            (None, Some(color)) => {
                self.color = Some(color);
                self.opponent = Some(if is_bot_game {
                    OpponentKind::Bot
                } else {
                    OpponentKind::Human
                });
            }
            (Some(assigned), Some(reported)) if assigned != reported => {
                // Color is immutable for the life of the session.
                warn!(
                    "Server reports color {:?} but session was assigned {:?}; keeping assignment",
                    reported, assigned
                );
            }
            _ => {}
        }
        self.turn = Some(turn);
        // Full resync: the log is rebuilt from whatever the server provides,
        // and any last-move highlight is stale.
        self.move_log = history;
        self.last_move = None;
        self.selection = None;
        if !self.is_over() {
            self.phase = SessionPhase::Active;
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_move(
        &mut self,
        fen: String,
        move_san: String,
        move_uci: Option<String>,
        turn: PlayerColor,
        is_game_over: bool,
        result: Option<GameOutcome>,
        is_bot_move: bool,
    ) {
        if self.is_over() {
            warn!("Ignoring move event after game end: {}", move_san);
            return;
        }
        let position = match Position::from_fen(&fen) {
            Ok(p) => p,
            Err(e) => {
                warn!("Ignoring move event with bad position: {}", e);
                return;
            }
        };
        if is_bot_move {
            info!("Bot played {}", move_san);
        }
        self.position = position;
        self.move_log.push(move_san);
        self.last_move = move_uci.as_deref().and_then(uci_squares);
        self.turn = Some(turn);
        self.selection = None;
        match result {
            Some(outcome) => {
                self.phase = SessionPhase::Ended(outcome);
                info!("Game {} over: {:?}", self.game_id, outcome);
            }
            None => {
                if is_game_over {
                    warn!("Move flagged game-over without a result; awaiting game_over event");
                }
                // Also discards any pending promotion: the stashed move was
                // validated against a position that no longer exists.
                self.phase = SessionPhase::Active;
            }
        }
    }

    /// The channel reports transport loss here. Informational: the session
    /// keeps its last confirmed state and a fresh connection plus a
    /// `game_state` resync brings it back up to date.
    pub fn connection_lost(&mut self) {
        self.connected = false;
        warn!("Game {}: connection lost", self.game_id);
    }

    /// Square click from the interaction surface. Selecting an own piece on
    /// our turn computes its legal destinations; clicking a highlighted
    /// destination proposes the move; anything else clears the selection.
    pub fn square_clicked(&mut self, square: Square) -> Option<ClientCommand> {
        if self.phase != SessionPhase::Active || !self.is_my_turn() {
            return None;
        }
        let my_color = self.color?;
        if self.position.color_at(square) == Some(my_color.into()) {
            let targets = self.position.legal_destinations(square);
            self.selection = Some(Selection {
                from: square,
                targets,
            });
            return None;
        }
        if let Some(selection) = self.selection.take() {
            if selection.targets.contains(&square) {
                return self.propose_move(selection.from, square);
            }
        }
        None
    }

    /// Drag-and-drop intent from the interaction surface.
    pub fn piece_dropped(&mut self, from: Square, to: Square) -> Option<ClientCommand> {
        self.propose_move(from, to)
    }

    /// Validate a local move intent and turn it into an outbound command.
    /// Never advances the held position; confirmation is deferred to the
    /// server's `move` event.
    fn propose_move(&mut self, from: Square, to: Square) -> Option<ClientCommand> {
        if self.phase != SessionPhase::Active || !self.is_my_turn() {
            return None;
        }
        let my_color = self.color?;
        if self.position.color_at(from) != Some(my_color.into()) {
            return None;
        }
        if !self.position.legal_destinations(from).contains(&to) {
            self.selection = None;
            return None;
        }
        if self.position.is_promotion(from, to) {
            // Hold the command until the player picks a piece.
            self.phase = SessionPhase::AwaitingPromotion { from, to };
            self.selection = None;
            return None;
        }
        self.submit(from, to, None)
    }

    /// Complete a pending promotion with the chosen piece.
    pub fn choose_promotion(&mut self, piece: PromotionPiece) -> Option<ClientCommand> {
        let (from, to) = match self.phase {
            SessionPhase::AwaitingPromotion { from, to } => (from, to),
            _ => return None,
        };
        self.phase = SessionPhase::Active;
        self.submit(from, to, Some(piece))
    }

    /// Dismiss a pending promotion, discarding the stashed move.
    pub fn cancel_promotion(&mut self) {
        if let SessionPhase::AwaitingPromotion { .. } = self.phase {
            self.phase = SessionPhase::Active;
        }
    }

    /// Resignation is sent but never assumed: the `Ended` transition only
    /// happens on the server's confirming event.
    pub fn resign(&self) -> Option<ClientCommand> {
        match self.phase {
            SessionPhase::Active | SessionPhase::AwaitingPromotion { .. } => {
                Some(ClientCommand::Resign)
            }
            SessionPhase::AwaitingSync | SessionPhase::Ended(_) => None,
        }
    }

    fn submit(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PromotionPiece>,
    ) -> Option<ClientCommand> {
        self.selection = None;
        let chess_move = ChessMove::new(from, to, promotion.map(Into::into));
        if self.position.try_apply(chess_move).is_none() {
            // The cached legal-move set went stale (a server event landed in
            // between) or we are desynced; either way the server never sees
            // the move.
            warn!("Discarding move {}{} rejected by local validation", from, to);
            return None;
        }
        let mut uci = format!("{}{}", from, to);
        if let Some(piece) = promotion {
            uci.push(piece.letter());
        }
        Some(ClientCommand::Move { uci })
    }

    /// Derived view state for the rendering surface, recomputed from the
    /// confirmed position and move log on every call.
    pub fn view(&self) -> BoardView {
        let (capture_targets, quiet_targets) = match &self.selection {
            Some(selection) => split_targets(&self.position, &selection.targets),
            None => (Vec::new(), Vec::new()),
        };
        let in_check = self.position.in_check();
        BoardView {
            fen: self.position.fen(),
            orientation: self.color.unwrap_or(PlayerColor::White),
            your_turn: self.is_my_turn(),
            in_check,
            checked_king: if in_check {
                Some(self.position.king_square())
            } else {
                None
            },
            last_move: self.last_move,
            selected: self.selection.as_ref().map(|s| s.from),
            capture_targets,
            quiet_targets,
            move_pairs: pair_moves(&self.move_log),
            captures: derive_captures(&self.move_log),
            outcome: match self.phase {
                SessionPhase::Ended(outcome) => Some(outcome),
                _ => None,
            },
            notice: self.notice.clone(),
        }
    }
}

/// From/to squares of a long-algebraic move string, promotion suffix and all.
fn uci_squares(uci: &str) -> Option<(Square, Square)> {
    if uci.len() < 4 || !uci.is_ascii() {
        return None;
    }
    let from = Square::from_str(&uci[..2]).ok()?;
    let to = Square::from_str(&uci[2..4]).ok()?;
    Some((from, to))
}
