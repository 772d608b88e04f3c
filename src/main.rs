use std::io::{self, BufRead};
use std::str::FromStr;
use std::thread;

use chess::{Piece, Square};
use futures::channel::mpsc;
use futures::{pin_mut, select, FutureExt, StreamExt};
use log::{error, info, warn};

use chess_web_client::api::{ApiClient, MatchStatus};
use chess_web_client::error::ClientError;
use chess_web_client::game::view::BoardView;
use chess_web_client::models::messages::{
    ClientCommand, GameOutcome, PlayerColor, PromotionPiece, ServerEvent,
};
use chess_web_client::models::session::{GameSession, SessionPhase};
use chess_web_client::websocket::GameChannel;

enum Input {
    Channel(Option<Result<ServerEvent, ClientError>>),
    User(Option<String>),
}

enum LineAction {
    Send(ClientCommand),
    Quit,
    Nothing,
}

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let base_url = std::env::var("CHESS_SERVER_URL")
        .unwrap_or_else(|_| "http://localhost:8000".to_string());
    let token = match std::env::var("CHESS_TOKEN") {
        Ok(token) => token,
        Err(_) => {
            eprintln!("CHESS_TOKEN must be set to an access token");
            return Ok(());
        }
    };

    // Join an existing game by id, or ask matchmaking for one.
    let game_id = match std::env::args().nth(1) {
        Some(id) => id,
        None => {
            let api = ApiClient::new(&base_url, &token);
            match api.find_match().await {
                Ok(found) => {
                    match found.status {
                        MatchStatus::Matched => info!(
                            "Matched against {}",
                            found.opponent.as_deref().unwrap_or("opponent")
                        ),
                        MatchStatus::BotGame => {
                            info!("No human opponent available, playing the bot")
                        }
                    }
                    found.game_id.to_string()
                }
                Err(e) => {
                    error!("Matchmaking failed: {}", e);
                    return Ok(());
                }
            }
        }
    };

    let mut channel = match GameChannel::open(&base_url, &game_id, &token).await {
        Ok(channel) => channel,
        Err(e) => {
            error!("Could not open game channel: {}", e);
            return Ok(());
        }
    };

    let mut session = GameSession::new(game_id);
    let mut intents = spawn_stdin_reader();

    println!("Commands: e2e4, q/r/b/n (promotion), cancel, resign, sync, show, quit");

    loop {
        let input = {
            let event = channel.recv().fuse();
            pin_mut!(event);
            let mut line = intents.next();
            select! {
                ev = event => Input::Channel(ev),
                l = line => Input::User(l),
            }
        };

        match input {
            Input::Channel(None) => {
                session.connection_lost();
                // No automatic reconnect: report the loss and let the user
                // restart, which reopens the channel and resyncs.
                error!("Connection lost; restart the client to resync");
                break;
            }
            Input::Channel(Some(Err(e))) => {
                warn!("Ignoring malformed server frame: {}", e);
            }
            Input::Channel(Some(Ok(event))) => {
                session.handle_event(event);
                render(&session.view());
                if let SessionPhase::Ended(outcome) = session.phase() {
                    println!("{}", result_message(outcome, session.color()));
                    break;
                }
            }
            Input::User(None) => break,
            Input::User(Some(line)) => match handle_line(&mut session, line.trim()) {
                LineAction::Send(command) => channel.send(&command).await,
                LineAction::Quit => break,
                LineAction::Nothing => {}
            },
        }
    }

    channel.close().await;
    Ok(())
}

/// Translate one line of user input into session intent. Stands in for the
/// board interaction surface.
fn handle_line(session: &mut GameSession, line: &str) -> LineAction {
    match line {
        "" => LineAction::Nothing,
        "quit" | "exit" => LineAction::Quit,
        "show" => {
            render(&session.view());
            LineAction::Nothing
        }
        "resign" => match session.resign() {
            Some(command) => LineAction::Send(command),
            None => {
                println!("Nothing to resign");
                LineAction::Nothing
            }
        },
        "sync" => LineAction::Send(ClientCommand::GetState),
        "cancel" => {
            session.cancel_promotion();
            LineAction::Nothing
        }
        _ => handle_move_input(session, line),
    }
}

fn handle_move_input(session: &mut GameSession, line: &str) -> LineAction {
    if line.len() == 1 {
        if let Some(piece) = PromotionPiece::from_letter(line.chars().next().unwrap()) {
            return match session.choose_promotion(piece) {
                Some(command) => LineAction::Send(command),
                None => {
                    println!("No promotion pending");
                    LineAction::Nothing
                }
            };
        }
    }

    let Some((from, to)) = parse_square_pair(line) else {
        println!("Unrecognized input: {}", line);
        return LineAction::Nothing;
    };

    match session.piece_dropped(from, to) {
        Some(command) => LineAction::Send(command),
        None => {
            if let SessionPhase::AwaitingPromotion { .. } = session.phase() {
                println!("Choose a promotion piece: q, r, b or n (or cancel)");
            } else {
                println!("Move not playable right now");
            }
            LineAction::Nothing
        }
    }
}

/// Accepts "e2e4" or "e2 e4".
fn parse_square_pair(line: &str) -> Option<(Square, Square)> {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() != 4 {
        return None;
    }
    let from = Square::from_str(&compact[..2].to_lowercase()).ok()?;
    let to = Square::from_str(&compact[2..].to_lowercase()).ok()?;
    Some((from, to))
}

fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.unbounded_send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
    rx
}

fn render(view: &BoardView) {
    println!();
    print_board(&view.fen, view.orientation);

    if let Some(outcome) = view.outcome {
        println!("Result: {:?}", outcome);
    } else if view.your_turn {
        println!("Your turn to move");
    } else {
        println!("Waiting for opponent...");
    }
    if let Some((from, to)) = view.last_move {
        println!("Last move: {} to {}", from, to);
    }
    if view.in_check {
        if let Some(square) = view.checked_king {
            println!("Check! King on {}", square);
        }
    }
    if let Some(selected) = view.selected {
        let captures: Vec<String> = view.capture_targets.iter().map(|s| s.to_string()).collect();
        let quiet: Vec<String> = view.quiet_targets.iter().map(|s| s.to_string()).collect();
        println!(
            "Selected {}: takes [{}], moves [{}]",
            selected,
            captures.join(" "),
            quiet.join(" ")
        );
    }

    if !view.move_pairs.is_empty() {
        let rows: Vec<String> = view
            .move_pairs
            .iter()
            .map(|pair| {
                format!(
                    "{}. {} {}",
                    pair.number,
                    pair.white,
                    pair.black.as_deref().unwrap_or("")
                )
            })
            .collect();
        println!("History: {}", rows.join("  "));
    }

    let captured_line = |pieces: &[Piece]| -> String {
        pieces.iter().map(|p| piece_symbol(*p)).collect()
    };
    let balance = view.captures.material_balance();
    if !view.captures.by_white.is_empty() || !view.captures.by_black.is_empty() {
        println!(
            "Captured by white: {} {}",
            captured_line(&view.captures.by_white),
            if balance > 0 {
                format!("(+{})", balance)
            } else {
                String::new()
            }
        );
        println!(
            "Captured by black: {} {}",
            captured_line(&view.captures.by_black),
            if balance < 0 {
                format!("(+{})", -balance)
            } else {
                String::new()
            }
        );
    }
    if let Some(notice) = &view.notice {
        println!("Note: {}", notice);
    }
}

/// Draw the piece-placement field of a FEN, oriented for the local player.
fn print_board(fen: &str, orientation: PlayerColor) {
    let placement = fen.split_whitespace().next().unwrap_or("");
    let mut rows: Vec<String> = Vec::with_capacity(8);
    for rank in placement.split('/') {
        let mut row = String::new();
        for c in rank.chars() {
            if let Some(count) = c.to_digit(10) {
                for _ in 0..count {
                    row.push_str(" .");
                }
            } else {
                row.push(' ');
                row.push(fen_piece_symbol(c));
            }
        }
        rows.push(row);
    }
    match orientation {
        PlayerColor::White => {
            for (i, row) in rows.iter().enumerate() {
                println!("{}{}", 8 - i, row);
            }
            println!("  a b c d e f g h");
        }
        PlayerColor::Black => {
            for (i, row) in rows.iter().enumerate().rev() {
                let reversed: String = row
                    .split_whitespace()
                    .rev()
                    .flat_map(|s| [" ", s])
                    .collect();
                println!("{}{}", 8 - i, reversed);
            }
            println!("  h g f e d c b a");
        }
    }
}

fn fen_piece_symbol(c: char) -> char {
    match c {
        'P' => '♙',
        'N' => '♘',
        'B' => '♗',
        'R' => '♖',
        'Q' => '♕',
        'K' => '♔',
        'p' => '♟',
        'n' => '♞',
        'b' => '♝',
        'r' => '♜',
        'q' => '♛',
        'k' => '♚',
        other => other,
    }
}

fn piece_symbol(piece: Piece) -> char {
    match piece {
        Piece::Pawn => '♟',
        Piece::Knight => '♞',
        Piece::Bishop => '♝',
        Piece::Rook => '♜',
        Piece::Queen => '♛',
        Piece::King => '♚',
    }
}

fn result_message(outcome: GameOutcome, my_color: Option<PlayerColor>) -> String {
    match outcome {
        GameOutcome::Draw => "It's a draw!".to_string(),
        GameOutcome::WhiteWins => match my_color {
            Some(PlayerColor::White) => "You won!".to_string(),
            _ => "White wins".to_string(),
        },
        GameOutcome::BlackWins => match my_color {
            Some(PlayerColor::Black) => "You won!".to_string(),
            _ => "Black wins".to_string(),
        },
    }
}
