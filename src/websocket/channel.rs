use actix_codec::Framed;
use awc::ws::{Codec, Frame, Message};
use awc::BoxedSocket;
use futures::{SinkExt, StreamExt};
use log::{info, warn};

use crate::error::ClientError;
use crate::models::messages::{ClientCommand, ServerEvent};

/// One websocket connection scoped to a single game id, authenticated by a
/// bearer token at connect time. Inbound events are delivered in receipt
/// order through [`GameChannel::recv`]; outbound commands are dropped (not
/// errored) when the connection is no longer open, because delivery is only
/// ever confirmed by a subsequent inbound event anyway.
pub struct GameChannel {
    framed: Framed<BoxedSocket, Codec>,
    open: bool,
}

impl GameChannel {
    /// Connect to `{base}/ws/game/{id}?token={token}`, upgrading an http(s)
    /// base URL to ws(s).
    pub async fn open(base_url: &str, game_id: &str, token: &str) -> Result<GameChannel, ClientError> {
        let url = format!("{}/ws/game/{}?token={}", ws_base(base_url), game_id, token);
        info!("Connecting to game {}", game_id);
        let (response, framed) = awc::Client::new()
            .ws(url.as_str())
            .connect()
            .await
            .map_err(|e| ClientError::Connect(e.to_string()))?;
        info!("Game channel open: {}", response.status());
        Ok(GameChannel { framed, open: true })
    }

    /// Transmit one command if and only if the connection is open.
    pub async fn send(&mut self, command: &ClientCommand) {
        if !self.open {
            warn!("Dropping {:?}: channel is closed", command);
            return;
        }
        let text = match serde_json::to_string(command) {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to serialize {:?}: {}", command, e);
                return;
            }
        };
        info!("Sending: {}", text);
        if let Err(e) = self.framed.send(Message::Text(text.into())).await {
            warn!("Send failed, marking channel closed: {}", e);
            self.open = false;
        }
    }

    /// Next inbound event. `Err` marks a malformed or unrecognized frame
    /// (the connection stays up); `None` means the connection is gone and
    /// no further events will be delivered.
    pub async fn recv(&mut self) -> Option<Result<ServerEvent, ClientError>> {
        while self.open {
            match self.framed.next().await {
                Some(Ok(Frame::Text(bytes))) => {
                    return Some(serde_json::from_slice::<ServerEvent>(&bytes).map_err(Into::into));
                }
                Some(Ok(Frame::Ping(payload))) => {
                    if self.framed.send(Message::Pong(payload)).await.is_err() {
                        self.open = false;
                    }
                }
                Some(Ok(Frame::Pong(_))) => {}
                Some(Ok(Frame::Binary(_))) => {
                    warn!("Ignoring unsupported binary frame");
                }
                Some(Ok(Frame::Continuation(_))) => {
                    warn!("Ignoring unexpected continuation frame");
                }
                Some(Ok(Frame::Close(reason))) => {
                    info!("Server closed the connection: {:?}", reason);
                    self.open = false;
                }
                Some(Err(e)) => {
                    warn!("Websocket protocol error: {}", e);
                    self.open = false;
                }
                None => {
                    self.open = false;
                }
            }
        }
        None
    }

    /// Teardown; safe to call on every exit path and more than once.
    pub async fn close(&mut self) {
        if self.open {
            let _ = self.framed.send(Message::Close(None)).await;
            self.open = false;
            info!("Game channel closed");
        }
    }
}

fn ws_base(base_url: &str) -> String {
    if let Some(rest) = base_url.strip_prefix("https") {
        format!("wss{}", rest)
    } else if let Some(rest) = base_url.strip_prefix("http") {
        format!("ws{}", rest)
    } else {
        base_url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::ws_base;

    #[test]
    fn upgrades_http_schemes_to_websocket() {
        assert_eq!(ws_base("http://localhost:8000"), "ws://localhost:8000");
        assert_eq!(ws_base("https://chess.example"), "wss://chess.example");
        assert_eq!(ws_base("ws://localhost:8000"), "ws://localhost:8000");
    }
}
