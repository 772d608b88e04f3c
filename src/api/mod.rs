use log::info;
use serde::Deserialize;

use crate::error::ClientError;
use crate::models::messages::PlayerColor;

/// Result of a matchmaking request: either paired with a human or handed a
/// bot game after the queue timed out.
#[derive(Deserialize, Debug, Clone)]
pub struct MatchmakingResponse {
    pub status: MatchStatus,
    pub game_id: i64,
    #[serde(default)]
    pub opponent: Option<String>,
    pub color: PlayerColor,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Matched,
    BotGame,
}

/// Thin request/response glue for the HTTP endpoints the driver needs.
/// Pairing logic and authentication live on the server.
pub struct ApiClient {
    http: awc::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> ApiClient {
        ApiClient {
            http: awc::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Join the matchmaking queue and wait for the server's verdict. The
    /// server owns the timeout and the bot fallback.
    pub async fn find_match(&self) -> Result<MatchmakingResponse, ClientError> {
        let url = format!("{}/game/find-match", self.base_url);
        info!("Requesting a match");
        let mut response = self
            .http
            .post(url.as_str())
            .insert_header(("Authorization", format!("Bearer {}", self.token)))
            .send()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ClientError::Request(format!(
                "matchmaking returned {}",
                response.status()
            )));
        }
        response
            .json::<MatchmakingResponse>()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_matched_response() {
        let json = r#"{"status": "matched", "game_id": 12, "opponent": "magnus", "color": "black"}"#;
        let response: MatchmakingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, MatchStatus::Matched);
        assert_eq!(response.game_id, 12);
        assert_eq!(response.opponent.as_deref(), Some("magnus"));
        assert_eq!(response.color, PlayerColor::Black);
    }

    #[test]
    fn parses_bot_game_response_without_opponent() {
        let json = r#"{"status": "bot_game", "game_id": 13, "color": "white"}"#;
        let response: MatchmakingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, MatchStatus::BotGame);
        assert!(response.opponent.is_none());
    }
}
