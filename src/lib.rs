//! Client-side session engine for a turn-based online chess application.
//!
//! The server is authoritative for everything: local legality checks are
//! advisory, the board only advances on server-confirmed `move` events, and
//! all display state (legal targets, check, captured material, history) is
//! derived on demand from the confirmed position and move log.

pub mod api;
pub mod error;
pub mod game;
pub mod models;
pub mod websocket;

pub use error::ClientError;
