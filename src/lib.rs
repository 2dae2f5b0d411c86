//! Haggle
//!
//! Two-player haggling game against a language-model shopkeeper. Each player
//! gets a fixed number of messages to talk the price of an item down; the
//! lower final price wins.
//!
//! - `negotiation`: price parsing, per-player sessions and the game itself
//! - `oracle`: the shopkeeper, backed by an OpenAI-compatible service or a
//!   scripted offline stand-in
//! - `cli`: command line and terminal front-end

pub mod cli;
pub mod config;
pub mod error;
pub mod negotiation;
pub mod oracle;
pub mod types;

// Re-export commonly used types and functions
pub use config::{GameConfig, GameRules, OracleConfig};
pub use error::{HaggleError, Result};
pub use negotiation::{
    extract_prices, next_price, GameOrchestrator, GameResult, NegotiationSession, SessionState,
    SubmitOutcome, Winner,
};
pub use oracle::{NegotiationOracle, FALLBACK_REPLY};
pub use types::{Item, Message, Money, PlayerId, Speaker};
