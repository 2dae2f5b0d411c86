//! Negotiation module: price parsing, sessions and the two-player game

pub mod engine;
pub mod extract;
pub mod pricing;
pub mod session;
pub mod types;

pub use engine::GameOrchestrator;
pub use extract::extract_prices;
pub use pricing::next_price;
pub use session::NegotiationSession;
pub use types::{GameResult, SessionState, SubmitOutcome, TurnReport, Winner};
