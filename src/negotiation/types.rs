//! Negotiation types and state machine

use crate::types::{Money, PlayerId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Negotiation state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Accepting player messages
    Negotiating,
    /// Out of attempts, waiting for the player to acknowledge
    AwaitingAcknowledgement,
    /// Final price recorded and acknowledged
    Complete,
}

impl SessionState {
    /// Check if the session is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Complete)
    }

    /// Check if player messages are accepted
    pub fn accepts_input(&self) -> bool {
        matches!(self, SessionState::Negotiating)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Negotiating => "negotiating",
            SessionState::AwaitingAcknowledgement => "awaiting acknowledgement",
            SessionState::Complete => "complete",
        };
        write!(f, "{}", name)
    }
}

/// Result of submitting one player message
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Blank message, nothing changed
    Ignored,
    /// The owner replied and the price was updated
    Replied(TurnReport),
}

/// What happened during one round of haggling
#[derive(Clone, Debug, PartialEq)]
pub struct TurnReport {
    pub reply: String,
    pub previous_price: Money,
    pub price: Money,
    /// Attempts used after this turn
    pub attempt: u32,
    /// True when this turn used the last attempt
    pub limit_reached: bool,
}

impl TurnReport {
    pub fn price_changed(&self) -> bool {
        self.price != self.previous_price
    }
}

/// Game winner
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Player1,
    Player2,
    Tie,
}

impl Winner {
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            Winner::Player1 => Some(PlayerId::Player1),
            Winner::Player2 => Some(PlayerId::Player2),
            Winner::Tie => None,
        }
    }
}

/// Final outcome once both players are done
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub player1_final_price: Money,
    pub player2_final_price: Money,
    pub winner: Winner,
}

impl GameResult {
    /// The strictly lower price wins; equal prices tie
    pub fn from_prices(player1: Money, player2: Money) -> Self {
        let winner = if player1 < player2 {
            Winner::Player1
        } else if player1 > player2 {
            Winner::Player2
        } else {
            Winner::Tie
        };

        Self {
            player1_final_price: player1,
            player2_final_price: player2,
            winner,
        }
    }

    pub fn final_price(&self, player: PlayerId) -> Money {
        match player {
            PlayerId::Player1 => self.player1_final_price,
            PlayerId::Player2 => self.player2_final_price,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.winner.player() {
            Some(player) => write!(f, "{} wins!", player),
            None => write!(f, "It's a tie!"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_terminal() {
        assert!(SessionState::Complete.is_terminal());
        assert!(!SessionState::AwaitingAcknowledgement.is_terminal());
        assert!(SessionState::Negotiating.accepts_input());
        assert!(!SessionState::AwaitingAcknowledgement.accepts_input());
    }

    #[test]
    fn test_lower_price_wins() {
        let result = GameResult::from_prices(Money(120.0), Money(150.0));
        assert_eq!(result.winner, Winner::Player1);
        assert_eq!(result.to_string(), "Player 1 wins!");

        let result = GameResult::from_prices(Money(150.0), Money(99.5));
        assert_eq!(result.winner, Winner::Player2);
        assert_eq!(result.final_price(PlayerId::Player2), Money(99.5));
    }

    #[test]
    fn test_equal_prices_tie() {
        let result = GameResult::from_prices(Money(150.0), Money(150.0));
        assert_eq!(result.winner, Winner::Tie);
        assert_eq!(result.winner.player(), None);
        assert_eq!(result.to_string(), "It's a tie!");
    }

    #[test]
    fn test_result_serialization() {
        let result = GameResult::from_prices(Money(120.0), Money(150.0));
        let serialized = serde_json::to_string(&result).unwrap();
        let deserialized: GameResult = serde_json::from_str(&serialized).unwrap();
        assert_eq!(result, deserialized);
    }
}
