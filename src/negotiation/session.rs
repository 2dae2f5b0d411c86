//! Negotiation session management

use crate::error::{HaggleError, Result};
use crate::oracle::{owner_response_or_fallback, NegotiationOracle};
use crate::types::{Message, Money, PlayerId};

use super::pricing::next_price;
use super::types::{SessionState, SubmitOutcome, TurnReport};

/// One player's haggle with the shop owner
#[derive(Clone, Debug)]
pub struct NegotiationSession {
    player: PlayerId,
    original_price: Money,
    current_price: Money,
    attempt: u32,
    max_attempts: u32,
    history: Vec<Message>,
    state: SessionState,
    final_price: Option<Money>,
}

impl NegotiationSession {
    /// Create a fresh session at the original price
    pub fn new(player: PlayerId, original_price: Money, max_attempts: u32) -> Self {
        debug_assert!(original_price.is_positive());
        debug_assert!(max_attempts > 0);

        Self {
            player,
            original_price,
            current_price: original_price,
            attempt: 0,
            max_attempts,
            history: Vec::new(),
            state: SessionState::Negotiating,
            final_price: None,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn original_price(&self) -> Money {
        self.original_price
    }

    pub fn current_price(&self) -> Money {
        self.current_price
    }

    /// Attempts used so far
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.max_attempts - self.attempt
    }

    /// Conversation so far, oldest first
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Price recorded when the last attempt was used
    pub fn final_price(&self) -> Option<Money> {
        self.final_price
    }

    /// Send a player message to the owner and apply the reply.
    ///
    /// Blank messages are ignored. Oracle failures are replaced by the
    /// fallback reply and never returned. Errors only when the session no
    /// longer accepts input.
    pub async fn submit(
        &mut self,
        text: &str,
        oracle: &dyn NegotiationOracle,
    ) -> Result<SubmitOutcome> {
        if !self.state.accepts_input() {
            return Err(HaggleError::InvalidStateTransition(format!(
                "{} cannot haggle while {}",
                self.player, self.state
            )));
        }

        if text.trim().is_empty() {
            return Ok(SubmitOutcome::Ignored);
        }

        self.history.push(Message::player(text));
        let reply = owner_response_or_fallback(oracle, &self.history, self.current_price).await;
        self.history.push(Message::owner(reply.clone()));

        let previous_price = self.current_price;
        self.current_price = next_price(text, &reply, previous_price);
        self.attempt += 1;

        let limit_reached = self.attempt == self.max_attempts;
        if limit_reached {
            self.final_price = Some(self.current_price);
            self.state = SessionState::AwaitingAcknowledgement;
            tracing::info!("{} finished haggling at {}", self.player, self.current_price);
        }

        tracing::debug!(
            "{} attempt {}/{}: {} -> {}",
            self.player,
            self.attempt,
            self.max_attempts,
            previous_price,
            self.current_price
        );

        Ok(SubmitOutcome::Replied(TurnReport {
            reply,
            previous_price,
            price: self.current_price,
            attempt: self.attempt,
            limit_reached,
        }))
    }

    /// Confirm the final price and close the session
    pub fn acknowledge(&mut self) -> Result<Money> {
        if self.state != SessionState::AwaitingAcknowledgement {
            return Err(HaggleError::InvalidStateTransition(format!(
                "{} has nothing to acknowledge while {}",
                self.player, self.state
            )));
        }

        let final_price = self.final_price.ok_or_else(|| {
            HaggleError::InvalidStateTransition("final price was never recorded".to_string())
        })?;

        self.state = SessionState::Complete;
        Ok(final_price)
    }
}
