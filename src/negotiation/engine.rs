//! Game orchestrator runs both players' sessions in turn

use crate::config::GameRules;
use crate::error::{HaggleError, Result};
use crate::oracle::{image_or_none, item_or_fallback, NegotiationOracle};
use crate::types::{Item, Money, PlayerId};
use rand::Rng;

use super::session::NegotiationSession;
use super::types::{GameResult, SessionState, SubmitOutcome};

/// Runs Player 1's negotiation, then Player 2's, and picks the winner
pub struct GameOrchestrator {
    rules: GameRules,
    item: Item,
    original_price: Money,
    player1: NegotiationSession,
    player2: NegotiationSession,
    active: PlayerId,
    complete: bool,
}

impl GameOrchestrator {
    /// Start a new game with a starting price drawn from the rules' range
    pub fn start<R: Rng>(rules: GameRules, rng: &mut R) -> Result<Self> {
        rules.validate()?;
        let original_price = Money::from_dollars(rng.gen_range(rules.price_min..=rules.price_max));
        Self::with_price(rules, original_price)
    }

    /// Start a new game at a fixed starting price
    pub fn with_price(rules: GameRules, original_price: Money) -> Result<Self> {
        rules.validate()?;
        if !original_price.is_positive() {
            return Err(HaggleError::Configuration(format!(
                "starting price {} must be positive",
                original_price
            )));
        }

        tracing::info!(
            "New game: {} starting at {}",
            rules.item_name,
            original_price
        );

        let item = Item::new(rules.item_name.clone(), rules.item_description.clone());
        let player1 = NegotiationSession::new(PlayerId::Player1, original_price, rules.max_attempts);
        let player2 = NegotiationSession::new(PlayerId::Player2, original_price, rules.max_attempts);

        Ok(Self {
            rules,
            item,
            original_price,
            player1,
            player2,
            active: PlayerId::Player1,
            complete: false,
        })
    }

    /// Throw the current game away and start over with a new price
    pub fn restart<R: Rng>(&mut self, rng: &mut R) -> Result<()> {
        *self = Self::start(self.rules.clone(), rng)?;
        Ok(())
    }

    /// Replace the configured item with a generated one and optionally
    /// fetch its picture. Failures fall back to defaults.
    pub async fn prepare_item(
        &mut self,
        oracle: &dyn NegotiationOracle,
        generate: bool,
        with_image: bool,
    ) {
        if generate {
            self.item = item_or_fallback(oracle).await;
            tracing::info!("Haggling over generated item: {}", self.item.name);
        }
        if with_image {
            self.item.image = image_or_none(oracle, &self.item.name).await;
        }
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn original_price(&self) -> Money {
        self.original_price
    }

    pub fn active_player(&self) -> PlayerId {
        self.active
    }

    /// Session of the player whose turn it is
    pub fn current_session(&self) -> &NegotiationSession {
        self.session(self.active)
    }

    pub fn session(&self, player: PlayerId) -> &NegotiationSession {
        match player {
            PlayerId::Player1 => &self.player1,
            PlayerId::Player2 => &self.player2,
        }
    }

    fn current_session_mut(&mut self) -> &mut NegotiationSession {
        match self.active {
            PlayerId::Player1 => &mut self.player1,
            PlayerId::Player2 => &mut self.player2,
        }
    }

    /// State shown to the players: the active session's, or `Complete`
    pub fn phase(&self) -> SessionState {
        if self.complete {
            SessionState::Complete
        } else {
            self.current_session().state()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Haggle on behalf of the active player
    pub async fn submit(
        &mut self,
        text: &str,
        oracle: &dyn NegotiationOracle,
    ) -> Result<SubmitOutcome> {
        self.current_session_mut().submit(text, oracle).await
    }

    /// Confirm the active player's final price. Hands over to Player 2, or
    /// ends the game after Player 2.
    pub fn acknowledge(&mut self) -> Result<SessionState> {
        let final_price = self.current_session_mut().acknowledge()?;

        match self.active {
            PlayerId::Player1 => {
                tracing::info!("Player 1 settled at {}; Player 2's turn", final_price);
                self.active = PlayerId::Player2;
            }
            PlayerId::Player2 => {
                self.complete = true;
                if let Some(result) = self.result() {
                    tracing::info!(
                        "Game over: {} vs {}, {}",
                        result.player1_final_price,
                        result.player2_final_price,
                        result
                    );
                }
            }
        }

        Ok(self.phase())
    }

    /// Winner and final prices, once both players are done
    pub fn result(&self) -> Option<GameResult> {
        if !self.complete {
            return None;
        }
        let player1 = self.player1.final_price()?;
        let player2 = self.player2.final_price()?;
        Some(GameResult::from_prices(player1, player2))
    }
}
