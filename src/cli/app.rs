//! Terminal front-end driving the haggling game

use crate::config::GameConfig;
use crate::error::{HaggleError, Result};
use crate::negotiation::{GameOrchestrator, SessionState, SubmitOutcome};
use crate::oracle::{NegotiationOracle, OpenAiOracle, ScriptedOracle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Messages shown from the end of the conversation
const VISIBLE_HISTORY: usize = 10;

/// Input events from the players
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    TextSubmitted(String),
    Acknowledge,
    RestartRequested,
    Quit,
}

impl GameEvent {
    /// Interpret one line of input given the current phase
    pub fn from_line(line: &str, phase: SessionState) -> Self {
        let command = line.trim();
        if command.eq_ignore_ascii_case("/quit") {
            return GameEvent::Quit;
        }

        match phase {
            SessionState::Complete => {
                if ["y", "yes", "/restart"]
                    .iter()
                    .any(|answer| command.eq_ignore_ascii_case(answer))
                {
                    GameEvent::RestartRequested
                } else {
                    GameEvent::Quit
                }
            }
            _ if command.eq_ignore_ascii_case("/restart") => GameEvent::RestartRequested,
            SessionState::AwaitingAcknowledgement => GameEvent::Acknowledge,
            SessionState::Negotiating => GameEvent::TextSubmitted(line.to_string()),
        }
    }
}

/// Whether the event loop keeps going
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Main Haggle application
pub struct HaggleApp {
    config: GameConfig,
    oracle: Box<dyn NegotiationOracle>,
    game: GameOrchestrator,
    rng: StdRng,
}

impl HaggleApp {
    /// Create the app with the oracle the configuration asks for
    pub fn new(config: GameConfig) -> Result<Self> {
        let oracle: Box<dyn NegotiationOracle> = if config.offline {
            tracing::info!("Offline mode: the owner is scripted");
            Box::new(ScriptedOracle::new())
        } else {
            Box::new(OpenAiOracle::new(&config.oracle)?)
        };
        Self::with_oracle(config, oracle)
    }

    /// Create the app around a given oracle
    pub fn with_oracle(config: GameConfig, oracle: Box<dyn NegotiationOracle>) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let game = GameOrchestrator::start(config.rules.clone(), &mut rng)?;

        Ok(Self {
            config,
            oracle,
            game,
            rng,
        })
    }

    pub fn game(&self) -> &GameOrchestrator {
        &self.game
    }

    /// Run until the players quit or the input ends
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();

        self.prepare_item().await;
        self.show(&mut output).await?;

        loop {
            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => None,
            };

            let event = match line {
                Some(line) => GameEvent::from_line(&line, self.game.phase()),
                None => GameEvent::Quit,
            };

            if self.handle_event(event).await? == Flow::Exit {
                break;
            }
            self.show(&mut output).await?;
        }

        output.write_all(b"Goodbye!\n").await?;
        output.flush().await?;
        Ok(())
    }

    /// Apply one event to the game
    pub async fn handle_event(&mut self, event: GameEvent) -> Result<Flow> {
        match event {
            GameEvent::Quit => {
                tracing::info!("Players quit");
                return Ok(Flow::Exit);
            }
            GameEvent::RestartRequested => {
                self.game.restart(&mut self.rng)?;
                self.prepare_item().await;
            }
            GameEvent::Acknowledge => {
                if let Err(e) = self.game.acknowledge() {
                    tracing::warn!("Ignoring acknowledgement: {}", e);
                }
            }
            GameEvent::TextSubmitted(text) => {
                // Input is not read again until the owner has answered
                let outcome = tokio::select! {
                    outcome = self.game.submit(&text, self.oracle.as_ref()) => outcome,
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Interrupted while waiting for the owner");
                        return Ok(Flow::Exit);
                    }
                };

                match outcome {
                    Ok(SubmitOutcome::Ignored) => {}
                    Ok(SubmitOutcome::Replied(turn)) if turn.price_changed() => {
                        tracing::debug!("Price moved from {} to {}", turn.previous_price, turn.price);
                    }
                    Ok(SubmitOutcome::Replied(_)) => {}
                    Err(HaggleError::InvalidStateTransition(reason)) => {
                        tracing::warn!("Ignoring message: {}", reason);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(Flow::Continue)
    }

    async fn prepare_item(&mut self) {
        self.game
            .prepare_item(
                self.oracle.as_ref(),
                self.config.generate_item,
                self.config.generate_image,
            )
            .await;

        let (Some(dir), Some(image)) = (&self.config.image_dir, &self.game.item().image) else {
            return;
        };

        let path = dir.join(format!("{}.png", self.game.item().slug()));
        let written = async {
            tokio::fs::create_dir_all(dir).await?;
            tokio::fs::write(&path, image).await
        }
        .await;

        match written {
            Ok(()) => tracing::info!("Saved item image to {}", path.display()),
            Err(e) => tracing::warn!("Could not save item image to {}: {}", path.display(), e),
        }
    }

    async fn show<W: AsyncWrite + Unpin>(&self, output: &mut W) -> Result<()> {
        output.write_all(self.render().as_bytes()).await?;
        output.flush().await?;
        Ok(())
    }

    /// Text snapshot of the current screen
    pub fn render(&self) -> String {
        Screen(&self.game).to_string()
    }
}

/// What the players see after each event
struct Screen<'a>(&'a GameOrchestrator);

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let game = self.0;
        let rule = "-".repeat(60);

        if let Some(result) = game.result() {
            writeln!(f, "\n{}\nGame Over!", rule)?;
            writeln!(f, "Player 1's final price: {}", result.player1_final_price)?;
            writeln!(f, "Player 2's final price: {}", result.player2_final_price)?;
            writeln!(f, "{}", result)?;
            return writeln!(f, "Play again? [y/N]");
        }

        let session = game.current_session();
        let item = game.item();

        writeln!(f, "\n{}", rule)?;
        writeln!(f, "{}'s Turn", game.active_player())?;
        writeln!(f, "Item: {}", item.name)?;
        if !item.description.is_empty() {
            writeln!(f, "      {}", item.description)?;
        }
        writeln!(f, "Price: {}", session.current_price())?;
        writeln!(f, "{}", rule)?;

        let history = session.history();
        let start = history.len().saturating_sub(VISIBLE_HISTORY);
        for message in &history[start..] {
            writeln!(f, "{}", message)?;
        }

        match session.state() {
            SessionState::Negotiating => {
                writeln!(
                    f,
                    "Attempt: {}/{}  (/restart, /quit)",
                    session.attempt() + 1,
                    session.max_attempts()
                )?;
                write!(f, "> ")
            }
            _ => writeln!(f, "Press Enter to continue..."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameRules;
    use crate::negotiation::Winner;
    use crate::types::{Money, PlayerId};

    fn config(max_attempts: u32) -> GameConfig {
        GameConfig {
            rules: GameRules {
                max_attempts,
                price_min: 200,
                price_max: 200,
                ..GameRules::default()
            },
            offline: true,
            seed: Some(1),
            ..GameConfig::default()
        }
    }

    fn app(max_attempts: u32, oracle: ScriptedOracle) -> HaggleApp {
        HaggleApp::with_oracle(config(max_attempts), Box::new(oracle)).unwrap()
    }

    #[test]
    fn test_event_mapping() {
        use SessionState::*;

        assert_eq!(GameEvent::from_line("/quit", Negotiating), GameEvent::Quit);
        assert_eq!(
            GameEvent::from_line(" /RESTART ", Negotiating),
            GameEvent::RestartRequested
        );
        assert_eq!(
            GameEvent::from_line("$50?", Negotiating),
            GameEvent::TextSubmitted("$50?".to_string())
        );
        assert_eq!(
            GameEvent::from_line("", AwaitingAcknowledgement),
            GameEvent::Acknowledge
        );
        assert_eq!(GameEvent::from_line("y", Complete), GameEvent::RestartRequested);
        assert_eq!(GameEvent::from_line("", Complete), GameEvent::Quit);
    }

    #[tokio::test]
    async fn test_event_flow() {
        let mut app = app(1, ScriptedOracle::with_replies(["$150", "$170"]));

        app.handle_event(GameEvent::TextSubmitted("Cheaper?".into()))
            .await
            .unwrap();
        assert_eq!(app.game().phase(), SessionState::AwaitingAcknowledgement);
        assert!(app.render().contains("Press Enter to continue..."));

        // Messages while awaiting acknowledgement are ignored
        app.handle_event(GameEvent::TextSubmitted("$1".into()))
            .await
            .unwrap();
        assert_eq!(app.game().current_session().final_price(), Some(Money(150.0)));

        app.handle_event(GameEvent::Acknowledge).await.unwrap();
        assert_eq!(app.game().active_player(), PlayerId::Player2);

        app.handle_event(GameEvent::TextSubmitted("Cheaper?".into()))
            .await
            .unwrap();
        app.handle_event(GameEvent::Acknowledge).await.unwrap();

        let result = app.game().result().unwrap();
        assert_eq!(result.winner, Winner::Player1);
        assert!(app.render().contains("Player 1 wins!"));

        assert_eq!(app.handle_event(GameEvent::Quit).await.unwrap(), Flow::Exit);
    }

    #[tokio::test]
    async fn test_render_negotiating_screen() {
        let app = app(3, ScriptedOracle::new());
        let screen = app.render();

        assert!(screen.contains("Player 1's Turn"));
        assert!(screen.contains("Item: Antique Vase"));
        assert!(screen.contains("Price: $200.00"));
        assert!(screen.contains("Attempt: 1/3"));
    }

    #[tokio::test]
    async fn test_run_full_game_from_input() {
        let input = "I offer $80\n\nMy best is $90\n\nn\n";
        let mut output = Vec::new();
        let mut app = app(1, ScriptedOracle::with_replies(["How about $150 instead?", "$150"]));

        app.run(input.as_bytes(), &mut output).await.unwrap();

        let transcript = String::from_utf8(output).unwrap();
        assert!(transcript.contains("Owner: How about $150 instead?"));
        assert!(transcript.contains("Player 2's Turn"));
        assert!(transcript.contains("It's a tie!"));
        assert!(transcript.ends_with("Goodbye!\n"));
    }

    #[tokio::test]
    async fn test_restart_from_end_screen() {
        let input = "$50?\n\n$50?\n\ny\n";
        let mut output = Vec::new();
        let mut app = app(1, ScriptedOracle::new());

        app.run(input.as_bytes(), &mut output).await.unwrap();

        // Input ran out after the restart, so the new game is untouched
        assert_eq!(app.game().phase(), SessionState::Negotiating);
        assert!(app.game().current_session().history().is_empty());
        assert_eq!(app.game().active_player(), PlayerId::Player1);
    }

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("haggle-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[tokio::test]
    async fn test_image_written_to_dir() {
        let dir = scratch_dir("image");
        let bytes = vec![0x89, b'P', b'N', b'G', 1, 2, 3];
        let mut config = config(1);
        config.generate_image = true;
        config.image_dir = Some(dir.join("nested"));
        let oracle = ScriptedOracle::new().with_image(bytes.clone());
        let mut app = HaggleApp::with_oracle(config, Box::new(oracle)).unwrap();

        app.prepare_item().await;

        let path = dir.join("nested").join("antique_vase.png");
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
        assert_eq!(app.game().item().image.as_deref(), Some(bytes.as_slice()));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_no_image_means_no_file() {
        let dir = scratch_dir("no-image");
        let mut config = config(1);
        config.generate_image = true;
        config.image_dir = Some(dir.clone());
        let mut app = HaggleApp::with_oracle(config, Box::new(ScriptedOracle::new())).unwrap();

        app.prepare_item().await;
        assert!(!dir.join("antique_vase.png").exists());
    }

    #[test]
    fn test_invalid_rules_fail_startup() {
        let mut config = config(1);
        config.rules.price_min = 300;
        assert!(HaggleApp::with_oracle(config, Box::new(ScriptedOracle::new())).is_err());
    }
}
