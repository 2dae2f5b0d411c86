//! Game and service configuration

use crate::cli::PlayArgs;
use crate::error::{HaggleError, Result};
use std::path::PathBuf;

/// Rules of a single game
#[derive(Clone, Debug, PartialEq)]
pub struct GameRules {
    /// Lowest starting price, whole dollars
    pub price_min: u32,
    /// Highest starting price, whole dollars
    pub price_max: u32,
    /// Messages each player may send
    pub max_attempts: u32,
    pub item_name: String,
    pub item_description: String,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            price_min: 100,
            price_max: 500,
            max_attempts: 3,
            item_name: "Antique Vase".to_string(),
            item_description: "A delicate vase of questionable provenance.".to_string(),
        }
    }
}

impl GameRules {
    pub fn validate(&self) -> Result<()> {
        if self.price_min == 0 {
            return Err(HaggleError::Configuration(
                "minimum price must be at least 1".to_string(),
            ));
        }
        if self.price_min > self.price_max {
            return Err(HaggleError::Configuration(format!(
                "minimum price {} exceeds maximum price {}",
                self.price_min, self.price_max
            )));
        }
        if self.max_attempts == 0 {
            return Err(HaggleError::Configuration(
                "players need at least one attempt".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for the OpenAI-compatible service
#[derive(Clone, Debug, PartialEq)]
pub struct OracleConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub image_model: String,
    pub image_size: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            image_model: "dall-e-2".to_string(),
            image_size: "256x256".to_string(),
            max_tokens: 150,
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

/// Everything the `play` command needs
#[derive(Clone, Debug, Default)]
pub struct GameConfig {
    pub rules: GameRules,
    pub oracle: OracleConfig,
    /// Use the scripted owner instead of the service
    pub offline: bool,
    pub generate_item: bool,
    pub generate_image: bool,
    /// Where fetched item images are written
    pub image_dir: Option<PathBuf>,
    /// Seed for the starting price draw
    pub seed: Option<u64>,
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        self.rules.validate()?;

        if !self.offline && self.oracle.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(HaggleError::MissingConfig(
                "OPENAI_API_KEY (or pass --offline)".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.oracle.temperature) {
            return Err(HaggleError::Configuration(format!(
                "temperature {} is outside 0.0..=2.0",
                self.oracle.temperature
            )));
        }
        if self.generate_image && self.image_dir.is_none() {
            tracing::warn!("Image generation enabled without --image-dir; images will not be saved");
        }
        Ok(())
    }
}

impl TryFrom<PlayArgs> for GameConfig {
    type Error = HaggleError;

    fn try_from(args: PlayArgs) -> Result<Self> {
        let config = GameConfig {
            rules: GameRules {
                price_min: args.min_price,
                price_max: args.max_price,
                max_attempts: args.max_attempts,
                item_name: args.item,
                item_description: args.item_description,
            },
            oracle: OracleConfig {
                api_key: args.api_key,
                base_url: args.base_url,
                model: args.model,
                image_model: args.image_model,
                image_size: args.image_size,
                max_tokens: args.max_tokens,
                temperature: args.temperature,
                timeout_secs: args.timeout,
            },
            offline: args.offline,
            generate_item: args.generate_item,
            generate_image: args.generate_image,
            image_dir: args.image_dir,
            seed: args.seed,
        };

        config.validate()?;
        Ok(config)
    }
}
