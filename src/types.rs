//! Core types used throughout Haggle

use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-negative amount of money. Displayed with two decimals; comparisons
/// use the raw value.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Money(pub f64);

impl Money {
    /// Whole-dollar amount
    pub fn from_dollars(dollars: u32) -> Self {
        Money(f64::from(dollars))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl From<f64> for Money {
    fn from(value: f64) -> Self {
        Money(value)
    }
}

/// One of the two local players
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerId {
    Player1,
    Player2,
}

impl PlayerId {
    pub fn number(&self) -> u8 {
        match self {
            PlayerId::Player1 => 1,
            PlayerId::Player2 => 2,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

/// Who said a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    Player,
    Owner,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::Player => write!(f, "Player"),
            Speaker::Owner => write!(f, "Owner"),
        }
    }
}

/// A single line of the haggling conversation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    speaker: Speaker,
    text: String,
}

impl Message {
    pub fn player(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Player,
            text: text.into(),
        }
    }

    pub fn owner(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Owner,
            text: text.into(),
        }
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.speaker, self.text)
    }
}

/// Name and description of an item, as produced by the oracle
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDescription {
    pub name: String,
    pub description: String,
}

/// The item up for haggling in the current game
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub name: String,
    pub description: String,
    /// Encoded image bytes, if one was generated
    pub image: Option<Vec<u8>>,
}

impl Item {
    pub const FALLBACK_NAME: &'static str = "Mystery Item";
    pub const FALLBACK_DESCRIPTION: &'static str =
        "A curious object of uncertain origin. The owner swears it is priceless.";

    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image: None,
        }
    }

    /// Used when item generation fails
    pub fn fallback() -> Self {
        Self::new(Self::FALLBACK_NAME, Self::FALLBACK_DESCRIPTION)
    }

    /// Filesystem-friendly form of the item name
    pub fn slug(&self) -> String {
        let slug: String = self
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        let trimmed = slug.trim_matches('_');
        if trimmed.is_empty() {
            "item".to_string()
        } else {
            trimmed.to_string()
        }
    }
}

impl From<ItemDescription> for Item {
    fn from(desc: ItemDescription) -> Self {
        Item::new(desc.name, desc.description)
    }
}
