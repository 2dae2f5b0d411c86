//! Language model collaborator that plays the shop owner

pub mod openai;
pub mod scripted;

use crate::error::Result;
use crate::types::{Item, ItemDescription, Message, Money};
use async_trait::async_trait;

pub use openai::OpenAiOracle;
pub use scripted::ScriptedOracle;

/// Owner reply used when the service cannot be reached. It carries no
/// numbers, so the price always holds on that turn.
pub const FALLBACK_REPLY: &str = "I'm sorry, there was an error processing your request.";

/// Source of shop owner replies, items and item images
#[async_trait]
pub trait NegotiationOracle: Send + Sync {
    /// Reply to the latest player message given the whole conversation
    async fn owner_response(&self, history: &[Message], current_price: Money) -> Result<String>;

    /// Invent an item to haggle over
    async fn generate_item(&self) -> Result<ItemDescription>;

    /// Picture of the named item. `Ok(None)` when the service returned no image.
    async fn generate_item_image(&self, name: &str) -> Result<Option<Vec<u8>>>;
}

/// Owner reply, or [`FALLBACK_REPLY`] if the oracle failed
pub async fn owner_response_or_fallback(
    oracle: &dyn NegotiationOracle,
    history: &[Message],
    current_price: Money,
) -> String {
    match oracle.owner_response(history, current_price).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!("Owner response failed, using fallback reply: {}", e);
            FALLBACK_REPLY.to_string()
        }
    }
}

/// Generated item, or [`Item::fallback`] if the oracle failed
pub async fn item_or_fallback(oracle: &dyn NegotiationOracle) -> Item {
    match oracle.generate_item().await {
        Ok(desc) => desc.into(),
        Err(e) => {
            tracing::warn!("Item generation failed, using default item: {}", e);
            Item::fallback()
        }
    }
}

/// Generated image bytes, or `None` on any failure
pub async fn image_or_none(oracle: &dyn NegotiationOracle, name: &str) -> Option<Vec<u8>> {
    match oracle.generate_item_image(name).await {
        Ok(image) => image,
        Err(e) => {
            tracing::warn!("Image generation for {} failed: {}", name, e);
            None
        }
    }
}
