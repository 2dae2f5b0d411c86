//! Offline shop owner with canned replies

use crate::error::{HaggleError, Result};
use crate::types::{ItemDescription, Message, Money};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::NegotiationOracle;

/// Deterministic oracle for offline play and tests.
///
/// Replies are taken from a queue first. Once the queue is empty the owner
/// knocks ten percent off the current price.
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<String>>,
    item: ItemDescription,
    image: Option<Vec<u8>>,
    fail: bool,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            item: ItemDescription {
                name: "Antique Vase".to_string(),
                description: "Hand-painted porcelain, only slightly chipped.".to_string(),
            },
            image: None,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Oracle that answers with `replies` in order
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let oracle = Self::new();
        if let Ok(mut queue) = oracle.replies.lock() {
            queue.extend(replies.into_iter().map(Into::into));
        }
        oracle
    }

    /// Oracle whose every call fails with a service error
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn with_item(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.item = ItemDescription {
            name: name.into(),
            description: description.into(),
        };
        self
    }

    /// Picture returned for any item
    pub fn with_image(mut self, bytes: Vec<u8>) -> Self {
        self.image = Some(bytes);
        self
    }

    /// Number of owner replies requested so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.fail {
            return Err(HaggleError::ServiceRequest(
                "scripted oracle is configured to fail".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NegotiationOracle for ScriptedOracle {
    async fn owner_response(&self, _history: &[Message], current_price: Money) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let queued = self
            .replies
            .lock()
            .map_err(|_| HaggleError::ServiceRequest("reply queue poisoned".to_string()))?
            .pop_front();

        Ok(queued.unwrap_or_else(|| {
            let counter = (current_price.value() * 0.9 * 100.0).round() / 100.0;
            format!("Oh, you drive a hard bargain. Fine, {} and that's final.", Money(counter))
        }))
    }

    async fn generate_item(&self) -> Result<ItemDescription> {
        self.check_available()?;
        Ok(self.item.clone())
    }

    async fn generate_item_image(&self, _name: &str) -> Result<Option<Vec<u8>>> {
        self.check_available()?;
        Ok(self.image.clone())
    }
}
