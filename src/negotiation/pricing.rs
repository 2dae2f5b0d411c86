//! Price adjustment from one round of haggling

use crate::types::Money;

use super::extract::extract_prices;

/// Counteroffers at or above this multiple of the current price are ignored.
pub const MAX_COUNTER_MULTIPLIER: f64 = 2.0;

/// Work out the price after the owner replied to the player.
///
/// Numbers the player mentioned are dropped from the owner's reply, since the
/// owner often echoes them back. The first remaining number strictly between
/// zero and twice the current price becomes the new price. When none
/// qualifies the price holds.
pub fn next_price(player_text: &str, owner_text: &str, current_price: Money) -> Money {
    let mentioned = extract_prices(player_text);
    let ceiling = current_price.value() * MAX_COUNTER_MULTIPLIER;

    let counter = extract_prices(owner_text)
        .into_iter()
        .filter(|price| !mentioned.contains(price))
        .find(|&price| price > 0.0 && price < ceiling);

    match counter {
        Some(price) => {
            tracing::debug!("Owner countered at {} (was {})", Money(price), current_price);
            Money(price)
        }
        None => {
            tracing::debug!("No counteroffer recognised, price holds at {}", current_price);
            current_price
        }
    }
}
