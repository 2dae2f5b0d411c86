//! Price candidate extraction from free text

use once_cell::sync::Lazy;
use regex::Regex;

/// Optional `$`, a digit run, optional decimal part. Commas are stripped
/// before matching.
static PRICE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?(\d+(?:\.\d+)?)").expect("price pattern is valid"));

/// Extract every number mentioned in `text`, in order of appearance.
///
/// Commas are removed first so `$1,250` reads as 1250. A period with no
/// digits after it ends the number (`"$80."` is 80). Text without numbers
/// yields an empty vector.
pub fn extract_prices(text: &str) -> Vec<f64> {
    let cleaned = text.replace(',', "");

    PRICE_PATTERN
        .captures_iter(&cleaned)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .collect()
}
