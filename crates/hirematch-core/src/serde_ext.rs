//! Serde helpers for settings that may arrive as strings.
//!
//! Environment overrides reach the config layer as text, so a numeric
//! setting such as `HIREMATCH_SEARCH_DEFAULT_K=50` is seen as `"50"`.

use serde::Deserialize;
use serde::de::{self, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(usize),
    Text(String),
}

/// Deserialize a `usize` from either an integer or its decimal text.
///
/// Use with `#[serde(deserialize_with = "hirematch_core::serde_ext::usize_from_any")]`.
pub fn usize_from_any<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(text) => text.trim().parse().map_err(|_| {
            de::Error::custom(format!("expected a non-negative integer, got {text:?}"))
        }),
    }
}
