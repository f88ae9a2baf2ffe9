//! Sentiment labels.

use serde::{Deserialize, Serialize};

/// Three-way sentiment label.
///
/// Parses case-insensitively from the single word a classifier returns.
///
/// ```
/// use std::str::FromStr;
/// use tollgate::Sentiment;
///
/// assert_eq!(Sentiment::from_str("Positive").unwrap(), Sentiment::Positive);
/// assert_eq!(Sentiment::Negative.to_string(), "negative");
/// assert!(Sentiment::from_str("mixed").is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Sentiment {
    /// Positive sentiment
    Positive,
    /// Negative sentiment
    Negative,
    /// Neutral, or anything that could not be classified
    #[default]
    Neutral,
}

impl Sentiment {
    /// Parse a classifier reply, treating anything unexpected as neutral.
    pub fn from_label(label: &str) -> Self {
        let word = label
            .trim()
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_ascii_lowercase();
        word.parse().unwrap_or_default()
    }
}
