//! Per-model token pricing.

use serde::{Deserialize, Serialize};
use tollgate_error::ConfigError;

/// Price of one model, in dollars per 1000 tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(deny_unknown_fields)]
pub struct ModelPrice {
    /// Model identifier this entry prices.
    model: String,

    /// Dollars per 1000 prompt tokens.
    input: f64,

    /// Dollars per 1000 completion tokens.
    output: f64,
}

impl ModelPrice {
    /// Create a price entry.
    pub fn new(model: impl Into<String>, input: f64, output: f64) -> Self {
        Self {
            model: model.into(),
            input,
            output,
        }
    }

    /// Mean of the input and output price, used when the prompt/completion
    /// split is unknown.
    pub fn average(&self) -> f64 {
        (self.input + self.output) / 2.0
    }
}

/// Pricing for every known model, plus the model whose price applies to
/// anything unlisted.
///
/// Deserializes from an array of tables so model names containing dots
/// survive configuration layering:
///
/// ```toml
/// [pricing]
/// fallback_model = "gpt-3.5-turbo"
///
/// [[pricing.models]]
/// model = "gpt-3.5-turbo"
/// input = 0.0005
/// output = 0.0015
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct PricingTable {
    /// Known model prices.
    #[serde(default = "default_models")]
    models: Vec<ModelPrice>,

    /// Model whose entry prices unlisted models.
    #[serde(default = "default_fallback_model")]
    fallback_model: String,
}

fn default_models() -> Vec<ModelPrice> {
    vec![
        ModelPrice::new("gpt-3.5-turbo", 0.0005, 0.0015),
        ModelPrice::new("gpt-4", 0.03, 0.06),
        ModelPrice::new("text-embedding-ada-002", 0.0001, 0.0001),
    ]
}

fn default_fallback_model() -> String {
    "gpt-3.5-turbo".to_string()
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            models: default_models(),
            fallback_model: default_fallback_model(),
        }
    }
}

impl PricingTable {
    /// Create a table from explicit entries.
    pub fn new(models: Vec<ModelPrice>, fallback_model: impl Into<String>) -> Self {
        Self {
            models,
            fallback_model: fallback_model.into(),
        }
    }

    /// Exact entry for `model`, if one is listed.
    pub fn get(&self, model: &str) -> Option<&ModelPrice> {
        self.models.iter().find(|price| price.model == model)
    }

    /// Price for `model`, falling back to the fallback model's entry.
    ///
    /// Returns `None` only when neither is listed, which
    /// [`validate`](Self::validate) rules out.
    pub fn price_for(&self, model: &str) -> Option<&ModelPrice> {
        self.get(model).or_else(|| self.get(&self.fallback_model))
    }

    /// Dollar cost of one call.
    ///
    /// Uses the prompt/completion split when both counts are known and
    /// non-zero, otherwise `tokens_used` at the average of the two prices.
    /// Models with no price at all cost nothing.
    ///
    /// ```
    /// use tollgate_ledger::{ModelPrice, PricingTable};
    ///
    /// let table = PricingTable::new(vec![ModelPrice::new("gpt-4", 0.03, 0.06)], "gpt-4");
    /// let cost = table.cost("gpt-4", 1500, Some(1000), Some(500));
    /// assert!((cost - 0.06).abs() < 1e-9);
    /// ```
    pub fn cost(
        &self,
        model: &str,
        tokens_used: u64,
        input_tokens: Option<u64>,
        output_tokens: Option<u64>,
    ) -> f64 {
        let Some(price) = self.price_for(model) else {
            return 0.0;
        };

        match (input_tokens, output_tokens) {
            (Some(input), Some(output)) if input > 0 && output > 0 => {
                input as f64 / 1000.0 * price.input + output as f64 / 1000.0 * price.output
            }
            _ => tokens_used as f64 / 1000.0 * price.average(),
        }
    }

    /// Checks that the fallback model is priced and no price is negative.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.get(&self.fallback_model).is_none() {
            return Err(ConfigError::new(format!(
                "pricing.fallback_model '{}' has no pricing entry",
                self.fallback_model
            )));
        }

        for price in &self.models {
            let valid = |p: f64| p.is_finite() && p >= 0.0;
            if !valid(price.input) || !valid(price.output) {
                return Err(ConfigError::new(format!(
                    "pricing for '{}' must be non-negative",
                    price.model
                )));
            }
        }

        Ok(())
    }
}
