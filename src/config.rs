//! Generator configuration and its validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} should be a probability in [0, 1], got {value}")]
    Probability { name: &'static str, value: f64 },
    #[error("{name} should be at least {min}, got {value}")]
    TooSmall { name: &'static str, min: usize, value: usize },
    #[error("false_positive_rate should be in (0, 1], got {0}")]
    FalsePositiveRate(f64),
}

/// Knobs controlling the shape of synthesized patterns.
///
/// Threaded unchanged through every recursive call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityBudget {
    /// Maximum members in a random set.
    pub set_complexity: usize,
    /// Maximum alternatives in a union-wrapped group.
    pub union_complexity: usize,
    /// Budget for repeat lower bounds and their extra range.
    pub amount_complexity: u32,
    /// Maximum chars in a terminal group.
    pub group_complexity: usize,
    /// Recursion levels before groups become terminal.
    pub depth_complexity: usize,
    /// Maximum groups per pattern level.
    pub breadth_complexity: usize,
    pub special_char_prob: f64,
    pub complex_char_prob: f64,
    pub complex_group_prob: f64,
}

impl Default for ComplexityBudget {
    fn default() -> Self {
        Self {
            set_complexity: 2,
            union_complexity: 2,
            amount_complexity: 4,
            group_complexity: 10,
            depth_complexity: 0,
            breadth_complexity: 3,
            special_char_prob: 0.5,
            complex_char_prob: 0.5,
            complex_group_prob: 0.5,
        }
    }
}

impl ComplexityBudget {
    /// Checks the knobs the char generator reads.
    pub fn validate_chars(&self) -> Result<(), ConfigError> {
        at_least("set_complexity", self.set_complexity, 1)?;
        at_least("amount_complexity", self.amount_complexity as usize, 1)?;
        probability("special_char_prob", self.special_char_prob)?;
        probability("complex_char_prob", self.complex_char_prob)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_chars()?;
        at_least("breadth_complexity", self.breadth_complexity, 1)?;
        probability("complex_group_prob", self.complex_group_prob)
    }
}

/// Full configuration of a [`crate::RegexGenerator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Exclusive upper bound on the match count.
    pub max_complexity: usize,
    /// Exclusive upper bound on the rendered length.
    pub max_length: usize,
    /// Initial capacity of the dedup filter.
    pub item_count: usize,
    /// Target false-positive rate of the dedup filter.
    pub false_positive_rate: f64,
    pub budget: ComplexityBudget,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_complexity: 1000,
            max_length: 20,
            item_count: 100,
            false_positive_rate: 0.001,
            budget: ComplexityBudget::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.budget.validate()?;
        at_least("item_count", self.item_count, 1)?;
        if !(self.false_positive_rate > 0.0 && self.false_positive_rate <= 1.0) {
            return Err(ConfigError::FalsePositiveRate(self.false_positive_rate));
        }
        Ok(())
    }
}

fn probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { name, value })
    }
}

fn at_least(name: &'static str, value: usize, min: usize) -> Result<(), ConfigError> {
    if value >= min { Ok(()) } else { Err(ConfigError::TooSmall { name, min, value }) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_probabilities() {
        let mut config = GeneratorConfig::default();
        config.budget.complex_group_prob = 1.5;
        assert_eq!(
            config.validate(),
            Err(ConfigError::Probability { name: "complex_group_prob", value: 1.5 })
        );
        config.budget.complex_group_prob = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_budgets() {
        let mut config = GeneratorConfig::default();
        config.budget.breadth_complexity = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooSmall { name: "breadth_complexity", min: 1, value: 0 })
        );
        let config = GeneratorConfig { false_positive_rate: 0.0, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::FalsePositiveRate(0.0)));
    }
}
