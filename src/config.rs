//! Configuration builders controlling training and decoding.

use serde::{Deserialize, Serialize};

use crate::error::{CodeswitchError, Result};

/// Configuration for character n-gram model training.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingConfig {
    /// N-gram order. Orders of 4 and above use doubled start/end padding.
    pub order: usize,
    /// Additive smoothing constant seeding every observed count.
    pub smoothing: f64,
    /// Enables training summaries through the `log` facade.
    pub show_progress: bool,
}

impl TrainingConfig {
    /// Returns a builder initialised with [`TrainingConfig::default`].
    #[must_use]
    pub fn builder() -> TrainingBuilder {
        TrainingBuilder::default()
    }

    /// Validates the invariants required for training.
    pub fn validate(&self) -> Result<()> {
        if self.order == 0 {
            return Err(CodeswitchError::InvalidConfig(
                "ngram order must be at least 1".into(),
            ));
        }
        if !(self.smoothing.is_finite() && self.smoothing > 0.0) {
            return Err(CodeswitchError::InvalidConfig(format!(
                "smoothing lambda ({}) must be positive and finite",
                self.smoothing
            )));
        }
        Ok(())
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            order: 2,
            smoothing: 0.001,
            show_progress: true,
        }
    }
}

/// Builder for [`TrainingConfig`].
#[derive(Debug, Default, Clone)]
pub struct TrainingBuilder {
    cfg: TrainingConfig,
}

impl TrainingBuilder {
    /// Creates a builder with [`TrainingConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the n-gram order.
    #[must_use]
    pub fn order(mut self, value: usize) -> Self {
        self.cfg.order = value;
        self
    }

    /// Sets the additive smoothing constant.
    #[must_use]
    pub fn smoothing(mut self, value: f64) -> Self {
        self.cfg.smoothing = value;
        self
    }

    /// Enables or disables training summaries.
    #[must_use]
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.cfg.show_progress = enabled;
        self
    }

    /// Finalises the builder, returning a validated [`TrainingConfig`].
    pub fn build(self) -> Result<TrainingConfig> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}

/// Strategy used to assign a language to each token in a sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DecodeMode {
    /// Each token is labelled with its higher-scoring language, ignoring context.
    Independent,
    /// The globally most probable label sequence under a two-state hidden Markov process.
    Viterbi,
}

/// Configuration for sequence decoding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DecoderConfig {
    /// Decoding strategy.
    pub mode: DecodeMode,
    /// Probability that the next token stays in the same language.
    pub transition_probability: f64,
    /// Probability that the first token belongs to language A.
    pub start_probability: f64,
}

impl DecoderConfig {
    /// Returns a builder initialised with [`DecoderConfig::default`].
    #[must_use]
    pub fn builder() -> DecoderBuilder {
        DecoderBuilder::default()
    }

    /// Validates the invariants required for decoding.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("transition_probability", self.transition_probability),
            ("start_probability", self.start_probability),
        ] {
            if !(value.is_finite() && value > 0.0 && value < 1.0) {
                return Err(CodeswitchError::InvalidConfig(format!(
                    "{name} ({value}) must lie strictly between 0 and 1"
                )));
            }
        }
        Ok(())
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            mode: DecodeMode::Viterbi,
            transition_probability: 0.78,
            start_probability: 0.75,
        }
    }
}

/// Builder for [`DecoderConfig`].
#[derive(Debug, Default, Clone)]
pub struct DecoderBuilder {
    cfg: DecoderConfig,
}

impl DecoderBuilder {
    /// Creates a builder with [`DecoderConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the decoding strategy.
    #[must_use]
    pub fn mode(mut self, mode: DecodeMode) -> Self {
        self.cfg.mode = mode;
        self
    }

    /// Sets the same-language transition probability.
    #[must_use]
    pub fn transition_probability(mut self, value: f64) -> Self {
        self.cfg.transition_probability = value;
        self
    }

    /// Sets the probability that the first token belongs to language A.
    #[must_use]
    pub fn start_probability(mut self, value: f64) -> Self {
        self.cfg.start_probability = value;
        self
    }

    /// Finalises the builder, returning a validated [`DecoderConfig`].
    pub fn build(self) -> Result<DecoderConfig> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn training_builder_overrides_defaults() {
        let cfg = TrainingConfig::builder()
            .order(3)
            .smoothing(0.01)
            .show_progress(false)
            .build()
            .expect("config should be valid");
        assert_eq!(cfg.order, 3);
        assert_eq!(cfg.smoothing, 0.01);
        assert!(!cfg.show_progress);
    }

    #[test]
    fn validate_rejects_zero_order() {
        let cfg = TrainingConfig {
            order: 0,
            ..TrainingConfig::default()
        };
        let err = cfg.validate().expect_err("validation should fail");
        assert!(matches!(
            err,
            CodeswitchError::InvalidConfig(message) if message.contains("order")
        ));
    }

    #[test]
    fn validate_rejects_non_positive_smoothing() {
        let cfg = TrainingConfig {
            smoothing: 0.0,
            ..TrainingConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn decoder_builder_overrides_defaults() {
        let cfg = DecoderConfig::builder()
            .mode(DecodeMode::Independent)
            .transition_probability(0.9)
            .start_probability(0.5)
            .build()
            .expect("config should be valid");
        assert_eq!(cfg.mode, DecodeMode::Independent);
        assert_eq!(cfg.transition_probability, 0.9);
        assert_eq!(cfg.start_probability, 0.5);
    }

    #[test]
    fn decoder_validate_rejects_boundary_probabilities() {
        for p in [0.0, 1.0, f64::NAN] {
            let cfg = DecoderConfig {
                transition_probability: p,
                ..DecoderConfig::default()
            };
            assert!(cfg.validate().is_err(), "{p} should be rejected");
        }
    }
}
