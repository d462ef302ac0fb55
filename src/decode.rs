//! Sequence decoding: independent and two-state Viterbi labeling.

use rayon::prelude::*;

use crate::config::{DecodeMode, DecoderBuilder, DecoderConfig};
use crate::error::{CodeswitchError, Result};
use crate::model::{LanguagePair, Slot};
use crate::score::score;

/// High-level façade assigning a language label to each token of a sequence.
///
/// Holds only configuration; the trained models are shared read-only, so any
/// number of sequences may be decoded concurrently against the same pair.
#[derive(Debug, Clone)]
pub struct Decoder {
    cfg: DecoderConfig,
}

impl Decoder {
    /// Creates a decoder for the supplied configuration.
    #[must_use]
    pub fn new(cfg: DecoderConfig) -> Self {
        Self { cfg }
    }

    /// Returns a [`DecoderBuilder`] with default settings.
    #[must_use]
    pub fn builder() -> DecoderBuilder {
        DecoderConfig::builder()
    }

    /// Returns an immutable reference to the underlying configuration.
    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.cfg
    }

    /// Assigns a language label to each token.
    ///
    /// The output has the same length and order as `tokens`, and every label
    /// is one of the pair's two language identifiers. An empty sequence is
    /// rejected: Viterbi initialization requires at least one token.
    ///
    /// A one-token sequence matching the pair's affirmative particle
    /// short-circuits to language A before any scoring.
    pub fn decode<S: AsRef<str>>(&self, pair: &LanguagePair, tokens: &[S]) -> Result<Vec<String>> {
        self.cfg.validate()?;
        if tokens.is_empty() {
            return Err(CodeswitchError::InvalidInput(
                "cannot decode an empty token sequence".into(),
            ));
        }

        if let Some(affirmative) = pair.affirmative() {
            if tokens.len() == 1 && tokens[0].as_ref().to_lowercase() == affirmative {
                return Ok(vec![pair.language(Slot::A).to_string()]);
            }
        }

        let slots = match self.cfg.mode {
            DecodeMode::Independent => independent(pair, tokens),
            DecodeMode::Viterbi => self.viterbi(pair, tokens),
        };
        Ok(slots
            .into_iter()
            .map(|slot| pair.language(slot).to_string())
            .collect())
    }

    /// Decodes many token sequences in parallel against the shared pair.
    pub fn decode_batch<S>(
        &self,
        pair: &LanguagePair,
        sequences: &[Vec<S>],
    ) -> Result<Vec<Vec<String>>>
    where
        S: AsRef<str> + Sync,
    {
        sequences
            .par_iter()
            .map(|tokens| self.decode(pair, tokens))
            .collect()
    }

    fn viterbi<S: AsRef<str>>(&self, pair: &LanguagePair, tokens: &[S]) -> Vec<Slot> {
        let stay = self.cfg.transition_probability.ln();
        let switch = (1.0 - self.cfg.transition_probability).ln();
        let transition =
            |from: Slot, to: Slot| -> f64 { if from == to { stay } else { switch } };

        // Initial step: start prior plus first emission.
        let first = score(pair, tokens[0].as_ref());
        let mut best = [
            self.cfg.start_probability.ln() + first.a,
            (1.0 - self.cfg.start_probability).ln() + first.b,
        ];

        // Backpointers for positions 1..len; none are needed for position 0.
        let mut back: Vec<[Slot; 2]> = Vec::with_capacity(tokens.len().saturating_sub(1));

        for token in &tokens[1..] {
            let emission = score(pair, token.as_ref());
            let mut next = [0.0f64; 2];
            let mut pointers = [Slot::A; 2];
            for slot in Slot::ALL {
                let (argmax, max) = max_argmax(Slot::ALL.map(|prev| {
                    best[prev.index()] + transition(prev, slot) + emission.get(slot)
                }));
                next[slot.index()] = max;
                pointers[slot.index()] = argmax;
            }
            back.push(pointers);
            best = next;
        }

        let (last, _) = max_argmax(best);
        let mut path = vec![last; tokens.len()];
        for t in (1..tokens.len()).rev() {
            path[t - 1] = back[t - 1][path[t].index()];
        }
        path
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

fn independent<S: AsRef<str>>(pair: &LanguagePair, tokens: &[S]) -> Vec<Slot> {
    tokens
        .iter()
        .map(|token| {
            let scores = score(pair, token.as_ref());
            if scores.a >= scores.b {
                Slot::A
            } else {
                Slot::B
            }
        })
        .collect()
}

/// Returns the maximizing slot and its value, resolving exact ties in favor of
/// the earlier-enumerated slot.
fn max_argmax(values: [f64; 2]) -> (Slot, f64) {
    if values[1] > values[0] {
        (Slot::B, values[1])
    } else {
        (Slot::A, values[0])
    }
}
