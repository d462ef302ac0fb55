//! Character n-gram Markov model: training and log-probability scoring.

use log::{info, trace};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::TrainingConfig;
use crate::error::{CodeswitchError, Result};
use crate::lexicon::LexiconEntry;

/// Sentinel marking the start of a padded token.
pub const START: char = '<';
/// Sentinel marking the end of a padded token.
pub const END: char = '>';

/// Splits a word into overlapping character ngrams, adding start and end sentinels.
///
/// Orders of 4 and above use doubled padding so the first and last ngrams still
/// carry positional context.
///
/// ```
/// assert_eq!(codeswitch::ngram::ngrams("agus", 3), ["<ag", "agu", "gus", "us>"]);
/// ```
#[must_use]
pub fn ngrams(word: &str, order: usize) -> Vec<String> {
    let chars: Vec<char> = pad(word, order).chars().collect();
    if chars.len() < order {
        return Vec::new();
    }
    chars.windows(order).map(|w| w.iter().collect()).collect()
}

fn pad(word: &str, order: usize) -> String {
    let wraps = if order >= 4 { 2 } else { 1 };
    let mut padded = String::with_capacity(word.len() + 2 * wraps);
    for _ in 0..wraps {
        padded.push(START);
    }
    padded.push_str(word);
    for _ in 0..wraps {
        padded.push(END);
    }
    padded
}

/// Log-probability table with an explicit fallback for keys never observed
/// during training.
///
/// Lookups are total: [`ProbTable::get`] resolves every query either to a
/// direct entry or to the table's fallback value.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbTable {
    entries: FxHashMap<String, f64>,
    unknown: f64,
}

impl ProbTable {
    /// Builds a table from `(key, log-probability)` pairs and a fallback value.
    #[must_use]
    pub fn from_entries<I>(entries: I, unknown: f64) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        Self {
            entries: entries.into_iter().collect(),
            unknown,
        }
    }

    fn with_unknown(unknown: f64) -> Self {
        Self {
            entries: FxHashMap::default(),
            unknown,
        }
    }

    fn insert(&mut self, key: String, value: f64) {
        self.entries.insert(key, value);
    }

    /// Returns the log-probability for `key`, or the fallback if unseen.
    #[must_use]
    pub fn get(&self, key: &str) -> f64 {
        self.entries.get(key).copied().unwrap_or(self.unknown)
    }

    /// Returns whether `key` has a direct entry.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the fallback log-probability for unseen keys.
    #[must_use]
    pub fn unknown(&self) -> f64 {
        self.unknown
    }

    /// Number of direct entries, excluding the fallback.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table holds no direct entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the direct `(key, log-probability)` entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), *value))
    }
}

/// Trained character n-gram Markov model for a single language.
///
/// Immutable after training. Every ngram that can occur during scoring
/// resolves either to a direct entry or to a fallback, so [`char_score`]
/// never fails.
///
/// [`char_score`]: NgramModel::char_score
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct NgramModel {
    language: String,
    order: usize,
    start: ProbTable,
    transitions: FxHashMap<String, ProbTable>,
    unseen: f64,
}

impl NgramModel {
    /// Trains a model on `(word, frequency)` lexicon entries.
    ///
    /// Counts are weighted by word frequency and seeded with the configured
    /// smoothing constant, then converted to log-probabilities. The start
    /// table, each transition row, and the model itself each carry a fallback
    /// so scoring stays total for unseen input.
    pub fn train(
        language: impl Into<String>,
        entries: &[LexiconEntry],
        cfg: &TrainingConfig,
    ) -> Result<Self> {
        cfg.validate()?;
        if entries.is_empty() {
            return Err(CodeswitchError::InvalidConfig(
                "training requires at least one lexicon entry".into(),
            ));
        }
        let language = language.into();
        let order = cfg.order;
        let lambda = cfg.smoothing;
        if cfg.show_progress {
            info!("training {order}-gram model for language: {language}");
        }

        // Token count weighted by frequency.
        let mut token_total = 0.0f64;
        let mut start_count: FxHashMap<String, f64> = FxHashMap::default();
        let mut trans_count: FxHashMap<String, FxHashMap<String, f64>> = FxHashMap::default();
        // Transition totals per source ngram, i.e. ngram counts excluding
        // sequence-final ngrams. Not seeded with lambda.
        let mut trans_total: FxHashMap<String, f64> = FxHashMap::default();
        let mut charset: FxHashSet<char> = FxHashSet::default();

        for (word, count) in entries {
            let count = *count as f64;
            token_total += count;
            let padded = pad(word, order);
            charset.extend(padded.chars());
            let chars: Vec<char> = padded.chars().collect();
            if chars.len() < order {
                continue;
            }
            let grams: Vec<String> = chars.windows(order).map(|w| w.iter().collect()).collect();
            *start_count.entry(grams[0].clone()).or_insert(lambda) += count;
            for pair in grams.windows(2) {
                let row = trans_count.entry(pair[0].clone()).or_default();
                *row.entry(pair[1].clone()).or_insert(lambda) += count;
                *trans_total.entry(pair[0].clone()).or_insert(0.0) += count;
            }
        }

        // Fallback for source ngrams with no observed outgoing transitions.
        let unseen = (1.0 / (charset.len() as f64 + 1.0)).ln();

        let start_denominator = token_total + lambda * (start_count.len() as f64 + 1.0);
        let mut start = ProbTable::with_unknown((lambda / start_denominator).ln());
        for (gram, count) in start_count {
            start.insert(gram, (count / start_denominator).ln());
        }

        let mut transitions: FxHashMap<String, ProbTable> = FxHashMap::default();
        transitions.reserve(trans_count.len());
        for (gram, counts) in trans_count {
            let total = trans_total.get(&gram).copied().unwrap_or(0.0);
            let denominator = total + lambda * (counts.len() as f64 + 1.0);
            let mut row = ProbTable::with_unknown((lambda / denominator).ln());
            for (next, count) in counts {
                row.insert(next, (count / denominator).ln());
            }
            transitions.insert(gram, row);
        }

        if cfg.show_progress {
            info!(
                "model for {language} trained on {token_total} tokens: {} start ngrams, {} transition sources",
                start.len(),
                transitions.len()
            );
        }

        Ok(Self {
            language,
            order,
            start,
            transitions,
            unseen,
        })
    }

    /// Reassembles a model from its constituent tables, e.g. after loading a
    /// persisted record.
    pub fn from_parts(
        language: impl Into<String>,
        order: usize,
        start: ProbTable,
        transitions: FxHashMap<String, ProbTable>,
        unseen: f64,
    ) -> Result<Self> {
        if order == 0 {
            return Err(CodeswitchError::InvalidConfig(
                "ngram order must be at least 1".into(),
            ));
        }
        Ok(Self {
            language: language.into(),
            order,
            start,
            transitions,
            unseen,
        })
    }

    /// Returns the log-probability of the given word under the character model.
    ///
    /// The word is padded and split into overlapping ngrams; the starting
    /// ngram probability is added, then each consecutive transition. Unknown
    /// ngrams resolve through the fallback chain: row fallback when the
    /// transition is unseen, model fallback when the source ngram itself is.
    /// The result is not normalized across languages.
    #[must_use]
    pub fn char_score(&self, word: &str) -> f64 {
        let grams = ngrams(word, self.order);
        let Some(first) = grams.first() else {
            return self.start.unknown();
        };
        let mut logp = self.start.get(first);
        for pair in grams.windows(2) {
            let step = match self.transitions.get(pair[0].as_str()) {
                Some(row) => row.get(&pair[1]),
                None => self.unseen,
            };
            trace!("{} -> {}: {step}", pair[0], pair[1]);
            logp += step;
        }
        logp
    }

    /// Language identifier this model was trained for.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// N-gram order of the model.
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Start-ngram log-probability table.
    #[must_use]
    pub fn start_table(&self) -> &ProbTable {
        &self.start
    }

    /// Transition rows keyed by source ngram.
    #[must_use]
    pub fn transitions(&self) -> &FxHashMap<String, ProbTable> {
        &self.transitions
    }

    /// Log-probability applied when a source ngram was never observed.
    #[must_use]
    pub fn unseen_log_prob(&self) -> f64 {
        self.unseen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(word: &str, count: u64) -> LexiconEntry {
        (word.to_string(), count)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    fn toy_config() -> TrainingConfig {
        TrainingConfig::builder()
            .order(2)
            .smoothing(0.001)
            .show_progress(false)
            .build()
            .expect("valid config")
    }

    #[test]
    fn ngrams_pad_once_below_order_four() {
        assert_eq!(ngrams("agus", 2), ["<a", "ag", "gu", "us", "s>"]);
        assert_eq!(ngrams("agus", 3), ["<ag", "agu", "gus", "us>"]);
    }

    #[test]
    fn ngrams_pad_twice_from_order_four() {
        assert_eq!(
            ngrams("agus", 4),
            ["<<ag", "<agu", "agus", "gus>", "us>>"]
        );
    }

    #[test]
    fn ngrams_split_on_character_boundaries() {
        assert_eq!(ngrams("sé", 2), ["<s", "sé", "é>"]);
    }

    #[test]
    fn trained_tables_match_hand_computation() {
        let model = NgramModel::train("ga", &[entry("ab", 10), entry("ac", 5)], &toy_config())
            .expect("training");

        // Padded corpus: "<ab>" x10, "<ac>" x5. Charset {<, a, b, c, >}.
        assert!(approx(model.unseen_log_prob(), (1.0f64 / 6.0).ln()));

        let start_denominator = 15.0 + 0.001 * 2.0;
        assert!(approx(
            model.start_table().get("<a"),
            (15.001f64 / start_denominator).ln()
        ));
        assert!(approx(
            model.start_table().unknown(),
            (0.001f64 / start_denominator).ln()
        ));

        let row = model.transitions().get("<a").expect("row for <a");
        let denominator = 15.0 + 0.001 * 3.0;
        assert!(approx(row.get("ab"), (10.001f64 / denominator).ln()));
        assert!(approx(row.get("ac"), (5.001f64 / denominator).ln()));
        assert!(approx(row.unknown(), (0.001f64 / denominator).ln()));

        let row = model.transitions().get("ab").expect("row for ab");
        let denominator = 10.0 + 0.001 * 2.0;
        assert!(approx(row.get("b>"), (10.001f64 / denominator).ln()));
    }

    #[test]
    fn char_score_sums_start_and_transition_probabilities() {
        let model = NgramModel::train("ga", &[entry("ab", 10), entry("ac", 5)], &toy_config())
            .expect("training");
        let expected = (15.001f64 / 15.002).ln()
            + (10.001f64 / 15.003).ln()
            + (10.001f64 / 10.002).ln();
        assert!(approx(model.char_score("ab"), expected));
    }

    #[test]
    fn training_words_never_hit_fallbacks() {
        let words = [entry("agus", 20), entry("maith", 9), entry("sé", 12)];
        for order in 1..=5 {
            let cfg = TrainingConfig::builder()
                .order(order)
                .show_progress(false)
                .build()
                .expect("valid config");
            let model = NgramModel::train("ga", &words, &cfg).expect("training");
            for (word, _) in &words {
                let grams = ngrams(word, order);
                assert!(
                    model.start_table().contains(&grams[0]),
                    "order {order}: start ngram {:?} missing",
                    grams[0]
                );
                for pair in grams.windows(2) {
                    let row = model
                        .transitions()
                        .get(pair[0].as_str())
                        .unwrap_or_else(|| panic!("order {order}: no row for {:?}", pair[0]));
                    assert!(
                        row.contains(&pair[1]),
                        "order {order}: transition {:?} -> {:?} missing",
                        pair[0],
                        pair[1]
                    );
                }
            }
        }
    }

    #[test]
    fn unseen_words_resolve_through_fallbacks() {
        let model = NgramModel::train("ga", &[entry("ab", 10), entry("ac", 5)], &toy_config())
            .expect("training");
        // "z" never occurs: the start ngram falls back, and both transitions
        // route through unseen source ngrams.
        let score = model.char_score("zz");
        assert!(score.is_finite());
        let expected = model.start_table().unknown() + 2.0 * model.unseen_log_prob();
        assert!(approx(score, expected));
    }

    #[test]
    fn training_rejects_empty_lexicon() {
        let err = NgramModel::train("ga", &[], &toy_config()).expect_err("should fail");
        assert!(matches!(err, CodeswitchError::InvalidConfig(_)));
    }
}
