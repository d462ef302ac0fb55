//! Frequency lexicon loading and smoothed word log-probabilities.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::error::{CodeswitchError, Result};

/// Reserved lexicon entry standing in for words absent from the lexicon.
pub const OOV: &str = "###";

/// Words at least this many characters long are lower-cased before lookup and
/// storage. Shorter words keep their original case: short function words are
/// frequent enough for case to carry signal, e.g. English "I", or
/// sentence-initial "Is" versus "A".
pub const CASE_SENSITIVITY_THRESHOLD: usize = 4;

/// Additive smoothing constant applied to every observed word and to the OOV entry.
const LEXICON_SMOOTHING: f64 = 0.1;

/// A parsed `(word, frequency)` lexicon line.
pub type LexiconEntry = (String, u64);

/// Reads whitespace-delimited `word frequency` lines from the supplied reader.
///
/// Blank lines are skipped. A line missing its frequency field, or carrying a
/// non-numeric frequency, aborts the read with
/// [`CodeswitchError::MalformedLexicon`].
pub fn read_lexicon_entries<R: BufRead>(
    reader: R,
    path: Option<&Path>,
) -> Result<Vec<LexiconEntry>> {
    let mut entries = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| CodeswitchError::io(err, path.map(Path::to_path_buf)))?;
        let mut fields = line.split_whitespace();
        let Some(word) = fields.next() else {
            continue;
        };
        let Some(frequency) = fields.next() else {
            return Err(CodeswitchError::MalformedLexicon {
                path: path.map(Path::to_path_buf),
                line: idx + 1,
                message: "missing frequency field".into(),
            });
        };
        let count: u64 = frequency.parse().map_err(|_| CodeswitchError::MalformedLexicon {
            path: path.map(Path::to_path_buf),
            line: idx + 1,
            message: format!("non-numeric frequency {frequency:?}"),
        })?;
        entries.push((word.to_string(), count));
    }
    Ok(entries)
}

/// Loads `(word, frequency)` pairs from a UTF-8 lexicon file on disk.
pub fn load_lexicon_entries<P: AsRef<Path>>(path: P) -> Result<Vec<LexiconEntry>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| CodeswitchError::io(err, Some(path.to_path_buf())))?;
    read_lexicon_entries(BufReader::new(file), Some(path))
}

/// Immutable mapping from normalized word to smoothed log-probability.
///
/// Built once from frequency counts; every query resolves either to a direct
/// entry or to the reserved [`OOV`] entry, so lookups are total.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexicon {
    words: FxHashMap<String, f64>,
    oov_log_prob: f64,
}

impl Lexicon {
    /// Builds a lexicon from `(word, frequency)` pairs.
    ///
    /// Frequencies of case variants collapsing to the same normalized word are
    /// summed. Every observed word and the OOV entry receive an additive
    /// smoothing baseline before normalization.
    #[must_use]
    pub fn from_entries(entries: &[LexiconEntry]) -> Self {
        let mut words: FxHashMap<String, f64> = FxHashMap::default();
        let mut total: u64 = 0;
        for (word, count) in entries {
            let key = normalize(word).into_owned();
            *words.entry(key).or_insert(LEXICON_SMOOTHING) += *count as f64;
            total += count;
        }
        words.insert(OOV.to_string(), LEXICON_SMOOTHING);

        let denominator = total as f64 + LEXICON_SMOOTHING * words.len() as f64;
        for value in words.values_mut() {
            *value = (*value / denominator).ln();
        }
        let oov_log_prob = (LEXICON_SMOOTHING / denominator).ln();
        Self {
            words,
            oov_log_prob,
        }
    }

    /// Loads and builds a lexicon from a UTF-8 frequency file on disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_entries(&load_lexicon_entries(path)?))
    }

    /// Returns the log-probability of the given word, falling back to the OOV
    /// entry for words absent from the lexicon.
    #[must_use]
    pub fn lex_score(&self, word: &str) -> f64 {
        self.words
            .get(normalize(word).as_ref())
            .copied()
            .unwrap_or(self.oov_log_prob)
    }

    /// Returns the log-probability reserved for out-of-vocabulary words.
    #[must_use]
    pub fn oov_log_prob(&self) -> f64 {
        self.oov_log_prob
    }

    /// Returns whether the normalized form of `word` has a direct entry.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(normalize(word).as_ref())
    }

    /// Number of entries, including the reserved OOV entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` if the lexicon holds no entries beyond the OOV reserve.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.len() <= 1
    }
}

fn normalize(word: &str) -> Cow<'_, str> {
    if word.chars().count() >= CASE_SENSITIVITY_THRESHOLD {
        Cow::Owned(word.to_lowercase())
    } else {
        Cow::Borrowed(word)
    }
}
