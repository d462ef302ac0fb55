//! Language models pairing a frequency lexicon with a character n-gram model.

use crate::error::{CodeswitchError, Result};
use crate::lexicon::Lexicon;
use crate::ngram::NgramModel;

/// Token reserved for positions that must not influence language assignment,
/// e.g. punctuation.
pub const DEFAULT_IGNORE_TOKEN: &str = "##IGNORE##";

/// Position of a language within a [`LanguagePair`].
///
/// Decoding enumerates slot A before slot B; exact score ties resolve to the
/// earlier slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The first language of the pair.
    A,
    /// The second language of the pair.
    B,
}

impl Slot {
    /// Both slots in enumeration order.
    pub const ALL: [Slot; 2] = [Slot::A, Slot::B];

    /// Index for table lookups.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }
}

/// Statistical model of a single language: one lexicon, one character n-gram
/// model, and the weight blending their evidence.
///
/// Immutable after construction; the weight is fixed and shared by all tokens
/// scored against this model.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageModel {
    language: String,
    lex_weight: f64,
    char_weight: f64,
    lexicon: Lexicon,
    ngram: NgramModel,
}

impl LanguageModel {
    /// Builds a language model from its parts.
    ///
    /// `lex_weight` is the weight of lexicon evidence in `[0, 1]`; character
    /// evidence receives the complement.
    pub fn new(
        language: impl Into<String>,
        lexicon: Lexicon,
        ngram: NgramModel,
        lex_weight: f64,
    ) -> Result<Self> {
        if !(lex_weight.is_finite() && (0.0..=1.0).contains(&lex_weight)) {
            return Err(CodeswitchError::InvalidConfig(format!(
                "lex_weight ({lex_weight}) must lie within [0, 1]"
            )));
        }
        Ok(Self {
            language: language.into(),
            lex_weight,
            char_weight: 1.0 - lex_weight,
            lexicon,
            ngram,
        })
    }

    /// Language identifier for this model.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Weight of lexicon evidence.
    #[must_use]
    pub fn lex_weight(&self) -> f64 {
        self.lex_weight
    }

    /// Weight of character-model evidence.
    #[must_use]
    pub fn char_weight(&self) -> f64 {
        self.char_weight
    }

    /// Log-probability of `word` according to the lexicon.
    #[must_use]
    pub fn lex_score(&self, word: &str) -> f64 {
        self.lexicon.lex_score(word)
    }

    /// Log-probability of `word` according to the character model.
    #[must_use]
    pub fn char_score(&self, word: &str) -> f64 {
        self.ngram.char_score(word)
    }

    /// The underlying lexicon.
    #[must_use]
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// The underlying character n-gram model.
    #[must_use]
    pub fn ngram(&self) -> &NgramModel {
        &self.ngram
    }
}

/// Two-language configuration consumed by the scorer and decoder.
///
/// The decoding state space is strictly binary, but the language identifiers
/// are arbitrary and fixed at construction.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct LanguagePair {
    a: LanguageModel,
    b: LanguageModel,
    ignore_token: String,
    affirmative: Option<String>,
}

impl LanguagePair {
    /// Pairs two language models.
    ///
    /// The models must carry distinct language identifiers and identical
    /// lexicon weights, so the blended scores stay comparable across slots.
    pub fn new(a: LanguageModel, b: LanguageModel) -> Result<Self> {
        if a.language == b.language {
            return Err(CodeswitchError::InvalidConfig(format!(
                "language pair requires distinct identifiers, got {:?} twice",
                a.language
            )));
        }
        if a.lex_weight != b.lex_weight {
            return Err(CodeswitchError::InvalidConfig(format!(
                "lexicon weights must match across the pair ({} vs {})",
                a.lex_weight, b.lex_weight
            )));
        }
        Ok(Self {
            a,
            b,
            ignore_token: DEFAULT_IGNORE_TOKEN.to_string(),
            affirmative: None,
        })
    }

    /// Overrides the sentinel token excluded from language assignment.
    pub fn with_ignore_token(mut self, token: impl Into<String>) -> Self {
        self.ignore_token = token.into();
        self
    }

    /// Sets the affirmative particle for language A.
    ///
    /// A one-token sequence case-insensitively equal to this word decodes to
    /// language A without consulting the models. A fixed linguistic
    /// exception, e.g. the Irish "sea".
    pub fn with_affirmative(mut self, word: impl Into<String>) -> Self {
        self.affirmative = Some(word.into().to_lowercase());
        self
    }

    /// Returns the model occupying the given slot.
    #[must_use]
    pub fn model(&self, slot: Slot) -> &LanguageModel {
        match slot {
            Slot::A => &self.a,
            Slot::B => &self.b,
        }
    }

    /// Returns the language identifier for the given slot.
    #[must_use]
    pub fn language(&self, slot: Slot) -> &str {
        self.model(slot).language()
    }

    /// The sentinel token excluded from language assignment.
    #[must_use]
    pub fn ignore_token(&self) -> &str {
        &self.ignore_token
    }

    /// The lower-cased affirmative particle for language A, if configured.
    #[must_use]
    pub fn affirmative(&self) -> Option<&str> {
        self.affirmative.as_deref()
    }
}
