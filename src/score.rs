//! Per-token combination of lexicon and character-model evidence.

use crate::model::{LanguagePair, Slot};

/// Combined per-token log-probability scores, one per language slot.
///
/// Only the relative comparison between the two values is meaningful; they do
/// not sum to any fixed constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenScores {
    /// Score for the language in slot A.
    pub a: f64,
    /// Score for the language in slot B.
    pub b: f64,
}

impl TokenScores {
    /// Returns the score for the given slot.
    #[must_use]
    pub fn get(self, slot: Slot) -> f64 {
        match slot {
            Slot::A => self.a,
            Slot::B => self.b,
        }
    }
}

/// Computes the weighted log-probability of `token` under both languages.
///
/// Lexicon and character scores live on very different absolute scales, so
/// each is first normalized against the other language's score of the same
/// kind; the relative scores are then blended as probabilities with the
/// models' lexicon weight and returned in log form.
///
/// Two special cases keep the result meaningful for every token: the ignore
/// sentinel scores both languages exactly equal, and a word absent from both
/// lexicons is judged on character evidence alone, since a pair of identical
/// OOV penalties would cancel to nothing.
#[must_use]
pub fn score(pair: &LanguagePair, token: &str) -> TokenScores {
    if token == pair.ignore_token() {
        return TokenScores { a: 0.0, b: 0.0 };
    }

    let model_a = pair.model(Slot::A);
    let model_b = pair.model(Slot::B);

    let lex_a = model_a.lex_score(token);
    let lex_b = model_b.lex_score(token);
    let (char_rel_a, char_rel_b) = relative(model_a.char_score(token), model_b.char_score(token));

    if lex_a == model_a.lexicon().oov_log_prob() && lex_b == model_b.lexicon().oov_log_prob() {
        return TokenScores {
            a: char_rel_a.ln(),
            b: char_rel_b.ln(),
        };
    }

    let (lex_rel_a, lex_rel_b) = relative(lex_a, lex_b);
    TokenScores {
        a: (model_a.lex_weight() * lex_rel_a + model_a.char_weight() * char_rel_a).ln(),
        b: (model_b.lex_weight() * lex_rel_b + model_b.char_weight() * char_rel_b).ln(),
    }
}

/// Normalizes two log-domain scores into probabilities summing to one.
///
/// Shifts by the maximum before exponentiating so long tokens with very small
/// probabilities cannot underflow to a 0/0 division.
fn relative(log_a: f64, log_b: f64) -> (f64, f64) {
    let shift = log_a.max(log_b);
    let exp_a = (log_a - shift).exp();
    let exp_b = (log_b - shift).exp();
    let sum = exp_a + exp_b;
    (exp_a / sum, exp_b / sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainingConfig;
    use crate::lexicon::{Lexicon, LexiconEntry};
    use crate::model::LanguageModel;
    use crate::ngram::NgramModel;

    fn entries(words: &[(&str, u64)]) -> Vec<LexiconEntry> {
        words.iter().map(|(w, c)| (w.to_string(), *c)).collect()
    }

    fn toy_pair(lex_weight: f64) -> LanguagePair {
        let cfg = TrainingConfig::builder()
            .order(2)
            .smoothing(0.001)
            .show_progress(false)
            .build()
            .expect("valid config");
        let ga_entries = entries(&[("ab", 10), ("ac", 5)]);
        let en_entries = entries(&[("xy", 10), ("xz", 5)]);
        let ga = LanguageModel::new(
            "ga",
            Lexicon::from_entries(&ga_entries),
            NgramModel::train("ga", &ga_entries, &cfg).expect("training"),
            lex_weight,
        )
        .expect("valid model");
        let en = LanguageModel::new(
            "en",
            Lexicon::from_entries(&en_entries),
            NgramModel::train("en", &en_entries, &cfg).expect("training"),
            lex_weight,
        )
        .expect("valid model");
        LanguagePair::new(ga, en).expect("valid pair")
    }

    #[test]
    fn ignore_token_scores_both_languages_equally() {
        let pair = toy_pair(1.0);
        let scores = score(&pair, pair.ignore_token());
        assert_eq!(scores.a, scores.b);
        assert_eq!(scores.a, 0.0);
    }

    #[test]
    fn lexicon_word_favors_its_language() {
        let pair = toy_pair(1.0);
        let scores = score(&pair, "ab");
        assert!(scores.a > scores.b, "{} vs {}", scores.a, scores.b);
        let scores = score(&pair, "xy");
        assert!(scores.b > scores.a, "{} vs {}", scores.a, scores.b);
    }

    #[test]
    fn scores_are_finite_for_arbitrary_tokens() {
        let pair = toy_pair(0.5);
        for token in ["ab", "xy", "zz", "Éire", "a", ""] {
            let scores = score(&pair, token);
            assert!(scores.a.is_finite(), "{token:?} slot A");
            assert!(scores.b.is_finite(), "{token:?} slot B");
        }
    }

    #[test]
    fn word_missing_from_both_lexicons_uses_character_evidence_only() {
        let pair = toy_pair(1.0);
        // "az" is OOV in both lexicons but shares its first transition with
        // language A's corpus, so character evidence alone must decide.
        let scores = score(&pair, "az");
        let (char_rel_a, char_rel_b) = relative(
            pair.model(Slot::A).char_score("az"),
            pair.model(Slot::B).char_score("az"),
        );
        assert!((scores.a - char_rel_a.ln()).abs() < 1e-12);
        assert!((scores.b - char_rel_b.ln()).abs() < 1e-12);
        assert!(scores.a > scores.b);
    }

    #[test]
    fn in_lexicon_word_blends_both_evidence_sources() {
        let pair = toy_pair(0.6);
        let model_a = pair.model(Slot::A);
        let model_b = pair.model(Slot::B);
        let (lex_rel_a, _) = relative(model_a.lex_score("ab"), model_b.lex_score("ab"));
        let (char_rel_a, _) = relative(model_a.char_score("ab"), model_b.char_score("ab"));
        let expected = (0.6 * lex_rel_a + 0.4 * char_rel_a).ln();
        assert!((score(&pair, "ab").a - expected).abs() < 1e-12);
    }

    #[test]
    fn relative_scores_survive_extreme_magnitudes() {
        let (a, b) = relative(-2000.0, -2001.0);
        assert!(a.is_finite() && b.is_finite());
        assert!((a + b - 1.0).abs() < 1e-12);
        assert!(a > b);
    }
}
