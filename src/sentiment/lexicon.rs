//! Lexical polarity scorer.
//!
//! Each known word carries a polarity in `[-1, 1]`.  An intensifier right
//! before a word scales it, a negator up to two tokens back flips and halves
//! it, and the text's score is the mean over every scored word.

use std::collections::HashMap;

use super::PolarityModel;

/// How far back (in tokens) a negator still applies.
const NEGATION_WINDOW: usize = 2;
/// Negated words are flipped and dampened by this factor.
const NEGATION_FACTOR: f64 = -0.5;

const WORDS: &[(&str, f64)] = &[
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("beautiful", 0.85),
    ("best", 1.0),
    ("better", 0.5),
    ("brilliant", 0.9),
    ("classy", 0.5),
    ("comfortable", 0.4),
    ("cool", 0.35),
    ("excellent", 1.0),
    ("excited", 0.375),
    ("fantastic", 0.4),
    ("fast", 0.2),
    ("fun", 0.3),
    ("glad", 0.5),
    ("good", 0.7),
    ("gorgeous", 0.7),
    ("great", 0.8),
    ("happy", 0.8),
    ("impressive", 1.0),
    ("love", 0.5),
    ("loved", 0.7),
    ("lovely", 0.5),
    ("nice", 0.6),
    ("perfect", 1.0),
    ("powerful", 0.3),
    ("smooth", 0.4),
    ("stunning", 0.5),
    ("superb", 1.0),
    ("wonderful", 1.0),
    ("angry", -0.5),
    ("annoying", -0.8),
    ("awful", -1.0),
    ("bad", -0.7),
    ("boring", -1.0),
    ("broken", -0.4),
    ("disappointed", -0.75),
    ("disappointing", -0.6),
    ("expensive", -0.5),
    ("hate", -0.8),
    ("horrible", -1.0),
    ("overpriced", -0.6),
    ("poor", -0.4),
    ("sad", -0.5),
    ("slow", -0.3),
    ("terrible", -1.0),
    ("ugly", -0.7),
    ("useless", -0.5),
    ("worse", -0.4),
    ("worst", -1.0),
    ("wrong", -0.5),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("absolutely", 1.4),
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("really", 1.3),
    ("so", 1.2),
    ("super", 1.4),
    ("too", 1.2),
    ("very", 1.3),
    ("slightly", 0.6),
    ("somewhat", 0.7),
];

// Cleaning drops apostrophes, so "don't" arrives as "don t".
const NEGATORS: &[&str] = &[
    "cant", "didn", "didnt", "doesn", "doesnt", "don", "dont", "isn", "isnt", "never", "no",
    "not", "nothing", "wasn", "wasnt", "won", "wont",
];

/// Word-level polarity lexicon with intensifiers and negation.
#[derive(Debug, Clone)]
pub struct Lexicon {
    words: HashMap<String, f64>,
    intensifiers: HashMap<String, f64>,
    negators: Vec<String>,
}

impl Lexicon {
    /// Lexicon preloaded with general-purpose English review vocabulary.
    pub fn new() -> Self {
        Self {
            words: WORDS.iter().map(|(w, s)| (w.to_string(), *s)).collect(),
            intensifiers: INTENSIFIERS
                .iter()
                .map(|(w, m)| (w.to_string(), *m))
                .collect(),
            negators: NEGATORS.iter().map(|w| w.to_string()).collect(),
        }
    }

    fn is_negator(&self, token: &str) -> bool {
        self.negators.iter().any(|n| n == token)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityModel for Lexicon {
    fn polarity(&self, text: &str) -> f64 {
        let tokens: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();

        let mut total = 0.0;
        let mut scored = 0usize;

        for (i, token) in tokens.iter().enumerate() {
            let Some(&base) = self.words.get(token) else {
                continue;
            };

            let mut score = base;
            if let Some(&factor) = i
                .checked_sub(1)
                .and_then(|prev| self.intensifiers.get(&tokens[prev]))
            {
                score *= factor;
            }
            let window_start = i.saturating_sub(NEGATION_WINDOW);
            if tokens[window_start..i].iter().any(|t| self.is_negator(t)) {
                score *= NEGATION_FACTOR;
            }

            total += score.clamp(-1.0, 1.0);
            scored += 1;
        }

        if scored == 0 {
            0.0
        } else {
            (total / scored as f64).clamp(-1.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn unknown_or_empty_text_scores_zero() {
        let lex = Lexicon::new();
        assert_eq!(lex.polarity(""), 0.0);
        assert_eq!(lex.polarity("the bike ships in march"), 0.0);
    }

    #[test]
    fn averages_scored_words() {
        let lex = Lexicon::new();
        assert!(approx(lex.polarity("great bike love it"), (0.8 + 0.5) / 2.0));
    }

    #[test]
    fn case_insensitive() {
        let lex = Lexicon::new();
        assert!(approx(lex.polarity("GREAT"), 0.8));
    }

    #[test]
    fn intensifier_scales_next_word_and_clamps() {
        let lex = Lexicon::new();
        assert!(approx(lex.polarity("very good"), 0.7 * 1.3));
        assert!(approx(lex.polarity("extremely perfect"), 1.0));
    }

    #[test]
    fn negation_flips_and_dampens() {
        let lex = Lexicon::new();
        assert!(approx(lex.polarity("not good"), -0.35));
        assert!(approx(lex.polarity("not very good"), 0.7 * 1.3 * -0.5));
        assert!(approx(lex.polarity("isn t bad"), -0.7 * -0.5));
    }

    #[test]
    fn negation_window_expires() {
        let lex = Lexicon::new();
        assert!(approx(lex.polarity("not that it was good"), 0.7));
    }

    #[test]
    fn score_always_in_range() {
        let lex = Lexicon::new();
        for text in ["awesome awesome awesome", "worst terrible awful", "so so so bad"] {
            let p = lex.polarity(text);
            assert!((-1.0..=1.0).contains(&p), "{text}: {p}");
        }
    }
}
