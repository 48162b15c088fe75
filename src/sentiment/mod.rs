//! Sentiment labelling.
//!
//! A [`PolarityModel`] turns cleaned text into a score in `[-1, 1]`;
//! [`Sentiment::from_polarity`] buckets that score into one of three labels
//! with a dead zone of ±0.2 around zero.  [`Classifier`] ties the two
//! together with [`crate::clean::clean_text`].

mod lexicon;

pub use lexicon::Lexicon;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clean::clean_text;

/// Scores above this are positive.
pub const POSITIVE_THRESHOLD: f64 = 0.2;
/// Scores below this are negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.2;

/// Categorical sentiment label, written to the `sentiment` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Bucket a polarity score.  Both thresholds are exclusive, so exactly
    /// `0.2` and `-0.2` are neutral, as is NaN.
    pub fn from_polarity(score: f64) -> Self {
        if score > POSITIVE_THRESHOLD {
            Sentiment::Positive
        } else if score < NEGATIVE_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that can estimate the polarity of a piece of text.
///
/// Implementations must return a value in `[-1, 1]` for every input,
/// including the empty string, and `0.0` when they find no signal.
pub trait PolarityModel {
    fn polarity(&self, text: &str) -> f64;
}

/// Cleans raw post text, scores it, and buckets the score.
pub struct Classifier<M = Lexicon> {
    model: M,
}

impl Classifier<Lexicon> {
    pub fn new() -> Self {
        Self::with_model(Lexicon::new())
    }
}

impl Default for Classifier<Lexicon> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: PolarityModel> Classifier<M> {
    pub fn with_model(model: M) -> Self {
        Self { model }
    }

    /// Polarity of the cleaned form of `raw`.
    pub fn score(&self, raw: &str) -> f64 {
        self.model.polarity(&clean_text(raw))
    }

    /// Label for a raw post body.
    pub fn classify(&self, raw: &str) -> Sentiment {
        let polarity = self.score(raw);
        debug!(polarity, "scored post text");
        Sentiment::from_polarity(polarity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ignores the text and returns a fixed score.
    struct Fixed(f64);

    impl PolarityModel for Fixed {
        fn polarity(&self, _text: &str) -> f64 {
            self.0
        }
    }

    /// Records what text the model was handed.
    struct Echo(std::cell::RefCell<Vec<String>>);

    impl PolarityModel for Echo {
        fn polarity(&self, text: &str) -> f64 {
            self.0.borrow_mut().push(text.to_string());
            0.0
        }
    }

    #[test]
    fn thresholds_are_exclusive() {
        assert_eq!(Sentiment::from_polarity(0.2), Sentiment::Neutral);
        assert_eq!(Sentiment::from_polarity(-0.2), Sentiment::Neutral);
        assert_eq!(Sentiment::from_polarity(0.21), Sentiment::Positive);
        assert_eq!(Sentiment::from_polarity(-0.25), Sentiment::Negative);
        assert_eq!(Sentiment::from_polarity(0.2 + f64::EPSILON), Sentiment::Positive);
        assert_eq!(Sentiment::from_polarity(-0.2 - f64::EPSILON), Sentiment::Negative);
    }

    #[test]
    fn extremes_and_nan() {
        assert_eq!(Sentiment::from_polarity(1.0), Sentiment::Positive);
        assert_eq!(Sentiment::from_polarity(-1.0), Sentiment::Negative);
        assert_eq!(Sentiment::from_polarity(0.0), Sentiment::Neutral);
        assert_eq!(Sentiment::from_polarity(f64::NAN), Sentiment::Neutral);
    }

    #[test]
    fn classifier_uses_model_score() {
        assert_eq!(Classifier::with_model(Fixed(0.2)).classify("x"), Sentiment::Neutral);
        assert_eq!(Classifier::with_model(Fixed(0.21)).classify("x"), Sentiment::Positive);
        assert_eq!(Classifier::with_model(Fixed(-0.25)).classify("x"), Sentiment::Negative);
    }

    #[test]
    fn classifier_scores_cleaned_text() {
        let classifier = Classifier::with_model(Echo(Default::default()));
        classifier.classify(" Check http://x.co now! @bob ");
        assert_eq!(classifier.model.0.borrow().as_slice(), ["Check now"]);
    }

    #[test]
    fn empty_text_is_neutral() {
        assert_eq!(Classifier::new().classify(""), Sentiment::Neutral);
    }

    #[test]
    fn default_classifier_labels_obvious_text() {
        let classifier = Classifier::new();
        assert_eq!(classifier.classify("What a great bike, I love it!"), Sentiment::Positive);
        assert_eq!(classifier.classify("Terrible service, awful experience"), Sentiment::Negative);
        assert_eq!(classifier.classify("The bike ships in March"), Sentiment::Neutral);
    }

    #[test]
    fn labels_render_lowercase() {
        assert_eq!(Sentiment::Positive.to_string(), "positive");
        assert_eq!(Sentiment::Negative.as_str(), "negative");
        assert_eq!(
            serde_json::to_string(&Sentiment::Neutral).unwrap(),
            "\"neutral\""
        );
    }
}
