use serde::{Deserialize, Serialize};
use std::fmt;

/// Compound threshold separating neutral text from polar text
pub const POLARITY_THRESHOLD: f64 = 0.05;

/// Polarity scores for a single piece of text.
///
/// `positive`, `neutral` and `negative` are proportions of the
/// sentiment-bearing content and sum to ~1 for non-empty text. `compound`
/// is the normalized summary in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub compound: f64,
    #[serde(rename = "pos")]
    pub positive: f64,
    #[serde(rename = "neu")]
    pub neutral: f64,
    #[serde(rename = "neg")]
    pub negative: f64,
}

impl SentimentScores {
    /// Result for empty or blank text
    pub fn neutral() -> Self {
        Self {
            compound: 0.0,
            positive: 0.0,
            neutral: 1.0,
            negative: 0.0,
        }
    }

    pub fn polarity(&self) -> Polarity {
        Polarity::from_compound(self.compound)
    }
}

impl Default for SentimentScores {
    fn default() -> Self {
        Self::neutral()
    }
}

impl fmt::Display for SentimentScores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "compound={:.4} pos={:.3} neu={:.3} neg={:.3}",
            self.compound, self.positive, self.neutral, self.negative
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Neutral,
    Negative,
}

impl Polarity {
    pub fn from_compound(compound: f64) -> Self {
        if compound >= POLARITY_THRESHOLD {
            Polarity::Positive
        } else if compound <= -POLARITY_THRESHOLD {
            Polarity::Negative
        } else {
            Polarity::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Polarity::Positive => "positive",
            Polarity::Neutral => "neutral",
            Polarity::Negative => "negative",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_scores() {
        let scores = SentimentScores::neutral();
        assert_eq!(scores.compound, 0.0);
        assert_eq!(scores.neutral, 1.0);
        assert_eq!(scores.polarity(), Polarity::Neutral);
    }

    #[test]
    fn test_serializes_with_short_keys() {
        let json = serde_json::to_value(SentimentScores::neutral()).unwrap();
        for key in ["compound", "pos", "neu", "neg"] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
    }

    #[test]
    fn test_polarity_thresholds() {
        assert_eq!(Polarity::from_compound(0.05), Polarity::Positive);
        assert_eq!(Polarity::from_compound(0.049), Polarity::Neutral);
        assert_eq!(Polarity::from_compound(-0.2), Polarity::Negative);
    }
}
