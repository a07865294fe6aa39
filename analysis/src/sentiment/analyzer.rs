use super::{vader, Lexicon, SentimentError};
use crate::models::{NewsEvent, ScoreTarget, ScoredEvent, SentimentScores};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Supported scoring models
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SentimentModel {
    /// Lexicon and rule based analyzer for short text
    #[default]
    Vader,
}

impl SentimentModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentModel::Vader => "vader",
        }
    }

    fn score(&self, lexicon: &Lexicon, text: &str) -> SentimentScores {
        match self {
            SentimentModel::Vader => vader::polarity_scores(lexicon, text),
        }
    }
}

impl FromStr for SentimentModel {
    type Err = SentimentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vader" => Ok(SentimentModel::Vader),
            _ => Err(SentimentError::NotImplemented(s.to_string())),
        }
    }
}

impl fmt::Display for SentimentModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scores text with a fixed model over a shared lexicon handle
#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    model: SentimentModel,
    lexicon: Arc<Lexicon>,
}

impl SentimentAnalyzer {
    pub fn new(model: SentimentModel, lexicon: Arc<Lexicon>) -> Self {
        Self { model, lexicon }
    }

    /// Build from a model identifier, failing for unsupported models
    pub fn from_name(model: &str, lexicon: Arc<Lexicon>) -> Result<Self, SentimentError> {
        Ok(Self::new(model.parse()?, lexicon))
    }

    /// VADER over the bundled lexicon
    pub fn vader() -> Self {
        Self::new(SentimentModel::Vader, Lexicon::bundled())
    }

    pub fn model(&self) -> SentimentModel {
        self.model
    }

    pub fn lexicon(&self) -> &Arc<Lexicon> {
        &self.lexicon
    }

    /// Score a piece of text. Empty or blank text is neutral.
    pub fn analyze(&self, text: &str) -> SentimentScores {
        if text.trim().is_empty() {
            return SentimentScores::neutral();
        }
        self.model.score(&self.lexicon, text)
    }

    pub fn analyze_batch<I, S>(&self, texts: I) -> Vec<SentimentScores>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        texts
            .into_iter()
            .map(|text| self.analyze(text.as_ref()))
            .collect()
    }

    pub fn score_event(&self, event: NewsEvent, target: ScoreTarget) -> ScoredEvent {
        let score = self.analyze(&target.select(&event));
        ScoredEvent::new(event, score)
    }

    pub fn score_events(&self, events: Vec<NewsEvent>, target: ScoreTarget) -> Vec<ScoredEvent> {
        events
            .into_iter()
            .map(|event| self.score_event(event, target))
            .collect()
    }
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::vader()
    }
}

/// Mean compound score, zero for no input
pub fn average_compound(scores: &[SentimentScores]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().map(|s| s.compound).sum::<f64>() / scores.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn analyzer() -> SentimentAnalyzer {
        SentimentAnalyzer::vader()
    }

    #[test]
    fn test_positive_sentiment() {
        let result = analyzer().analyze("This product is amazing and I love it!");
        assert!(result.compound > 0.0);
    }

    #[test]
    fn test_negative_sentiment() {
        let result = analyzer().analyze("This is the worst service I\u{2019}ve ever experienced.");
        assert!(result.compound < 0.0);
    }

    #[test]
    fn test_neutral_sentiment() {
        let result = analyzer().analyze("The meeting was scheduled at 3 PM.");
        assert!(result.compound.abs() < 0.1);
    }

    #[test]
    fn test_blank_text_is_neutral() {
        for text in ["", "   ", "\n\t"] {
            let result = analyzer().analyze(text);
            assert_eq!(result, SentimentScores::neutral());
        }
    }

    #[test]
    fn test_scores_are_proportions() {
        let texts = [
            "Hello world",
            "Shares slumped after the company reported a surprise loss.",
            "Record profits and strong growth lifted the stock!",
            "Not bad, but not great either.",
        ];
        for scores in analyzer().analyze_batch(texts) {
            let total = scores.positive + scores.neutral + scores.negative;
            assert!((total - 1.0).abs() < 0.01, "{}", scores);
            assert!((-1.0..=1.0).contains(&scores.compound));
            assert!(scores.positive >= 0.0 && scores.negative >= 0.0 && scores.neutral >= 0.0);
        }
    }

    #[test]
    fn test_invalid_model_fails() {
        let result = SentimentAnalyzer::from_name("unknown_model", Lexicon::bundled());
        assert!(matches!(result, Err(SentimentError::NotImplemented(ref name)) if name == "unknown_model"));
    }

    #[test]
    fn test_model_names() {
        assert_eq!("VADER".parse::<SentimentModel>().unwrap(), SentimentModel::Vader);
        assert_eq!(SentimentModel::Vader.to_string(), "vader");
        let analyzer = SentimentAnalyzer::from_name("vader", Lexicon::bundled()).unwrap();
        assert_eq!(analyzer.model(), SentimentModel::Vader);
    }

    #[test]
    fn test_score_events_uses_target_text() {
        let event = NewsEvent::new(Utc::now(), "Great quarter", "", "https://example.com");
        let by_summary = analyzer().score_event(event.clone(), ScoreTarget::Summary);
        let by_headline = analyzer().score_event(event, ScoreTarget::Headline);
        assert_eq!(by_summary.compound(), 0.0);
        assert!(by_headline.compound() > 0.0);
    }

    #[test]
    fn test_average_compound() {
        assert_eq!(average_compound(&[]), 0.0);
        let mut a = SentimentScores::neutral();
        a.compound = 0.5;
        let mut b = SentimentScores::neutral();
        b.compound = -0.1;
        assert!((average_compound(&[a, b]) - 0.2).abs() < 1e-12);
    }

    /// Upstream lexicon entries for the words in the reference sentences
    const UPSTREAM_ENTRIES: &str = "good\t1.9\nsmart\t1.7\nhandsome\t2.2\nfunny\t1.9\nsux\t-1.5\n";

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 5e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_reference_scores_with_upstream_entries() {
        let analyzer = SentimentAnalyzer::new(
            SentimentModel::Vader,
            Arc::new(Lexicon::parse(UPSTREAM_ENTRIES)),
        );

        let scores = analyzer.analyze("VADER is smart, handsome, and funny.");
        assert_close(scores.compound, 0.8316);
        assert_close(scores.positive, 0.746);
        assert_close(scores.neutral, 0.254);
        assert_eq!(scores.negative, 0.0);

        // all-caps emphasis plus the exclamation mark
        let scores = analyzer.analyze("Today SUX!");
        assert_close(scores.compound, -0.5461);
        assert_close(scores.negative, 0.779);

        assert_close(analyzer.analyze("The book was good.").compound, 0.4404);
    }
}

