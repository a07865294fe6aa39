use super::SentimentScores;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;

/// A company news item as delivered by the news provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsEvent {
    pub published_at: DateTime<Utc>,
    pub headline: String,
    pub summary: String,
    pub url: String,
    pub source: Option<String>,
    pub category: Option<String>,
    pub related: Option<String>,
    pub id: Option<i64>,
    pub image: Option<String>,
}

impl NewsEvent {
    pub fn new(
        published_at: DateTime<Utc>,
        headline: impl Into<String>,
        summary: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            published_at,
            headline: headline.into(),
            summary: summary.into(),
            url: url.into(),
            source: None,
            category: None,
            related: None,
            id: None,
            image: None,
        }
    }

    /// Publication date in the market timezone, time of day dropped
    pub fn local_date(&self, tz: &Tz) -> NaiveDate {
        self.published_at.with_timezone(tz).date_naive()
    }
}

/// Which part of a news item gets scored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTarget {
    #[default]
    Summary,
    Headline,
    HeadlineAndSummary,
}

impl ScoreTarget {
    pub fn select<'a>(&self, event: &'a NewsEvent) -> Cow<'a, str> {
        match self {
            ScoreTarget::Summary => Cow::Borrowed(event.summary.as_str()),
            ScoreTarget::Headline => Cow::Borrowed(event.headline.as_str()),
            ScoreTarget::HeadlineAndSummary => {
                Cow::Owned(format!("{} {}", event.headline, event.summary))
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreTarget::Summary => "summary",
            ScoreTarget::Headline => "headline",
            ScoreTarget::HeadlineAndSummary => "headline_and_summary",
        }
    }
}

impl FromStr for ScoreTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summary" => Ok(ScoreTarget::Summary),
            "headline" => Ok(ScoreTarget::Headline),
            "headline_and_summary" | "both" => Ok(ScoreTarget::HeadlineAndSummary),
            other => Err(format!("unknown score target '{}'", other)),
        }
    }
}

/// A news item together with the sentiment of its scored text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEvent {
    #[serde(flatten)]
    pub event: NewsEvent,
    pub score: SentimentScores,
}

impl ScoredEvent {
    pub fn new(event: NewsEvent, score: SentimentScores) -> Self {
        Self { event, score }
    }

    pub fn compound(&self) -> f64 {
        self.score.compound
    }

    pub fn local_date(&self, tz: &Tz) -> NaiveDate {
        self.event.local_date(tz)
    }
}
