//! # sensefolio-analysis - News Sentiment Analysis Library
//!
//! Models and analysis behind the sensefolio CLI:
//! - News, price and sentiment data models
//! - VADER sentiment scoring over a shared lexicon handle
//! - Roll-forward alignment of news onto trading dates
//! - Date range and logging helpers
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use sensefolio_analysis::prelude::*;
//!
//! let analyzer = SentimentAnalyzer::vader();
//! let event = NewsEvent::new(
//!     Utc.with_ymd_and_hms(2024, 1, 6, 15, 0, 0).unwrap(),
//!     "Record quarter",
//!     "Profits surged and guidance was strong.",
//!     "https://example.com/story",
//! );
//! let scored = vec![analyzer.score_event(event, ScoreTarget::Summary)];
//!
//! let calendar = TradingCalendar::new(vec![
//!     NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
//! ]);
//! let series = aggregate_to_trading_dates(&scored, &calendar, &chrono_tz::America::New_York);
//! assert_eq!(series.len(), 2);
//! assert!(series.points()[1].score > 0.0);
//! ```

pub mod models;
pub mod sentiment;
pub mod utils;

// Prelude for convenient imports
pub mod prelude {
    //! Import this module to get the most commonly used types and functions:
    //! ```rust
    //! use sensefolio_analysis::prelude::*;
    //! ```

    pub use crate::models::{
        AggregatePoint, AggregateSeries, DailyBar, NewsEvent, Polarity, PriceSnapshot,
        ScoreTarget, ScoredEvent, SentimentScores, TradingCalendar,
    };
    pub use crate::sentiment::{
        average_compound, Lexicon, LexiconSource, SentimentAnalyzer, SentimentError,
        SentimentModel,
    };
    pub use crate::utils::{
        aggregate_to_trading_dates, fill_date_gaps, resolve_date_range, summarize_by_news_date,
        DateBound, DateRangeError,
    };
}

// Re-export some commonly used utilities
pub use utils::{init_logger, Logger, Timer};
