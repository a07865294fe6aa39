//! # sensefolio - Stock Prices and News Sentiment
//!
//! Provider clients and the pipelines built on them:
//! - Finnhub company news and Yahoo Finance daily prices
//! - News sentiment scoring with per-day summaries
//! - A dashboard charting prices against sentiment rolled onto trading dates
//!
//! Models, scoring and date alignment live in `sensefolio-analysis`.

pub mod commands;
pub mod config;
pub mod dashboard;
pub mod finnhub;
pub mod news_sentiment;
pub mod providers;
pub mod yahoo;

pub use config::AppConfig;
pub use providers::{NewsProvider, PriceProvider};
