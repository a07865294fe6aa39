//! Fetch company news, score it, and summarise sentiment per day.

use crate::providers::NewsProvider;
use chrono_tz::Tz;
use sensefolio_analysis::models::{AggregatePoint, ScoreTarget, ScoredEvent};
use sensefolio_analysis::sentiment::SentimentAnalyzer;
use sensefolio_analysis::utils::{
    fill_date_gaps, format_date, log_sentiment, summarize_by_news_date, DateBound,
    DateRangeError,
};
use std::fmt::Write as _;

/// Summaries longer than this are cut in the news table
pub const SUMMARY_PREVIEW_CHARS: usize = 100;

/// Fetch news for `symbol` and score each item's `target` text
pub async fn analyze_news_sentiment<N>(
    provider: &N,
    analyzer: &SentimentAnalyzer,
    symbol: &str,
    from: Option<DateBound>,
    to: Option<DateBound>,
    target: ScoreTarget,
) -> Result<Vec<ScoredEvent>, DateRangeError>
where
    N: NewsProvider + ?Sized,
{
    let events = provider.company_news(symbol, from, to).await?;
    let scored = analyzer.score_events(events, target);
    if !scored.is_empty() {
        log_sentiment(&format!(
            "Analyzed {} news articles for {} (scored text: {})",
            scored.len(),
            symbol,
            target.as_str()
        ));
    }
    Ok(scored)
}

/// Cut `text` to `max_chars` characters, marking the cut with "..."
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// News table, latest first: time, headline, shortened summary, compound score
pub fn format_news_table(events: &[ScoredEvent], tz: &Tz) -> String {
    let mut sorted: Vec<&ScoredEvent> = events.iter().collect();
    sorted.sort_by(|a, b| b.event.published_at.cmp(&a.event.published_at));

    let mut table = String::new();
    let _ = writeln!(table, "{:<16} | {:>8} | {} | {}", "datetime", "score", "headline", "summary");
    for scored in sorted {
        let published = scored.event.published_at.with_timezone(tz);
        let _ = writeln!(
            table,
            "{:<16} | {:>8.4} | {} | {}",
            published.format("%Y-%m-%d %H:%M").to_string(),
            scored.compound(),
            scored.event.headline,
            truncate_text(&scored.event.summary, SUMMARY_PREVIEW_CHARS)
        );
    }
    table
}

/// Mean compound score for every day from the first to the last news date.
/// Days without news score zero.
pub fn daily_sentiment(events: &[ScoredEvent], tz: &Tz) -> Vec<AggregatePoint> {
    fill_date_gaps(&summarize_by_news_date(events, tz))
}

pub fn format_daily_summary(summary: &[AggregatePoint]) -> String {
    let mut table = String::new();
    let _ = writeln!(table, "{:<10} | {:>8} | {:>5}", "date", "score", "items");
    for point in summary {
        let _ = writeln!(
            table,
            "{:<10} | {:>8.4} | {:>5}",
            format_date(point.date),
            point.score,
            point.event_count
        );
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use sensefolio_analysis::models::NewsEvent;
    use sensefolio_analysis::utils::resolve_date_range;

    struct StaticNews(Vec<NewsEvent>);

    #[async_trait]
    impl NewsProvider for StaticNews {
        async fn company_news(
            &self,
            _symbol: &str,
            from: Option<DateBound>,
            to: Option<DateBound>,
        ) -> Result<Vec<NewsEvent>, DateRangeError> {
            let today = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
            resolve_date_range(from, to, today)?;
            Ok(self.0.clone())
        }
    }

    fn event(day: u32, hour: u32, headline: &str, summary: &str) -> NewsEvent {
        NewsEvent::new(
            Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap(),
            headline,
            summary,
            format!("https://example.com/{}", day),
        )
    }

    fn provider() -> StaticNews {
        StaticNews(vec![
            event(14, 15, "Upbeat outlook", "Analysts love the strong results."),
            event(14, 18, "Quiet day", ""),
            event(17, 15, "Probe launched", "Regulators fear a terrible fraud."),
        ])
    }

    #[tokio::test]
    async fn test_analyze_scores_summaries() {
        let analyzer = SentimentAnalyzer::vader();
        let scored = analyze_news_sentiment(
            &provider(),
            &analyzer,
            "AAPL",
            None,
            None,
            ScoreTarget::Summary,
        )
        .await
        .unwrap();

        assert_eq!(scored.len(), 3);
        assert!(scored[0].compound() > 0.0);
        // empty summary is neutral
        assert_eq!(scored[1].compound(), 0.0);
        assert!(scored[2].compound() < 0.0);
    }

    #[tokio::test]
    async fn test_analyze_propagates_range_errors() {
        let analyzer = SentimentAnalyzer::vader();
        let result = analyze_news_sentiment(
            &provider(),
            &analyzer,
            "AAPL",
            Some("2024-05-20".into()),
            Some("2024-05-01".into()),
            ScoreTarget::Summary,
        )
        .await;
        assert!(matches!(result, Err(DateRangeError::FromAfterTo { .. })));
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 100), "short");
        let long = "x".repeat(150);
        let cut = truncate_text(&long, 100);
        assert_eq!(cut.len(), 103);
        assert!(cut.ends_with("..."));
        // multi-byte characters are never split
        assert_eq!(truncate_text("ééé", 2), "éé...");
    }

    #[test]
    fn test_table_is_latest_first() {
        let analyzer = SentimentAnalyzer::vader();
        let scored = analyzer.score_events(provider().0, ScoreTarget::Summary);
        let table = format_news_table(&scored, &chrono_tz::UTC);

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("Probe launched"));
        assert!(lines[3].contains("Upbeat outlook"));
    }

    #[test]
    fn test_daily_sentiment_fills_gaps() {
        let analyzer = SentimentAnalyzer::vader();
        let scored = analyzer.score_events(provider().0, ScoreTarget::Summary);
        let daily = daily_sentiment(&scored, &chrono_tz::UTC);

        // May 14 through May 17
        assert_eq!(daily.len(), 4);
        assert_eq!(daily[0].event_count, 2);
        assert!((daily[0].score - scored[0].compound() / 2.0).abs() < 1e-12);
        assert_eq!(daily[1].score, 0.0);
        assert_eq!(daily[2].score, 0.0);
        assert!(daily[3].score < 0.0);

        let table = format_daily_summary(&daily);
        assert!(table.contains("2024-05-15"));
        assert!(daily_sentiment(&[], &chrono_tz::UTC).is_empty());
    }
}
