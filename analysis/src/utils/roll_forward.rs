//! Alignment of irregular news events onto a trading calendar.
//!
//! Each event is rolled forward to the first trading date on or after its
//! own publication date and the compound scores are averaged per trading
//! date. Events published after the last trading date have nowhere to roll
//! to and are dropped.

use crate::models::{AggregatePoint, AggregateSeries, ScoredEvent, TradingCalendar};
use crate::utils::calendar_days_between;
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::collections::BTreeMap;
use tracing::debug;

/// Average compound sentiment per trading date, rolling events forward.
///
/// The result holds exactly one point per calendar date, in calendar order.
/// Dates that received no events score `0.0`.
pub fn aggregate_to_trading_dates(
    events: &[ScoredEvent],
    calendar: &TradingCalendar,
    tz: &Tz,
) -> AggregateSeries {
    let dates = calendar.dates();
    let mut sums = vec![0.0_f64; dates.len()];
    let mut counts = vec![0_usize; dates.len()];
    let mut dropped = 0_usize;

    for event in events {
        let slot = calendar
            .roll_forward(event.local_date(tz))
            .and_then(|date| calendar.position(date));
        match slot {
            Some(idx) => {
                sums[idx] += event.compound();
                counts[idx] += 1;
            }
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(
            dropped,
            last_trading_date = ?calendar.last(),
            "Dropped news events published after the last trading date"
        );
    }

    let points = dates
        .iter()
        .zip(sums.iter().zip(counts.iter()))
        .map(|(date, (sum, count))| AggregatePoint {
            date: *date,
            score: if *count > 0 { sum / *count as f64 } else { 0.0 },
            event_count: *count,
        })
        .collect();

    AggregateSeries::from_points(points)
}

/// Average compound sentiment per publication date, ascending by date
pub fn summarize_by_news_date(events: &[ScoredEvent], tz: &Tz) -> Vec<AggregatePoint> {
    let mut grouped: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for event in events {
        let entry = grouped.entry(event.local_date(tz)).or_insert((0.0, 0));
        entry.0 += event.compound();
        entry.1 += 1;
    }

    grouped
        .into_iter()
        .map(|(date, (sum, count))| AggregatePoint {
            date,
            score: sum / count as f64,
            event_count: count,
        })
        .collect()
}

/// Expand a per-date summary to every calendar day between its first and
/// last date, with zero for days without news
pub fn fill_date_gaps(summary: &[AggregatePoint]) -> Vec<AggregatePoint> {
    let (Some(first), Some(last)) = (
        summary.iter().map(|p| p.date).min(),
        summary.iter().map(|p| p.date).max(),
    ) else {
        return Vec::new();
    };

    let by_date: BTreeMap<NaiveDate, &AggregatePoint> =
        summary.iter().map(|p| (p.date, p)).collect();

    calendar_days_between(first, last)
        .into_iter()
        .map(|date| match by_date.get(&date) {
            Some(point) => **point,
            None => AggregatePoint {
                date,
                score: 0.0,
                event_count: 0,
            },
        })
        .collect()
}
