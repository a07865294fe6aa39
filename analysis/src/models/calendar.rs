use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ordered set of dates with a price observation.
///
/// Always strictly ascending with no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingCalendar {
    dates: Vec<NaiveDate>,
}

impl TradingCalendar {
    pub fn new(mut dates: Vec<NaiveDate>) -> Self {
        dates.sort();
        dates.dedup();
        Self { dates }
    }

    /// Append `today` when it comes after the last historical date
    pub fn with_live_date(mut self, today: NaiveDate) -> Self {
        if self.dates.last().map_or(true, |last| *last < today) {
            self.dates.push(today);
        }
        self
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.binary_search(&date).is_ok()
    }

    /// Earliest calendar date on or after `date`, `None` past the last date
    pub fn roll_forward(&self, date: NaiveDate) -> Option<NaiveDate> {
        let idx = self.dates.partition_point(|d| *d < date);
        self.dates.get(idx).copied()
    }

    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }
}

/// Aggregate sentiment for one trading date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregatePoint {
    pub date: NaiveDate,
    pub score: f64,
    pub event_count: usize,
}

/// One aggregate value per trading calendar date, in calendar order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateSeries {
    points: Vec<AggregatePoint>,
}

impl AggregateSeries {
    pub(crate) fn from_points(points: Vec<AggregatePoint>) -> Self {
        Self { points }
    }

    /// Every calendar date mapped to zero
    pub fn zeros(calendar: &TradingCalendar) -> Self {
        Self {
            points: calendar
                .dates()
                .iter()
                .map(|date| AggregatePoint {
                    date: *date,
                    score: 0.0,
                    event_count: 0,
                })
                .collect(),
        }
    }

    pub fn points(&self) -> &[AggregatePoint] {
        &self.points
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.score).collect()
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by(|p| p.date.cmp(&date))
            .ok()
            .map(|idx| self.points[idx].score)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of events that landed on some trading date
    pub fn total_events(&self) -> usize {
        self.points.iter().map(|p| p.event_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_calendar_is_sorted_and_deduplicated() {
        let calendar = TradingCalendar::new(vec![d(5), d(2), d(5), d(3)]);
        assert_eq!(calendar.dates(), &[d(2), d(3), d(5)]);
    }

    #[test]
    fn test_live_date_not_duplicated() {
        let calendar = TradingCalendar::new(vec![d(2), d(3)]);
        assert_eq!(calendar.clone().with_live_date(d(3)).len(), 2);
        assert_eq!(calendar.clone().with_live_date(d(1)).len(), 2);
        assert_eq!(calendar.with_live_date(d(4)).last(), Some(d(4)));
        assert_eq!(TradingCalendar::default().with_live_date(d(9)).dates(), &[d(9)]);
    }

    #[test]
    fn test_roll_forward() {
        let calendar = TradingCalendar::new(vec![d(2), d(3), d(8)]);
        assert_eq!(calendar.roll_forward(d(1)), Some(d(2)));
        assert_eq!(calendar.roll_forward(d(3)), Some(d(3)));
        assert_eq!(calendar.roll_forward(d(4)), Some(d(8)));
        assert_eq!(calendar.roll_forward(d(9)), None);
        assert_eq!(TradingCalendar::default().roll_forward(d(1)), None);
    }

    #[test]
    fn test_zero_series_matches_calendar() {
        let calendar = TradingCalendar::new(vec![d(2), d(3)]);
        let series = AggregateSeries::zeros(&calendar);
        assert_eq!(series.dates(), calendar.dates().to_vec());
        assert_eq!(series.get(d(3)), Some(0.0));
        assert_eq!(series.get(d(4)), None);
    }
}
