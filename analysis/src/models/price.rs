use super::TradingCalendar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLCV observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl DailyBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Price history for a symbol plus an optional live quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub symbol: String,
    pub bars: Vec<DailyBar>,
    /// Only reported when today's bar is not part of `bars`
    pub current_price: Option<f64>,
}

impl PriceSnapshot {
    pub fn new(symbol: impl Into<String>, mut bars: Vec<DailyBar>, current_price: Option<f64>) -> Self {
        bars.sort_by(|a, b| a.date.cmp(&b.date));
        bars.dedup_by(|a, b| a.date == b.date);
        Self {
            symbol: symbol.into(),
            bars,
            current_price,
        }
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|bar| bar.date).collect()
    }

    pub fn latest(&self) -> Option<&DailyBar> {
        self.bars.last()
    }

    pub fn has_bar_for(&self, date: NaiveDate) -> bool {
        self.bars.iter().any(|bar| bar.date == date)
    }

    /// Whether `today` should be appended to the calendar for the live quote
    pub fn appends_live_date(&self, today: NaiveDate) -> bool {
        self.current_price.is_some() && !self.has_bar_for(today)
    }

    /// Calendar of historical dates, with `today` appended when a live quote exists
    pub fn trading_calendar(&self, today: NaiveDate) -> TradingCalendar {
        let calendar = TradingCalendar::new(self.dates());
        if self.appends_live_date(today) {
            calendar.with_live_date(today)
        } else {
            calendar
        }
    }
}
