//! Combined price and news sentiment chart.
//!
//! [`compose_dashboard`] turns fetched data into a [`DashboardView`] without
//! touching the filesystem; the `render_*` functions draw views as SVG.

use crate::news_sentiment::analyze_news_sentiment;
use crate::providers::{NewsProvider, PriceProvider};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use chrono_tz::Tz;
use plotters::prelude::*;
use sensefolio_analysis::models::{AggregatePoint, AggregateSeries, PriceSnapshot, ScoreTarget};
use sensefolio_analysis::sentiment::SentimentAnalyzer;
use sensefolio_analysis::utils::{aggregate_to_trading_dates, format_date, Logger};
use std::path::Path;

const DEEP_SKY_BLUE: RGBColor = RGBColor(0, 191, 255);
const ORANGE_RED: RGBColor = RGBColor(255, 69, 0);
const UP_GREEN: RGBColor = RGBColor(0, 128, 0);
const DOWN_RED: RGBColor = RGBColor(220, 20, 60);

/// Whether the live quote is above the last close
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceDirection {
    Up,
    Down,
}

impl PriceDirection {
    /// Up only when strictly higher; an unchanged price counts as down
    pub fn between(last_close: f64, current: f64) -> Self {
        if current > last_close {
            PriceDirection::Up
        } else {
            PriceDirection::Down
        }
    }

    fn color(self) -> RGBColor {
        match self {
            PriceDirection::Up => UP_GREEN,
            PriceDirection::Down => DOWN_RED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarTone {
    /// Score >= 0
    NonNegative,
    Negative,
}

impl BarTone {
    pub fn of(score: f64) -> Self {
        if score >= 0.0 {
            BarTone::NonNegative
        } else {
            BarTone::Negative
        }
    }

    fn color(self) -> RGBColor {
        match self {
            BarTone::NonNegative => DEEP_SKY_BLUE,
            BarTone::Negative => ORANGE_RED,
        }
    }
}

/// A point on the shared x-axis: `index` into the view's labels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub index: usize,
    pub date: NaiveDate,
    pub close: f64,
}

/// Connector from the last historical close to the live quote
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveSegment {
    pub from: PricePoint,
    pub to: PricePoint,
    pub direction: PriceDirection,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentBar {
    pub index: usize,
    pub date: NaiveDate,
    pub score: f64,
    pub tone: BarTone,
}

/// Everything needed to draw the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub symbol: String,
    /// `YYYY-MM-DD` label for every calendar date, live date included
    pub labels: Vec<String>,
    pub prices: Vec<PricePoint>,
    pub live: Option<LiveSegment>,
    pub bars: Vec<SentimentBar>,
}

impl DashboardView {
    fn price_bounds(&self) -> (f64, f64) {
        let values = self
            .prices
            .iter()
            .map(|p| p.close)
            .chain(self.live.iter().map(|live| live.to.close));
        padded_bounds(values, false)
    }

    fn sentiment_bounds(&self) -> (f64, f64) {
        padded_bounds(self.bars.iter().map(|bar| bar.score), true)
    }
}

/// Lay out prices and aggregated sentiment on one date axis.
///
/// The axis is the snapshot's trading calendar with `today` appended when a
/// live quote exists and today has no bar. `series` is expected to be the
/// aggregate over that same calendar.
pub fn compose_dashboard(
    symbol: &str,
    snapshot: &PriceSnapshot,
    series: &AggregateSeries,
    today: NaiveDate,
) -> DashboardView {
    let calendar = snapshot.trading_calendar(today);
    let index_of = |date: NaiveDate| calendar.position(date);

    let prices: Vec<PricePoint> = snapshot
        .bars
        .iter()
        .filter_map(|bar| {
            Some(PricePoint {
                index: index_of(bar.date)?,
                date: bar.date,
                close: bar.close,
            })
        })
        .collect();

    let live = match (snapshot.current_price, prices.last()) {
        (Some(current), Some(last)) if snapshot.appends_live_date(today) => {
            index_of(today).map(|index| LiveSegment {
                from: *last,
                to: PricePoint {
                    index,
                    date: today,
                    close: current,
                },
                direction: PriceDirection::between(last.close, current),
            })
        }
        _ => None,
    };

    let bars = series
        .points()
        .iter()
        .filter_map(|point| {
            Some(SentimentBar {
                index: index_of(point.date)?,
                date: point.date,
                score: point.score,
                tone: BarTone::of(point.score),
            })
        })
        .collect();

    DashboardView {
        symbol: symbol.to_string(),
        labels: calendar.dates().iter().map(|d| format_date(*d)).collect(),
        prices,
        live,
        bars,
    }
}

/// Fetch prices and news for `symbol` and compose the dashboard
#[allow(clippy::too_many_arguments)]
pub async fn build_dashboard<P, N>(
    prices: &P,
    news: &N,
    analyzer: &SentimentAnalyzer,
    symbol: &str,
    days: i64,
    target: ScoreTarget,
    tz: &Tz,
    today: NaiveDate,
) -> anyhow::Result<DashboardView>
where
    P: PriceProvider + ?Sized,
    N: NewsProvider + ?Sized,
{
    let Some(snapshot) = prices.price_snapshot(symbol, days).await else {
        bail!("Failed to fetch price data for {}", symbol);
    };
    if snapshot.bars.is_empty() {
        bail!("No price history for {}", symbol);
    }

    let calendar = snapshot.trading_calendar(today);
    let scored = analyze_news_sentiment(news, analyzer, symbol, None, None, target).await?;
    let series = aggregate_to_trading_dates(&scored, &calendar, tz);

    Logger::new("DASHBOARD").debug(&format!(
        "{} trading dates, {} of {} news items placed",
        calendar.len(),
        series.total_events(),
        scored.len()
    ));

    Ok(compose_dashboard(symbol, &snapshot, &series, today))
}

fn padded_bounds(values: impl Iterator<Item = f64>, include_zero: bool) -> (f64, f64) {
    let (mut lo, mut hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    let span = hi - lo;
    if span <= f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    (lo - span * 0.05, hi + span * 0.05)
}

/// Label for an x-axis key point; blank between dates
fn label_at(labels: &[String], x: f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create chart directory {}", parent.display()))?;
    }
    Ok(())
}

/// Draw the dashboard as SVG: price line on top, sentiment bars below
pub fn render_dashboard(view: &DashboardView, path: &Path) -> anyhow::Result<()> {
    ensure_parent(path)?;

    let count = view.labels.len().max(1);
    let x_range = -0.5f64..(count as f64 - 0.5);
    let format_x = |x: &f64| label_at(&view.labels, *x);

    let root = SVGBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let (upper, lower) = root.split_vertically(460);

    let (price_lo, price_hi) = view.price_bounds();
    let mut price_chart = ChartBuilder::on(&upper)
        .caption(
            format!("{} price and news sentiment", view.symbol),
            ("sans-serif", 22),
        )
        .margin(10)
        .x_label_area_size(0)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), price_lo..price_hi)?;

    price_chart
        .configure_mesh()
        .x_labels(count)
        .x_label_formatter(&|_| String::new())
        .y_desc("Price")
        .draw()?;

    price_chart
        .draw_series(LineSeries::new(
            view.prices.iter().map(|p| (p.index as f64, p.close)),
            &BLUE,
        ))?
        .label("Close Price")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    price_chart.draw_series(
        view.prices
            .iter()
            .map(|p| Circle::new((p.index as f64, p.close), 3, BLUE.filled())),
    )?;

    if let Some(live) = &view.live {
        let color = live.direction.color();
        price_chart
            .draw_series(LineSeries::new(
                [live.from, live.to]
                    .into_iter()
                    .map(|p| (p.index as f64, p.close)),
                &color,
            ))?
            .label("Current Price")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        price_chart.draw_series(std::iter::once(Circle::new(
            (live.to.index as f64, live.to.close),
            3,
            color.filled(),
        )))?;
    }

    price_chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    let (sent_lo, sent_hi) = view.sentiment_bounds();
    let mut sentiment_chart = ChartBuilder::on(&lower)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, sent_lo..sent_hi)?;

    sentiment_chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(count)
        .x_label_formatter(&format_x)
        .x_desc("Date")
        .y_desc("Sentiment")
        .draw()?;

    sentiment_chart.draw_series(view.bars.iter().map(|bar| {
        let x = bar.index as f64;
        Rectangle::new([(x - 0.3, 0.0), (x + 0.3, bar.score)], bar.tone.color().filled())
    }))?;
    sentiment_chart.draw_series(LineSeries::new(
        [(-0.5, 0.0), (count as f64 - 0.5, 0.0)],
        &RGBColor(128, 128, 128),
    ))?;

    root.present()?;
    Ok(())
}

/// Standalone bar chart of average sentiment per news date
pub fn render_sentiment_bars(
    symbol: &str,
    summary: &[AggregatePoint],
    path: &Path,
) -> anyhow::Result<()> {
    if summary.is_empty() {
        bail!("No sentiment data to chart for {}", symbol);
    }
    ensure_parent(path)?;

    let labels: Vec<String> = summary.iter().map(|p| format_date(p.date)).collect();
    let count = labels.len();
    let format_x = |x: &f64| label_at(&labels, *x);
    let (lo, hi) = padded_bounds(summary.iter().map(|p| p.score), true);

    let root = SVGBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{}: average sentiment scores by date", symbol),
            ("sans-serif", 22),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(count as f64 - 0.5), lo..hi)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(count)
        .x_label_formatter(&format_x)
        .x_desc("Date")
        .y_desc("Sentiment Score")
        .draw()?;

    chart
        .draw_series(summary.iter().enumerate().map(|(i, point)| {
            let x = i as f64;
            Rectangle::new([(x - 0.2, 0.0), (x + 0.2, point.score)], DEEP_SKY_BLUE.filled())
        }))?
        .label("Summary Score")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], DEEP_SKY_BLUE.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
