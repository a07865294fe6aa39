use crate::config::AppConfig;
use crate::providers::{http_client, user_agent, PriceProvider};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::Tz;
use reqwest::Client;
use sensefolio_analysis::models::{DailyBar, PriceSnapshot};
use sensefolio_analysis::utils::{
    format_date, log_fetch_prices, lookback_start, parse_timezone, today_in, DateRangeError, Logger,
    Timer,
};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum YahooError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Yahoo Finance returned status {0}")]
    Status(u16),

    #[error("Failed to decode chart response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No chart data: {0}")]
    NoData(String),

    #[error(transparent)]
    Range(#[from] DateRangeError),
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    exchange_timezone_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Decoded chart: daily bars in exchange-local dates plus the market price
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub bars: Vec<DailyBar>,
    pub market_price: Option<f64>,
    pub timezone: Tz,
}

/// Decode a `v8/finance/chart` body. Rows with any null OHLC value are skipped.
pub fn parse_chart(body: &str, fallback_tz: Tz) -> Result<ChartData, YahooError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;

    if let Some(error) = envelope.chart.error {
        return Err(YahooError::NoData(format!(
            "{}: {}",
            error.code.unwrap_or_default(),
            error.description.unwrap_or_default()
        )));
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| YahooError::NoData("empty result".to_string()))?;

    let timezone = result
        .meta
        .exchange_timezone_name
        .as_deref()
        .and_then(|name| parse_timezone(name).ok())
        .unwrap_or(fallback_tz);

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let value_at = |series: &[Option<f64>], i: usize| series.get(i).copied().flatten();

    let bars = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let date = DateTime::from_timestamp(ts, 0)?
                .with_timezone(&timezone)
                .date_naive();
            Some(DailyBar::new(
                date,
                value_at(&quote.open, i)?,
                value_at(&quote.high, i)?,
                value_at(&quote.low, i)?,
                value_at(&quote.close, i)?,
                value_at(&quote.volume, i).unwrap_or(0.0).max(0.0) as u64,
            ))
        })
        .collect();

    Ok(ChartData {
        bars,
        market_price: result.meta.regular_market_price,
        timezone,
    })
}

/// Unix timestamp of local midnight on `date`
fn midnight_timestamp(date: NaiveDate, tz: &Tz) -> i64 {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.timestamp())
        .unwrap_or_else(|| midnight.and_utc().timestamp())
}

pub struct YahooClient {
    client: Client,
    base_url: String,
    timezone: Tz,
    random_agent: bool,
}

impl YahooClient {
    pub fn new(base_url: &str, timeout: Duration, random_agent: bool) -> Result<Self, YahooError> {
        Ok(YahooClient {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            timezone: chrono_tz::America::New_York,
            random_agent,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, YahooError> {
        let mut client = Self::new(
            &config.yahoo_base_url,
            config.http_timeout,
            config.random_user_agent,
        )?;
        client.timezone = config.market_timezone;
        Ok(client)
    }

    /// Daily chart between two local dates, `end` exclusive
    pub async fn fetch_chart(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ChartData, YahooError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let period1 = midnight_timestamp(start, &self.timezone).to_string();
        let period2 = midnight_timestamp(end, &self.timezone).to_string();

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json, text/plain, */*")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("User-Agent", user_agent(self.random_agent))
            .query(&[
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("interval", "1d"),
                ("events", "history"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(YahooError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let mut chart = parse_chart(&body, self.timezone)?;
        chart.bars.retain(|bar| bar.date >= start && bar.date < end);
        Ok(chart)
    }

    async fn snapshot_for(
        &self,
        symbol: &str,
        days: i64,
        today: NaiveDate,
    ) -> Result<PriceSnapshot, YahooError> {
        let start = lookback_start(today, days)?;
        let chart = self.fetch_chart(symbol, start, today).await?;

        let has_today = chart.bars.iter().any(|bar| bar.date == today);
        let current_price = if has_today { None } else { chart.market_price };
        Ok(PriceSnapshot::new(symbol, chart.bars, current_price))
    }
}

#[async_trait]
impl PriceProvider for YahooClient {
    async fn price_snapshot(&self, symbol: &str, days: i64) -> Option<PriceSnapshot> {
        let symbol = symbol.trim().to_uppercase();
        let today = today_in(&self.timezone);
        log_fetch_prices(&format!(
            "Fetching {} days of prices for {} up to {}",
            days,
            symbol,
            format_date(today)
        ));

        let timer = Timer::start("chart");
        let result = self.snapshot_for(&symbol, days, today).await;
        timer.log_elapsed("YAHOO");

        match result {
            Ok(snapshot) => {
                tracing::info!(
                    symbol = %symbol,
                    bars = snapshot.bars.len(),
                    live = ?snapshot.current_price,
                    "Fetched prices"
                );
                Some(snapshot)
            }
            Err(e) => {
                Logger::new("YAHOO")
                    .warn_with_error(&format!("Failed to fetch prices for {}", symbol), &e);
                None
            }
        }
    }
}
