use crate::config::AppConfig;
use crate::providers::{http_client, user_agent, NewsProvider};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use reqwest::Client;
use sensefolio_analysis::models::NewsEvent;
use sensefolio_analysis::utils::{
    format_date, log_fetch_news, resolve_date_range_with, today_in, DateBound, DateRangeError,
    Logger, Timer, DEFAULT_LOOKBACK_DAYS,
};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinnhubError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Finnhub returned status {0}")]
    Status(u16),

    #[error("Failed to decode company-news body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One item of the `company-news` response
#[derive(Debug, Deserialize)]
struct FinnhubArticle {
    datetime: i64,
    #[serde(default)]
    headline: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    url: String,
    source: Option<String>,
    category: Option<String>,
    related: Option<String>,
    id: Option<i64>,
    image: Option<String>,
}

impl FinnhubArticle {
    fn into_event(self) -> Option<NewsEvent> {
        let published_at = DateTime::from_timestamp(self.datetime, 0)?;
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());

        let mut event = NewsEvent::new(published_at, self.headline, self.summary, self.url);
        event.source = non_empty(self.source);
        event.category = non_empty(self.category);
        event.related = non_empty(self.related);
        event.id = self.id;
        event.image = non_empty(self.image);
        Some(event)
    }
}

fn parse_articles(body: &str) -> Result<Vec<NewsEvent>, serde_json::Error> {
    let articles: Vec<FinnhubArticle> = serde_json::from_str(body)?;
    Ok(articles
        .into_iter()
        .filter_map(FinnhubArticle::into_event)
        .collect())
}

pub struct FinnhubClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timezone: Tz,
    lookback_days: i64,
    random_agent: bool,
}

impl FinnhubClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FinnhubError> {
        Ok(FinnhubClient {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timezone: chrono_tz::America::New_York,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            random_agent: true,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, FinnhubError> {
        let mut client = Self::new(
            &config.finnhub_base_url,
            config.finnhub_api_key.clone(),
            config.http_timeout,
        )?;
        client.timezone = config.market_timezone;
        client.lookback_days = config.news_lookback_days;
        client.random_agent = config.random_user_agent;
        Ok(client)
    }

    /// Timezone used to decide what "today" is for default windows
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Raw `company-news` call for a resolved window; every failure is returned
    pub async fn fetch_company_news(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NewsEvent>, FinnhubError> {
        let url = format!("{}/company-news", self.base_url);
        let from = format_date(from);
        let to = format_date(to);

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("User-Agent", user_agent(self.random_agent))
            .query(&[("symbol", symbol), ("from", from.as_str()), ("to", to.as_str())]);
        if let Some(token) = &self.api_key {
            request = request.query(&[("token", token)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FinnhubError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(parse_articles(&body)?)
    }
}

#[async_trait]
impl NewsProvider for FinnhubClient {
    async fn company_news(
        &self,
        symbol: &str,
        from: Option<DateBound>,
        to: Option<DateBound>,
    ) -> Result<Vec<NewsEvent>, DateRangeError> {
        let today = today_in(&self.timezone);
        let (from, to) = resolve_date_range_with(from, to, today, self.lookback_days)?;
        let symbol = symbol.trim().to_uppercase();

        log_fetch_news(&format!(
            "Fetching news for {} from {} to {}",
            symbol,
            format_date(from),
            format_date(to)
        ));

        let timer = Timer::start("company-news");
        let result = self.fetch_company_news(&symbol, from, to).await;
        timer.log_elapsed("FINNHUB");

        match result {
            Ok(events) => {
                tracing::info!(symbol = %symbol, count = events.len(), "Fetched news articles");
                Ok(events)
            }
            Err(e) => {
                Logger::new("FINNHUB").warn_with_error(
                    &format!("Failed to fetch news for {}", symbol),
                    &e,
                );
                Ok(Vec::new())
            }
        }
    }
}
