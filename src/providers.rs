use async_trait::async_trait;
use rand::seq::IndexedRandom;
use reqwest::Client;
use sensefolio_analysis::models::{DailyBar, NewsEvent, PriceSnapshot};
use sensefolio_analysis::utils::{DateBound, DateRangeError};
use std::time::Duration;

/// Source of company news
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// News for `symbol` published between `from` and `to`, both inclusive.
    ///
    /// Only an invalid date range is an error; upstream failures yield an
    /// empty list.
    async fn company_news(
        &self,
        symbol: &str,
        from: Option<DateBound>,
        to: Option<DateBound>,
    ) -> Result<Vec<NewsEvent>, DateRangeError>;
}

/// Source of daily prices
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Bars for the last `days` calendar days (today excluded) plus the live
    /// price when today has no bar. `None` when the upstream call fails.
    async fn price_snapshot(&self, symbol: &str, days: i64) -> Option<PriceSnapshot>;

    async fn history(&self, symbol: &str, days: i64) -> Vec<DailyBar> {
        self.price_snapshot(symbol, days)
            .await
            .map(|snapshot| snapshot.bars)
            .unwrap_or_default()
    }
}

const USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.3 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
];

/// Browser user agent, rotated per request when `random` is set
pub(crate) fn user_agent(random: bool) -> &'static str {
    if random {
        USER_AGENTS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(USER_AGENTS[0])
    } else {
        USER_AGENTS[0]
    }
}

pub(crate) fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

/// Local HTTP server that answers every request with one fixed response
#[cfg(test)]
pub(crate) mod canned {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Start serving `status` (e.g. "403 Forbidden") with a JSON `body`.
    /// Returns the base URL.
    pub async fn serve(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}", addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_rotation() {
        assert_eq!(user_agent(false), USER_AGENTS[0]);
        for _ in 0..10 {
            assert!(USER_AGENTS.contains(&user_agent(true)));
        }
    }

    struct FixedPrices;

    #[async_trait]
    impl PriceProvider for FixedPrices {
        async fn price_snapshot(&self, symbol: &str, _days: i64) -> Option<PriceSnapshot> {
            let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)?;
            Some(PriceSnapshot::new(
                symbol,
                vec![DailyBar::new(date, 1.0, 2.0, 0.5, 1.5, 100)],
                Some(1.7),
            ))
        }
    }

    #[tokio::test]
    async fn test_history_defaults_to_snapshot_bars() {
        let bars = FixedPrices.history("AAPL", 7).await;
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 1.5);
    }
}
