use crate::config::AppConfig;
use crate::dashboard::{build_dashboard, render_dashboard, render_sentiment_bars};
use crate::finnhub::FinnhubClient;
use crate::news_sentiment::{
    analyze_news_sentiment, daily_sentiment, format_daily_summary, format_news_table,
};
use crate::providers::{NewsProvider, PriceProvider};
use crate::yahoo::YahooClient;
use clap::Subcommand;
use sensefolio_analysis::sentiment::{Lexicon, SentimentAnalyzer};
use sensefolio_analysis::utils::{format_date, today_in, DateBound, Logger, MAX_LOOKBACK_DAYS};
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// How many headlines the `news` command lists
const NEWS_PREVIEW_LIMIT: usize = 5;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the latest company news headlines
    News {
        /// First day of the window (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Last day of the window (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Show daily OHLCV prices for the last N days
    Prices,
    /// Show recent closes plus the live price
    Quote,
    /// Score sentences typed at the prompt until 'q'
    Sentiment {
        /// Sentiment model to use instead of the configured one
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Score company news and chart the daily average
    NewsSentiment {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    /// Chart prices together with news sentiment rolled onto trading dates
    Dashboard,
}

/// Interactive front end over a news and a price provider
pub struct App<N, P> {
    config: AppConfig,
    news: N,
    prices: P,
}

impl App<FinnhubClient, YahooClient> {
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let news = FinnhubClient::from_config(&config)?;
        let prices = YahooClient::from_config(&config)?;
        Ok(Self::new(config, news, prices))
    }
}

impl<N, P> App<N, P>
where
    N: NewsProvider,
    P: PriceProvider,
{
    pub fn new(config: AppConfig, news: N, prices: P) -> Self {
        Self {
            config,
            news,
            prices,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Build the analyzer for `model`, or the configured model.
    ///
    /// Falls back to the bundled lexicon subset when the full one cannot be
    /// read or downloaded.
    pub async fn analyzer(&self, model: Option<&str>) -> anyhow::Result<SentimentAnalyzer> {
        let lexicon = match Lexicon::load(&self.config.lexicon_source()).await {
            Ok(lexicon) => lexicon,
            Err(e) => {
                Logger::new("LEXICON").warn(&format!(
                    "{}; scoring with the bundled lexicon subset",
                    e
                ));
                Lexicon::bundled()
            }
        };
        let model = model.unwrap_or(&self.config.sentiment_model);
        Ok(SentimentAnalyzer::from_name(model, lexicon)?)
    }

    pub async fn run<R, W>(&self, command: Command, input: &mut R, out: &mut W) -> anyhow::Result<()>
    where
        R: BufRead,
        W: Write,
    {
        match command {
            Command::News { from, to } => self.news(from, to, input, out).await,
            Command::Prices => self.prices(input, out).await,
            Command::Quote => self.quote(input, out).await,
            Command::Sentiment { model } => self.sentiment(model.as_deref(), input, out).await,
            Command::NewsSentiment { from, to } => self.news_sentiment(from, to, input, out).await,
            Command::Dashboard => self.dashboard(input, out).await,
        }
    }

    async fn news<R: BufRead, W: Write>(
        &self,
        from: Option<String>,
        to: Option<String>,
        input: &mut R,
        out: &mut W,
    ) -> anyhow::Result<()> {
        writeln!(out, "📰 Sensefolio News Fetcher")?;
        let Some(symbol) = prompt_symbol(input, out)? else {
            return Ok(());
        };

        let news = self
            .news
            .company_news(&symbol, from.map(DateBound::from), to.map(DateBound::from))
            .await?;
        if news.is_empty() {
            writeln!(out, "⚠️  No news found.")?;
            return Ok(());
        }

        let tz = self.config.market_timezone;
        writeln!(
            out,
            "\n📢 Top {} news headlines for {}:\n",
            news.len().min(NEWS_PREVIEW_LIMIT),
            symbol
        )?;
        for article in news.iter().take(NEWS_PREVIEW_LIMIT) {
            writeln!(
                out,
                "- {} | {}",
                format_date(article.local_date(&tz)),
                article.headline
            )?;
            writeln!(out, "  {}\n", article.url)?;
        }
        Ok(())
    }

    async fn prices<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> anyhow::Result<()> {
        writeln!(out, "💹 Price Fetcher")?;
        let Some(symbol) = prompt_symbol(input, out)? else {
            return Ok(());
        };

        let default_days = self.config.price_lookback_days;
        let answer = prompt(
            input,
            out,
            &format!("Enter number of days (default is {}): ", default_days),
        )?
        .unwrap_or_default();
        let days = match parse_days(&answer, default_days) {
            Some(days) => days,
            None => {
                writeln!(out, "⚠️ Invalid number of days. Defaulting to {}.", default_days)?;
                default_days
            }
        };

        let bars = self.prices.history(&symbol, days).await;
        if bars.is_empty() {
            writeln!(out, "⚠️ No price data returned.")?;
            return Ok(());
        }

        writeln!(out, "\n📊 Price Data for {} (Last {} Days):\n", symbol, days)?;
        for bar in &bars {
            writeln!(
                out,
                "{} | Open: {:.2} | High: {:.2} | Low: {:.2} | Close: {:.2} | Volume: {}",
                format_date(bar.date),
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                bar.volume
            )?;
        }
        Ok(())
    }

    async fn quote<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> anyhow::Result<()> {
        let Some(symbol) = prompt_symbol(input, out)? else {
            return Ok(());
        };

        let Some(snapshot) = self
            .prices
            .price_snapshot(&symbol, self.config.price_lookback_days)
            .await
        else {
            writeln!(out, "Failed to retrieve data for {}.", symbol)?;
            return Ok(());
        };

        writeln!(out, "\nHistorical prices for {}:", symbol)?;
        for bar in &snapshot.bars {
            writeln!(out, "{}: {:.2}", format_date(bar.date), bar.close)?;
        }
        if let Some(current) = snapshot.current_price {
            writeln!(out, "\nCurrent price for {} (live): {:.2}", symbol, current)?;
        }
        Ok(())
    }

    async fn sentiment<R: BufRead, W: Write>(
        &self,
        model: Option<&str>,
        input: &mut R,
        out: &mut W,
    ) -> anyhow::Result<()> {
        let analyzer = self.analyzer(model).await?;
        writeln!(out, "🧠 Sentiment Analyzer ({})", analyzer.model())?;

        while let Some(text) = prompt(input, out, "\nEnter a sentence (or 'q' to quit): ")? {
            if text.eq_ignore_ascii_case("q") {
                break;
            }
            let scores = analyzer.analyze(&text);
            writeln!(out, "Sentiment Scores: {} ({})", scores, scores.polarity())?;
        }
        Ok(())
    }

    async fn news_sentiment<R: BufRead, W: Write>(
        &self,
        from: Option<String>,
        to: Option<String>,
        input: &mut R,
        out: &mut W,
    ) -> anyhow::Result<()> {
        writeln!(out, "📰 News Sentiment Analyzer")?;
        let Some(symbol) = prompt_symbol(input, out)? else {
            return Ok(());
        };

        let analyzer = self.analyzer(None).await?;
        let scored = analyze_news_sentiment(
            &self.news,
            &analyzer,
            &symbol,
            from.map(DateBound::from),
            to.map(DateBound::from),
            self.config.score_target,
        )
        .await?;
        if scored.is_empty() {
            writeln!(out, "⚠️  No news fetched to analyze.")?;
            return Ok(());
        }

        let tz = self.config.market_timezone;
        writeln!(out, "\n📰 News Sentiment Analysis (Latest to Oldest):")?;
        write!(out, "{}", format_news_table(&scored, &tz))?;

        let daily = daily_sentiment(&scored, &tz);
        writeln!(out, "\n📊 Average Sentiment Scores by Date:")?;
        write!(out, "{}", format_daily_summary(&daily))?;

        let path = self.chart_path(&symbol, "news_sentiment");
        render_sentiment_bars(&symbol, &daily, &path)?;
        writeln!(out, "\n🖼️  Chart written to {}", path.display())?;
        Ok(())
    }

    async fn dashboard<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> anyhow::Result<()> {
        let Some(symbol) = prompt_symbol(input, out)? else {
            return Ok(());
        };

        let analyzer = self.analyzer(None).await?;
        let tz = self.config.market_timezone;
        let view = build_dashboard(
            &self.prices,
            &self.news,
            &analyzer,
            &symbol,
            self.config.price_lookback_days,
            self.config.score_target,
            &tz,
            today_in(&tz),
        )
        .await?;

        let path = self.chart_path(&symbol, "dashboard");
        render_dashboard(&view, &path)?;
        Logger::new("DASHBOARD").info(&format!("Rendered {} dashboard", symbol));
        writeln!(out, "🖼️  Dashboard written to {}", path.display())?;
        Ok(())
    }

    fn chart_path(&self, symbol: &str, kind: &str) -> PathBuf {
        self.config.chart_dir.join(format!("{}_{}.svg", symbol, kind))
    }
}

/// Print `message` and read one trimmed line; `None` at end of input
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    message: &str,
) -> anyhow::Result<Option<String>> {
    write!(out, "{}", message)?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn prompt_symbol<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> anyhow::Result<Option<String>> {
    let symbol = prompt(input, out, "Enter stock symbol (e.g., AAPL): ")?
        .map(|s| s.to_uppercase())
        .filter(|s| !s.is_empty());
    if symbol.is_none() {
        writeln!(out, "⚠️  No symbol entered.")?;
    }
    Ok(symbol)
}

/// Blank input means the default; anything but a positive integer is invalid
fn parse_days(answer: &str, default_days: i64) -> Option<i64> {
    if answer.is_empty() {
        return Some(default_days);
    }
    answer
        .parse::<i64>()
        .ok()
        .filter(|days| (1..=MAX_LOOKBACK_DAYS).contains(days))
}
