use chrono_tz::Tz;
use sensefolio_analysis::models::ScoreTarget;
use sensefolio_analysis::sentiment::{LexiconSource, DEFAULT_LEXICON_URL};
use sensefolio_analysis::utils::{parse_timezone, MAX_LOOKBACK_DAYS};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";
pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_MARKET_TIMEZONE: &str = "America/New_York";
pub const LEXICON_FILE_NAME: &str = "vader_lexicon.txt";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

// YAML-serializable configuration structure, every key optional
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct ConfigYaml {
    pub finnhub_api_key: Option<String>,
    pub finnhub_base_url: Option<String>,
    pub yahoo_base_url: Option<String>,
    pub market_timezone: Option<String>,
    pub sentiment_model: Option<String>,
    pub score_target: Option<String>,
    pub cache_dir: Option<PathBuf>,
    pub vader_lexicon_path: Option<PathBuf>,
    pub vader_lexicon_url: Option<String>,
    pub vader_lexicon_bundled: Option<bool>,
    pub chart_dir: Option<PathBuf>,
    pub http_timeout_secs: Option<u64>,
    pub news_lookback_days: Option<i64>,
    pub price_lookback_days: Option<i64>,
    pub random_user_agent: Option<bool>,
}

// Holds application-wide settings
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Finnhub token, passed through unvalidated
    pub finnhub_api_key: Option<String>,
    pub finnhub_base_url: String,
    pub yahoo_base_url: String,
    /// Timezone that decides which calendar day a news item belongs to
    pub market_timezone: Tz,
    /// Model identifier, checked when the analyzer is built
    pub sentiment_model: String,
    pub score_target: ScoreTarget,
    /// Local copy of the full lexicon, downloaded from `lexicon_url` when missing
    pub lexicon_path: PathBuf,
    pub lexicon_url: String,
    /// Score with the compiled-in subset and never touch the network
    pub bundled_lexicon: bool,
    pub chart_dir: PathBuf,
    pub http_timeout: Duration,
    pub news_lookback_days: i64,
    pub price_lookback_days: i64,
    pub random_user_agent: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            finnhub_api_key: None,
            finnhub_base_url: DEFAULT_FINNHUB_BASE_URL.to_string(),
            yahoo_base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            market_timezone: chrono_tz::America::New_York,
            sentiment_model: "vader".to_string(),
            score_target: ScoreTarget::default(),
            lexicon_path: PathBuf::from(".cache/sensefolio").join(LEXICON_FILE_NAME),
            lexicon_url: DEFAULT_LEXICON_URL.to_string(),
            bundled_lexicon: false,
            chart_dir: PathBuf::from("charts"),
            http_timeout: Duration::from_secs(30),
            news_lookback_days: 7,
            price_lookback_days: 7,
            random_user_agent: true,
        }
    }
}

impl AppConfig {
    // Load configuration from YAML file or environment variables
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        if let Ok(config_file) = env::var("CONFIG_FILE") {
            Self::from_yaml(&config_file)
        } else {
            Self::from_env()
        }
    }

    pub fn from_yaml(file_path: &str) -> Result<Self, ConfigError> {
        let yaml_content = fs::read_to_string(file_path).map_err(|source| ConfigError::Read {
            path: file_path.to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml_content)
    }

    pub fn from_yaml_str(yaml_content: &str) -> Result<Self, ConfigError> {
        let mut yaml_config: ConfigYaml = serde_yaml::from_str(yaml_content)?;
        if yaml_config.cache_dir.is_none() {
            yaml_config.cache_dir = user_cache_dir(&|key: &str| env::var(key).ok());
        }
        Self::from_parts(yaml_config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup, e.g. the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let parts = ConfigYaml {
            finnhub_api_key: get("FINNHUB_API_KEY"),
            finnhub_base_url: get("FINNHUB_BASE_URL"),
            yahoo_base_url: get("YAHOO_BASE_URL"),
            market_timezone: get("MARKET_TIMEZONE"),
            sentiment_model: get("SENTIMENT_MODEL"),
            score_target: get("SCORE_TARGET"),
            cache_dir: get("CACHE_DIR")
                .map(PathBuf::from)
                .or_else(|| user_cache_dir(&get)),
            vader_lexicon_path: get("VADER_LEXICON_PATH").map(PathBuf::from),
            vader_lexicon_url: get("VADER_LEXICON_URL"),
            vader_lexicon_bundled: parse_number(
                get("VADER_LEXICON_BUNDLED"),
                "VADER_LEXICON_BUNDLED",
            )?,
            chart_dir: get("CHART_DIR").map(PathBuf::from),
            http_timeout_secs: parse_number(get("HTTP_TIMEOUT_SECS"), "HTTP_TIMEOUT_SECS")?,
            news_lookback_days: parse_number(get("NEWS_LOOKBACK_DAYS"), "NEWS_LOOKBACK_DAYS")?,
            price_lookback_days: parse_number(get("PRICE_LOOKBACK_DAYS"), "PRICE_LOOKBACK_DAYS")?,
            random_user_agent: parse_number(get("RANDOM_USER_AGENT"), "RANDOM_USER_AGENT")?,
        };

        Self::from_parts(parts)
    }

    fn from_parts(parts: ConfigYaml) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let market_timezone = match parts.market_timezone {
            Some(name) => parse_timezone(&name).map_err(|_| ConfigError::InvalidValue {
                key: "MARKET_TIMEZONE",
                value: name,
            })?,
            None => defaults.market_timezone,
        };

        let score_target = match parts.score_target {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "SCORE_TARGET",
                value,
            })?,
            None => defaults.score_target,
        };

        let news_lookback_days = positive_days(parts.news_lookback_days, "NEWS_LOOKBACK_DAYS")?
            .unwrap_or(defaults.news_lookback_days);
        let price_lookback_days = positive_days(parts.price_lookback_days, "PRICE_LOOKBACK_DAYS")?
            .unwrap_or(defaults.price_lookback_days);

        let lexicon_path = match (parts.vader_lexicon_path, parts.cache_dir) {
            (Some(path), _) => path,
            (None, Some(dir)) => dir.join(LEXICON_FILE_NAME),
            (None, None) => defaults.lexicon_path,
        };

        Ok(Self {
            finnhub_api_key: parts.finnhub_api_key,
            finnhub_base_url: parts.finnhub_base_url.unwrap_or(defaults.finnhub_base_url),
            yahoo_base_url: parts.yahoo_base_url.unwrap_or(defaults.yahoo_base_url),
            market_timezone,
            sentiment_model: parts.sentiment_model.unwrap_or(defaults.sentiment_model),
            score_target,
            lexicon_path,
            lexicon_url: parts.vader_lexicon_url.unwrap_or(defaults.lexicon_url),
            bundled_lexicon: parts
                .vader_lexicon_bundled
                .unwrap_or(defaults.bundled_lexicon),
            chart_dir: parts.chart_dir.unwrap_or(defaults.chart_dir),
            http_timeout: parts
                .http_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
            news_lookback_days,
            price_lookback_days,
            random_user_agent: parts.random_user_agent.unwrap_or(defaults.random_user_agent),
        })
    }

    /// Where the sentiment lexicon comes from
    pub fn lexicon_source(&self) -> LexiconSource {
        if self.bundled_lexicon {
            return LexiconSource::Bundled;
        }
        LexiconSource::File {
            path: self.lexicon_path.clone(),
            url: self.lexicon_url.clone(),
        }
    }
}

/// `$XDG_CACHE_HOME/sensefolio`, else `$HOME/.cache/sensefolio`
fn user_cache_dir<F>(get: &F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    get("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| get("HOME").map(|home| PathBuf::from(home).join(".cache")))
        .map(|dir| dir.join("sensefolio"))
}

fn parse_number<T: std::str::FromStr>(
    value: Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key, value: v })
        })
        .transpose()
}

fn positive_days(days: Option<i64>, key: &'static str) -> Result<Option<i64>, ConfigError> {
    match days {
        Some(d) if !(1..=MAX_LOOKBACK_DAYS).contains(&d) => Err(ConfigError::InvalidValue {
            key,
            value: d.to_string(),
        }),
        other => Ok(other),
    }
}
