use tracing::{debug, info, warn};
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const DEFAULT_FILTER: &str = "sensefolio=info,sensefolio_analysis=info";

/// Initialize logging, honouring `RUST_LOG` when set
pub fn init_logger() -> anyhow::Result<()> {
    let timer = ChronoUtc::rfc_3339();

    let format_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_timer(timer)
        .with_writer(std::io::stderr)
        .compact();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(format_layer)
        .try_init()?;

    Ok(())
}

/// Logger struct for contextual logging
#[derive(Debug, Clone)]
pub struct Logger {
    context: String,
}

impl Logger {
    pub fn new(context: &str) -> Self {
        Self {
            context: context.to_string(),
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn info(&self, message: &str) {
        info!("{}: {}", self.context, message);
    }

    pub fn warn(&self, message: &str) {
        warn!("{}: {}", self.context, message);
    }

    pub fn warn_with_error(&self, message: &str, error: &dyn std::error::Error) {
        warn!("{}: {}: {}", self.context, message, error);
    }

    pub fn debug(&self, message: &str) {
        debug!("{}: {}", self.context, message);
    }
}

/// [FETCH_NEWS] - News provider calls
pub fn log_fetch_news(message: &str) {
    info!("FETCH_NEWS: {}", message);
}

/// [FETCH_PRICES] - Price provider calls
pub fn log_fetch_prices(message: &str) {
    info!("FETCH_PRICES: {}", message);
}

/// [SENTIMENT] - Scoring and aggregation
pub fn log_sentiment(message: &str) {
    info!("SENTIMENT: {}", message);
}

/// Performance timing helper
pub struct Timer {
    start: std::time::Instant,
    name: String,
}

impl Timer {
    pub fn start(name: &str) -> Self {
        Self {
            start: std::time::Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    pub fn log_elapsed(&self, context: &str) {
        debug!(
            "{}: {} completed in {}",
            context,
            self.name,
            super::format_duration(self.elapsed_ms())
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_keeps_context() {
        let logger = Logger::new("LEXICON");
        assert_eq!(logger.context(), "LEXICON");
        logger.debug("no subscriber installed, message is dropped");
    }

    #[test]
    fn test_timer_measures_elapsed() {
        let timer = Timer::start("noop");
        assert!(timer.elapsed_ms() >= 0.0);
        timer.log_elapsed("TEST");
    }
}
