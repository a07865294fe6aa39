use clap::Parser;
use sensefolio::commands::{App, Command};
use sensefolio::config::AppConfig;
use sensefolio_analysis::init_logger;

#[derive(Parser)]
#[command(name = "sensefolio")]
#[command(about = "Stock prices, company news sentiment and a combined dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger()?;

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    tracing::debug!(
        timezone = %config.market_timezone,
        model = %config.sentiment_model,
        chart_dir = %config.chart_dir.display(),
        "Loaded configuration"
    );

    let app = App::from_config(config)?;
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut out = std::io::stdout();
    app.run(cli.command, &mut input, &mut out).await
}
