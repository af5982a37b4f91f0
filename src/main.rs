use anyhow::Context;
use clap::Parser;
use stockpulse::config::Config;
use stockpulse::domain::market::HistoryPeriod;
use stockpulse::domain::signal::SignalResult;
use stockpulse::infrastructure::ServiceFactory;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Buy/sell/hold signals for stock tickers", long_about = None)]
struct Args {
    /// Tickers to analyze, e.g. AAPL MSFT TCS.NS
    #[arg(required = true)]
    symbols: Vec<String>,

    /// Print results as a JSON array
    #[arg(long)]
    json: bool,

    /// Price history lookback: 1y, 2y, 5y or max (overrides HISTORY_PERIOD)
    #[arg(long)]
    period: Option<HistoryPeriod>,
}

fn print_result(result: &SignalResult) {
    println!(
        "{:<12} {:<12} {:>5.1}%",
        result.symbol, result.signal, result.confidence
    );

    if let Some(m) = &result.metrics {
        println!(
            "  RSI {:.1} | MACD {:.3} / {:.3} | SMA200 {:.2} | Close {:.2}",
            m.rsi, m.macd, m.macd_signal, m.sma_200, m.close
        );
    }

    for line in result.reason.lines().filter(|l| !l.trim().is_empty()) {
        println!("  {}", line);
    }

    for headline in &result.news {
        match &headline.link {
            Some(link) => println!("  - {} <{}>", headline.title, link),
            None => println!("  - {}", headline.title),
        }
    }
    println!();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let args = Args::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(period) = args.period {
        config.signal.history_period = period;
    }
    info!(
        "stockpulse {}: mode={:?}, period={}, {} symbol(s)",
        env!("CARGO_PKG_VERSION"),
        config.mode,
        config.signal.history_period,
        args.symbols.len()
    );

    let service = ServiceFactory::create_signal_service(&config)?;
    let results = service.scan(&args.symbols).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            print_result(result);
        }
    }

    Ok(())
}
