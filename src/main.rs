use std::io::{stderr, stdout};
use std::process::exit;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono::SecondsFormat;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use fx_deal_warehouse::engine::AsyncEngine;
use fx_deal_warehouse::importer::DealImporter;
use fx_deal_warehouse::models::PersistedDeal;
use fx_deal_warehouse::storage::DealStorage;
use fx_deal_warehouse::types::{Clock, CurrencyRegistry, SystemClock};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: fx-deal-warehouse [input].csv [log_level:optional] > [output].csv");
        eprintln!("Available log levels: error, warn, info, debug, trace (default: error)");
        exit(1);
    }

    let path = &args[1];
    let log_level = args.get(2)
        .map(|s| parse_log_level(s)).unwrap_or_else(|| LevelFilter::ERROR);

    setup_logging(log_level);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let registry = Arc::new(CurrencyRegistry::default());
    let storage = Arc::new(DealStorage::new(clock.clone()));
    let importer = Arc::new(DealImporter::new(storage, registry, clock));
    let engine = AsyncEngine::new(importer.clone());

    let timer = Instant::now();
    let report = engine.run(path).await?;
    let duration = timer.elapsed();

    info!("Imported {} deals, rejected {}, in: {duration:?}", report.imported.len(), report.rejected.len());

    write_results_to_stdout(&importer.all_deals()?)?;

    Ok(())
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'error'", level);
            LevelFilter::ERROR
        }
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: stdout carries the imported deals, logging goes to stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}

fn write_results_to_stdout(deals: &[PersistedDeal]) -> Result<()> {
    //NOTE: csv::Writer quotes identifiers that carry delimiters or quotes
    let mut output = csv::Writer::from_writer(stdout().lock());

    output.write_record([
        "id",
        "deal_unique_id",
        "from_currency_iso_code",
        "to_currency_iso_code",
        "deal_timestamp",
        "deal_amount",
        "imported_at"
    ])?;

    for deal in deals {
        output.write_record([
            deal.id().to_string(),
            deal.deal_unique_id().to_string(),
            deal.from_currency_iso_code().to_string(),
            deal.to_currency_iso_code().to_string(),
            deal.deal_timestamp().to_rfc3339_opts(SecondsFormat::Secs, true),
            deal.deal_amount().to_string(),
            deal.imported_at().to_rfc3339_opts(SecondsFormat::Millis, true)
        ])?;
    }

    output.flush()?;

    Ok(())
}
