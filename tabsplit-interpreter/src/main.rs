mod config;

use std::{borrow::Cow, env, fs, process};

use tabsplit_domain::{BillEngine, Currency};
use tabsplit_infrastructure::BillSnapshot;
use tabsplit_presentation::SummaryPresenter;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

type CliResult<T> = Result<T, Cow<'static, str>>;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> CliResult<()> {
    let config = AppConfig::from_env()?;
    init_logging();

    let Some(path) = env::args().nth(1) else {
        return Err("Usage: tabsplit-interpreter <bill.json>".into());
    };

    let source =
        fs::read_to_string(&path).map_err(|err| format!("Failed to read '{path}': {err}"))?;
    let mut bill = BillSnapshot::from_json(&source)
        .and_then(BillSnapshot::into_bill)
        .map_err(|err| format!("Invalid bill '{path}': {err}"))?;

    if let Some(rate) = config.exchange_rate
        && bill.currency() == Currency::Jpy
        && bill.exchange_rate().is_none()
        && bill.is_open()
    {
        bill.set_exchange_rate(rate).map_err(|err| err.to_string())?;
    }

    let engine = BillEngine::new(config.rounding_mode);
    let summary = if bill.is_open() {
        bill.finalize(&engine, OffsetDateTime::now_utc())
            .map_err(|err| err.to_string())?
    } else {
        tracing::info!(bill_id = bill.id().0, state = %bill.state(), "Bill already closed, recomputing");
        engine.compute(&bill)
    };

    println!("{}", SummaryPresenter::render(&summary));
    Ok(())
}
