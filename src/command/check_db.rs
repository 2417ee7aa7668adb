use std::time::Instant;

use anyhow::{bail, Result};
use itertools::{Itertools, MinMaxResult};

use crate::argsets::CheckDbArgs;
use crate::config::Config;
use crate::data_mgmt::models::{DbSelector, PowerMode};
use crate::data_mgmt::parse;
use crate::data_mgmt::stats::PowerModeBreakdown;
use crate::helpers::base_path::CONFIG_DIR;
use crate::interfaces::{SqlServerSource, TelemetrySource};

/// Runs the latest-readings query once and summarizes the result; nothing is cached
pub fn check_db(args: CheckDbArgs) -> Result<()> {
    let config = Config::load(&CONFIG_DIR)?;
    let selector = if args.old {
        DbSelector::DebugSmbs
    } else {
        DbSelector::Smbs
    };
    log::info!(
        "Testing {} database connection, query and processing",
        selector.database_name()
    );

    let mut source = SqlServerSource::new(config.database(selector), selector);
    let started = Instant::now();
    let batch = source.fetch(None)?;
    let elapsed = started.elapsed().as_secs_f64();
    if batch.is_empty() {
        bail!("Query returned no rows");
    }
    log::info!("Query successful: {} rows in {elapsed:.2} seconds", batch.len());

    let records = parse::normalize(batch, config.report.critical_voltage);
    log::info!("{} records after normalization", records.len());

    let breakdown = PowerModeBreakdown::from_records(&records);
    for mode in PowerMode::ALL {
        log::info!(
            "{:>8}: {:>6} ({:.2}%)",
            mode.as_str(),
            breakdown.count(mode),
            breakdown.percent(mode)
        );
    }

    let voltages = records.iter().map(|r| r.voltage);
    match voltages.clone().minmax_by(|a, b| a.total_cmp(b)) {
        MinMaxResult::NoElements => bail!("No usable records after normalization"),
        MinMaxResult::OneElement(v) => log::info!("Voltage: {v:.3} V (single record)"),
        MinMaxResult::MinMax(min, max) => {
            let mean = voltages.sum::<f64>() / records.len() as f64;
            log::info!("Voltage: min {min:.3} V, max {max:.3} V, mean {mean:.3} V");
        }
    }
    Ok(())
}
