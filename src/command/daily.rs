use std::fs;
use std::io;

use anyhow::{bail, Context, Result};

use crate::argsets::DailyArgs;
use crate::config::Config;
use crate::data_mgmt::filters::{Fleet, FleetFilter};
use crate::data_mgmt::models::DbSelector;
use crate::data_mgmt::snapshot::SnapshotStore;
use crate::data_mgmt::stats::PowerModeBreakdown;
use crate::helpers::base_path::{CONFIG_DIR, REPORT_DIR};
use crate::helpers::prompt::prompt_for_date;
use crate::helpers::time;
use crate::interfaces::{Mailer, SqlServerSource};
use crate::report::{chart, daily as daily_report};

pub fn daily(args: DailyArgs) -> Result<()> {
    let config = Config::load(&CONFIG_DIR)?;
    let today = time::today(config.report.timezone()?);
    let selector = if args.old {
        DbSelector::DebugSmbs
    } else {
        DbSelector::Smbs
    };

    let specific_date = match (args.date, args.manual) {
        (Some(date), _) => Some(date),
        (None, true) => Some(prompt_for_date(io::stdin().lock(), io::stdout(), today)?),
        (None, false) => None,
    };
    let date = specific_date.unwrap_or(today);
    if date > today {
        bail!("Cannot report on {date}, which is after today ({today})");
    }

    let store = SnapshotStore::open(&REPORT_DIR, selector, config.report.critical_voltage)?;
    let mut source = SqlServerSource::new(config.database(selector), selector);
    let snapshot = store.load_or_fetch(date, time::as_of_for(date, today), &mut source)?;

    let filter = FleetFilter::new(
        super::new_pv_ids(&config)?,
        time::reference_time(date, today, time::now_utc()),
        config.report.last_seen_weeks,
    );
    let new_pv = filter.select(Fleet::NewPv, &snapshot.records);
    log::info!(
        "{} of {} devices are in the {} list",
        new_pv.len(),
        snapshot.records.len(),
        Fleet::NewPv
    );

    let chart_path = chart::chart_path(&REPORT_DIR, selector, date);
    chart::render(
        &chart_path,
        &config.report.chart_font,
        Fleet::NewPv.title(),
        date,
        &PowerModeBreakdown::from_records(new_pv),
    )
    .context("Failed to render chart")?;
    let png = fs::read(&chart_path)
        .with_context(|| format!("Failed to read chart {}", chart_path.display()))?;

    let email = daily_report::compose(
        &snapshot,
        specific_date,
        &filter,
        &config.report.organizations,
        png,
    );
    Mailer::from_config(&config.email)?.send(&email, &config.email.recipients)?;

    log::info!("Email sent successfully using {}", selector.query_type());
    log::info!("Report date: {}", time::report_label(date));
    log::info!("Query time: {} seconds", snapshot.query_time as u64);
    Ok(())
}
