use std::fs;
use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use itertools::Itertools;

use crate::argsets::WeeklyArgs;
use crate::config::Config;
use crate::constants::{defaults, filenames};
use crate::data_mgmt::filters::{Fleet, FleetFilter};
use crate::data_mgmt::models::DbSelector;
use crate::data_mgmt::snapshot::{self, DailySnapshot, SnapshotStore};
use crate::data_mgmt::stats::PowerModeBreakdown;
use crate::helpers::base_path::{CONFIG_DIR, REPORT_DIR};
use crate::helpers::time;
use crate::interfaces::{EmailedDatesLog, Mailer, SqlServerSource};
use crate::report::{chart, weekly as weekly_report};

const SELECTOR: DbSelector = DbSelector::Smbs;

pub fn weekly(args: WeeklyArgs) -> Result<()> {
    let config = Config::load(&CONFIG_DIR)?;
    let today = time::today(config.report.timezone()?);
    let sent_log = EmailedDatesLog::new(REPORT_DIR.join(filenames::EMAILED_DATES));

    let dates: Vec<NaiveDate> = if args.track {
        log::warn!("Tracking mode is deprecated; the default 7-day window replaces it");
        let already_sent = sent_log.load()?;
        snapshot::cached_dates(&REPORT_DIR, SELECTOR)?
            .into_iter()
            .filter(|date| !already_sent.contains(date))
            .collect()
    } else {
        time::trailing_window(today, defaults::WEEKLY_WINDOW_DAYS)
    };
    if dates.is_empty() {
        log::info!("No new reports to send.");
        return Ok(());
    }
    log::info!(
        "Weekly report covers {}",
        dates.iter().map(|d| d.format(time::DATE_FORMAT)).join(", ")
    );

    let store = SnapshotStore::open(&REPORT_DIR, SELECTOR, config.report.critical_voltage)?;
    let mut source = SqlServerSource::new(config.database(SELECTOR), SELECTOR);
    let snapshots = dates
        .iter()
        .map(|date| store.load_or_fetch(*date, time::as_of_for(*date, today), &mut source))
        .collect::<Result<Vec<DailySnapshot>, _>>()?;

    let new_pv_ids = super::new_pv_ids(&config)?;
    let now = time::now_utc();
    let sections = snapshots
        .iter()
        .map(|snapshot| {
            let filter = FleetFilter::new(
                new_pv_ids.clone(),
                time::reference_time(snapshot.date, today, now),
                config.report.last_seen_weeks,
            );
            let breakdown =
                PowerModeBreakdown::from_records(filter.select(Fleet::NewPv, &snapshot.records));
            let chart_png = section_chart(&config.report.chart_font, snapshot.date, &breakdown);
            weekly_report::Section {
                snapshot,
                filter,
                chart_png,
            }
        })
        .collect();

    let recipients = weekly_report::recipients_for(&config.email.recipients, args.debug);
    let email = weekly_report::compose(sections, &config.report.organizations);
    Mailer::from_config(&config.email)?.send(&email, &recipients)?;

    if weekly_report::should_update_log(args.track, args.debug, recipients.len()) {
        sent_log.append(&dates)?;
        log::debug!("Updated {}", sent_log.path().display());
    }
    log::info!(
        "Emailed reports for: {}",
        dates.iter().map(|d| time::report_label(*d)).join(", ")
    );
    Ok(())
}

/// Existing chart for `date`, rendered first if missing; `None` if rendering fails
fn section_chart(font: &Path, date: NaiveDate, breakdown: &PowerModeBreakdown) -> Option<Vec<u8>> {
    let path = chart::chart_path(&REPORT_DIR, SELECTOR, date);
    if !path.is_file() {
        if let Err(e) = chart::render(&path, font, Fleet::NewPv.title(), date, breakdown) {
            log::warn!("No chart for {date}: {e}");
            return None;
        }
    }
    match fs::read(&path) {
        Ok(png) => Some(png),
        Err(e) => {
            log::warn!("Cannot read chart {}: {e}", path.display());
            None
        }
    }
}
