use chrono::NaiveDate;

use crate::config::OrganizationRef;
use crate::data_mgmt::filters::FleetFilter;
use crate::data_mgmt::models::DbSelector;
use crate::data_mgmt::snapshot::DailySnapshot;
use crate::data_mgmt::stats;
use crate::helpers::time::report_label;
use crate::interfaces::{Email, InlineImage};

use super::html;

const CHART_CID: &str = "chart";

pub fn subject(selector: DbSelector) -> String {
    format!(
        "Daily Battery Report of ZIM's New PV Trackers - {}",
        selector.query_type()
    )
}

/// Daily email: chart, query timing, low-battery New-PV devices and fleet-wide statistics
pub fn compose(
    snapshot: &DailySnapshot,
    specific_date: Option<NaiveDate>,
    filter: &FleetFilter,
    organizations: &[OrganizationRef],
    chart_png: Vec<u8>,
) -> Email {
    let query_type = snapshot.selector.query_type();
    let low = filter.low_battery_new_pv(&snapshot.records);
    let fleet_stats: Vec<_> = stats::by_organization(&snapshot.records, organizations)
        .into_iter()
        .map(|s| (s.name, s.breakdown))
        .collect();

    let html = format!(
        r#"<html>
<body>
<h3>Battery Report - {query_type}</h3>
<img src="cid:{CHART_CID}" style="display:block;"><br><br>
<p><strong>Performance:</strong> Query took {seconds} seconds</p>
<p><strong>Report Date:</strong> {report_date}</p>
<p><strong>Specific Date:</strong> {specific}</p>
<br>
<h4>Low Battery New-PV Devices ({low_count}):</h4>
{low_table}
<h4>Fleet-wide Statistics</h4>
{stats_table}
</body>
</html>
"#,
        seconds = snapshot.query_time as u64,
        report_date = report_label(snapshot.date),
        specific = specific_date
            .map(report_label)
            .unwrap_or_else(|| "Latest available".to_string()),
        low_count = low.len(),
        low_table = html::records_table(&low),
        stats_table = html::breakdown_table(&fleet_stats),
    );

    Email {
        subject: subject(snapshot.selector),
        html,
        images: vec![InlineImage {
            content_id: CHART_CID.to_string(),
            png: chart_png,
        }],
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::fs;

    use chrono::NaiveDateTime;

    use super::*;
    use crate::config::ReportSettings;
    use crate::constants::defaults;
    use crate::data_mgmt::filters::Fleet;
    use crate::data_mgmt::models::{DeviceRecord, PowerMode};
    use crate::data_mgmt::snapshot::SnapshotStore;
    use crate::data_mgmt::stats::PowerModeBreakdown;
    use crate::helpers::time::as_of_cutoff;
    use crate::interfaces::telemetry::{RawBatch, SourceError, TelemetrySource};

    const TEN_DEVICES: &str = "\
### METADATA ###
query_time,12.345
source,smbs
### DATA ###
DeviceID,DeviceName,OrganizationId,Organization,EventTimeUTC,Voltage,PowerMode
A0006001,ZIMU6000001,3,ZIM,2025-01-15 06:00:00,3.41,High
A0006002,ZIMU6000002,3,ZIM,2025-01-15 06:00:00,3.42,High
A0006003,ZIMU6000003,3,ZIM,2025-01-15 06:00:00,3.43,High
A0006004,ZIMU6000004,3,ZIM,2025-01-15 06:00:00,3.44,High
A0006005,ZIMU6000005,3,ZIM,2025-01-15 06:00:00,3.45,High
A0006006,ZIMU6000006,3,ZIM,2025-01-15 06:00:00,3.46,High
A0006007,ZIMU6000007,3,ZIM,2025-01-15 06:00:00,3.25,Medium
A0006008,ZIMU6000008,3,ZIM,2025-01-15 06:00:00,3.26,Medium
A0006009,ZIMU6000009,3,ZIM,2025-01-15 06:00:00,3.20,Low
A0006010,ZIMU6000010,3,ZIM,2025-01-15 06:00:00,3.05,Critical
";

    struct OfflineSource;

    impl TelemetrySource for OfflineSource {
        fn selector(&self) -> DbSelector {
            DbSelector::Smbs
        }

        fn fetch(&mut self, _as_of: Option<NaiveDate>) -> Result<RawBatch, SourceError> {
            panic!("a cached date must not reach the database");
        }
    }

    fn record(id: &str, voltage: f64) -> DeviceRecord {
        DeviceRecord {
            device_id: id.into(),
            device_name: Some(format!("ZIMU{id}")),
            organization_id: None,
            organization: Some("ZIM".into()),
            event_time: NaiveDateTime::parse_from_str("2025-01-15 08:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            voltage,
            power_mode: PowerMode::from_voltage(voltage, defaults::CRITICAL_VOLTAGE),
        }
    }

    #[test]
    fn daily_body() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let snapshot = DailySnapshot {
            date,
            selector: DbSelector::DebugSmbs,
            query_time: 42.9,
            records: vec![record("A0006001", 3.4), record("A0006002", 3.1)],
        };
        let filter = FleetFilter::new(HashSet::new(), crate::helpers::time::as_of_cutoff(date), 12);
        let email = compose(
            &snapshot,
            None,
            &filter,
            &ReportSettings::default().organizations,
            vec![1, 2, 3],
        );

        assert_eq!(
            email.subject,
            "Daily Battery Report of ZIM's New PV Trackers - Original Query"
        );
        assert!(email.html.contains("Query took 42 seconds"));
        assert!(email.html.contains("<strong>Report Date:</strong> 15 Jan 25"));
        assert!(email.html.contains("Latest available"));
        assert!(email.html.contains("Low Battery New-PV Devices (1)"));
        assert!(email.html.contains("<td>A0006002</td>"));
        assert!(!email.html.contains("<td>A0006001</td>"));
        assert!(email.html.contains("<td>All devices</td>\n<td>2</td>"));
        assert_eq!(email.images[0].content_id, "chart");
    }

    #[test]
    fn cached_ten_devices_report() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let tempdir = tempfile::tempdir().unwrap();
        fs::write(tempdir.path().join("latest_batt_2025-01-15.csv"), TEN_DEVICES).unwrap();
        let store =
            SnapshotStore::open(tempdir.path(), DbSelector::Smbs, defaults::CRITICAL_VOLTAGE)
                .unwrap();
        let snapshot = store
            .load_or_fetch(date, Some(date), &mut OfflineSource)
            .unwrap();

        let filter = FleetFilter::new(HashSet::new(), as_of_cutoff(date), 12);
        let new_pv =
            PowerModeBreakdown::from_records(filter.select(Fleet::NewPv, &snapshot.records));
        assert_eq!(new_pv.total, 10);
        assert_eq!(new_pv.percent(PowerMode::High), 60.0);
        assert_eq!(new_pv.percent(PowerMode::Medium), 20.0);
        assert_eq!(new_pv.percent(PowerMode::Low), 10.0);
        assert_eq!(new_pv.percent(PowerMode::Critical), 10.0);

        let email = compose(
            &snapshot,
            Some(date),
            &filter,
            &ReportSettings::default().organizations,
            vec![],
        );
        assert!(email.html.contains("Query took 12 seconds"));
        assert!(email.html.contains("<strong>Specific Date:</strong> 15 Jan 25"));
        assert!(email.html.contains("Low Battery New-PV Devices (4)"));
        let shares = "<td>10</td>\n\
                      <td>1 (10.00%)</td>\n\
                      <td>1 (10.00%)</td>\n\
                      <td>2 (20.00%)</td>\n\
                      <td>6 (60.00%)</td>";
        for group in ["ZIM", "All devices"] {
            let row = format!("<td>{group}</td>\n{shares}");
            assert!(email.html.contains(&row), "{group}");
        }
    }
}
