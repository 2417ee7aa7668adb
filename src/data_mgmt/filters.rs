use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use chrono::{Duration, NaiveDateTime};
use serde::Deserialize;

use crate::constants::{defaults, fleets};
use crate::data_mgmt::models::DeviceRecord;

/// Device groups reported on separately
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fleet {
    /// ZIM trackers with the new PV panel: allowlisted IDs plus the A0 6000+ series
    NewPv,
    ZimCSeries,
    Samskip,
    Hmm,
}

impl Fleet {
    /// Fleets that get their own section in the weekly report, after the New-PV one
    pub const SECONDARY: [Fleet; 3] = [Fleet::ZimCSeries, Fleet::Samskip, Fleet::Hmm];

    pub fn title(&self) -> &'static str {
        match self {
            Fleet::NewPv => defaults::CHART_LIST_NAME,
            Fleet::ZimCSeries => "ZIM C-Series",
            Fleet::Samskip => "Samskip",
            Fleet::Hmm => "HMM",
        }
    }
}

impl fmt::Display for Fleet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// True when the last four characters of `device_id` are digits forming a number of at least 6000
pub fn is_6000_series(device_id: &str) -> bool {
    let Some(start) = device_id.len().checked_sub(4) else {
        return false;
    };
    device_id
        .get(start..)
        .filter(|tail| tail.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|tail| tail.parse::<u32>().ok())
        .is_some_and(|n| n >= fleets::NEW_PV_SERIES_MIN)
}

#[derive(Deserialize)]
struct NewPvEntry {
    #[serde(rename = "DeviceID")]
    device_id: String,
}

/// Reads the New-PV allowlist, a CSV file with a `DeviceID` column
pub fn load_new_pv_list(path: &Path) -> Result<HashSet<String>, csv::Error> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut ids = HashSet::new();
    for entry in reader.deserialize::<NewPvEntry>() {
        let id = entry?.device_id.trim().to_string();
        if !id.is_empty() {
            ids.insert(id);
        }
    }
    log::debug!("Loaded {} New-PV device IDs from {}", ids.len(), path.display());
    Ok(ids)
}

/// Fleet membership for one snapshot
///
/// Every fleet only counts paired trackers seen within `max_age` of `reference`.
pub struct FleetFilter {
    new_pv_ids: HashSet<String>,
    reference: NaiveDateTime,
    max_age: Duration,
}

impl FleetFilter {
    /// An out-of-range `last_seen_weeks` saturates, so every reading counts as recent
    pub fn new(
        new_pv_ids: HashSet<String>,
        reference: NaiveDateTime,
        last_seen_weeks: i64,
    ) -> Self {
        FleetFilter {
            new_pv_ids,
            reference,
            max_age: Duration::try_weeks(last_seen_weeks).unwrap_or(Duration::MAX),
        }
    }

    pub fn is_recent(&self, record: &DeviceRecord) -> bool {
        (self.reference - record.event_time).abs() <= self.max_age
    }

    pub fn is_new_pv(&self, record: &DeviceRecord) -> bool {
        let id = record.device_id.as_str();
        (self.new_pv_ids.contains(id)
            || (id.starts_with(fleets::NEW_PV_ID_PREFIX) && is_6000_series(id)))
            && record.organization_is(fleets::ZIM)
    }

    pub fn matches(&self, fleet: Fleet, record: &DeviceRecord) -> bool {
        let in_fleet = match fleet {
            Fleet::NewPv => self.is_new_pv(record),
            Fleet::ZimCSeries => {
                record.organization_is(fleets::ZIM)
                    && record.device_id.starts_with(fleets::ZIM_C_SERIES_PREFIX)
            }
            Fleet::Samskip => record.organization_is(fleets::SAMSKIP),
            Fleet::Hmm => record.organization_is(fleets::HMM),
        };
        in_fleet && record.is_paired() && self.is_recent(record)
    }

    pub fn select<'a>(&self, fleet: Fleet, records: &'a [DeviceRecord]) -> Vec<&'a DeviceRecord> {
        records.iter().filter(|r| self.matches(fleet, r)).collect()
    }

    /// Members of `fleet` below High power mode, lowest voltage first
    pub fn low_battery<'a>(
        &self,
        fleet: Fleet,
        records: &'a [DeviceRecord],
    ) -> Vec<&'a DeviceRecord> {
        let mut low: Vec<_> = records
            .iter()
            .filter(|r| r.power_mode.is_low() && self.matches(fleet, r))
            .collect();
        low.sort_by(|a, b| a.voltage.total_cmp(&b.voltage));
        low
    }

    pub fn low_battery_new_pv<'a>(&self, records: &'a [DeviceRecord]) -> Vec<&'a DeviceRecord> {
        self.low_battery(Fleet::NewPv, records)
    }
}
