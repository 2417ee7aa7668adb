use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::data_mgmt::models::{DeviceRecord, PowerMode};
use crate::interfaces::telemetry::{BatteryInfoRow, BurstRow, RawBatch};

static BATTERY_LEVEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Battery Level (\d+\.\d+)").expect("valid regex"));
static POWER_MODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Power mode (\w+)").expect("valid regex"));

/// Turns raw database rows into typed records, dropping rows that cannot be reported on
pub fn normalize(batch: RawBatch, critical_voltage: f64) -> Vec<DeviceRecord> {
    match batch {
        RawBatch::Bursts(rows) => normalize_bursts(rows, critical_voltage),
        RawBatch::BatteryInfo(rows) => normalize_battery_info(rows, critical_voltage),
    }
}

pub fn battery_level(payload: &str) -> Option<f64> {
    BATTERY_LEVEL
        .captures(payload)
        .and_then(|c| c[1].parse().ok())
}

pub fn power_mode_label(payload: &str) -> Option<&str> {
    POWER_MODE
        .captures(payload)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn normalize_bursts(rows: Vec<BurstRow>, critical_voltage: f64) -> Vec<DeviceRecord> {
    let total = rows.len();
    let mut records = Vec::with_capacity(total);
    let mut without_voltage = 0;
    let mut incomplete = 0;
    // Labels found on rows whose power mode had to be derived
    let mut bad_labels = BTreeSet::new();
    let mut derived = 0;

    for row in rows {
        let payload = row.payload.as_deref().unwrap_or_default();
        let Some(voltage) = battery_level(payload) else {
            log::trace!("No battery level in payload of {:?}: {payload}", row.device_id);
            without_voltage += 1;
            continue;
        };
        let (Some(device_id), Some(event_time)) = (row.device_id, row.event_time) else {
            incomplete += 1;
            continue;
        };

        let label = power_mode_label(payload);
        let power_mode = match label.map(str::parse::<PowerMode>) {
            Some(Ok(mode)) => mode,
            _ => {
                bad_labels.insert(label.unwrap_or("None").to_string());
                derived += 1;
                PowerMode::from_voltage(voltage, critical_voltage)
            }
        };

        records.push(DeviceRecord {
            device_id,
            device_name: row.device_name,
            organization_id: None,
            organization: row.customer_name,
            event_time,
            voltage,
            power_mode,
        });
    }

    if without_voltage > 0 {
        log::warn!("Dropped {without_voltage} of {total} rows without a numeric battery level");
    }
    if incomplete > 0 {
        log::warn!("Dropped {incomplete} of {total} rows without device ID or event time");
    }
    if derived > 0 {
        log::warn!(
            "{derived} of {} trackers have no well-defined power mode in the payload ({}); derived from voltage with critical at {critical_voltage}",
            records.len(),
            bad_labels.into_iter().collect::<Vec<_>>().join(", ")
        );
    }
    records
}

fn normalize_battery_info(rows: Vec<BatteryInfoRow>, critical_voltage: f64) -> Vec<DeviceRecord> {
    let total = rows.len();
    let records: Vec<DeviceRecord> = rows
        .into_iter()
        .filter_map(|row| {
            let device_id = row.device_id.filter(|id| !id.trim().is_empty())?;
            let voltage = row.voltage?;
            let event_time = row.event_time?;
            Some(DeviceRecord {
                device_id,
                device_name: row.asset_name,
                organization_id: row.organization_id,
                organization: row.organization_name,
                event_time,
                voltage,
                power_mode: PowerMode::from_voltage(voltage, critical_voltage),
            })
        })
        .collect();

    let dropped = total - records.len();
    if dropped > 0 {
        log::warn!("Dropped {dropped} of {total} rows without device ID, voltage or event time");
    }
    records
}
