use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::data_mgmt::models::DbSelector;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Database(#[from] tiberius::error::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("unexpected row layout: {0}")]
    Row(String),
}

/// One row of the raw `Bursts` table (DebugSMBs)
#[derive(Clone, Debug, PartialEq)]
pub struct BurstRow {
    pub device_id: Option<String>,
    pub device_name: Option<String>,
    pub customer_name: Option<String>,
    pub event_time: Option<NaiveDateTime>,
    pub payload: Option<String>,
}

/// One row of the `BatteryInfo` table joined with assets and organizations (SMBs)
#[derive(Clone, Debug, PartialEq)]
pub struct BatteryInfoRow {
    pub id: i64,
    pub organization_id: Option<i64>,
    pub organization_name: Option<String>,
    pub asset_id: Option<i64>,
    pub device_id: Option<String>,
    pub asset_name: Option<String>,
    pub event_time: Option<NaiveDateTime>,
    pub voltage: Option<f64>,
}

/// Rows as they come back from one of the databases, before normalization
#[derive(Clone, Debug, PartialEq)]
pub enum RawBatch {
    Bursts(Vec<BurstRow>),
    BatteryInfo(Vec<BatteryInfoRow>),
}

impl RawBatch {
    pub fn len(&self) -> usize {
        match self {
            RawBatch::Bursts(rows) => rows.len(),
            RawBatch::BatteryInfo(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Where fresh device telemetry comes from when no snapshot is cached
pub trait TelemetrySource {
    fn selector(&self) -> DbSelector;

    /// Latest reading per device; as of noon UTC on `as_of` if given, otherwise as of now
    fn fetch(&mut self, as_of: Option<NaiveDate>) -> Result<RawBatch, SourceError>;
}
