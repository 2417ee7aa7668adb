use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::{defaults, filenames};

use super::event_time;

/// Which telemetry database a report is built from
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DbSelector {
    /// BatteryInfo table; fast, and the default
    #[default]
    Smbs,
    /// Raw Bursts table with payload parsing (`--old`)
    DebugSmbs,
}

impl DbSelector {
    pub fn as_str(&self) -> &'static str {
        match self {
            DbSelector::Smbs => "smbs",
            DbSelector::DebugSmbs => "debug_smbs",
        }
    }

    pub fn database_name(&self) -> &'static str {
        match self {
            DbSelector::Smbs => "SMBs",
            DbSelector::DebugSmbs => "DebugSMBs",
        }
    }

    pub fn query_type(&self) -> &'static str {
        match self {
            DbSelector::Smbs => "Optimized Query",
            DbSelector::DebugSmbs => "Original Query",
        }
    }

    pub fn snapshot_prefix(&self) -> &'static str {
        match self {
            DbSelector::Smbs => filenames::SNAPSHOT_PREFIX,
            DbSelector::DebugSmbs => filenames::SNAPSHOT_PREFIX_OLD,
        }
    }

    pub fn chart_prefix(&self) -> &'static str {
        match self {
            DbSelector::Smbs => filenames::CHART_PREFIX,
            DbSelector::DebugSmbs => filenames::CHART_PREFIX_OLD,
        }
    }
}

impl fmt::Display for DbSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DbSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smbs" => Ok(DbSelector::Smbs),
            "debug_smbs" => Ok(DbSelector::DebugSmbs),
            other => Err(format!("unknown database selector '{other}'")),
        }
    }
}

/// Categorical battery state
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PowerMode {
    Critical,
    Low,
    Medium,
    High,
}

impl PowerMode {
    /// Display order: worst first
    pub const ALL: [PowerMode; 4] = [
        PowerMode::Critical,
        PowerMode::Low,
        PowerMode::Medium,
        PowerMode::High,
    ];

    pub fn from_voltage(voltage: f64, critical_level: f64) -> Self {
        if voltage > defaults::MEDIUM_VOLTAGE_CEILING {
            PowerMode::High
        } else if voltage > defaults::LOW_VOLTAGE_CEILING {
            PowerMode::Medium
        } else if voltage > critical_level {
            PowerMode::Low
        } else {
            PowerMode::Critical
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerMode::Critical => "Critical",
            PowerMode::Low => "Low",
            PowerMode::Medium => "Medium",
            PowerMode::High => "High",
        }
    }

    /// Anything below High needs attention
    pub fn is_low(&self) -> bool {
        *self != PowerMode::High
    }
}

impl fmt::Display for PowerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Critical" => Ok(PowerMode::Critical),
            "Low" => Ok(PowerMode::Low),
            "Medium" => Ok(PowerMode::Medium),
            "High" => Ok(PowerMode::High),
            _ => Err(()),
        }
    }
}

/// Latest battery state of one tracker
///
/// Column names follow the snapshot CSV headers.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DeviceRecord {
    #[serde(rename = "DeviceID")]
    pub device_id: String,
    #[serde(rename = "DeviceName", alias = "AssetName", default)]
    pub device_name: Option<String>,
    #[serde(
        rename = "OrganizationId",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub organization_id: Option<i64>,
    #[serde(
        rename = "Organization",
        alias = "CustomerName",
        alias = "OrganizationName",
        default
    )]
    pub organization: Option<String>,
    #[serde(rename = "EventTimeUTC", alias = "EventTime", with = "event_time")]
    pub event_time: NaiveDateTime,
    #[serde(rename = "Voltage")]
    pub voltage: f64,
    #[serde(rename = "PowerMode")]
    pub power_mode: PowerMode,
}

impl DeviceRecord {
    /// A tracker is paired to a container once its name differs from its ID
    pub fn is_paired(&self) -> bool {
        self.device_name
            .as_deref()
            .is_some_and(|name| name != self.device_id)
    }

    pub fn organization_is(&self, name: &str) -> bool {
        self.organization
            .as_deref()
            .is_some_and(|org| org.trim().eq_ignore_ascii_case(name))
    }
}
