//! Serde format for `EventTimeUTC` columns.
//!
//! Written as `%Y-%m-%d %H:%M:%S%.f`; read leniently, since older snapshots were
//! produced by other tooling with day-first or month-first layouts.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serializer};

const WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const READ_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M",
];

pub fn parse(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    READ_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

pub fn serialize<S: Serializer>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format(WRITE_FORMAT))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_layouts() {
        let expected = "2025-01-15 10:07:00";
        for raw in [
            "2025-01-15 10:07:00",
            "2025-01-15 10:07:00.000",
            "2025-01-15T10:07:00",
            "15/01/2025 10:07",
        ] {
            assert_eq!(parse(raw).unwrap().to_string(), expected, "{raw}");
        }
        // Ambiguous day-first input wins over month-first
        assert_eq!(parse("03/04/2025 08:00").unwrap().to_string(), "2025-04-03 08:00:00");
        assert_eq!(parse("12/31/2025 08:00").unwrap().to_string(), "2025-12-31 08:00:00");
        assert!(parse("yesterday").is_none());
    }
}
