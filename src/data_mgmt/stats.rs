use crate::config::OrganizationRef;
use crate::data_mgmt::models::{DeviceRecord, PowerMode};

pub const ALL_DEVICES: &str = "All devices";

/// Device count per power mode
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PowerModeBreakdown {
    pub total: usize,
    counts: [usize; 4],
}

impl PowerModeBreakdown {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a DeviceRecord>,
    {
        let mut breakdown = PowerModeBreakdown::default();
        for record in records {
            breakdown.counts[record.power_mode.index()] += 1;
            breakdown.total += 1;
        }
        breakdown
    }

    pub fn count(&self, mode: PowerMode) -> usize {
        self.counts[mode.index()]
    }

    /// Share of devices in `mode`, 0 to 100; an empty set gives 0
    pub fn percent(&self, mode: PowerMode) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.count(mode) as f64 * 100.0 / self.total as f64
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrganizationStats {
    pub name: String,
    pub breakdown: PowerModeBreakdown,
}

fn belongs_to(record: &DeviceRecord, org: &OrganizationRef) -> bool {
    match (org.id, record.organization_id) {
        (Some(wanted), Some(actual)) => wanted == actual,
        // DebugSMBs rows carry no organization ID
        _ => record.organization_is(&org.name),
    }
}

/// Breakdown per configured organization, followed by the total over all records
pub fn by_organization(
    records: &[DeviceRecord],
    organizations: &[OrganizationRef],
) -> Vec<OrganizationStats> {
    organizations
        .iter()
        .map(|org| OrganizationStats {
            name: org.name.clone(),
            breakdown: PowerModeBreakdown::from_records(
                records.iter().filter(|r| belongs_to(r, org)),
            ),
        })
        .chain(std::iter::once(OrganizationStats {
            name: ALL_DEVICES.to_string(),
            breakdown: PowerModeBreakdown::from_records(records),
        }))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    fn record(org: &str, org_id: Option<i64>, mode: PowerMode) -> DeviceRecord {
        DeviceRecord {
            device_id: "A0006001".into(),
            device_name: None,
            organization_id: org_id,
            organization: Some(org.into()),
            event_time: NaiveDateTime::default(),
            voltage: 3.3,
            power_mode: mode,
        }
    }

    fn org(name: &str, id: Option<i64>) -> OrganizationRef {
        OrganizationRef {
            id,
            name: name.into(),
        }
    }

    #[test]
    fn percentages_sum_to_100() {
        let modes = [
            PowerMode::High,
            PowerMode::High,
            PowerMode::Medium,
            PowerMode::Low,
            PowerMode::Critical,
            PowerMode::Critical,
            PowerMode::High,
        ];
        let records: Vec<_> = modes.iter().map(|m| record("Zim", None, *m)).collect();
        let breakdown = PowerModeBreakdown::from_records(&records);
        assert_eq!(breakdown.total, 7);
        assert_eq!(breakdown.count(PowerMode::High), 3);
        let sum: f64 = PowerMode::ALL.iter().map(|m| breakdown.percent(*m)).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_set_is_all_zero() {
        let breakdown = PowerModeBreakdown::from_records(&Vec::<DeviceRecord>::new());
        assert!(breakdown.is_empty());
        for mode in PowerMode::ALL {
            assert_eq!(breakdown.percent(mode), 0.0);
        }
    }

    #[test]
    fn organizations_match_by_id_then_name() {
        let records = vec![
            record("ZIM", Some(3), PowerMode::High),
            record("Zim Integrated", Some(3), PowerMode::Low),
            record("zim", None, PowerMode::Medium),
            record("Samskip", Some(5), PowerMode::Critical),
        ];
        let stats = by_organization(&records, &[org("ZIM", Some(3)), org("HMM", None)]);

        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].breakdown.total, 3);
        assert_eq!(stats[1].name, "HMM");
        assert!(stats[1].breakdown.is_empty());
        assert_eq!(stats[2].name, ALL_DEVICES);
        assert_eq!(stats[2].breakdown.total, 4);
        assert_eq!(stats[2].breakdown.percent(PowerMode::Critical), 25.0);
    }
}
