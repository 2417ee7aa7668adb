use std::fs;
use std::path::Path;

/// Ten paired ZIM New-PV trackers: 6 High, 2 Medium, 1 Low, 1 Critical
pub const TEN_DEVICES: &str = "\
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

/// Bursts snapshot as written by the earlier reporting scripts: no source line, no customer column
pub const LEGACY_BURSTS: &str = "\
### METADATA ###
query_time,41.27
### DATA ###
DeviceID,DeviceName,EventTimeUTC,PayloadData,Voltage,PowerMode
A0006123,ZIMU1234567,14/01/2025 23:10,\"Battery Level 3.35, Power mode High\",3.35,High
A0006124,ZIMU1234568,13/01/2025 08:00,\"Battery Level 3.19, Power mode Low\",3.19,Low
";

pub fn write_snapshot(report_dir: &Path, filename: &str, content: &str) {
    fs::write(report_dir.join(filename), content).unwrap();
}
