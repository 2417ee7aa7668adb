pub const DB_CREDENTIALS: &str = "db_credentials.json";
pub const EMAIL_CREDENTIALS: &str = "email_credentials.json";
pub const REPORT_SETTINGS: &str = "report.json";

pub const EMAILED_DATES: &str = "emailed_dates.txt";
pub const CHARTS_SUBDIR: &str = "charts";

pub const SNAPSHOT_PREFIX: &str = "latest_batt_";
pub const SNAPSHOT_PREFIX_OLD: &str = "latest_batt_old_";
pub const SNAPSHOT_EXT: &str = "csv";

pub const CHART_PREFIX: &str = "snapshot_";
pub const CHART_PREFIX_OLD: &str = "snapshot_old_";
pub const CHART_EXT: &str = "png";
