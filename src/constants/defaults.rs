pub const LOG_LEVEL: &str = "info";
pub const REPORT_DIR: &str = "latest_batt_reports";
pub const CONFIG_DIR: &str = "config";

pub const SMTP_HOST: &str = "smtp.gmail.com";
pub const SMTP_PORT: u16 = 587;
pub const SQL_SERVER_PORT: u16 = 1433;

pub const CRITICAL_VOLTAGE: f64 = 3.18;
pub const LOW_VOLTAGE_CEILING: f64 = 3.22;
pub const MEDIUM_VOLTAGE_CEILING: f64 = 3.3;

pub const LAST_SEEN_WEEKS: i64 = 12;
pub const LOOKBACK_MONTHS: i32 = 4;
pub const AS_OF_HOUR_UTC: u32 = 12;
pub const WEEKLY_WINDOW_DAYS: i64 = 7;

pub const CHART_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";
pub const CHART_LIST_NAME: &str = "NewPV & 6000+ Series";
