pub const LOG_LEVEL: &str = "LOG_LEVEL";
pub const REPORT_DIR: &str = "BATT_REPORT_DIR";
pub const CONFIG_DIR: &str = "BATT_CONFIG_DIR";
