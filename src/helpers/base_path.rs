use std::{env, path::PathBuf};

use once_cell::sync::Lazy;

use crate::constants::{defaults, envvars};

pub static REPORT_DIR: Lazy<PathBuf> = Lazy::new(report_dir_from_env);

pub static CONFIG_DIR: Lazy<PathBuf> = Lazy::new(config_dir_from_env);

pub fn report_dir_from_env() -> PathBuf {
    if let Ok(report_dir) = env::var(envvars::REPORT_DIR) {
        return report_dir.into();
    }
    PathBuf::from(defaults::REPORT_DIR)
}

pub fn config_dir_from_env() -> PathBuf {
    if let Ok(config_dir) = env::var(envvars::CONFIG_DIR) {
        return config_dir.into();
    }
    PathBuf::from(defaults::CONFIG_DIR)
}
