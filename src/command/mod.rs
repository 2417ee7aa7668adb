mod check_db;
mod check_smtp;
mod daily;
mod weekly;

pub use check_db::check_db;
pub use check_smtp::check_smtp;
pub use daily::daily;
pub use weekly::weekly;

use std::collections::HashSet;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::data_mgmt::filters;

/// New-PV allowlist from the configured CSV, or an empty list if none is configured
fn new_pv_ids(config: &Config) -> Result<HashSet<String>> {
    match config.new_pv_list_path() {
        Some(path) => filters::load_new_pv_list(&path)
            .with_context(|| format!("Failed to read New-PV list {}", path.display())),
        None => {
            log::warn!("No New-PV list configured; only the A0 6000+ series counts as New-PV");
            Ok(HashSet::new())
        }
    }
}
