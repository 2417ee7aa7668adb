use anyhow::{bail, Result};

use crate::config::Config;
use crate::helpers::base_path::CONFIG_DIR;
use crate::interfaces::Mailer;

pub fn check_smtp() -> Result<()> {
    let config = Config::load(&CONFIG_DIR)?;
    let mailer = Mailer::from_config(&config.email)?;
    if mailer.test_connection()? {
        log::info!("Login successful");
        Ok(())
    } else {
        bail!("Login failed for {}", config.email.sender)
    }
}
