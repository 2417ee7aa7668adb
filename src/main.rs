mod argsets;
mod command;
mod config;
mod constants;
mod data_mgmt;
mod helpers;
mod interfaces;
mod report;

use anyhow::{anyhow, Result};
use pico_args::Arguments;

const CMD_DAILY: &str = "daily";
const CMD_WEEKLY: &str = "weekly";
const CMD_CHECK_DB: &str = "check-db";
const CMD_CHECK_SMTP: &str = "check-smtp";

fn main() -> Result<()> {
    // Loaded first, so LOG_LEVEL may come from .env
    let dotenv_loaded = helpers::load_dotenv();
    helpers::init_logging();
    if dotenv_loaded {
        log::debug!("Loaded local .env");
    }

    let mut args = Arguments::from_env();
    match args.subcommand()?.as_deref() {
        Some(CMD_DAILY) => {
            let daily_args = argsets::DailyArgs::parse(&mut args)?;
            reject_leftovers(args)?;
            if daily_args.help {
                print!("{}", argsets::DAILY_HELP);
                return Ok(());
            }
            command::daily(daily_args)
        }
        Some(CMD_WEEKLY) => {
            let weekly_args = argsets::WeeklyArgs::parse(&mut args);
            reject_leftovers(args)?;
            if weekly_args.help {
                print!("{}", argsets::WEEKLY_HELP);
                return Ok(());
            }
            command::weekly(weekly_args)
        }
        Some(CMD_CHECK_DB) => {
            let check_args = argsets::CheckDbArgs::parse(&mut args);
            reject_leftovers(args)?;
            command::check_db(check_args)
        }
        Some(CMD_CHECK_SMTP) => {
            reject_leftovers(args)?;
            command::check_smtp()
        }
        _ => Err(anyhow!(
            "Subcommand must be one of '{CMD_DAILY}', '{CMD_WEEKLY}', \
             '{CMD_CHECK_DB}', '{CMD_CHECK_SMTP}'"
        )),
    }
}

fn reject_leftovers(args: Arguments) -> Result<()> {
    let leftovers = args.finish();
    if leftovers.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("Unexpected arguments: {leftovers:?}"))
    }
}
