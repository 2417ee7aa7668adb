use chrono::NaiveDate;
use pico_args::Arguments;

use crate::helpers::time::parse_date;

pub const DAILY_HELP: &str = "\
Usage: batt-report daily [options]

Options:
  --manual             Prompt for a specific date
  --date YYYY-MM-DD    Report on a specific date without prompting
  --old                Use the DebugSMBs database
  --help, -h           Show this help message

Examples:
  batt-report daily                    # Latest data, SMBs database
  batt-report daily --old              # Latest data, DebugSMBs database
  batt-report daily --manual           # Specific date, SMBs database
  batt-report daily --manual --old     # Specific date, DebugSMBs database

Note: SMBs is the default database (faster).
";

pub const WEEKLY_HELP: &str = "\
Usage: batt-report weekly [options]

Options:
  --debug, -d                 Send only to the first recipient; never update the sent-dates log
  --use-tracking, --track     Send cached reports not yet emailed (deprecated)
  --help, -h                  Show this help message

By default the report covers the 7 most recent days, including today.
";

pub struct DailyArgs {
    pub manual: bool,
    pub old: bool,
    pub date: Option<NaiveDate>,
    pub help: bool,
}

impl DailyArgs {
    pub fn parse(args: &mut Arguments) -> Result<Self, pico_args::Error> {
        Ok(DailyArgs {
            help: args.contains(["-h", "--help"]),
            manual: args.contains("--manual"),
            old: args.contains("--old"),
            date: args.opt_value_from_fn("--date", parse_date)?,
        })
    }
}

pub struct WeeklyArgs {
    pub debug: bool,
    pub track: bool,
    pub help: bool,
}

impl WeeklyArgs {
    pub fn parse(args: &mut Arguments) -> Self {
        WeeklyArgs {
            help: args.contains(["-h", "--help"]),
            debug: args.contains(["-d", "--debug"]),
            track: args.contains("--use-tracking") | args.contains("--track"),
        }
    }
}

pub struct CheckDbArgs {
    pub old: bool,
}

impl CheckDbArgs {
    pub fn parse(args: &mut Arguments) -> Self {
        CheckDbArgs {
            old: args.contains("--old"),
        }
    }
}
