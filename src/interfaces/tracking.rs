use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::helpers::time::DATE_FORMAT;

// Written by earlier versions, e.g. "15Jan25"
const LEGACY_DATE_FORMAT: &str = "%d%b%y";

/// Append-only list of report dates that went out in a weekly email
pub struct EmailedDatesLog {
    path: PathBuf,
}

impl EmailedDatesLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        EmailedDatesLog {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Dates logged so far; a missing file is an empty log
    pub fn load(&self) -> io::Result<BTreeSet<NaiveDate>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(e),
        };

        let mut dates = BTreeSet::new();
        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match parse_logged_date(line) {
                Some(date) => {
                    dates.insert(date);
                }
                None => log::warn!("Ignoring unreadable line '{line}' in {}", self.path.display()),
            }
        }
        Ok(dates)
    }

    pub fn append(&self, dates: &[NaiveDate]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        for date in dates {
            writeln!(file, "{}", date.format(DATE_FORMAT))?;
        }
        file.flush()
    }
}

fn parse_logged_date(line: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(line, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(line, LEGACY_DATE_FORMAT))
        .ok()
}
